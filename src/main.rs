mod csrf;
mod db;
mod routes;
mod services;
mod state;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "8000".into())
        .parse()
        .expect("invalid PORT");

    let pool = db::init_pool(&database_url)
        .await
        .expect("database init failed");

    // Dev convenience: provision a user and a session so the widget can be
    // driven end-to-end without a separate auth deployment.
    if let Ok(username) = std::env::var("SEED_USER") {
        let user_id = services::session::ensure_user(&pool, &username)
            .await
            .expect("seed user failed");
        let token = services::session::create_session(&pool, user_id)
            .await
            .expect("seed session failed");
        tracing::info!(%username, user_id, %token, "seeded dev session");
    }

    let state = state::AppState::new(pool);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "mapmemo listening");
    axum::serve(listener, app).await.expect("server failed");
}
