//! Icon service — bounding-box loads and atomic batch saves.
//!
//! DESIGN
//! ======
//! The save endpoint receives the widget's pending diff (add/update/delete
//! in one batch) and applies it inside a single transaction: if any row
//! fails, the whole batch rolls back and the client's pending state stays
//! retryable. Adds are inserted in list order so the response can map each
//! client temporary id to the row id Postgres assigned.
//!
//! Loads return every icon of the calling user inside the requested
//! rectangle; the memo column stores `""` for "no memo", which is exactly
//! the wire convention, so rows pass through unnormalized.

use std::collections::HashMap;

use markers::error::ErrorCode;
use markers::icon::IconKind;
use markers::wire::{IconRecord, LoadResponse, SaveBatch, SaveResponse};
use sqlx::{PgPool, Row};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum IconError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("unknown image file name: {0}")]
    UnknownImage(String),
    #[error("add record missing its temporary id")]
    MissingTempId,
}

impl ErrorCode for IconError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Database(_) => "E_DATABASE",
            Self::UnknownImage(_) => "E_UNKNOWN_IMAGE",
            Self::MissingTempId => "E_MISSING_TEMP_ID",
        }
    }
}

// =============================================================================
// LOAD
// =============================================================================

/// Fetch the caller's icons inside `extent` (`[min_x, min_y, max_x, max_y]`).
///
/// # Errors
///
/// Returns `Database` on query failure, `UnknownImage` if a stored file
/// name no longer maps to a marker kind.
pub async fn load_icons(pool: &PgPool, user_id: i64, extent: [f64; 4]) -> Result<LoadResponse, IconError> {
    let rows = sqlx::query(
        r"SELECT id, coord_x, coord_y, image_file_name, memo
          FROM map_icons
          WHERE user_id = $1
            AND coord_x >= $2 AND coord_y >= $3
            AND coord_x <= $4 AND coord_y <= $5",
    )
    .bind(user_id)
    .bind(extent[0])
    .bind(extent[1])
    .bind(extent[2])
    .bind(extent[3])
    .fetch_all(pool)
    .await?;

    let mut icon_list = Vec::with_capacity(rows.len());
    for row in rows {
        let file_name: String = row.get("image_file_name");
        let image_file_name = IconKind::from_file_name(&file_name)
            .ok_or_else(|| IconError::UnknownImage(file_name))?;
        icon_list.push(IconRecord {
            coord_x: row.get("coord_x"),
            coord_y: row.get("coord_y"),
            image_file_name,
            memo: row.get("memo"),
            user_id: None,
            id: Some(row.get::<i64, _>("id")),
        });
    }

    Ok(LoadResponse { icon_list })
}

// =============================================================================
// SAVE
// =============================================================================

/// Apply a save batch for the caller in one transaction.
///
/// Updates and deletes only ever touch rows the caller owns. The response
/// maps every temporary id from the `add` list to its new row id.
///
/// # Errors
///
/// Returns `MissingTempId` if an add record carries no id, `Database` on
/// any statement failure — in which case nothing was committed.
pub async fn save_icons(pool: &PgPool, user_id: i64, batch: SaveBatch) -> Result<SaveResponse, IconError> {
    let mut tx = pool.begin().await?;

    let mut inserted_ids = Vec::with_capacity(batch.add.len());
    for record in &batch.add {
        let id: i64 = sqlx::query_scalar(
            r"INSERT INTO map_icons (coord_x, coord_y, image_file_name, memo, user_id)
              VALUES ($1, $2, $3, $4, $5)
              RETURNING id",
        )
        .bind(record.coord_x)
        .bind(record.coord_y)
        .bind(record.image_file_name.file_name())
        .bind(&record.memo)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;
        inserted_ids.push(id);
    }

    for record in &batch.update {
        let Some(id) = record.id else { continue };
        sqlx::query(
            r"UPDATE map_icons
              SET coord_x = $1, coord_y = $2, image_file_name = $3, memo = $4
              WHERE id = $5 AND user_id = $6",
        )
        .bind(record.coord_x)
        .bind(record.coord_y)
        .bind(record.image_file_name.file_name())
        .bind(&record.memo)
        .bind(id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    }

    let delete_ids = persisted_ids(&batch.delete);
    if !delete_ids.is_empty() {
        sqlx::query("DELETE FROM map_icons WHERE id = ANY($1) AND user_id = $2")
            .bind(&delete_ids)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
    }

    let added_id_dict = added_id_dict(&batch.add, &inserted_ids)?;
    tx.commit().await?;

    tracing::info!(
        user_id,
        added = batch.add.len(),
        updated = batch.update.len(),
        deleted = delete_ids.len(),
        "icon batch saved"
    );

    Ok(SaveResponse { added_id_dict })
}

/// Pair each add record's temporary id with the row id assigned at the
/// same position of the insert order.
fn added_id_dict(add: &[IconRecord], inserted_ids: &[i64]) -> Result<HashMap<i64, i64>, IconError> {
    add.iter()
        .zip(inserted_ids)
        .map(|(record, &db_id)| record.id.ok_or(IconError::MissingTempId).map(|temp_id| (temp_id, db_id)))
        .collect()
}

/// Ids of the records that reference an existing row.
fn persisted_ids(records: &[IconRecord]) -> Vec<i64> {
    records.iter().filter_map(|record| record.id).collect()
}

// =============================================================================
// TESTS
// =============================================================================
