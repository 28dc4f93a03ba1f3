#![allow(clippy::float_cmp)]

use std::sync::Arc;

use serde_json::json;

use super::*;
use crate::consts::DEFAULT_MESH_SIZE;
use crate::geom::Extent;
use crate::icon::IconKind;
use crate::transport::TransportError;
use crate::transport::test_transport::StubTransport;

fn loader_with_stub() -> (IconLoader, Arc<StubTransport>) {
    let stub = Arc::new(StubTransport::new());
    (IconLoader::new(DEFAULT_MESH_SIZE, stub.clone()), stub)
}

fn empty_response() -> serde_json::Value {
    json!({"icon_list": []})
}

// --- first fetch ---

#[tokio::test]
async fn first_load_requests_the_unified_extent() {
    let (mut loader, stub) = loader_with_stub();
    stub.push_ok(empty_response());

    let icons = loader.load(Extent::new(0.0, 0.0, 1000.0, 1000.0), 1.0).await.unwrap();
    assert!(icons.is_empty());

    let requests = stub.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].0, "loadicon/");
    assert_eq!(requests[0].1, json!({"loadExtent": [0.0, 0.0, 1000.0, 1000.0]}));
}

#[tokio::test]
async fn records_become_icons_with_memo_denormalized() {
    let (mut loader, stub) = loader_with_stub();
    stub.push_ok(json!({
        "icon_list": [
            {"coord_x": 10.0, "coord_y": 20.0, "image_file_name": "point_red.png", "memo": "", "id": 5},
            {"coord_x": 30.0, "coord_y": 40.0, "image_file_name": "point_blue.png", "memo": "note", "id": 6},
        ]
    }));

    let icons = loader.load(Extent::new(0.0, 0.0, 100.0, 100.0), 1.0).await.unwrap();
    assert_eq!(icons.len(), 2);

    assert_eq!(icons[0].id, Some(5));
    assert_eq!(icons[0].kind, IconKind::Red);
    assert_eq!(icons[0].memo, None);

    assert_eq!(icons[1].id, Some(6));
    assert_eq!(icons[1].memo.as_deref(), Some("note"));
}

// --- the nothing-to-load fast path ---

#[tokio::test]
async fn covered_region_is_not_refetched() {
    let (mut loader, stub) = loader_with_stub();
    stub.push_ok(empty_response());

    loader.load(Extent::new(0.0, 0.0, 1000.0, 1000.0), 1.0).await.unwrap();

    // Same extent, then a contained one: both resolve locally.
    let again = loader.load(Extent::new(0.0, 0.0, 1000.0, 1000.0), 1.0).await.unwrap();
    assert!(again.is_empty());
    let inner = loader.load(Extent::new(0.0, 0.0, 500.0, 500.0), 1.0).await.unwrap();
    assert!(inner.is_empty());

    assert_eq!(stub.requests().len(), 1);
}

#[tokio::test]
async fn overlapping_pan_requests_only_the_bounding_rect_of_missing_cells() {
    let (mut loader, stub) = loader_with_stub();
    stub.push_ok(empty_response());
    stub.push_ok(empty_response());

    loader.load(Extent::new(0.0, 0.0, 500.0, 500.0), 1.0).await.unwrap();
    loader.load(Extent::new(250.0, 0.0, 750.0, 500.0), 1.0).await.unwrap();

    let requests = stub.requests();
    assert_eq!(requests.len(), 2);
    // Only the unseen right-hand column is missing; its bounding rect
    // starts where the loaded region ends.
    assert_eq!(requests[1].1, json!({"loadExtent": [500.0, 0.0, 750.0, 500.0]}));
}

#[tokio::test]
async fn each_resolution_loads_its_own_cells() {
    let (mut loader, stub) = loader_with_stub();
    stub.push_ok(empty_response());
    stub.push_ok(empty_response());

    loader.load(Extent::new(0.0, 0.0, 500.0, 500.0), 1.0).await.unwrap();
    loader.load(Extent::new(0.0, 0.0, 500.0, 500.0), 2.0).await.unwrap();

    assert_eq!(stub.requests().len(), 2);
}

// --- failure leaves the region fetchable ---

#[tokio::test]
async fn transport_failure_marks_nothing_loaded() {
    let (mut loader, stub) = loader_with_stub();
    let extent = Extent::new(0.0, 0.0, 500.0, 500.0);

    stub.push_err(TransportError::Request("connection refused".into()));
    let err = loader.load(extent, 1.0).await.unwrap_err();
    assert!(matches!(err, LoadError::Transport(_)));

    // The retry sends the very same request.
    stub.push_ok(empty_response());
    loader.load(extent, 1.0).await.unwrap();

    let requests = stub.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].1, requests[1].1);
}

#[tokio::test]
async fn malformed_response_marks_nothing_loaded() {
    let (mut loader, stub) = loader_with_stub();
    let extent = Extent::new(0.0, 0.0, 500.0, 500.0);

    stub.push_ok(json!({"icon_list": [{"image_file_name": "not_a_marker.png"}]}));
    let err = loader.load(extent, 1.0).await.unwrap_err();
    assert!(matches!(err, LoadError::Response(_)));

    stub.push_ok(empty_response());
    loader.load(extent, 1.0).await.unwrap();
    assert_eq!(stub.requests().len(), 2);
}
