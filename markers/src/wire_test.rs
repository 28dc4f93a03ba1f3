#![allow(clippy::float_cmp)]

use serde_json::json;

use super::*;
use crate::geom::Point;
use crate::icon::{Icon, IconKind};

fn sample_icon() -> Icon {
    Icon {
        id: Some(7),
        position: Point::new(100.5, -200.25),
        kind: IconKind::Cyan,
        memo: Some("lunch spot".to_owned()),
    }
}

// --- memo normalization ---

#[test]
fn unauthored_memo_serializes_as_empty_string() {
    let mut icon = sample_icon();
    icon.memo = None;
    let record = IconRecord::from_icon(&icon, None);
    assert_eq!(record.memo, "");
}

#[test]
fn empty_wire_memo_deserializes_as_none() {
    let record = IconRecord {
        coord_x: 0.0,
        coord_y: 0.0,
        image_file_name: IconKind::Red,
        memo: String::new(),
        user_id: None,
        id: Some(1),
    };
    assert_eq!(record.into_icon().memo, None);
}

#[test]
fn memo_round_trip_law() {
    for memo in [None, Some("text".to_owned())] {
        let mut icon = sample_icon();
        icon.memo = memo.clone();
        let back = IconRecord::from_icon(&icon, Some(1)).into_icon();
        assert_eq!(back.memo, memo);
        assert_eq!(back.id, icon.id);
        assert_eq!(back.position, icon.position);
        assert_eq!(back.kind, icon.kind);
    }
}

// --- optional fields ---

#[test]
fn absent_user_and_id_are_omitted_from_json() {
    let record = IconRecord {
        coord_x: 1.0,
        coord_y: 2.0,
        image_file_name: IconKind::Black,
        memo: String::new(),
        user_id: None,
        id: None,
    };
    let value = serde_json::to_value(&record).unwrap();
    assert_eq!(
        value,
        json!({
            "coord_x": 1.0,
            "coord_y": 2.0,
            "image_file_name": "point_black.png",
            "memo": "",
        })
    );
}

#[test]
fn present_user_and_id_are_serialized() {
    let record = IconRecord::from_icon(&sample_icon(), Some(3));
    let value = serde_json::to_value(&record).unwrap();
    assert_eq!(value["user_id"], json!(3));
    assert_eq!(value["id"], json!(7));
}

// --- request/response shapes ---

#[test]
fn load_request_uses_wire_field_name() {
    let request = LoadRequest { load_extent: [0.0, 0.0, 10.0, 10.0] };
    let value = serde_json::to_value(&request).unwrap();
    assert_eq!(value, json!({"loadExtent": [0.0, 0.0, 10.0, 10.0]}));
}

#[test]
fn load_response_parses_record_list() {
    let response: LoadResponse = serde_json::from_value(json!({
        "icon_list": [
            {"coord_x": 1.0, "coord_y": 2.0, "image_file_name": "point_green.png", "memo": "", "id": 9}
        ]
    }))
    .unwrap();
    assert_eq!(response.icon_list.len(), 1);
    assert_eq!(response.icon_list[0].id, Some(9));
    assert_eq!(response.icon_list[0].image_file_name, IconKind::Green);
}

#[test]
fn save_response_parses_stringified_integer_keys() {
    let response: SaveResponse =
        serde_json::from_value(json!({"added_id_dict": {"-1": 101, "-2": 102}})).unwrap();
    assert_eq!(response.added_id_dict.get(&-1), Some(&101));
    assert_eq!(response.added_id_dict.get(&-2), Some(&102));
}

#[test]
fn empty_batch_reports_empty() {
    let mut batch = SaveBatch::default();
    assert!(batch.is_empty());
    batch.delete.push(IconRecord::from_icon(&sample_icon(), None));
    assert!(!batch.is_empty());
}
