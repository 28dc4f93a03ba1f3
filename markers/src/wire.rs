//! JSON shapes shared with the persistence backend.
//!
//! DESIGN
//! ======
//! These types are the single definition of the wire protocol: the engine
//! serializes them on the way out and the backend deserializes the same
//! structs, so the two sides cannot drift. Memo normalization lives here
//! and only here — an unauthored memo is `None` in the entity and `""` on
//! the wire, in both directions.

#[cfg(test)]
#[path = "wire_test.rs"]
mod wire_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::geom::Point;
use crate::icon::{Icon, IconKind};

/// Request body for `POST loadicon/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadRequest {
    /// `[min_x, min_y, max_x, max_y]` of the region to fetch.
    #[serde(rename = "loadExtent")]
    pub load_extent: [f64; 4],
}

/// Response body for `POST loadicon/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadResponse {
    pub icon_list: Vec<IconRecord>,
}

/// One icon as it travels on the wire, flat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IconRecord {
    pub coord_x: f64,
    pub coord_y: f64,
    pub image_file_name: IconKind,
    /// Always a string on the wire; `""` means no memo.
    pub memo: String,
    /// Owner, attached by the client on save requests only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    /// Identity: omitted only for an icon that never had one, temporary
    /// (negative) for unsaved adds, positive for persisted icons.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

impl IconRecord {
    /// Flatten an icon for a save batch. `None` memo becomes `""`.
    #[must_use]
    pub fn from_icon(icon: &Icon, user_id: Option<i64>) -> Self {
        Self {
            coord_x: icon.position.x,
            coord_y: icon.position.y,
            image_file_name: icon.kind,
            memo: icon.memo.clone().unwrap_or_default(),
            user_id,
            id: icon.id,
        }
    }

    /// Rebuild the entity from a wire record. `""` memo becomes `None`.
    #[must_use]
    pub fn into_icon(self) -> Icon {
        Icon {
            id: self.id,
            position: Point::new(self.coord_x, self.coord_y),
            kind: self.image_file_name,
            memo: if self.memo.is_empty() { None } else { Some(self.memo) },
        }
    }
}

/// Request body for `POST saveicon/`: the minimal diff since the last save.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaveBatch {
    pub add: Vec<IconRecord>,
    pub update: Vec<IconRecord>,
    pub delete: Vec<IconRecord>,
}

impl SaveBatch {
    /// Whether there is nothing to persist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.update.is_empty() && self.delete.is_empty()
    }
}

/// Response body for `POST saveicon/`.
///
/// `added_id_dict` maps every temporary id from the request's `add` list to
/// the identity the server assigned. JSON object keys are strings; serde
/// converts them back to integers here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveResponse {
    pub added_id_dict: HashMap<i64, i64>,
}
