//! Icon entity and the fixed set of marker appearances.
//!
//! DESIGN
//! ======
//! Identity is a three-state `Option<i64>`: `None` for an icon the user is
//! still placing, a negative value for a locally-tracked icon awaiting its
//! first save, a positive value once the server has persisted it. The
//! registry and loader rely on the sign to tell the two tracked states
//! apart; nothing with a non-positive identity is ever sent as an update
//! or delete target.

#[cfg(test)]
#[path = "icon_test.rs"]
mod icon_test;

use serde::{Deserialize, Serialize};

use crate::geom::Point;

/// The fixed marker appearances a user can place.
///
/// Serialized on the wire as the image file name the backend stores, so
/// the enum doubles as validation: an unknown file name fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IconKind {
    #[serde(rename = "point_red.png")]
    Red,
    #[serde(rename = "point_purple.png")]
    Purple,
    #[serde(rename = "point_orange.png")]
    Orange,
    #[serde(rename = "point_yellow.png")]
    Yellow,
    #[serde(rename = "point_green.png")]
    Green,
    #[serde(rename = "point_cyan.png")]
    Cyan,
    #[serde(rename = "point_blue.png")]
    Blue,
    #[serde(rename = "point_black.png")]
    Black,
}

impl IconKind {
    /// Every placeable appearance, in menu order.
    pub const ALL: [IconKind; 8] = [
        IconKind::Red,
        IconKind::Purple,
        IconKind::Orange,
        IconKind::Yellow,
        IconKind::Green,
        IconKind::Cyan,
        IconKind::Blue,
        IconKind::Black,
    ];

    /// Image file name used on the wire and under the static image root.
    #[must_use]
    pub fn file_name(self) -> &'static str {
        match self {
            IconKind::Red => "point_red.png",
            IconKind::Purple => "point_purple.png",
            IconKind::Orange => "point_orange.png",
            IconKind::Yellow => "point_yellow.png",
            IconKind::Green => "point_green.png",
            IconKind::Cyan => "point_cyan.png",
            IconKind::Blue => "point_blue.png",
            IconKind::Black => "point_black.png",
        }
    }

    /// Parse a stored image file name back into a kind.
    #[must_use]
    pub fn from_file_name(name: &str) -> Option<Self> {
        IconKind::ALL.into_iter().find(|kind| kind.file_name() == name)
    }
}

/// One placed marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Icon {
    /// `None` until tracked; negative while pending first save; positive
    /// once persisted.
    pub id: Option<i64>,
    /// Anchor position in map projection units.
    pub position: Point,
    /// Marker appearance.
    pub kind: IconKind,
    /// Attached memo. `None` means the user has not authored one yet.
    pub memo: Option<String>,
}

impl Icon {
    /// A freshly placed icon with no identity and no memo.
    #[must_use]
    pub fn new(position: Point, kind: IconKind) -> Self {
        Self { id: None, position, kind, memo: None }
    }

    /// Whether the server knows this icon (positive identity).
    #[must_use]
    pub fn is_persisted(&self) -> bool {
        self.id.is_some_and(|id| id > 0)
    }

    /// Whether this icon carries a client-assigned temporary identity.
    #[must_use]
    pub fn is_temporary(&self) -> bool {
        self.id.is_some_and(|id| id < 0)
    }
}
