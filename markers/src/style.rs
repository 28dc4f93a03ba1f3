//! Resolution-scaled geometry helpers for the host renderer.
//!
//! Icons are drawn at a fixed pixel size regardless of zoom, so every
//! rectangle or offset derived from one must be scaled by the current
//! resolution to stay visually consistent. Pure functions, total for
//! finite inputs.

#[cfg(test)]
#[path = "style_test.rs"]
mod style_test;

use crate::consts::{ICON_SIZE, MEMO_OFFSET};
use crate::geom::{Extent, Point};

/// Icon-sized rectangle around `center`, for hit-testing and the hover
/// highlight.
#[must_use]
pub fn hit_region(center: Point, resolution: f64) -> Extent {
    let half_w = ICON_SIZE[0] / 2.0 * resolution;
    let half_h = ICON_SIZE[1] / 2.0 * resolution;
    Extent::new(center.x - half_w, center.y - half_h, center.x + half_w, center.y + half_h)
}

/// Anchor for an icon placed at `pointer`, lifted half an icon so the
/// pointer sits at the marker's tip.
#[must_use]
pub fn anchor_position(pointer: Point, resolution: f64) -> Point {
    Point::new(pointer.x, pointer.y + ICON_SIZE[1] / 2.0 * resolution)
}

/// Position of the memo balloon for an icon anchored at `position`.
#[must_use]
pub fn memo_anchor(position: Point, resolution: f64) -> Point {
    Point::new(
        position.x + MEMO_OFFSET[0] * resolution,
        position.y + MEMO_OFFSET[1] * resolution,
    )
}
