//! Icon lifecycle and lazy-loading engine for the map memo widget.
//!
//! This crate owns the stateful core of the annotation widget: which map
//! regions have already been fetched, which icons carry unsaved local
//! mutations, and how locally-created icons are reconciled against
//! server-persisted ones after a save. The map itself is an external
//! collaborator: it feeds the core viewport extents and user actions, and
//! receives icon entities and geometry back. Tile rendering and DOM
//! wiring never enter this crate.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`mesh`] | Loaded-region tracker over a fixed pixel grid |
//! | [`registry`] | Pending add/update/delete tracking and batch save |
//! | [`loader`] | Viewport-driven icon fetching through the mesh index |
//! | [`icon`] | Icon entity and the fixed set of marker appearances |
//! | [`style`] | Resolution-scaled geometry helpers for the host renderer |
//! | [`wire`] | JSON shapes shared with the persistence backend |
//! | [`transport`] | Injected "send JSON, get JSON" capability + HTTP impl |
//! | [`geom`] | Points and axis-aligned extents in map projection units |
//! | [`error`] | Grepable error codes and retryability reporting |
//! | [`consts`] | Shared numeric constants (icon size, mesh size, offsets) |

pub mod consts;
pub mod error;
pub mod geom;
pub mod icon;
pub mod loader;
pub mod mesh;
pub mod registry;
pub mod style;
pub mod transport;
pub mod wire;
