//! Viewport-driven icon fetching through the mesh index.
//!
//! DESIGN
//! ======
//! When the host reports a new viewport extent, the loader tiles it into
//! mesh cells, keeps only the cells not yet fetched at this resolution,
//! and unifies those into one bounding rectangle so a pan issues a single
//! request instead of one per cell. Cells are marked loaded only after
//! the fetch succeeds: a failed fetch changes nothing, and the next
//! viewport event covering the same region retries it.

#[cfg(test)]
#[path = "loader_test.rs"]
mod loader_test;

use std::sync::Arc;

use tracing::debug;

use crate::error::ErrorCode;
use crate::geom::Extent;
use crate::icon::Icon;
use crate::mesh::MeshIndex;
use crate::transport::{JsonTransport, TransportError};
use crate::wire::{IconRecord, LoadRequest, LoadResponse};

const LOAD_PATH: &str = "loadicon/";

/// Errors produced by a load attempt.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The request reached the network and failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The backend answered 200 with a body we could not use.
    #[error("load response invalid: {0}")]
    Response(String),
}

impl ErrorCode for LoadError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Transport(e) => e.error_code(),
            Self::Response(_) => "E_LOAD_RESPONSE",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Transport(e) => e.retryable(),
            Self::Response(_) => false,
        }
    }
}

/// Fetches icons for viewport regions, at most once per region.
pub struct IconLoader {
    mesh: MeshIndex,
    transport: Arc<dyn JsonTransport>,
}

impl IconLoader {
    /// `mesh_size` is the cell edge length in screen pixels, width × height.
    #[must_use]
    pub fn new(mesh_size: [f64; 2], transport: Arc<dyn JsonTransport>) -> Self {
        Self { mesh: MeshIndex::new(mesh_size), transport }
    }

    /// Fetch the icons for `extent` at `resolution` that have not been
    /// fetched before.
    ///
    /// Returns an empty list without touching the network when every
    /// covering cell is already loaded. On success the fetched cells are
    /// recorded so later viewports skip them; on failure nothing is
    /// recorded and the region stays fetchable.
    ///
    /// # Errors
    ///
    /// `Transport` for network or HTTP failures, `Response` when the body
    /// does not match the expected shape.
    pub async fn load(&mut self, extent: Extent, resolution: f64) -> Result<Vec<Icon>, LoadError> {
        let cells = self.mesh.cells_covering(extent, resolution);
        let missing = self.mesh.missing_cells(&cells, resolution);
        let Some(load_extent) = MeshIndex::unify(&missing) else {
            return Ok(Vec::new());
        };

        debug!(cells = missing.len(), resolution, "loading icons for region");

        let request = LoadRequest { load_extent: load_extent.to_array() };
        let body = serde_json::to_value(&request).map_err(|e| LoadError::Response(e.to_string()))?;
        let raw = self.transport.post_json(LOAD_PATH, body).await?;
        let response: LoadResponse =
            serde_json::from_value(raw).map_err(|e| LoadError::Response(e.to_string()))?;

        self.mesh.mark_loaded(&missing, resolution);

        Ok(response.icon_list.into_iter().map(IconRecord::into_icon).collect())
    }
}
