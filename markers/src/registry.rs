//! Pending-mutation tracking and batch save.
//!
//! DESIGN
//! ======
//! Three disjoint maps hold the not-yet-persisted diff: icons added since
//! the last save (keyed by their client-assigned temporary id), and
//! persisted icons updated or deleted (keyed by their server id). Adds stay
//! local-only until a save succeeds; an icon the server never saw is simply
//! evicted from the add map when removed, it never becomes a delete.
//! Temporary ids come from a counter owned by the registry instance —
//! strictly decreasing from -1, so two registries (or two tests) can never
//! interfere through shared state.
//!
//! The maps are `BTreeMap`s so batches serialize in a stable order.
//!
//! ERROR HANDLING
//! ==============
//! A save is atomic from the registry's point of view: only a successful
//! round trip reconciles identities and clears the pending maps. On any
//! failure — precondition or transport — the pending set is untouched and
//! the same save can be retried by the user.

#[cfg(test)]
#[path = "registry_test.rs"]
mod registry_test;

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::ErrorCode;
use crate::icon::Icon;
use crate::transport::{JsonTransport, TransportError};
use crate::wire::{IconRecord, SaveBatch, SaveResponse};

const SAVE_PATH: &str = "saveicon/";

/// Errors produced by a save attempt.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    /// No authenticated user context; nothing was sent.
    #[error("not signed in, cannot save")]
    NotSignedIn,

    /// All three pending lists are empty; nothing was sent.
    #[error("nothing pending, cannot save")]
    NothingPending,

    /// The request reached the network and failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The backend answered 200 with a body we could not use.
    #[error("save response invalid: {0}")]
    Response(String),
}

impl ErrorCode for SaveError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotSignedIn => "E_NOT_SIGNED_IN",
            Self::NothingPending => "E_NOTHING_PENDING",
            Self::Transport(e) => e.error_code(),
            Self::Response(_) => "E_SAVE_RESPONSE",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Transport(e) => e.retryable(),
            _ => false,
        }
    }
}

/// Tracks pending icon mutations and persists them in one batch.
pub struct IconRegistry {
    transport: Arc<dyn JsonTransport>,
    user_id: Option<i64>,
    /// Last assigned temporary id; the next one is `temp_id - 1`.
    temp_id: i64,
    to_add: BTreeMap<i64, Icon>,
    to_update: BTreeMap<i64, Icon>,
    to_delete: BTreeMap<i64, Icon>,
}

impl IconRegistry {
    #[must_use]
    pub fn new(transport: Arc<dyn JsonTransport>) -> Self {
        Self {
            transport,
            user_id: None,
            temp_id: 0,
            to_add: BTreeMap::new(),
            to_update: BTreeMap::new(),
            to_delete: BTreeMap::new(),
        }
    }

    /// Record the authenticated user the batch will be saved for.
    pub fn set_user(&mut self, user_id: i64) {
        self.user_id = Some(user_id);
    }

    /// Whether any mutation is waiting for the next save.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !(self.to_add.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty())
    }

    /// Track newly placed icons.
    ///
    /// Each icon without an identity is assigned the next temporary id, in
    /// place, so the host's copy and the tracked copy agree. Re-recording
    /// an already-tracked icon is a no-op.
    pub fn record_add(&mut self, icons: &mut [Icon]) {
        for icon in icons {
            if icon.id.is_none() {
                self.temp_id -= 1;
                icon.id = Some(self.temp_id);
            }
            if let Some(id) = icon.id {
                self.to_add.entry(id).or_insert_with(|| icon.clone());
            }
        }
    }

    /// Track updates to persisted icons. Icons without a positive identity
    /// are skipped silently, as are ids already tracked.
    pub fn record_update(&mut self, icons: &[Icon]) {
        for icon in icons {
            if let Some(id) = icon.id.filter(|&id| id > 0) {
                self.to_update.entry(id).or_insert_with(|| icon.clone());
            }
        }
    }

    /// Track deletions of persisted icons. Same filter as updates.
    pub fn record_delete(&mut self, icons: &[Icon]) {
        for icon in icons {
            if let Some(id) = icon.id.filter(|&id| id > 0) {
                self.to_delete.entry(id).or_insert_with(|| icon.clone());
            }
        }
    }

    /// Stop tracking never-saved icons. Only the add map is touched: the
    /// server never knew these, so there is nothing to delete.
    pub fn discard_add(&mut self, icons: &[Icon]) {
        for icon in icons {
            if let Some(id) = icon.id {
                self.to_add.remove(&id);
            }
        }
    }

    /// Flatten the pending maps into the wire batch. Unauthored memos
    /// become `""`; the user id is attached to every record.
    #[must_use]
    pub fn build_save_batch(&self) -> SaveBatch {
        let flatten = |icons: &BTreeMap<i64, Icon>| {
            icons.values().map(|icon| IconRecord::from_icon(icon, self.user_id)).collect()
        };
        SaveBatch {
            add: flatten(&self.to_add),
            update: flatten(&self.to_update),
            delete: flatten(&self.to_delete),
        }
    }

    /// Check the local preconditions for a save. The network is never
    /// touched when this fails.
    fn can_save(&self, batch: &SaveBatch) -> Result<(), SaveError> {
        if self.user_id.is_none() {
            warn!("save rejected: not signed in");
            return Err(SaveError::NotSignedIn);
        }
        if batch.is_empty() {
            warn!("save rejected: nothing pending");
            return Err(SaveError::NothingPending);
        }
        Ok(())
    }

    /// Persist the pending diff in one batch.
    ///
    /// On success every added icon's identity is rewritten to the one the
    /// server assigned and all pending maps are cleared; the reconciled
    /// icons are returned so the host can refresh its displayed copies.
    ///
    /// # Errors
    ///
    /// `NotSignedIn` / `NothingPending` before any network traffic,
    /// `Transport` / `Response` after. The pending set is untouched on
    /// every error path.
    pub async fn save(&mut self) -> Result<Vec<Icon>, SaveError> {
        let batch = self.build_save_batch();
        self.can_save(&batch)?;

        debug!(
            add = batch.add.len(),
            update = batch.update.len(),
            delete = batch.delete.len(),
            "saving icon batch"
        );

        let body = serde_json::to_value(&batch).map_err(|e| SaveError::Response(e.to_string()))?;
        let raw = self.transport.post_json(SAVE_PATH, body).await?;
        let response: SaveResponse =
            serde_json::from_value(raw).map_err(|e| SaveError::Response(e.to_string()))?;

        Ok(self.apply_post_save(&response.added_id_dict))
    }

    /// Rewrite added icons to their server identities, then clear all
    /// three pending maps unconditionally — a successful save flushes the
    /// whole pending state, updates and deletes included.
    pub fn apply_post_save(&mut self, added_id_dict: &HashMap<i64, i64>) -> Vec<Icon> {
        let mut reconciled = Vec::with_capacity(self.to_add.len());
        for (temp_id, mut icon) in std::mem::take(&mut self.to_add) {
            if let Some(&db_id) = added_id_dict.get(&temp_id) {
                icon.id = Some(db_id);
            }
            reconciled.push(icon);
        }
        self.to_update.clear();
        self.to_delete.clear();
        reconciled
    }
}
