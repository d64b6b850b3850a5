//! Snapshot of the last reconciled conversation list

use crate::model::ConversationSummary;
use std::sync::Arc;
use tokio::sync::RwLock;

/// True iff any summary in the snapshot has unread messages
///
/// Drives the unread badge in the UI. Pure and recomputed on demand, never
/// stored independently of the snapshot.
pub fn has_unread(snapshot: &[ConversationSummary]) -> bool {
    snapshot.iter().any(|c| c.unread_count > 0)
}

/// Holds the last reconciled conversation list
///
/// The snapshot is produced wholesale by each successful reconciliation cycle
/// and replaced as a single assignment: readers observe either the old or the
/// fully-replaced new list, never a partial one. Uniqueness of conversation
/// ids within a list is guaranteed upstream and not enforced here.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    /// Shared snapshot state
    inner: Arc<RwLock<Vec<ConversationSummary>>>,
}

impl SnapshotStore {
    /// Create a new store holding the empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a copy of the current snapshot
    pub async fn current(&self) -> Vec<ConversationSummary> {
        let snapshot = self.inner.read().await;
        snapshot.clone()
    }

    /// Replace the snapshot with a freshly reconciled list
    pub async fn replace(&self, list: Vec<ConversationSummary>) {
        let mut snapshot = self.inner.write().await;
        *snapshot = list;
    }

    /// Reset to the empty snapshot (session teardown)
    pub async fn clear(&self) {
        let mut snapshot = self.inner.write().await;
        snapshot.clear();
    }

    /// True iff the snapshot is empty
    pub async fn is_empty(&self) -> bool {
        let snapshot = self.inner.read().await;
        snapshot.is_empty()
    }

    /// True iff any conversation in the snapshot has unread messages
    pub async fn has_unread(&self) -> bool {
        let snapshot = self.inner.read().await;
        has_unread(&snapshot)
    }
}
