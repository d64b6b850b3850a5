//! Conversation synchronization subsystem
//!
//! This module keeps the local conversation snapshot in step with the backend
//! and decides when an incoming message should surface a local notification.
//! There is no push channel; near-real-time delivery is simulated by a
//! sequence-numbered poll-diff loop.
//!
//! The module is organized into submodules:
//! - `snapshot` - holder of the last reconciled conversation list
//! - `diff` - detection of new-unread-message events between two snapshots
//! - `gate` - foreground-context suppression of redundant notifications
//! - `engine` - the poll scheduler and reconciliation cycle

// Submodules
pub mod diff;
pub mod engine;
pub mod gate;
pub mod snapshot;

// Re-export commonly used types
pub use engine::{ConversationSource, SyncEngine};
pub use gate::{ForegroundLocation, ForegroundQuery};
pub use snapshot::SnapshotStore;

// Re-export main functions
pub use diff::diff;
pub use gate::should_notify;
pub use snapshot::has_unread;
