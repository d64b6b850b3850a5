//! Notification events and local notification payloads
//!
//! A [`NotificationEvent`] is the ephemeral record of a detected
//! new-unread-message condition for one conversation. It lives for a single
//! reconciliation cycle: produced by the diff step, filtered by the foreground
//! gate, and turned into a [`LocalNotification`] payload for the platform
//! scheduler. Events are never stored or replayed.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A detected new-unread-message condition for one conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    /// Peer user id of the conversation
    pub peer_id: String,
    /// Peer display name
    pub peer_name: String,
    /// Preview text of the newest message
    pub preview: String,
}

/// Routing payload attached to a local notification
///
/// When the user taps the notification, the navigation layer routes to the
/// chat screen for `peer_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationData {
    /// Peer user id to open on tap
    pub peer_id: String,
    /// Peer display name
    pub peer_name: String,
}

/// Payload handed to the platform notification scheduler
///
/// Presented immediately (no future trigger time).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocalNotification {
    /// Notification title (the peer's name)
    pub title: String,
    /// Notification body (the message preview)
    pub body: String,
    /// Routing payload
    pub data: NotificationData,
}

impl LocalNotification {
    /// Build the presentation payload for a detected event
    pub fn from_event(event: &NotificationEvent) -> Self {
        Self {
            title: event.peer_name.clone(),
            body: event.preview.clone(),
            data: NotificationData {
                peer_id: event.peer_id.clone(),
                peer_name: event.peer_name.clone(),
            },
        }
    }
}

/// Callback invoked to present a local notification
///
/// The engine treats dispatch as fire-and-forget: a returned error is logged
/// and never propagated into the reconciliation cycle.
pub type NotificationHandler = Arc<dyn Fn(LocalNotification) -> crate::Result<()> + Send + Sync>;
