//! Foreground-context notification gate

use crate::notify::NotificationEvent;
use std::sync::Arc;

/// Screen the user is currently viewing
///
/// Read at decision time from the navigation layer through a
/// [`ForegroundQuery`] callback, so the gate stays decoupled from any
/// concrete navigation implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForegroundLocation {
    /// The conversation list screen
    ChatList,
    /// The conversation detail screen for one peer
    Chat {
        /// Peer whose conversation is open
        peer_id: String,
    },
    /// The friends / contacts screen
    Friends,
    /// The moments feed screen
    Moments,
    /// The profile screen
    Profile,
    /// Any other screen (auth flow, compose, unknown)
    Other,
}

/// Callback queried for the currently visible screen at decision time
pub type ForegroundQuery = Arc<dyn Fn() -> ForegroundLocation + Send + Sync>;

/// Decide whether a detected event should surface a notification
///
/// Pure function of its two inputs, no memory across calls:
/// - conversation list visible: suppress (the list already shows the update)
/// - detail screen for the event's peer: suppress (the user is reading it)
/// - detail screen for a different peer, or any other screen: emit
pub fn should_notify(event: &NotificationEvent, location: &ForegroundLocation) -> bool {
    match location {
        ForegroundLocation::ChatList => false,
        ForegroundLocation::Chat { peer_id } => peer_id != &event.peer_id,
        _ => true,
    }
}
