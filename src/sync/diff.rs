//! Snapshot diffing - detection of new-unread-message events

use crate::model::ConversationSummary;
use crate::notify::NotificationEvent;
use tracing::warn;

/// Compare two conversation snapshots and produce notification events
///
/// For each summary in `current`, an event fires iff:
/// - the conversation is absent from `previous` and has a nonzero unread
///   count (first contact must still notify), or
/// - it is present in `previous` with a strictly newer `last_message_time`
///   and a nonzero unread count.
///
/// An unchanged `last_message_time` never fires, even if the unread count
/// grew. Conversations present only in `previous` produce no event. Events
/// come out in the iteration order of `current`.
///
/// # Arguments
/// * `previous` - The snapshot committed by the last reconciliation cycle
/// * `current` - The freshly fetched snapshot
pub fn diff(
    previous: &[ConversationSummary],
    current: &[ConversationSummary],
) -> Vec<NotificationEvent> {
    // Uniqueness of ids is an upstream guarantee; a violation would make the
    // match below arbitrary, so surface it in the logs.
    for (i, session) in current.iter().enumerate() {
        if current[..i].iter().any(|other| other.id == session.id) {
            warn!("Duplicate conversation id {} in fetched snapshot", session.id);
        }
    }

    let mut events = Vec::new();

    for session in current {
        let prev = previous.iter().find(|p| p.id == session.id);

        let is_new_message = match prev {
            None => session.unread_count > 0,
            Some(prev) => {
                session.last_message_time > prev.last_message_time && session.unread_count > 0
            }
        };

        if is_new_message {
            events.push(NotificationEvent {
                peer_id: session.peer_id.clone(),
                peer_name: session.peer_name.clone(),
                preview: session.last_message.clone(),
            });
        }
    }

    events
}
