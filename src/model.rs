//! Core data model for the chat client
//!
//! These types mirror the backend's JSON wire format (camelCase fields).
//! `ConversationSummary` is the unit the sync engine reasons about: a
//! per-peer aggregate of the latest message and the unread count, never the
//! raw message history.

use serde::{Deserialize, Serialize};

/// A user profile (the authenticated user or a chat peer)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Avatar image URL
    #[serde(default)]
    pub avatar: String,
    /// Phone number, if provided
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Short self-description, if provided
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// Region string, if provided
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// A single chat message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique message identifier
    pub id: String,
    /// Sender user id
    pub sender_id: String,
    /// Receiver user id (absent in some legacy payloads)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver_id: Option<String>,
    /// Message text
    pub text: String,
    /// Send time as epoch milliseconds
    pub timestamp: i64,
}

/// Per-peer conversation aggregate returned by the conversation-list endpoint
///
/// One summary exists per conversation id within a snapshot; in this design
/// the conversation id is 1:1 with the peer's user id. `last_message_time` is
/// non-decreasing per conversation, supplied by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    /// Stable conversation identifier
    ///
    /// The backend keys sessions by peer and omits this field; the API client
    /// derives it from `peer_id` after deserialization.
    #[serde(default)]
    pub id: String,
    /// Peer user id
    #[serde(rename = "userId")]
    pub peer_id: String,
    /// Peer display name
    #[serde(rename = "userName")]
    pub peer_name: String,
    /// Peer avatar URL
    #[serde(rename = "userAvatar", default)]
    pub peer_avatar: String,
    /// Preview text of the latest message
    #[serde(default)]
    pub last_message: String,
    /// Time of the latest message as epoch milliseconds
    pub last_message_time: i64,
    /// Number of unread messages in this conversation
    pub unread_count: u32,
}
