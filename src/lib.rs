//! PocketChat - conversation synchronization and notification core
//!
//! This library provides the client-side engine of the PocketChat mobile
//! messenger: a polling loop that keeps a local view of "which conversations
//! have new messages" up to date and decides, without a real push channel,
//! when an incoming message should surface a local notification.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod api;
pub mod config;
pub mod model;
pub mod notify;
pub mod sync;

/// Result type alias for PocketChat operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for PocketChat operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Backend API returned a non-success response
    #[error("API error: {0}")]
    Api(String),

    /// Notification scheduling error
    #[error("Notification error: {0}")]
    Notification(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    /// General I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Initialize the PocketChat library with logging
pub fn init() {
    tracing_subscriber::fmt::init();
}

#[cfg(test)]
mod tests;
