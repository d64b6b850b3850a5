//! Backend HTTP API client
//!
//! Thin reqwest wrapper over the chat backend's JSON endpoints:
//! authentication, user profiles, message history, message sending, the
//! conversation list consumed by the sync engine, and mark-as-read.
//!
//! Non-success responses are surfaced as [`Error::Api`] carrying the body
//! text, matching the backend's plain-text error convention.

use crate::{
    Error, Result,
    model::{ConversationSummary, Message, User},
    sync::ConversationSource,
};
use serde::Serialize;
use std::future::Future;
use tracing::{debug, info};

/// Login / registration credentials
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    /// Account name
    pub name: String,
    /// Account password
    pub password: String,
}

/// Partial user-profile update for `PUT /users/{id}`
///
/// Only the populated fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    /// New display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New avatar URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// New phone number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// New self-description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// New region
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// HTTP client for the chat backend
///
/// # Example
/// ```rust,no_run
/// use pocketchat::api::ApiClient;
/// use pocketchat::config::Config;
///
/// # async fn example() -> pocketchat::Result<()> {
/// let config = Config::default();
/// let api = ApiClient::new(config.api_url.as_str());
///
/// let conversations = api.get_conversations("u1").await?;
/// for session in &conversations {
///     println!("{}: {} unread", session.peer_name, session.unread_count);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// Base URL of the backend API, without trailing slash
    base_url: String,
    /// Shared HTTP client
    client: reqwest::Client,
}

impl ApiClient {
    /// Create a new API client for the given base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Build a full endpoint URL
    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Turn a non-success response into an [`Error::Api`] with the body text
    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = if body.is_empty() {
            format!("Request failed with status {}", status)
        } else {
            body
        };
        Err(Error::Api(detail))
    }

    /// Log in with credentials, returning the authenticated user
    pub async fn login(&self, credentials: &Credentials) -> Result<User> {
        debug!("POST /auth/login for {}", credentials.name);
        let response = self
            .client
            .post(self.url("/auth/login"))
            .json(credentials)
            .send()
            .await?;
        let user: User = Self::check(response).await?.json().await?;
        info!("Logged in as {}", user.id);
        Ok(user)
    }

    /// Register a new account, returning the created user
    pub async fn register(&self, credentials: &Credentials) -> Result<User> {
        debug!("POST /auth/register for {}", credentials.name);
        let response = self
            .client
            .post(self.url("/auth/register"))
            .json(credentials)
            .send()
            .await?;
        let user: User = Self::check(response).await?.json().await?;
        info!("Registered user {}", user.id);
        Ok(user)
    }

    /// Fetch all known users
    pub async fn get_users(&self) -> Result<Vec<User>> {
        let response = self.client.get(self.url("/users")).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Update a user profile
    pub async fn update_user(&self, user_id: &str, update: &UserUpdate) -> Result<User> {
        let response = self
            .client
            .put(self.url(&format!("/users/{}", user_id)))
            .json(update)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Fetch the message history between two users
    pub async fn get_messages(&self, user_id1: &str, user_id2: &str) -> Result<Vec<Message>> {
        let response = self
            .client
            .get(self.url("/messages"))
            .query(&[("userId1", user_id1), ("userId2", user_id2)])
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Send a prepared message
    pub async fn send_message(&self, message: &Message) -> Result<Message> {
        let response = self
            .client
            .post(self.url("/messages"))
            .json(message)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Send a text message, generating the id and timestamp client-side
    pub async fn send_text(&self, sender_id: &str, receiver_id: &str, text: &str) -> Result<Message> {
        let message = Message {
            id: uuid::Uuid::new_v4().to_string(),
            sender_id: sender_id.to_string(),
            receiver_id: Some(receiver_id.to_string()),
            text: text.to_string(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        };
        self.send_message(&message).await
    }

    /// Fetch the conversation list for a user
    ///
    /// The backend keys sessions by peer and omits the conversation id, so it
    /// is derived from the peer id here (1:1 in this design).
    pub async fn get_conversations(&self, user_id: &str) -> Result<Vec<ConversationSummary>> {
        let response = self
            .client
            .get(self.url("/conversations"))
            .query(&[("userId", user_id)])
            .send()
            .await?;
        let mut sessions: Vec<ConversationSummary> = Self::check(response).await?.json().await?;

        for session in &mut sessions {
            session.id = session.peer_id.clone();
        }

        debug!("Fetched {} conversations for {}", sessions.len(), user_id);
        Ok(sessions)
    }

    /// Mark all messages from another user as read
    pub async fn mark_messages_read(&self, user_id: &str, other_user_id: &str) -> Result<()> {
        let response = self
            .client
            .put(self.url("/messages/read"))
            .query(&[("userId", user_id), ("otherUserId", other_user_id)])
            .send()
            .await?;
        Self::check(response).await?;
        debug!("Marked messages from {} as read for {}", other_user_id, user_id);
        Ok(())
    }
}

impl ConversationSource for ApiClient {
    fn fetch_conversations(
        &self,
        user_id: &str,
    ) -> impl Future<Output = Result<Vec<ConversationSummary>>> + Send {
        self.get_conversations(user_id)
    }
}
