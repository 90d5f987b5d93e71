//! Backend API abstraction
//!
//! [`Backend`] is the seam between the views (session store, chat controller,
//! admin dashboard) and the HTTP API. [`client::ApiClient`] is the real
//! implementation; tests substitute in-memory backends.
//!
//! Every call is a single attempt: no retries, no timeouts, no backoff.

pub mod client;

pub use client::ApiClient;

use crate::types::{
    AuthStatus, ChatMessage, ChatReply, ChatSessionSummary, DeleteAllUsersResponse,
    LoginResponse, MessageResponse, Result, SystemMetrics, UserRecord,
};
use async_trait::async_trait;

/// One method per backend capability.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Send a chat message. Omitting `session_id` starts a new conversation.
    async fn chat(&self, message: &str, session_id: Option<&str>) -> Result<ChatReply>;

    /// Conversations of the signed-in user, newest first.
    async fn get_chat_history(&self) -> Result<Vec<ChatSessionSummary>>;

    /// Messages of one conversation, propagating failures.
    async fn try_get_messages_by_session_id(&self, session_id: &str) -> Result<Vec<ChatMessage>>;

    /// Messages of one conversation. A failing request yields an empty list.
    async fn get_messages_by_session_id(&self, session_id: &str) -> Vec<ChatMessage> {
        match self.try_get_messages_by_session_id(session_id).await {
            Ok(messages) => messages,
            Err(e) => {
                tracing::warn!(session_id, error = %e, "Failed to load session messages");
                Vec::new()
            }
        }
    }

    /// Create an account. A taken email fails with a 409 status.
    async fn register(&self, email: &str, password: &str, name: &str) -> Result<MessageResponse>;

    /// Start an authenticated session. Bad credentials fail with a 401 status.
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse>;

    async fn logout(&self) -> Result<MessageResponse>;

    /// Current authentication state according to the session cookie.
    async fn status(&self) -> Result<AuthStatus>;

    async fn forgot_password(&self, email: &str) -> Result<MessageResponse>;

    async fn reset_password(&self, token: &str, new_password: &str) -> Result<MessageResponse>;

    async fn get_system_metrics(&self) -> Result<SystemMetrics>;

    async fn get_all_users(&self) -> Result<Vec<UserRecord>>;

    /// Wipe every user, session and message. Irreversible.
    async fn delete_all_users(&self) -> Result<DeleteAllUsersResponse>;
}
