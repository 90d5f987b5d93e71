use serde::{Deserialize, Deserializer, Serialize};

// ============= API Request/Response Types =============

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: Option<String>,
}

/// Reply to `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    /// Conversation identifier; echo it back to continue the same session.
    pub session_id: String,
}

/// One entry of `GET /chat/history`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSessionSummary {
    pub session_id: String,
    pub title: String,
    pub date: String,
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub chat_id: Option<String>,
}

// ============= Chat Messages =============

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    /// The backend stores AI turns as `bot`.
    #[serde(alias = "bot", alias = "assistant")]
    Ai,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub text: String,
    pub sender: Sender,
    /// Display time (`HH:MM`).
    #[serde(default)]
    pub timestamp: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self::local(text, Sender::User)
    }

    pub fn ai(text: impl Into<String>) -> Self {
        Self::local(text, Sender::Ai)
    }

    fn local(text: impl Into<String>, sender: Sender) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            sender,
            timestamp: chrono::Local::now().format("%H:%M").to_string(),
        }
    }
}

/// `GET /chat/messages/{id}` wraps the list in `{"messages": [...]}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum MessagesBody {
    Wrapped { messages: Vec<ChatMessage> },
    Bare(Vec<ChatMessage>),
}

impl From<MessagesBody> for Vec<ChatMessage> {
    fn from(body: MessagesBody) -> Self {
        match body {
            MessagesBody::Wrapped { messages } => messages,
            MessagesBody::Bare(messages) => messages,
        }
    }
}

// ============= Authentication Types =============

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub user_id: Option<String>,
}

/// Reply to `GET /auth/status`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AuthStatus {
    #[serde(rename = "isAuthenticated", alias = "is_authenticated")]
    pub is_authenticated: bool,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

/// Generic `{"message": "..."}` confirmation body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

// ============= Admin Types =============

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemMetrics {
    pub total_users: u64,
    #[serde(alias = "total_chats")]
    pub total_sessions: u64,
    pub total_messages: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum UsersBody {
    Wrapped { users: Vec<UserRecord> },
    Bare(Vec<UserRecord>),
}

impl From<UsersBody> for Vec<UserRecord> {
    fn from(body: UsersBody) -> Self {
        match body {
            UsersBody::Wrapped { users } => users,
            UsersBody::Bare(users) => users,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DeleteAllUsersResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub count_deleted: Option<u64>,
}

// ============= Health =============

/// Result of one `GET /health` probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthReport {
    pub service: String,
    pub url: String,
    pub healthy: bool,
    pub detail: String,
}

// ============= Error Types =============

/// Error body shapes used by the backend: `{"message": ..}` or `{"error": ..}`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ErrorBody {
    pub(crate) fn into_message(self) -> Option<String> {
        self.message
            .or(self.error)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{}", describe_status(.status, .message))]
    Status {
        status: u16,
        message: Option<String>,
    },

    #[error("Failed to parse response: {0}")]
    Decode(String),
}

fn describe_status(status: &u16, message: &Option<String>) -> String {
    match message {
        Some(message) => message.clone(),
        None => format!("Request failed with status {}", status),
    }
}

impl ApiError {
    /// HTTP status for [`ApiError::Status`], `None` otherwise.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network(_))
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    pub fn is_forbidden(&self) -> bool {
        self.status() == Some(403)
    }

    pub fn is_conflict(&self) -> bool {
        self.status() == Some(409)
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

// ============= Serde helpers =============

/// The backend uses integer primary keys in some places and strings in others.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(text) => text,
            RawId::Number(number) => number.to_string(),
        }
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(String::from)
}

fn deserialize_opt_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<RawId>::deserialize(deserializer).map(|raw| raw.map(String::from))
}
