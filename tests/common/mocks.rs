//! Mock backend for testing.
//!
//! [`MockBackend`] keeps accounts, conversations and admin data in memory and
//! records every call, so the session store, chat controller, dashboard and
//! shell can be tested without a server.
//!
//! Calls can be held open with a gate ([`MockBackend::gate_chat`],
//! [`MockBackend::gate_messages`]) to force responses to arrive out of order.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tena::api::Backend;
use tena::types::{
    ApiError, AuthStatus, ChatMessage, ChatReply, ChatSessionSummary, DeleteAllUsersResponse,
    LoginResponse, MessageResponse, Result, Sender, SystemMetrics, UserRecord,
};
use tokio::sync::Notify;

/// Build a `Status` error the way the HTTP client would.
pub fn status_error(status: u16, message: &str) -> ApiError {
    ApiError::Status {
        status,
        message: Some(message.to_string()),
    }
}

pub fn message(id: &str, text: &str, sender: Sender) -> ChatMessage {
    ChatMessage {
        id: id.to_string(),
        text: text.to_string(),
        sender,
        timestamp: "10:00".to_string(),
    }
}

pub fn summary(session_id: &str, title: &str) -> ChatSessionSummary {
    ChatSessionSummary {
        session_id: session_id.to_string(),
        title: title.to_string(),
        date: "2025-03-01".to_string(),
        chat_id: None,
    }
}

#[derive(Clone)]
struct Account {
    user_id: String,
    name: String,
    password: String,
    is_admin: bool,
}

#[derive(Default)]
struct MockState {
    accounts: HashMap<String, Account>,
    signed_in: Option<String>,
    status_fails: bool,
    logout_fails: bool,

    chat_fails: bool,
    chat_gate: Option<Arc<Notify>>,
    next_session: u32,
    history: Vec<ChatSessionSummary>,
    history_fails: bool,
    messages: HashMap<String, Vec<ChatMessage>>,
    message_gates: HashMap<String, Arc<Notify>>,
    status_reply: Option<AuthStatus>,

    metrics: SystemMetrics,
    metrics_fails: bool,
    delete_fails: bool,

    reset_tokens: Vec<String>,
    calls: Vec<String>,
}

/// In-memory [`Backend`] with configurable failures.
#[derive(Default)]
pub struct MockBackend {
    state: Mutex<MockState>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(self, email: &str, password: &str, is_admin: bool) -> Self {
        {
            let mut state = self.state.lock();
            let user_id = (state.accounts.len() + 1).to_string();
            state.accounts.insert(
                email.to_string(),
                Account {
                    user_id,
                    name: email.split('@').next().unwrap_or_default().to_string(),
                    password: password.to_string(),
                    is_admin,
                },
            );
        }
        self
    }

    /// Pretend the cookie jar already holds a session for `email`.
    pub fn signed_in_as(self, email: &str) -> Self {
        self.state.lock().signed_in = Some(email.to_string());
        self
    }

    pub fn with_history(self, sessions: Vec<ChatSessionSummary>) -> Self {
        self.state.lock().history = sessions;
        self
    }

    pub fn with_messages(self, session_id: &str, messages: Vec<ChatMessage>) -> Self {
        self.state
            .lock()
            .messages
            .insert(session_id.to_string(), messages);
        self
    }

    pub fn with_metrics(self, metrics: SystemMetrics) -> Self {
        self.state.lock().metrics = metrics;
        self
    }

    pub fn with_reset_token(self, token: &str) -> Self {
        self.state.lock().reset_tokens.push(token.to_string());
        self
    }

    pub fn failing_status(self) -> Self {
        self.state.lock().status_fails = true;
        self
    }

    /// Answer every status check with `status` regardless of accounts.
    pub fn with_status(self, status: AuthStatus) -> Self {
        self.state.lock().status_reply = Some(status);
        self
    }

    pub fn failing_logout(self) -> Self {
        self.state.lock().logout_fails = true;
        self
    }

    pub fn failing_chat(self) -> Self {
        self.state.lock().chat_fails = true;
        self
    }

    pub fn set_history_failing(&self, fails: bool) {
        self.state.lock().history_fails = fails;
    }

    pub fn set_metrics_failing(&self, fails: bool) {
        self.state.lock().metrics_fails = fails;
    }

    pub fn set_delete_failing(&self, fails: bool) {
        self.state.lock().delete_fails = fails;
    }

    /// Hold every chat reply until the returned gate is notified.
    pub fn gate_chat(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.state.lock().chat_gate = Some(gate.clone());
        gate
    }

    /// Hold message loads for `session_id` until the returned gate is notified.
    pub fn gate_messages(&self, session_id: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.state
            .lock()
            .message_gates
            .insert(session_id.to_string(), gate.clone());
        gate
    }

    /// How many times `name` was called.
    pub fn calls(&self, name: &str) -> usize {
        self.state.lock().calls.iter().filter(|c| *c == name).count()
    }

    pub fn account_count(&self) -> usize {
        self.state.lock().accounts.len()
    }

    pub fn password_of(&self, email: &str) -> Option<String> {
        self.state
            .lock()
            .accounts
            .get(email)
            .map(|a| a.password.clone())
    }

    fn record(&self, name: &str) {
        self.state.lock().calls.push(name.to_string());
    }

    fn current_account(&self) -> Option<Account> {
        let state = self.state.lock();
        state
            .signed_in
            .as_ref()
            .and_then(|email| state.accounts.get(email).cloned())
    }

    fn require_admin(&self) -> Result<()> {
        match self.current_account() {
            Some(account) if account.is_admin => Ok(()),
            Some(_) => Err(status_error(403, "Admin access required")),
            None => Err(status_error(401, "Unauthorized")),
        }
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn chat(&self, message: &str, session_id: Option<&str>) -> Result<ChatReply> {
        self.record("chat");
        let gate = self.state.lock().chat_gate.clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let mut state = self.state.lock();
        if state.chat_fails {
            return Err(status_error(500, "AI service unavailable"));
        }
        let session_id = match session_id {
            Some(id) => id.to_string(),
            None => {
                state.next_session += 1;
                let id = format!("session-{}", state.next_session);
                if state.signed_in.is_some() {
                    state.history.insert(0, summary(&id, message));
                }
                id
            }
        };
        Ok(ChatReply {
            reply: format!("You said: {}", message),
            session_id,
        })
    }

    async fn get_chat_history(&self) -> Result<Vec<ChatSessionSummary>> {
        self.record("get_chat_history");
        let state = self.state.lock();
        if state.history_fails {
            return Err(status_error(500, "An error occurred while retrieving history."));
        }
        if state.signed_in.is_none() {
            return Err(status_error(401, "Unauthorized"));
        }
        Ok(state.history.clone())
    }

    async fn try_get_messages_by_session_id(&self, session_id: &str) -> Result<Vec<ChatMessage>> {
        self.record("get_messages");
        let gate = self.state.lock().message_gates.get(session_id).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        self.state
            .lock()
            .messages
            .get(session_id)
            .cloned()
            .ok_or_else(|| status_error(404, "Session not found"))
    }

    async fn register(&self, email: &str, password: &str, name: &str) -> Result<MessageResponse> {
        self.record("register");
        let mut state = self.state.lock();
        if state.accounts.contains_key(email) {
            return Err(status_error(
                409,
                &format!("A user with email {} already exists", email),
            ));
        }
        let user_id = (state.accounts.len() + 1).to_string();
        state.accounts.insert(
            email.to_string(),
            Account {
                user_id,
                name: name.to_string(),
                password: password.to_string(),
                is_admin: false,
            },
        );
        Ok(MessageResponse {
            message: Some("User registered successfully".to_string()),
        })
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        self.record("login");
        let mut state = self.state.lock();
        match state.accounts.get(email) {
            Some(account) if account.password == password => {
                state.signed_in = Some(email.to_string());
                Ok(LoginResponse {
                    message: Some("Login successful".to_string()),
                    email: Some(email.to_string()),
                    user_id: None,
                })
            }
            _ => Err(status_error(401, "Invalid email or password")),
        }
    }

    async fn logout(&self) -> Result<MessageResponse> {
        self.record("logout");
        let mut state = self.state.lock();
        if state.logout_fails {
            return Err(status_error(500, "Logout failed"));
        }
        state.signed_in = None;
        Ok(MessageResponse {
            message: Some("Logged out".to_string()),
        })
    }

    async fn status(&self) -> Result<AuthStatus> {
        self.record("status");
        if self.state.lock().status_fails {
            return Err(status_error(503, "Service unavailable"));
        }
        if let Some(status) = self.state.lock().status_reply.clone() {
            return Ok(status);
        }
        let email = self.state.lock().signed_in.clone();
        Ok(match (email, self.current_account()) {
            (Some(email), Some(account)) => AuthStatus {
                is_authenticated: true,
                email: Some(email),
                user_id: Some(account.user_id),
                is_admin: account.is_admin,
            },
            _ => AuthStatus::default(),
        })
    }

    async fn forgot_password(&self, email: &str) -> Result<MessageResponse> {
        self.record("forgot_password");
        let _ = email;
        Ok(MessageResponse { message: None })
    }

    async fn reset_password(&self, token: &str, new_password: &str) -> Result<MessageResponse> {
        self.record("reset_password");
        let mut state = self.state.lock();
        if !state.reset_tokens.iter().any(|t| t == token) {
            return Err(status_error(400, "Invalid or expired token"));
        }
        state.reset_tokens.retain(|t| t != token);
        for account in state.accounts.values_mut() {
            account.password = new_password.to_string();
        }
        Ok(MessageResponse {
            message: Some("Password has been reset".to_string()),
        })
    }

    async fn get_system_metrics(&self) -> Result<SystemMetrics> {
        self.record("get_system_metrics");
        self.require_admin()?;
        let state = self.state.lock();
        if state.metrics_fails {
            return Err(status_error(500, "Metrics unavailable"));
        }
        Ok(state.metrics)
    }

    async fn get_all_users(&self) -> Result<Vec<UserRecord>> {
        self.record("get_all_users");
        self.require_admin()?;
        let state = self.state.lock();
        let mut users: Vec<UserRecord> = state
            .accounts
            .iter()
            .map(|(email, account)| UserRecord {
                id: account.user_id.clone(),
                name: account.name.clone(),
                email: email.clone(),
                is_admin: account.is_admin,
            })
            .collect();
        users.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(users)
    }

    async fn delete_all_users(&self) -> Result<DeleteAllUsersResponse> {
        self.record("delete_all_users");
        self.require_admin()?;
        let mut state = self.state.lock();
        if state.delete_fails {
            return Err(status_error(500, "Database error"));
        }
        // The requesting admin keeps their account so the dashboard can reload
        let keep = state.signed_in.clone().unwrap_or_default();
        let before = state.accounts.len();
        state.accounts.retain(|email, _| *email == keep);
        let count = (before - state.accounts.len()) as u64;
        state.history.clear();
        state.messages.clear();
        state.metrics = SystemMetrics {
            total_users: state.accounts.len() as u64,
            ..SystemMetrics::default()
        };
        Ok(DeleteAllUsersResponse {
            message: None,
            count_deleted: Some(count),
        })
    }
}
