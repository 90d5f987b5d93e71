//! Chat conversation state and request sequencing
//!
//! [`ChatController`] owns the active conversation and the list of saved
//! sessions. Loads and sends can overlap (switching sessions while a reply is
//! pending), so each one captures a request token; a response whose token is
//! no longer current is dropped instead of overwriting newer state.

use crate::api::Backend;
use crate::types::{ChatMessage, ChatSessionSummary, Result};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, warn};

/// Greeting seeded into a fresh conversation.
pub const GREETING: &str =
    "Hello! I'm Tena, your mental wellness companion. How are you feeling today?";

/// Shown in place of a reply when the chat request fails.
pub const APOLOGY: &str = "Sorry, I'm having trouble right now. Please try again later.";

/// The conversation on screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    /// `None` until the backend assigns an id on the first reply.
    pub session_id: Option<String>,
    pub messages: Vec<ChatMessage>,
}

/// Result of [`ChatController::send`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The reply was appended to the conversation.
    Replied(ChatMessage),
    /// The conversation changed while the request was in flight.
    Stale,
    /// Blank input; nothing was sent.
    Empty,
}

/// Result of [`ChatController::open_session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Messages were loaded; holds how many.
    Loaded(usize),
    /// A newer load or send superseded this one.
    Stale,
}

#[derive(Debug, Default)]
struct ChatView {
    conversation: Conversation,
    sessions: Vec<ChatSessionSummary>,
    /// Bumped whenever the active conversation is replaced.
    conversation_token: u64,
    /// Bumped by every load and send; a load only applies if no send started after it.
    load_token: u64,
    history_token: u64,
}

pub struct ChatController {
    backend: Arc<dyn Backend>,
    view: Mutex<ChatView>,
}

impl ChatController {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            view: Mutex::new(ChatView::default()),
        }
    }

    pub fn conversation(&self) -> Conversation {
        self.view.lock().conversation.clone()
    }

    pub fn sessions(&self) -> Vec<ChatSessionSummary> {
        self.view.lock().sessions.clone()
    }

    pub fn session_id(&self) -> Option<String> {
        self.view.lock().conversation.session_id.clone()
    }

    /// Start over with only the greeting. The next send opens a new session.
    pub fn new_conversation(&self) {
        let mut view = self.view.lock();
        view.conversation_token += 1;
        view.conversation = Conversation {
            session_id: None,
            messages: vec![ChatMessage::ai(GREETING)],
        };
        debug!("Started new conversation");
    }

    /// Drop the conversation and session list (used on sign out).
    pub fn reset(&self) {
        let mut view = self.view.lock();
        view.conversation_token += 1;
        view.history_token += 1;
        view.conversation = Conversation::default();
        view.sessions.clear();
    }

    /// Send `text` in the active conversation.
    ///
    /// The user's message is shown immediately. On failure an apology is
    /// appended and the error returned, unless the conversation was replaced
    /// meanwhile, in which case the outcome is [`SendOutcome::Stale`].
    pub async fn send(&self, text: &str) -> Result<SendOutcome> {
        if text.trim().is_empty() {
            return Ok(SendOutcome::Empty);
        }

        let (token, session_id) = {
            let mut view = self.view.lock();
            view.load_token += 1;
            view.conversation.messages.push(ChatMessage::user(text));
            (
                view.conversation_token,
                view.conversation.session_id.clone(),
            )
        };

        let result = self.backend.chat(text, session_id.as_deref()).await;

        let mut view = self.view.lock();
        if view.conversation_token != token {
            debug!(token, current = view.conversation_token, "Dropping stale chat reply");
            return Ok(SendOutcome::Stale);
        }

        match result {
            Ok(reply) => {
                let message = ChatMessage::ai(reply.reply);
                view.conversation.session_id = Some(reply.session_id);
                view.conversation.messages.push(message.clone());
                Ok(SendOutcome::Replied(message))
            }
            Err(e) => {
                warn!(error = %e, "Chat request failed");
                view.conversation.messages.push(ChatMessage::ai(APOLOGY));
                Err(e)
            }
        }
    }

    /// Reload the saved-session list. Guests have none and make no request.
    pub async fn refresh_history(&self, authenticated: bool) -> Result<Vec<ChatSessionSummary>> {
        let token = {
            let mut view = self.view.lock();
            view.history_token += 1;
            if !authenticated {
                view.sessions.clear();
                return Ok(Vec::new());
            }
            view.history_token
        };

        let sessions = self.backend.get_chat_history().await?;

        let mut view = self.view.lock();
        if view.history_token == token {
            view.sessions = sessions.clone();
        } else {
            debug!(token, "Dropping stale history response");
        }
        Ok(sessions)
    }

    /// Switch to a saved session and load its messages.
    ///
    /// A failing load shows an empty conversation. The load is dropped if a
    /// message was sent in the meantime.
    pub async fn open_session(&self, session_id: &str) -> LoadOutcome {
        let (token, load) = {
            let mut view = self.view.lock();
            view.conversation_token += 1;
            view.load_token += 1;
            view.conversation = Conversation {
                session_id: Some(session_id.to_string()),
                messages: Vec::new(),
            };
            (view.conversation_token, view.load_token)
        };

        let messages = self.backend.get_messages_by_session_id(session_id).await;

        let mut view = self.view.lock();
        if view.conversation_token != token || view.load_token != load {
            debug!(session_id, token, "Dropping stale session load");
            return LoadOutcome::Stale;
        }
        let count = messages.len();
        view.conversation.messages = messages;
        LoadOutcome::Loaded(count)
    }

    /// Resolve a history entry by 1-based position or by session id.
    pub fn find_session(&self, key: &str) -> Option<ChatSessionSummary> {
        let view = self.view.lock();
        let key = key.trim();
        if let Ok(position) = key.parse::<usize>() {
            if let Some(found) = position
                .checked_sub(1)
                .and_then(|index| view.sessions.get(index))
            {
                return Some(found.clone());
            }
        }
        view.sessions.iter().find(|s| s.session_id == key).cloned()
    }
}
