//! # Tena - mental wellness chat client
//!
//! Client library and terminal front end for the Tena chat service: guests and
//! signed-in users talk to an AI companion, signed-in users keep a history of
//! conversations, and administrators can inspect and reset the backend.
//!
//! ## Overview
//!
//! Tena can be used in two ways:
//!
//! 1. **As a terminal client** - Run the `tena` binary
//! 2. **As a library** - Drive the session, chat and admin views from your own front end
//!
//! ### Basic Example
//!
//! ```rust,ignore
//! use tena::{ApiClient, ChatController, TenaConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = TenaConfig::load(None)?;
//!     let client = Arc::new(ApiClient::new(&config.api)?);
//!
//!     let chat = ChatController::new(client);
//!     chat.new_conversation();
//!     chat.send("I couldn't sleep last night").await?;
//!
//!     for message in chat.conversation().messages {
//!         println!("{:?}: {}", message.sender, message.text);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`api`] - Backend trait and its HTTP client
//! - [`auth`] - Session state (authenticated, guest, admin)
//! - [`navigation`] - Pages and the navigation guard
//! - [`chat`] - Conversation state and request sequencing
//! - [`admin`] - Admin dashboard model
//! - [`forms`] - Client-side form validation
//! - [`cli`] - Argument parsing, interactive shell and terminal output
//! - [`types`] - Wire types and error handling
//!
//! ## Configuration
//!
//! Settings come from `tena.toml` (optional), then `TENA_*` environment
//! variables, then command-line flags.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// Admin dashboard: metrics, users and the database reset.
pub mod admin;
/// Backend trait and HTTP client.
pub mod api;
/// Authentication session state.
pub mod auth;
/// Chat conversation state.
pub mod chat;
/// Command-line interface and interactive shell.
pub mod cli;
/// Form validation rules.
pub mod forms;
/// Pages and the navigation guard.
pub mod navigation;
/// Core types (requests, responses, errors).
pub mod types;
/// Configuration and logging setup.
pub mod utils;

// Re-export commonly used types
pub use admin::AdminDashboard;
pub use api::{ApiClient, Backend};
pub use auth::{SessionState, SessionStore, SessionUser};
pub use chat::{ChatController, Conversation};
pub use navigation::{Navigator, Page};
pub use types::{ApiError, Result};
pub use utils::config::{ConfigError, TenaConfig};
