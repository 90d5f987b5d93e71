//! Client-side authentication state
//!
//! The backend keeps the real session in a cookie; this module mirrors what
//! the client knows about it so views and the navigation guard can react.
//!
//! # Module Structure
//!
//! - [`auth::session`](crate::auth::session) - [`SessionStore`] and the
//!   [`SessionState`] snapshot it hands out
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use tena::{ApiClient, SessionStore};
//!
//! let client = Arc::new(ApiClient::new(&config.api)?);
//! let session = SessionStore::new(client);
//!
//! // Restore a session from the cookie jar, then sign in if needed
//! session.check_status().await;
//! if !session.snapshot().is_authenticated {
//!     session.login("amara@example.com", "Secr3tPass").await?;
//! }
//! ```
//!
//! The store is passed by reference (`Arc<SessionStore>`) to whoever needs
//! it; there is no global instance.

/// Session store and state snapshot.
pub mod session;

pub use session::{SessionState, SessionStore, SessionUser};
