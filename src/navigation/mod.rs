//! Page routing and the navigation guard
//!
//! The client shows exactly one [`Page`] at a time. Explicit navigation
//! (a button, a shell command) sets the page directly; the guard then checks
//! it against the session state and may redirect:
//!
//! 1. Authenticated on a public page → `admin` for admins, else `chat`.
//! 2. Neither authenticated nor guest on a protected page → `landing`.
//! 3. On `admin` without admin rights → `chat` if authenticated, else `landing`.
//!
//! The guard does nothing while the startup status check is still running.

use crate::auth::SessionState;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Every page the client can show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Page {
    #[default]
    Landing,
    SignIn,
    SignUp,
    Forgot,
    ResetPassword,
    Chat,
    Admin,
}

impl Page {
    pub const ALL: [Page; 7] = [
        Page::Landing,
        Page::SignIn,
        Page::SignUp,
        Page::Forgot,
        Page::ResetPassword,
        Page::Chat,
        Page::Admin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Page::Landing => "landing",
            Page::SignIn => "signin",
            Page::SignUp => "signup",
            Page::Forgot => "forgot",
            Page::ResetPassword => "reset-password",
            Page::Chat => "chat",
            Page::Admin => "admin",
        }
    }

    /// Pages meant for visitors who are not signed in.
    pub fn is_public(&self) -> bool {
        matches!(
            self,
            Page::Landing | Page::SignIn | Page::SignUp | Page::Forgot | Page::ResetPassword
        )
    }

    pub fn is_protected(&self) -> bool {
        !self.is_public()
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown page '{0}'")]
pub struct UnknownPage(pub String);

impl FromStr for Page {
    type Err = UnknownPage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Page::ALL
            .into_iter()
            .find(|page| page.as_str() == wanted)
            .ok_or_else(|| UnknownPage(s.to_string()))
    }
}

/// Everything the guard looks at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GuardInput {
    pub is_authenticated: bool,
    pub is_guest: bool,
    pub is_loading: bool,
    pub is_admin: bool,
    pub current: Page,
}

impl GuardInput {
    pub fn new(session: &SessionState, current: Page) -> Self {
        Self {
            is_authenticated: session.is_authenticated,
            is_guest: session.is_guest,
            is_loading: session.is_loading,
            is_admin: session.is_admin,
            current,
        }
    }
}

/// The page to redirect to, or `None` when the current page may stay.
pub fn redirect(input: &GuardInput) -> Option<Page> {
    if input.is_loading {
        return None;
    }

    if input.is_authenticated && input.current.is_public() {
        return Some(if input.is_admin { Page::Admin } else { Page::Chat });
    }

    if !input.is_authenticated && !input.is_guest && input.current.is_protected() {
        return Some(Page::Landing);
    }

    if input.current == Page::Admin && !input.is_admin {
        return Some(if input.is_authenticated {
            Page::Chat
        } else {
            Page::Landing
        });
    }

    None
}

/// The page the client should show for `input`.
pub fn next_page(input: &GuardInput) -> Page {
    redirect(input).unwrap_or(input.current)
}

/// Current page plus a back stack.
#[derive(Debug, Clone, Default)]
pub struct Navigator {
    current: Page,
    history: Vec<Page>,
}

impl Navigator {
    pub fn new(start: Page) -> Self {
        Self {
            current: start,
            history: Vec::new(),
        }
    }

    pub fn current(&self) -> Page {
        self.current
    }

    pub fn can_go_back(&self) -> bool {
        !self.history.is_empty()
    }

    /// Explicit navigation. Returns false when already on `page`.
    pub fn navigate(&mut self, page: Page) -> bool {
        if page == self.current {
            return false;
        }
        self.history.push(self.current);
        self.current = page;
        debug!(page = %page, "Navigated");
        true
    }

    /// Return to the previous page, if any.
    pub fn back(&mut self) -> Option<Page> {
        let previous = self.history.pop()?;
        self.current = previous;
        debug!(page = %previous, "Navigated back");
        Some(previous)
    }

    /// Run the guard and apply its redirect in place (no history entry).
    pub fn apply_guard(&mut self, session: &SessionState) -> Option<Page> {
        let target = redirect(&GuardInput::new(session, self.current))?;
        debug!(from = %self.current, to = %target, "Guard redirect");
        self.current = target;
        Some(target)
    }
}
