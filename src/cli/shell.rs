//! Interactive shell
//!
//! The terminal counterpart of the single-page client: one page at a time,
//! the navigation guard applied before every turn, slash commands for
//! navigation and plain text for chatting. Input comes from any async line
//! source so sessions can be scripted.

use super::output::Output;
use crate::admin::{AdminDashboard, DeletionOutcome};
use crate::api::Backend;
use crate::auth::SessionStore;
use crate::chat::{ChatController, LoadOutcome, SendOutcome};
use crate::forms::{
    FormErrors, ForgotPasswordForm, ResetPasswordForm, SignInForm, SignUpForm,
    register_error_field,
};
use crate::navigation::{Navigator, Page};
use crate::types::ApiError;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tracing::{debug, warn};

pub const REGISTERED: &str = "Registration successful! Please sign in.";
pub const RESET_LINK_SENT: &str =
    "If an account exists, a password reset link has been sent to your email.";
pub const FORGOT_FAILED: &str = "Failed to process request. Please try again.";
pub const PASSWORD_RESET: &str = "Your password has been successfully reset. Please log in.";
pub const RESET_FAILED: &str = "Failed to reset password. Token may be invalid or expired.";
pub const MISSING_TOKEN: &str = "Missing password reset token.";
pub const DELETE_WARNING: &str = "ARE YOU ABSOLUTELY SURE? This action is IRREVERSIBLE and will DELETE ALL USERS, SESSIONS, and MESSAGES from the database.";
pub const ADMIN_LOGOUT_PROMPT: &str = "Are you sure you want to log out of the Admin Dashboard?";

const HELP: &[(&str, &str)] = &[
    ("/signin", "Sign in to your account"),
    ("/signup", "Create an account"),
    ("/guest", "Chat without an account (nothing is saved)"),
    ("/forgot", "Request a password reset email"),
    ("/reset <token>", "Set a new password with a reset token"),
    ("/chat", "Go to the chat"),
    ("/new", "Start a new conversation"),
    ("/history", "List your saved conversations"),
    ("/open <n|id>", "Open a saved conversation"),
    ("/admin", "Open the admin dashboard"),
    ("/delete-all-users", "Delete every user, session and message (admin)"),
    ("/back", "Go back to the previous page"),
    ("/logout", "Sign out"),
    ("/quit", "Leave Tena"),
];

enum Flow {
    Continue,
    Quit,
}

/// Line read while filling in a form.
enum FieldInput {
    Value(String),
    /// The user typed a command instead; the form is abandoned.
    Command(String),
    Eof,
}

pub struct Shell<R> {
    lines: Lines<R>,
    session: SessionStore,
    chat: ChatController,
    dashboard: AdminDashboard,
    navigator: Navigator,
    output: Output,
    /// Page whose entry effects last ran.
    entered: Option<Page>,
    reset_token: Option<String>,
}

impl<R: AsyncBufRead + Unpin> Shell<R> {
    pub fn new(backend: Arc<dyn Backend>, input: R, output: Output) -> Self {
        Self {
            lines: input.lines(),
            session: SessionStore::new(backend.clone()),
            chat: ChatController::new(backend.clone()),
            dashboard: AdminDashboard::new(backend),
            navigator: Navigator::default(),
            output,
            entered: None,
            reset_token: None,
        }
    }

    pub fn page(&self) -> Page {
        self.navigator.current()
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn chat(&self) -> &ChatController {
        &self.chat
    }

    pub fn dashboard(&self) -> &AdminDashboard {
        &self.dashboard
    }

    /// Run until `/quit` or end of input.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        self.output.banner();
        self.session.check_status().await;

        loop {
            self.settle().await;

            let flow = match self.page() {
                Page::SignIn => self.sign_in_form().await?,
                Page::SignUp => self.sign_up_form().await?,
                Page::Forgot => self.forgot_form().await?,
                Page::ResetPassword => self.reset_form().await?,
                page => {
                    self.output.prompt(page.as_str());
                    match self.lines.next_line().await? {
                        Some(line) => self.handle_line(line.trim()).await?,
                        None => Flow::Quit,
                    }
                }
            };

            if let Flow::Quit = flow {
                break;
            }
        }

        debug!("Shell finished");
        Ok(())
    }

    /// Apply the guard, then run entry effects if the page changed.
    async fn settle(&mut self) {
        let state = self.session.snapshot();
        self.navigator.apply_guard(&state);

        let page = self.page();
        if self.entered == Some(page) {
            return;
        }
        self.entered = Some(page);
        self.enter(page).await;
    }

    async fn enter(&mut self, page: Page) {
        match page {
            Page::Landing => {
                self.output.header("Welcome to Tena");
                self.output
                    .info("A safe space to talk about how you feel, any time.");
                self.output.hint("/signin, /signup or /guest to begin. /help lists all commands.");
            }
            Page::SignIn => self.output.header("Welcome Back"),
            Page::SignUp => self.output.header("Create Account"),
            Page::Forgot => self.output.header("Forgot Password"),
            Page::ResetPassword => self.output.header("Reset Password"),
            Page::Chat => {
                self.output.header("Chat");
                if self.chat.conversation().messages.is_empty() && self.chat.session_id().is_none() {
                    self.chat.new_conversation();
                }
                self.load_history(false).await;
                for message in self.chat.conversation().messages {
                    self.output.message(&message);
                }
            }
            Page::Admin => {
                self.output.header("Admin Dashboard");
                self.dashboard.refresh().await;
                self.output.dashboard(&self.dashboard.state());
            }
        }
    }

    async fn handle_line(&mut self, line: &str) -> anyhow::Result<Flow> {
        if line.starts_with('/') {
            return self.handle_command(line).await;
        }
        if line.is_empty() {
            return Ok(Flow::Continue);
        }

        if self.page() == Page::Chat {
            self.send(line).await;
        } else {
            self.output.hint("Type /help to see what you can do here.");
        }
        Ok(Flow::Continue)
    }

    async fn handle_command(&mut self, line: &str) -> anyhow::Result<Flow> {
        let (command, argument) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command {
            "/help" => {
                self.output.header("Commands");
                for (name, description) in HELP {
                    self.output.kv(name, description);
                }
            }
            "/signin" => self.go(Page::SignIn),
            "/signup" => self.go(Page::SignUp),
            "/forgot" => self.go(Page::Forgot),
            "/reset" => {
                self.reset_token = (!argument.is_empty()).then(|| argument.to_string());
                self.go(Page::ResetPassword);
            }
            "/guest" => {
                if self.session.is_authenticated() {
                    self.output.info("You are already signed in.");
                } else {
                    self.session.continue_as_guest();
                    self.output.info("Continuing as guest. Your conversations will not be saved.");
                }
                self.go(Page::Chat);
            }
            "/chat" => self.go(Page::Chat),
            "/new" => {
                self.chat.new_conversation();
                if self.page() == Page::Chat {
                    for message in self.chat.conversation().messages {
                        self.output.message(&message);
                    }
                } else {
                    self.go(Page::Chat);
                }
            }
            "/history" => {
                if self.session.is_authenticated() {
                    self.load_history(true).await;
                } else {
                    self.output.info("Sign in to keep a history of your conversations.");
                }
            }
            "/open" => self.open(argument).await,
            "/admin" => self.go(Page::Admin),
            "/delete-all-users" => return self.delete_all_users().await,
            "/back" => {
                if self.navigator.back().is_none() {
                    self.output.info("Nowhere to go back to.");
                }
            }
            "/logout" => return self.logout().await,
            "/quit" | "/exit" => return Ok(Flow::Quit),
            other => self
                .output
                .error(&format!("Unknown command '{}'. Type /help for a list.", other)),
        }
        Ok(Flow::Continue)
    }

    fn go(&mut self, page: Page) {
        if !self.navigator.navigate(page) {
            // Re-entering the same page shows it again
            self.entered = None;
        }
    }

    async fn send(&mut self, text: &str) {
        let was_new = self.chat.session_id().is_none();
        match self.chat.send(text).await {
            Ok(SendOutcome::Replied(reply)) => {
                self.output.message(&reply);
                if was_new && self.session.is_authenticated() {
                    self.load_history(false).await;
                }
            }
            Ok(SendOutcome::Stale | SendOutcome::Empty) => {}
            Err(e) => {
                warn!(error = %e, "Message not answered");
                if let Some(apology) = self.chat.conversation().messages.last() {
                    self.output.message(apology);
                }
            }
        }
    }

    async fn load_history(&mut self, print: bool) {
        match self.chat.refresh_history(self.session.is_authenticated()).await {
            Ok(sessions) => {
                if print {
                    self.output.sessions(&sessions);
                }
            }
            Err(e) => {
                warn!(error = %e, "Error fetching chat history");
                self.output.warning("Could not load your conversation history.");
            }
        }
    }

    async fn open(&mut self, key: &str) {
        if !self.session.is_authenticated() {
            self.output.info("Sign in to open saved conversations.");
            return;
        }
        if key.is_empty() {
            self.output.error("Usage: /open <number|session-id>");
            return;
        }
        if self.chat.sessions().is_empty() {
            self.load_history(false).await;
        }
        let Some(summary) = self.chat.find_session(key) else {
            self.output.error(&format!("No conversation matches '{}'.", key));
            return;
        };

        if let LoadOutcome::Loaded(count) = self.chat.open_session(&summary.session_id).await {
            self.navigator.navigate(Page::Chat);
            self.entered = Some(Page::Chat);
            self.output.header(&summary.title);
            if count == 0 {
                self.output.info("No messages in this conversation.");
            }
            for message in self.chat.conversation().messages {
                self.output.message(&message);
            }
        }
    }

    async fn delete_all_users(&mut self) -> anyhow::Result<Flow> {
        if self.page() != Page::Admin {
            self.output.error("Open the admin dashboard first (/admin).");
            return Ok(Flow::Continue);
        }

        let Some(confirmed) = self.confirm(DELETE_WARNING).await? else {
            return Ok(Flow::Quit);
        };
        match self.dashboard.delete_all_users(confirmed).await {
            DeletionOutcome::NotConfirmed => self.output.info("Nothing was deleted."),
            DeletionOutcome::Deleted(message) => {
                self.output.success(&message);
                self.output.dashboard(&self.dashboard.state());
            }
            DeletionOutcome::Failed(message) => self.output.error(&message),
        }
        Ok(Flow::Continue)
    }

    async fn logout(&mut self) -> anyhow::Result<Flow> {
        if self.page() == Page::Admin {
            match self.confirm(ADMIN_LOGOUT_PROMPT).await? {
                Some(true) => {}
                Some(false) => return Ok(Flow::Continue),
                None => return Ok(Flow::Quit),
            }
        }

        self.session.logout().await;
        self.chat.reset();
        self.dashboard.reset();
        self.navigator.navigate(Page::Landing);
        self.output.success("Signed out.");
        Ok(Flow::Continue)
    }

    /// Ask a yes/no question. `None` at end of input.
    async fn confirm(&mut self, question: &str) -> anyhow::Result<Option<bool>> {
        self.output.warning(question);
        self.output.prompt("[y/N]");
        let Some(answer) = self.lines.next_line().await? else {
            return Ok(None);
        };
        let answer = answer.trim().to_lowercase();
        Ok(Some(answer == "y" || answer == "yes"))
    }

    async fn field(&mut self, label: &str) -> anyhow::Result<FieldInput> {
        self.output.prompt(label);
        Ok(match self.lines.next_line().await? {
            Some(line) if line.trim_start().starts_with('/') => {
                FieldInput::Command(line.trim().to_string())
            }
            Some(line) => FieldInput::Value(line),
            None => FieldInput::Eof,
        })
    }

    fn show_errors(&self, errors: &FormErrors) {
        for error in errors.iter() {
            self.output.field_error(&error.field.to_string(), error.message);
        }
    }

    async fn sign_in_form(&mut self) -> anyhow::Result<Flow> {
        let mut form = SignInForm::default();
        for (label, slot) in [("email", &mut form.email), ("password", &mut form.password)] {
            match self.field(label).await? {
                FieldInput::Value(value) => *slot = value,
                FieldInput::Command(command) => return self.handle_command(&command).await,
                FieldInput::Eof => return Ok(Flow::Quit),
            }
        }

        if let Err(errors) = form.validate() {
            self.show_errors(&errors);
            return Ok(Flow::Continue);
        }

        match self.session.login(form.email.trim(), &form.password).await {
            Ok(user) => self.output.success(&format!("Signed in as {}", user.email)),
            Err(e) => {
                if !e.is_unauthorized() {
                    warn!(error = %e, "Login failed");
                }
                self.output.error(&e.to_string());
            }
        }
        Ok(Flow::Continue)
    }

    async fn sign_up_form(&mut self) -> anyhow::Result<Flow> {
        let mut form = SignUpForm::default();
        for (label, slot) in [
            ("name", &mut form.name),
            ("email", &mut form.email),
            ("password", &mut form.password),
            ("confirm password", &mut form.confirm_password),
        ] {
            match self.field(label).await? {
                FieldInput::Value(value) => *slot = value,
                FieldInput::Command(command) => return self.handle_command(&command).await,
                FieldInput::Eof => return Ok(Flow::Quit),
            }
        }

        if let Err(errors) = form.validate() {
            self.show_errors(&errors);
            return Ok(Flow::Continue);
        }

        let result = self
            .session
            .register(form.email.trim(), &form.password, form.name.trim())
            .await;
        match result {
            Ok(_) => {
                self.output.success(REGISTERED);
                self.go(Page::SignIn);
            }
            Err(e) => match register_error_field(&e) {
                Some(field_error) => self
                    .output
                    .field_error(&field_error.field.to_string(), field_error.message),
                None => self.output.error(&e.to_string()),
            },
        }
        Ok(Flow::Continue)
    }

    async fn forgot_form(&mut self) -> anyhow::Result<Flow> {
        let mut form = ForgotPasswordForm::default();
        match self.field("email").await? {
            FieldInput::Value(value) => form.email = value,
            FieldInput::Command(command) => return self.handle_command(&command).await,
            FieldInput::Eof => return Ok(Flow::Quit),
        }

        if let Err(errors) = form.validate() {
            self.show_errors(&errors);
            return Ok(Flow::Continue);
        }

        match self.session.forgot_password(form.email.trim()).await {
            Ok(response) => {
                self.output
                    .success(&response.message.unwrap_or_else(|| RESET_LINK_SENT.to_string()));
                self.go(Page::SignIn);
            }
            Err(e) => {
                warn!(error = %e, "Forgot password request failed");
                self.output
                    .error(&status_message(&e).unwrap_or_else(|| FORGOT_FAILED.to_string()));
            }
        }
        Ok(Flow::Continue)
    }

    async fn reset_form(&mut self) -> anyhow::Result<Flow> {
        let Some(token) = self.reset_token.clone() else {
            self.output.error(MISSING_TOKEN);
            self.output.hint("Use /reset <token> with the token from your email, or /back.");
            if self.navigator.back().is_none() {
                self.navigator.navigate(Page::Landing);
            }
            return Ok(Flow::Continue);
        };

        let mut form = ResetPasswordForm {
            token,
            ..ResetPasswordForm::default()
        };
        for (label, slot) in [
            ("new password", &mut form.password),
            ("confirm password", &mut form.confirm_password),
        ] {
            match self.field(label).await? {
                FieldInput::Value(value) => *slot = value,
                FieldInput::Command(command) => return self.handle_command(&command).await,
                FieldInput::Eof => return Ok(Flow::Quit),
            }
        }

        if let Err(errors) = form.validate() {
            self.show_errors(&errors);
            return Ok(Flow::Continue);
        }

        match self.session.reset_password(&form.token, &form.password).await {
            Ok(response) => {
                self.output
                    .success(&response.message.unwrap_or_else(|| PASSWORD_RESET.to_string()));
                self.reset_token = None;
                self.go(Page::SignIn);
            }
            Err(e) => {
                warn!(error = %e, "Password reset failed");
                self.output
                    .error(&status_message(&e).unwrap_or_else(|| RESET_FAILED.to_string()));
            }
        }
        Ok(Flow::Continue)
    }
}

/// The backend's own message for a rejected request.
fn status_message(error: &ApiError) -> Option<String> {
    match error {
        ApiError::Status { message, .. } => message.clone(),
        _ => None,
    }
}
