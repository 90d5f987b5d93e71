//! Colored output helpers for the CLI
//!
//! Provides consistent, colored terminal output for the Tena shell and
//! one-shot commands. Output can be captured into a buffer for tests.

use crate::admin::DashboardState;
use crate::types::{ChatMessage, ChatSessionSummary, HealthReport, Sender, SystemMetrics, UserRecord};
use owo_colors::OwoColorize;
use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;

#[derive(Clone)]
enum Sink {
    Terminal,
    Buffer(Arc<Mutex<String>>),
}

/// Output style configuration
#[derive(Clone)]
pub struct Output {
    /// Whether to use colored output
    pub colored: bool,
    sink: Sink,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    /// Create a new output helper with colors enabled
    pub fn new() -> Self {
        Self {
            colored: true,
            sink: Sink::Terminal,
        }
    }

    /// Create a new output helper with colors disabled
    pub fn no_color() -> Self {
        Self {
            colored: false,
            sink: Sink::Terminal,
        }
    }

    /// Plain output collected into a shared buffer instead of the terminal.
    pub fn buffered() -> (Self, Arc<Mutex<String>>) {
        let buffer = Arc::new(Mutex::new(String::new()));
        let output = Self {
            colored: false,
            sink: Sink::Buffer(buffer.clone()),
        };
        (output, buffer)
    }

    fn line(&self, text: impl AsRef<str>) {
        match &self.sink {
            Sink::Terminal => println!("{}", text.as_ref()),
            Sink::Buffer(buffer) => {
                let mut buffer = buffer.lock();
                buffer.push_str(text.as_ref());
                buffer.push('\n');
            }
        }
    }

    fn error_line(&self, text: impl AsRef<str>) {
        match &self.sink {
            Sink::Terminal => eprintln!("{}", text.as_ref()),
            Sink::Buffer(_) => self.line(text),
        }
    }

    /// Print the Tena banner
    pub fn banner(&self) {
        if self.colored {
            self.line(format!(
                "\n   {}\n   {}\n   {}\n",
                " _____  ___  _  _    _   ".bright_magenta().bold(),
                "|_   _|| __|| \\| |  /_\\  ".magenta().bold(),
                "  |_|  |___||_|\\_| /_/ \\_\\".purple().bold(),
            ));
            self.line(format!(
                "   {} {}\n",
                "Your mental wellness companion".bright_white().bold(),
                format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
            ));
        } else {
            self.line(format!(
                "\n    _____  ___  _  _    _\n   |_   _|| __|| \\| |  /_\\\n     |_|  |___||_|\\_| /_/ \\_\\\n\n   Your mental wellness companion v{}\n",
                env!("CARGO_PKG_VERSION")
            ));
        }
    }

    /// Print a success message with a checkmark
    pub fn success(&self, message: &str) {
        if self.colored {
            self.line(format!("  {} {}", "✓".green().bold(), message.green()));
        } else {
            self.line(format!("  [OK] {}", message));
        }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.colored {
            self.line(format!("  {} {}", "•".blue(), message));
        } else {
            self.line(format!("  [INFO] {}", message));
        }
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.colored {
            self.line(format!("  {} {}", "⚠".yellow().bold(), message.yellow()));
        } else {
            self.line(format!("  [WARN] {}", message));
        }
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        if self.colored {
            self.error_line(format!("  {} {}", "✗".red().bold(), message.red()));
        } else {
            self.error_line(format!("  [ERROR] {}", message));
        }
    }

    /// Print a validation error next to the field it concerns
    pub fn field_error(&self, field: &str, message: &str) {
        if self.colored {
            self.line(format!("    {} {}", format!("{}:", field).dimmed(), message.red()));
        } else {
            self.line(format!("    [{}] {}", field, message));
        }
    }

    /// Print a header for a section
    pub fn header(&self, title: &str) {
        if self.colored {
            self.line(format!("\n  {}", title.bright_white().bold().underline()));
        } else {
            self.line(format!("\n  === {} ===", title));
        }
    }

    /// Print a key-value pair
    pub fn kv(&self, key: &str, value: &str) {
        if self.colored {
            self.line(format!("    {}: {}", key.dimmed(), value.bright_white()));
        } else {
            self.line(format!("    {}: {}", key, value));
        }
    }

    /// Print a hint/tip message
    pub fn hint(&self, message: &str) {
        if self.colored {
            self.line(format!("  {}", message.dimmed().italic()));
        } else {
            self.line(format!("  [TIP] {}", message));
        }
    }

    /// Print a prompt without a trailing newline
    pub fn prompt(&self, label: &str) {
        match &self.sink {
            Sink::Terminal => {
                if self.colored {
                    print!("  {} ", format!("{}>", label).bright_magenta().bold());
                } else {
                    print!("  {}> ", label);
                }
                io::stdout().flush().ok();
            }
            Sink::Buffer(buffer) => buffer.lock().push_str(&format!("  {}> ", label)),
        }
    }

    /// One chat bubble
    pub fn message(&self, message: &ChatMessage) {
        let stamp = if message.timestamp.is_empty() {
            String::new()
        } else {
            format!("[{}] ", message.timestamp)
        };
        match (message.sender, self.colored) {
            (Sender::User, true) => self.line(format!(
                "  {}{} {}",
                stamp.dimmed(),
                "you:".bright_cyan().bold(),
                message.text
            )),
            (Sender::Ai, true) => self.line(format!(
                "  {}{} {}",
                stamp.dimmed(),
                "tena:".bright_magenta().bold(),
                message.text
            )),
            (Sender::User, false) => self.line(format!("  {}you: {}", stamp, message.text)),
            (Sender::Ai, false) => self.line(format!("  {}tena: {}", stamp, message.text)),
        }
    }

    /// Numbered list of saved conversations
    pub fn sessions(&self, sessions: &[ChatSessionSummary]) {
        if sessions.is_empty() {
            self.info("No previous conversations");
            return;
        }
        self.table_header(&["#", "Date", "Title"]);
        for (index, session) in sessions.iter().enumerate() {
            let position = (index + 1).to_string();
            self.table_row(&[&position, &session.date, &session.title]);
        }
    }

    pub fn metrics(&self, metrics: &SystemMetrics) {
        self.kv("Total users", &metrics.total_users.to_string());
        self.kv("Total sessions", &metrics.total_sessions.to_string());
        self.kv("Total messages", &metrics.total_messages.to_string());
    }

    pub fn users(&self, users: &[UserRecord]) {
        if users.is_empty() {
            self.info("No users");
            return;
        }
        self.table_header(&["Name", "Email", "Role"]);
        for user in users {
            let role = if user.is_admin { "admin" } else { "user" };
            self.table_row(&[&user.name, &user.email, role]);
        }
    }

    /// Everything the admin page shows
    pub fn dashboard(&self, state: &DashboardState) {
        if let Some(error) = &state.error {
            self.error(error);
        }
        if let Some(metrics) = &state.metrics {
            self.metrics(metrics);
        }
        self.newline();
        self.users(&state.users);
    }

    pub fn health(&self, reports: &[HealthReport]) {
        for report in reports {
            let line = format!("{} ({}): {}", report.service, report.url, report.detail);
            if report.healthy {
                self.success(&line);
            } else {
                self.error(&line);
            }
        }
    }

    /// Print a table header row
    pub fn table_header(&self, columns: &[&str]) {
        let header: String = columns
            .iter()
            .map(|c| format!("{:<15}", c))
            .collect::<Vec<_>>()
            .join(" ");
        if self.colored {
            self.line(format!("    {}", header.bright_white().bold()));
            self.line(format!("    {}", "─".repeat(columns.len() * 16).dimmed()));
        } else {
            self.line(format!("    {}", header));
            self.line(format!("    {}", "-".repeat(columns.len() * 16)));
        }
    }

    /// Print a table row
    pub fn table_row(&self, values: &[&str]) {
        let row: String = values
            .iter()
            .map(|v| format!("{:<15}", v))
            .collect::<Vec<_>>()
            .join(" ");
        self.line(format!("    {}", row));
    }

    /// Print newline
    pub fn newline(&self) {
        self.line("");
    }
}
