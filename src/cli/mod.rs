//! CLI module for Tena
//!
//! Argument parsing for the `tena` binary. Without a subcommand the
//! interactive shell starts; the subcommands cover scripted, one-shot use.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod commands;
pub mod output;
pub mod shell;

use crate::utils::config::TenaConfig;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Tena - mental wellness companion
///
/// Terminal client for the Tena chat backend.
#[derive(Parser, Debug)]
#[command(
    name = "tena",
    version,
    about = "Tena - terminal client for the mental wellness chat service",
    long_about = "Chat with Tena, browse past conversations and administer the backend.\n\n\
                  Run without arguments to start the interactive shell.",
    after_help = "EXAMPLES:\n    \
                  tena                                  # Interactive shell\n    \
                  tena health                           # Check the API and AI service\n    \
                  tena chat \"I slept badly\"             # One message as a guest\n    \
                  tena history --email me@example.com   # List saved conversations\n    \
                  tena admin metrics                    # System totals (admin only)"
)]
pub struct Cli {
    /// Path to the configuration file (defaults to tena.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the backend API base URL
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Override the AI service URL
    #[arg(long, global = true, value_name = "URL")]
    pub ai_url: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Account credentials for commands that need a signed-in session.
#[derive(Args, Debug, Clone)]
pub struct Credentials {
    /// Account email
    #[arg(long, env = "TENA_EMAIL")]
    pub email: Option<String>,

    /// Account password
    #[arg(long, env = "TENA_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the interactive shell (the default)
    Shell,

    /// Check that the API and the AI service respond
    Health,

    /// Send one message and print the reply
    ///
    /// Without credentials the message is sent as a guest.
    Chat {
        /// The message to send
        message: String,

        /// Continue an existing conversation
        #[arg(short, long)]
        session: Option<String>,

        #[command(flatten)]
        credentials: Credentials,
    },

    /// List saved conversations, or print one with --open
    History {
        /// Session id or 1-based position to print
        #[arg(long)]
        open: Option<String>,

        #[command(flatten)]
        credentials: Credentials,
    },

    /// Administrative commands (admin accounts only)
    Admin {
        #[command(flatten)]
        credentials: Credentials,

        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Create an account
    Register {
        /// Display name
        #[arg(long)]
        name: String,

        /// Account email
        #[arg(long)]
        email: String,

        /// Password (at least 8 characters with upper, lower case and a digit)
        #[arg(long, env = "TENA_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Request a password reset email
    ForgotPassword {
        /// Account email
        email: String,
    },

    /// Set a new password using a reset token
    ResetPassword {
        /// Token from the reset email
        #[arg(long)]
        token: String,

        /// The new password
        #[arg(long, env = "TENA_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

/// Admin subcommands
#[derive(Subcommand, Debug)]
pub enum AdminCommands {
    /// Show total users, sessions and messages
    Metrics,

    /// List all users
    Users,

    /// Delete every user, session and message
    DeleteAllUsers {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Apply command-line overrides on top of file and environment settings.
    pub fn apply_overrides(&self, config: &mut TenaConfig) {
        if let Some(url) = &self.api_url {
            config.api.base_url = url.clone();
        }
        if let Some(url) = &self.ai_url {
            config.api.ai_service_url = url.clone();
        }
        if self.no_color {
            config.output.color = false;
        }
    }
}
