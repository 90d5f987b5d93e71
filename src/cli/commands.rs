//! One-shot subcommands
//!
//! Each command does its work and exits. Commands that need an account sign
//! in first within the same process; the cookie store keeps the session for
//! the following calls.

use super::output::Output;
use super::shell::Shell;
use super::{AdminCommands, Commands, Credentials};
use crate::admin::{AdminDashboard, DeletionOutcome};
use crate::api::{ApiClient, Backend};
use crate::auth::{SessionStore, SessionUser};
use crate::chat::ChatController;
use crate::forms::{ForgotPasswordForm, ResetPasswordForm, SignInForm, SignUpForm};
use crate::types::ChatMessage;
use anyhow::{Context, bail};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

/// Run `command`, or the interactive shell when there is none.
pub async fn execute(
    command: Option<Commands>,
    client: ApiClient,
    output: &Output,
) -> anyhow::Result<()> {
    let command = command.unwrap_or(Commands::Shell);
    let backend: Arc<dyn Backend> = Arc::new(client.clone());

    match command {
        Commands::Shell => {
            let stdin = BufReader::new(tokio::io::stdin());
            let mut shell = Shell::new(backend, stdin, output.clone());
            shell.run().await
        }

        Commands::Health => {
            output.header("Service health");
            let reports = client.health().await;
            output.health(&reports);
            if reports.iter().all(|r| r.healthy) {
                Ok(())
            } else {
                bail!("One or more services are unavailable")
            }
        }

        Commands::Chat {
            message,
            session,
            credentials,
        } => {
            if credentials.email.is_some() {
                sign_in(&SessionStore::new(backend.clone()), &credentials).await?;
            }
            let reply = backend
                .chat(&message, session.as_deref())
                .await
                .context("Chat request failed")?;
            output.message(&ChatMessage::ai(reply.reply));
            output.kv("session", &reply.session_id);
            Ok(())
        }

        Commands::History { open, credentials } => {
            let session = SessionStore::new(backend.clone());
            sign_in(&session, &credentials).await?;

            let chat = ChatController::new(backend.clone());
            let sessions = chat
                .refresh_history(true)
                .await
                .context("Could not load conversation history")?;

            match open {
                None => output.sessions(&sessions),
                Some(key) => {
                    let Some(summary) = chat.find_session(&key) else {
                        bail!("No conversation matches '{}'", key);
                    };
                    let messages = backend
                        .try_get_messages_by_session_id(&summary.session_id)
                        .await
                        .context("Could not load conversation")?;
                    output.header(&summary.title);
                    for message in &messages {
                        output.message(message);
                    }
                }
            }
            Ok(())
        }

        Commands::Admin {
            credentials,
            command,
        } => {
            let session = SessionStore::new(backend.clone());
            sign_in(&session, &credentials).await?;
            admin(command, backend, output).await
        }

        Commands::Register {
            name,
            email,
            password,
        } => {
            let form = SignUpForm {
                name,
                email,
                confirm_password: password.clone(),
                password,
            };
            form.validate()?;

            let message = SessionStore::new(backend)
                .register(form.email.trim(), &form.password, form.name.trim())
                .await
                .context("Registration failed")?;
            output.success(&message);
            Ok(())
        }

        Commands::ForgotPassword { email } => {
            let form = ForgotPasswordForm { email };
            form.validate()?;

            let response = SessionStore::new(backend)
                .forgot_password(form.email.trim())
                .await
                .context("Password reset request failed")?;
            output.success(
                response
                    .message
                    .as_deref()
                    .unwrap_or(super::shell::RESET_LINK_SENT),
            );
            Ok(())
        }

        Commands::ResetPassword { token, password } => {
            let form = ResetPasswordForm {
                token,
                confirm_password: password.clone(),
                password,
            };
            form.validate()?;

            let response = SessionStore::new(backend)
                .reset_password(&form.token, &form.password)
                .await
                .context("Password reset failed")?;
            output.success(
                response
                    .message
                    .as_deref()
                    .unwrap_or(super::shell::PASSWORD_RESET),
            );
            Ok(())
        }
    }
}

async fn admin(
    command: AdminCommands,
    backend: Arc<dyn Backend>,
    output: &Output,
) -> anyhow::Result<()> {
    match command {
        AdminCommands::Metrics => {
            let metrics = backend
                .get_system_metrics()
                .await
                .context("Could not load system metrics")?;
            output.header("System metrics");
            output.metrics(&metrics);
        }
        AdminCommands::Users => {
            let users = backend
                .get_all_users()
                .await
                .context("Could not load users")?;
            output.header("Users");
            output.users(&users);
        }
        AdminCommands::DeleteAllUsers { yes } => {
            let confirmed = yes || confirm_on_stdin(output).await?;
            match AdminDashboard::new(backend).delete_all_users(confirmed).await {
                DeletionOutcome::NotConfirmed => output.info("Nothing was deleted."),
                DeletionOutcome::Deleted(message) => output.success(&message),
                DeletionOutcome::Failed(message) => bail!(message),
            }
        }
    }
    Ok(())
}

async fn confirm_on_stdin(output: &Output) -> anyhow::Result<bool> {
    output.warning(super::shell::DELETE_WARNING);
    output.prompt("[y/N]");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let answer = lines.next_line().await?.unwrap_or_default();
    let answer = answer.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}

async fn sign_in(session: &SessionStore, credentials: &Credentials) -> anyhow::Result<SessionUser> {
    let (Some(email), Some(password)) = (&credentials.email, &credentials.password) else {
        bail!("This command needs --email and --password (or TENA_EMAIL and TENA_PASSWORD)");
    };

    let form = SignInForm {
        email: email.clone(),
        password: password.clone(),
    };
    form.validate()?;

    let user = session
        .login(form.email.trim(), &form.password)
        .await
        .context("Sign in failed")?;
    info!(email = %user.email, "Signed in for command");
    Ok(user)
}
