//! Administrative dashboard model
//!
//! Aggregate metrics, the user list, and the irreversible "delete all users"
//! reset. The backend enforces admin rights; this only tracks what to show.

use crate::api::Backend;
use crate::types::{SystemMetrics, UserRecord};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{error, info, warn};

pub const LOAD_ERROR: &str = "Failed to load system metrics. Check the backend service.";
pub const DELETE_SUCCESS_DEFAULT: &str =
    "All data deleted successfully! Database reset complete.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DashboardState {
    pub metrics: Option<SystemMetrics>,
    pub users: Vec<UserRecord>,
    /// Set when the last refresh failed.
    pub error: Option<String>,
    /// Outcome of the last deletion attempt.
    pub deletion_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionOutcome {
    /// The operator did not confirm; nothing was sent.
    NotConfirmed,
    Deleted(String),
    Failed(String),
}

pub struct AdminDashboard {
    backend: Arc<dyn Backend>,
    state: Mutex<DashboardState>,
}

impl AdminDashboard {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            state: Mutex::new(DashboardState::default()),
        }
    }

    pub fn state(&self) -> DashboardState {
        self.state.lock().clone()
    }

    /// Forget everything loaded so far (used on sign out).
    pub fn reset(&self) {
        *self.state.lock() = DashboardState::default();
    }

    /// Fetch metrics, then users. Keeps the previous data on failure.
    pub async fn refresh(&self) -> bool {
        let result = async {
            let metrics = self.backend.get_system_metrics().await?;
            let users = self.backend.get_all_users().await?;
            Ok::<_, crate::types::ApiError>((metrics, users))
        }
        .await;

        let mut state = self.state.lock();
        match result {
            Ok((metrics, users)) => {
                state.metrics = Some(metrics);
                state.users = users;
                state.error = None;
                true
            }
            Err(e) => {
                error!(error = %e, "Error fetching admin metrics");
                state.error = Some(LOAD_ERROR.to_string());
                false
            }
        }
    }

    /// Wipe all users, sessions and messages, then refresh.
    ///
    /// Refuses to send anything unless `confirmed`.
    pub async fn delete_all_users(&self, confirmed: bool) -> DeletionOutcome {
        if !confirmed {
            return DeletionOutcome::NotConfirmed;
        }

        warn!("Deleting all users, sessions and messages");
        match self.backend.delete_all_users().await {
            Ok(response) => {
                let message = response
                    .message
                    .unwrap_or_else(|| DELETE_SUCCESS_DEFAULT.to_string());
                info!(count = ?response.count_deleted, "Database reset complete");
                self.state.lock().deletion_message = Some(message.clone());
                self.refresh().await;
                DeletionOutcome::Deleted(message)
            }
            Err(e) => {
                error!(error = %e, "Error deleting all users");
                let message = format!("Deletion failed: {}", e);
                self.state.lock().deletion_message = Some(message.clone());
                DeletionOutcome::Failed(message)
            }
        }
    }
}
