//! HTTP implementation of [`Backend`]
//!
//! All requests go through one `reqwest::Client` with a cookie store, so the
//! session cookie set by `POST /auth/login` is sent on every later call.
//! Non-success statuses become [`ApiError::Status`] carrying the backend's
//! `message`/`error` text when the body has one.

use super::Backend;
use crate::types::{
    ApiError, AuthStatus, ChatMessage, ChatReply, ChatRequest, ChatSessionSummary,
    DeleteAllUsersResponse, ErrorBody, ForgotPasswordRequest, HealthReport, LoginRequest,
    LoginResponse, MessageResponse, MessagesBody, RegisterRequest, ResetPasswordRequest, Result,
    SystemMetrics, UserRecord, UsersBody,
};
use crate::utils::config::ApiConfig;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

/// Typed client for the Tena backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    ai_service_url: String,
}

impl ApiClient {
    /// Build a client from the `[api]` configuration section.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let http = Client::builder()
            .cookie_store(true)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            http,
            base_url: trim_base(&config.base_url),
            ai_service_url: trim_base(&config.ai_service_url),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn ai_service_url(&self) -> &str {
        &self.ai_service_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `path` followed by `segment` as one percent-encoded path segment.
    fn endpoint_with_segment(&self, path: &str, segment: &str) -> String {
        let joined = self.endpoint(path);
        match Url::parse(&joined) {
            Ok(mut url) => {
                if let Ok(mut segments) = url.path_segments_mut() {
                    segments.push(segment);
                }
                url.into()
            }
            // Unparseable base: reqwest reports it when the request is sent.
            Err(_) => joined,
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.get_url(self.endpoint(path)).await
    }

    async fn get_url<T: DeserializeOwned>(&self, url: String) -> Result<T> {
        debug!(method = "GET", %url, "Sending request");
        send(self.http.get(url)).await
    }

    async fn post<B, T>(&self, path: &str, body: Option<&B>) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path);
        debug!(method = "POST", %url, "Sending request");
        let request = self.http.post(url);
        let request = match body {
            Some(body) => request.json(body),
            None => request,
        };
        send(request).await
    }

    /// Probe `GET /health` on the API and on the AI service.
    ///
    /// Unauthenticated and never fails: each service is reported on its own.
    pub async fn health(&self) -> Vec<HealthReport> {
        vec![
            self.probe("api", &self.base_url).await,
            self.probe("ai-service", &self.ai_service_url).await,
        ]
    }

    async fn probe(&self, service: &str, base: &str) -> HealthReport {
        let url = format!("{}/health", base);
        let (healthy, detail) = match self.http.get(&url).send().await {
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                let detail = serde_json::from_str::<serde_json::Value>(&body)
                    .ok()
                    .and_then(|v| v.get("status").and_then(|s| s.as_str()).map(String::from))
                    .unwrap_or_else(|| status.to_string());
                (status.is_success(), detail)
            }
            Err(e) => {
                warn!(service, %url, error = %e, "Health check failed");
                (false, e.to_string())
            }
        };

        HealthReport {
            service: service.to_string(),
            url,
            healthy,
            detail,
        }
    }
}

fn trim_base(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Send a request and decode a JSON success body.
async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(ErrorBody::into_message);
        debug!(status = status.as_u16(), ?message, "Request rejected");
        return Err(ApiError::Status {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
}

#[async_trait]
impl Backend for ApiClient {
    async fn chat(&self, message: &str, session_id: Option<&str>) -> Result<ChatReply> {
        let body = ChatRequest {
            message: message.to_string(),
            session_id: session_id.map(String::from),
        };
        self.post("/chat", Some(&body)).await
    }

    async fn get_chat_history(&self) -> Result<Vec<ChatSessionSummary>> {
        self.get("/chat/history").await
    }

    async fn try_get_messages_by_session_id(&self, session_id: &str) -> Result<Vec<ChatMessage>> {
        let url = self.endpoint_with_segment("/chat/messages", session_id);
        let body: MessagesBody = self.get_url(url).await?;
        Ok(body.into())
    }

    async fn register(&self, email: &str, password: &str, name: &str) -> Result<MessageResponse> {
        let body = RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
        };
        self.post("/auth/register", Some(&body)).await
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.post("/auth/login", Some(&body)).await
    }

    async fn logout(&self) -> Result<MessageResponse> {
        self.post::<(), _>("/auth/logout", None).await
    }

    async fn status(&self) -> Result<AuthStatus> {
        self.get("/auth/status").await
    }

    async fn forgot_password(&self, email: &str) -> Result<MessageResponse> {
        let body = ForgotPasswordRequest {
            email: email.to_string(),
        };
        self.post("/auth/forgot-password", Some(&body)).await
    }

    async fn reset_password(&self, token: &str, new_password: &str) -> Result<MessageResponse> {
        let body = ResetPasswordRequest {
            token: token.to_string(),
            new_password: new_password.to_string(),
        };
        self.post("/auth/reset-password", Some(&body)).await
    }

    async fn get_system_metrics(&self) -> Result<SystemMetrics> {
        self.get("/admin/metrics/system").await
    }

    async fn get_all_users(&self) -> Result<Vec<UserRecord>> {
        let body: UsersBody = self.get("/admin/users").await?;
        Ok(body.into())
    }

    async fn delete_all_users(&self) -> Result<DeleteAllUsersResponse> {
        self.post::<(), _>("/admin/delete-all-users", None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base: &str) -> ApiConfig {
        ApiConfig {
            base_url: base.to_string(),
            ..ApiConfig::default()
        }
    }

    #[test]
    fn test_trailing_slash_is_dropped() {
        let client = ApiClient::new(&config("http://localhost:5000/api/")).unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000/api");
        assert_eq!(
            client.endpoint("/chat/history"),
            "http://localhost:5000/api/chat/history"
        );
    }

    #[test]
    fn test_session_id_is_one_encoded_segment() {
        let client = ApiClient::new(&config("http://localhost:5000/api")).unwrap();
        assert_eq!(
            client.endpoint_with_segment("/chat/messages", "3f2a-session"),
            "http://localhost:5000/api/chat/messages/3f2a-session"
        );
        assert_eq!(
            client.endpoint_with_segment("/chat/messages", "a/b?c#d e"),
            "http://localhost:5000/api/chat/messages/a%2Fb%3Fc%23d%20e"
        );
    }

    #[test]
    fn test_ai_service_url_comes_from_config() {
        let mut cfg = config("http://localhost:5000/api");
        cfg.ai_service_url = "http://ai.internal:8000/".to_string();
        let client = ApiClient::new(&cfg).unwrap();
        assert_eq!(client.ai_service_url(), "http://ai.internal:8000");
    }
}
