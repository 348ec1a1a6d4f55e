//! HTTP client for the chat service.
//!
//! `ChatClient` implements [`ChatTransport`] over reqwest and adds the
//! read-only endpoints (`/health`, `/conversation/{id}`). `HttpBeacon`
//! implements [`Beacon`] for `/chat-close`.
//!
//! # Usage
//!
//! ```rust,no_run
//! use twin_core::client::ChatClient;
//!
//! #[tokio::main]
//! async fn main() -> twin_core::Result<()> {
//!     let client = ChatClient::new("http://localhost:8000")?;
//!     let health = client.health().await?;
//!     println!("{}", health.status);
//!     Ok(())
//! }
//! ```

mod beacon;

pub use beacon::HttpBeacon;

use async_trait::async_trait;
use reqwest::Url;
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::transport::ChatTransport;
use crate::types::{ChatRequest, ChatResponse, ConversationResponse, HealthResponse};

/// Default timeout for a single exchange.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// API client for the chat service
#[derive(Clone)]
pub struct ChatClient {
    /// Base URL, without trailing slash
    base_url: String,
    /// HTTP client
    client: reqwest::Client,
}

impl ChatClient {
    /// Create a client with the default request timeout
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a client whose requests give up after `timeout`
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check if the service is up
    pub async fn health(&self) -> Result<HealthResponse> {
        self.get(&["health"]).await
    }

    /// Stored transcript for a session
    pub async fn conversation(&self, session_id: &str) -> Result<ConversationResponse> {
        self.get(&["conversation", session_id]).await
    }

    /// One chat exchange
    pub async fn chat(&self, req: &ChatRequest) -> Result<ChatResponse> {
        self.post(&["chat"], req).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // HTTP Helpers
    // ─────────────────────────────────────────────────────────────────────────

    /// Base URL extended by `segments`, each percent-encoded as one path segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| Error::Other(format!("Invalid base URL {}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| Error::Other(format!("Base URL cannot take a path: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        self.request(reqwest::Method::GET, segments, Option::<()>::None)
            .await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T> {
        self.request(reqwest::Method::POST, segments, Some(body)).await
    }

    async fn request<T: DeserializeOwned, B: Serialize>(
        &self,
        method: reqwest::Method,
        segments: &[&str],
        body: Option<B>,
    ) -> Result<T> {
        let url = self.endpoint(segments)?;
        debug!("API request: {} {}", method, url);

        let mut req = self.client.request(method, url);
        if let Some(ref b) = body {
            req = req.json(b);
        }

        let resp = req.send().await?;

        let status = resp.status();
        if status.is_success() {
            let data: T = resp.json().await?;
            Ok(data)
        } else {
            let error_text = resp.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %error_text, "Backend error");
            Err(Error::transport(Some(status.as_u16()), error_text))
        }
    }
}

#[async_trait]
impl ChatTransport for ChatClient {
    async fn exchange(&self, request: &ChatRequest) -> Result<ChatResponse> {
        self.chat(request).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::types::CloseRequest;
    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use std::sync::{Arc, Mutex};

    /// Minimal stand-in for the chat service.
    #[derive(Default)]
    pub(crate) struct FakeService {
        pub chats: Mutex<Vec<ChatRequest>>,
        pub closes: Mutex<Vec<CloseRequest>>,
        pub fail_next: Mutex<Option<(u16, String)>>,
    }

    async fn chat(
        State(svc): State<Arc<FakeService>>,
        Json(req): Json<ChatRequest>,
    ) -> std::result::Result<Json<ChatResponse>, (StatusCode, String)> {
        if let Some((status, body)) = svc.fail_next.lock().unwrap().take() {
            return Err((StatusCode::from_u16(status).unwrap(), body));
        }
        let reply = ChatResponse {
            response: format!("echo: {}", req.message),
            session_id: format!("S{}", svc.chats.lock().unwrap().len() + 1),
            email_id: Some(req.email_id.clone()),
        };
        svc.chats.lock().unwrap().push(req);
        Ok(Json(reply))
    }

    async fn chat_close(State(svc): State<Arc<FakeService>>, Json(req): Json<CloseRequest>) {
        svc.closes.lock().unwrap().push(req);
    }

    async fn health() -> Json<serde_json::Value> {
        Json(serde_json::json!({"status": "healthy", "use_s3": false}))
    }

    async fn conversation(Path(session_id): Path<String>) -> Json<serde_json::Value> {
        Json(serde_json::json!({
            "session_id": session_id,
            "messages": [
                {"role": "user", "content": "hello", "timestamp": "2025-01-01T00:00:00"},
                {"role": "assistant", "content": "hi there", "timestamp": "2025-01-01T00:00:01"}
            ]
        }))
    }

    /// Serve a fake chat service on an ephemeral port.
    pub(crate) async fn spawn_service() -> (String, Arc<FakeService>) {
        let svc = Arc::new(FakeService::default());
        let app = Router::new()
            .route("/chat", post(chat))
            .route("/chat-close", post(chat_close))
            .route("/health", get(health))
            .route("/conversation/{session_id}", get(conversation))
            .with_state(Arc::clone(&svc));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}", addr), svc)
    }

    #[tokio::test]
    async fn test_chat_exchange() {
        let (url, svc) = spawn_service().await;
        let client = ChatClient::new(format!("{}/", url)).unwrap();
        assert_eq!(client.base_url(), url);

        let req = ChatRequest {
            message: "My email is: a@b.com".into(),
            email_id: "a@b.com".into(),
            session_id: "a@b.com".into(),
        };
        let resp = client.exchange(&req).await.unwrap();

        assert_eq!(resp.response, "echo: My email is: a@b.com");
        assert_eq!(resp.session_id, "S1");
        assert_eq!(svc.chats.lock().unwrap()[0], req);
    }

    #[tokio::test]
    async fn test_non_success_carries_body() {
        let (url, svc) = spawn_service().await;
        *svc.fail_next.lock().unwrap() = Some((500, "model unavailable".into()));
        let client = ChatClient::new(url).unwrap();

        let req = ChatRequest {
            message: "hi".into(),
            email_id: "a@b.com".into(),
            session_id: "S1".into(),
        };
        match client.chat(&req).await {
            Err(Error::Transport { status, body }) => {
                assert_eq!(status, Some(500));
                assert_eq!(body, "model unavailable");
            }
            other => panic!("expected transport error, got {:?}", other.map(|r| r.response)),
        }
    }

    #[tokio::test]
    async fn test_unreachable_service_is_transport_error() {
        let client =
            ChatClient::with_timeout("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let req = ChatRequest {
            message: "hi".into(),
            email_id: "a@b.com".into(),
            session_id: "a@b.com".into(),
        };
        let err = client.chat(&req).await.unwrap_err();
        assert!(err.is_transport());
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let client = ChatClient::new("http://svc/api/").unwrap();
        let url = client.endpoint(&["conversation", "a?x#y@b.com"]).unwrap();
        assert_eq!(url.path(), "/api/conversation/a%3Fx%23y@b.com");
        assert!(url.query().is_none());
        assert!(url.fragment().is_none());
    }

    #[tokio::test]
    async fn test_conversation_id_with_reserved_characters() {
        let (url, _svc) = spawn_service().await;
        let client = ChatClient::new(url).unwrap();

        let conv = client.conversation("a?x@b.com").await.unwrap();
        assert_eq!(conv.session_id, "a?x@b.com");
    }

    #[tokio::test]
    async fn test_health_and_conversation() {
        let (url, _svc) = spawn_service().await;
        let client = ChatClient::new(url).unwrap();

        let health = client.health().await.unwrap();
        assert_eq!(health.status, "healthy");
        assert_eq!(health.use_s3, Some(false));

        let conv = client.conversation("a@b.com").await.unwrap();
        assert_eq!(conv.session_id, "a@b.com");
        assert_eq!(conv.messages.len(), 2);
        assert_eq!(conv.messages[1].content, "hi there");
    }
}
