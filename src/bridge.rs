//! Bridge to the locally hosted inference runtime.
//!
//! The pipeline only needs "prompt in, text out", expressed by
//! [`InferenceRuntime`]. [`OllamaBridge`] implements it over the Ollama chat
//! API with a single non-streaming user turn.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::{timeout, Duration};

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("inference runtime did not answer within {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    #[error("failed to reach inference runtime")]
    Connection(#[source] reqwest::Error),

    #[error("model {model:?} is not available on the inference runtime")]
    ModelNotFound { model: String },

    #[error("inference runtime responded with {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("inference runtime returned a malformed response")]
    MalformedResponse(#[source] reqwest::Error),
}

/// Single-turn chat against a configured model.
#[async_trait]
pub trait InferenceRuntime: Send + Sync {
    /// Identifier of the model every call is sent to.
    fn model(&self) -> &str;

    /// Sends `prompt` as one user message and waits for the complete reply.
    async fn chat(&self, prompt: &str) -> Result<String, BridgeError>;
}

pub struct BridgeConfig {
    base_url: String,
    model: String,
    timeout_ms: u64,
}

impl BridgeConfig {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            timeout_ms,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

/// [`InferenceRuntime`] backed by an Ollama server.
pub struct OllamaBridge {
    client: reqwest::Client,
    chat_url: String,
    model: String,
    timeout_ms: u64,
}

impl OllamaBridge {
    pub fn new(cfg: BridgeConfig) -> Self {
        Self::with_client(reqwest::Client::new(), cfg)
    }

    pub fn with_client(client: reqwest::Client, cfg: BridgeConfig) -> Self {
        let chat_url = format!("{}/api/chat", cfg.base_url.trim_end_matches('/'));
        Self {
            client,
            chat_url,
            model: cfg.model,
            timeout_ms: cfg.timeout_ms,
        }
    }

    async fn send(&self, prompt: &str) -> Result<String, BridgeError> {
        let payload = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
        };

        let response = self
            .client
            .post(&self.chat_url)
            .json(&payload)
            .send()
            .await
            .map_err(BridgeError::Connection)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(BridgeError::ModelNotFound {
                model: self.model.clone(),
            });
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response body>".to_string());
            return Err(BridgeError::Status {
                status,
                body: body.trim().to_string(),
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(BridgeError::MalformedResponse)?;

        Ok(parsed.message.content)
    }
}

#[async_trait]
impl InferenceRuntime for OllamaBridge {
    fn model(&self) -> &str {
        &self.model
    }

    async fn chat(&self, prompt: &str) -> Result<String, BridgeError> {
        timeout(Duration::from_millis(self.timeout_ms), self.send(prompt))
            .await
            .map_err(|_| BridgeError::Timeout {
                timeout_ms: self.timeout_ms,
            })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::post, Json, Router};
    use serde_json::{json, Value};

    async fn spawn_runtime(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", 0)).await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn bridge(base_url: &str, timeout_ms: u64) -> OllamaBridge {
        OllamaBridge::new(BridgeConfig::new(base_url, "qwen:1.8b", timeout_ms))
    }

    #[test]
    fn request_body_is_a_single_user_turn() {
        let payload = ChatRequest {
            model: "qwen:1.8b",
            messages: [ChatMessage {
                role: "user",
                content: "hello",
            }],
            stream: false,
        };
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "model": "qwen:1.8b",
                "messages": [{"role": "user", "content": "hello"}],
                "stream": false
            })
        );
    }

    #[test]
    fn chat_url_tolerates_trailing_slash() {
        let bridge = bridge("http://127.0.0.1:11434/", 1_000);
        assert_eq!(bridge.chat_url, "http://127.0.0.1:11434/api/chat");
        assert_eq!(bridge.model(), "qwen:1.8b");
    }

    #[tokio::test]
    async fn returns_message_content() {
        let app = Router::new().route(
            "/api/chat",
            post(|Json(body): Json<Value>| async move {
                let prompt = body["messages"][0]["content"].as_str().unwrap_or_default();
                Json(json!({
                    "model": body["model"],
                    "message": {"role": "assistant", "content": format!("echo: {prompt}")},
                    "done": true
                }))
            }),
        );
        let url = spawn_runtime(app).await;

        let answer = bridge(&url, 5_000).chat("ping").await.unwrap();
        assert_eq!(answer, "echo: ping");
    }

    #[tokio::test]
    async fn missing_model_is_reported() {
        let app = Router::new().route(
            "/api/chat",
            post(|| async {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({"error": "model 'qwen:1.8b' not found"})),
                )
            }),
        );
        let url = spawn_runtime(app).await;

        let err = bridge(&url, 5_000).chat("ping").await.unwrap_err();
        assert!(matches!(err, BridgeError::ModelNotFound { model } if model == "qwen:1.8b"));
    }

    #[tokio::test]
    async fn server_error_keeps_status_and_body() {
        let app = Router::new().route(
            "/api/chat",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "out of memory\n") }),
        );
        let url = spawn_runtime(app).await;

        match bridge(&url, 5_000).chat("ping").await.unwrap_err() {
            BridgeError::Status { status, body } => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(body, "out of memory");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_bodies_are_errors() {
        let app = Router::new()
            .route("/text/api/chat", post(|| async { "not json" }))
            .route(
                "/no-content/api/chat",
                post(|| async { Json(json!({"message": {}})) }),
            );
        let url = spawn_runtime(app).await;

        let err = bridge(&format!("{url}/text"), 5_000).chat("ping").await.unwrap_err();
        assert!(matches!(err, BridgeError::MalformedResponse(_)));

        let err = bridge(&format!("{url}/no-content"), 5_000)
            .chat("ping")
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn whitespace_reply_is_returned_as_is() {
        let app = Router::new().route(
            "/api/chat",
            post(|| async { Json(json!({"message": {"role": "assistant", "content": "  \n"}})) }),
        );
        let url = spawn_runtime(app).await;

        let answer = bridge(&url, 5_000).chat("ping").await.unwrap();
        assert_eq!(answer, "  \n");
    }

    #[tokio::test]
    async fn slow_runtime_times_out() {
        let app = Router::new().route(
            "/api/chat",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(json!({"message": {"role": "assistant", "content": "late"}}))
            }),
        );
        let url = spawn_runtime(app).await;

        let err = bridge(&url, 50).chat("ping").await.unwrap_err();
        assert!(matches!(err, BridgeError::Timeout { timeout_ms: 50 }));
    }

    #[tokio::test]
    async fn unreachable_runtime_is_a_connection_error() {
        let err = bridge("http://127.0.0.1:1", 5_000).chat("ping").await.unwrap_err();
        assert!(matches!(err, BridgeError::Connection(_)));
    }
}
