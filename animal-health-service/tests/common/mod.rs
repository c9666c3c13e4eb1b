#![allow(dead_code)]

use animal_health_service::config::{
    AdvisoryConfig, CorsConfig, GeminiSettings, ObservabilityConfig,
};
use animal_health_service::services::{AdvisoryDispatcher, TextProvider};
use animal_health_service::startup::{build_dispatcher, Application};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use service_core::config::Config as CoreConfig;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub client: reqwest::Client,
}

/// Configuration for a fallback-mode instance on a random port.
pub fn test_config() -> AdvisoryConfig {
    AdvisoryConfig {
        common: CoreConfig { port: 0 },
        gemini: GeminiSettings {
            api_key: None,
            api_base: "http://127.0.0.1:9/v1beta".to_string(),
            text_model: "gemini-pro".to_string(),
            request_timeout_secs: 5,
        },
        cors: CorsConfig {
            allowed_origins: vec![],
        },
        observability: ObservabilityConfig {
            log_level: "debug".to_string(),
            otlp_endpoint: None,
        },
    }
}

impl TestApp {
    /// Spawn with no credential: every advisory call uses the fallback templates.
    pub async fn spawn() -> Self {
        Self::spawn_with_config(test_config()).await
    }

    /// Spawn with the dispatcher wired exactly as in production.
    pub async fn spawn_with_config(config: AdvisoryConfig) -> Self {
        let dispatcher = build_dispatcher(&config).expect("Failed to build dispatcher");
        Self::spawn_with(config, dispatcher).await
    }

    /// Spawn with an injected provider.
    pub async fn spawn_with_provider(provider: Arc<dyn TextProvider>) -> Self {
        Self::spawn_with(test_config(), AdvisoryDispatcher::new(Some(provider))).await
    }

    async fn spawn_with(config: AdvisoryConfig, dispatcher: AdvisoryDispatcher) -> Self {
        let app = Application::build_with_dispatcher(config, dispatcher)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            client,
        }
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.address, path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }
}

/// What the fake Gemini endpoint answers with.
#[derive(Clone)]
pub struct FakeGeminiReply {
    pub status: StatusCode,
    pub body: Value,
    pub delay: Option<Duration>,
}

impl FakeGeminiReply {
    pub fn text(text: &str) -> Self {
        Self {
            status: StatusCode::OK,
            body: json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": text}]},
                    "finishReason": "STOP"
                }],
                "usageMetadata": {"promptTokenCount": 20, "candidatesTokenCount": 8}
            }),
            delay: None,
        }
    }

    pub fn error(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            body,
            delay: None,
        }
    }

    /// Hold the response back for `delay` before answering.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

/// A request captured by the fake Gemini endpoint.
#[derive(Debug, Clone)]
pub struct CapturedCall {
    pub path: String,
    pub api_key: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct FakeGeminiState {
    reply: FakeGeminiReply,
    calls: Arc<Mutex<Vec<CapturedCall>>>,
}

/// In-process stand-in for the Gemini REST API.
pub struct FakeGemini {
    pub api_base: String,
    calls: Arc<Mutex<Vec<CapturedCall>>>,
}

impl FakeGemini {
    pub async fn start(reply: FakeGeminiReply) -> Self {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let state = FakeGeminiState {
            reply,
            calls: calls.clone(),
        };

        let router = Router::new()
            .route("/v1beta/models/:call", post(fake_generate))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake Gemini listener");
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });

        FakeGemini {
            api_base: format!("http://127.0.0.1:{}/v1beta", port),
            calls,
        }
    }

    pub fn calls(&self) -> Vec<CapturedCall> {
        self.calls.lock().unwrap().clone()
    }
}

async fn fake_generate(
    State(state): State<FakeGeminiState>,
    Path(call): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.calls.lock().unwrap().push(CapturedCall {
        path: call,
        api_key: headers
            .get("x-goog-api-key")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });

    if let Some(delay) = state.reply.delay {
        tokio::time::sleep(delay).await;
    }

    (state.reply.status, Json(state.reply.body.clone()))
}
