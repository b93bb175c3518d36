//! Test utilities for daybrief-core
//!
//! This module provides testing infrastructure including a mock provider
//! server that speaks both the OpenAI and Gemini wire formats, plus metrics
//! fixtures for driving the orchestrator without a real task store.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tokio::sync::oneshot;

use crate::error::Result;
use crate::insight::OwnerId;
use crate::metrics::{MetricsProvider, TaskMetrics};

/// Canned summary returned by the mock OpenAI endpoint
pub const OPENAI_SUMMARY: &str =
    "Solid momentum today: ten of twenty-five todos are done, so clear the three overdue items next.";

/// Canned summary returned by the mock Gemini endpoint
pub const GEMINI_SUMMARY: &str =
    "You are trending well; finish the overdue items before picking up anything new.";

/// Mock provider server for testing and development
///
/// Serves the OpenAI chat completions route and the Gemini generateContent
/// route on one port, counts requests per provider, and fails any request
/// whose model name contains "fail".
pub struct MockProviderServer {
    addr: SocketAddr,
    state: Arc<MockState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

#[derive(Default)]
struct MockState {
    openai_calls: AtomicUsize,
    gemini_calls: AtomicUsize,
}

impl MockProviderServer {
    /// Start the mock server on an available port
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());

        let app = Router::new()
            .route("/v1/chat/completions", post(handle_chat_completions))
            .route("/v1beta/models/:model_call", post(handle_generate_content))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of OpenAI chat completion requests served
    pub fn openai_calls(&self) -> usize {
        self.state.openai_calls.load(Ordering::SeqCst)
    }

    /// Number of Gemini generateContent requests served
    pub fn gemini_calls(&self) -> usize {
        self.state.gemini_calls.load(Ordering::SeqCst)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockProviderServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// OpenAI chat completions endpoint
async fn handle_chat_completions(
    State(state): State<Arc<MockState>>,
    Json(request): Json<ChatRequest>,
) -> Response {
    state.openai_calls.fetch_add(1, Ordering::SeqCst);

    if request.model.contains("fail") {
        return (StatusCode::INTERNAL_SERVER_ERROR, "mock provider outage").into_response();
    }

    Json(serde_json::json!({
        "id": "chatcmpl-mock",
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": OPENAI_SUMMARY}}
        ]
    }))
    .into_response()
}

/// Gemini generateContent endpoint
///
/// The path parameter arrives as "<model>:generateContent".
async fn handle_generate_content(
    State(state): State<Arc<MockState>>,
    Path(model_call): Path<String>,
    Json(_request): Json<serde_json::Value>,
) -> Response {
    state.gemini_calls.fetch_add(1, Ordering::SeqCst);

    if model_call.contains("fail") {
        return (StatusCode::INTERNAL_SERVER_ERROR, "mock provider outage").into_response();
    }

    Json(serde_json::json!({
        "candidates": [
            {"content": {"role": "model", "parts": [{"text": GEMINI_SUMMARY}]}}
        ]
    }))
    .into_response()
}

// Request types for the mock server

#[derive(Debug, Deserialize)]
struct ChatRequest {
    model: String,
    #[allow(dead_code)]
    messages: Vec<serde_json::Value>,
}

/// Metrics provider returning the same snapshot for every owner
pub struct FixedMetrics {
    metrics: TaskMetrics,
}

impl FixedMetrics {
    pub fn new(metrics: TaskMetrics) -> Self {
        Self { metrics }
    }
}

impl MetricsProvider for FixedMetrics {
    fn snapshot(&self, _owner: &OwnerId) -> Result<TaskMetrics> {
        Ok(self.metrics.clone())
    }
}

/// Metrics fixture describing a mid-day working session
pub fn sample_metrics() -> TaskMetrics {
    TaskMetrics {
        date: NaiveDate::from_ymd_opt(2026, 1, 9).unwrap(),
        total_todos: 25,
        completed_count: 10,
        in_progress_count: 8,
        not_started_count: 5,
        cancelled_count: 2,
        overdue_count: 3,
        due_today_count: 4,
        upcoming_count: 6,
        completion_rate: 43.48,
        by_priority: BTreeMap::from([
            ("HIGH".to_string(), 5),
            ("LOW".to_string(), 6),
            ("MEDIUM".to_string(), 12),
            ("NONE".to_string(), 2),
        ]),
        by_status: BTreeMap::from([
            ("CANCELLED".to_string(), 2),
            ("COMPLETED".to_string(), 10),
            ("IN_PROGRESS".to_string(), 8),
            ("NOT_STARTED".to_string(), 5),
        ]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderSettings;
    use crate::providers::{GeminiClient, OpenAiClient, ProviderBackend};

    fn openai_settings(server: &MockProviderServer) -> ProviderSettings {
        ProviderSettings {
            api_key: Some("test-key".to_string()),
            base_url: Some(server.url()),
            ..ProviderSettings::openai_defaults()
        }
    }

    fn gemini_settings(server: &MockProviderServer) -> ProviderSettings {
        ProviderSettings {
            api_key: Some("test-key".to_string()),
            base_url: Some(server.url()),
            ..ProviderSettings::gemini_defaults()
        }
    }

    #[tokio::test]
    async fn test_openai_client_round_trip() {
        let server = MockProviderServer::start().await;
        let client = OpenAiClient::new(&openai_settings(&server));

        let summary = client
            .generate("Summarize briefly.", "Total todos: 3")
            .await
            .unwrap();

        assert_eq!(summary, OPENAI_SUMMARY);
        assert_eq!(server.openai_calls(), 1);
        assert_eq!(server.gemini_calls(), 0);
    }

    #[tokio::test]
    async fn test_openai_failure_surfaces_status() {
        let server = MockProviderServer::start().await;
        let client = OpenAiClient::new(&ProviderSettings {
            model: "fail-gpt".to_string(),
            ..openai_settings(&server)
        });

        let err = client
            .generate("Summarize briefly.", "Total todos: 3")
            .await
            .unwrap_err();

        assert!(err.to_string().contains("OpenAI API error"));
        assert_eq!(server.openai_calls(), 1);
    }

    #[tokio::test]
    async fn test_gemini_client_round_trip() {
        let server = MockProviderServer::start().await;
        let client = GeminiClient::new(&gemini_settings(&server));

        let summary = client
            .generate("Summarize briefly.", "Total todos: 3")
            .await
            .unwrap();

        assert_eq!(summary, GEMINI_SUMMARY);
        assert_eq!(server.gemini_calls(), 1);
        assert_eq!(server.openai_calls(), 0);
    }

    #[tokio::test]
    async fn test_gemini_failure_surfaces_status() {
        let server = MockProviderServer::start().await;
        let client = GeminiClient::new(&ProviderSettings {
            model: "fail-gemini".to_string(),
            ..gemini_settings(&server)
        });

        let err = client
            .generate("Summarize briefly.", "Total todos: 3")
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Gemini API error"));
    }

    #[tokio::test]
    async fn test_fixed_metrics_ignores_owner() {
        let provider = FixedMetrics::new(sample_metrics());

        let a = provider.snapshot(&OwnerId::from("a")).unwrap();
        let b = provider.snapshot(&OwnerId::from("b")).unwrap();
        assert_eq!(a, b);
    }
}
