//! Test utilities: a scripted model and an in-process server.

use crate::config::Config;
use crate::model::{ContentPart, GenerativeModel, ModelError};
use async_trait::async_trait;
use axum_test::TestServer;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// reqwest is built without a default TLS provider. Safe to call from every test.
pub fn install_crypto_provider() {
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
}

enum ScriptedReply {
    Text(String),
    Error { status: u16, body: String },
}

/// Model that replays queued replies in order and records every request it receives.
#[derive(Default)]
pub struct MockModel {
    replies: Mutex<VecDeque<ScriptedReply>>,
    calls: Mutex<Vec<Vec<ContentPart>>>,
}

impl MockModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_text(&self, text: &str) {
        self.replies.lock().unwrap().push_back(ScriptedReply::Text(text.to_string()));
    }

    /// Queue a provider failure, surfaced as [`ModelError::Status`].
    pub fn push_error(&self, status: u16, body: &str) {
        self.replies.lock().unwrap().push_back(ScriptedReply::Error {
            status,
            body: body.to_string(),
        });
    }

    pub fn calls(&self) -> Vec<Vec<ContentPart>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeModel for MockModel {
    async fn generate(&self, parts: Vec<ContentPart>) -> Result<String, ModelError> {
        self.calls.lock().unwrap().push(parts);

        match self.replies.lock().unwrap().pop_front() {
            Some(ScriptedReply::Text(text)) => Ok(text),
            Some(ScriptedReply::Error { status, body }) => Err(ModelError::Status { status, body }),
            None => panic!("MockModel: no reply queued for this call"),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Defaults, except the global Prometheus recorder stays uninstalled.
pub fn create_test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        enable_metrics: false,
        ..Default::default()
    }
}

pub fn create_test_app(model: Arc<MockModel>) -> TestServer {
    crate::Application::with_model(create_test_config(), model)
        .expect("Failed to create application")
        .into_test_server()
}
