#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;

use meetnotes::api::{create_router, AppState};
use meetnotes::config::{Config, LlmConfig, RateLimitConfig, ServerConfig, UploadConfig};
use meetnotes::error::{AppError, Result};
use meetnotes::llm::Summarizer;
use meetnotes::mail::Mailer;

pub const BOUNDARY: &str = "meetnotes-test-boundary";

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            service_name: "meetnotes".to_string(),
            cors_origins: Vec::new(),
            trust_proxy: false,
        },
        upload: UploadConfig::default(),
        rate_limit: RateLimitConfig::default(),
        llm: LlmConfig::default(),
        mail: None,
    }
}

/// Summarizer that replays a fixed answer and records every call.
#[derive(Default)]
pub struct FakeSummarizer {
    reply: Option<String>,
    pub calls: Mutex<Vec<(String, String)>>,
}

impl FakeSummarizer {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(text.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Every call fails with a provider error.
    pub fn failing() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_content(&self) -> String {
        self.calls.lock().unwrap().last().unwrap().1.clone()
    }
}

#[async_trait]
impl Summarizer for FakeSummarizer {
    async fn complete(&self, system: &str, content: &str) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((system.to_string(), content.to_string()));
        self.reply
            .clone()
            .ok_or_else(|| AppError::Llm("upstream returned 503".to_string()))
    }
}

/// Mailer that records deliveries instead of talking SMTP.
#[derive(Default)]
pub struct FakeMailer {
    fail: bool,
    pub sent: Mutex<Vec<(String, String, String)>>,
}

impl FakeMailer {
    pub fn accepting() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Self::default()
        })
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Mailer for FakeMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<String> {
        if self.fail {
            return Err(AppError::Mail("connection refused".to_string()));
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push((to.to_string(), subject.to_string(), body.to_string()));
        Ok(format!("<msg-{}@meetnotes.test>", sent.len()))
    }
}

pub fn app(config: Config, summarizer: Arc<FakeSummarizer>, mailer: Arc<FakeMailer>) -> Router {
    create_router(AppState::new(config, summarizer, mailer))
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn json_request(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// One part of a hand-built multipart body.
pub enum Part<'a> {
    Text {
        name: &'a str,
        value: &'a str,
    },
    File {
        name: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        data: &'a [u8],
    },
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                name,
                file_name,
                content_type,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_request(parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/summarize")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

pub fn dir_is_empty(dir: &Path) -> bool {
    std::fs::read_dir(dir).unwrap().next().is_none()
}
