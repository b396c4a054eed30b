//! Generative-AI backend trait and implementations.
//!
//! - `HttpBackend` POSTs a chat-style message list plus a JSON-schema
//!   constraint to the configured endpoint with `reqwest`. This is the
//!   production backend.
//! - `ScriptedBackend` replays a canned reply and records every request, for
//!   tests and offline runs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use seoforge_core::config::AiConfig;
use seoforge_core::error::SeoforgeError;

use crate::error::GenerateError;

/// One chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Named JSON schema the reply content must satisfy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonSchemaSpec {
    pub name: String,
    pub schema: serde_json::Value,
}

/// Outbound completion payload: `{messages, json_schema}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_schema: Option<JsonSchemaSpec>,
}

/// Result of a reachability probe against the AI endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeReport {
    pub ok: bool,
    pub status: u16,
    pub status_text: String,
    pub endpoint: String,
    /// Start of the response body.
    pub sample: String,
}

/// A generative-AI endpoint.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Send one completion request and return the content string of the
    /// first choice, unparsed.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GenerateError>;

    /// Send a minimal ping and report how the endpoint answered. Only a
    /// transport failure is an error; non-success statuses are reported.
    async fn probe(&self) -> Result<ProbeReport, GenerateError>;

    /// Where requests go, for logs and probe reports.
    fn endpoint(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Envelope handling
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct CompletionEnvelope {
    #[serde(default)]
    choices: Vec<EnvelopeChoice>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct EnvelopeChoice {
    #[serde(default)]
    message: Option<EnvelopeMessage>,
}

#[derive(Deserialize)]
struct EnvelopeMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Pull `choices[0].message.content` out of a response body.
///
/// A body that is not an envelope, or an envelope carrying `error`, is a
/// format error. A missing content string comes back empty and fails later
/// when it is parsed.
pub fn extract_content(body: &str) -> Result<String, GenerateError> {
    let envelope: CompletionEnvelope = serde_json::from_str(body).map_err(|e| {
        error!(error = %e, "AI response body is not a completion envelope");
        GenerateError::format("Failed to parse AI response", e.to_string())
    })?;

    if let Some(err) = envelope.error {
        let detail = match err {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        error!(detail = %detail, "AI response carried an error");
        return Err(GenerateError::format("Failed to parse AI response", detail));
    }

    Ok(envelope
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .unwrap_or_default())
}

/// Leading `max` characters of `s`, cut on a char boundary.
pub(crate) fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

// ---------------------------------------------------------------------------
// HttpBackend
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct OutboundRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    #[serde(flatten)]
    request: &'a CompletionRequest,
}

/// `reqwest`-backed client for the AI endpoint.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl HttpBackend {
    /// Build a client with the configured timeout.
    pub fn new(config: &AiConfig) -> Result<Self, SeoforgeError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| SeoforgeError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    async fn send(&self, request: &CompletionRequest) -> Result<reqwest::Response, GenerateError> {
        let body = OutboundRequest {
            model: Some(self.model.as_str()).filter(|m| !m.is_empty()),
            request,
        };

        let mut req = self.client.post(&self.endpoint).json(&body);
        if !self.api_key.is_empty() {
            req = req.bearer_auth(&self.api_key);
        }

        req.send().await.map_err(|e| {
            warn!(endpoint = %self.endpoint, error = %e, "AI endpoint unreachable");
            GenerateError::UpstreamUnavailable(e.to_string())
        })
    }
}

#[async_trait]
impl CompletionBackend for HttpBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GenerateError> {
        let resp = self.send(request).await?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!(
                status = status.as_u16(),
                reason = status.canonical_reason().unwrap_or_default(),
                body = %truncate_chars(&body, 500),
                "AI generation failed"
            );
            let detail = status
                .canonical_reason()
                .filter(|r| !r.is_empty())
                .map(str::to_string)
                .or_else(|| {
                    let head = truncate_chars(&body, 200);
                    (!head.is_empty()).then(|| head.to_string())
                })
                .unwrap_or_else(|| "Unknown integration error".to_string());
            return Err(GenerateError::UpstreamError {
                status: status.as_u16(),
                detail,
            });
        }

        let body = resp
            .text()
            .await
            .map_err(|e| GenerateError::format("Failed to parse AI response", e.to_string()))?;
        debug!(bytes = body.len(), "AI response received");
        extract_content(&body)
    }

    async fn probe(&self) -> Result<ProbeReport, GenerateError> {
        let ping = CompletionRequest {
            messages: vec![ChatMessage::user("ping")],
            json_schema: None,
        };
        let resp = self.send(&ping).await?;
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();

        Ok(ProbeReport {
            ok: status.is_success(),
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            endpoint: self.endpoint.clone(),
            sample: truncate_chars(&body, 300).to_string(),
        })
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

// ---------------------------------------------------------------------------
// ScriptedBackend
// ---------------------------------------------------------------------------

/// Backend that answers every request with the same canned reply.
pub struct ScriptedBackend {
    reply: Result<String, GenerateError>,
    calls: AtomicUsize,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedBackend {
    /// Answer with the given content string (the value of `message.content`).
    pub fn with_content(content: impl Into<String>) -> Self {
        Self::with_reply(Ok(content.into()))
    }

    /// Answer with the given outcome.
    pub fn with_reply(reply: Result<String, GenerateError>) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer with a well-formed five-title reply.
    pub fn valid() -> Self {
        let content = serde_json::json!({
            "description": "In this video we walk through the whole build, step by step.",
            "thumbnail_title": "BUILT IT IN A DAY",
            "video_title_options": [
                "I Built This in One Day",
                "One Day Build Challenge",
                "From Zero to Shipped in 24 Hours",
                "The Fastest Build I've Ever Done",
                "Can You Ship It in a Day?"
            ],
            "tags": "build, challenge, tutorial, one day"
        });
        Self::with_content(content.to_string())
    }

    /// Answer every request with `UpstreamError { status }`.
    pub fn failing_status(status: u16) -> Self {
        Self::with_reply(Err(GenerateError::UpstreamError {
            status,
            detail: "scripted failure".to_string(),
        }))
    }

    /// Number of completion or probe requests received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every completion request received, oldest first.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GenerateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        self.reply.clone()
    }

    async fn probe(&self) -> Result<ProbeReport, GenerateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let (ok, status, status_text) = match &self.reply {
            Ok(_) => (true, 200, "OK"),
            Err(GenerateError::UpstreamError { status, .. }) => (false, *status, "scripted failure"),
            Err(other) => return Err(other.clone()),
        };
        Ok(ProbeReport {
            ok,
            status,
            status_text: status_text.to_string(),
            endpoint: self.endpoint().to_string(),
            sample: String::new(),
        })
    }

    fn endpoint(&self) -> &str {
        "scripted://local"
    }
}
