//! `RelayForwarder` wraps a `reqwest::Client` and forwards arbitrary
//! method/path/body triples to the backend with the service credentials
//! attached.

use std::time::{Duration, Instant};

use guru_domain::config::BackendConfig;
use guru_domain::error::{Error, Result};
use guru_domain::trace::TraceEvent;
use reqwest::{Client, Method, RequestBuilder};
use serde_json::Value;

use crate::error::RelayError;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Response
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A backend answer whose body parsed as JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayResponse {
    /// Upstream HTTP status, forwarded unchanged.
    pub status: u16,
    /// Upstream body, untouched. An empty body becomes `null`.
    pub body: Value,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Forwarder
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Created once at startup and shared by all relay requests.
/// The underlying `reqwest::Client` maintains a connection pool.
#[derive(Debug, Clone)]
pub struct RelayForwarder {
    http: Client,
    base_url: String,
    api_key: String,
    preview_chars: usize,
}

impl RelayForwarder {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        timeout: Duration,
        preview_chars: usize,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key: api_key.into(),
            preview_chars,
        })
    }

    /// Build the forwarder from config, reading the base URL and service key
    /// from the environment. Missing values are configuration errors.
    pub fn from_config(cfg: &BackendConfig) -> Result<Self> {
        let base_url = match &cfg.url {
            Some(url) => url.clone(),
            None => require_env(&cfg.url_env)?,
        };
        let api_key = require_env(&cfg.key_env)?;

        Self::new(
            &base_url,
            api_key,
            Duration::from_millis(cfg.timeout_ms),
            cfg.preview_chars,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ── request helpers ──────────────────────────────────────────────

    /// Attach the service credentials and content negotiation headers.
    fn decorate(&self, rb: RequestBuilder) -> RequestBuilder {
        rb.header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Accept", "application/json")
            .header("Prefer", "return=representation")
    }

    /// Paths are appended to the base URL verbatim, so anything that does
    /// not start with `/` could rewrite the authority (`@evil.example`).
    fn url(&self, path: &str) -> std::result::Result<String, RelayError> {
        if !path.starts_with('/') {
            return Err(RelayError::InvalidPath(path.to_owned()));
        }
        Ok(format!("{}{}", self.base_url, path))
    }

    // ── relay ────────────────────────────────────────────────────────

    /// Forward one request and normalize the answer.
    ///
    /// GET requests carry neither a body nor a content type. Every other
    /// method is sent as JSON, with `body` serialized when present. The
    /// call is attempted exactly once.
    pub async fn relay(
        &self,
        path: &str,
        method: &str,
        body: Option<&Value>,
    ) -> std::result::Result<RelayResponse, RelayError> {
        let method = parse_method(method)?;
        let url = self.url(path)?;

        let mut rb = self.decorate(self.http.request(method.clone(), &url));
        if method != Method::GET {
            rb = rb.header("Content-Type", "application/json");
            if let Some(body) = body {
                rb = rb.body(body.to_string());
            }
        }

        let start = Instant::now();
        let result = rb.send().await;
        let duration_ms = start.elapsed().as_millis() as u64;

        let resp = match result {
            Ok(resp) => resp,
            Err(e) => {
                TraceEvent::BackendRelay {
                    method: method.to_string(),
                    path: path.to_owned(),
                    status: None,
                    duration_ms,
                }
                .emit();
                return Err(RelayError::Transport(e.to_string()));
            }
        };

        let status = resp.status().as_u16();
        TraceEvent::BackendRelay {
            method: method.to_string(),
            path: path.to_owned(),
            status: Some(status),
            duration_ms,
        }
        .emit();

        let text = resp
            .text()
            .await
            .map_err(|e| RelayError::Transport(e.to_string()))?;

        if text.trim().is_empty() {
            return Ok(RelayResponse {
                status,
                body: Value::Null,
            });
        }

        match serde_json::from_str::<Value>(&text) {
            Ok(body) => Ok(RelayResponse { status, body }),
            Err(_) => Err(RelayError::NonJson {
                status,
                preview: preview(&text, self.preview_chars),
            }),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn require_env(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::Config(format!(
            "environment variable '{name}' not set or empty"
        ))),
    }
}

fn parse_method(method: &str) -> std::result::Result<Method, RelayError> {
    let upper = method.trim().to_ascii_uppercase();
    if upper.is_empty() {
        return Err(RelayError::InvalidMethod(method.to_owned()));
    }
    Method::from_bytes(upper.as_bytes()).map_err(|_| RelayError::InvalidMethod(method.to_owned()))
}

/// First `max_chars` characters of `text`, never splitting a code point.
pub fn preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
