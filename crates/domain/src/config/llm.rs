use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LLM provider and per-stage sampling
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Per-request timeout for model calls. Calls are never retried.
    #[serde(default = "d_60000u")]
    pub timeout_ms: u64,
    /// Digest stage: small model, tiny output budget.
    #[serde(default)]
    pub summarizer: SummarizerConfig,
    /// Visible reply stage.
    #[serde(default)]
    pub reply: ReplyConfig,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            timeout_ms: 60_000,
            summarizer: SummarizerConfig::default(),
            reply: ReplyConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "d_provider_id")]
    pub id: String,
    /// OpenAI-compatible API root, e.g. `https://api.openai.com/v1`.
    #[serde(default = "d_openai_url")]
    pub base_url: String,
    #[serde(default)]
    pub auth: AuthConfig,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            id: d_provider_id(),
            base_url: d_openai_url(),
            auth: AuthConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Header name (e.g. "Authorization", "api-key").
    #[serde(default)]
    pub header: Option<String>,
    /// Header value prefix (e.g. "Bearer ").
    #[serde(default)]
    pub prefix: Option<String>,
    /// Env var containing the key.
    #[serde(default = "d_model_key_env")]
    pub env: Option<String>,
    /// Direct key (for config-only setups; prefer env).
    #[serde(default)]
    pub key: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            header: None,
            prefix: None,
            env: d_model_key_env(),
            key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizerConfig {
    #[serde(default = "d_summarizer_model")]
    pub model: String,
    #[serde(default = "d_40")]
    pub max_tokens: u32,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            model: d_summarizer_model(),
            max_tokens: 40,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyConfig {
    #[serde(default = "d_reply_model")]
    pub model: String,
    #[serde(default = "d_temperature")]
    pub temperature: f32,
    #[serde(default = "d_presence_penalty")]
    pub presence_penalty: f32,
    #[serde(default = "d_700")]
    pub max_tokens: u32,
    /// Stop sequences. Empty by default: they cut run-on generations but
    /// also truncate legitimate multi-paragraph answers.
    #[serde(default)]
    pub stop: Vec<String>,
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            model: d_reply_model(),
            temperature: d_temperature(),
            presence_penalty: d_presence_penalty(),
            max_tokens: 700,
            stop: Vec::new(),
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_60000u() -> u64 {
    60_000
}
fn d_provider_id() -> String {
    "openai".into()
}
fn d_openai_url() -> String {
    "https://api.openai.com/v1".into()
}
fn d_model_key_env() -> Option<String> {
    Some("MODEL_API_KEY".into())
}
fn d_summarizer_model() -> String {
    "gpt-4o-mini".into()
}
fn d_40() -> u32 {
    40
}
fn d_reply_model() -> String {
    "gpt-4o".into()
}
fn d_temperature() -> f32 {
    0.9
}
fn d_presence_penalty() -> f32 {
    0.4
}
fn d_700() -> u32 {
    700
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
