use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Backend REST API (relay target)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL given directly in config. Takes precedence over `url_env`.
    #[serde(default)]
    pub url: Option<String>,
    /// Env var holding the base URL.
    #[serde(default = "d_url_env")]
    pub url_env: String,
    /// Env var holding the service key sent as `apikey` and bearer token.
    #[serde(default = "d_key_env")]
    pub key_env: String,
    #[serde(default = "d_15000")]
    pub timeout_ms: u64,
    /// Maximum characters of a non-JSON upstream body echoed back.
    #[serde(default = "d_200")]
    pub preview_chars: usize,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: None,
            url_env: d_url_env(),
            key_env: d_key_env(),
            timeout_ms: 15_000,
            preview_chars: 200,
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_url_env() -> String {
    "SUPABASE_URL".into()
}
fn d_key_env() -> String {
    "SUPABASE_ANON_KEY".into()
}
fn d_15000() -> u64 {
    15_000
}
fn d_200() -> usize {
    200
}
