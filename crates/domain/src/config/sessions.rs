use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Sessions
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Rolling-window settings for in-memory sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsConfig {
    /// Turns kept per session; older turns are discarded.
    #[serde(default = "d_6")]
    pub max_history: usize,
    /// Digest a session starts with before any summarization succeeds.
    #[serde(default = "d_digest")]
    pub default_digest: String,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            max_history: 6,
            default_digest: d_digest(),
        }
    }
}

fn d_6() -> usize {
    6
}
fn d_digest() -> String {
    "User begins the session calm and curious.".into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_window_and_neutral_digest() {
        let cfg: SessionsConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.max_history, 6);
        assert_eq!(cfg.default_digest, "User begins the session calm and curious.");
    }
}
