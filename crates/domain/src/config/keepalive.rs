use serde::{Deserialize, Serialize};

/// Periodic self-ping that keeps free-tier hosts from idling the process.
/// Disabled unless `url` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeepAliveConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "d_240")]
    pub interval_secs: u64,
}

impl Default for KeepAliveConfig {
    fn default() -> Self {
        Self {
            url: None,
            interval_secs: 240,
        }
    }
}

fn d_240() -> u64 {
    240
}
