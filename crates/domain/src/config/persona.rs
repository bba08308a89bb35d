use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Persona (reply style instructions)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Where the persona instruction block comes from.
///
/// The block is loaded once at startup and sent verbatim as the first
/// system message of every reply prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaConfig {
    #[serde(default = "d_persona_path")]
    pub path: PathBuf,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            path: d_persona_path(),
        }
    }
}

fn d_persona_path() -> PathBuf {
    PathBuf::from("persona/guru.md")
}
