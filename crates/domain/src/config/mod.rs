mod backend;
mod keepalive;
mod llm;
mod observability;
mod persona;
mod server;
mod sessions;

pub use backend::*;
pub use keepalive::*;
pub use llm::*;
pub use observability::*;
pub use persona::*;
pub use server::*;
pub use sessions::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub sessions: SessionsConfig,
    #[serde(default)]
    pub persona: PersonaConfig,
    #[serde(default)]
    pub keepalive: KeepAliveConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl ConfigError {
    fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: ConfigSeverity::Error,
            field: field.into(),
            message: message.into(),
        }
    }

    fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: ConfigSeverity::Warning,
            field: field.into(),
            message: message.into(),
        }
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good. Secrets are not
    /// checked here; they are resolved from the environment at startup.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.server.port == 0 {
            errors.push(ConfigError::error("server.port", "port must be greater than 0"));
        }
        if self.server.host.is_empty() {
            errors.push(ConfigError::error("server.host", "host must not be empty"));
        }

        if self.llm.provider.base_url.is_empty() {
            errors.push(ConfigError::error(
                "llm.provider.base_url",
                "provider base_url must not be empty",
            ));
        }
        if self.llm.summarizer.model.is_empty() {
            errors.push(ConfigError::error("llm.summarizer.model", "model must not be empty"));
        }
        if self.llm.reply.model.is_empty() {
            errors.push(ConfigError::error("llm.reply.model", "model must not be empty"));
        }
        if !(0.0..=2.0).contains(&self.llm.reply.temperature) {
            errors.push(ConfigError::error(
                "llm.reply.temperature",
                "temperature must be within 0.0..=2.0",
            ));
        }
        if !(-2.0..=2.0).contains(&self.llm.reply.presence_penalty) {
            errors.push(ConfigError::error(
                "llm.reply.presence_penalty",
                "presence_penalty must be within -2.0..=2.0",
            ));
        }
        if self.llm.reply.stop.len() > 4 {
            errors.push(ConfigError::error(
                "llm.reply.stop",
                "at most 4 stop sequences are accepted by the model API",
            ));
        }

        if self.backend.url.is_none() && self.backend.url_env.is_empty() {
            errors.push(ConfigError::error(
                "backend.url_env",
                "either backend.url or backend.url_env must be set",
            ));
        }
        if self.backend.preview_chars == 0 {
            errors.push(ConfigError::warning(
                "backend.preview_chars",
                "non-JSON backend responses will carry an empty preview",
            ));
        }

        if self.sessions.max_history == 0 {
            errors.push(ConfigError::error(
                "sessions.max_history",
                "max_history must be greater than 0",
            ));
        }

        if self.keepalive.url.is_some() && self.keepalive.interval_secs == 0 {
            errors.push(ConfigError::error(
                "keepalive.interval_secs",
                "interval must be greater than 0 when keepalive.url is set",
            ));
        }

        // CORS: warn if wildcard is used.
        if self.server.cors.allowed_origins.len() == 1
            && self.server.cors.allowed_origins[0] == "*"
        {
            errors.push(ConfigError::warning(
                "server.cors.allowed_origins",
                "wildcard \"*\" allows all origins (not recommended for production)",
            ));
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let errors: Vec<_> = Config::default()
            .validate()
            .into_iter()
            .filter(|e| e.severity == ConfigSeverity::Error)
            .collect();
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    }

    #[test]
    fn zero_history_is_rejected() {
        let mut config = Config::default();
        config.sessions.max_history = 0;
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.field == "sessions.max_history"));
    }

    #[test]
    fn out_of_range_temperature_is_rejected() {
        let mut config = Config::default();
        config.llm.reply.temperature = 3.5;
        let errors = config.validate();
        assert!(errors
            .iter()
            .any(|e| e.field == "llm.reply.temperature" && e.severity == ConfigSeverity::Error));
    }

    #[test]
    fn config_error_display_is_tagged() {
        let err = ConfigError::warning("server.cors", "careful");
        assert_eq!(err.to_string(), "[WARN] server.cors: careful");
    }
}
