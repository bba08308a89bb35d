//! Error type shared by the model adapter, the relay and the gateway runtime.
//!
//! Relay request/response shape failures have their own type in
//! `guru-relay`; this one covers everything that ends a chat turn or
//! aborts startup.

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    /// A model or backend body that should have been JSON was not.
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP transport: {0}")]
    Http(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    /// The model API answered with an error status or an unusable body.
    #[error("model provider {provider}: {message}")]
    Provider { provider: String, message: String },

    /// Missing or invalid startup configuration, including unset env vars.
    #[error("configuration: {0}")]
    Config(String),

    #[error("credentials: {0}")]
    Auth(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_names_the_provider() {
        let err = Error::Provider {
            provider: "openai".into(),
            message: "HTTP 429".into(),
        };
        assert_eq!(err.to_string(), "model provider openai: HTTP 429");
    }

    #[test]
    fn json_errors_convert() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = parse.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
