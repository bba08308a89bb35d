/// Failure modes of a relayed backend call.
#[derive(thiserror::Error, Debug)]
pub enum RelayError {
    /// The caller-supplied path is not an absolute path on the backend.
    #[error("relay path must start with '/': {0:?}")]
    InvalidPath(String),

    #[error("unsupported HTTP method: {0:?}")]
    InvalidMethod(String),

    /// The backend could not be reached or its body could not be read.
    #[error("backend transport: {0}")]
    Transport(String),

    /// The backend answered but the body is not JSON. `preview` is bounded.
    #[error("backend returned non-JSON body (HTTP {status})")]
    NonJson { status: u16, preview: String },
}

impl RelayError {
    /// Whether the failure was caused by the caller's request shape.
    pub fn is_client_error(&self) -> bool {
        matches!(self, RelayError::InvalidPath(_) | RelayError::InvalidMethod(_))
    }
}
