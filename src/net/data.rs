use thiserror::Error;

/// Why a resource could not be fetched.
///
/// `Clone` so that one settlement can be handed to every caller waiting on
/// the same in-flight request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request never produced a response: DNS, connect, timeout.
    #[error("network error: {0}")]
    Network(String),
    /// The server answered with a non-2xx status.
    #[error("HTTP {status}")]
    Http { status: u16 },
    /// The body was not valid JSON or did not have the expected shape.
    #[error("invalid response: {0}")]
    Decode(String),
}

impl FetchError {
    /// HTTP status for [`FetchError::Http`], `None` otherwise.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Http { status } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            return FetchError::Http {
                status: status.as_u16(),
            };
        }
        if e.is_decode() {
            return FetchError::Decode(e.to_string());
        }
        if e.is_timeout() {
            return FetchError::Network(format!("request timed out: {e}"));
        }
        FetchError::Network(e.to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Decode(e.to_string())
    }
}
