//! Error types for the ESPN client and configuration loading.

use thiserror::Error;

/// Failure of a single ESPN request.
///
/// These never leave the repository layer; callers above it only see absence.
#[derive(Debug, Error)]
pub enum EspnError {
    #[error("ESPN request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("ESPN API error: {status} - {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse ESPN response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid team code: {0:?}")]
    InvalidCode(String),
}

impl EspnError {
    /// True when ESPN answered but rejected the request (unknown team code, etc).
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Status { status, .. } if (400..500).contains(status))
    }
}

/// Invalid environment configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}
