//! Error taxonomy for lookups and for the upstream provider.

use thiserror::Error;

pub const CITY_NOT_FOUND: &str = "City not found";
pub const UPSTREAM_FAILURE: &str = "Failed to fetch weather data. Please try again.";
pub const NETWORK_FAILURE: &str = "Network error. Please check your connection.";

/// Which of the externally observable failure classes a [`LookupError`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Upstream,
    Transport,
}

/// Failure of a single city lookup, as seen by the search coordinator.
///
/// The `Display` output is the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Upstream(String),
    #[error("{0}")]
    Transport(String),
}

impl LookupError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Upstream(_) => ErrorKind::Upstream,
            Self::Transport(_) => ErrorKind::Transport,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Validation(m) | Self::NotFound(m) | Self::Upstream(m) | Self::Transport(m) => m,
        }
    }

    pub fn not_found(message: Option<String>) -> Self {
        let message = message
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| CITY_NOT_FOUND.to_string());
        Self::NotFound(message)
    }

    pub fn upstream() -> Self {
        Self::Upstream(UPSTREAM_FAILURE.to_string())
    }

    pub fn transport() -> Self {
        Self::Transport(NETWORK_FAILURE.to_string())
    }
}

/// Failure talking to the third-party weather provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{0}")]
    NotFound(String),
    #[error("provider request failed with status {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("failed to parse provider response: {0}")]
    Decode(#[from] serde_json::Error),
}
