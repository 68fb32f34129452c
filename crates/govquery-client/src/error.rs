use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Request timeout after {0:?}")]
    Timeout(Duration),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP {status}: {detail}")]
    Http { status: u16, detail: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Invalid SQL: {0}")]
    InvalidSql(String),
}

impl Error {
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    #[must_use]
    pub const fn is_http(&self) -> bool {
        matches!(self, Self::Http { .. })
    }

    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    #[must_use]
    pub const fn is_invalid_sql(&self) -> bool {
        matches!(self, Self::InvalidSql(_))
    }

    /// HTTP status code when the backend answered with a non-2xx response
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the backend could not be reached at all (as opposed to rejecting the request)
    #[must_use]
    pub const fn is_unreachable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Transport(_))
    }

    /// Whether the failure is believed to be transient.
    ///
    /// Timeouts, transport failures, 5xx, 408 and 429 qualify. Other 4xx
    /// responses and local errors never do.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Transport(_) => true,
            Self::Http { status, .. } => is_transient_status(*status),
            Self::Config(_) | Self::Cancelled | Self::InvalidSql(_) => false,
        }
    }
}

pub(crate) const fn is_transient_status(status: u16) -> bool {
    status >= 500 || status == 408 || status == 429
}

pub type Result<T> = std::result::Result<T, Error>;
