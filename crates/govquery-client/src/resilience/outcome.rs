//! Classified result of a single backend attempt

use std::time::Duration;

use crate::error::{Error, is_transient_status};

/// Result of one network attempt.
///
/// A transport only ever produces `Success`, `TransportError` or `HttpError`;
/// `Timeout` is added by the executor when the attempt outlives its deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome<T> {
    Success(T),
    Timeout(Duration),
    TransportError(String),
    HttpError { status: u16, detail: String },
}

impl<T> RequestOutcome<T> {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Timeouts, transport failures, 5xx, 408 and 429
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Success(_) => false,
            Self::Timeout(_) | Self::TransportError(_) => true,
            Self::HttpError { status, .. } => is_transient_status(*status),
        }
    }

    /// Short label for logs and metrics
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::Timeout(_) => "timeout",
            Self::TransportError(_) => "transport_error",
            Self::HttpError { .. } => "http_error",
        }
    }

    pub fn into_result(self) -> Result<T, Error> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Timeout(after) => Err(Error::Timeout(after)),
            Self::TransportError(cause) => Err(Error::Transport(cause)),
            Self::HttpError { status, detail } => Err(Error::Http { status, detail }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_into_result() {
        let outcome = RequestOutcome::Success(7);
        assert!(outcome.is_success());
        assert_eq!(outcome.into_result().unwrap(), 7);
    }

    #[test]
    fn test_failures_map_to_errors() {
        let timeout = RequestOutcome::<()>::Timeout(Duration::from_secs(30));
        assert!(timeout.is_timeout());
        assert!(timeout.into_result().unwrap_err().is_timeout());

        let transport = RequestOutcome::<()>::TransportError("connection refused".into());
        let err = transport.into_result().unwrap_err();
        assert!(err.is_transport());
        assert!(err.to_string().contains("connection refused"));

        let http = RequestOutcome::<()>::HttpError {
            status: 404,
            detail: "Schema not found".into(),
        };
        let err = http.into_result().unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "HTTP 404: Schema not found");
    }

    #[test]
    fn test_transient_classification() {
        let http = |status| RequestOutcome::<()>::HttpError {
            status,
            detail: String::new(),
        };

        assert!(RequestOutcome::<()>::Timeout(Duration::ZERO).is_transient());
        assert!(RequestOutcome::<()>::TransportError(String::new()).is_transient());
        assert!(http(500).is_transient());
        assert!(http(503).is_transient());
        assert!(http(408).is_transient());
        assert!(http(429).is_transient());
        assert!(!http(400).is_transient());
        assert!(!http(404).is_transient());
        assert!(!http(422).is_transient());
        assert!(!RequestOutcome::Success(()).is_transient());
    }
}
