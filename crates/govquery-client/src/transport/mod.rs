//! Transport layer abstraction
//!
//! A [`Transport`] performs exactly one request against the backend and
//! classifies the result. Timeouts and retries live above it, in
//! [`crate::resilience`].

mod http;

use async_trait::async_trait;
use serde_json::Value;

pub use http::HttpTransport;

use crate::resilience::RequestOutcome;

/// HTTP method used by a backend endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// Backend REST endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// `GET /`
    Health,
    /// `GET /schemas`
    Schemas,
    /// `GET /schema/{code}`
    Schema(String),
    /// `POST /`
    Convert,
    /// `POST /simple`
    ConvertSimple,
    /// `POST /execute`
    Execute,
    /// `POST /parse-sql`
    ParseSql,
    /// `POST /deploy`
    Deploy,
}

impl Endpoint {
    #[must_use]
    pub const fn method(&self) -> HttpMethod {
        match self {
            Self::Health | Self::Schemas | Self::Schema(_) => HttpMethod::Get,
            Self::Convert | Self::ConvertSimple | Self::Execute | Self::ParseSql | Self::Deploy => {
                HttpMethod::Post
            }
        }
    }

    /// Path segments below the base URL; empty for the root endpoints.
    ///
    /// Segments are percent-encoded when joined, so a table code cannot
    /// escape its path position.
    #[must_use]
    pub fn segments(&self) -> Vec<&str> {
        match self {
            Self::Health | Self::Convert => Vec::new(),
            Self::Schemas => vec!["schemas"],
            Self::Schema(code) => vec!["schema", code.as_str()],
            Self::ConvertSimple => vec!["simple"],
            Self::Execute => vec!["execute"],
            Self::ParseSql => vec!["parse-sql"],
            Self::Deploy => vec!["deploy"],
        }
    }

    /// Route template, used as a low-cardinality label in logs and metrics
    #[must_use]
    pub const fn route(&self) -> &'static str {
        match self {
            Self::Health | Self::Convert => "/",
            Self::Schemas => "/schemas",
            Self::Schema(_) => "/schema/{code}",
            Self::ConvertSimple => "/simple",
            Self::Execute => "/execute",
            Self::ParseSql => "/parse-sql",
            Self::Deploy => "/deploy",
        }
    }
}

/// One backend request: endpoint plus optional JSON body
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub endpoint: Endpoint,
    pub body: Option<Value>,
}

impl ApiRequest {
    #[must_use]
    pub const fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            body: None,
        }
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Performs a single attempt against the backend.
///
/// Implementations never time out on their own and never produce
/// [`RequestOutcome::Timeout`]; the executor enforces the deadline by
/// dropping the returned future.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    async fn send(&self, request: &ApiRequest) -> RequestOutcome<Value>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_methods() {
        assert_eq!(Endpoint::Health.method(), HttpMethod::Get);
        assert_eq!(Endpoint::Schemas.method(), HttpMethod::Get);
        assert_eq!(Endpoint::Schema("B01001".into()).method(), HttpMethod::Get);
        assert_eq!(Endpoint::Convert.method(), HttpMethod::Post);
        assert_eq!(Endpoint::ConvertSimple.method(), HttpMethod::Post);
        assert_eq!(Endpoint::Execute.method(), HttpMethod::Post);
        assert_eq!(Endpoint::ParseSql.method(), HttpMethod::Post);
        assert_eq!(Endpoint::Deploy.method(), HttpMethod::Post);
    }

    #[test]
    fn test_endpoint_segments() {
        assert!(Endpoint::Health.segments().is_empty());
        assert!(Endpoint::Convert.segments().is_empty());
        assert_eq!(
            Endpoint::Schema("B01001".into()).segments(),
            vec!["schema", "B01001"]
        );
        assert_eq!(Endpoint::ParseSql.segments(), vec!["parse-sql"]);
    }

    #[test]
    fn test_route_hides_table_code() {
        assert_eq!(Endpoint::Schema("secret".into()).route(), "/schema/{code}");
    }

    #[test]
    fn test_api_request_body() {
        let request = ApiRequest::new(Endpoint::Execute).with_body(serde_json::json!({"sql": "SELECT 1"}));
        assert_eq!(request.endpoint, Endpoint::Execute);
        assert_eq!(request.body.unwrap()["sql"], "SELECT 1");
    }
}
