//! HTTP transport backed by `reqwest`

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use url::Url;

use super::{ApiRequest, Endpoint, HttpMethod, Transport};
use crate::constants::{CONTENT_TYPE_JSON, SERVICE_NAME};
use crate::resilience::RequestOutcome;
use crate::{Error, Result};

/// JSON-over-HTTP transport for the GovQuery backend.
///
/// The underlying client has no timeout of its own; each attempt is bounded
/// by [`RequestExecutor`](crate::resilience::RequestExecutor).
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(base_url: Url) -> Result<Self> {
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "Backend URL cannot carry a path: {base_url}"
            )));
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("govquery-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Join endpoint segments onto the base URL, keeping any base path prefix
    fn url_for(&self, endpoint: &Endpoint) -> std::result::Result<Url, String> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| format!("Backend URL cannot carry a path: {}", self.base_url))?;
            segments.pop_if_empty();

            let parts = endpoint.segments();
            if parts.is_empty() {
                segments.push("");
            } else {
                segments.extend(parts);
            }
        }
        Ok(url)
    }
}

/// Error message for a non-2xx response: the body's `detail` field when it
/// has one, otherwise the status reason phrase.
fn error_detail(status: StatusCode, body: &[u8]) -> String {
    let detail = serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|json| match json.get("detail")? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        })
        .filter(|d| !d.is_empty());

    detail.unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("Unknown Status")
            .to_string()
    })
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest) -> RequestOutcome<Value> {
        let url = match self.url_for(&request.endpoint) {
            Ok(url) => url,
            Err(e) => return RequestOutcome::TransportError(e),
        };

        tracing::trace!(
            service = SERVICE_NAME,
            method = request.endpoint.method().as_str(),
            url = %url,
            "Sending backend request"
        );

        let builder = match request.endpoint.method() {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self.client.post(url),
        }
        .header(CONTENT_TYPE, CONTENT_TYPE_JSON);

        let builder = match &request.body {
            Some(body) => builder.json(body),
            None => builder,
        };

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => return RequestOutcome::TransportError(e.to_string()),
        };

        let status = response.status();
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                return RequestOutcome::TransportError(format!("Failed to read response body: {e}"));
            }
        };

        if !status.is_success() {
            return RequestOutcome::HttpError {
                status: status.as_u16(),
                detail: error_detail(status, &body),
            };
        }

        match serde_json::from_slice(&body) {
            Ok(json) => RequestOutcome::Success(json),
            Err(e) => RequestOutcome::TransportError(format!("Invalid JSON in response body: {e}")),
        }
    }
}
