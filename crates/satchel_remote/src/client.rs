//! Endpoint client abstraction and the blocking HTTP implementation.

use std::time::Duration;

/// The wire abstraction for the consumed endpoint.
///
/// Implement this trait to provide the actual transport. Reads are
/// GET-style calls carrying an action name and a cache-busting token;
/// writes are POST-style calls carrying a complete JSON body. Errors are
/// plain strings at this layer; [`crate::RemoteEndpoint`] classifies them.
pub trait EndpointClient: Send + Sync {
    /// Issues a read-style call.
    fn read(&self, action: &str, cache_token: &str) -> Result<String, String>;

    /// Issues a write-style call with the given JSON body.
    fn write(&self, body: &str) -> Result<String, String>;
}

/// A blocking HTTP client for the endpoint.
///
/// Reads become `GET {base_url}?action={action}&t={token}`; writes become
/// `POST {base_url}` with a JSON body. The single-URL shape matches the
/// consumed protocol, which multiplexes every operation over one route.
pub struct HttpEndpointClient {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpEndpointClient {
    /// Creates a client for the given endpoint URL with a 30s timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, Duration::from_secs(30))
    }

    /// Creates a client with an explicit request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::blocking::Client::new());

        Self {
            base_url: base_url.into(),
            client,
        }
    }

    /// Returns the endpoint base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl EndpointClient for HttpEndpointClient {
    fn read(&self, action: &str, cache_token: &str) -> Result<String, String> {
        let url = format!("{}?action={}&t={}", self.base_url, action, cache_token);

        self.client
            .get(&url)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.text())
            .map_err(|e| e.to_string())
    }

    fn write(&self, body: &str) -> Result<String, String> {
        self.client
            .post(&self.base_url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body.to_string())
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.text())
            .map_err(|e| e.to_string())
    }
}
