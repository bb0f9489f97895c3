use reqwest::header::{HeaderMap, HeaderValue, COOKIE, USER_AGENT};
use reqwest::Method;

/// Production endpoint; tests point the client at a mock server instead
pub const DEFAULT_BASE_URL: &str = "https://claude.ai";

/// The web app's session cookies only work with browser-shaped requests
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15";

const CLIENT_PLATFORM_HEADER: &str = "anthropic-client-platform";
const CLIENT_PLATFORM: &str = "web_claude_ai";

/// Errors surfaced by the claude.ai client.
///
/// Discovery-style absorption is deliberately absent here: every request
/// in this module has a side effect or a caller decision attached, so
/// failures always propagate.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request URL failed to parse; cannot happen with valid input
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),

    /// Connection, TLS, or body-read failure
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response arrived with an unexpected status
    #[error("unexpected HTTP status {status}: {body}")]
    Http { status: u16, body: String },

    /// Response arrived but the expected content was absent or malformed
    #[error("unexpected response: {0}")]
    Parse(String),
}

/// Authenticated client for the claude.ai web API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    organization_id: String,
    session_key: String,
}

impl ApiClient {
    pub fn new(organization_id: impl Into<String>, session_key: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, organization_id, session_key)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        organization_id: impl Into<String>,
        session_key: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            organization_id: organization_id.into(),
            session_key: session_key.into(),
        }
    }

    pub fn organization_id(&self) -> &str {
        &self.organization_id
    }

    /// Request builder for an organization-scoped endpoint, with the
    /// session cookie and fixed client headers applied.
    pub(crate) fn request(
        &self,
        method: Method,
        suffix: &str,
    ) -> Result<reqwest::RequestBuilder, ApiError> {
        let raw = format!(
            "{}/api/organizations/{}{}",
            self.base_url, self.organization_id, suffix
        );
        let url = reqwest::Url::parse(&raw).map_err(|_| ApiError::InvalidUrl(raw))?;
        Ok(self.http.request(method, url).headers(self.base_headers()))
    }

    fn base_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(CLIENT_PLATFORM_HEADER, HeaderValue::from_static(CLIENT_PLATFORM));
        match HeaderValue::from_str(&format!("sessionKey={}", self.session_key)) {
            Ok(cookie) => {
                headers.insert(COOKIE, cookie);
            }
            // Header values cannot carry control bytes; the request goes
            // out unauthenticated and surfaces as an HTTP 401.
            Err(e) => log::error!("Session key is not a valid cookie value: {e}"),
        }
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_base_url_is_reported() {
        let client = ApiClient::with_base_url("not a url", "org-1", "sk-test");
        let err = client.request(Method::GET, "/usage").unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }

    #[test]
    fn test_valid_base_url_builds_organization_endpoint() {
        let client = ApiClient::with_base_url("https://claude.ai", "org-1", "sk-test");
        assert!(client.request(Method::GET, "/usage").is_ok());
        assert_eq!(client.organization_id(), "org-1");
    }
}
