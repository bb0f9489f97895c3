//! Usage polling for the menu-bar ring.

use reqwest::Method;
use serde::Deserialize;

use super::client::{ApiClient, ApiError};

/// Account usage as reported by `GET /api/organizations/{orgId}/usage`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UsageSnapshot {
    /// 5-hour rolling window
    pub five_hour: Option<UsageWindow>,
    /// 7-day rolling window
    pub seven_day: Option<UsageWindow>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UsageWindow {
    /// Utilization percentage (0-100)
    #[serde(default)]
    pub utilization: f64,
    /// ISO timestamp when the window resets; null when no window is open
    pub resets_at: Option<String>,
}

impl UsageSnapshot {
    /// True when the five-hour window exists but carries no reset time.
    ///
    /// In that state no quota window is currently open, and
    /// [`super::quota::trigger_new_period`] can start one.
    pub fn five_hour_reset_missing(&self) -> bool {
        self.five_hour
            .as_ref()
            .is_some_and(|window| window.resets_at.is_none())
    }
}

/// Fetch current usage. No caching: the poll interval is the caller's
/// policy, and a stale snapshot would mask the trigger condition.
pub async fn fetch_usage(client: &ApiClient) -> Result<UsageSnapshot, ApiError> {
    let response = client.request(Method::GET, "/usage")?.send().await?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(ApiError::Http {
            status: status.as_u16(),
            body,
        });
    }

    let body = response.text().await?;
    serde_json::from_str(&body)
        .map_err(|e| ApiError::Parse(format!("malformed usage response: {e}")))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn test_fetch_decodes_snapshot() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/organizations/org-1/usage"))
            .and(header("cookie", "sessionKey=sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "five_hour": {"utilization": 62.5, "resets_at": "2025-11-08T13:00:00Z"},
                "seven_day": {"utilization": 10.0, "resets_at": null},
            })))
            .mount(&server)
            .await;

        let client = ApiClient::with_base_url(server.uri(), "org-1", "sk-test");
        let snapshot = fetch_usage(&client).await.unwrap();
        assert_eq!(snapshot.five_hour.as_ref().unwrap().utilization, 62.5);
        assert!(!snapshot.five_hour_reset_missing());
    }

    #[tokio::test]
    async fn test_auth_failure_surfaces_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/organizations/org-1/usage"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let client = ApiClient::with_base_url(server.uri(), "org-1", "sk-test");
        let err = fetch_usage(&client).await.unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 403, .. }));
    }

    #[test]
    fn test_null_reset_marks_trigger_condition() {
        let snapshot: UsageSnapshot = serde_json::from_value(json!({
            "five_hour": {"utilization": 0.0, "resets_at": null},
        }))
        .unwrap();
        assert!(snapshot.five_hour_reset_missing());
    }

    #[test]
    fn test_absent_window_is_not_the_trigger_condition() {
        let snapshot: UsageSnapshot = serde_json::from_value(json!({})).unwrap();
        assert!(!snapshot.five_hour_reset_missing());
    }
}
