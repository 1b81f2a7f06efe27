//! reqwest-backed ContentSource.
//!
//! One shared client per run; cloning the adapter shares the connection pool.

use crate::domain::DomainError;
use crate::ports::ContentSource;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

#[derive(Clone)]
pub struct ReqwestSource {
    client: Client,
}

impl ReqwestSource {
    /// Build a client with the given user agent and per-request timeout.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, DomainError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| DomainError::Config(format!("HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl ContentSource for ReqwestSource {
    async fn fetch_text(&self, url: &str) -> Result<String, DomainError> {
        let fetch_err = |reason: String| DomainError::Fetch {
            url: url.to_string(),
            reason,
        };

        let res = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_err(format!("request failed: {}", e)))?;

        let status = res.status();
        if !status.is_success() {
            return Err(fetch_err(format!("HTTP {}", status)));
        }

        let body = res
            .text()
            .await
            .map_err(|e| fetch_err(format!("reading body: {}", e)))?;
        debug!(url, bytes = body.len(), "fetched");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn source() -> ReqwestSource {
        ReqwestSource::new("site-sync-test", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn returns_body_and_sends_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page/news"))
            .and(header("user-agent", "site-sync-test"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .mount(&server)
            .await;

        let body = source()
            .fetch_text(&format!("{}/page/news", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, "<html>ok</html>");
    }

    #[tokio::test]
    async fn non_success_status_is_a_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/Events.ics"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let url = format!("{}/Events.ics", server.uri());
        let err = source().fetch_text(&url).await.unwrap_err();
        match err {
            DomainError::Fetch { url: failed, reason } => {
                assert_eq!(failed, url);
                assert!(reason.contains("503"), "reason was {reason}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
