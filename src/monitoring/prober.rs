use anyhow::Result;
use std::time::{Duration, Instant};

use super::types::CheckOutcome;

/// Default per-probe timeout in seconds
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

/// HTTP prober
///
/// Performs one GET against a target endpoint with a bounded timeout and
/// classifies the result. Redirects are followed (reqwest default policy).
/// All failure modes fold into a `Down` outcome so callers never need
/// target-specific error handling.
pub struct Prober {
    client: reqwest::Client,
}

impl Prober {
    pub fn new(timeout_seconds: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self { client })
    }

    /// Probe one endpoint and classify the outcome
    pub async fn probe(&self, endpoint: &str) -> CheckOutcome {
        let start = Instant::now();

        match self.client.get(endpoint).send().await {
            Ok(response) => {
                let elapsed = start.elapsed().as_millis() as u64;
                CheckOutcome::responded(response.status().as_u16(), elapsed)
            }
            Err(e) => {
                let elapsed = start.elapsed().as_millis() as u64;
                if e.is_timeout() {
                    CheckOutcome::failed("timeout", elapsed)
                } else {
                    CheckOutcome::failed(e.to_string(), elapsed)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitoring::types::TargetStatus;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn probe_up_on_2xx() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let prober = Prober::new(DEFAULT_TIMEOUT_SECONDS).unwrap();
        let outcome = prober.probe(&server.uri()).await;

        assert_eq!(outcome.status, TargetStatus::Up);
        assert_eq!(outcome.status_code, 200);
        assert!(outcome.error.is_none());
    }

    #[tokio::test]
    async fn probe_down_on_5xx() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let prober = Prober::new(DEFAULT_TIMEOUT_SECONDS).unwrap();
        let outcome = prober.probe(&server.uri()).await;

        assert_eq!(outcome.status, TargetStatus::Down);
        assert_eq!(outcome.status_code, 503);
    }

    #[tokio::test]
    async fn probe_down_on_connection_failure() {
        // Nothing is listening on this port
        let prober = Prober::new(DEFAULT_TIMEOUT_SECONDS).unwrap();
        let outcome = prober.probe("http://127.0.0.1:1").await;

        assert_eq!(outcome.status, TargetStatus::Down);
        assert_eq!(outcome.status_code, 0);
        assert!(outcome.error.is_some());
    }

    #[tokio::test]
    async fn probe_down_on_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(std::time::Duration::from_secs(5)))
            .mount(&server)
            .await;

        let prober = Prober::new(1).unwrap();
        let outcome = prober.probe(&server.uri()).await;

        assert_eq!(outcome.status, TargetStatus::Down);
        assert_eq!(outcome.status_code, 0);
        assert_eq!(outcome.error.as_deref(), Some("timeout"));
    }
}
