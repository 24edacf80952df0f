use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use super::{Notifier, NotifierError};
use crate::database::models::MonitoredTarget;
use crate::monitoring::stats::CheckStats;
use crate::monitoring::types::CheckOutcome;
use crate::validation;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Pushes status-change alerts through the Telegram Bot API
///
/// The owner id doubles as the Telegram chat id.
pub struct TelegramNotifier {
    client: Client,
    bot_token: String,
    api_base: String,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
}

impl TelegramNotifier {
    pub fn new(bot_token: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            bot_token: bot_token.into(),
            api_base: TELEGRAM_API_BASE.to_string(),
        })
    }

    /// Point the sender at a different API host (used by tests)
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn format_message(target: &MonitoredTarget, outcome: &CheckOutcome) -> String {
        let time: DateTime<Utc> = outcome.checked_at.into();
        let time = time.format("%Y-%m-%d %H:%M UTC");
        let interval = validation::interval_label(target.interval_seconds)
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}s", target.interval_seconds));

        if outcome.is_up() {
            let stats =
                CheckStats::apply(target.total_checks, target.successful_checks, outcome);
            format!(
                "✅ Website Back Online!\n\n\
                 URL: {}\n\
                 Status: UP\n\
                 Time: {}\n\
                 Response: {}ms\n\
                 Uptime: {:.2}%\n\n\
                 Your website is back!",
                target.endpoint,
                time,
                outcome.response_time_ms,
                stats.uptime_percentage(),
            )
        } else {
            let cause = outcome
                .error
                .clone()
                .unwrap_or_else(|| format!("HTTP {}", outcome.status_code));
            format!(
                "🚨 Website Down Alert!\n\n\
                 URL: {}\n\
                 Status: DOWN\n\
                 Time: {}\n\
                 Error: {}\n\
                 Interval: {}\n\n\
                 Your website is unreachable!",
                target.endpoint, time, cause, interval,
            )
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify_status_change(
        &self,
        owner_id: i64,
        target: &MonitoredTarget,
        outcome: &CheckOutcome,
    ) -> Result<(), NotifierError> {
        if self.bot_token.is_empty() {
            return Err(NotifierError::InvalidConfiguration(
                "empty bot token".to_string(),
            ));
        }

        let url = format!("{}/bot{}/sendMessage", self.api_base, self.bot_token);
        let text = Self::format_message(target, outcome);
        let payload = SendMessage {
            chat_id: owner_id,
            text: &text,
        };

        let response = self.client.post(&url).json(&payload).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error body".to_string());
            return Err(NotifierError::SendFailed(format!(
                "Telegram API returned {status}: {body}"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitoring::types::CheckOutcome;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn target_snapshot(outcome: &CheckOutcome) -> MonitoredTarget {
        MonitoredTarget::new(42, "https://example.com".to_string(), 300, outcome)
    }

    #[test]
    fn down_alert_body() {
        let up = CheckOutcome::responded(200, 50);
        let target = target_snapshot(&up);
        let down = CheckOutcome::responded(503, 120);

        let message = TelegramNotifier::format_message(&target, &down);
        assert!(message.contains("Down Alert"));
        assert!(message.contains("https://example.com"));
        assert!(message.contains("HTTP 503"));
        assert!(message.contains("Interval: 5min"));
    }

    #[test]
    fn recovery_alert_body() {
        let down = CheckOutcome::responded(500, 50);
        let mut target = target_snapshot(&down);
        target.total_checks = 3;
        target.successful_checks = 1;
        let up = CheckOutcome::responded(200, 80);

        let message = TelegramNotifier::format_message(&target, &up);
        assert!(message.contains("Back Online"));
        assert!(message.contains("Response: 80ms"));
        // 2 successes out of 4 checks after this outcome
        assert!(message.contains("Uptime: 50.00%"));
    }

    #[tokio::test]
    async fn sends_through_bot_api() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bottest-token/sendMessage"))
            .and(body_string_contains("Down Alert"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = TelegramNotifier::new("test-token")
            .unwrap()
            .with_api_base(server.uri());
        let up = CheckOutcome::responded(200, 50);
        let target = target_snapshot(&up);
        let down = CheckOutcome::failed("timeout", 10_000);

        notifier
            .notify_status_change(42, &target, &down)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn delivery_failure_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let notifier = TelegramNotifier::new("test-token")
            .unwrap()
            .with_api_base(server.uri());
        let up = CheckOutcome::responded(200, 50);
        let target = target_snapshot(&up);
        let down = CheckOutcome::responded(503, 90);

        let err = notifier
            .notify_status_change(42, &target, &down)
            .await
            .unwrap_err();
        assert!(matches!(err, NotifierError::SendFailed(_)));
    }
}
