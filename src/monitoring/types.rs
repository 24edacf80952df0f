use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Known state of a monitored target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetStatus {
    Up,
    Down,
}

impl TargetStatus {
    pub fn is_up(self) -> bool {
        matches!(self, TargetStatus::Up)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TargetStatus::Up => "up",
            TargetStatus::Down => "down",
        }
    }

    /// Parse a persisted status string; anything unrecognized reads as down
    pub fn from_db(value: &str) -> Self {
        match value {
            "up" => TargetStatus::Up,
            _ => TargetStatus::Down,
        }
    }
}

impl std::fmt::Display for TargetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single probe
///
/// Produced by the prober, consumed within the same monitoring cycle;
/// never persisted standalone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckOutcome {
    /// Classified status of the probe
    pub status: TargetStatus,

    /// HTTP status code, or 0 when the request never produced a response
    pub status_code: u16,

    /// Time from request start to terminal outcome
    pub response_time_ms: u64,

    /// When the probe ran
    pub checked_at: SystemTime,

    /// Short machine-readable failure cause ("timeout" or transport error)
    pub error: Option<String>,
}

impl CheckOutcome {
    /// Outcome for a probe that received an HTTP response
    pub fn responded(status_code: u16, response_time_ms: u64) -> Self {
        let status = if status_code < 500 {
            TargetStatus::Up
        } else {
            TargetStatus::Down
        };
        Self {
            status,
            status_code,
            response_time_ms,
            checked_at: SystemTime::now(),
            error: None,
        }
    }

    /// Outcome for a probe that never reached the endpoint
    pub fn failed(error: impl Into<String>, response_time_ms: u64) -> Self {
        Self {
            status: TargetStatus::Down,
            status_code: 0,
            response_time_ms,
            checked_at: SystemTime::now(),
            error: Some(error.into()),
        }
    }

    pub fn is_up(&self) -> bool {
        self.status.is_up()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_status_code() {
        assert_eq!(CheckOutcome::responded(200, 10).status, TargetStatus::Up);
        assert_eq!(CheckOutcome::responded(301, 10).status, TargetStatus::Up);
        assert_eq!(CheckOutcome::responded(404, 10).status, TargetStatus::Up);
        assert_eq!(CheckOutcome::responded(499, 10).status, TargetStatus::Up);
        assert_eq!(CheckOutcome::responded(500, 10).status, TargetStatus::Down);
        assert_eq!(CheckOutcome::responded(503, 10).status, TargetStatus::Down);
    }

    #[test]
    fn failure_has_zero_status_code() {
        let outcome = CheckOutcome::failed("timeout", 10_000);
        assert_eq!(outcome.status, TargetStatus::Down);
        assert_eq!(outcome.status_code, 0);
        assert_eq!(outcome.error.as_deref(), Some("timeout"));
    }
}
