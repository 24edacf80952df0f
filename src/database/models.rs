use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::monitoring::stats::CheckStats;
use crate::monitoring::types::{CheckOutcome, TargetStatus};

/// A monitored endpoint plus its configuration and running statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoredTarget {
    pub id: Option<i64>,
    pub uuid: Uuid,
    pub owner_id: i64,
    pub endpoint: String,
    pub interval_seconds: u64,
    pub status: TargetStatus,
    pub last_checked_at: SystemTime,
    pub last_status_code: u16,
    pub last_response_time_ms: u64,
    pub total_checks: u64,
    pub successful_checks: u64,
    pub notifications_enabled: bool,
    pub created_at: SystemTime,
}

impl MonitoredTarget {
    /// Create a target seeded from its initial probe
    ///
    /// A target is never constructed without a known status: the caller
    /// runs one synchronous probe first and passes the outcome here.
    pub fn new(owner_id: i64, endpoint: String, interval_seconds: u64, initial: &CheckOutcome) -> Self {
        Self {
            id: None,
            uuid: Uuid::new_v4(),
            owner_id,
            endpoint,
            interval_seconds,
            status: initial.status,
            last_checked_at: initial.checked_at,
            last_status_code: initial.status_code,
            last_response_time_ms: initial.response_time_ms,
            total_checks: 1,
            successful_checks: u64::from(initial.is_up()),
            notifications_enabled: true,
            created_at: SystemTime::now(),
        }
    }

    /// Availability percentage, always derived from the counter pair
    pub fn uptime_percentage(&self) -> f64 {
        CheckStats {
            total_checks: self.total_checks,
            successful_checks: self.successful_checks,
        }
        .uptime_percentage()
    }

    /// Convert SystemTime to Unix timestamp
    pub fn timestamp_to_i64(time: SystemTime) -> i64 {
        time.duration_since(UNIX_EPOCH).unwrap_or_default().as_secs() as i64
    }

    /// Convert Unix timestamp to SystemTime
    pub fn i64_to_timestamp(timestamp: i64) -> SystemTime {
        UNIX_EPOCH + std::time::Duration::from_secs(timestamp.max(0) as u64)
    }
}

/// Aggregate statistics over one owner's targets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerStats {
    pub total_targets: usize,
    pub online_targets: usize,
    pub offline_targets: usize,
    pub average_uptime: f64,
    pub average_response_time_ms: f64,
}

impl OwnerStats {
    pub fn from_targets(targets: &[MonitoredTarget]) -> Self {
        if targets.is_empty() {
            return Self {
                total_targets: 0,
                online_targets: 0,
                offline_targets: 0,
                average_uptime: 0.0,
                average_response_time_ms: 0.0,
            };
        }

        let total = targets.len();
        let online = targets.iter().filter(|t| t.status.is_up()).count();
        let avg_uptime =
            targets.iter().map(|t| t.uptime_percentage()).sum::<f64>() / total as f64;
        let avg_response =
            targets.iter().map(|t| t.last_response_time_ms as f64).sum::<f64>() / total as f64;

        Self {
            total_targets: total,
            online_targets: online,
            offline_targets: total - online,
            average_uptime: avg_uptime,
            average_response_time_ms: avg_response,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitoring::types::CheckOutcome;

    #[test]
    fn new_target_seeds_counters_from_initial_probe() {
        let up = CheckOutcome::responded(200, 42);
        let target = MonitoredTarget::new(7, "https://example.com".into(), 60, &up);
        assert_eq!(target.total_checks, 1);
        assert_eq!(target.successful_checks, 1);
        assert_eq!(target.uptime_percentage(), 100.0);
        assert_eq!(target.status, TargetStatus::Up);
        assert!(target.notifications_enabled);

        let down = CheckOutcome::responded(500, 42);
        let target = MonitoredTarget::new(7, "https://example.com".into(), 60, &down);
        assert_eq!(target.total_checks, 1);
        assert_eq!(target.successful_checks, 0);
        assert_eq!(target.uptime_percentage(), 0.0);
    }

    #[test]
    fn owner_stats_aggregation() {
        let up = CheckOutcome::responded(200, 100);
        let down = CheckOutcome::responded(503, 300);

        let a = MonitoredTarget::new(1, "https://a.example".into(), 60, &up);
        let b = MonitoredTarget::new(1, "https://b.example".into(), 60, &down);

        let stats = OwnerStats::from_targets(&[a, b]);
        assert_eq!(stats.total_targets, 2);
        assert_eq!(stats.online_targets, 1);
        assert_eq!(stats.offline_targets, 1);
        assert_eq!(stats.average_uptime, 50.0);
        assert_eq!(stats.average_response_time_ms, 200.0);

        let empty = OwnerStats::from_targets(&[]);
        assert_eq!(empty.total_targets, 0);
        assert_eq!(empty.average_uptime, 0.0);
    }
}
