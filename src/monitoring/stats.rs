use super::types::CheckOutcome;

/// Running availability counters after applying one check outcome
///
/// Pure value type: applying the same snapshot and outcome always yields
/// the same counters. `0 <= successful_checks <= total_checks` holds by
/// construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckStats {
    pub total_checks: u64,
    pub successful_checks: u64,
}

impl CheckStats {
    /// Apply one outcome to a counter snapshot
    pub fn apply(total_checks: u64, successful_checks: u64, outcome: &CheckOutcome) -> Self {
        Self {
            total_checks: total_checks + 1,
            successful_checks: successful_checks + u64::from(outcome.is_up()),
        }
    }

    /// Availability as a percentage, derived from the counter pair
    pub fn uptime_percentage(&self) -> f64 {
        if self.total_checks == 0 {
            return 0.0;
        }
        (self.successful_checks as f64 / self.total_checks as f64) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitoring::types::{CheckOutcome, TargetStatus};

    fn up() -> CheckOutcome {
        CheckOutcome::responded(200, 50)
    }

    fn down() -> CheckOutcome {
        CheckOutcome::responded(503, 50)
    }

    #[test]
    fn counters_increment() {
        let stats = CheckStats::apply(0, 0, &up());
        assert_eq!(stats.total_checks, 1);
        assert_eq!(stats.successful_checks, 1);
        assert_eq!(stats.uptime_percentage(), 100.0);

        let stats = CheckStats::apply(stats.total_checks, stats.successful_checks, &down());
        assert_eq!(stats.total_checks, 2);
        assert_eq!(stats.successful_checks, 1);
        assert_eq!(stats.uptime_percentage(), 50.0);
    }

    #[test]
    fn invariant_holds_over_arbitrary_sequences() {
        let outcomes = [
            up(),
            down(),
            down(),
            up(),
            CheckOutcome::failed("timeout", 10_000),
            up(),
        ];

        let mut total = 10u64;
        let mut successful = 8u64;

        for outcome in &outcomes {
            let stats = CheckStats::apply(total, successful, outcome);
            assert!(stats.successful_checks <= stats.total_checks);
            assert_eq!(stats.total_checks, total + 1);
            let expected =
                (stats.successful_checks as f64 / stats.total_checks as f64) * 100.0;
            assert_eq!(stats.uptime_percentage(), expected);
            total = stats.total_checks;
            successful = stats.successful_checks;
        }

        assert_eq!(total, 16);
        assert_eq!(successful, 11);
    }

    #[test]
    fn resume_seeded_counters() {
        // Persisted history 10/8, one more successful cycle after restart
        let stats = CheckStats::apply(10, 8, &up());
        assert_eq!(stats.total_checks, 11);
        assert_eq!(stats.successful_checks, 9);
        assert!((stats.uptime_percentage() - 81.8181).abs() < 0.01);
    }

    #[test]
    fn distinct_checks_are_not_deduplicated() {
        let outcome = up();
        assert_eq!(outcome.status, TargetStatus::Up);
        let first = CheckStats::apply(0, 0, &outcome);
        let second = CheckStats::apply(first.total_checks, first.successful_checks, &outcome);
        assert_eq!(second.total_checks, 2);
        assert_eq!(second.successful_checks, 2);
    }
}
