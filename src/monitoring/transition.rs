use super::types::TargetStatus;

/// Decide whether a status transition warrants a notification
///
/// Evaluated once per cycle against the status stored before the cycle's
/// update is committed, so each flap edge produces exactly one
/// notification and a stable status produces none.
pub fn should_notify(
    previous: TargetStatus,
    new: TargetStatus,
    notifications_enabled: bool,
) -> bool {
    notifications_enabled && previous != new
}

#[cfg(test)]
mod tests {
    use super::*;
    use TargetStatus::{Down, Up};

    #[test]
    fn notifies_only_on_enabled_transitions() {
        assert!(!should_notify(Up, Up, true));
        assert!(!should_notify(Down, Down, true));
        assert!(should_notify(Up, Down, true));
        assert!(should_notify(Down, Up, true));
        assert!(!should_notify(Up, Down, false));
        assert!(!should_notify(Down, Up, false));
    }
}
