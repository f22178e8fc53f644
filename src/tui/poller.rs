//! # Connectivity Poller
//!
//! A single deadline owned by the event loop. It is armed when the root asks
//! for the next check and disarmed when the tick fires, so at most one tick
//! is ever pending and a new one is only scheduled after the previous tick
//! has been fully handled.

use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct ConnectivityPoller {
    period: Duration,
    deadline: Option<Instant>,
}

impl ConnectivityPoller {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            deadline: None,
        }
    }

    /// Schedule the next tick one period after `now`. Replaces any pending one.
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.period);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// True once if the deadline has passed; the poller is then disarmed.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// How long the loop may block before the next tick, if one is armed.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unarmed_never_fires() {
        let mut poller = ConnectivityPoller::new(Duration::from_secs(2));
        let now = Instant::now();
        assert!(!poller.take_due(now + Duration::from_secs(60)));
        assert_eq!(poller.time_until_due(now), None);
    }

    #[test]
    fn test_fires_once_per_arm() {
        let mut poller = ConnectivityPoller::new(Duration::from_secs(2));
        let now = Instant::now();
        poller.arm(now);

        assert!(!poller.take_due(now + Duration::from_secs(1)));
        assert_eq!(
            poller.time_until_due(now + Duration::from_secs(1)),
            Some(Duration::from_secs(1))
        );
        assert!(poller.take_due(now + Duration::from_secs(2)));
        assert_eq!(poller.time_until_due(now), None);
        assert!(!poller.take_due(now + Duration::from_secs(10)));
    }

    #[test]
    fn test_cancel_disarms() {
        let mut poller = ConnectivityPoller::new(Duration::from_secs(2));
        let now = Instant::now();
        poller.arm(now);
        poller.cancel();
        assert!(!poller.take_due(now + Duration::from_secs(5)));
    }

    #[test]
    fn test_overdue_waits_zero() {
        let mut poller = ConnectivityPoller::new(Duration::from_millis(10));
        let now = Instant::now();
        poller.arm(now);
        assert_eq!(
            poller.time_until_due(now + Duration::from_secs(1)),
            Some(Duration::ZERO)
        );
    }
}
