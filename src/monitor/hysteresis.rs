//! Debounce filter for the controller link flag.
//!
//! The backend reports `opcua_connected` on every poll and the raw flag can
//! flap for a single sample. The filter requires a run of consecutive
//! differing readings before committing a change, so the indicator converges
//! within `threshold` polls of a sustained transition without flickering.

use std::fmt;

/// Consecutive differing readings required to commit a transition.
pub const DEFAULT_CONFIRM_THRESHOLD: u32 = 3;

/// Confirmed state of the controller link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Connected,
    Disconnected,
}

impl LinkState {
    pub fn from_flag(connected: bool) -> Self {
        if connected {
            Self::Connected
        } else {
            Self::Disconnected
        }
    }

    pub fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Indicator label shown on the panel.
    pub fn label(self) -> &'static str {
        match self {
            Self::Connected => "Connected",
            Self::Disconnected => "Disconnected",
        }
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Debounces the observed link flag. One instance lives inside the status
/// poller for the lifetime of the process; `pending` stays below the
/// threshold between calls.
#[derive(Debug, Clone)]
pub struct HysteresisFilter {
    confirmed: LinkState,
    pending: u32,
    threshold: u32,
}

impl HysteresisFilter {
    /// Starts `Disconnected` with nothing pending. Zero would never commit,
    /// so the threshold is floored at 1.
    pub fn new(threshold: u32) -> Self {
        Self {
            confirmed: LinkState::Disconnected,
            pending: 0,
            threshold: threshold.max(1),
        }
    }

    /// Feed one observed flag through the filter. Returns `Some(new_state)`
    /// on the observation that commits a transition, `None` otherwise.
    ///
    /// A reading that matches the confirmed state clears the pending count;
    /// partial confirmations never survive a stable reading.
    pub fn observe(&mut self, connected: bool) -> Option<LinkState> {
        let observed = LinkState::from_flag(connected);
        if observed == self.confirmed {
            self.pending = 0;
            return None;
        }

        self.pending += 1;
        if self.pending >= self.threshold {
            self.confirmed = observed;
            self.pending = 0;
            return Some(observed);
        }
        None
    }

    pub fn confirmed(&self) -> LinkState {
        self.confirmed
    }

    /// Consecutive differing readings seen so far.
    pub fn pending(&self) -> u32 {
        self.pending
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }
}

impl Default for HysteresisFilter {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIRM_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_disconnected_with_nothing_pending() {
        let filter = HysteresisFilter::default();
        assert_eq!(filter.confirmed(), LinkState::Disconnected);
        assert_eq!(filter.pending(), 0);
        assert_eq!(filter.threshold(), DEFAULT_CONFIRM_THRESHOLD);
    }

    #[test]
    fn stable_false_readings_stay_disconnected() {
        let mut filter = HysteresisFilter::new(3);
        for _ in 0..3 {
            assert_eq!(filter.observe(false), None);
            assert_eq!(filter.confirmed(), LinkState::Disconnected);
            assert_eq!(filter.pending(), 0);
        }
    }

    #[test]
    fn three_true_readings_commit_connected() {
        let mut filter = HysteresisFilter::new(3);
        assert_eq!(filter.observe(true), None);
        assert_eq!(filter.pending(), 1);
        assert_eq!(filter.observe(true), None);
        assert_eq!(filter.pending(), 2);
        assert_eq!(filter.observe(true), Some(LinkState::Connected));
        assert_eq!(filter.confirmed(), LinkState::Connected);
        assert_eq!(filter.pending(), 0);
    }

    #[test]
    fn intervening_stable_reading_resets_the_run() {
        let mut filter = HysteresisFilter::new(3);
        let trace = [true, true, false, true, true, true];
        let mut committed_at = None;
        for (i, flag) in trace.iter().enumerate() {
            if filter.observe(*flag).is_some() {
                committed_at = Some(i + 1);
            }
        }
        assert_eq!(committed_at, Some(6));
        assert_eq!(filter.confirmed(), LinkState::Connected);
    }

    #[test]
    fn single_flap_never_moves_the_indicator() {
        let mut filter = HysteresisFilter::new(3);
        assert_eq!(filter.observe(true), None);
        assert_eq!(filter.observe(false), None);
        assert_eq!(filter.confirmed(), LinkState::Disconnected);
        assert_eq!(filter.pending(), 0);
    }

    #[test]
    fn disconnect_requires_the_same_run_length() {
        let mut filter = HysteresisFilter::new(3);
        for _ in 0..3 {
            filter.observe(true);
        }
        assert_eq!(filter.confirmed(), LinkState::Connected);

        assert_eq!(filter.observe(false), None);
        assert_eq!(filter.observe(false), None);
        assert_eq!(filter.observe(false), Some(LinkState::Disconnected));
        assert_eq!(filter.pending(), 0);
    }

    #[test]
    fn committed_state_readings_keep_pending_at_zero() {
        let mut filter = HysteresisFilter::new(3);
        for _ in 0..3 {
            filter.observe(true);
        }
        for _ in 0..10 {
            assert_eq!(filter.observe(true), None);
            assert_eq!(filter.pending(), 0);
        }
        assert_eq!(filter.confirmed(), LinkState::Connected);
    }

    #[test]
    fn pending_stays_below_threshold_through_noise() {
        let mut filter = HysteresisFilter::new(3);
        let noisy = [
            true, false, true, true, false, false, true, true, true, false, true, false, false,
            false, true,
        ];
        for flag in noisy {
            filter.observe(flag);
            assert!(filter.pending() < filter.threshold());
        }
    }

    #[test]
    fn threshold_of_one_commits_immediately() {
        let mut filter = HysteresisFilter::new(1);
        assert_eq!(filter.observe(true), Some(LinkState::Connected));
        assert_eq!(filter.observe(false), Some(LinkState::Disconnected));
    }

    #[test]
    fn zero_threshold_is_floored_to_one() {
        let mut filter = HysteresisFilter::new(0);
        assert_eq!(filter.threshold(), 1);
        assert_eq!(filter.observe(true), Some(LinkState::Connected));
    }

    #[test]
    fn label_matches_state() {
        assert_eq!(LinkState::Connected.label(), "Connected");
        assert_eq!(LinkState::Disconnected.label(), "Disconnected");
        assert_eq!(LinkState::from_flag(true), LinkState::Connected);
        assert_eq!(LinkState::from_flag(false), LinkState::Disconnected);
        assert!(LinkState::Connected.is_connected());
        assert!(!LinkState::Disconnected.is_connected());
    }
}
