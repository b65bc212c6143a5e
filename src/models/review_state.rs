//! Per-card memory model used by the SM-2 scheduler.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Easiness factor every new card starts with.
pub const INITIAL_EASINESS_FACTOR: f64 = 2.5;

/// The easiness factor never drops below this value.
pub const MIN_EASINESS_FACTOR: f64 = 1.3;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReviewState {
    pub repetitions: u32,
    pub easiness_factor: f64,
    pub interval_days: u32,
    pub next_review_at: DateTime<Utc>,
}

impl ReviewState {
    /// State of a freshly added card. It is due immediately.
    pub fn new(created_at: DateTime<Utc>) -> Self {
        Self {
            repetitions: 0,
            easiness_factor: INITIAL_EASINESS_FACTOR,
            interval_days: 0,
            next_review_at: created_at,
        }
    }

    pub fn is_due(&self, as_of: DateTime<Utc>) -> bool {
        self.next_review_at <= as_of
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_new_card_is_due_immediately() {
        let created = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        let state = ReviewState::new(created);

        assert_eq!(state.repetitions, 0);
        assert_eq!(state.interval_days, 0);
        assert_eq!(state.easiness_factor, 2.5);
        assert!(state.is_due(created));
        assert!(!state.is_due(created - Duration::seconds(1)));
    }

    #[test]
    fn test_serde_roundtrip() {
        let created = Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap();
        let state = ReviewState::new(created);

        let json = serde_json::to_string(&state).unwrap();
        let back: ReviewState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, back);
    }
}
