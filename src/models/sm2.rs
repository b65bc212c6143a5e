//! SM-2 (SuperMemo 2) spaced repetition algorithm implementation.
//!
//! The SM-2 algorithm calculates review intervals based on recall quality:
//! - Each card has an easiness factor (EF) that adjusts based on performance
//! - Grades 0-2 are a lapse: repetitions reset, the card comes back tomorrow, EF is kept
//! - Grades 3-5 grow the interval progressively (1 day → 6 days → previous interval × EF)
//! - EF is adjusted after each successful review and has a minimum value of 1.3
//!
//! Interval growth rounds half away from zero (`f64::round`) and is capped at
//! [`MAX_INTERVAL_DAYS`]. A review date past chrono's range saturates to the
//! latest representable instant.

use super::review_state::MIN_EASINESS_FACTOR;
use super::{Grade, ReviewState};
use chrono::{DateTime, Duration, Utc};

/// Interval after a lapse and after the first successful recall.
const FIRST_INTERVAL_DAYS: u32 = 1;
const SECOND_INTERVAL_DAYS: u32 = 6;

/// Longest interval the scheduler hands out, roughly a hundred years.
pub const MAX_INTERVAL_DAYS: u32 = 36_500;

/// Calculates the state that follows `state` after a review graded `grade` at `now`.
pub fn advance(state: &ReviewState, grade: Grade, now: DateTime<Utc>) -> ReviewState {
    if !grade.is_pass() {
        return ReviewState {
            repetitions: 0,
            easiness_factor: state.easiness_factor,
            interval_days: FIRST_INTERVAL_DAYS,
            next_review_at: review_date(now, FIRST_INTERVAL_DAYS),
        };
    }

    let repetitions = state.repetitions.saturating_add(1);
    let interval_days = match repetitions {
        1 => FIRST_INTERVAL_DAYS,
        2 => SECOND_INTERVAL_DAYS,
        // Uses the EF from before this review
        _ => grown_interval(state.interval_days, state.easiness_factor),
    };

    ReviewState {
        repetitions,
        easiness_factor: next_easiness_factor(state.easiness_factor, grade),
        interval_days,
        next_review_at: review_date(now, interval_days),
    }
}

fn grown_interval(interval_days: u32, easiness_factor: f64) -> u32 {
    let grown = (f64::from(interval_days) * easiness_factor).round();
    if grown >= f64::from(MAX_INTERVAL_DAYS) {
        MAX_INTERVAL_DAYS
    } else {
        grown as u32
    }
}

fn review_date(now: DateTime<Utc>, interval_days: u32) -> DateTime<Utc> {
    now.checked_add_signed(Duration::days(interval_days.into()))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// EF' = EF + (0.1 - (5 - q) * (0.08 + (5 - q) * 0.02)), floored at 1.3.
fn next_easiness_factor(easiness_factor: f64, grade: Grade) -> f64 {
    let miss = 5.0 - f64::from(grade.value());
    let ef = easiness_factor + (0.1 - miss * (0.08 + miss * 0.02));
    ef.max(MIN_EASINESS_FACTOR)
}
