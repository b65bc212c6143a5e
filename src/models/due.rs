//! Selection of cards that are due for review.
use super::ReviewState;
use chrono::{DateTime, Utc};

/// Returns the keys of cards whose `next_review_at` is at or before `as_of`,
/// earliest first. Cards due at the same moment keep their input order.
pub fn select_due<K, I>(cards: I, as_of: DateTime<Utc>) -> Vec<K>
where
    I: IntoIterator<Item = (K, ReviewState)>,
{
    let mut due: Vec<(K, DateTime<Utc>)> = cards
        .into_iter()
        .filter(|(_, state)| state.is_due(as_of))
        .map(|(key, state)| (key, state.next_review_at))
        .collect();

    // sort_by_key is stable
    due.sort_by_key(|(_, next_review_at)| *next_review_at);
    due.into_iter().map(|(key, _)| key).collect()
}

pub fn count_due<'a, I>(states: I, as_of: DateTime<Utc>) -> usize
where
    I: IntoIterator<Item = &'a ReviewState>,
{
    states.into_iter().filter(|s| s.is_due(as_of)).count()
}
