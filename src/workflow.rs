//! Review workflow: the only place where a card's review state changes.
//!
//! Submitting a review is three separate steps: load the state from the
//! store, compute the next state with SM-2, save it back. The workflow adds
//! no locking between load and save; a store that needs per-card exclusion
//! must provide it itself.

use crate::clock::Clock;
use crate::error::{ReviewError, Result};
use crate::models::{Grade, ReviewState, due, sm2};
use crate::store::ReviewStore;
use chrono::{DateTime, Utc};
use log::{debug, info};

pub struct ReviewWorkflow<S, C> {
    store: S,
    clock: C,
}

impl<S: ReviewStore, C: Clock> ReviewWorkflow<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Grades a card and persists its next review state.
    pub fn submit_review(&self, card_token: &str, grade: i64) -> Result<ReviewState> {
        let state = self
            .store
            .load_review_state(card_token)?
            .ok_or_else(|| ReviewError::CardNotFound(card_token.to_string()))?;

        let grade = Grade::new(grade)?;

        let now = self.clock.now();
        let next = sm2::advance(&state, grade, now);

        self.store.save_review_state(card_token, &next, now)?;

        info!(
            "card {} graded {}: repetitions {} -> {}, interval {}d, next review {}",
            card_token,
            grade.value(),
            state.repetitions,
            next.repetitions,
            next.interval_days,
            next.next_review_at.to_rfc3339()
        );
        Ok(next)
    }

    /// Card tokens of the deck that are due at `as_of`, earliest first.
    pub fn get_due_cards(&self, deck_token: &str, as_of: DateTime<Utc>) -> Result<Vec<String>> {
        let states = self
            .store
            .list_review_states_for_deck(deck_token)?
            .ok_or_else(|| ReviewError::DeckNotFound(deck_token.to_string()))?;

        let total = states.len();
        let due_cards = due::select_due(states, as_of);
        debug!(
            "deck {}: {} of {} cards due at {}",
            deck_token,
            due_cards.len(),
            total,
            as_of.to_rfc3339()
        );
        Ok(due_cards)
    }

    /// Number of cards in the deck due at `as_of`.
    pub fn count_due_cards(&self, deck_token: &str, as_of: DateTime<Utc>) -> Result<usize> {
        let states = self
            .store
            .list_review_states_for_deck(deck_token)?
            .ok_or_else(|| ReviewError::DeckNotFound(deck_token.to_string()))?;
        Ok(due::count_due(states.iter().map(|(_, s)| s), as_of))
    }

    pub fn get_due_cards_now(&self, deck_token: &str) -> Result<Vec<String>> {
        self.get_due_cards(deck_token, self.clock.now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::models::Flashcard;
    use crate::store::{MemoryStore, StoreError};
    use chrono::{Duration, TimeZone};

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 9, 1, 7, 0, 0).unwrap()
    }

    fn setup() -> (ReviewWorkflow<MemoryStore, FixedClock>, String, Vec<String>) {
        let store = MemoryStore::new();
        let deck = store.add_deck("Polish Vocabulary").unwrap();
        let cards = [("cześć", "hello"), ("dziękuję", "thank you"), ("proszę", "please")]
            .into_iter()
            .map(|(t, d)| store.add_flashcard(&deck, &Flashcard::new(t, d), start()).unwrap())
            .collect();
        (ReviewWorkflow::new(store, FixedClock::new(start())), deck, cards)
    }

    #[test]
    fn test_submit_review_persists_new_state() {
        let (workflow, _, cards) = setup();
        workflow.clock().advance(Duration::hours(1));
        let now = workflow.clock().now();

        let next = workflow.submit_review(&cards[0], 4).unwrap();
        assert_eq!(next.repetitions, 1);
        assert_eq!(next.interval_days, 1);
        assert_eq!(next.next_review_at, now + Duration::days(1));

        let stored = workflow.store().load_review_state(&cards[0]).unwrap();
        assert_eq!(stored, Some(next));
        assert_eq!(workflow.store().updated_at(&cards[0]).unwrap(), Some(now));
    }

    #[test]
    fn test_unknown_card() {
        let (workflow, _, _) = setup();
        let err = workflow.submit_review("nope", 4).unwrap_err();
        assert!(matches!(err, ReviewError::CardNotFound(ref t) if t == "nope"));
    }

    #[test]
    fn test_unknown_card_wins_over_bad_grade() {
        let (workflow, _, _) = setup();
        let err = workflow.submit_review("nope", 9).unwrap_err();
        assert!(matches!(err, ReviewError::CardNotFound(_)));
    }

    #[test]
    fn test_invalid_grade_leaves_state_untouched() {
        let (workflow, _, cards) = setup();
        for bad in [-1, 6, 100] {
            let err = workflow.submit_review(&cards[1], bad).unwrap_err();
            assert!(matches!(err, ReviewError::InvalidGrade(g) if g == bad));
        }
        let stored = workflow.store().load_review_state(&cards[1]).unwrap();
        assert_eq!(stored, Some(ReviewState::new(start())));
    }

    #[test]
    fn test_full_schedule() {
        let (workflow, _, cards) = setup();
        let card = &cards[0];

        let s = workflow.submit_review(card, 5).unwrap();
        assert_eq!((s.repetitions, s.interval_days), (1, 1));

        workflow.clock().advance(Duration::days(1));
        let s = workflow.submit_review(card, 5).unwrap();
        assert_eq!((s.repetitions, s.interval_days), (2, 6));

        workflow.clock().advance(Duration::days(6));
        let s = workflow.submit_review(card, 5).unwrap();
        // 6 * 2.7 = 16.2
        assert_eq!((s.repetitions, s.interval_days), (3, 16));
        assert!((s.easiness_factor - 2.8).abs() < 1e-9);

        workflow.clock().advance(Duration::days(16));
        let s = workflow.submit_review(card, 2).unwrap();
        assert_eq!((s.repetitions, s.interval_days), (0, 1));
        assert!((s.easiness_factor - 2.8).abs() < 1e-9);
        assert_eq!(s.next_review_at, workflow.clock().now() + Duration::days(1));
    }

    #[test]
    fn test_long_perfect_streak_stays_schedulable() {
        let (workflow, _, cards) = setup();
        let mut previous = 0;
        for _ in 0..40 {
            let s = workflow.submit_review(&cards[0], 5).unwrap();
            assert!(s.interval_days >= previous);
            assert_eq!(
                s.next_review_at,
                workflow.clock().now() + Duration::days(s.interval_days.into())
            );
            previous = s.interval_days;
            workflow.clock().advance(Duration::days(s.interval_days.into()));
        }
        assert_eq!(previous, sm2::MAX_INTERVAL_DAYS);
    }

    #[test]
    fn test_due_cards() {
        let (workflow, deck, cards) = setup();

        // New cards are due immediately, in insertion order
        assert_eq!(workflow.get_due_cards(&deck, start()).unwrap(), cards);

        workflow.submit_review(&cards[0], 4).unwrap();
        workflow.submit_review(&cards[2], 1).unwrap();
        let due = workflow.get_due_cards_now(&deck).unwrap();
        assert_eq!(due, vec![cards[1].clone()]);

        let tomorrow = start() + Duration::days(1);
        let due = workflow.get_due_cards(&deck, tomorrow).unwrap();
        assert_eq!(due, vec![cards[1].clone(), cards[0].clone(), cards[2].clone()]);
    }

    #[test]
    fn test_count_due_cards() {
        let (workflow, deck, cards) = setup();
        assert_eq!(workflow.count_due_cards(&deck, start()).unwrap(), 3);

        workflow.submit_review(&cards[1], 5).unwrap();
        assert_eq!(workflow.count_due_cards(&deck, start()).unwrap(), 2);
        let tomorrow = start() + Duration::days(1);
        assert_eq!(workflow.count_due_cards(&deck, tomorrow).unwrap(), 3);

        let err = workflow.count_due_cards("nope", start()).unwrap_err();
        assert!(matches!(err, ReviewError::DeckNotFound(_)));
    }

    #[test]
    fn test_nothing_due_is_ok() {
        let (workflow, deck, _) = setup();
        let due = workflow
            .get_due_cards(&deck, start() - Duration::seconds(1))
            .unwrap();
        assert!(due.is_empty());
    }

    #[test]
    fn test_unknown_deck() {
        let (workflow, _, _) = setup();
        let err = workflow.get_due_cards("nope", start()).unwrap_err();
        assert!(matches!(err, ReviewError::DeckNotFound(_)));
    }

    struct FailingStore;

    impl ReviewStore for FailingStore {
        fn load_review_state(&self, _: &str) -> std::result::Result<Option<ReviewState>, StoreError> {
            Ok(Some(ReviewState::new(start())))
        }

        fn save_review_state(
            &self,
            card_token: &str,
            _: &ReviewState,
            _: DateTime<Utc>,
        ) -> std::result::Result<(), StoreError> {
            Err(StoreError::NotApplied {
                card_token: card_token.to_string(),
            })
        }

        fn list_review_states_for_deck(
            &self,
            _: &str,
        ) -> std::result::Result<Option<Vec<(String, ReviewState)>>, StoreError> {
            Err(StoreError::Poisoned)
        }
    }

    #[test]
    fn test_store_failures_surface_as_persistence() {
        let workflow = ReviewWorkflow::new(FailingStore, FixedClock::new(start()));

        let err = workflow.submit_review("card", 5).unwrap_err();
        assert!(matches!(
            err,
            ReviewError::Persistence(StoreError::NotApplied { .. })
        ));

        let err = workflow.get_due_cards("deck", start()).unwrap_err();
        assert!(matches!(err, ReviewError::Persistence(StoreError::Poisoned)));
    }

    #[test]
    fn test_works_over_sqlite_store() {
        let store = crate::store::SqliteStore::open_in_memory().unwrap();
        let deck = store.add_deck("d").unwrap();
        let card = store
            .add_flashcard(&deck, &Flashcard::new("a", "b"), start())
            .unwrap();

        let workflow = ReviewWorkflow::new(&store, FixedClock::new(start()));
        let next = workflow.submit_review(&card, 3).unwrap();
        assert_eq!(store.load_review_state(&card).unwrap(), Some(next));
        assert!(workflow.get_due_cards(&deck, start()).unwrap().is_empty());
    }
}
