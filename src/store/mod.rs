//! Persistence port for review state.
//!
//! The scheduler never talks to a database directly. It loads a card's
//! [`ReviewState`] through [`ReviewStore`], computes the next state and hands
//! it back. Stores decide how concurrent writes to one card are resolved;
//! both adapters here apply each save atomically, last write wins.

pub mod memory;
pub mod sqlite;

use crate::models::ReviewState;
use chrono::{DateTime, Utc};
use thiserror::Error;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("deck '{0}' does not exist")]
    UnknownDeck(String),

    #[error("write for card '{card_token}' was not applied")]
    NotApplied { card_token: String },

    #[error("stored timestamp {0} is out of range")]
    InvalidTimestamp(i64),

    #[error("store lock poisoned")]
    Poisoned,
}

pub trait ReviewStore {
    /// `None` when the card is unknown.
    fn load_review_state(&self, card_token: &str) -> Result<Option<ReviewState>, StoreError>;

    fn save_review_state(
        &self,
        card_token: &str,
        state: &ReviewState,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// `None` when the deck is unknown. Cards come back in insertion order.
    fn list_review_states_for_deck(
        &self,
        deck_token: &str,
    ) -> Result<Option<Vec<(String, ReviewState)>>, StoreError>;
}

impl<S: ReviewStore + ?Sized> ReviewStore for &S {
    fn load_review_state(&self, card_token: &str) -> Result<Option<ReviewState>, StoreError> {
        (**self).load_review_state(card_token)
    }

    fn save_review_state(
        &self,
        card_token: &str,
        state: &ReviewState,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        (**self).save_review_state(card_token, state, updated_at)
    }

    fn list_review_states_for_deck(
        &self,
        deck_token: &str,
    ) -> Result<Option<Vec<(String, ReviewState)>>, StoreError> {
        (**self).list_review_states_for_deck(deck_token)
    }
}

/// Opaque identifier for a new deck or card.
pub(crate) fn new_token() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
