//! In-memory review store, for tests and for callers that keep cards in memory.
use super::{ReviewStore, StoreError, new_token};
use crate::models::{Deck, Flashcard, ReviewState};
use chrono::{DateTime, Utc};
use std::sync::{Mutex, MutexGuard};

struct CardRow {
    token: String,
    deck_token: String,
    flashcard: Flashcard,
    state: ReviewState,
    updated_at: DateTime<Utc>,
}

#[derive(Default)]
struct Tables {
    decks: Vec<Deck>,
    cards: Vec<CardRow>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Creates a deck and returns its token.
    pub fn add_deck(&self, name: &str) -> Result<String, StoreError> {
        let token = new_token();
        self.lock()?.decks.push(Deck {
            token: token.clone(),
            name: name.to_string(),
        });
        Ok(token)
    }

    /// Adds a card to a deck with a fresh review state and returns its token.
    pub fn add_flashcard(
        &self,
        deck_token: &str,
        flashcard: &Flashcard,
        created_at: DateTime<Utc>,
    ) -> Result<String, StoreError> {
        let mut tables = self.lock()?;
        if !tables.decks.iter().any(|d| d.token == deck_token) {
            return Err(StoreError::UnknownDeck(deck_token.to_string()));
        }

        let token = new_token();
        tables.cards.push(CardRow {
            token: token.clone(),
            deck_token: deck_token.to_string(),
            flashcard: flashcard.clone(),
            state: ReviewState::new(created_at),
            updated_at: created_at,
        });
        Ok(token)
    }

    pub fn flashcard(&self, card_token: &str) -> Result<Option<Flashcard>, StoreError> {
        Ok(self
            .lock()?
            .cards
            .iter()
            .find(|c| c.token == card_token)
            .map(|c| c.flashcard.clone()))
    }

    pub fn updated_at(&self, card_token: &str) -> Result<Option<DateTime<Utc>>, StoreError> {
        Ok(self
            .lock()?
            .cards
            .iter()
            .find(|c| c.token == card_token)
            .map(|c| c.updated_at))
    }
}

impl ReviewStore for MemoryStore {
    fn load_review_state(&self, card_token: &str) -> Result<Option<ReviewState>, StoreError> {
        Ok(self
            .lock()?
            .cards
            .iter()
            .find(|c| c.token == card_token)
            .map(|c| c.state.clone()))
    }

    fn save_review_state(
        &self,
        card_token: &str,
        state: &ReviewState,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        let row = tables
            .cards
            .iter_mut()
            .find(|c| c.token == card_token)
            .ok_or_else(|| StoreError::NotApplied {
                card_token: card_token.to_string(),
            })?;
        row.state = state.clone();
        row.updated_at = updated_at;
        Ok(())
    }

    fn list_review_states_for_deck(
        &self,
        deck_token: &str,
    ) -> Result<Option<Vec<(String, ReviewState)>>, StoreError> {
        let tables = self.lock()?;
        if !tables.decks.iter().any(|d| d.token == deck_token) {
            return Ok(None);
        }

        Ok(Some(
            tables
                .cards
                .iter()
                .filter(|c| c.deck_token == deck_token)
                .map(|c| (c.token.clone(), c.state.clone()))
                .collect(),
        ))
    }
}
