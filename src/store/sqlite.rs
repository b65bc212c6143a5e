//! SQLite-backed review store
//!
//! Holds decks, flashcards with their SM-2 review state, and the simulated
//! study date. Timestamps are stored as UTC milliseconds since the epoch.

use super::{ReviewStore, StoreError, new_token};
use crate::models::{Deck, Flashcard, ReviewState};
use chrono::{DateTime, Duration, Utc};
use log::{debug, info};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS decks (
    token TEXT PRIMARY KEY,
    name TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS flashcards (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    token TEXT NOT NULL UNIQUE,
    deck_token TEXT NOT NULL,
    term TEXT NOT NULL,
    definition TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    repetitions INTEGER NOT NULL DEFAULT 0,
    easiness_factor REAL NOT NULL DEFAULT 2.5,
    interval_days INTEGER NOT NULL DEFAULT 0,
    next_review_at INTEGER NOT NULL,
    FOREIGN KEY (deck_token) REFERENCES decks(token) ON DELETE CASCADE,
    UNIQUE(deck_token, term)
);
CREATE INDEX IF NOT EXISTS flashcards_due ON flashcards(deck_token, next_review_at);
CREATE TABLE IF NOT EXISTS app_state (
    key TEXT PRIMARY KEY,
    value INTEGER NOT NULL
);
";

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        debug!("opening review store at {}", path.as_ref().display());
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    /// Creates missing tables and seeds the simulated date with the current time.
    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        conn.execute(
            "INSERT OR IGNORE INTO app_state (key, value) VALUES ('current_date', ?1)",
            params![Utc::now().timestamp_millis()],
        )?;
        Ok(Self { conn })
    }

    /// Simulated "today" used when the store drives the clock.
    pub fn current_date(&self) -> Result<DateTime<Utc>, StoreError> {
        let millis: i64 = self.conn.query_row(
            "SELECT value FROM app_state WHERE key = 'current_date'",
            [],
            |row| row.get(0),
        )?;
        from_millis(millis)
    }

    pub fn set_current_date(&self, date: DateTime<Utc>) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO app_state (key, value) VALUES ('current_date', ?1)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![date.timestamp_millis()],
        )?;
        Ok(())
    }

    /// Moves the simulated date forward by 24 hours and returns the new date.
    pub fn advance_day(&self) -> Result<DateTime<Utc>, StoreError> {
        let next_day = self.current_date()? + Duration::days(1);
        self.set_current_date(next_day)?;
        info!("simulated date advanced to {}", next_day.format("%Y-%m-%d"));
        Ok(next_day)
    }

    pub fn add_deck(&self, name: &str) -> Result<String, StoreError> {
        let token = new_token();
        self.conn.execute(
            "INSERT INTO decks (token, name) VALUES (?1, ?2)",
            params![token, name],
        )?;
        info!("deck '{}' created with token {}", name, token);
        Ok(token)
    }

    pub fn list_decks(&self) -> Result<Vec<Deck>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT token, name FROM decks ORDER BY rowid")?;
        let decks = stmt
            .query_map([], |row| {
                Ok(Deck {
                    token: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<Deck>>>()?;
        Ok(decks)
    }

    /// Adds a flashcard to a deck and initializes its review state.
    ///
    /// Returns the card token. If the deck already holds a card with the same
    /// term, the existing card is kept and its token returned.
    pub fn add_flashcard(
        &self,
        deck_token: &str,
        flashcard: &Flashcard,
        created_at: DateTime<Utc>,
    ) -> Result<String, StoreError> {
        let deck_exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM decks WHERE token = ?1)",
            params![deck_token],
            |row| row.get(0),
        )?;
        if !deck_exists {
            return Err(StoreError::UnknownDeck(deck_token.to_string()));
        }

        let state = ReviewState::new(created_at);
        let created = created_at.timestamp_millis();
        self.conn.execute(
            "INSERT OR IGNORE INTO flashcards
                (token, deck_token, term, definition, created_at, updated_at,
                 repetitions, easiness_factor, interval_days, next_review_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5, ?6, ?7, ?8, ?9)",
            params![
                new_token(),
                deck_token,
                flashcard.term,
                flashcard.definition,
                created,
                state.repetitions,
                state.easiness_factor,
                state.interval_days,
                state.next_review_at.timestamp_millis(),
            ],
        )?;

        let token: String = self.conn.query_row(
            "SELECT token FROM flashcards WHERE deck_token = ?1 AND term = ?2",
            params![deck_token, flashcard.term],
            |row| row.get(0),
        )?;
        Ok(token)
    }

    /// Creates the Polish sample deck when the store has no decks yet.
    ///
    /// Returns the new deck token, or `None` if decks already exist.
    pub fn seed_sample_deck(&self, created_at: DateTime<Utc>) -> Result<Option<String>, StoreError> {
        if !self.list_decks()?.is_empty() {
            debug!("decks already exist, skipping sample data");
            return Ok(None);
        }

        let deck = self.add_deck("Polish Vocabulary")?;
        let samples = [
            ("cześć", "hello"),
            ("dziękuję", "thank you"),
            ("proszę", "please"),
        ];
        for (term, definition) in samples {
            self.add_flashcard(&deck, &Flashcard::new(term, definition), created_at)?;
        }
        Ok(Some(deck))
    }

    pub fn flashcard(&self, card_token: &str) -> Result<Option<Flashcard>, StoreError> {
        let card = self
            .conn
            .query_row(
                "SELECT term, definition FROM flashcards WHERE token = ?1",
                params![card_token],
                |row| {
                    Ok(Flashcard {
                        term: row.get(0)?,
                        definition: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(card)
    }

    pub fn updated_at(&self, card_token: &str) -> Result<Option<DateTime<Utc>>, StoreError> {
        let millis: Option<i64> = self
            .conn
            .query_row(
                "SELECT updated_at FROM flashcards WHERE token = ?1",
                params![card_token],
                |row| row.get(0),
            )
            .optional()?;
        millis.map(from_millis).transpose()
    }
}

impl ReviewStore for SqliteStore {
    fn load_review_state(&self, card_token: &str) -> Result<Option<ReviewState>, StoreError> {
        let row: Option<(u32, f64, u32, i64)> = self
            .conn
            .query_row(
                "SELECT repetitions, easiness_factor, interval_days, next_review_at
                 FROM flashcards WHERE token = ?1",
                params![card_token],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?;
        row.map(into_state).transpose()
    }

    /// Single-statement update, so concurrent saves to one card resolve as last write wins.
    fn save_review_state(
        &self,
        card_token: &str,
        state: &ReviewState,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let changed = self.conn.execute(
            "UPDATE flashcards
             SET repetitions = ?1, easiness_factor = ?2, interval_days = ?3,
                 next_review_at = ?4, updated_at = ?5
             WHERE token = ?6",
            params![
                state.repetitions,
                state.easiness_factor,
                state.interval_days,
                state.next_review_at.timestamp_millis(),
                updated_at.timestamp_millis(),
                card_token,
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::NotApplied {
                card_token: card_token.to_string(),
            });
        }
        Ok(())
    }

    fn list_review_states_for_deck(
        &self,
        deck_token: &str,
    ) -> Result<Option<Vec<(String, ReviewState)>>, StoreError> {
        let deck_exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM decks WHERE token = ?1)",
            params![deck_token],
            |row| row.get(0),
        )?;
        if !deck_exists {
            return Ok(None);
        }

        let mut stmt = self.conn.prepare(
            "SELECT token, repetitions, easiness_factor, interval_days, next_review_at
             FROM flashcards WHERE deck_token = ?1
             ORDER BY id ASC",
        )?;
        let rows = stmt
            .query_map(params![deck_token], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    (row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?),
                ))
            })?
            .collect::<rusqlite::Result<Vec<(String, (u32, f64, u32, i64))>>>()?;

        let states = rows
            .into_iter()
            .map(|(token, raw)| Ok((token, into_state(raw)?)))
            .collect::<Result<Vec<_>, StoreError>>()?;
        Ok(Some(states))
    }
}

fn from_millis(millis: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp_millis(millis).ok_or(StoreError::InvalidTimestamp(millis))
}

fn into_state(
    (repetitions, easiness_factor, interval_days, next_review_at): (u32, f64, u32, i64),
) -> Result<ReviewState, StoreError> {
    Ok(ReviewState {
        repetitions,
        easiness_factor,
        interval_days,
        next_review_at: from_millis(next_review_at)?,
    })
}
