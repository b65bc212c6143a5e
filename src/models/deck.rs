//! Deck is a named set of flashcards, addressed by an opaque token
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    pub token: String,
    pub name: String,
}
