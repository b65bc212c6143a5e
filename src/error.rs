//! Errors surfaced by the review workflow.
use crate::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("card '{0}' not found")]
    CardNotFound(String),

    #[error("deck '{0}' not found")]
    DeckNotFound(String),

    #[error("grade {0} is out of range, expected 0-5")]
    InvalidGrade(i64),

    #[error("persistence failure: {0}")]
    Persistence(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, ReviewError>;
