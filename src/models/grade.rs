//! Recall grade given by the learner after seeing a card.
use crate::error::ReviewError;

/// Lowest grade that counts as a successful recall.
pub const PASSING_GRADE: u8 = 3;

pub const MAX_GRADE: u8 = 5;

/// A grade in 0..=5. 0 is a complete blackout, 5 a perfect response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Grade(u8);

impl Grade {
    pub fn new(value: i64) -> Result<Self, ReviewError> {
        match u8::try_from(value) {
            Ok(v) if v <= MAX_GRADE => Ok(Self(v)),
            _ => Err(ReviewError::InvalidGrade(value)),
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_pass(self) -> bool {
        self.0 >= PASSING_GRADE
    }
}

impl TryFrom<i64> for Grade {
    type Error = ReviewError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
