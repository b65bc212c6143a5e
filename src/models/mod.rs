pub mod deck;
pub mod due;
pub mod flashcard;
pub mod grade;
pub mod review_state;
pub mod sm2;

pub use deck::Deck;
pub use flashcard::Flashcard;
pub use grade::Grade;
pub use review_state::ReviewState;
