pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod store;
pub mod workflow;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::ReviewError;
pub use models::{Deck, Flashcard, Grade, ReviewState};
pub use store::{MemoryStore, ReviewStore, SqliteStore, StoreError};
pub use workflow::ReviewWorkflow;
