use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use flashcards_app::config::{ClockMode, Config};
use flashcards_app::*;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "flashcards", about = "Spaced repetition flashcards (SM-2)")]
struct Cli {
    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a deck and print its token
    AddDeck { name: String },
    /// Add a card to a deck and print its token
    AddCard {
        deck: String,
        term: String,
        definition: String,
    },
    /// List decks
    Decks,
    /// Create a sample deck
    Seed,
    /// Grade a card 0-5
    Review {
        card: String,
        #[arg(allow_negative_numbers = true)]
        grade: i64,
    },
    /// List cards due for review, earliest first
    Due {
        deck: String,
        /// RFC 3339 timestamp, defaults to now
        #[arg(long, value_parser = parse_timestamp)]
        as_of: Option<DateTime<Utc>>,
    },
    /// Move the simulated date forward by one day
    AdvanceDay,
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    let store = SqliteStore::open(&config.database_path)
        .with_context(|| format!("Failed to open database {}", config.database_path.display()))?;

    let simulated;
    let clock: &dyn Clock = match config.clock {
        ClockMode::System => &SystemClock,
        ClockMode::Simulated => {
            simulated = FixedClock::new(store.current_date()?);
            &simulated
        }
    };

    match cli.command {
        Command::AddDeck { name } => {
            println!("{}", store.add_deck(&name)?);
        }
        Command::AddCard {
            deck,
            term,
            definition,
        } => {
            let card = Flashcard::new(term, definition);
            println!("{}", store.add_flashcard(&deck, &card, clock.now())?);
        }
        Command::Decks => {
            let workflow = ReviewWorkflow::new(&store, clock);
            for deck in store.list_decks()? {
                let due = workflow.count_due_cards(&deck.token, clock.now())?;
                println!("{}\t{}\t{} due", deck.token, deck.name, due);
            }
        }
        Command::Seed => match store.seed_sample_deck(clock.now())? {
            Some(deck) => println!("{}", deck),
            None => println!("decks already exist, nothing seeded"),
        },
        Command::Review { card, grade } => {
            let workflow = ReviewWorkflow::new(&store, clock);
            let state = workflow.submit_review(&card, grade)?;
            println!(
                "next review {} (in {} days, EF {:.2})",
                state.next_review_at.format("%Y-%m-%d"),
                state.interval_days,
                state.easiness_factor
            );
        }
        Command::Due { deck, as_of } => {
            let workflow = ReviewWorkflow::new(&store, clock);
            let due = match as_of {
                Some(as_of) => workflow.get_due_cards(&deck, as_of)?,
                None => workflow.get_due_cards_now(&deck)?,
            };
            for card in due {
                let term = store
                    .flashcard(&card)?
                    .map(|f| f.term)
                    .unwrap_or_default();
                println!("{}\t{}", card, term);
            }
        }
        Command::AdvanceDay => {
            let today = store.advance_day()?;
            println!("{}", today.format("%Y-%m-%d"));
        }
    }

    Ok(())
}
