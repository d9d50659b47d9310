//! Flashcards stored as plain files, bucketed by the day they are due, and
//! scheduled by doubling the review interval on every success.
//!
//! Provides:
//! - Card store and record format
//! - Category index with id counter and due-date buckets
//! - Interval-doubling scheduler with an injectable clock
//! - The commands behind the `cardbox` binary

pub mod add;
pub mod card;
pub mod category;
pub mod config;
pub mod date;
pub mod error;
pub mod export;
pub mod init;
pub mod record;
pub mod remove;
pub mod review;
pub mod scheduler;
pub mod stats;
mod utils;

pub use card::{Card, CardChanges};
pub use category::Category;
pub use config::Config;
pub use date::{bucket_key, parse_bucket_key, Clock, FixedClock, SystemClock};
pub use error::{Error, Result};
pub use scheduler::{Outcome, Scheduler, DEFAULT_MULTIPLIER};
