//! Interval-doubling scheduler.
//!
//! ```text
//!          Number of days
//! Level 0: 0
//! Level 1: 1
//! Level 2: 2
//! Level 3: 4
//! Level 4: 8
//! ...
//! ```
//!
//! A successful review moves a card one level up, a failed one moves it one
//! level down, never below 0.

use chrono::{Days, NaiveDate};

use crate::card::{Card, CardChanges};
use crate::category::Category;
use crate::date::{bucket_key, Clock, SystemClock};
use crate::error::{Error, Result};

pub const DEFAULT_MULTIPLIER: u32 = 2;

/// Result of one review event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

impl From<bool> for Outcome {
    fn from(success: bool) -> Self {
        if success {
            Self::Success
        } else {
            Self::Failure
        }
    }
}

#[derive(Debug, Clone)]
pub struct Scheduler<C = SystemClock> {
    multiplier: u32,
    clock: C,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self {
            multiplier: DEFAULT_MULTIPLIER,
            clock: SystemClock,
        }
    }
}

impl<C: Clock> Scheduler<C> {
    pub fn new(multiplier: u32, clock: C) -> Result<Self> {
        if multiplier == 0 {
            return Err(Error::Config("multiplier must be at least 1".to_string()));
        }
        Ok(Self { multiplier, clock })
    }

    pub fn multiplier(&self) -> u32 {
        self.multiplier
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Days until the next review for a card at `level`. Saturates.
    pub fn interval(&self, level: u32) -> u64 {
        if level == 0 {
            return 0;
        }
        u64::from(self.multiplier)
            .checked_pow(level - 1)
            .unwrap_or(u64::MAX)
    }

    /// New level and due date for a card at `level` reviewed on `today`.
    pub fn schedule(
        &self,
        level: u32,
        outcome: Outcome,
        today: NaiveDate,
    ) -> Result<(u32, NaiveDate)> {
        let level = match outcome {
            Outcome::Success => level.saturating_add(1),
            Outcome::Failure => level.saturating_sub(1),
        };
        let days = self.interval(level);
        let due = today
            .checked_add_days(Days::new(days))
            .ok_or(Error::DateOutOfRange { from: today, days })?;
        Ok((level, due))
    }

    /// Reviews `card` today and moves it to its new bucket.
    pub fn review(&self, card: &mut Card, outcome: impl Into<Outcome>) -> Result<()> {
        let outcome = outcome.into();
        let (level, due) = self.schedule(card.level(), outcome, self.today())?;
        tracing::debug!(
            "Card {} {:?}: level {} -> {}, due {}",
            card.id(),
            outcome,
            card.level(),
            level,
            bucket_key(due)
        );
        card.update(CardChanges {
            level: Some(level),
            due: Some(due),
            ..Default::default()
        })
    }

    /// Cards due today or overdue.
    pub fn cards_due(&self, category: &Category) -> Result<Vec<Card>> {
        self.cards_due_on(category, self.today())
    }

    /// Cards whose bucket is on or before `reference`.
    pub fn cards_due_on(&self, category: &Category, reference: NaiveDate) -> Result<Vec<Card>> {
        let keys: Vec<String> = category
            .buckets()?
            .into_iter()
            .filter(|&due| due <= reference)
            .map(bucket_key)
            .collect();
        category.all_cards(Some(&keys))
    }
}

#[cfg(test)]
fn fixed(y: i32, m: u32, d: u32) -> Scheduler<crate::date::FixedClock> {
    let today = NaiveDate::from_ymd_opt(y, m, d).unwrap();
    Scheduler::new(DEFAULT_MULTIPLIER, crate::date::FixedClock(today)).unwrap()
}

#[test]
fn test_interval_table() {
    let scheduler = fixed(2024, 1, 1);
    let table: Vec<u64> = (0..8).map(|level| scheduler.interval(level)).collect();
    assert_eq!(table, vec![0, 1, 2, 4, 8, 16, 32, 64]);
}

#[test]
fn test_interval_is_monotone_and_saturates() {
    let scheduler = fixed(2024, 1, 1);
    assert_eq!(scheduler.interval(0), 0);
    for level in 0..200 {
        assert!(scheduler.interval(level + 1) >= scheduler.interval(level));
    }
    assert_eq!(scheduler.interval(u32::MAX), u64::MAX);
}

#[test]
fn test_custom_multiplier() {
    let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let scheduler = Scheduler::new(3, crate::date::FixedClock(today)).unwrap();
    assert_eq!(scheduler.interval(3), 9);
    assert!(Scheduler::new(0, crate::date::FixedClock(today)).is_err());
}

#[test]
fn test_success_from_level_two() {
    let scheduler = fixed(2024, 1, 1);
    let today = scheduler.today();
    let (level, due) = scheduler.schedule(2, Outcome::Success, today).unwrap();
    assert_eq!(level, 3);
    assert_eq!(due, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
}

#[test]
fn test_failure_at_level_zero_stays_due_today() {
    let scheduler = fixed(2024, 1, 1);
    let today = scheduler.today();
    assert_eq!(
        scheduler.schedule(0, Outcome::Failure, today).unwrap(),
        (0, today)
    );
    assert_eq!(
        scheduler.schedule(3, false.into(), today).unwrap(),
        (2, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap())
    );
}

#[test]
fn test_far_future_is_out_of_range() {
    let scheduler = fixed(2024, 1, 1);
    let result = scheduler.schedule(100, Outcome::Success, scheduler.today());
    assert!(matches!(result, Err(Error::DateOutOfRange { .. })));
}
