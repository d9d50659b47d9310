use crate::category::Category;
use crate::config::Config;
use crate::date::{Clock, SystemClock};
use crate::utils::plural;
use anyhow::Result;
use chrono::NaiveDate;
use std::fmt;

#[derive(Default)]
struct Counts {
    overdue: u64,
    today: u64,
    day: u64,
    week: u64,
    month: u64,
    quarter: u64,
    year: u64,
    more: u64,
}

impl Counts {
    fn increment_count(&mut self, days: i64) {
        match days {
            i64::MIN..=-1 => self.overdue += 1,
            0 => self.today += 1,
            1 => self.day += 1,
            2..7 => self.week += 1,
            7..30 => self.month += 1,
            30..90 => self.quarter += 1,
            90..365 => self.year += 1,
            _ => self.more += 1,
        }
    }

    fn total(&self) -> u64 {
        self.overdue
            + self.today
            + self.day
            + self.week
            + self.month
            + self.quarter
            + self.year
            + self.more
    }
}

impl fmt::Display for Counts {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            concat!(
                "Cards due:\n",
                "  overdue   {}\n",
                "  today     {}\n",
                "  tomorrow  {}\n",
                "  <week     {}\n",
                "  <month    {}\n",
                "  <quarter  {}\n",
                "  <year     {}\n",
                "  >=year    {}\n\n",
                "Total: {}"
            ),
            self.overdue,
            self.today,
            self.day,
            self.week,
            self.month,
            self.quarter,
            self.year,
            self.more,
            self.total(),
        )
    }
}

fn count_due(category: &Category, today: NaiveDate) -> Result<Counts> {
    let mut counts = Counts::default();
    for card in category.all_cards(None)? {
        counts.increment_count((card.due() - today).num_days());
    }
    Ok(counts)
}

pub fn stats(config: &Config, name: &str) -> Result<()> {
    let category = Category::open(&config.root, name)?;
    let counts = count_due(&category, SystemClock.today())?;
    println!("{}", counts);
    Ok(())
}

/// Checks the category's id invariants and reports how many cards passed.
pub fn verify(config: &Config, name: &str) -> Result<()> {
    let category = Category::open(&config.root, name)?;
    let checked = category.verify()?;
    println!(
        "{:?}: {} card{} OK",
        category.name(),
        checked,
        plural(checked)
    );
    Ok(())
}

#[test]
fn test_count_due() {
    use crate::card::{Card, CardChanges};

    let root = tempfile::tempdir().unwrap();
    let category = Category::create(root.path(), "words").unwrap();
    let today = NaiveDate::from_ymd_opt(2025, 5, 10).unwrap();
    for offset in [-3, 0, 0, 1, 5, 20, 400] {
        let mut card = Card::create(&category, "a", "b", today).unwrap();
        card.add().unwrap();
        card.update(CardChanges {
            due: Some(today + chrono::TimeDelta::days(offset)),
            ..Default::default()
        })
        .unwrap();
    }
    let counts = count_due(&category, today).unwrap();
    assert_eq!(
        counts.to_string(),
        "Cards due:\n  overdue   1\n  today     2\n  tomorrow  1\n  <week     1\n  <month    1\n  <quarter  0\n  <year     0\n  >=year    1\n\nTotal: 7"
    );
}
