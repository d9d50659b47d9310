use crate::card::Card;
use crate::category::Category;
use crate::config::Config;
use crate::date::{Clock, SystemClock};
use crate::utils::{plural, try_read_line};
use anyhow::Result;
use chrono::NaiveDate;
use std::io::{stdin, stdout, BufRead, Write};

/// Lets user add as many new cards as they want to a category.
pub fn add(config: &Config, name: &str) -> Result<()> {
    let category = Category::open(&config.root, name)?;
    let mut stdout_lock = stdout().lock();
    let mut stdin_lock = stdin().lock();
    let today = SystemClock.today();
    let added = add_cards(&category, today, &mut stdin_lock, &mut stdout_lock)?;
    writeln!(
        stdout_lock,
        "Added {} card{} to {:?}.",
        added,
        plural(added),
        category.name()
    )?;
    Ok(())
}

fn add_cards<R, W>(
    category: &Category,
    today: NaiveDate,
    mut stdin: R,
    mut stdout: W,
) -> Result<usize>
where
    R: BufRead,
    W: Write,
{
    let mut added = 0;
    loop {
        stdout.write_all(b"Front: ")?;
        stdout.flush()?;
        // Exit on empty input
        let front = match try_read_line(&mut stdin)? {
            Some(front) if !front.is_empty() => front,
            _ => return Ok(added),
        };

        stdout.write_all(b"Back:  ")?;
        stdout.flush()?;
        let back = try_read_line(&mut stdin)?.unwrap_or_default();
        stdout.write_all(b"\n")?;
        stdout.flush()?;

        let card = Card::create(category, &front, &back, today)?;
        card.add()?;
        added += 1;
    }
}

#[test]
fn test_add_cards_until_empty_front() {
    use std::io::Cursor;

    let root = tempfile::tempdir().unwrap();
    let category = Category::create(root.path(), "words").unwrap();
    let mut stdout = Cursor::new(Vec::new());
    let mut stdin = Cursor::new(
        b"a\nb\n\
    c\nd\n\
    \n",
    );
    let date = NaiveDate::from_ymd_opt(2025, 5, 10).unwrap();
    let added = add_cards(&category, date, &mut stdin, &mut stdout).unwrap();
    assert_eq!(added, 2);

    // Check prompts
    let stdout_vec = stdout.into_inner();
    assert_eq!(
        String::from_utf8_lossy(&stdout_vec),
        "Front: Back:  \nFront: Back:  \nFront: "
    );

    // Check cards written to the category
    let cards = category.all_cards(None).unwrap();
    let sides: Vec<(&str, &str)> = cards.iter().map(|c| (c.front(), c.back())).collect();
    assert_eq!(sides, vec![("a", "b"), ("c", "d")]);
    assert!(cards.iter().all(|c| c.due() == date && c.level() == 0));
}

#[test]
fn test_add_cards_stops_at_end_of_input() {
    use std::io::Cursor;

    let root = tempfile::tempdir().unwrap();
    let category = Category::create(root.path(), "words").unwrap();
    let mut stdout = Cursor::new(Vec::new());
    let mut stdin = Cursor::new(b"a\nb\n");
    let date = NaiveDate::from_ymd_opt(2025, 5, 10).unwrap();
    let added = add_cards(&category, date, &mut stdin, &mut stdout).unwrap();
    assert_eq!(added, 1);
    assert_eq!(category.latest_id().unwrap(), 1);
}
