use crate::card::Card;
use crate::category::Category;
use crate::config::Config;
use crate::date::{Clock, SystemClock};
use crate::scheduler::{Outcome, Scheduler};
use crate::utils::{clear, plural, read_line};
use anyhow::Result;
use rand::seq::SliceRandom;
use rand::Rng;
use std::io::{stdin, stdout, BufRead, Write};

/// Lets user review all due cards until there aren't anymore.
pub fn review(config: &Config, name: &str) -> Result<()> {
    let category = Category::open(&config.root, name)?;
    let scheduler = Scheduler::new(config.multiplier, SystemClock)?;
    let mut stdout_lock = stdout().lock();
    let mut stdin_lock = stdin().lock();
    let mut rng = rand::rng();
    review_cards(
        &scheduler,
        &category,
        &mut stdin_lock,
        &mut stdout_lock,
        &mut rng,
    )
}

fn review_cards<C, R, W, G>(
    scheduler: &Scheduler<C>,
    category: &Category,
    stdin: &mut R,
    stdout: &mut W,
    rng: &mut G,
) -> Result<()>
where
    C: Clock,
    R: BufRead,
    W: Write,
    G: Rng + ?Sized,
{
    let mut num_reviews = 0;
    let mut num_cards = 0;
    let mut round = 1;
    loop {
        let mut cards = scheduler.cards_due(category)?;
        if cards.is_empty() {
            break;
        }
        if round == 1 {
            num_cards = cards.len();
            clear(stdout)?;
            writeln!(stdout, "Reviewing due cards in {:?}", category.name())?;
        }
        writeln!(
            stdout,
            "Round {}: {} card{} to review\n",
            round,
            cards.len(),
            plural(cards.len())
        )?;
        cards.shuffle(rng);

        for card in &mut cards {
            review_card(scheduler, card, stdout, stdin)?;
            num_reviews += 1;
        }
        round += 1;
    }

    if num_reviews == 0 {
        writeln!(stdout, "No cards due for review in {:?}", category.name())?;
    } else {
        writeln!(
            stdout,
            "{} review{} of {} card{}. Done.",
            num_reviews,
            plural(num_reviews),
            num_cards,
            plural(num_cards)
        )?;
    }
    Ok(())
}

// Lets user review card and moves it to its next bucket.
fn review_card<C, R, W>(
    scheduler: &Scheduler<C>,
    card: &mut Card,
    stdout: &mut W,
    stdin: &mut R,
) -> Result<()>
where
    C: Clock,
    R: BufRead,
    W: Write,
{
    write!(stdout, "F: {}", card.front())?;
    stdout.flush()?;
    let _: String = read_line(&mut *stdin)?;

    writeln!(stdout, "B: {}", card.back())?;
    write!(stdout, "Level {}. Remembered? [y/N] ", card.level())?;
    stdout.flush()?;
    let answer: String = read_line(&mut *stdin)?;
    let outcome = Outcome::from(matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes"
    ));

    scheduler.review(card, outcome)?;
    writeln!(stdout)?;
    clear(stdout)?;
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
fn scheduler_on(y: i32, m: u32, d: u32) -> Scheduler<crate::date::FixedClock> {
    let today = chrono::NaiveDate::from_ymd_opt(y, m, d).unwrap();
    Scheduler::new(2, crate::date::FixedClock(today)).unwrap()
}

#[test]
fn test_review_card() {
    use chrono::NaiveDate;
    use std::io::Cursor;

    let root = tempfile::tempdir().unwrap();
    let category = Category::create(root.path(), "words").unwrap();
    let scheduler = scheduler_on(2025, 5, 10);
    let mut card = Card::create(&category, "a", "b", scheduler.today()).unwrap();
    card.add().unwrap();

    let mut stdout = Cursor::new(Vec::new());
    let mut stdin = Cursor::new(b"\ny\n");
    review_card(&scheduler, &mut card, &mut stdout, &mut stdin).unwrap();

    // Check prompts
    let stdout_vec = stdout.into_inner();
    assert_eq!(
        String::from_utf8_lossy(&stdout_vec),
        "F: aB: b\nLevel 0. Remembered? [y/N] \n\u{1b}[2J\u{1b}[1;1H"
    );

    // Check that card was moved to tomorrow's bucket
    let tomorrow = NaiveDate::from_ymd_opt(2025, 5, 11).unwrap();
    assert_eq!((card.level(), card.due()), (1, tomorrow));
    assert_eq!(Card::find(&category, 1, None).unwrap().due(), tomorrow);
}

#[test]
fn test_review_repeats_failed_cards() {
    use std::io::Cursor;

    let root = tempfile::tempdir().unwrap();
    let category = Category::create(root.path(), "words").unwrap();
    let scheduler = scheduler_on(2025, 5, 10);
    Card::create(&category, "a", "b", scheduler.today())
        .unwrap()
        .add()
        .unwrap();

    let mut stdout = Cursor::new(Vec::new());
    // Fail once, then succeed in the second round.
    let mut stdin = Cursor::new(b"\nn\n\ny\n");
    review_cards(
        &scheduler,
        &category,
        &mut stdin,
        &mut stdout,
        &mut rand::rng(),
    )
    .unwrap();

    let output = String::from_utf8(stdout.into_inner()).unwrap();
    assert!(output.contains("Round 1: 1 card to review"));
    assert!(output.contains("Round 2: 1 card to review"));
    assert!(output.ends_with("2 reviews of 1 card. Done.\n"));
    assert!(scheduler.cards_due(&category).unwrap().is_empty());
}

#[test]
fn test_review_nothing_due() {
    use std::io::Cursor;

    let root = tempfile::tempdir().unwrap();
    let category = Category::create(root.path(), "words").unwrap();
    let scheduler = scheduler_on(2025, 5, 10);
    let mut stdout = Cursor::new(Vec::new());
    let mut stdin = Cursor::new(b"");
    review_cards(
        &scheduler,
        &category,
        &mut stdin,
        &mut stdout,
        &mut rand::rng(),
    )
    .unwrap();
    assert_eq!(
        String::from_utf8(stdout.into_inner()).unwrap(),
        "No cards due for review in \"words\"\n"
    );
}
