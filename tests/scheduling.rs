use cardbox::{bucket_key, Card, CardChanges, Category, Error, FixedClock, Outcome, Scheduler};
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn scheduler_on(today: NaiveDate) -> Scheduler<FixedClock> {
    Scheduler::new(2, FixedClock(today)).unwrap()
}

fn setup() -> (TempDir, Category) {
    let root = tempfile::tempdir().unwrap();
    let category = Category::create(root.path(), "words").unwrap();
    (root, category)
}

fn add_card(category: &Category, front: &str, due: NaiveDate) -> Card {
    let card = Card::create(category, front, "back", due).unwrap();
    card.add().unwrap();
    card
}

fn fronts(cards: &[Card]) -> Vec<&str> {
    cards.iter().map(Card::front).collect()
}

#[test]
fn review_success_from_level_two_moves_four_days_ahead() {
    let (_root, category) = setup();
    let today = day(2024, 3, 1);
    let scheduler = scheduler_on(today);
    let mut card = add_card(&category, "A", today);
    card.update(CardChanges {
        level: Some(2),
        ..Default::default()
    })
    .unwrap();

    scheduler.review(&mut card, Outcome::Success).unwrap();

    assert_eq!(card.level(), 3);
    assert_eq!(card.due(), day(2024, 3, 5));
    let found = Card::find(&category, card.id(), Some(day(2024, 3, 5))).unwrap();
    assert_eq!(found.level(), 3);
    assert!(matches!(
        Card::find(&category, card.id(), Some(today)),
        Err(Error::NotFound(_))
    ));
    assert!(!category.path().join(bucket_key(today)).exists());
}

#[test]
fn review_failure_at_level_zero_stays_due_today() {
    let (_root, category) = setup();
    let today = day(2024, 3, 1);
    let scheduler = scheduler_on(today);
    let mut card = add_card(&category, "A", today);

    scheduler.review(&mut card, false).unwrap();

    assert_eq!((card.level(), card.due()), (0, today));
    assert_eq!(fronts(&scheduler.cards_due(&category).unwrap()), vec!["A"]);
}

#[test]
fn cards_due_excludes_future_buckets() {
    let (_root, category) = setup();
    add_card(&category, "A", day(2024, 1, 1));
    add_card(&category, "B", day(2024, 1, 10));
    let scheduler = scheduler_on(day(2024, 1, 5));

    let due = scheduler.cards_due(&category).unwrap();
    assert_eq!(fronts(&due), vec!["A"]);

    let later = scheduler.cards_due_on(&category, day(2024, 1, 10)).unwrap();
    assert_eq!(fronts(&later), vec!["A", "B"]);
}

#[test]
fn cards_due_is_idempotent() {
    let (_root, category) = setup();
    for (front, d) in [("A", 1), ("B", 3), ("C", 3), ("D", 9)] {
        add_card(&category, front, day(2024, 1, d));
    }
    let scheduler = scheduler_on(day(2024, 1, 4));
    let first = scheduler.cards_due(&category).unwrap();
    let second = scheduler.cards_due(&category).unwrap();
    assert_eq!(fronts(&first), vec!["A", "B", "C"]);
    assert_eq!(fronts(&first), fronts(&second));
}

#[test]
fn overdue_cards_remain_due_until_reviewed() {
    let (_root, category) = setup();
    let mut card = add_card(&category, "A", day(2023, 6, 1));
    let scheduler = scheduler_on(day(2024, 6, 1));
    assert_eq!(scheduler.cards_due(&category).unwrap().len(), 1);

    scheduler.review(&mut card, true).unwrap();
    assert_eq!(card.due(), day(2024, 6, 2));
    assert!(scheduler.cards_due(&category).unwrap().is_empty());
}

#[test]
fn ids_are_assigned_without_gaps() {
    let (_root, category) = setup();
    let today = day(2024, 1, 1);
    let ids: Vec<u64> = (0..10)
        .map(|i| add_card(&category, &i.to_string(), today).id())
        .collect();
    assert_eq!(ids, (1..=10).collect::<Vec<u64>>());
    assert_eq!(category.latest_id().unwrap(), 10);
    assert_eq!(category.count().unwrap(), 10);
    assert_eq!(category.verify().unwrap(), 10);
}

#[test]
fn bad_bump_leaves_counter_unchanged() {
    let (_root, category) = setup();
    add_card(&category, "A", day(2024, 1, 1));
    assert!(matches!(
        category.bump_id(5),
        Err(Error::Conflict {
            expected: 2,
            found: 5
        })
    ));
    assert_eq!(category.latest_id().unwrap(), 1);
}

#[test]
fn round_trip_preserves_content() {
    let (_root, category) = setup();
    let front = "What does\n`Option<T>` hold?";
    let back = "Either Some(T)\nor None";
    let mut card = Card::create(&category, front, back, day(2024, 1, 1)).unwrap();
    card.add().unwrap();
    card.update(CardChanges {
        level: Some(4),
        ..Default::default()
    })
    .unwrap();

    let found = Card::find(&category, 1, None).unwrap();
    assert_eq!(
        (found.level(), found.front(), found.back()),
        (4, front, back)
    );
}

#[test]
fn interrupted_move_is_reported_as_corruption() {
    let (_root, category) = setup();
    let today = day(2024, 1, 1);
    let tomorrow = day(2024, 1, 2);
    let mut card = add_card(&category, "A", today);
    card.update(CardChanges {
        due: Some(tomorrow),
        ..Default::default()
    })
    .unwrap();
    // Put the old record back as if the delete step never happened.
    let old_bucket = category.path().join(bucket_key(today));
    std::fs::create_dir(&old_bucket).unwrap();
    std::fs::copy(
        category.path().join(bucket_key(tomorrow)).join("1"),
        old_bucket.join("1"),
    )
    .unwrap();

    assert!(matches!(
        Card::find(&category, 1, None),
        Err(Error::Corruption { id: 1, .. })
    ));
    // Direct lookups by bucket do not scan and still succeed.
    assert!(Card::find(&category, 1, Some(tomorrow)).is_ok());
}

#[test]
fn removing_category_destroys_all_cards() {
    let (root, category) = setup();
    add_card(&category, "A", day(2024, 1, 1));
    add_card(&category, "B", day(2024, 1, 2));
    assert!(category.remove(|_, count| count == 2).unwrap());
    assert!(matches!(
        Category::open(root.path(), "words"),
        Err(Error::NotFound(_))
    ));
    Category::create(root.path(), "words").unwrap();
}
