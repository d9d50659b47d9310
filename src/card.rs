//! Card store: one file per card inside its due-date bucket.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::category::Category;
use crate::date::bucket_key;
use crate::error::{Error, Result};
use crate::record::{self, Record};

#[derive(Debug, Clone)]
pub struct Card {
    category: Category,
    id: u64,
    level: u32,
    front: String,
    back: String,
    due: NaiveDate,
}

/// Field changes for [`Card::update`]. `None` leaves a field as it is.
#[derive(Debug, Clone, Default)]
pub struct CardChanges {
    pub front: Option<String>,
    pub back: Option<String>,
    pub level: Option<u32>,
    pub due: Option<NaiveDate>,
}

impl Card {
    /// Builds a new card due `today` with the next free id of `category`.
    ///
    /// Nothing is written until [`Card::add`].
    pub fn create(
        category: &Category,
        front: &str,
        back: &str,
        today: NaiveDate,
    ) -> Result<Card> {
        record::check_text("front", front)?;
        record::check_text("back", back)?;
        Ok(Card {
            category: category.clone(),
            id: category.next_id()?,
            level: 0,
            front: front.to_string(),
            back: back.to_string(),
            due: today,
        })
    }

    /// Looks a card up by id, in `bucket` only if one is given.
    pub fn find(category: &Category, id: u64, bucket: Option<NaiveDate>) -> Result<Card> {
        let due = match bucket {
            Some(due) => due,
            None => locate(category, id)?,
        };
        let path = category.bucket_path(due).join(id.to_string());
        let content = fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => not_found(category, id, Some(due)),
            _ => Error::Io(e),
        })?;
        let Record { level, front, back } = record::parse(&content)?;
        Ok(Card {
            category: category.clone(),
            id,
            level,
            front,
            back,
            due,
        })
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn front(&self) -> &str {
        &self.front
    }

    pub fn back(&self) -> &str {
        &self.back
    }

    pub fn due(&self) -> NaiveDate {
        self.due
    }

    fn path(&self) -> PathBuf {
        self.category.bucket_path(self.due).join(self.id.to_string())
    }

    fn write(&self) -> Result<()> {
        fs::create_dir_all(self.category.bucket_path(self.due))?;
        let content = record::serialize(&Record {
            level: self.level,
            front: self.front.clone(),
            back: self.back.clone(),
        });
        fs::write(self.path(), content)?;
        tracing::debug!(
            "Wrote card {} of {:?} to bucket {}",
            self.id,
            self.category.name(),
            bucket_key(self.due)
        );
        Ok(())
    }

    /// Persists a freshly created card and advances the category's counter.
    pub fn add(&self) -> Result<()> {
        let expected = self.category.next_id()?;
        if expected != self.id {
            return Err(Error::Conflict {
                expected,
                found: self.id,
            });
        }
        self.write()?;
        self.category.bump_id(self.id)
    }

    /// Applies `changes` and re-persists the card, moving it to a new bucket
    /// when the due date changes.
    ///
    /// The move writes the new record before deleting the old one. If the
    /// second step fails the card is left in both buckets and the next
    /// scanning [`Card::find`] reports [`Error::Corruption`].
    pub fn update(&mut self, changes: CardChanges) -> Result<()> {
        if let Some(front) = &changes.front {
            record::check_text("front", front)?;
        }
        if let Some(back) = &changes.back {
            record::check_text("back", back)?;
        }
        // `self` keeps describing the persisted record until both steps succeed.
        let mut next = self.clone();
        if let Some(front) = changes.front {
            next.front = front;
        }
        if let Some(back) = changes.back {
            next.back = back;
        }
        if let Some(level) = changes.level {
            next.level = level;
        }
        if let Some(due) = changes.due {
            next.due = due;
        }
        next.write()?;

        if next.due != self.due {
            delete_record(&self.category, self.id, self.due)?;
            tracing::debug!(
                "Moved card {} of {:?} from {} to {}",
                self.id,
                self.category.name(),
                bucket_key(self.due),
                bucket_key(next.due)
            );
        }
        *self = next;
        Ok(())
    }

    /// Deletes the card's record, and its bucket if that is now empty.
    pub fn remove(self) -> Result<()> {
        delete_record(&self.category, self.id, self.due)?;
        tracing::debug!("Removed card {} of {:?}", self.id, self.category.name());
        Ok(())
    }
}

/// Finds the single bucket holding `id`.
fn locate(category: &Category, id: u64) -> Result<NaiveDate> {
    let mut found = Vec::new();
    for due in category.buckets()? {
        if category.bucket_path(due).join(id.to_string()).is_file() {
            found.push(due);
        }
    }
    match found.as_slice() {
        [] => Err(not_found(category, id, None)),
        [due] => Ok(*due),
        _ => Err(Error::Corruption {
            id,
            buckets: found.iter().copied().map(bucket_key).collect(),
        }),
    }
}

fn delete_record(category: &Category, id: u64, due: NaiveDate) -> Result<()> {
    let bucket = category.bucket_path(due);
    fs::remove_file(bucket.join(id.to_string())).map_err(|e| match e.kind() {
        ErrorKind::NotFound => not_found(category, id, Some(due)),
        _ => Error::Io(e),
    })?;
    if fs::read_dir(&bucket)?.next().is_none() {
        fs::remove_dir(&bucket)?;
    }
    Ok(())
}

fn not_found(category: &Category, id: u64, bucket: Option<NaiveDate>) -> Error {
    match bucket {
        Some(due) => Error::NotFound(format!(
            "card {} in bucket {} of category {:?}",
            id,
            bucket_key(due),
            category.name()
        )),
        None => Error::NotFound(format!("card {} in category {:?}", id, category.name())),
    }
}

#[cfg(test)]
fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_ids_are_sequential() {
    let root = tempfile::tempdir().unwrap();
    let category = Category::create(root.path(), "words").unwrap();
    for expected in 1..=5 {
        let card = Card::create(&category, "front", "back", day(2024, 1, 1)).unwrap();
        assert_eq!(card.id(), expected);
        card.add().unwrap();
    }
    let ids: Vec<u64> = category.all_cards(None).unwrap().iter().map(Card::id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    assert_eq!(category.latest_id().unwrap(), 5);
}

#[test]
fn test_add_out_of_order_conflicts() {
    let root = tempfile::tempdir().unwrap();
    let category = Category::create(root.path(), "words").unwrap();
    let first = Card::create(&category, "a", "b", day(2024, 1, 1)).unwrap();
    let second = Card::create(&category, "c", "d", day(2024, 1, 1)).unwrap();
    first.add().unwrap();
    assert!(matches!(second.add(), Err(Error::Conflict { .. })));
    assert_eq!(category.count().unwrap(), 1);
    assert_eq!(Card::find(&category, 1, None).unwrap().front(), "a");
}

#[test]
fn test_find_reads_back_fields() {
    let root = tempfile::tempdir().unwrap();
    let category = Category::create(root.path(), "words").unwrap();
    let card = Card::create(&category, "multi\nline", "answer", day(2024, 2, 29)).unwrap();
    card.add().unwrap();

    let found = Card::find(&category, 1, None).unwrap();
    assert_eq!(found.level(), 0);
    assert_eq!(found.front(), "multi\nline");
    assert_eq!(found.back(), "answer");
    assert_eq!(found.due(), day(2024, 2, 29));
    assert!(category.path().join("2024-2-29").join("1").is_file());
}

#[test]
fn test_find_missing_card() {
    let root = tempfile::tempdir().unwrap();
    let category = Category::create(root.path(), "words").unwrap();
    assert!(matches!(
        Card::find(&category, 1, None),
        Err(Error::NotFound(_))
    ));
    Card::create(&category, "a", "b", day(2024, 1, 1))
        .unwrap()
        .add()
        .unwrap();
    assert!(matches!(
        Card::find(&category, 1, Some(day(2024, 1, 2))),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn test_find_detects_duplicate_ids() {
    let root = tempfile::tempdir().unwrap();
    let category = Category::create(root.path(), "words").unwrap();
    let card = Card::create(&category, "a", "b", day(2024, 1, 1)).unwrap();
    card.add().unwrap();
    // Simulate a move interrupted between its two steps.
    let stray = category.path().join("2024-1-9");
    fs::create_dir(&stray).unwrap();
    fs::copy(category.path().join("2024-1-1").join("1"), stray.join("1")).unwrap();

    match Card::find(&category, 1, None) {
        Err(Error::Corruption { id, buckets }) => {
            assert_eq!(id, 1);
            assert_eq!(buckets, vec!["2024-1-1", "2024-1-9"]);
        }
        other => panic!("expected corruption, got {:?}", other),
    }
    assert!(matches!(category.verify(), Err(Error::Corruption { .. })));
}

#[test]
fn test_update_moves_between_buckets() {
    let root = tempfile::tempdir().unwrap();
    let category = Category::create(root.path(), "words").unwrap();
    let mut card = Card::create(&category, "a", "b", day(2024, 1, 1)).unwrap();
    card.add().unwrap();

    card.update(CardChanges {
        level: Some(3),
        due: Some(day(2024, 1, 5)),
        ..Default::default()
    })
    .unwrap();

    let moved = Card::find(&category, 1, Some(day(2024, 1, 5))).unwrap();
    assert_eq!(moved.level(), 3);
    assert_eq!(moved.front(), "a");
    assert!(matches!(
        Card::find(&category, 1, Some(day(2024, 1, 1))),
        Err(Error::NotFound(_))
    ));
    assert!(!category.path().join("2024-1-1").exists());
}

#[test]
fn test_update_keeps_shared_bucket() {
    let root = tempfile::tempdir().unwrap();
    let category = Category::create(root.path(), "words").unwrap();
    let mut first = Card::create(&category, "a", "b", day(2024, 1, 1)).unwrap();
    first.add().unwrap();
    Card::create(&category, "c", "d", day(2024, 1, 1))
        .unwrap()
        .add()
        .unwrap();

    first
        .update(CardChanges {
            due: Some(day(2024, 1, 2)),
            ..Default::default()
        })
        .unwrap();
    assert!(category.path().join("2024-1-1").join("2").is_file());
    assert_eq!(category.count().unwrap(), 2);
}

#[test]
fn test_update_text_in_place() {
    let root = tempfile::tempdir().unwrap();
    let category = Category::create(root.path(), "words").unwrap();
    let mut card = Card::create(&category, "a", "b", day(2024, 1, 1)).unwrap();
    card.add().unwrap();
    card.update(CardChanges {
        back: Some(String::from("B")),
        ..Default::default()
    })
    .unwrap();
    let found = Card::find(&category, 1, None).unwrap();
    assert_eq!((found.front(), found.back()), ("a", "B"));

    let bad = CardChanges {
        front: Some(format!("x\n{}", record::SEPARATOR)),
        ..Default::default()
    };
    assert!(matches!(card.update(bad), Err(Error::Format(_))));
    assert_eq!(Card::find(&category, 1, None).unwrap().front(), "a");
}

#[test]
fn test_failed_move_keeps_card_in_old_bucket() {
    let root = tempfile::tempdir().unwrap();
    let category = Category::create(root.path(), "words").unwrap();
    let mut card = Card::create(&category, "a", "b", day(2024, 1, 1)).unwrap();
    card.add().unwrap();
    // A plain file where the target bucket directory should go.
    let blocker = category.path().join("2024-1-5");
    fs::write(&blocker, "").unwrap();

    let changes = CardChanges {
        level: Some(3),
        due: Some(day(2024, 1, 5)),
        ..Default::default()
    };
    assert!(card.update(changes.clone()).is_err());
    assert_eq!((card.level(), card.due()), (0, day(2024, 1, 1)));

    fs::remove_file(&blocker).unwrap();
    card.update(changes).unwrap();
    let found = Card::find(&category, 1, None).unwrap();
    assert_eq!((found.level(), found.due()), (3, day(2024, 1, 5)));
    assert!(!category.path().join("2024-1-1").exists());
}

#[test]
fn test_stale_category_handle() {
    let root = tempfile::tempdir().unwrap();
    let category = Category::create(root.path(), "words").unwrap();
    let card = Card::create(&category, "a", "b", day(2024, 1, 1)).unwrap();
    category.clone().destroy().unwrap();
    assert!(matches!(
        Card::create(&category, "a", "b", day(2024, 1, 1)),
        Err(Error::NotFound(_))
    ));
    assert!(matches!(card.add(), Err(Error::NotFound(_))));
}

#[test]
fn test_exhausted_counter() {
    let root = tempfile::tempdir().unwrap();
    let category = Category::create(root.path(), "words").unwrap();
    fs::write(category.path().join("id"), u64::MAX.to_string()).unwrap();
    assert!(matches!(
        Card::create(&category, "a", "b", day(2024, 1, 1)),
        Err(Error::Format(_))
    ));
    assert!(matches!(category.bump_id(1), Err(Error::Format(_))));
}

#[test]
fn test_remove_deletes_empty_bucket() {
    let root = tempfile::tempdir().unwrap();
    let category = Category::create(root.path(), "words").unwrap();
    let card = Card::create(&category, "a", "b", day(2024, 1, 1)).unwrap();
    card.add().unwrap();
    let again = card.clone();
    card.remove().unwrap();
    assert!(!category.path().join("2024-1-1").exists());
    assert_eq!(category.count().unwrap(), 0);
    assert!(matches!(again.remove(), Err(Error::NotFound(_))));
}
