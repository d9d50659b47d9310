//! Category index: a named directory of due-date buckets.
//!
//! ```text
//! <root>/<category>/
//! ├── id            # last assigned card id
//! ├── 2024-1-1/
//! │   ├── 1         # one record per card
//! │   └── 4
//! └── 2024-1-10/
//!     └── 2
//! ```

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::card::Card;
use crate::date::{bucket_key, parse_bucket_key};
use crate::error::{Error, Result};

const COUNTER: &str = "id";

#[derive(Debug, Clone)]
pub struct Category {
    name: String,
    path: PathBuf,
}

impl Category {
    /// Creates a new, empty category under `root`.
    pub fn create(root: &Path, name: &str) -> Result<Category> {
        validate_name(name)?;
        fs::create_dir_all(root)?;
        let path = root.join(name);
        if path.exists() {
            return Err(Error::AlreadyExists(name.to_string()));
        }
        fs::create_dir(&path)?;
        fs::write(path.join(COUNTER), "0")?;
        tracing::info!("Created category {:?} at {}", name, path.display());
        Ok(Category {
            name: name.to_string(),
            path,
        })
    }

    pub fn open(root: &Path, name: &str) -> Result<Category> {
        validate_name(name)?;
        let path = root.join(name);
        if !path.join(COUNTER).is_file() {
            return Err(Error::NotFound(format!("category {:?}", name)));
        }
        Ok(Category {
            name: name.to_string(),
            path,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn bucket_path(&self, due: NaiveDate) -> PathBuf {
        self.path.join(bucket_key(due))
    }

    /// Due-date buckets currently present, oldest first.
    pub fn buckets(&self) -> Result<Vec<NaiveDate>> {
        let mut dates = Vec::new();
        for entry in fs::read_dir(&self.path)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                continue;
            };
            if name == COUNTER {
                continue;
            }
            let is_dir = entry.file_type()?.is_dir();
            match parse_bucket_key(name) {
                Some(date) if is_dir => dates.push(date),
                _ => tracing::warn!(
                    "Skipping {:?} in category {:?}: not a bucket",
                    name,
                    self.name
                ),
            }
        }
        dates.sort();
        Ok(dates)
    }

    /// Card ids stored in one bucket, ascending. A missing bucket is empty.
    pub(crate) fn bucket_ids(&self, due: NaiveDate) -> Result<Vec<u64>> {
        let bucket = self.bucket_path(due);
        if !bucket.is_dir() {
            return Ok(Vec::new());
        }
        let mut ids = Vec::new();
        for entry in fs::read_dir(&bucket)? {
            let entry = entry?;
            let is_file = entry.file_type()?.is_file();
            match entry.file_name().to_str().and_then(|s| s.parse::<u64>().ok()) {
                Some(id) if is_file => ids.push(id),
                _ => tracing::warn!(
                    "Skipping {:?} in bucket {}: not a card record",
                    entry.file_name(),
                    bucket.display()
                ),
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }

    /// Number of cards across all buckets.
    pub fn count(&self) -> Result<usize> {
        let mut total = 0;
        for due in self.buckets()? {
            total += self.bucket_ids(due)?.len();
        }
        Ok(total)
    }

    /// Cards in all buckets, or only in the buckets named by `date_filter`.
    ///
    /// Filter entries that are not bucket keys, or name no existing bucket,
    /// contribute nothing. Cards come back ordered by due date, then id.
    pub fn all_cards(&self, date_filter: Option<&[String]>) -> Result<Vec<Card>> {
        let mut dates = match date_filter {
            None => self.buckets()?,
            Some(keys) => keys
                .iter()
                .filter_map(|key| parse_bucket_key(key))
                .filter(|&due| self.bucket_path(due).is_dir())
                .collect(),
        };
        dates.sort();
        dates.dedup();

        let mut cards = Vec::new();
        for due in dates {
            for id in self.bucket_ids(due)? {
                cards.push(Card::find(self, id, Some(due))?);
            }
        }
        Ok(cards)
    }

    pub fn latest_id(&self) -> Result<u64> {
        let content = match fs::read_to_string(self.path.join(COUNTER)) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::NotFound(format!("category {:?}", self.name)));
            }
            Err(e) => return Err(e.into()),
        };
        content
            .trim()
            .parse()
            .map_err(|_| Error::Format(format!("bad id counter {:?}", content)))
    }

    /// The id the next new card gets.
    pub(crate) fn next_id(&self) -> Result<u64> {
        self.latest_id()?
            .checked_add(1)
            .ok_or_else(|| Error::Format(format!("id counter of {:?} is exhausted", self.name)))
    }

    /// Advances the counter to `new_id`, which must be exactly one past it.
    pub fn bump_id(&self, new_id: u64) -> Result<()> {
        let expected = self.next_id()?;
        if new_id != expected {
            return Err(Error::Conflict {
                expected,
                found: new_id,
            });
        }
        fs::write(self.path.join(COUNTER), new_id.to_string())?;
        Ok(())
    }

    /// Destroys the category if `confirm(name, card_count)` agrees.
    ///
    /// Returns whether the category was removed.
    pub fn remove<F>(self, confirm: F) -> Result<bool>
    where
        F: FnOnce(&str, usize) -> bool,
    {
        let count = self.count()?;
        if !confirm(&self.name, count) {
            return Ok(false);
        }
        self.destroy()?;
        Ok(true)
    }

    /// Destroys the category and every card in it, without asking.
    pub fn destroy(self) -> Result<()> {
        fs::remove_dir_all(&self.path)?;
        tracing::info!("Removed category {:?}", self.name);
        Ok(())
    }

    /// Scans every bucket and checks the id invariants.
    ///
    /// Returns the number of records checked.
    pub fn verify(&self) -> Result<usize> {
        let latest = self.latest_id()?;
        let mut seen: HashMap<u64, Vec<String>> = HashMap::new();
        for due in self.buckets()? {
            for id in self.bucket_ids(due)? {
                if id > latest {
                    return Err(Error::Conflict {
                        expected: latest,
                        found: id,
                    });
                }
                Card::find(self, id, Some(due))?;
                seen.entry(id).or_default().push(bucket_key(due));
            }
        }
        let mut checked = 0;
        let mut ids: Vec<_> = seen.into_iter().collect();
        ids.sort_unstable_by_key(|(id, _)| *id);
        for (id, buckets) in ids {
            if buckets.len() > 1 {
                return Err(Error::Corruption { id, buckets });
            }
            checked += 1;
        }
        Ok(checked)
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\'])
    {
        return Err(Error::InvalidName(name.to_string()));
    }
    Ok(())
}

#[test]
fn test_create_twice_fails() {
    let root = tempfile::tempdir().unwrap();
    Category::create(root.path(), "words").unwrap();
    assert!(matches!(
        Category::create(root.path(), "words"),
        Err(Error::AlreadyExists(_))
    ));
}

#[test]
fn test_open_missing_fails() {
    let root = tempfile::tempdir().unwrap();
    assert!(matches!(
        Category::open(root.path(), "nope"),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn test_invalid_names_are_rejected() {
    let root = tempfile::tempdir().unwrap();
    for name in ["", ".", "..", "a/b", "a\\b"] {
        assert!(matches!(
            Category::create(root.path(), name),
            Err(Error::InvalidName(_))
        ));
    }
}

#[test]
fn test_bump_id_conflict_leaves_counter_unchanged() {
    let root = tempfile::tempdir().unwrap();
    let category = Category::create(root.path(), "words").unwrap();
    assert_eq!(category.latest_id().unwrap(), 0);
    category.bump_id(1).unwrap();
    let result = category.bump_id(3);
    assert!(matches!(
        result,
        Err(Error::Conflict {
            expected: 2,
            found: 3
        })
    ));
    assert!(category.bump_id(1).is_err());
    assert_eq!(category.latest_id().unwrap(), 1);
}

#[test]
fn test_counter_and_strays_are_not_buckets() {
    let root = tempfile::tempdir().unwrap();
    let category = Category::create(root.path(), "words").unwrap();
    fs::create_dir(category.path().join("2024-3-1")).unwrap();
    fs::create_dir(category.path().join("2024-03-02")).unwrap();
    fs::create_dir(category.path().join("notes")).unwrap();
    fs::write(category.path().join("2024-3-3"), "").unwrap();
    let expected = vec![NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()];
    assert_eq!(category.buckets().unwrap(), expected);
    assert_eq!(category.count().unwrap(), 0);
    assert!(category.all_cards(None).unwrap().is_empty());
}

#[test]
fn test_date_filter_skips_non_buckets() {
    let root = tempfile::tempdir().unwrap();
    let category = Category::create(root.path(), "words").unwrap();
    let due = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    Card::create(&category, "a", "b", due).unwrap().add().unwrap();
    fs::create_dir(category.path().join("nope")).unwrap();

    let filter: Vec<String> = ["id", "nope", "2024-01-01", "2024-1-1", "2024-1-1", "2024-1-2"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let cards = category.all_cards(Some(&filter)).unwrap();
    let ids: Vec<u64> = cards.iter().map(Card::id).collect();
    assert_eq!(ids, vec![1]);
}

#[test]
fn test_remove_respects_confirmation() {
    let root = tempfile::tempdir().unwrap();
    let category = Category::create(root.path(), "words").unwrap();
    let path = category.path().to_path_buf();

    let mut asked = None;
    let removed = category
        .clone()
        .remove(|name, count| {
            asked = Some((name.to_string(), count));
            false
        })
        .unwrap();
    assert!(!removed);
    assert_eq!(asked, Some((String::from("words"), 0)));
    assert!(path.exists());

    assert!(category.remove(|_, _| true).unwrap());
    assert!(!path.exists());
}
