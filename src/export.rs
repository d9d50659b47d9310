use crate::card::Card;
use crate::category::Category;
use crate::config::Config;
use crate::utils::{create_writer, plural};
use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use struct_field_names_as_array::FieldNamesAsArray;

/// One exported card.
#[derive(Serialize, FieldNamesAsArray)]
pub struct Row {
    pub id: u64,
    pub level: u32,
    pub due: NaiveDate,
    pub front: String,
    pub back: String,
}

impl From<&Card> for Row {
    fn from(card: &Card) -> Self {
        Row {
            id: card.id(),
            level: card.level(),
            due: card.due(),
            front: card.front().to_string(),
            back: card.back().to_string(),
        }
    }
}

/// Writes every card of a category to a CSV file.
pub fn export(config: &Config, name: &str, path: &Path) -> Result<()> {
    let category = Category::open(&config.root, name)?;
    let cards = category.all_cards(None)?;
    let file = File::create(path)?;
    let written = write_cards(&cards, file)?;
    println!("Exported {} card{} to {:?}", written, plural(written), path);
    Ok(())
}

fn write_cards<W: Write>(cards: &[Card], out: W) -> Result<usize> {
    let mut writer = create_writer(out);
    writer.write_record(Row::FIELD_NAMES_AS_ARRAY)?;
    for card in cards {
        writer.serialize(Row::from(card))?;
    }
    writer.flush()?;
    Ok(cards.len())
}

#[test]
fn test_write_cards() {
    use std::io::Cursor;

    let root = tempfile::tempdir().unwrap();
    let category = Category::create(root.path(), "words").unwrap();
    let date = NaiveDate::from_ymd_opt(2025, 5, 10).unwrap();
    Card::create(&category, "a", "b", date).unwrap().add().unwrap();
    Card::create(&category, "two\nlines", "x|y", date)
        .unwrap()
        .add()
        .unwrap();

    let mut file = Cursor::new(Vec::new());
    let cards = category.all_cards(None).unwrap();
    assert_eq!(write_cards(&cards, &mut file).unwrap(), 2);

    let output_vec = file.into_inner();
    let output = String::from_utf8_lossy(&output_vec);
    assert_eq!(
        output,
        "id|level|due|front|back\n\
    1|0|2025-05-10|a|b\n\
    2|0|2025-05-10|#two\nlines#|#x|y#\n"
    );
}
