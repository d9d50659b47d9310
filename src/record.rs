//! On-disk record format of a single card.
//!
//! ```text
//! <level>
//! -#-#-#-#-#-#-#-#-#-#-#-#-#-#-#-#-#-#-#-#-
//! <front>
//! -#-#-#-#-#-#-#-#-#-#-#-#-#-#-#-#-#-#-#-#-
//! <back>
//! ```

use crate::error::{Error, Result};

pub const SEPARATOR: &str = "-#-#-#-#-#-#-#-#-#-#-#-#-#-#-#-#-#-#-#-#-";

/// The persisted fields of a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub level: u32,
    pub front: String,
    pub back: String,
}

/// Fails if `text` has a line that would be read back as a separator.
pub fn check_text(side: &str, text: &str) -> Result<()> {
    if text.split('\n').any(|line| line == SEPARATOR) {
        return Err(Error::Format(format!(
            "{} contains the separator line",
            side
        )));
    }
    Ok(())
}

pub fn serialize(record: &Record) -> String {
    format!(
        "{}\n{sep}\n{}\n{sep}\n{}\n",
        record.level,
        record.front,
        record.back,
        sep = SEPARATOR
    )
}

/// Lines are split on `\n` only, so a `\r` belongs to the text around it.
pub fn parse(content: &str) -> Result<Record> {
    let body = content.strip_suffix('\n').unwrap_or(content);
    let lines: Vec<&str> = body.split('\n').collect();
    let level = lines
        .first()
        .and_then(|line| line.trim().parse::<u32>().ok())
        .ok_or_else(|| Error::Format("first line is not a level".to_string()))?;
    if lines.get(1) != Some(&SEPARATOR) {
        return Err(Error::Format("missing separator after level".to_string()));
    }
    let second = lines
        .iter()
        .rposition(|line| *line == SEPARATOR)
        .filter(|&i| i >= 3)
        .ok_or_else(|| Error::Format("missing separator between front and back".to_string()))?;
    Ok(Record {
        level,
        front: lines[2..second].join("\n"),
        back: lines[second + 1..].join("\n"),
    })
}

#[test]
fn test_multiline_round_trip() {
    let record = Record {
        level: 7,
        front: String::from("Capital of\nFrance?"),
        back: String::from("Paris\n\n(on the Seine)"),
    };
    assert_eq!(parse(&serialize(&record)).unwrap(), record);
}

#[test]
fn test_empty_sides_round_trip() {
    let record = Record {
        level: 0,
        front: String::new(),
        back: String::new(),
    };
    assert_eq!(parse(&serialize(&record)).unwrap(), record);
}

#[test]
fn test_parse_rejects_malformed_records() {
    let cases = [
        String::new(),
        format!("x\n{sep}\na\n{sep}\nb\n", sep = SEPARATOR),
        format!("-1\n{sep}\na\n{sep}\nb\n", sep = SEPARATOR),
        "3\nfront\nback\n".to_string(),
        format!("3\n{sep}\nfront only\n", sep = SEPARATOR),
        format!("3\n{sep}\n{sep}\nback\n", sep = SEPARATOR),
    ];
    for content in cases {
        assert!(
            matches!(parse(&content), Err(Error::Format(_))),
            "accepted {:?}",
            content
        );
    }
}

#[test]
fn test_carriage_returns_round_trip() {
    let record = Record {
        level: 2,
        front: String::from("line one\r\nline two\r"),
        back: format!("x\n{}\r", SEPARATOR),
    };
    assert!(check_text("back", &record.back).is_ok());
    assert_eq!(parse(&serialize(&record)).unwrap(), record);
}

#[test]
fn test_trailing_newline_round_trip() {
    let record = Record {
        level: 1,
        front: String::from("a\n"),
        back: String::from("b\n\n"),
    };
    assert_eq!(parse(&serialize(&record)).unwrap(), record);
}

#[test]
fn test_check_text_rejects_separator_line() {
    assert!(check_text("front", "a\n-#-#-").is_ok());
    let text = format!("a\n{}\nb", SEPARATOR);
    assert!(matches!(check_text("back", &text), Err(Error::Format(_))));
}
