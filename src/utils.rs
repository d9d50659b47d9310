use anyhow::{anyhow, Result};
use csv::Writer;
use std::io::{self, BufRead, Write};

/// Reads one line without its line ending. `None` at end of input.
pub fn try_read_line<R: BufRead>(mut stdin: R) -> Result<Option<String>> {
    let mut line = String::new();
    if stdin.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let trimmed = line.trim_end_matches(['\n', '\r']).len();
    line.truncate(trimmed);
    Ok(Some(line))
}

pub fn read_line<R: BufRead>(stdin: R) -> Result<String> {
    try_read_line(stdin)?.ok_or_else(|| anyhow!("Unexpected end of input. Aborting."))
}

pub fn clear<W: Write>(lock: &mut W) -> io::Result<()> {
    write!(lock, "{esc}[2J{esc}[1;1H", esc = 27 as char)
}

pub fn create_writer<W: Write>(out: W) -> Writer<W> {
    csv::WriterBuilder::new()
        .delimiter(b'|')
        .quote(b'#')
        .has_headers(false)
        .from_writer(out)
}

pub fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

#[test]
fn test_read_line_strips_line_endings() {
    use std::io::Cursor;

    let mut stdin = Cursor::new(b"one\r\ntwo\n\nthree");
    assert_eq!(read_line(&mut stdin).unwrap(), "one");
    assert_eq!(read_line(&mut stdin).unwrap(), "two");
    assert_eq!(read_line(&mut stdin).unwrap(), "");
    assert_eq!(read_line(&mut stdin).unwrap(), "three");
    assert_eq!(try_read_line(&mut stdin).unwrap(), None);
    assert!(read_line(&mut stdin).is_err());
}
