use crate::category::Category;
use crate::config::Config;
use crate::utils::{plural, try_read_line};
use anyhow::{anyhow, Result};
use std::io::{stdin, stdout, BufRead, Write};

/// Removes a category and all its cards, asking first unless `yes` is set.
pub fn remove(config: &Config, name: &str, yes: bool) -> Result<()> {
    let category = Category::open(&config.root, name)?;
    if yes {
        category.destroy()?;
        println!("The category is removed.");
        return Ok(());
    }

    let mut stdout_lock = stdout().lock();
    let mut stdin_lock = stdin().lock();
    let mut failure = None;
    let removed = category.remove(|name, count| {
        match confirm(name, count, &mut stdin_lock, &mut stdout_lock) {
            Ok(answer) => answer,
            Err(e) => {
                failure = Some(e);
                false
            }
        }
    })?;
    if let Some(e) = failure {
        return Err(e);
    }
    if !removed {
        return Err(anyhow!("The category was not removed. Aborting."));
    }
    writeln!(stdout_lock, "The category is removed.")?;
    Ok(())
}

fn confirm<R, W>(name: &str, count: usize, stdin: &mut R, stdout: &mut W) -> Result<bool>
where
    R: BufRead,
    W: Write,
{
    write!(
        stdout,
        "The category {:?} with {} card{} will be removed. Proceed? (y/N) ",
        name,
        count,
        plural(count)
    )?;
    stdout.flush()?;
    let answer = try_read_line(&mut *stdin)?.unwrap_or_default();
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

#[test]
fn test_confirm() {
    use std::io::Cursor;

    let mut stdout = Cursor::new(Vec::new());
    let mut stdin = Cursor::new(b"Y\n");
    assert!(confirm("words", 1, &mut stdin, &mut stdout).unwrap());
    assert_eq!(
        String::from_utf8(stdout.into_inner()).unwrap(),
        "The category \"words\" with 1 card will be removed. Proceed? (y/N) "
    );

    for input in [&b"n\n"[..], &b"\n"[..], &b"yes please\n"[..], &b""[..]] {
        let mut stdin = Cursor::new(input);
        assert!(!confirm("words", 3, &mut stdin, &mut std::io::sink()).unwrap());
    }
}
