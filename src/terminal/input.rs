use anyhow::{Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use std::io::{BufRead, Write};
use std::str::FromStr;

pub const MENU: &str = "\nWho would you like to unsubscribe from?\n\
Choose from the following menu options:\n\
-----------------------------------------------------------------\n\
1 <---- Unsubscribes from all found emailers.\n\
2 <---- Unsubscribe from one or a range of emailers.\n\
3 <---- Prints the found unsubscribe info.\n\
4 <---- Prints unsubscribe info verbose.\n\
5 <---- Exits the program.\n\
-----------------------------------------------------------------";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    UnsubscribeAll,
    UnsubscribeSome,
    PrintCompact,
    PrintVerbose,
    Exit,
}

impl FromStr for MenuChoice {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "1" => Ok(MenuChoice::UnsubscribeAll),
            "2" => Ok(MenuChoice::UnsubscribeSome),
            "3" => Ok(MenuChoice::PrintCompact),
            "4" => Ok(MenuChoice::PrintVerbose),
            "5" | "-1" | "q" => Ok(MenuChoice::Exit),
            other => Err(anyhow!("'{other}' is not a menu option")),
        }
    }
}

/// Prints `prompt` and reads one line. `None` on end of input.
pub fn prompt_line(input: &mut impl BufRead, prompt: &str) -> Result<Option<String>> {
    println!("{prompt}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Reads a secret without echoing it.
pub fn read_secret(prompt: &str) -> Result<String> {
    print!("{prompt}");
    std::io::stdout().flush()?;

    terminal::enable_raw_mode()?;
    let result = read_secret_raw();
    terminal::disable_raw_mode()?;
    println!();
    result
}

fn read_secret_raw() -> Result<String> {
    let mut secret = String::new();
    loop {
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Enter => break,
                KeyCode::Backspace => {
                    secret.pop();
                }
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    return Err(anyhow!("password entry interrupted"));
                }
                KeyCode::Esc => return Err(anyhow!("password entry cancelled")),
                KeyCode::Char(c) => secret.push(c),
                _ => {}
            }
        }
    }
    Ok(secret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn menu_choices() {
        assert_eq!("1".parse::<MenuChoice>().unwrap(), MenuChoice::UnsubscribeAll);
        assert_eq!(" 4\n".parse::<MenuChoice>().unwrap(), MenuChoice::PrintVerbose);
        assert_eq!("-1".parse::<MenuChoice>().unwrap(), MenuChoice::Exit);
        assert!("9".parse::<MenuChoice>().is_err());
    }

    #[test]
    fn prompt_line_trims_and_detects_eof() {
        let mut input = Cursor::new("  2-3 \n");
        assert_eq!(prompt_line(&mut input, "?").unwrap().as_deref(), Some("2-3"));
        assert_eq!(prompt_line(&mut input, "?").unwrap(), None);
    }
}
