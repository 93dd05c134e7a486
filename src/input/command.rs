use anyhow::{anyhow, bail, Result};
use std::str::FromStr;

/// A line typed at the grid prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Select a box
    Select(usize),
    /// Press a keypad button by key id
    Press(u32),
    /// Blank the selected box without touching totals
    Clear,
    /// Reset every box
    Reset,
    /// Print the grand total
    Total,
    /// Print the grid
    Show,
    /// List keypad buttons
    Keys,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace();
        let Some(word) = parts.next() else {
            bail!("empty command");
        };
        let arg = parts.next();
        if parts.next().is_some() {
            bail!("too many arguments to '{}'", word);
        }

        let command = match (word.to_ascii_lowercase().as_str(), arg) {
            ("select" | "s", Some(n)) => Command::Select(
                n.parse()
                    .map_err(|_| anyhow!("'{}' is not a box index", n))?,
            ),
            ("press" | "p", Some(n)) => Command::Press(
                n.parse()
                    .map_err(|_| anyhow!("'{}' is not a key id", n))?,
            ),
            ("clear", None) => Command::Clear,
            ("reset", None) => Command::Reset,
            ("total", None) => Command::Total,
            ("show", None) => Command::Show,
            ("keys", None) => Command::Keys,
            ("help" | "?", None) => Command::Help,
            ("quit" | "exit" | "q", None) => Command::Quit,
            ("select" | "s" | "press" | "p", None) => bail!("'{}' needs an argument", word),
            (_, _) => bail!("unknown command '{}'", line.trim()),
        };

        Ok(command)
    }
}

pub const HELP: &str = "\
commands:
  select N   select box N
  press ID   press keypad button ID
  clear      blank the selected box
  reset      clear every box
  total      print the sum of stored keys
  show       print the grid
  keys       list keypad buttons
  quit       exit";
