//! Console command parsing.
//!
//! Rows are shown and typed 1-based; [`Command`] carries 0-based indices.

use anyhow::{Context, Result, anyhow, bail};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Place a character token on the shared scene.
    Spawn { id: String, name: String },
    /// Delete a token from the scene.
    Delete { id: String },
    /// Replace the active player's selection.
    Select { ids: Vec<String> },
    Add,
    Invoke,
    /// Click "Add to Turn Order" on the given tokens.
    Menu { ids: Vec<String> },
    Next,
    Previous,
    Reset,
    Up { index: usize },
    Down { index: usize },
    Remove { index: usize },
    /// Switch the active player (0-based seat).
    Seat { seat: usize },
    Show,
    Help,
    Quit,
}

pub const HELP: &str = "\
spawn <id> <name>   place a character token
delete <id>         remove a token from the scene
select <id>...      select tokens as the active player
add                 roll initiative for the selection
invoke              add the selection beside the active turn
menu <id>...        use the context menu on tokens
next | prev         advance or rewind the turn
reset               clear the active turn
up|down|rm <row>    move or remove a row
as <player>         act as another player
show                print the active player's view
quit                leave the table";

impl Command {
    /// Parses one console line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };
        let rest: Vec<&str> = words.collect();

        let command = match verb.to_ascii_lowercase().as_str() {
            "spawn" => match rest.as_slice() {
                [id, name @ ..] if !name.is_empty() => Self::Spawn {
                    id: (*id).to_owned(),
                    name: name.join(" "),
                },
                _ => bail!("usage: spawn <id> <name>"),
            },
            "delete" => match rest.as_slice() {
                [id] => Self::Delete { id: (*id).to_owned() },
                _ => bail!("usage: delete <id>"),
            },
            "select" => Self::Select { ids: owned(&rest) },
            "add" => Self::Add,
            "invoke" => Self::Invoke,
            "menu" => {
                if rest.is_empty() {
                    bail!("usage: menu <id>...");
                }
                Self::Menu { ids: owned(&rest) }
            }
            "next" | "n" => Self::Next,
            "prev" | "p" => Self::Previous,
            "reset" => Self::Reset,
            "up" => Self::Up { index: row(&rest)? },
            "down" => Self::Down { index: row(&rest)? },
            "rm" | "remove" => Self::Remove { index: row(&rest)? },
            "as" => Self::Seat { seat: row(&rest)? },
            "show" | "ls" => Self::Show,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => bail!("unknown command `{other}` (try `help`)"),
        };
        Ok(Some(command))
    }
}

fn owned(words: &[&str]) -> Vec<String> {
    words.iter().map(|word| (*word).to_owned()).collect()
}

/// Single 1-based number, returned 0-based.
fn row(words: &[&str]) -> Result<usize> {
    let [word] = words else {
        bail!("expected exactly one number");
    };
    let number: usize = word
        .parse()
        .with_context(|| format!("`{word}` is not a number"))?;
    number.checked_sub(1).ok_or_else(|| anyhow!("numbering starts at 1"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_are_one_based() {
        assert_eq!(Command::parse("up 1").unwrap(), Some(Command::Up { index: 0 }));
        assert_eq!(Command::parse("rm 3").unwrap(), Some(Command::Remove { index: 2 }));
        assert_eq!(Command::parse("as 2").unwrap(), Some(Command::Seat { seat: 1 }));
        assert!(Command::parse("down 0").is_err());
        assert!(Command::parse("down x").is_err());
        assert!(Command::parse("down").is_err());
    }

    #[test]
    fn spawn_keeps_multi_word_names() {
        assert_eq!(
            Command::parse("spawn gob1 Goblin Archer").unwrap(),
            Some(Command::Spawn {
                id: "gob1".to_owned(),
                name: "Goblin Archer".to_owned()
            })
        );
        assert!(Command::parse("spawn gob1").is_err());
    }

    #[test]
    fn blank_and_unknown_lines() {
        assert_eq!(Command::parse("   ").unwrap(), None);
        assert_eq!(Command::parse("NEXT").unwrap(), Some(Command::Next));
        assert_eq!(Command::parse("select").unwrap(), Some(Command::Select { ids: vec![] }));
        assert!(Command::parse("dance").is_err());
    }
}
