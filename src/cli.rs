//! Line protocol for the headless UI binding.
//!
//! ```text
//! start [hash]        nav <page>          hash <hash>
//! open <id>           back                search [query]
//! category [name]     theme               quit
//! comment <name>|<text>
//! contact <name>|<email>|<subject>|<message>
//! ```

use crate::app::UiEvent;
use crate::router::Page;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Event(UiEvent),
    Quit,
}

pub fn parse_line(line: &str) -> Result<Command, String> {
    let line = line.trim_end_matches(['\r', '\n']);
    let (verb, rest) = match line.split_once(' ') {
        Some((v, r)) => (v, r),
        None => (line, ""),
    };

    let event = match verb {
        "quit" | "exit" => return Ok(Command::Quit),
        "start" => UiEvent::Start {
            hash: rest.trim().to_string(),
        },
        "nav" => {
            let page = Page::from_id(rest.trim())
                .ok_or_else(|| format!("Unknown page: {}", rest.trim()))?;
            UiEvent::NavClicked(page)
        }
        "hash" => UiEvent::HashChanged(rest.trim().to_string()),
        "open" => {
            let id = rest
                .trim()
                .parse::<i64>()
                .map_err(|_| format!("Not a post id: {}", rest.trim()))?;
            UiEvent::PostClicked(id)
        }
        "back" => UiEvent::Back,
        "search" => UiEvent::SearchInput(rest.to_string()),
        "category" => UiEvent::CategoryChanged(rest.trim().to_string()),
        "theme" => UiEvent::ToggleTheme,
        "comment" => {
            let mut parts = rest.splitn(2, '|');
            UiEvent::SubmitComment {
                name: parts.next().unwrap_or("").to_string(),
                text: parts.next().unwrap_or("").to_string(),
            }
        }
        "contact" => {
            let mut parts = rest.splitn(4, '|');
            UiEvent::SubmitContact {
                name: parts.next().unwrap_or("").to_string(),
                email: parts.next().unwrap_or("").to_string(),
                subject: parts.next().unwrap_or("").to_string(),
                message: parts.next().unwrap_or("").to_string(),
            }
        }
        "" => return Err("Empty command".to_string()),
        other => return Err(format!("Unknown command: {}", other)),
    };

    Ok(Command::Event(event))
}
