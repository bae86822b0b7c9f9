//! Line commands for `journee edit`.
//!
//! Day and spot numbers are 1-based, as printed by `show`.

use jiff::civil::{Date, Time};

use crate::model::{Edit, ItineraryStatus, SpotCategory};
use crate::session::EditorSession;

use super::format;

pub const HELP: &str = "\
Edits:
  title <text>                       rename the trip
  destination [text]                 set or clear the destination
  summary [text]                     set or clear the summary
  start [YYYY-MM-DD]                 set or clear the first day
  status draft|completed
  add-day [title]
  remove-day <day>
  add-spot <day> <name> [@HH:MM] [#category] [$cost]
  remove-spot <day> <spot>
  move-spot <day> <from> <to>
Session:
  undo | redo                        step through history
  save                               save now instead of waiting
  saved                              show the save status
  show                               print the itinerary
  help | quit";

/// A parsed command line.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Edit(Edit),
    Undo,
    Redo,
    Save,
    Saved,
    Show,
    Help,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Parses one line. Blank lines yield `None`.
pub fn parse(line: &str) -> Result<Option<Input>, String> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(None);
    };
    let rest: Vec<&str> = words.collect();

    let input = match command {
        "title" => Input::Edit(Edit::SetTitle {
            title: required_text(&rest, "title")?,
        }),
        "destination" => Input::Edit(Edit::SetDestination {
            destination: optional_text(&rest),
        }),
        "summary" => Input::Edit(Edit::SetSummary {
            summary: optional_text(&rest),
        }),
        "start" => Input::Edit(Edit::SetStartDate {
            date: match rest.as_slice() {
                [] => None,
                [date] => Some(
                    date.parse::<Date>()
                        .map_err(|e| format!("invalid date '{date}': {e}"))?,
                ),
                _ => return Err("usage: start [YYYY-MM-DD]".to_string()),
            },
        }),
        "status" => Input::Edit(Edit::SetStatus {
            status: match rest.as_slice() {
                ["draft"] => ItineraryStatus::Draft,
                ["completed"] => ItineraryStatus::Completed,
                _ => return Err("usage: status draft|completed".to_string()),
            },
        }),
        "add-day" => Input::Edit(Edit::AddDay {
            title: optional_text(&rest),
        }),
        "remove-day" => match rest.as_slice() {
            [day] => Input::Edit(Edit::RemoveDay {
                day: number(day, "day")?,
            }),
            _ => return Err("usage: remove-day <day>".to_string()),
        },
        "add-spot" => parse_add_spot(&rest)?,
        "remove-spot" => match rest.as_slice() {
            [day, spot] => Input::Edit(Edit::RemoveSpot {
                day: number(day, "day")?,
                index: number(spot, "spot")? - 1,
            }),
            _ => return Err("usage: remove-spot <day> <spot>".to_string()),
        },
        "move-spot" => match rest.as_slice() {
            [day, from, to] => Input::Edit(Edit::MoveSpot {
                day: number(day, "day")?,
                from: number(from, "spot")? - 1,
                to: number(to, "spot")? - 1,
            }),
            _ => return Err("usage: move-spot <day> <from> <to>".to_string()),
        },
        "undo" => Input::Undo,
        "redo" => Input::Redo,
        "save" => Input::Save,
        "saved" => Input::Saved,
        "show" => Input::Show,
        "help" | "?" => Input::Help,
        "quit" | "exit" => Input::Quit,
        other => return Err(format!("unknown command '{other}'; try `help`")),
    };
    Ok(Some(input))
}

fn parse_add_spot(args: &[&str]) -> Result<Input, String> {
    const USAGE: &str = "usage: add-spot <day> <name> [@HH:MM] [#category] [$cost]";

    let Some((day, rest)) = args.split_first() else {
        return Err(USAGE.to_string());
    };
    let day = number(day, "day")?;

    let mut name = Vec::new();
    let mut time = None;
    let mut category = SpotCategory::default();
    let mut estimated_cost = None;
    for word in rest {
        if let Some(t) = word.strip_prefix('@') {
            time = Some(
                t.parse::<Time>()
                    .map_err(|e| format!("invalid time '{t}': {e}"))?,
            );
        } else if let Some(c) = word.strip_prefix('#') {
            category = c.parse()?;
        } else if let Some(c) = word.strip_prefix('$') {
            estimated_cost = Some(
                c.parse::<u64>()
                    .map_err(|_| format!("invalid cost '{c}'"))?,
            );
        } else {
            name.push(*word);
        }
    }
    if name.is_empty() {
        return Err(USAGE.to_string());
    }

    Ok(Input::Edit(Edit::AddSpot {
        day,
        name: name.join(" "),
        time,
        category,
        estimated_cost,
    }))
}

fn remaining(steps: usize, end: &str) -> String {
    match steps {
        0 => format!(" (at the {end} state)"),
        1 => " (1 more step)".to_string(),
        n => format!(" ({n} more steps)"),
    }
}

/// Runs one parsed command against the session, printing its result.
pub fn execute(session: &mut EditorSession, input: Input) -> Flow {
    match input {
        Input::Edit(edit) => match session.apply(&edit) {
            Ok(_) => println!("ok"),
            Err(e) => eprintln!("cannot apply: {e}"),
        },
        Input::Undo if !session.can_undo() => println!("nothing to undo"),
        Input::Undo => {
            session.undo();
            println!("undone{}", remaining(session.undo_depth(), "oldest"));
        }
        Input::Redo if !session.can_redo() => println!("nothing to redo"),
        Input::Redo => {
            session.redo();
            println!("redone{}", remaining(session.redo_depth(), "newest"));
        }
        Input::Save => {
            session.save_now();
            println!("saving");
        }
        Input::Saved => println!("{}", format::save_status(&session.status())),
        Input::Show => {
            if let Some(current) = session.current() {
                print!("{}", format::itinerary(current));
            }
        }
        Input::Help => println!("{HELP}"),
        Input::Quit => return Flow::Quit,
    }
    Flow::Continue
}

/// A positive 1-based number.
fn number(word: &str, what: &str) -> Result<usize, String> {
    match word.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("invalid {what} number '{word}'")),
    }
}

fn required_text(words: &[&str], what: &str) -> Result<String, String> {
    optional_text(words).ok_or_else(|| format!("{what} cannot be empty"))
}

fn optional_text(words: &[&str]) -> Option<String> {
    (!words.is_empty()).then(|| words.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edit(line: &str) -> Edit {
        match parse(line) {
            Ok(Some(Input::Edit(edit))) => edit,
            other => panic!("expected an edit from {line:?}, got {other:?}"),
        }
    }

    #[test]
    fn blank_lines_are_ignored() {
        assert_eq!(parse("   "), Ok(None));
    }

    #[test]
    fn title_joins_words() {
        assert_eq!(
            edit("title  Kyoto   in spring"),
            Edit::SetTitle {
                title: "Kyoto in spring".into()
            }
        );
        assert!(parse("title").is_err());
    }

    #[test]
    fn destination_without_text_clears() {
        assert_eq!(
            edit("destination"),
            Edit::SetDestination { destination: None }
        );
    }

    #[test]
    fn start_date_parses_iso_dates() {
        assert_eq!(
            edit("start 2026-04-01"),
            Edit::SetStartDate {
                date: Some(jiff::civil::date(2026, 4, 1))
            }
        );
        assert!(parse("start April").is_err());
    }

    #[test]
    fn add_spot_with_options() {
        assert_eq!(
            edit("add-spot 2 Nishiki Market @11:30 #food $3000"),
            Edit::AddSpot {
                day: 2,
                name: "Nishiki Market".into(),
                time: Some(jiff::civil::time(11, 30, 0, 0)),
                category: SpotCategory::Food,
                estimated_cost: Some(3000),
            }
        );
    }

    #[test]
    fn add_spot_needs_a_name() {
        assert!(parse("add-spot 1 @09:00").is_err());
        assert!(parse("add-spot").is_err());
        assert!(parse("add-spot 1 Temple #museum").is_err());
    }

    #[test]
    fn spot_numbers_are_one_based() {
        assert_eq!(
            edit("move-spot 1 3 1"),
            Edit::MoveSpot {
                day: 1,
                from: 2,
                to: 0
            }
        );
        assert!(parse("remove-spot 1 0").is_err());
    }

    #[test]
    fn session_commands() {
        assert_eq!(parse("undo"), Ok(Some(Input::Undo)));
        assert_eq!(parse("redo"), Ok(Some(Input::Redo)));
        assert_eq!(parse("exit"), Ok(Some(Input::Quit)));
        assert!(parse("frobnicate").unwrap_err().contains("unknown command"));
    }
}
