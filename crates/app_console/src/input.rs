use core_notes::NoteDraft;
use core_types::{Note, SortOption, UiLanguage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Command {
    List,
    Add,
    Edit(usize),
    Pin(usize),
    Delete(usize),
    Sort(SortOption),
    Lang(UiLanguage),
    Help,
    Quit,
    Empty,
    Unknown,
}

impl Command {
    pub(crate) fn parse(line: &str) -> Self {
        let mut parts = line.split_whitespace();
        let Some(verb) = parts.next() else {
            return Self::Empty;
        };
        let arg = parts.next();
        if parts.next().is_some() {
            return Self::Unknown;
        }

        let row = || arg.and_then(|value| value.parse::<usize>().ok());
        match (verb, arg) {
            ("list" | "ls", None) => Self::List,
            ("add" | "new", None) => Self::Add,
            ("edit", Some(_)) => row().map_or(Self::Unknown, Self::Edit),
            ("pin", Some(_)) => row().map_or(Self::Unknown, Self::Pin),
            ("delete" | "rm", Some(_)) => row().map_or(Self::Unknown, Self::Delete),
            ("sort", Some("title")) => Self::Sort(SortOption::ByTitle),
            ("sort", Some("created")) => Self::Sort(SortOption::ByCreatedAt),
            ("sort", Some("updated")) => Self::Sort(SortOption::ByUpdatedAt),
            ("lang", Some("fr")) => Self::Lang(UiLanguage::FrFr),
            ("lang", Some("en")) => Self::Lang(UiLanguage::EnUs),
            ("help" | "?", None) => Self::Help,
            ("quit" | "exit" | "q", None) => Self::Quit,
            _ => Self::Unknown,
        }
    }
}

pub(crate) fn note_at_row<'a>(view: &[&'a Note], row: usize) -> Option<&'a Note> {
    let index = row.checked_sub(1)?;
    view.get(index).copied()
}

pub(crate) fn apply_answers(
    mut draft: NoteDraft,
    title: String,
    content: String,
    pin: &str,
) -> NoteDraft {
    if !title.is_empty() {
        draft.title = title;
    }
    if !content.is_empty() {
        draft.content = content;
    }
    if let Some(is_pinned) = parse_yes_no(pin) {
        draft.is_pinned = is_pinned;
    }
    draft
}

fn parse_yes_no(answer: &str) -> Option<bool> {
    match answer.trim().to_lowercase().as_str() {
        "o" | "oui" | "y" | "yes" => Some(true),
        "n" | "non" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_and_aliases() {
        assert_eq!(Command::parse("list"), Command::List);
        assert_eq!(Command::parse("  ls  "), Command::List);
        assert_eq!(Command::parse("new"), Command::Add);
        assert_eq!(Command::parse("edit 3"), Command::Edit(3));
        assert_eq!(Command::parse("pin 1"), Command::Pin(1));
        assert_eq!(Command::parse("rm 2"), Command::Delete(2));
        assert_eq!(
            Command::parse("sort created"),
            Command::Sort(SortOption::ByCreatedAt)
        );
        assert_eq!(Command::parse("lang en"), Command::Lang(UiLanguage::EnUs));
        assert_eq!(Command::parse("?"), Command::Help);
        assert_eq!(Command::parse("exit"), Command::Quit);
        assert_eq!(Command::parse("   "), Command::Empty);
    }

    #[test]
    fn rejects_malformed_commands() {
        assert_eq!(Command::parse("edit"), Command::Unknown);
        assert_eq!(Command::parse("edit one"), Command::Unknown);
        assert_eq!(Command::parse("delete -1"), Command::Unknown);
        assert_eq!(Command::parse("list all"), Command::Unknown);
        assert_eq!(Command::parse("pin 1 2"), Command::Unknown);
        assert_eq!(Command::parse("sort size"), Command::Unknown);
        assert_eq!(Command::parse("LIST"), Command::Unknown);
        assert_eq!(Command::parse("\u{FFFD}"), Command::Unknown);
    }

    #[test]
    fn rows_are_one_based_positions_in_the_view() {
        let first = Note::new("first", "a");
        let second = Note::new("second", "b");
        let view = vec![&second, &first];

        assert_eq!(note_at_row(&view, 1).map(|n| n.id), Some(second.id));
        assert_eq!(note_at_row(&view, 2).map(|n| n.id), Some(first.id));
        assert!(note_at_row(&view, 0).is_none());
        assert!(note_at_row(&view, 3).is_none());
    }

    #[test]
    fn empty_answers_keep_current_values() {
        let current = NoteDraft::new("Title", "Body", true);

        let kept = apply_answers(current.clone(), String::new(), String::new(), "");
        assert_eq!(kept, current);

        let changed = apply_answers(current, "New".to_owned(), String::new(), "non");
        assert_eq!(changed, NoteDraft::new("New", "Body", false));
    }

    #[test]
    fn pin_answer_accepts_french_and_english() {
        for yes in ["o", "Oui", "y", " YES "] {
            assert_eq!(parse_yes_no(yes), Some(true), "{yes}");
        }
        for no in ["n", "NON", "no"] {
            assert_eq!(parse_yes_no(no), Some(false), "{no}");
        }
        assert_eq!(parse_yes_no("maybe"), None);
    }
}
