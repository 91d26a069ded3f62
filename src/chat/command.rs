//! Slash-command parsing.
//!
//! Commands are matched by case-insensitive prefix against an explicit
//! ordered table, so shadowing between prefixes is visible in one place
//! rather than scattered across if/else chains.

/// A recognized slash command with its trimmed argument, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/task <text>` — create a task.
    AddTask(String),
    /// `/notes <text>` — save a note.
    AddNote(String),
    /// `/show tasks` — list tasks by due date.
    ShowTasks,
    /// `/show calendar` — same ordering, calendar-style lines.
    ShowCalendar,
    /// `/show notes` — list notes in storage order.
    ShowNotes,
    /// `/summarize` — summarize all notes via the language model.
    Summarize,
    /// `/help` — static command reference.
    Help,
}

/// What a table entry produces once its prefix matches.
#[derive(Debug, Clone, Copy)]
enum CommandKind {
    AddTask,
    AddNote,
    ShowTasks,
    ShowCalendar,
    ShowNotes,
    Summarize,
    Help,
}

/// Ordered prefix table. Matching is first-hit: an earlier prefix shadows any
/// later prefix it starts with, so longer variants of a shared stem must come
/// first (`/show tasks` before a hypothetical `/show`).
const COMMANDS: &[(&str, CommandKind)] = &[
    ("/show tasks", CommandKind::ShowTasks),
    ("/show calendar", CommandKind::ShowCalendar),
    ("/show notes", CommandKind::ShowNotes),
    ("/summarize", CommandKind::Summarize),
    ("/help", CommandKind::Help),
    ("/task", CommandKind::AddTask),
    ("/notes", CommandKind::AddNote),
];

impl Command {
    /// Parse a trimmed message into a command, or `None` for free text.
    ///
    /// Matching is prefix-based, not exact: `/taskmaster x` parses as
    /// `/task` with content `master x`. This mirrors the original chat
    /// surface, where trailing text after the command word is the argument.
    pub fn parse(input: &str) -> Option<Command> {
        let lowered = input.to_lowercase();
        for (prefix, kind) in COMMANDS {
            if !lowered.starts_with(prefix) {
                continue;
            }
            // Checked slice: lowercasing can change byte lengths for exotic
            // input, and a prefix hit on the lowered text does not guarantee
            // a char boundary in the original.
            let content = input
                .get(prefix.len()..)
                .map(str::trim)
                .unwrap_or("")
                .to_string();
            return Some(match kind {
                CommandKind::AddTask => Command::AddTask(content),
                CommandKind::AddNote => Command::AddNote(content),
                CommandKind::ShowTasks => Command::ShowTasks,
                CommandKind::ShowCalendar => Command::ShowCalendar,
                CommandKind::ShowNotes => Command::ShowNotes,
                CommandKind::Summarize => Command::Summarize,
                CommandKind::Help => Command::Help,
            });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_with_content() {
        assert_eq!(
            Command::parse("/task buy milk"),
            Some(Command::AddTask("buy milk".into()))
        );
        assert_eq!(
            Command::parse("/notes project ideas"),
            Some(Command::AddNote("project ideas".into()))
        );
        assert_eq!(Command::parse("/show tasks"), Some(Command::ShowTasks));
        assert_eq!(Command::parse("/show calendar"), Some(Command::ShowCalendar));
        assert_eq!(Command::parse("/show notes"), Some(Command::ShowNotes));
        assert_eq!(Command::parse("/summarize"), Some(Command::Summarize));
        assert_eq!(Command::parse("/help"), Some(Command::Help));
    }

    #[test]
    fn prefixes_are_case_insensitive() {
        assert_eq!(
            Command::parse("/TASK Buy Milk"),
            Some(Command::AddTask("Buy Milk".into()))
        );
        assert_eq!(Command::parse("/Show Tasks"), Some(Command::ShowTasks));
    }

    #[test]
    fn empty_content_parses_as_empty() {
        assert_eq!(Command::parse("/task"), Some(Command::AddTask(String::new())));
        assert_eq!(Command::parse("/notes "), Some(Command::AddNote(String::new())));
    }

    #[test]
    fn prefix_matching_quirk_is_preserved() {
        // "/tasks x" still hits the /task prefix; the leftover "s" lands in
        // the argument.
        assert_eq!(
            Command::parse("/tasks call mom"),
            Some(Command::AddTask("s call mom".into()))
        );
    }

    #[test]
    fn show_variants_do_not_shadow_each_other() {
        // "/show tasks" must not fall through to /task or /notes.
        assert_eq!(Command::parse("/show tasks now"), Some(Command::ShowTasks));
        assert_eq!(Command::parse("/show notes"), Some(Command::ShowNotes));
    }

    #[test]
    fn free_text_is_not_a_command() {
        assert_eq!(Command::parse("remind me to stretch"), None);
        assert_eq!(Command::parse("hello there"), None);
    }
}
