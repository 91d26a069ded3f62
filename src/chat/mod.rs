//! Message dispatch: the single entry point that turns one chat message into
//! one text reply.
//!
//! Rules apply in strict order:
//! 1. A session awaiting a due date tries to parse the message as a time.
//! 2. Affirmation tokens advance (or acknowledge) the pending action.
//! 3. Slash commands from the ordered table in [`command`].
//! 4. Keyword triggers ("remind me", "note", ...) on free text.
//! 5. Everything else goes to the conversation fallback.

mod command;
mod conversation;

pub use command::Command;
pub use conversation::Conversation;

use std::sync::Arc;

use chrono::Utc;
use regex::Regex;

use crate::llm::LlmClient;
use crate::session::{PendingAction, SessionStore};
use crate::store::{Store, StoreError, TaskRecord};
use crate::when;

const AFFIRMATIONS: &[&str] = &["yes", "sure", "go ahead", "add one", "okay", "ok"];

const HELP_TEXT: &str = "🧠 I can help you stay on top of your day:\n\
    • `/task read a chapter` → add task\n\
    • `/notes project ideas` → save a note\n\
    • `/show tasks` → list tasks\n\
    • `/show calendar` → tasks with dates, calendar style\n\
    • `/show notes` → list notes\n\
    • `/summarize` → quick summary of notes\n\
    • or just say what’s on your mind";

/// Shown when the language model is unreachable after retries.
const LLM_DOWN: &str =
    "😕 I couldn’t reach my language model just now — mind trying that again in a moment?";

/// Turns one inbound message into one reply, tracking per-session state.
pub struct Dispatcher {
    store: Arc<Store>,
    sessions: SessionStore,
    conversation: Conversation,
}

impl Dispatcher {
    pub fn new(store: Arc<Store>, llm: Arc<dyn LlmClient>, model: String) -> Self {
        Self {
            store,
            sessions: SessionStore::new(),
            conversation: Conversation::new(llm, model),
        }
    }

    /// Apply the dispatch rules to one message.
    ///
    /// Storage failures bubble up; language-model failures are logged and
    /// surfaced as an in-band reply so the chat never 500s for them.
    pub async fn handle(&self, session_id: &str, raw: &str) -> Result<String, StoreError> {
        let input = raw.trim();
        let lowered = input.to_lowercase();

        // Rule 1: a session waiting on a due date consumes this message.
        if let Some(PendingAction::AwaitingDueDate { subject }) =
            self.sessions.pending(session_id).await
        {
            return self.attach_due_date(session_id, &subject, input).await;
        }

        // Rule 2: affirmation tokens.
        if AFFIRMATIONS.contains(&lowered.as_str()) {
            if let Some(PendingAction::AskedDueDate { subject }) =
                self.sessions.pending(session_id).await
            {
                self.sessions
                    .set(session_id, PendingAction::AwaitingDueDate { subject })
                    .await;
                return Ok("Cool. When should I remind you or mark it due?".to_string());
            }
            return Ok("Got it! What’s next?".to_string());
        }

        // Rule 3: slash commands.
        if let Some(cmd) = Command::parse(input) {
            return self.run_command(session_id, cmd).await;
        }

        // Rule 4: keyword triggers on free text.
        if lowered.contains("remind me") || lowered.contains("to-do") {
            let content = strip_phrases(input, r"(?i)(remind me|to-do|add a task)");
            if content.is_empty() {
                return Ok("What task should I note down?".to_string());
            }
            let task = self.store.add_task(&content)?;
            self.remember_task(session_id, &task).await;
            return Ok(format!(
                "📝 Task added: “{}.” Want me to set a reminder?",
                task.content
            ));
        }
        if lowered.contains("note") || lowered.contains("remember") {
            // Substring stripping on purpose: it can bite into longer words
            // ("noteworthy" → "worthy"), matching the original surface.
            let content = strip_phrases(input, r"(?i)(note|remember)");
            if content.is_empty() {
                return Ok("Sure! What should I remember?".to_string());
            }
            let note = self.store.add_note(&content)?;
            return Ok(format!(
                "🧠 Noted: “{}.” Want to tag this or keep going?",
                note.content
            ));
        }

        // Rule 5: conversation fallback.
        Ok(self.fallback(input).await)
    }

    /// Rule 1 body: try to parse a due date and attach it atomically.
    async fn attach_due_date(
        &self,
        session_id: &str,
        subject: &str,
        input: &str,
    ) -> Result<String, StoreError> {
        let Some(due) = when::resolve(input, Utc::now()) else {
            // Not a time expression; keep waiting.
            return Ok(
                "⏰ Could you let me know what time or day you want this task set for?"
                    .to_string(),
            );
        };

        match self.store.set_due_for_latest(subject, due)? {
            Some(task) => {
                self.sessions.clear(session_id).await;
                Ok(format!(
                    "📅 Got it — “{}” is due {}. ✅ What’s next?",
                    task.content,
                    when::format_due(due)
                ))
            }
            None => {
                self.sessions.clear(session_id).await;
                tracing::warn!(subject, "pending due date had no matching task");
                Ok(format!(
                    "🤔 I couldn’t find a task called “{}” anymore, so nothing was scheduled.",
                    subject
                ))
            }
        }
    }

    async fn run_command(&self, session_id: &str, cmd: Command) -> Result<String, StoreError> {
        match cmd {
            Command::AddTask(content) => {
                if content.is_empty() {
                    return Ok("🔖 What task should I add?".to_string());
                }
                let task = self.store.add_task(&content)?;
                self.remember_task(session_id, &task).await;
                Ok(format!(
                    "✅ Task added: “{}.” Want to add a due date or priority?",
                    task.content
                ))
            }
            Command::AddNote(content) => {
                if content.is_empty() {
                    return Ok("📝 Sure — what should I write down?".to_string());
                }
                let note = self.store.add_note(&content)?;
                Ok(format!(
                    "📒 Noted: “{}.” Want to tag or organize it further?",
                    note.content
                ))
            }
            Command::ShowTasks => {
                let tasks = self.store.tasks_by_due()?;
                if tasks.is_empty() {
                    return Ok("🤷 No tasks saved yet. Want to add one now?".to_string());
                }
                let lines: Vec<String> = tasks.iter().map(task_line).collect();
                Ok(format!("🗂️ Your tasks:\n{}", lines.join("\n")))
            }
            Command::ShowCalendar => {
                let tasks = self.store.tasks_by_due()?;
                if tasks.is_empty() {
                    return Ok("🤷 No tasks saved yet. Want to add one now?".to_string());
                }
                let lines: Vec<String> = tasks.iter().map(calendar_line).collect();
                Ok(format!("📆 Your calendar:\n{}", lines.join("\n")))
            }
            Command::ShowNotes => {
                let notes = self.store.notes_in_order()?;
                if notes.is_empty() {
                    return Ok(
                        "📭 No notes found. You can try `/notes your note here`.".to_string()
                    );
                }
                let lines: Vec<String> =
                    notes.iter().map(|n| format!("📝 {}", n.content)).collect();
                Ok(format!("🧾 Here’s what you’ve noted:\n{}", lines.join("\n")))
            }
            Command::Summarize => {
                let notes = self.store.notes_in_order()?;
                if notes.is_empty() {
                    return Ok("🫥 No notes yet — nothing to summarize.".to_string());
                }
                let all_notes: Vec<&str> = notes.iter().map(|n| n.content.as_str()).collect();
                let prompt = format!(
                    "Summarize these notes casually:\n{}",
                    all_notes.join("\n")
                );
                Ok(self.fallback(&prompt).await)
            }
            Command::Help => Ok(HELP_TEXT.to_string()),
        }
    }

    /// After creating a task, offer a due date on the next turn.
    async fn remember_task(&self, session_id: &str, task: &TaskRecord) {
        self.sessions
            .set(
                session_id,
                PendingAction::AskedDueDate {
                    subject: task.content.clone(),
                },
            )
            .await;
    }

    async fn fallback(&self, text: &str) -> String {
        match self.conversation.say(text).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!(kind = %e.kind, "conversation fallback failed: {}", e.message);
                LLM_DOWN.to_string()
            }
        }
    }
}

fn task_line(task: &TaskRecord) -> String {
    match task.due_date {
        Some(due) => format!("• {} — due {}", task.content, when::format_due(due)),
        None => format!("• {}", task.content),
    }
}

fn calendar_line(task: &TaskRecord) -> String {
    match task.due_date {
        Some(due) => format!("• {} | {}", due.format("%a %b %e %H:%M"), task.content),
        None => format!("• (unscheduled) | {}", task.content),
    }
}

/// Remove every occurrence of the alternation from the text and trim.
fn strip_phrases(input: &str, pattern: &str) -> String {
    match Regex::new(pattern) {
        Ok(re) => re.replace_all(input, "").trim().to_string(),
        Err(_) => input.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_trigger_phrases() {
        assert_eq!(
            strip_phrases("remind me buy milk", r"(?i)(remind me|to-do|add a task)"),
            "buy milk"
        );
        assert_eq!(
            strip_phrases("Remind Me to-do laundry", r"(?i)(remind me|to-do|add a task)"),
            "laundry"
        );
    }

    #[test]
    fn stripping_is_substring_based() {
        // The word "note" inside "noteworthy" is removed too; this quirk is
        // part of the observable surface.
        assert_eq!(
            strip_phrases("noteworthy things", r"(?i)(note|remember)"),
            "worthy things"
        );
    }
}
