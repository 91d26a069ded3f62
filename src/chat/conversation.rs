//! Conversation fallback backed by the language model.
//!
//! Keeps a rolling in-memory history for the lifetime of the process and
//! forwards it with each new message. History is process-wide and not
//! persisted; a restart starts the conversation fresh.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::llm::{ChatMessage, ChatOptions, LlmClient, LlmError};

const SYSTEM_PROMPT: &str =
    "You are Daybook, a friendly assistant that helps people keep track of \
     their tasks and notes. Keep replies short and conversational.";

/// Number of user/assistant turns kept in the rolling window.
const MAX_HISTORY: usize = 32;

/// Rolling chat history plus the client used for fallback replies.
pub struct Conversation {
    client: Arc<dyn LlmClient>,
    model: String,
    history: Mutex<Vec<ChatMessage>>,
}

impl Conversation {
    pub fn new(client: Arc<dyn LlmClient>, model: String) -> Self {
        Self {
            client,
            model,
            history: Mutex::new(Vec::new()),
        }
    }

    /// Forward a message (with history) to the model and return its reply.
    ///
    /// On success the exchange is appended to the history; failures leave
    /// the history untouched so a retry sees the same context.
    pub async fn say(&self, text: &str) -> Result<String, LlmError> {
        let mut messages = vec![ChatMessage::system(SYSTEM_PROMPT)];
        {
            let history = self.history.lock().await;
            messages.extend(history.iter().cloned());
        }
        messages.push(ChatMessage::user(text));

        let options = ChatOptions {
            temperature: Some(0.7),
            ..Default::default()
        };
        let response = self
            .client
            .chat_completion_with_options(&self.model, &messages, options)
            .await?;
        let reply = response.text().to_string();

        let mut history = self.history.lock().await;
        history.push(ChatMessage::user(text));
        history.push(ChatMessage::assistant(reply.clone()));
        let excess = history.len().saturating_sub(MAX_HISTORY * 2);
        if excess > 0 {
            history.drain(..excess);
        }

        Ok(reply)
    }
}
