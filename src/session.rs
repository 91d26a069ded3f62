//! Per-session pending-action state.
//!
//! A pending action tracks a multi-turn command, such as waiting for a due
//! date after a task was added. State is keyed by session id so concurrent
//! conversations never see each other's pending actions. Nothing here is
//! persisted; a restart clears all pending state.

use std::collections::HashMap;

use tokio::sync::RwLock;

/// Transient state spanning two requests within one conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    /// A task was just created and the user was asked whether to add a due
    /// date. `subject` is the task content.
    AskedDueDate { subject: String },
    /// The user said yes; the next message is expected to be a date/time.
    AwaitingDueDate { subject: String },
}

/// In-memory map of session id to pending action.
#[derive(Debug, Default)]
pub struct SessionStore {
    pending: RwLock<HashMap<String, PendingAction>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current pending action for a session, if any.
    pub async fn pending(&self, session_id: &str) -> Option<PendingAction> {
        self.pending.read().await.get(session_id).cloned()
    }

    /// Replace the session's pending action.
    pub async fn set(&self, session_id: &str, action: PendingAction) {
        self.pending
            .write()
            .await
            .insert(session_id.to_string(), action);
    }

    /// Clear the session's pending action.
    pub async fn clear(&self, session_id: &str) {
        self.pending.write().await.remove(session_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sessions_are_isolated() {
        let store = SessionStore::new();
        store
            .set(
                "alpha",
                PendingAction::AskedDueDate {
                    subject: "buy milk".into(),
                },
            )
            .await;

        assert!(store.pending("beta").await.is_none());
        assert_eq!(
            store.pending("alpha").await,
            Some(PendingAction::AskedDueDate {
                subject: "buy milk".into()
            })
        );

        store.clear("alpha").await;
        assert!(store.pending("alpha").await.is_none());
    }
}
