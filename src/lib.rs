//! # Daybook
//!
//! A conversational task and notes assistant served over HTTP.
//!
//! This library provides:
//! - An HTTP API accepting chat messages and returning text replies
//! - Slash-command dispatch for tasks, notes, listings, and summaries
//! - Natural-language due-date resolution
//! - A conversation fallback backed by a hosted language model
//!
//! ## Architecture
//!
//! ```text
//!   POST /chat ──► Dispatcher ──► SessionStore (pending actions)
//!                     │    │
//!                     │    ├────► Store (tasks, notes / SQLite)
//!                     │    └────► when::resolve (due dates)
//!                     ▼
//!               Conversation ──► OpenRouterClient
//! ```
//!
//! ## Message flow
//! 1. Receive `{message, session_id?}` via API
//! 2. Dispatcher checks the session's pending action, then the ordered
//!    command table, then keyword triggers
//! 3. Anything unmatched goes to the conversation fallback
//! 4. Return `{response, session_id}`
//!
//! ## Modules
//! - `chat`: dispatch loop, command table, conversation fallback
//! - `store`: SQLite persistence for tasks and notes
//! - `when`: natural-language date resolution
//! - `llm`: OpenRouter client with retry and typed errors

pub mod api;
pub mod chat;
pub mod config;
pub mod llm;
pub mod session;
pub mod store;
pub mod when;

pub use config::Config;
