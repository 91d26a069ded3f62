//! Runtime configuration.
//!
//! Everything is sourced from environment variables with sensible defaults,
//! so the binary runs with nothing set except `OPENROUTER_API_KEY`.

use std::path::PathBuf;

/// Application configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind host (`HOST`, default `0.0.0.0`).
    pub host: String,
    /// Bind port (`PORT`, default `8080`).
    pub port: u16,
    /// SQLite database path (`DAYBOOK_DB`, default `daybook.db`).
    pub database_path: PathBuf,
    /// Directory with the bundled web page (`DAYBOOK_STATIC_DIR`, default `static`).
    pub static_dir: PathBuf,
    /// API key for the remote language model (`OPENROUTER_API_KEY`).
    pub openrouter_api_key: Option<String>,
    /// Model identifier sent to OpenRouter (`DAYBOOK_MODEL`).
    pub model: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port,
            database_path: std::env::var("DAYBOOK_DB")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("daybook.db")),
            static_dir: std::env::var("DAYBOOK_STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("static")),
            openrouter_api_key: std::env::var("OPENROUTER_API_KEY").ok(),
            model: std::env::var("DAYBOOK_MODEL")
                .unwrap_or_else(|_| "openai/gpt-3.5-turbo".to_string()),
        }
    }
}
