use thiserror::Error;

/// Failures surfaced by configuration loading and the chat backend.
///
/// Only `Configuration` is fatal, and only before the UI starts. The others
/// arrive in the event loop as ordinary result events.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("connectivity check failed: {0}")]
    Connectivity(String),

    #[error("chat completion failed: {0}")]
    Completion(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, ChatError>;
