//! Error types for Teddy
//!
//! This module defines the infrastructure error types used throughout the
//! application, using `thiserror` for ergonomic error handling.
//!
//! Conversation failures (rejected requests, empty completions, unreachable
//! endpoints) are not errors: they are `CompletionResult` values that end up
//! in the transcript. The variants below cover everything around that loop.

use thiserror::Error;

/// Main error type for Teddy operations
#[derive(Error, Debug)]
pub enum TeddyError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Provider setup errors (HTTP client construction, bad endpoint URL)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Speech recognition or synthesis errors
    #[error("Speech error: {0}")]
    Speech(String),

    /// Camera acquisition errors
    #[error("Camera error: {0}")]
    Camera(String),

    /// A voice capture was requested while one is already running
    #[error("Speech recognition is already listening")]
    AlreadyListening,

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Terminal line editor errors
    #[error("Readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
}

/// Result type alias for Teddy operations
///
/// Uses `anyhow::Error` so callers can attach context while propagating.
pub type Result<T> = anyhow::Result<T>;
