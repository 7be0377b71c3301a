//! Error types for kora-narration

use thiserror::Error;

/// Narration errors
#[derive(Error, Debug)]
pub enum NarrationError {
    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
