//! VoiceBrain Error Types
//!
//! Centralized error handling for the assistant.

use thiserror::Error;

/// Central error type for VoiceBrain
#[derive(Error, Debug)]
pub enum VoiceError {
    #[error("Knowledge graph error: {0}")]
    Graph(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for VoiceBrain operations
pub type VoiceResult<T> = Result<T, VoiceError>;
