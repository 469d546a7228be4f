//! Recognizer Capability
//!
//! Abstracts the speech-recognition backend behind a start/stop trait plus an
//! event channel. The controller treats the backend as opaque: it only sees
//! lifecycle events, utterances, and a closed set of error kinds classified
//! once at this boundary.

pub mod text;

use crate::config::Config;
use crate::error::{VoiceError, VoiceResult};
use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

// Re-export main types
pub use text::TextRecognizer;

/// One piece of recognized text, partial or final
#[derive(Debug, Clone)]
pub struct Utterance {
    pub text: String,
    pub is_final: bool,
    pub timestamp_ms: i64,
}

impl Utterance {
    pub fn final_now(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: true,
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Closed set of recognizer error kinds
///
/// Classification happens here, once, instead of re-interpreting error
/// strings at each call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognizerErrorKind {
    /// Microphone/recognition permission was denied
    PermissionDenied,
    /// The recognition capability is absent or cannot be reached
    Unavailable,
    /// The backend forcibly ended the session
    Aborted,
    /// No speech was heard during the session
    NoSpeech,
    /// Audio capture failure
    Audio,
    /// Network failure talking to a remote backend
    Network,
    /// Anything the backend reports that we do not model
    Other(String),
}

/// Severity buckets the controller acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Terminates the session and disables auto-restart until explicit reset
    Fatal,
    /// Exhausts the restart budget immediately (prevents restart storms)
    Aborted,
    /// Reported, but does not interrupt the end-of-session restart flow
    Transient,
    /// Fully suppressed, never surfaced
    Ignored,
}

impl RecognizerErrorKind {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::PermissionDenied | Self::Unavailable => ErrorSeverity::Fatal,
            Self::Aborted => ErrorSeverity::Aborted,
            Self::NoSpeech => ErrorSeverity::Ignored,
            Self::Audio | Self::Network | Self::Other(_) => ErrorSeverity::Transient,
        }
    }
}

impl std::fmt::Display for RecognizerErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PermissionDenied => write!(f, "permission-denied"),
            Self::Unavailable => write!(f, "unavailable"),
            Self::Aborted => write!(f, "aborted"),
            Self::NoSpeech => write!(f, "no-speech"),
            Self::Audio => write!(f, "audio"),
            Self::Network => write!(f, "network"),
            Self::Other(s) => write!(f, "{}", s),
        }
    }
}

/// Events emitted by a recognizer backend
#[derive(Debug, Clone)]
pub enum RecognizerEvent {
    /// Capture started
    Started,
    /// The session ended on its own (or after a stop request)
    Ended,
    /// A recognition result, possibly partial
    Result(Utterance),
    /// Backend error, already classified into a kind
    Error(RecognizerErrorKind),
}

pub type EventSender = mpsc::UnboundedSender<RecognizerEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<RecognizerEvent>;

/// Trait for recognizer backends
///
/// Events flow over the channel returned at construction; start/stop are
/// requests, confirmed asynchronously by `Started`/`Ended` events.
#[async_trait]
pub trait Recognizer: Send {
    /// Request that capture begin. An error here means the capability is
    /// unavailable - a terminal condition for the session.
    async fn start(&mut self) -> Result<()>;

    /// Request that capture end. The backend confirms with an `Ended` event.
    async fn stop(&mut self);
}

/// Factory to create the configured recognizer backend
pub fn create_recognizer(config: &Config) -> VoiceResult<(Box<dyn Recognizer>, EventReceiver)> {
    match config.recognizer.as_str() {
        "text" => {
            let (rec, events) = TextRecognizer::new();
            Ok((Box::new(rec), events))
        }
        other => Err(VoiceError::Config(format!(
            "Unknown recognizer backend: {}",
            other
        ))),
    }
}
