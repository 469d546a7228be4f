//! Shared test doubles for controller lifecycle tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use voicebrain::controller::{CommandSink, FocusProbe};
use voicebrain::recognizer::{
    EventReceiver, EventSender, Recognizer, RecognizerErrorKind, RecognizerEvent, Utterance,
};

/// Recognizer double driven from the test body through a probe
pub struct ScriptedRecognizer {
    events: EventSender,
    start_calls: Arc<AtomicUsize>,
    fail_start: bool,
    manual_ack: bool,
}

impl ScriptedRecognizer {
    pub fn new() -> (Self, EventReceiver, RecognizerProbe) {
        Self::build(false, false)
    }

    pub fn with_failing_start(fail_start: bool) -> (Self, EventReceiver, RecognizerProbe) {
        Self::build(fail_start, false)
    }

    /// Backend that accepts start/stop requests but never confirms them on
    /// its own; the test injects `Started`/`Ended` through the probe. Models
    /// a real engine whose lifecycle events lag behind the requests.
    pub fn with_manual_ack() -> (Self, EventReceiver, RecognizerProbe) {
        Self::build(false, true)
    }

    fn build(fail_start: bool, manual_ack: bool) -> (Self, EventReceiver, RecognizerProbe) {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let start_calls = Arc::new(AtomicUsize::new(0));
        let probe = RecognizerProbe {
            events: tx.clone(),
            start_calls: start_calls.clone(),
        };
        (
            Self {
                events: tx,
                start_calls,
                fail_start,
                manual_ack,
            },
            rx,
            probe,
        )
    }
}

#[async_trait]
impl Recognizer for ScriptedRecognizer {
    async fn start(&mut self) -> anyhow::Result<()> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_start {
            anyhow::bail!("speech capability missing");
        }
        if !self.manual_ack {
            let _ = self.events.send(RecognizerEvent::Started);
        }
        Ok(())
    }

    async fn stop(&mut self) {
        if !self.manual_ack {
            let _ = self.events.send(RecognizerEvent::Ended);
        }
    }
}

/// Test-side view of the scripted recognizer
pub struct RecognizerProbe {
    events: EventSender,
    start_calls: Arc<AtomicUsize>,
}

impl RecognizerProbe {
    pub fn start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    /// The backend confirms that capture began
    pub fn confirm_started(&self) {
        let _ = self.events.send(RecognizerEvent::Started);
    }

    /// The backend's session ended on its own
    pub fn end_session(&self) {
        let _ = self.events.send(RecognizerEvent::Ended);
    }

    pub fn error(&self, kind: RecognizerErrorKind) {
        let _ = self.events.send(RecognizerEvent::Error(kind));
    }

    pub fn utter_final(&self, text: &str) {
        let _ = self
            .events
            .send(RecognizerEvent::Result(Utterance::final_now(text)));
    }

    pub fn utter_partial(&self, text: &str) {
        let _ = self.events.send(RecognizerEvent::Result(Utterance {
            text: text.to_string(),
            is_final: false,
            timestamp_ms: 0,
        }));
    }
}

/// Sink that records every accepted utterance
#[derive(Clone, Default)]
pub struct RecordingSink {
    accepted: Arc<Mutex<Vec<String>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accepted(&self) -> Vec<String> {
        self.accepted.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandSink for RecordingSink {
    async fn accept(&mut self, utterance: &str) {
        self.accepted.lock().unwrap().push(utterance.to_string());
    }
}

/// Focus probe backed by a shared flag
#[derive(Clone)]
pub struct FocusFlag(pub Arc<AtomicBool>);

impl FocusFlag {
    pub fn focused() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn set(&self, focused: bool) {
        self.0.store(focused, Ordering::SeqCst);
    }
}

impl FocusProbe for FocusFlag {
    fn has_focus(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
