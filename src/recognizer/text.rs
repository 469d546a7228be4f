//! Text Recognizer Backend
//!
//! Reads lines from stdin and emits each one as a final utterance. Useful for
//! driving the assistant without a speech engine: the lifecycle events are the
//! same ones a real backend would produce (`Started`, `Result`, `Ended`).

use super::{EventReceiver, EventSender, Recognizer, RecognizerEvent, Utterance};
use anyhow::Result;
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::debug;

pub struct TextRecognizer {
    events: EventSender,
    reader: Option<JoinHandle<()>>,
}

impl TextRecognizer {
    pub fn new() -> (Self, EventReceiver) {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        (
            Self {
                events: tx,
                reader: None,
            },
            rx,
        )
    }
}

#[async_trait]
impl Recognizer for TextRecognizer {
    async fn start(&mut self) -> Result<()> {
        if let Some(handle) = &self.reader {
            if !handle.is_finished() {
                debug!("Text recognizer already capturing");
                return Ok(());
            }
        }

        let events = self.events.clone();
        let handle = tokio::spawn(async move {
            let _ = events.send(RecognizerEvent::Started);

            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let line = line.trim().to_string();
                        if !line.is_empty() {
                            let _ = events.send(RecognizerEvent::Result(Utterance::final_now(line)));
                        }
                    }
                    // EOF or read failure is a natural end-of-session
                    Ok(None) | Err(_) => break,
                }
            }

            let _ = events.send(RecognizerEvent::Ended);
        });

        self.reader = Some(handle);
        Ok(())
    }

    async fn stop(&mut self) {
        if let Some(handle) = self.reader.take() {
            handle.abort();
            let _ = self.events.send(RecognizerEvent::Ended);
        }
    }
}
