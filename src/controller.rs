//! Listening Controller
//!
//! Keeps a continuous speech-recognition session alive across the
//! recognizer's natural end-of-session events, while respecting hard stop
//! requests and giving up after repeated failures.
//!
//! The controller is a single tokio task selecting over three sources: caller
//! commands, recognizer events, and the timer for a pending restart. All
//! state lives inside that task, so no two handlers ever run concurrently
//! against the same session. A pending restart is just a deadline; clearing
//! it on `stop()` is the cancellation.

use crate::config::Config;
use crate::recognizer::{
    ErrorSeverity, EventReceiver, Recognizer, RecognizerErrorKind, RecognizerEvent,
};
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

/// Collaborator that receives one finalized utterance at a time
#[async_trait]
pub trait CommandSink: Send {
    async fn accept(&mut self, utterance: &str);
}

/// Host focus probe, re-checked immediately before a scheduled restart fires
pub trait FocusProbe: Send {
    fn has_focus(&self) -> bool;
}

/// Default probe for hosts without a focus concept
pub struct AlwaysFocused;

impl FocusProbe for AlwaysFocused {
    fn has_focus(&self) -> bool {
        true
    }
}

/// Lifecycle transitions reported to the status observer
///
/// Failures travel through this channel as data; nothing is thrown across
/// the public contract.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Started,
    Stopped,
    RestartScheduled { attempt: u32, delay: Duration },
    RestartExhausted,
    Error { kind: RecognizerErrorKind, fatal: bool },
}

/// Bounded auto-restart configuration
#[derive(Debug, Clone)]
pub struct RestartPolicy {
    pub auto_restart: bool,
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RestartPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            auto_restart: config.auto_restart,
            max_attempts: config.max_restart_attempts,
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
        }
    }

    /// Delay before the given restart attempt (1-based): linear backoff,
    /// capped at `max_delay`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let ms = (self.base_delay.as_millis() as u64).saturating_mul(attempt as u64);
        Duration::from_millis(ms).min(self.max_delay)
    }
}

impl Default for RestartPolicy {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Transient per-session state, exclusively owned by the controller task
#[derive(Debug, Default, Clone)]
pub struct Session {
    pub listening: bool,
    pub restarting: bool,
    pub restart_attempts: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListenState {
    Idle,
    Listening,
    Stopping,
    RestartPending,
}

#[derive(Debug)]
enum Command {
    Start,
    Stop,
}

/// Cloneable handle for issuing start/stop requests to a running controller
#[derive(Clone)]
pub struct ControllerHandle {
    cmd_tx: mpsc::UnboundedSender<Command>,
}

impl ControllerHandle {
    pub fn start(&self) {
        let _ = self.cmd_tx.send(Command::Start);
    }

    pub fn stop(&self) {
        let _ = self.cmd_tx.send(Command::Stop);
    }
}

pub struct ListeningController {
    recognizer: Box<dyn Recognizer>,
    events: EventReceiver,
    sink: Box<dyn CommandSink>,
    policy: RestartPolicy,
    focus: Box<dyn FocusProbe>,
    status_tx: mpsc::UnboundedSender<Status>,
    cmd_rx: mpsc::UnboundedReceiver<Command>,
    session: Session,
    state: ListenState,
    restart_deadline: Option<Instant>,
    /// start() was issued to the recognizer and Started has not arrived yet
    starting: bool,
    /// start() arrived while a stop was completing; honored on the end event
    queued_start: bool,
    /// Set on fatal error or budget exhaustion; cleared only by explicit stop()
    needs_reset: bool,
}

impl ListeningController {
    /// Spawn the controller task. Returns the command handle and the status
    /// observer channel.
    pub fn spawn(
        recognizer: Box<dyn Recognizer>,
        events: EventReceiver,
        sink: Box<dyn CommandSink>,
        policy: RestartPolicy,
        focus: Box<dyn FocusProbe>,
    ) -> (ControllerHandle, mpsc::UnboundedReceiver<Status>) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = mpsc::unbounded_channel();

        let controller = Self {
            recognizer,
            events,
            sink,
            policy,
            focus,
            status_tx,
            cmd_rx,
            session: Session::default(),
            state: ListenState::Idle,
            restart_deadline: None,
            starting: false,
            queued_start: false,
            needs_reset: false,
        };
        tokio::spawn(controller.run());

        (ControllerHandle { cmd_tx }, status_rx)
    }

    async fn run(mut self) {
        loop {
            tokio::select! {
                cmd = self.cmd_rx.recv() => match cmd {
                    Some(Command::Start) => self.handle_start().await,
                    Some(Command::Stop) => self.handle_stop().await,
                    None => break, // every handle dropped, shut down
                },
                Some(event) = self.events.recv() => self.handle_event(event).await,
                _ = Self::wait(self.restart_deadline), if self.restart_deadline.is_some() => {
                    self.fire_restart().await;
                }
            }
        }
    }

    async fn wait(deadline: Option<Instant>) {
        if let Some(deadline) = deadline {
            sleep_until(deadline).await;
        }
    }

    async fn handle_start(&mut self) {
        if self.needs_reset {
            debug!("start() ignored: restart budget exhausted, stop() resets it");
            return;
        }
        if self.state == ListenState::Stopping {
            // the recognizer's end event is still in flight; start afterwards
            self.queued_start = true;
            return;
        }
        if self.session.listening || self.starting || self.state != ListenState::Idle {
            debug!("start() ignored: session already active ({:?})", self.state);
            return;
        }
        self.request_start().await;
    }

    async fn handle_stop(&mut self) {
        let was_active = self.session.listening
            || self.starting
            || matches!(
                self.state,
                ListenState::Listening | ListenState::RestartPending
            );
        // an in-flight start counts as active capture: its Started
        // confirmation may still land after this stop
        let backend_active = self.session.listening || self.starting;

        self.restart_deadline = None;
        self.starting = false;
        self.queued_start = false;
        self.session.restarting = false;
        self.session.restart_attempts = 0;
        self.needs_reset = false;

        if backend_active {
            self.recognizer.stop().await;
            self.state = ListenState::Stopping;
        } else {
            self.state = ListenState::Idle;
        }

        if was_active {
            self.emit(Status::Stopped);
        }
    }

    async fn handle_event(&mut self, event: RecognizerEvent) {
        match event {
            RecognizerEvent::Started => {
                if self.state == ListenState::Stopping {
                    // stop already requested, the trailing end event wins
                    return;
                }
                if !self.starting {
                    // confirmation for a start that was since stopped,
                    // cancelled, or failed fatally; the session stays down
                    debug!("Ignoring stale session-started event");
                    return;
                }
                self.starting = false;
                self.session.listening = true;
                self.session.restarting = false;
                self.state = ListenState::Listening;
                self.emit(Status::Started);
            }
            RecognizerEvent::Result(utterance) => {
                if !utterance.is_final {
                    return;
                }
                let text = utterance.text.trim();
                if text.is_empty() {
                    return;
                }
                debug!("📝 Heard: '{}'", text);
                self.sink.accept(text).await;
            }
            RecognizerEvent::Ended => self.handle_ended().await,
            RecognizerEvent::Error(kind) => self.handle_error(kind).await,
        }
    }

    async fn handle_ended(&mut self) {
        self.session.listening = false;
        self.starting = false;

        match self.state {
            ListenState::Stopping | ListenState::Idle => {
                // explicit stop or post-fatal cleanup, nothing to schedule
                self.state = ListenState::Idle;
                if self.queued_start {
                    self.queued_start = false;
                    self.request_start().await;
                }
            }
            ListenState::RestartPending => {
                debug!("Session end ignored: restart already pending");
            }
            ListenState::Listening => {
                if !self.policy.auto_restart {
                    self.state = ListenState::Idle;
                    self.emit(Status::Stopped);
                } else if self.session.restart_attempts >= self.policy.max_attempts {
                    self.state = ListenState::Idle;
                    self.needs_reset = true;
                    info!("Restart budget exhausted after {} attempts", self.session.restart_attempts);
                    self.emit(Status::RestartExhausted);
                } else {
                    self.session.restart_attempts += 1;
                    self.session.restarting = true;
                    let attempt = self.session.restart_attempts;
                    let delay = self.policy.delay_for(attempt);
                    self.restart_deadline = Some(Instant::now() + delay);
                    self.state = ListenState::RestartPending;
                    info!(
                        "🔁 Restart {}/{} scheduled in {:?}",
                        attempt, self.policy.max_attempts, delay
                    );
                    self.emit(Status::RestartScheduled { attempt, delay });
                }
            }
        }
    }

    async fn handle_error(&mut self, kind: RecognizerErrorKind) {
        match kind.severity() {
            ErrorSeverity::Ignored => {
                debug!("Ignoring recognizer error: {}", kind);
            }
            ErrorSeverity::Transient => {
                warn!("Transient recognizer error: {}", kind);
                self.emit(Status::Error { kind, fatal: false });
            }
            ErrorSeverity::Aborted => {
                warn!("Recognizer aborted the session, exhausting restart budget");
                self.session.restart_attempts = self.policy.max_attempts;
                self.emit(Status::Error { kind, fatal: false });
                if self.state == ListenState::RestartPending {
                    // no end-of-session event will follow a cancelled restart
                    self.restart_deadline = None;
                    self.session.restarting = false;
                    self.state = ListenState::Idle;
                    self.needs_reset = true;
                    self.emit(Status::RestartExhausted);
                }
            }
            ErrorSeverity::Fatal => {
                warn!("Fatal recognizer error: {}", kind);
                self.recognizer.stop().await;
                self.fail_fatal(kind);
            }
        }
    }

    /// A scheduled restart came due: re-check focus, then ask the recognizer
    /// to start again.
    async fn fire_restart(&mut self) {
        self.restart_deadline = None;
        self.session.restarting = false;

        if self.state != ListenState::RestartPending {
            return; // stale timer
        }
        if !self.focus.has_focus() {
            debug!("Host lost focus, abandoning scheduled restart");
            self.state = ListenState::Idle;
            return;
        }
        self.request_start().await;
    }

    async fn request_start(&mut self) {
        match self.recognizer.start().await {
            Ok(()) => {
                // Started event confirms the transition to Listening
                self.starting = true;
            }
            Err(e) => {
                warn!("Recognizer capability unavailable: {}", e);
                self.fail_fatal(RecognizerErrorKind::Unavailable);
            }
        }
    }

    fn fail_fatal(&mut self, kind: RecognizerErrorKind) {
        self.restart_deadline = None;
        self.starting = false;
        self.session.listening = false;
        self.session.restarting = false;
        self.needs_reset = true;
        self.state = ListenState::Idle;
        self.emit(Status::Error { kind, fatal: true });
    }

    fn emit(&self, status: Status) {
        let _ = self.status_tx.send(status);
    }
}
