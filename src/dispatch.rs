//! Command Dispatcher
//!
//! Interprets finalized utterances and routes them to page actions.
//! Matching is a linear sequence of substring tests over the lowercased
//! phrase; anything unmatched falls through to the LLM action extractor when
//! enabled (questions it cannot map get a free-form answer), and finally to
//! typing the raw phrase into the focused field.

use crate::config::Config;
use crate::controller::CommandSink;
use crate::graph::GraphClient;
use crate::history::CommandHistory;
use crate::llm::{ActionSuggestion, GroqClient};
use crate::page::PageDriver;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::{debug, info, warn};

/// Scroll step in pixels for "scroll up"/"scroll down"
const SCROLL_STEP: i32 = 300;

/// Leading words that turn a typed phrase into a question
const QUESTION_WORDS: &[&str] = &[
    "what", "when", "where", "who", "why", "how", "is", "are", "can", "could", "would", "should",
];

/// Phrases that end the session
const QUIT_PHRASES: &[&str] = &["stop listening", "quit", "exit", "goodbye", "good bye"];

/// Result of dispatching one utterance
#[derive(Debug, PartialEq)]
pub enum DispatchResult {
    /// A page action was performed
    Handled,
    /// Text to surface to the user
    Feedback(String),
    /// User asked to end the session
    Quit,
    /// Nothing matched and no fallback applied
    NotRecognized,
}

pub struct CommandDispatcher {
    driver: Arc<dyn PageDriver>,
    history: CommandHistory,
    llm: Option<GroqClient>,
    graph: Option<GraphClient>,
    quit: Arc<Notify>,
}

impl CommandDispatcher {
    pub fn new(driver: Arc<dyn PageDriver>, config: &Config) -> Self {
        Self {
            driver,
            history: CommandHistory::new(config.history_size),
            llm: None,
            graph: None,
            quit: Arc::new(Notify::new()),
        }
    }

    pub fn set_llm(&mut self, llm: GroqClient) {
        if llm.is_enabled() {
            self.llm = Some(llm);
        }
    }

    pub fn set_graph(&mut self, graph: GraphClient) {
        if graph.is_enabled() {
            self.graph = Some(graph);
        }
    }

    /// Notified once when a quit phrase is dispatched
    pub fn quit_signal(&self) -> Arc<Notify> {
        self.quit.clone()
    }

    /// Interpret one finalized utterance
    pub async fn dispatch(&mut self, text: &str) -> DispatchResult {
        let cmd = text.to_lowercase();
        let cmd = cmd.trim();
        debug!("Dispatching command: '{}'", cmd);

        if Self::is_quit(cmd) {
            return DispatchResult::Quit;
        }

        // Page movement
        if cmd.contains("scroll down") {
            let _ = self.driver.scroll_by(SCROLL_STEP).await;
            return DispatchResult::Handled;
        }
        if cmd.contains("scroll up") {
            let _ = self.driver.scroll_by(-SCROLL_STEP).await;
            return DispatchResult::Handled;
        }
        if cmd.contains("go to top") || cmd == "top" {
            let _ = self.driver.scroll_to_top().await;
            return DispatchResult::Handled;
        }
        if cmd.contains("go to bottom") || cmd == "bottom" {
            let _ = self.driver.scroll_to_bottom().await;
            return DispatchResult::Handled;
        }

        // Browser navigation
        if cmd.contains("go back") || cmd == "back" {
            let _ = self.driver.navigate_back().await;
            return DispatchResult::Handled;
        }
        if cmd.contains("go forward") || cmd == "forward" {
            let _ = self.driver.navigate_forward().await;
            return DispatchResult::Handled;
        }
        if cmd.contains("refresh") || cmd.contains("reload") {
            let _ = self.driver.refresh().await;
            return DispatchResult::Handled;
        }

        // Text input
        if let Some(rest) = cmd.strip_prefix("type ") {
            return self.type_into_page(rest).await;
        }
        if cmd == "clear" || cmd.contains("clear field") {
            let _ = self.driver.clear_input().await;
            return DispatchResult::Handled;
        }
        if cmd.contains("submit") || cmd == "send" {
            let _ = self.driver.submit().await;
            return DispatchResult::Handled;
        }

        // Knowledge graph capture and recall
        if let Some(rest) = cmd.strip_prefix("remember ") {
            return self.remember(rest).await;
        }
        if let Some(rest) = cmd.strip_prefix("recall ") {
            return self.recall(rest).await;
        }

        if cmd == "history" || cmd == "show history" {
            return DispatchResult::Feedback(self.history.summary());
        }
        if cmd == "help" || cmd == "list commands" {
            return DispatchResult::Feedback(
                "Commands: scroll up/down, go to top/bottom, go back/forward, refresh, \
                 type [text], clear, submit, remember [text], recall [text], history, \
                 stop listening"
                    .to_string(),
            );
        }

        // LLM fallback for natural phrasing; questions the extractor cannot
        // map to an action get a free-form answer instead
        if let Some(llm) = &self.llm {
            match llm.extract_action(cmd).await {
                Ok(Some(suggestion)) => {
                    info!(
                        "🧠 LLM action: {} (confidence: {:.2})",
                        suggestion.action, suggestion.confidence
                    );
                    return self.apply_suggestion(&suggestion).await;
                }
                Ok(None) => {
                    debug!("LLM had no action for: '{}'", cmd);
                    if Self::is_question(cmd) {
                        match llm.complete(text).await {
                            Ok(Some(answer)) => return DispatchResult::Feedback(answer),
                            Ok(None) => {}
                            Err(e) => warn!("LLM answer failed: {}", e),
                        }
                    }
                }
                Err(e) => warn!("LLM fallback failed: {}", e),
            }
        }

        // Default: type the phrase into the focused field, as spoken
        self.type_into_page(text).await
    }

    fn is_quit(cmd: &str) -> bool {
        QUIT_PHRASES.iter().any(|p| cmd.contains(p))
    }

    /// A phrase is a question when it leads with a question word
    fn is_question(text: &str) -> bool {
        let lower = text.to_lowercase();
        QUESTION_WORDS
            .iter()
            .any(|q| lower.starts_with(&format!("{} ", q)))
    }

    /// Question phrases get a trailing question mark
    fn smart_punctuate(text: &str) -> String {
        if Self::is_question(text) {
            format!("{}?", text)
        } else {
            text.to_string()
        }
    }

    async fn type_into_page(&self, text: &str) -> DispatchResult {
        let text = Self::smart_punctuate(text.trim());
        match self.driver.type_text(&text).await {
            Ok(true) => DispatchResult::Handled,
            Ok(false) => DispatchResult::Feedback("No input focused".to_string()),
            Err(e) => {
                warn!("Typing failed: {}", e);
                DispatchResult::NotRecognized
            }
        }
    }

    async fn remember(&self, content: &str) -> DispatchResult {
        let Some(graph) = &self.graph else {
            return DispatchResult::Feedback("Knowledge graph is not configured".to_string());
        };
        match graph.create_idea(content, "voice").await {
            Ok(()) => DispatchResult::Feedback(format!("Remembered: {}", content)),
            Err(e) => {
                warn!("Idea capture failed: {}", e);
                DispatchResult::Feedback("Could not save that".to_string())
            }
        }
    }

    async fn recall(&self, text: &str) -> DispatchResult {
        let Some(graph) = &self.graph else {
            return DispatchResult::Feedback("Knowledge graph is not configured".to_string());
        };
        match graph.find_ideas(text, 5).await {
            Ok(ideas) if !ideas.is_empty() => DispatchResult::Feedback(ideas.join("; ")),
            Ok(_) => DispatchResult::Feedback(format!("Nothing remembered about {}", text)),
            Err(e) => {
                warn!("Recall failed: {}", e);
                DispatchResult::Feedback("Could not search ideas".to_string())
            }
        }
    }

    async fn apply_suggestion(&self, suggestion: &ActionSuggestion) -> DispatchResult {
        match suggestion.action.as_str() {
            "scroll_down" => {
                let _ = self.driver.scroll_by(SCROLL_STEP).await;
            }
            "scroll_up" => {
                let _ = self.driver.scroll_by(-SCROLL_STEP).await;
            }
            "scroll_top" => {
                let _ = self.driver.scroll_to_top().await;
            }
            "scroll_bottom" => {
                let _ = self.driver.scroll_to_bottom().await;
            }
            "back" => {
                let _ = self.driver.navigate_back().await;
            }
            "forward" => {
                let _ = self.driver.navigate_forward().await;
            }
            "refresh" => {
                let _ = self.driver.refresh().await;
            }
            "type" => {
                if let Some(text) = &suggestion.argument {
                    return self.type_into_page(text).await;
                }
                return DispatchResult::NotRecognized;
            }
            "clear" => {
                let _ = self.driver.clear_input().await;
            }
            "submit" => {
                let _ = self.driver.submit().await;
            }
            other => {
                warn!("Unknown LLM action: {}", other);
                return DispatchResult::NotRecognized;
            }
        }
        DispatchResult::Handled
    }
}

#[async_trait]
impl CommandSink for CommandDispatcher {
    async fn accept(&mut self, utterance: &str) {
        self.history.record(utterance);

        match self.dispatch(utterance).await {
            DispatchResult::Handled => {}
            DispatchResult::Feedback(message) => info!("💬 {}", message),
            DispatchResult::Quit => {
                info!("👋 Quit requested by voice");
                self.quit.notify_waiters();
            }
            DispatchResult::NotRecognized => debug!("No action for: '{}'", utterance),
        }
    }
}
