//! Command History
//!
//! Bounded ring of the most recent accepted utterances, surfaced through the
//! "history" voice command.

use chrono::{DateTime, Local};
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub at: DateTime<Local>,
    pub text: String,
}

#[derive(Debug)]
pub struct CommandHistory {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl CommandHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn record(&mut self, text: &str) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(HistoryEntry {
            at: Local::now(),
            text: text.to_string(),
        });
    }

    /// Most recent first
    pub fn recent(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One-line rendering for voice/log feedback
    pub fn summary(&self) -> String {
        if self.entries.is_empty() {
            return "No commands yet".to_string();
        }
        self.recent()
            .map(|e| format!("{} - {}", e.at.format("%H:%M:%S"), e.text))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
