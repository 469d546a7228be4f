//! VoiceBrain Library
//!
//! Core modules for the VoiceBrain voice-control assistant.

pub mod config;
pub mod controller;
pub mod dispatch;
pub mod error;
pub mod graph;
pub mod history;
pub mod llm;
pub mod page;
pub mod recognizer;
