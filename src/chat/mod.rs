// src/chat/mod.rs
//! Chat turn orchestration: persona selection, rotation, history, completion.

pub mod service;

pub use service::{ChatError, ChatOutcome, ChatService};
