// src/lib.rs

pub mod api;
pub mod chat;
pub mod config;
pub mod conversation;
pub mod llm;
pub mod persona;
pub mod prompt;
pub mod rotation;
pub mod server;
pub mod settings;
pub mod state;
