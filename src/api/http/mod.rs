// src/api/http/mod.rs

pub mod auth;
pub mod chat;
pub mod conversations;
pub mod handlers;
pub mod personas;
pub mod rotation;
pub mod router;
pub mod settings;
pub mod stats;

pub use router::create_router;
