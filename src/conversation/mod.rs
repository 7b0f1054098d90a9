// src/conversation/mod.rs
//! Conversation persistence: transcripts, persona change history, and the
//! aggregate queries behind stats and export.

pub mod stats;
pub mod store;
pub mod types;

pub use stats::{BucketCount, PersonaUsage};
pub use store::ConversationStore;
pub use types::{
    Conversation, ConversationDetail, ConversationFilter, Message, MessageView, PersonaChange,
    PersonaChangeView, Role,
};
