// src/conversation/types.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::persona::PersonaRef;

/// Message author role. Stored lowercase, mirrored by the schema CHECK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            "system" => Ok(Role::System),
            other => Err(anyhow::anyhow!("unknown message role: {other}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub username: String,
    /// Persona in effect when created or most recently rotated into it.
    pub persona_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub conversation_id: String,
    pub role: Role,
    pub content: String,
    /// Persona active when this message was produced.
    pub persona_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One applied rotation, append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaChange {
    pub id: String,
    pub conversation_id: String,
    pub from_persona_id: Option<String>,
    pub to_persona_id: String,
    pub changed_at: DateTime<Utc>,
}

// ---- Admin listing / export views (persona names joined in) ----

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub persona: Option<PersonaRef>,
}

/// Rotation rendered with persona names. `from` is "none" for the
/// change out of the unassigned state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaChangeView {
    pub timestamp: DateTime<Utc>,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationDetail {
    pub id: String,
    pub username: String,
    pub persona_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub messages: Vec<MessageView>,
    pub persona_changes: Vec<PersonaChangeView>,
}

/// Filters accepted by the admin conversation listing.
#[derive(Debug, Clone, Default)]
pub struct ConversationFilter {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    /// Username substring, case-insensitive.
    pub search: Option<String>,
}
