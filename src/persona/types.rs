// src/persona/types.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named system prompt configuration applied to LLM calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    pub id: String,
    pub name: String,
    pub system_prompt: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Trimmed persona reference embedded in conversation payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaRef {
    pub id: String,
    pub name: String,
}

/// POST body. Both fields are checked by the handler so a missing key
/// reports the same error as an empty one.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePersonaRequest {
    pub name: Option<String>,
    pub system_prompt: Option<String>,
}

/// PATCH body: either an `is_active` toggle or field edits.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePersonaRequest {
    pub is_active: Option<bool>,
    pub name: Option<String>,
    pub system_prompt: Option<String>,
}
