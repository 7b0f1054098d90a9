// src/chat/service.rs
//! One chat turn, end to end.
//!
//! A turn pins down the active persona (selecting one on first contact and
//! giving the rotation scheduler a chance to swap it), loads or creates the
//! conversation, persists both sides of the exchange, and calls the
//! completion backend with the persona prompt plus the study's style
//! guidelines.

use std::sync::Arc;

use anyhow::Result;
use rand::Rng;
use thiserror::Error;
use tracing::{info, warn};

use crate::conversation::{Conversation, ConversationStore, PersonaChangeView, Role};
use crate::llm::{CompletionClient, CompletionMessage, CompletionRequest};
use crate::persona::{Persona, PersonaStore};
use crate::prompt::{
    compose_system_prompt, BASE_INSTRUCTIONS_KEY, DEFAULT_BASE_INSTRUCTIONS,
    DEFAULT_SYSTEM_PROMPT,
};
use crate::rotation::RotationScheduler;
use crate::settings::{AdminSettingsStore, Settings, SettingsStore};

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Conversation not found")]
    ConversationNotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Completed turn: the assistant reply plus the persona context the client
/// needs to render it.
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub content: String,
    pub conversation_id: String,
    pub persona: Option<Persona>,
    pub persona_changes: Vec<PersonaChangeView>,
}

pub struct ChatService {
    settings: SettingsStore,
    personas: PersonaStore,
    conversations: ConversationStore,
    admin_settings: AdminSettingsStore,
    scheduler: Arc<RotationScheduler>,
    client: Arc<dyn CompletionClient>,
}

impl ChatService {
    pub fn new(
        settings: SettingsStore,
        personas: PersonaStore,
        conversations: ConversationStore,
        admin_settings: AdminSettingsStore,
        scheduler: Arc<RotationScheduler>,
        client: Arc<dyn CompletionClient>,
    ) -> Self {
        Self {
            settings,
            personas,
            conversations,
            admin_settings,
            scheduler,
            client,
        }
    }

    pub async fn handle_turn(
        &self,
        conversation_id: Option<String>,
        username: Option<String>,
        user_message: String,
    ) -> Result<ChatOutcome, ChatError> {
        let settings = self.settings.get_or_create().await?;

        // First contact with no selection: pick any active persona so the
        // turn has a voice. The rotation clock stays untouched.
        if settings.selected_persona_id.is_none() {
            if let Some(persona) = self.random_active_persona().await? {
                info!(persona = %persona.name, "selected initial persona");
                self.settings.set_selected_persona(&persona.id).await?;
            }
        }

        // Give rotation a chance before answering. A failed check must not
        // take the chat down with it.
        if let Err(err) = self.scheduler.tick().await {
            warn!("rotation check failed: {err:#}");
        }

        // Re-read: the selection may have changed above.
        let settings = self.settings.get_or_create().await?;

        let conversation = self
            .resolve_conversation(conversation_id, username, &settings)
            .await?;

        let persona = match conversation.persona_id.as_deref() {
            Some(id) => self.personas.get(id).await?,
            None => None,
        };
        let persona_prompt = persona
            .as_ref()
            .map(|p| p.system_prompt.clone())
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

        // History before this turn, then persist the user's message tagged
        // with the persona that will answer it.
        let history = self.conversations.messages(&conversation.id).await?;
        self.conversations
            .append_message(
                &conversation.id,
                Role::User,
                user_message.clone(),
                settings.selected_persona_id.clone(),
            )
            .await?;

        let base_instructions = self
            .admin_settings
            .value_or(BASE_INSTRUCTIONS_KEY, DEFAULT_BASE_INSTRUCTIONS)
            .await?;
        let system_prompt = compose_system_prompt(&persona_prompt, &base_instructions);

        let mut messages: Vec<CompletionMessage> = history
            .into_iter()
            .map(|m| CompletionMessage {
                role: m.role,
                content: m.content,
            })
            .collect();
        messages.push(CompletionMessage {
            role: Role::User,
            content: user_message,
        });

        let content = self
            .client
            .complete(CompletionRequest {
                model: settings.model_name.clone(),
                system_prompt,
                messages,
                temperature: settings.temperature,
                max_tokens: settings.max_tokens,
            })
            .await?;

        self.conversations
            .append_message(
                &conversation.id,
                Role::Assistant,
                content.clone(),
                settings.selected_persona_id.clone(),
            )
            .await?;

        let persona_changes = self.conversations.persona_changes(&conversation.id).await?;

        Ok(ChatOutcome {
            content,
            conversation_id: conversation.id,
            persona,
            persona_changes,
        })
    }

    /// Load the requested conversation, or start a new one under the current
    /// persona. An existing conversation is re-pinned to the current
    /// selection, recording the swap in its rotation history.
    async fn resolve_conversation(
        &self,
        conversation_id: Option<String>,
        username: Option<String>,
        settings: &Settings,
    ) -> Result<Conversation, ChatError> {
        let Some(id) = conversation_id else {
            let conversation = self
                .conversations
                .create(
                    username.unwrap_or_else(|| "Anonymous".to_string()),
                    settings.selected_persona_id.clone(),
                )
                .await?;
            return Ok(conversation);
        };

        let mut conversation = self
            .conversations
            .get(&id)
            .await?
            .ok_or(ChatError::ConversationNotFound)?;

        if conversation.persona_id != settings.selected_persona_id {
            if let Some(to_id) = settings.selected_persona_id.as_deref() {
                self.conversations
                    .record_persona_change(
                        &conversation.id,
                        conversation.persona_id.as_deref(),
                        to_id,
                    )
                    .await?;
            }
            self.conversations
                .set_persona(&conversation.id, settings.selected_persona_id.as_deref())
                .await?;
            conversation.persona_id = settings.selected_persona_id.clone();
        }

        Ok(conversation)
    }

    async fn random_active_persona(&self) -> Result<Option<Persona>> {
        let active = self.personas.list_active().await?;
        if active.is_empty() {
            return Ok(None);
        }
        let index = rand::rng().random_range(0..active.len());
        Ok(active.into_iter().nth(index))
    }
}
