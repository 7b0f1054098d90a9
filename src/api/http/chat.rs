// src/api/http/chat.rs

use axum::{Json, extract::State, response::IntoResponse};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

use crate::api::error::{ApiError, ApiResult};
use crate::chat::ChatError;
use crate::conversation::{PersonaChangeView, Role};
use crate::persona::Persona;
use crate::state::AppState;

/// Incoming turn. Only the last message is new; prior turns are replayed
/// from the stored conversation, not from the client.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub messages: Vec<IncomingMessage>,
    pub username: Option<String>,
    pub conversation_id: Option<String>,
}

#[derive(Deserialize)]
pub struct IncomingMessage {
    pub content: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub role: Role,
    pub content: String,
    pub conversation_id: String,
    pub persona: Option<Persona>,
    pub persona_changes: Vec<PersonaChangeView>,
}

pub async fn chat_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> impl IntoResponse {
    let result: ApiResult<_> = async {
        let user_message = request
            .messages
            .last()
            .map(|message| message.content.clone())
            .ok_or_else(|| ApiError::bad_request("At least one message is required"))?;

        let outcome = app_state
            .chat_service
            .handle_turn(request.conversation_id, request.username, user_message)
            .await
            .map_err(|err| match err {
                ChatError::ConversationNotFound => ApiError::not_found("Conversation not found"),
                ChatError::Internal(err) => {
                    error!("chat turn failed: {err:#}");
                    ApiError::internal("Failed to process chat")
                }
            })?;

        Ok(Json(ChatResponse {
            role: Role::Assistant,
            content: outcome.content,
            conversation_id: outcome.conversation_id,
            persona: outcome.persona,
            persona_changes: outcome.persona_changes,
        }))
    }
    .await;

    match result {
        Ok(response) => response.into_response(),
        Err(error) => error.into_response(),
    }
}
