// src/api/http/settings.rs
// The settings singleton plus the keyed admin text rows.

use axum::{Json, extract::State, response::IntoResponse};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::api::error::{ApiError, ApiResult, IntoApiError};
use crate::persona::Persona;
use crate::prompt::{
    BASE_INSTRUCTIONS_DESCRIPTION, BASE_INSTRUCTIONS_KEY, DEFAULT_BASE_INSTRUCTIONS,
    DEFAULT_EXIT_MODAL_TEXT, EXIT_MODAL_DESCRIPTION, EXIT_MODAL_KEY,
};
use crate::settings::{Settings, SettingsUpdate};
use crate::state::AppState;

/// POST body. Generation fields are all required; the persona selection
/// clears when absent and the exit text only writes when present.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    pub temperature: Option<f64>,
    pub max_tokens: Option<i64>,
    pub rotation_interval: Option<i64>,
    pub model_name: Option<String>,
    pub selected_persona_id: Option<String>,
    pub exit_chat_modal_text: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsResponse {
    #[serde(flatten)]
    pub settings: Settings,
    pub selected_persona: Option<Persona>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_chat_modal_text: Option<String>,
}

pub async fn get_settings_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    let result: ApiResult<_> = async {
        let settings = app_state
            .settings_store
            .get_or_create()
            .await
            .into_api_error("Failed to fetch settings")?;

        let selected_persona = match settings.selected_persona_id.as_deref() {
            Some(id) => app_state
                .persona_store
                .get(id)
                .await
                .into_api_error("Failed to fetch settings")?,
            None => None,
        };

        let exit_chat_modal_text = app_state
            .admin_settings_store
            .value_or(EXIT_MODAL_KEY, DEFAULT_EXIT_MODAL_TEXT)
            .await
            .into_api_error("Failed to fetch settings")?;

        Ok(Json(SettingsResponse {
            settings,
            selected_persona,
            exit_chat_modal_text: Some(exit_chat_modal_text),
        }))
    }
    .await;

    match result {
        Ok(response) => response.into_response(),
        Err(error) => error.into_response(),
    }
}

pub async fn update_settings_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<UpdateSettingsRequest>,
) -> impl IntoResponse {
    let result: ApiResult<_> = async {
        let temperature = request
            .temperature
            .filter(|t| (0.0..=2.0).contains(t))
            .ok_or_else(|| ApiError::bad_request("Temperature must be between 0 and 2"))?;
        let max_tokens = request
            .max_tokens
            .filter(|t| *t >= 1)
            .ok_or_else(|| ApiError::bad_request("Max tokens must be a positive number"))?;
        let rotation_interval = request
            .rotation_interval
            .filter(|i| *i >= 1)
            .ok_or_else(|| ApiError::bad_request("Rotation interval must be a positive number"))?;
        let model_name = request
            .model_name
            .filter(|m| !m.is_empty())
            .ok_or_else(|| ApiError::bad_request("Model name must be provided"))?;

        let settings = app_state
            .settings_store
            .upsert(SettingsUpdate {
                temperature,
                max_tokens,
                rotation_interval,
                model_name,
                selected_persona_id: request.selected_persona_id.filter(|id| !id.is_empty()),
            })
            .await
            .into_api_error("Failed to update settings")?;

        if let Some(text) = request.exit_chat_modal_text.as_deref() {
            app_state
                .admin_settings_store
                .upsert(EXIT_MODAL_KEY, text, EXIT_MODAL_DESCRIPTION)
                .await
                .into_api_error("Failed to update settings")?;
        }
        let exit_chat_modal_text = app_state
            .admin_settings_store
            .get(EXIT_MODAL_KEY)
            .await
            .into_api_error("Failed to update settings")?
            .map(|setting| setting.value);

        let selected_persona = match settings.selected_persona_id.as_deref() {
            Some(id) => app_state
                .persona_store
                .get(id)
                .await
                .into_api_error("Failed to update settings")?,
            None => None,
        };

        // Every settings save restarts the rotation clock.
        info!(minutes = rotation_interval, "updating rotation interval");
        app_state
            .scheduler
            .update_interval(rotation_interval)
            .await
            .into_api_error("Failed to update settings")?;

        Ok(Json(SettingsResponse {
            settings,
            selected_persona,
            exit_chat_modal_text,
        }))
    }
    .await;

    match result {
        Ok(response) => response.into_response(),
        Err(error) => error.into_response(),
    }
}

// ---- Base instructions (admin) ----

#[derive(Deserialize)]
pub struct UpdateBaseInstructionsRequest {
    pub value: Option<String>,
}

pub async fn get_base_instructions_handler(
    State(app_state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let result: ApiResult<_> = async {
        let setting = app_state
            .admin_settings_store
            .get_or_seed(
                BASE_INSTRUCTIONS_KEY,
                DEFAULT_BASE_INSTRUCTIONS,
                BASE_INSTRUCTIONS_DESCRIPTION,
            )
            .await
            .into_api_error("Failed to fetch base instructions")?;

        Ok(Json(setting))
    }
    .await;

    match result {
        Ok(response) => response.into_response(),
        Err(error) => error.into_response(),
    }
}

pub async fn update_base_instructions_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<UpdateBaseInstructionsRequest>,
) -> impl IntoResponse {
    let result: ApiResult<_> = async {
        let value = request.value.unwrap_or_default();
        if value.is_empty() {
            return Err(ApiError::bad_request("Base instructions value is required"));
        }

        let setting = app_state
            .admin_settings_store
            .upsert(BASE_INSTRUCTIONS_KEY, &value, BASE_INSTRUCTIONS_DESCRIPTION)
            .await
            .into_api_error("Failed to update base instructions")?;

        info!("updated base instructions");
        Ok(Json(setting))
    }
    .await;

    match result {
        Ok(response) => response.into_response(),
        Err(error) => error.into_response(),
    }
}
