// src/api/http/personas.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::info;

use crate::api::error::{ApiError, ApiResult, IntoApiError, IntoApiErrorOption};
use crate::persona::{CreatePersonaRequest, UpdatePersonaRequest};
use crate::state::AppState;

pub async fn list_personas_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    let result: ApiResult<_> = async {
        let personas = app_state
            .persona_store
            .list()
            .await
            .into_api_error("Failed to fetch personas")?;

        Ok(Json(personas))
    }
    .await;

    match result {
        Ok(response) => response.into_response(),
        Err(error) => error.into_response(),
    }
}

pub async fn create_persona_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<CreatePersonaRequest>,
) -> impl IntoResponse {
    let result: ApiResult<_> = async {
        let name = request.name.unwrap_or_default();
        let system_prompt = request.system_prompt.unwrap_or_default();
        if name.is_empty() || system_prompt.is_empty() {
            return Err(ApiError::bad_request("Name and system prompt are required"));
        }

        let existing = app_state
            .persona_store
            .get_by_name(&name)
            .await
            .into_api_error("Failed to create persona")?;
        if existing.is_some() {
            return Err(ApiError::bad_request(
                "A persona with this name already exists",
            ));
        }

        let persona = app_state
            .persona_store
            .create(name, system_prompt)
            .await
            .into_api_error("Failed to create persona")?;

        info!(persona = %persona.name, "created persona");
        Ok(Json(persona))
    }
    .await;

    match result {
        Ok(response) => response.into_response(),
        Err(error) => error.into_response(),
    }
}

/// PATCH /api/personas/{id}. An `isActive` toggle is applied on its own;
/// otherwise name and prompt may be edited together.
pub async fn update_persona_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<UpdatePersonaRequest>,
) -> impl IntoResponse {
    let result: ApiResult<_> = async {
        let persona = app_state
            .persona_store
            .get(&id)
            .await
            .into_api_error("Failed to update persona")?
            .ok_or_not_found("Persona not found")?;

        if let Some(is_active) = request.is_active {
            // Deactivating the last active persona would leave rotation
            // with nothing to select.
            if !is_active && persona.is_active {
                let remaining = app_state
                    .persona_store
                    .count_active_excluding(&id)
                    .await
                    .into_api_error("Failed to update persona")?;
                if remaining == 0 {
                    return Err(ApiError::bad_request(
                        "At least one persona must remain active",
                    ));
                }
            }

            let updated = app_state
                .persona_store
                .set_active(&id, is_active)
                .await
                .into_api_error("Failed to update persona")?
                .ok_or_not_found("Persona not found")?;

            info!(persona = %updated.name, is_active, "toggled persona");
            return Ok(Json(updated));
        }

        if request.name.is_none() && request.system_prompt.is_none() {
            return Err(ApiError::bad_request("No valid update fields provided"));
        }

        let updated = app_state
            .persona_store
            .update_fields(&id, request.name, request.system_prompt)
            .await
            .into_api_error("Failed to update persona")?
            .ok_or_not_found("Persona not found")?;

        info!(persona = %updated.name, "updated persona");
        Ok(Json(updated))
    }
    .await;

    match result {
        Ok(response) => response.into_response(),
        Err(error) => error.into_response(),
    }
}
