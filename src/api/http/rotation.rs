// src/api/http/rotation.rs
// Admin rotation controls: manual trigger, timer init, status, interval.

use axum::{Json, extract::State, response::IntoResponse};
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::api::error::{ApiError, ApiResult, IntoApiError};
use crate::config::CONFIG;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UpdateIntervalRequest {
    pub minutes: Option<i64>,
}

/// POST /api/admin/cron/rotate. Swaps the persona right now, skipping the
/// probability gate.
pub async fn trigger_rotation_handler(
    State(app_state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let result: ApiResult<_> = async {
        app_state
            .scheduler
            .force_rotation()
            .await
            .into_api_error("Failed to force persona rotation")?;

        Ok(Json(json!({
            "status": "success",
            "message": "Persona rotation triggered successfully"
        })))
    }
    .await;

    match result {
        Ok(response) => response.into_response(),
        Err(error) => error.into_response(),
    }
}

/// POST /api/admin/cron/init. Starts the background timer; calling again is
/// a no-op.
pub async fn init_rotation_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    let result: ApiResult<_> = async {
        let settings = app_state
            .settings_store
            .get_or_create()
            .await
            .into_api_error("Failed to initialize persona rotation")?;

        if !app_state.scheduler.ensure_timer(CONFIG.rotation_tick()) {
            return Ok(Json(json!({
                "status": "success",
                "message": "Rotation already initialized"
            })));
        }

        info!(minutes = settings.rotation_interval, "initializing rotation");
        Ok(Json(json!({
            "status": "success",
            "message": "Persona rotation initialized successfully",
            "interval": settings.rotation_interval
        })))
    }
    .await;

    match result {
        Ok(response) => response.into_response(),
        Err(error) => error.into_response(),
    }
}

pub async fn rotation_status_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    let result: ApiResult<_> = async {
        let status = app_state
            .scheduler
            .status()
            .await
            .into_api_error("Failed to get rotation status")?;

        let last_rotation = status
            .last_rotation
            .map(|at| at.to_rfc3339_opts(SecondsFormat::Millis, true))
            .unwrap_or_else(|| "Never".to_string());
        let next_rotation_in = status
            .next_rotation_in
            .map(|minutes| format!("{minutes} minutes"))
            .unwrap_or_else(|| "Unknown - no rotation has occurred yet".to_string());

        Ok(Json(json!({
            "status": "active",
            "currentInterval": status.current_interval,
            "lastRotation": last_rotation,
            "nextRotationIn": next_rotation_in,
            "currentTime": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            "message": "Rotation system is active"
        })))
    }
    .await;

    match result {
        Ok(response) => response.into_response(),
        Err(error) => error.into_response(),
    }
}

// ---- Interval (admin settings page) ----

pub async fn get_rotation_interval_handler(
    State(app_state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let result: ApiResult<_> = async {
        let settings = app_state
            .settings_store
            .get_or_create()
            .await
            .into_api_error("Failed to fetch rotation interval")?;

        Ok(Json(json!({ "rotationInterval": settings.rotation_interval })))
    }
    .await;

    match result {
        Ok(response) => response.into_response(),
        Err(error) => error.into_response(),
    }
}

pub async fn update_rotation_interval_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<UpdateIntervalRequest>,
) -> impl IntoResponse {
    let result: ApiResult<_> = async {
        let minutes = request.minutes.filter(|m| *m >= 1).ok_or_else(|| {
            ApiError::bad_request("Invalid rotation interval. Must be a positive number.")
        })?;

        // Make sure the row exists, then write the interval and restart
        // the rotation clock.
        app_state
            .settings_store
            .get_or_create()
            .await
            .into_api_error("Failed to update rotation interval")?;
        app_state
            .scheduler
            .update_interval(minutes)
            .await
            .into_api_error("Failed to update rotation interval")?;

        info!(minutes, "updated rotation interval");
        Ok(Json(json!({
            "message": "Rotation interval updated successfully",
            "rotationInterval": minutes
        })))
    }
    .await;

    match result {
        Ok(response) => response.into_response(),
        Err(error) => error.into_response(),
    }
}
