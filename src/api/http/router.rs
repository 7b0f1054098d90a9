// src/api/http/router.rs
// Route table: public chat and dashboard, cookie-gated admin surface

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, patch, post},
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{
    auth::{check_auth_handler, login_handler, require_admin},
    chat::chat_handler,
    conversations::{
        clear_conversations_handler, export_conversation_handler, list_conversations_handler,
    },
    handlers::health_handler,
    personas::{create_persona_handler, list_personas_handler, update_persona_handler},
    rotation::{
        get_rotation_interval_handler, init_rotation_handler, rotation_status_handler,
        trigger_rotation_handler, update_rotation_interval_handler,
    },
    settings::{
        get_base_instructions_handler, get_settings_handler, update_base_instructions_handler,
        update_settings_handler,
    },
    stats::{admin_stats_handler, dashboard_handler},
};
use crate::config::CONFIG;
use crate::state::AppState;

/// Build the full application router.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(
            CONFIG
                .cors_origin
                .parse::<HeaderValue>()
                .unwrap_or_else(|_| HeaderValue::from_static("http://localhost:3000")),
        )
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    // Everything registered before the route_layer sits behind the admin
    // cookie; login and the auth probe are added after it and stay open.
    let admin_routes = Router::new()
        .route("/stats", get(admin_stats_handler))
        .route(
            "/base-instructions",
            get(get_base_instructions_handler).post(update_base_instructions_handler),
        )
        .route(
            "/settings/rotation-interval",
            get(get_rotation_interval_handler).post(update_rotation_interval_handler),
        )
        .route("/cron/rotate", post(trigger_rotation_handler))
        .route("/cron/init", post(init_rotation_handler))
        .route("/cron/status", get(rotation_status_handler))
        .route_layer(middleware::from_fn(require_admin))
        .route("/login", post(login_handler))
        .route("/check-auth", get(check_auth_handler));

    Router::new()
        // Health
        .route("/health", get(health_handler))
        // Participant chat
        .route("/api/chat", post(chat_handler))
        // Personas
        .route(
            "/api/personas",
            get(list_personas_handler).post(create_persona_handler),
        )
        .route("/api/personas/{id}", patch(update_persona_handler))
        // Settings
        .route(
            "/api/settings",
            get(get_settings_handler).post(update_settings_handler),
        )
        // Conversation logs (GET lists, POST exports)
        .route(
            "/api/conversations",
            get(list_conversations_handler).post(export_conversation_handler),
        )
        .route(
            "/api/conversations/clear",
            post(clear_conversations_handler),
        )
        // Public dashboard
        .route("/api/dashboard", get(dashboard_handler))
        // Admin
        .nest("/api/admin", admin_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}
