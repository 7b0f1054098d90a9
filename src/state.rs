// src/state.rs

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::chat::ChatService;
use crate::conversation::ConversationStore;
use crate::llm::CompletionClient;
use crate::persona::PersonaStore;
use crate::rotation::{RotationCurve, RotationScheduler};
use crate::settings::{AdminSettingsStore, SettingsStore};

#[derive(Clone)]
pub struct AppState {
    // stores
    pub persona_store: PersonaStore,
    pub settings_store: SettingsStore,
    pub conversation_store: ConversationStore,
    pub admin_settings_store: AdminSettingsStore,

    // services built on top of them
    pub scheduler: Arc<RotationScheduler>,
    pub chat_service: Arc<ChatService>,
}

/// Wire stores and services over one pool. The completion client comes in
/// from outside so tests can substitute a scripted one.
pub fn create_app_state(
    pool: SqlitePool,
    client: Arc<dyn CompletionClient>,
    curve: RotationCurve,
) -> AppState {
    let persona_store = PersonaStore::new(pool.clone());
    let settings_store = SettingsStore::new(pool.clone());
    let conversation_store = ConversationStore::new(pool.clone());
    let admin_settings_store = AdminSettingsStore::new(pool);

    let scheduler = Arc::new(RotationScheduler::new(
        settings_store.clone(),
        persona_store.clone(),
        curve,
    ));

    let chat_service = Arc::new(ChatService::new(
        settings_store.clone(),
        persona_store.clone(),
        conversation_store.clone(),
        admin_settings_store.clone(),
        scheduler.clone(),
        client,
    ));

    AppState {
        persona_store,
        settings_store,
        conversation_store,
        admin_settings_store,
        scheduler,
        chat_service,
    }
}
