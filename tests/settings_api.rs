// tests/settings_api.rs

mod test_helpers;

use axum::http::StatusCode;
use serde_json::json;

use test_helpers::{create_test_app, json_body, request};

#[tokio::test]
async fn get_creates_the_default_row() {
    let (app, _state) = create_test_app().await;

    let response = request(&app, "GET", "/api/settings", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let settings = json_body(response).await;
    assert_eq!(settings["temperature"], 0.7);
    assert_eq!(settings["maxTokens"], 1000);
    assert_eq!(settings["rotationInterval"], 360);
    assert_eq!(settings["modelName"], "gpt-4o");
    assert!(settings["selectedPersonaId"].is_null());
    assert!(settings["selectedPersona"].is_null());
    assert!(settings["lastRotation"].is_null());
    assert_eq!(
        settings["exitChatModalText"],
        "Thank you for participating in this research study. Your conversation will be recorded for research purposes."
    );
}

#[tokio::test]
async fn update_persists_and_embeds_the_selected_persona() {
    let (app, state) = create_test_app().await;

    let persona = state
        .persona_store
        .create("Ava".to_string(), "You are Ava.".to_string())
        .await
        .expect("create persona");

    let response = request(
        &app,
        "POST",
        "/api/settings",
        Some(json!({
            "temperature": 1.2,
            "maxTokens": 512,
            "rotationInterval": 45,
            "modelName": "gpt-4o-mini",
            "selectedPersonaId": persona.id,
            "exitChatModalText": "Thanks, that's all for today.",
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["temperature"], 1.2);
    assert_eq!(body["maxTokens"], 512);
    assert_eq!(body["rotationInterval"], 45);
    assert_eq!(body["modelName"], "gpt-4o-mini");
    assert_eq!(body["selectedPersona"]["id"], json!(persona.id));
    assert_eq!(body["selectedPersona"]["name"], "Ava");
    assert_eq!(body["exitChatModalText"], "Thanks, that's all for today.");

    // Every save restarts the rotation clock, after the response snapshot
    // was taken.
    assert!(body["lastRotation"].is_null());
    let stored = state
        .settings_store
        .get()
        .await
        .expect("read settings")
        .expect("settings row");
    assert_eq!(stored.rotation_interval, 45);
    assert!(stored.last_rotation.is_some());
}

#[tokio::test]
async fn update_without_a_persona_clears_the_selection() {
    let (app, state) = create_test_app().await;

    let persona = state
        .persona_store
        .create("Ava".to_string(), "You are Ava.".to_string())
        .await
        .expect("create persona");
    state
        .settings_store
        .get_or_create()
        .await
        .expect("seed settings");
    state
        .settings_store
        .set_selected_persona(&persona.id)
        .await
        .expect("select persona");

    let response = request(
        &app,
        "POST",
        "/api/settings",
        Some(json!({
            "temperature": 0.7,
            "maxTokens": 1000,
            "rotationInterval": 360,
            "modelName": "gpt-4o",
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert!(body["selectedPersonaId"].is_null());
    assert!(body["selectedPersona"].is_null());
    // No exit text has ever been written, so the field stays off the wire.
    assert!(body.get("exitChatModalText").is_none());

    let stored = state
        .settings_store
        .get()
        .await
        .expect("read settings")
        .expect("settings row");
    assert!(stored.selected_persona_id.is_none());
}

#[tokio::test]
async fn update_validates_every_generation_field() {
    let (app, _state) = create_test_app().await;

    let valid = json!({
        "temperature": 0.7,
        "maxTokens": 1000,
        "rotationInterval": 360,
        "modelName": "gpt-4o",
    });

    let cases = [
        ("temperature", json!(2.5), "Temperature must be between 0 and 2"),
        ("temperature", json!(null), "Temperature must be between 0 and 2"),
        ("maxTokens", json!(0), "Max tokens must be a positive number"),
        ("rotationInterval", json!(-5), "Rotation interval must be a positive number"),
        ("modelName", json!(""), "Model name must be provided"),
    ];
    for (field, value, message) in cases {
        let mut body = valid.clone();
        body[field] = value;

        let response = request(&app, "POST", "/api/settings", Some(body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{field}");

        let error = json_body(response).await;
        assert_eq!(error["message"], message);
    }
}
