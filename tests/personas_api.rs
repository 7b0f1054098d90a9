// tests/personas_api.rs

mod test_helpers;

use axum::http::StatusCode;
use serde_json::json;

use test_helpers::{create_test_app, json_body, request};

#[tokio::test]
async fn health_reports_ok() {
    let (app, _state) = create_test_app().await;

    let response = request(&app, "GET", "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn create_and_list_personas() {
    let (app, _state) = create_test_app().await;

    let response = request(
        &app,
        "POST",
        "/api/personas",
        Some(json!({ "name": "Ava", "systemPrompt": "You are Ava." })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let persona = json_body(response).await;
    assert_eq!(persona["name"], "Ava");
    assert_eq!(persona["systemPrompt"], "You are Ava.");
    assert_eq!(persona["isActive"], true);
    assert!(persona["id"].as_str().is_some_and(|id| !id.is_empty()));

    let response = request(
        &app,
        "POST",
        "/api/personas",
        Some(json!({ "name": "Brook", "systemPrompt": "You are Brook." })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = request(&app, "GET", "/api/personas", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let listed = json_body(response).await;
    let names: Vec<&str> = listed
        .as_array()
        .expect("persona array")
        .iter()
        .map(|p| p["name"].as_str().expect("name"))
        .collect();
    // Newest first.
    assert_eq!(names, vec!["Brook", "Ava"]);
}

#[tokio::test]
async fn create_requires_name_and_prompt() {
    let (app, _state) = create_test_app().await;

    for body in [
        json!({ "name": "Ava" }),
        json!({ "systemPrompt": "You are Ava." }),
        json!({ "name": "", "systemPrompt": "You are Ava." }),
    ] {
        let response = request(&app, "POST", "/api/personas", Some(body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let error = json_body(response).await;
        assert_eq!(error["message"], "Name and system prompt are required");
        assert_eq!(error["error"], true);
    }
}

#[tokio::test]
async fn create_rejects_duplicate_names() {
    let (app, _state) = create_test_app().await;

    let body = json!({ "name": "Ava", "systemPrompt": "You are Ava." });
    let response = request(&app, "POST", "/api/personas", Some(body.clone())).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = request(&app, "POST", "/api/personas", Some(body)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let error = json_body(response).await;
    assert_eq!(error["message"], "A persona with this name already exists");
}

#[tokio::test]
async fn patch_edits_name_and_prompt() {
    let (app, state) = create_test_app().await;

    let persona = state
        .persona_store
        .create("Ava".to_string(), "You are Ava.".to_string())
        .await
        .expect("create persona");

    let response = request(
        &app,
        "PATCH",
        &format!("/api/personas/{}", persona.id),
        Some(json!({ "name": "Ada" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let updated = json_body(response).await;
    assert_eq!(updated["name"], "Ada");
    assert_eq!(updated["systemPrompt"], "You are Ava.");
}

#[tokio::test]
async fn patch_requires_some_field() {
    let (app, state) = create_test_app().await;

    let persona = state
        .persona_store
        .create("Ava".to_string(), "You are Ava.".to_string())
        .await
        .expect("create persona");

    let response = request(
        &app,
        "PATCH",
        &format!("/api/personas/{}", persona.id),
        Some(json!({})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let error = json_body(response).await;
    assert_eq!(error["message"], "No valid update fields provided");
}

#[tokio::test]
async fn patch_unknown_persona_is_not_found() {
    let (app, _state) = create_test_app().await;

    let response = request(
        &app,
        "PATCH",
        "/api/personas/missing",
        Some(json!({ "name": "Ada" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let error = json_body(response).await;
    assert_eq!(error["message"], "Persona not found");
}

#[tokio::test]
async fn deactivating_the_last_active_persona_is_rejected() {
    let (app, state) = create_test_app().await;

    let only = state
        .persona_store
        .create("Ava".to_string(), "You are Ava.".to_string())
        .await
        .expect("create persona");

    let response = request(
        &app,
        "PATCH",
        &format!("/api/personas/{}", only.id),
        Some(json!({ "isActive": false })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let error = json_body(response).await;
    assert_eq!(error["message"], "At least one persona must remain active");
}

#[tokio::test]
async fn deactivation_works_while_another_persona_stays_active() {
    let (app, state) = create_test_app().await;

    let ava = state
        .persona_store
        .create("Ava".to_string(), "You are Ava.".to_string())
        .await
        .expect("create persona");
    state
        .persona_store
        .create("Brook".to_string(), "You are Brook.".to_string())
        .await
        .expect("create persona");

    let response = request(
        &app,
        "PATCH",
        &format!("/api/personas/{}", ava.id),
        Some(json!({ "isActive": false })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let updated = json_body(response).await;
    assert_eq!(updated["isActive"], false);
}

#[tokio::test]
async fn activity_toggle_ignores_field_edits_in_the_same_request() {
    let (app, state) = create_test_app().await;

    let ava = state
        .persona_store
        .create("Ava".to_string(), "You are Ava.".to_string())
        .await
        .expect("create persona");
    state
        .persona_store
        .create("Brook".to_string(), "You are Brook.".to_string())
        .await
        .expect("create persona");

    let response = request(
        &app,
        "PATCH",
        &format!("/api/personas/{}", ava.id),
        Some(json!({ "isActive": false, "name": "Renamed" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let updated = json_body(response).await;
    assert_eq!(updated["isActive"], false);
    assert_eq!(updated["name"], "Ava");
}
