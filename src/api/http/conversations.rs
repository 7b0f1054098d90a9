// src/api/http/conversations.rs
// Conversation listing, export, and bulk deletion for the research admin.

use axum::{
    Json,
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::api::error::{ApiError, ApiResult, IntoApiError, IntoApiErrorOption};
use crate::conversation::{ConversationDetail, ConversationFilter};
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListConversationsQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationPage {
    pub conversations: Vec<ConversationDetail>,
    pub pagination: Pagination,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: i64,
    pub page_count: i64,
    pub page: i64,
    pub page_size: i64,
}

/// Export body. `format` defaults to json; the optional window narrows
/// which messages and persona changes are included.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub conversation_id: Option<String>,
    pub format: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearRequest {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

pub async fn list_conversations_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<ListConversationsQuery>,
) -> impl IntoResponse {
    let result: ApiResult<_> = async {
        let filter = ConversationFilter {
            start: parse_window_date(query.start_date.as_deref())?,
            end: parse_window_date(query.end_date.as_deref())?,
            search: query.search.filter(|s| !s.is_empty()),
        };
        let page = query.page.unwrap_or(1).max(1);
        let page_size = query.page_size.unwrap_or(10).max(1);

        let (conversations, total) = app_state
            .conversation_store
            .list(&filter, page, page_size)
            .await
            .into_api_error("Failed to fetch conversations")?;

        let mut details = Vec::with_capacity(conversations.len());
        for conversation in conversations {
            let detail = app_state
                .conversation_store
                .detail(conversation, None, None)
                .await
                .into_api_error("Failed to fetch conversations")?;
            details.push(detail);
        }

        Ok(Json(ConversationPage {
            conversations: details,
            pagination: Pagination {
                total,
                page_count: (total as u64).div_ceil(page_size as u64) as i64,
                page,
                page_size,
            },
        }))
    }
    .await;

    match result {
        Ok(response) => response.into_response(),
        Err(error) => error.into_response(),
    }
}

pub async fn export_conversation_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<ExportRequest>,
) -> impl IntoResponse {
    let result: ApiResult<Response> = async {
        let id = request
            .conversation_id
            .filter(|id| !id.is_empty())
            .ok_or_bad_request("Conversation ID is required")?;
        let start = parse_window_date(request.start_date.as_deref())?;
        let end = parse_window_date(request.end_date.as_deref())?;

        let conversation = app_state
            .conversation_store
            .get(&id)
            .await
            .into_api_error("Export failed")?
            .ok_or_not_found("Conversation not found")?;

        // The window applies to the conversation itself too.
        let created = conversation.created_at;
        if start.is_some_and(|s| created < s) || end.is_some_and(|e| created > e) {
            return Err(ApiError::not_found("Conversation not found"));
        }

        let detail = app_state
            .conversation_store
            .detail(conversation, start, end)
            .await
            .into_api_error("Export failed")?;

        let response = if request.format.as_deref() == Some("csv") {
            let disposition = format!("attachment; filename=conversation-{}.csv", detail.id);
            (
                [
                    (header::CONTENT_TYPE, "text/csv".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                conversation_csv(&detail),
            )
                .into_response()
        } else {
            let body = serde_json::to_string_pretty(&detail).into_api_error("Export failed")?;
            let disposition = format!("attachment; filename=conversation-{}.json", detail.id);
            (
                [
                    (header::CONTENT_TYPE, "application/json".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                body,
            )
                .into_response()
        };

        info!(conversation = %detail.id, format = request.format.as_deref().unwrap_or("json"), "exported conversation");
        Ok(response)
    }
    .await;

    match result {
        Ok(response) => response,
        Err(error) => error.into_response(),
    }
}

pub async fn clear_conversations_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<ClearRequest>,
) -> impl IntoResponse {
    let result: ApiResult<_> = async {
        let start = parse_window_date(request.start_date.as_deref())?;
        let end = parse_window_date(request.end_date.as_deref())?;

        let deleted = app_state
            .conversation_store
            .clear(start, end)
            .await
            .into_api_error("Failed to clear data")?;

        info!(deleted, "cleared conversations");
        Ok(Json(json!({ "success": true })))
    }
    .await;

    match result {
        Ok(response) => response.into_response(),
        Err(error) => error.into_response(),
    }
}

/// Accepts RFC 3339 timestamps or bare dates; empty and absent mean no bound.
fn parse_window_date(value: Option<&str>) -> ApiResult<Option<DateTime<Utc>>> {
    let Some(raw) = value else {
        return Ok(None);
    };
    if raw.is_empty() {
        return Ok(None);
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(Some(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))));
    }
    Err(ApiError::bad_request("Invalid date format"))
}

/// Every field is quoted; embedded quotes are doubled and newlines collapse
/// to spaces so one message stays one row.
fn conversation_csv(detail: &ConversationDetail) -> String {
    let header = ["timestamp", "role", "content", "persona"]
        .iter()
        .map(|h| format!("\"{h}\""))
        .collect::<Vec<_>>()
        .join(",");

    let rows = detail.messages.iter().map(|message| {
        let content = message.content.replace('"', "\"\"").replace('\n', " ");
        let persona = message
            .persona
            .as_ref()
            .map(|p| p.name.as_str())
            .unwrap_or("");
        [
            message.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            message.role.to_string(),
            content,
            persona.to_string(),
        ]
        .iter()
        .map(|cell| format!("\"{cell}\""))
        .collect::<Vec<_>>()
        .join(",")
    });

    std::iter::once(header)
        .chain(rows)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::{MessageView, Role};
    use crate::persona::PersonaRef;
    use chrono::TimeZone;

    fn detail_with_messages(messages: Vec<MessageView>) -> ConversationDetail {
        ConversationDetail {
            id: "c1".to_string(),
            username: "casey".to_string(),
            persona_id: None,
            created_at: Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap(),
            messages,
            persona_changes: Vec::new(),
        }
    }

    #[test]
    fn csv_quotes_every_field_and_flattens_content() {
        let detail = detail_with_messages(vec![MessageView {
            id: "m1".to_string(),
            role: Role::Assistant,
            content: "line one\nsaid \"hi\"".to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 3, 1, 9, 5, 0).unwrap(),
            persona: Some(PersonaRef {
                id: "p1".to_string(),
                name: "Ava".to_string(),
            }),
        }]);

        let csv = conversation_csv(&detail);
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("\"timestamp\",\"role\",\"content\",\"persona\"")
        );
        assert_eq!(
            lines.next(),
            Some("\"2025-03-01 09:05:00\",\"assistant\",\"line one said \"\"hi\"\"\",\"Ava\"")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn csv_leaves_persona_blank_for_untagged_messages() {
        let detail = detail_with_messages(vec![MessageView {
            id: "m1".to_string(),
            role: Role::User,
            content: "hello".to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 3, 1, 9, 5, 0).unwrap(),
            persona: None,
        }]);

        let csv = conversation_csv(&detail);
        assert!(csv.ends_with("\"hello\",\"\""));
    }

    #[test]
    fn window_dates_accept_rfc3339_and_bare_dates() {
        let full = parse_window_date(Some("2025-03-01T12:30:00Z")).unwrap();
        assert_eq!(full, Some(Utc.with_ymd_and_hms(2025, 3, 1, 12, 30, 0).unwrap()));

        let bare = parse_window_date(Some("2025-03-01")).unwrap();
        assert_eq!(bare, Some(Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap()));

        assert_eq!(parse_window_date(None).unwrap(), None);
        assert_eq!(parse_window_date(Some("")).unwrap(), None);
        assert!(parse_window_date(Some("yesterday")).is_err());
    }
}
