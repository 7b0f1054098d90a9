// src/api/http/stats.rs
// Aggregates for the admin stats page and the public dashboard.

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use chrono::{NaiveTime, TimeDelta, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::api::error::{ApiResult, IntoApiError};
use crate::conversation::{BucketCount, PersonaUsage};
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsQuery {
    /// "7days" (default), "14days", or "30days".
    pub time_range: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_conversations: i64,
    pub total_users: i64,
    pub total_messages: i64,
    pub active_personas: i64,
    pub messages_by_date: Vec<BucketCount>,
    pub persona_usage: Vec<PersonaUsage>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_conversations: i64,
    pub total_messages: i64,
    pub active_personas: i64,
    pub total_personas: i64,
    pub messages_last_24_hours: i64,
    pub avg_messages_per_conversation: f64,
    pub conversations_by_hour: Vec<BucketCount>,
}

pub async fn admin_stats_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<StatsQuery>,
) -> impl IntoResponse {
    let result: ApiResult<_> = async {
        let days = match query.time_range.as_deref() {
            Some("14days") => 14,
            Some("30days") => 30,
            _ => 7,
        };

        // Whole days, UTC: N days back at midnight through the end of today.
        let today = Utc::now().date_naive();
        let first_day = today - TimeDelta::days(days);
        let start = Utc.from_utc_datetime(&first_day.and_time(NaiveTime::MIN));
        let end = Utc.from_utc_datetime(&today.and_time(NaiveTime::MIN)) + TimeDelta::days(1)
            - TimeDelta::milliseconds(1);

        let store = &app_state.conversation_store;
        let total_conversations = store
            .count_conversations(Some(start), Some(end))
            .await
            .into_api_error("Failed to fetch admin stats")?;
        let total_users = store
            .count_distinct_users(Some(start), Some(end))
            .await
            .into_api_error("Failed to fetch admin stats")?;
        let total_messages = store
            .count_messages(Some(start), Some(end))
            .await
            .into_api_error("Failed to fetch admin stats")?;
        let active_personas = app_state
            .persona_store
            .count_active()
            .await
            .into_api_error("Failed to fetch admin stats")?;

        // Zero-fill the range so the chart gets a point for every day.
        let mut by_date: BTreeMap<String, i64> = BTreeMap::new();
        let mut day = first_day;
        while day <= today {
            by_date.insert(day.format("%Y-%m-%d").to_string(), 0);
            day += TimeDelta::days(1);
        }
        for bucket in store
            .messages_by_day(start, end)
            .await
            .into_api_error("Failed to fetch admin stats")?
        {
            *by_date.entry(bucket.date).or_insert(0) += bucket.count;
        }
        let messages_by_date = by_date
            .into_iter()
            .map(|(date, count)| BucketCount { date, count })
            .collect();

        let persona_usage = store
            .persona_usage(start, end)
            .await
            .into_api_error("Failed to fetch admin stats")?;

        Ok(Json(AdminStats {
            total_conversations,
            total_users,
            total_messages,
            active_personas,
            messages_by_date,
            persona_usage,
        }))
    }
    .await;

    match result {
        Ok(response) => response.into_response(),
        Err(error) => error.into_response(),
    }
}

pub async fn dashboard_handler(State(app_state): State<Arc<AppState>>) -> impl IntoResponse {
    let result: ApiResult<_> = async {
        let store = &app_state.conversation_store;
        let total_conversations = store
            .count_conversations(None, None)
            .await
            .into_api_error("Failed to fetch dashboard stats")?;
        let total_messages = store
            .count_messages(None, None)
            .await
            .into_api_error("Failed to fetch dashboard stats")?;
        let active_personas = app_state
            .persona_store
            .count_active()
            .await
            .into_api_error("Failed to fetch dashboard stats")?;
        let total_personas = app_state
            .persona_store
            .count()
            .await
            .into_api_error("Failed to fetch dashboard stats")?;

        let since = Utc::now() - TimeDelta::hours(24);
        let messages_last_24_hours = store
            .count_messages(Some(since), None)
            .await
            .into_api_error("Failed to fetch dashboard stats")?;

        // One decimal place, matching the admin UI.
        let avg_messages_per_conversation = if total_conversations > 0 {
            (total_messages as f64 / total_conversations as f64 * 10.0).round() / 10.0
        } else {
            0.0
        };

        let conversations_by_hour = store
            .conversations_by_hour(since)
            .await
            .into_api_error("Failed to fetch dashboard stats")?;

        Ok(Json(DashboardStats {
            total_conversations,
            total_messages,
            active_personas,
            total_personas,
            messages_last_24_hours,
            avg_messages_per_conversation,
            conversations_by_hour,
        }))
    }
    .await;

    match result {
        Ok(response) => response.into_response(),
        Err(error) => error.into_response(),
    }
}
