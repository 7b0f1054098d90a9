// src/api/http/auth.rs
// Cookie-based admin gate. The login handler hands out the admin token;
// `require_admin` checks it in front of every other /api/admin route.

use axum::{
    Json,
    extract::Request,
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::api::error::ApiError;
use crate::config::CONFIG;

const ADMIN_COOKIE: &str = "admin_token";

#[derive(Deserialize)]
pub struct LoginRequest {
    pub password: Option<String>,
}

/// Middleware for the protected admin routes. Rejects before the handler
/// runs unless the admin cookie matches the configured password.
pub async fn require_admin(request: Request, next: Next) -> Response {
    if !is_admin(request.headers()) {
        return ApiError::unauthorized("Unauthorized").into_response();
    }
    next.run(request).await
}

pub async fn login_handler(Json(request): Json<LoginRequest>) -> impl IntoResponse {
    if CONFIG.admin_password.is_empty() {
        warn!("admin login attempted but ADMIN_PASSWORD is not set");
        return ApiError::unauthorized("Admin access is not configured").into_response();
    }

    if request.password.as_deref() != Some(CONFIG.admin_password.as_str()) {
        return ApiError::unauthorized("Invalid password").into_response();
    }

    let cookie = format!(
        "{ADMIN_COOKIE}={}; HttpOnly; SameSite=Lax; Path=/",
        CONFIG.admin_password
    );
    (
        [(header::SET_COOKIE, cookie)],
        Json(json!({ "success": true })),
    )
        .into_response()
}

pub async fn check_auth_handler(headers: HeaderMap) -> impl IntoResponse {
    if is_admin(&headers) {
        Json(json!({ "authenticated": true })).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "authenticated": false })),
        )
            .into_response()
    }
}

fn is_admin(headers: &HeaderMap) -> bool {
    // An unset password never grants access, it does not mean "no auth".
    if CONFIG.admin_password.is_empty() {
        return false;
    }
    cookie_value(headers, ADMIN_COOKIE).as_deref() == Some(CONFIG.admin_password.as_str())
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    raw.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_cookie(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn cookie_value_finds_named_cookie() {
        let headers = headers_with_cookie("session=abc; admin_token=s3cret; theme=dark");
        assert_eq!(
            cookie_value(&headers, "admin_token").as_deref(),
            Some("s3cret")
        );
    }

    #[test]
    fn cookie_value_handles_missing_cookie() {
        let headers = headers_with_cookie("session=abc");
        assert_eq!(cookie_value(&headers, "admin_token"), None);
        assert_eq!(cookie_value(&HeaderMap::new(), "admin_token"), None);
    }

    #[test]
    fn cookie_value_ignores_name_suffix_matches() {
        let headers = headers_with_cookie("not_admin_token=nope");
        assert_eq!(cookie_value(&headers, "admin_token"), None);
    }
}
