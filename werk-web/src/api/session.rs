//! Session cookies, flash messages and the login-required middleware

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use tracing::warn;
use werk_common::db::User;

use crate::db::sessions;
use crate::AppState;

pub const SESSION_COOKIE: &str = "werk_session";
pub const FLASH_COOKIE: &str = "werk_flash";

/// Logged-in user, placed in request extensions by [`require_login`]
#[derive(Debug, Clone)]
pub struct SessionUser(pub User);

/// Value of a request cookie
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

/// `Set-Cookie` value for a session token
///
/// Without `max_age_secs` the cookie lasts until the browser closes.
pub fn session_cookie(token: &str, max_age_secs: Option<i64>) -> String {
    let mut cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, token);
    if let Some(secs) = max_age_secs {
        cookie.push_str(&format!("; Max-Age={}", secs));
    }
    cookie
}

/// `Set-Cookie` value that deletes a cookie
pub fn expired_cookie(name: &str) -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", name)
}

/// `Set-Cookie` value carrying a one-shot message
pub fn flash_cookie(message: &str) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        FLASH_COOKIE,
        URL_SAFE_NO_PAD.encode(message.as_bytes())
    )
}

/// Pending flash message, if the request carries a readable one
pub fn read_flash(headers: &HeaderMap) -> Option<String> {
    let raw = read_cookie(headers, FLASH_COOKIE)?;
    let bytes = URL_SAFE_NO_PAD.decode(raw.as_bytes()).ok()?;
    String::from_utf8(bytes).ok().filter(|m| !m.is_empty())
}

/// 303 redirect that leaves a flash message for the next page
pub fn redirect_with_flash(location: &str, message: &str) -> Response {
    (
        AppendHeaders([(header::SET_COOKIE, flash_cookie(message))]),
        Redirect::to(location),
    )
        .into_response()
}

/// User for the request's session cookie
///
/// Store errors are logged and treated as anonymous.
pub async fn current_user(state: &AppState, headers: &HeaderMap) -> Option<User> {
    let token = read_cookie(headers, SESSION_COOKIE)?;
    match sessions::load_session_user(&state.db, &token).await {
        Ok(user) => user,
        Err(e) => {
            warn!("Session lookup failed: {}", e);
            None
        }
    }
}

/// Middleware for routes that need a logged-in user
///
/// Anonymous requests are sent to `/login?next=<path>`.
pub async fn require_login(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match current_user(&state, request.headers()).await {
        Some(user) => {
            request.extensions_mut().insert(SessionUser(user));
            next.run(request).await
        }
        None => {
            let path = request
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_else(|| "/".to_string());
            redirect_with_flash(
                &format!("/login?next={}", urlencoding::encode(&path)),
                "Please log in to access this page.",
            )
        }
    }
}
