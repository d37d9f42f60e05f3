//! Registration, login and logout

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
    Extension, Form,
};
use serde::Deserialize;
use tracing::info;

use super::session::{
    expired_cookie, flash_cookie, read_cookie, redirect_with_flash, session_cookie, SessionUser,
    SESSION_COOKIE,
};
use super::ui::{escape_html, form_errors, PageContext};
use crate::db::{sessions, users};
use crate::error::ApiResult;
use crate::validation::{safe_next_path, validate_passwords, validate_username};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password2: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Checkbox; present only when ticked
    pub remember_me: Option<String>,
}

fn register_form(username: &str, errors: &[String]) -> String {
    format!(
        r#"<h1>Register</h1>
{errors}
<form method="post" action="/register">
    <p><label for="username">Username:</label>
    <input id="username" name="username" value="{username}" maxlength="64" required></p>
    <p><label for="password">Password:</label>
    <input id="password" name="password" type="password" required></p>
    <p><label for="password2">Confirm password:</label>
    <input id="password2" name="password2" type="password" required></p>
    <button type="submit">Register</button>
</form>"#,
        errors = form_errors(errors),
        username = escape_html(username),
    )
}

fn login_form(username: &str, next: Option<&str>, errors: &[String]) -> String {
    let action = match next {
        Some(next) => format!("/login?next={}", urlencoding::encode(next)),
        None => "/login".to_string(),
    };
    format!(
        r#"<h1>Log in</h1>
{errors}
<form method="post" action="{action}">
    <p><label for="username">Username:</label>
    <input id="username" name="username" value="{username}" required></p>
    <p><label for="password">Password:</label>
    <input id="password" name="password" type="password" required></p>
    <p><label><input type="checkbox" name="remember_me" value="on"> Keep me logged in</label></p>
    <button type="submit">Log in</button>
</form>
<p>New here? <a href="/register">Create an account</a>.</p>"#,
        errors = form_errors(errors),
        action = escape_html(&action),
        username = escape_html(username),
    )
}

/// GET /register
pub async fn register_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    PageContext::load(&state, &headers)
        .await
        .render("Register", &register_form("", &[]))
}

/// POST /register
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<RegisterForm>,
) -> ApiResult<Response> {
    let username = form.username.trim();
    let mut errors = Vec::new();

    if let Err(message) = validate_username(username) {
        errors.push(message);
    } else if users::load_user_by_username(&state.db, username).await?.is_some() {
        errors.push("Username already taken".to_string());
    }
    if let Err(message) = validate_passwords(&form.password, &form.password2) {
        errors.push(message);
    }

    if errors.is_empty() {
        match users::create_user(&state.db, username, &form.password).await {
            Ok(_) => return Ok(redirect_with_flash("/login", "You can now log in!")),
            // Lost a race with another registration of the same name
            Err(werk_common::Error::InvalidInput(message)) => errors.push(message),
            Err(e) => return Err(e.into()),
        }
    }

    Ok(PageContext::load(&state, &headers).await.render_with_status(
        StatusCode::UNPROCESSABLE_ENTITY,
        "Register",
        &register_form(username, &errors),
    ))
}

/// GET /login
pub async fn login_page(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
    headers: HeaderMap,
) -> Response {
    PageContext::load(&state, &headers)
        .await
        .render("Log in", &login_form("", query.next.as_deref(), &[]))
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
    headers: HeaderMap,
    Form(form): Form<LoginForm>,
) -> ApiResult<Response> {
    let username = form.username.trim();

    let Some(user) = users::authenticate(&state.db, username, &form.password).await? else {
        info!(username = %username, "Failed login");
        return Ok(PageContext::load(&state, &headers).await.render_with_status(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Log in",
            &login_form(
                username,
                query.next.as_deref(),
                &["Invalid username or password.".to_string()],
            ),
        ));
    };

    let token = sessions::create_session(&state.db, &user.guid, state.session_ttl_hours).await?;
    let max_age = form
        .remember_me
        .is_some()
        .then(|| state.session_ttl_hours * 3600);

    info!(username = %user.username, remember = max_age.is_some(), "User logged in");

    Ok((
        AppendHeaders([
            (header::SET_COOKIE, session_cookie(&token, max_age)),
            (
                header::SET_COOKIE,
                flash_cookie(&format!("Welcome, {}!", user.username)),
            ),
        ]),
        Redirect::to(&safe_next_path(query.next.as_deref())),
    )
        .into_response())
}

/// GET /logout
pub async fn logout(
    State(state): State<AppState>,
    Extension(SessionUser(user)): Extension<SessionUser>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    if let Some(token) = read_cookie(&headers, SESSION_COOKIE) {
        sessions::delete_session(&state.db, &token).await?;
    }
    info!(username = %user.username, "User logged out");

    Ok((
        AppendHeaders([
            (header::SET_COOKIE, expired_cookie(SESSION_COOKIE)),
            (header::SET_COOKIE, flash_cookie("You have been logged out.")),
        ]),
        Redirect::to("/"),
    )
        .into_response())
}
