//! HTML page rendering
//!
//! Pages are plain `format!` templates wrapped in one shared layout.
//! Every piece of user or catalog text must pass through [`escape_html`].

use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use werk_common::db::User;

use super::session;
use crate::AppState;

/// Escape text for use in HTML element content and quoted attributes
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Link to a contestant's detail page
pub fn contestant_link(name: &str) -> String {
    format!(
        r#"<a href="/contestants/{}">{}</a>"#,
        urlencoding::encode(name),
        escape_html(name)
    )
}

/// Validation messages shown above a form
pub fn form_errors(errors: &[String]) -> String {
    if errors.is_empty() {
        return String::new();
    }
    let items: String = errors
        .iter()
        .map(|e| format!("<li>{}</li>", escape_html(e)))
        .collect();
    format!(r#"<ul class="errors">{}</ul>"#, items)
}

/// Per-request view state: who is logged in and any pending flash message
pub struct PageContext {
    pub user: Option<User>,
    pub flash: Option<String>,
}

impl PageContext {
    pub async fn load(state: &AppState, headers: &HeaderMap) -> Self {
        Self {
            user: session::current_user(state, headers).await,
            flash: session::read_flash(headers),
        }
    }

    pub fn render(self, title: &str, body: &str) -> Response {
        self.render_with_status(StatusCode::OK, title, body)
    }

    /// Render the page, clearing the flash cookie if one was shown
    pub fn render_with_status(self, status: StatusCode, title: &str, body: &str) -> Response {
        let html = layout(title, self.user.as_ref(), self.flash.as_deref(), body);
        if self.flash.is_some() {
            (
                status,
                [(header::SET_COOKIE, session::expired_cookie(session::FLASH_COOKIE))],
                Html(html),
            )
                .into_response()
        } else {
            (status, Html(html)).into_response()
        }
    }
}

/// Standalone error page (no session lookup)
pub fn error_page(status: StatusCode, message: &str) -> Response {
    let title = status.canonical_reason().unwrap_or("Error");
    let body = format!(
        r#"<h1>{}</h1>
<p>{}</p>
<p><a href="/">Back to the start page</a></p>"#,
        escape_html(title),
        escape_html(message)
    );
    (status, Html(layout(title, None, None, &body))).into_response()
}

fn nav(user: Option<&User>) -> String {
    let account = match user {
        Some(user) => format!(
            r#"<a href="/collections">My collections</a> · <a href="/collections/new">New collection</a> · <span class="who">{}</span> · <a href="/logout">Log out</a>"#,
            escape_html(&user.username)
        ),
        None => r#"<a href="/login">Log in</a> · <a href="/register">Register</a>"#.to_string(),
    };
    format!(
        r#"<nav><a href="/">Search</a> · <a href="/contestants">Contestants</a> · <a href="/seasons">Seasons</a> · <a href="/episodes">Episodes</a> <span class="account">{}</span></nav>"#,
        account
    )
}

fn layout(title: &str, user: Option<&User>, flash: Option<&str>, body: &str) -> String {
    let flash = flash
        .map(|message| format!(r#"<div class="flash">{}</div>"#, escape_html(message)))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} · Werk</title>
    <style>
        body {{
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            background-color: #1a1a1a;
            color: #e0e0e0;
            line-height: 1.6;
            margin: 0;
        }}
        nav {{
            background-color: #2a2a2a;
            border-bottom: 1px solid #3a3a3a;
            padding: 12px 20px;
        }}
        nav .account {{ float: right; }}
        a {{ color: #4a9eff; }}
        main {{ padding: 20px; }}
        .flash {{
            background-color: #2d3a2d;
            border: 1px solid #4a7a4a;
            padding: 8px 12px;
            margin-bottom: 16px;
        }}
        .errors {{ color: #ff6b6b; }}
        footer {{
            color: #888;
            font-family: 'Courier New', monospace;
            font-size: 12px;
            padding: 20px;
        }}
    </style>
</head>
<body>
{nav}
<main>
{flash}
{body}
</main>
<footer>werk-web v{version} [{git_hash}]</footer>
</body>
</html>
"#,
        title = escape_html(title),
        nav = nav(user),
        flash = flash,
        body = body,
        version = env!("CARGO_PKG_VERSION"),
        git_hash = env!("GIT_HASH"),
    )
}
