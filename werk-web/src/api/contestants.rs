//! Contestant search and detail pages

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use werk_common::db::Contestant;

use super::ui::{contestant_link, escape_html, form_errors, PageContext};
use crate::db::{challenges, contestants};
use crate::error::{ApiError, ApiResult};
use crate::validation::validate_contestant_name;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ContestantForm {
    #[serde(default)]
    pub name: String,
}

fn search_form(name: &str, errors: &[String]) -> String {
    format!(
        r#"<h1>Find a contestant</h1>
{errors}
<form method="post" action="/">
    <label for="name">Enter the name of a contestant:</label>
    <input id="name" name="name" value="{name}" required>
    <button type="submit">Search</button>
</form>
<p><a href="/contestants">See every contestant looked up so far</a></p>"#,
        errors = form_errors(errors),
        name = escape_html(name),
    )
}

/// GET /
pub async fn search_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    PageContext::load(&state, &headers)
        .await
        .render("Find a contestant", &search_form("", &[]))
}

/// POST /
///
/// A name already stored locally skips the canonical-list check.
pub async fn search_contestant(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<ContestantForm>,
) -> ApiResult<Response> {
    let name = form.name.trim().to_string();

    let stored = if name.is_empty() {
        None
    } else {
        contestants::load_contestant_by_name(&state.db, &name).await?
    };

    let contestant = match stored {
        Some(contestant) => contestant,
        None => {
            let canonical = if name.is_empty() {
                Vec::new()
            } else {
                state.catalog.contestant_names().await?
            };
            if let Err(message) = validate_contestant_name(&name, &canonical) {
                let ctx = PageContext::load(&state, &headers).await;
                return Ok(ctx.render_with_status(
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "Find a contestant",
                    &search_form(&name, &[message]),
                ));
            }
            state.sync.ensure_contestant_by_name(&name).await?
        }
    };

    Ok(Redirect::to(&format!("/contestants/{}", urlencoding::encode(&contestant.name))).into_response())
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

/// GET /contestants/:name
pub async fn contestant_page(
    State(state): State<AppState>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let contestant = contestants::load_contestant_by_name(&state.db, &name)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No contestant named '{}' has been looked up yet", name)))?;

    let challenge_rows: String = challenges::list_challenges_for_contestant(&state.db, contestant.contestant_id)
        .await?
        .iter()
        .map(|c| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                c.episode_number.map(|n| n.to_string()).unwrap_or_default(),
                escape_html(&c.challenge_type),
                escape_html(&c.description)
            )
        })
        .collect();
    let challenge_section = if challenge_rows.is_empty() {
        "<p>No challenges recorded.</p>".to_string()
    } else {
        format!(
            "<table><tr><th>Episode</th><th>Type</th><th>Description</th></tr>{}</table>",
            challenge_rows
        )
    };

    let quote = if contestant.quote.is_empty() {
        String::new()
    } else {
        format!("<blockquote>“{}”</blockquote>", escape_html(&contestant.quote))
    };

    let body = format!(
        r#"<h1>{name}</h1>
{quote}
<dl>
    <dt>Catalog id</dt><dd>{id}</dd>
    <dt>Season winner</dt><dd>{winner}</dd>
    <dt>Miss Congeniality</dt><dd>{congeniality}</dd>
</dl>
<h2>Challenges</h2>
{challenges}"#,
        name = escape_html(&contestant.name),
        quote = quote,
        id = contestant.contestant_id,
        winner = yes_no(contestant.season_winner),
        congeniality = yes_no(contestant.congeniality),
        challenges = challenge_section,
    );

    Ok(PageContext::load(&state, &headers)
        .await
        .render(&contestant.name, &body))
}

fn contestant_rows(list: &[Contestant]) -> String {
    list.iter()
        .map(|c| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                c.contestant_id,
                contestant_link(&c.name),
                yes_no(c.season_winner),
                yes_no(c.congeniality)
            )
        })
        .collect()
}

/// GET /contestants
pub async fn all_contestants(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Response> {
    let list = contestants::list_contestants(&state.db).await?;

    let body = if list.is_empty() {
        r#"<h1>Contestants</h1><p>Nobody has been looked up yet. <a href="/">Search for a contestant</a>.</p>"#
            .to_string()
    } else {
        format!(
            "<h1>Contestants</h1><p>{} stored.</p><table><tr><th>Id</th><th>Name</th><th>Winner</th><th>Miss Congeniality</th></tr>{}</table>",
            list.len(),
            contestant_rows(&list)
        )
    };

    Ok(PageContext::load(&state, &headers).await.render("Contestants", &body))
}
