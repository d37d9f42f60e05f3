//! Season and episode pages

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;

use super::session::redirect_with_flash;
use super::ui::{escape_html, form_errors, PageContext};
use crate::catalog::catalog_season_id;
use crate::db::seasons;
use crate::error::{ApiError, ApiResult};
use crate::validation::{parse_episode_number, parse_season_number};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SeasonForm {
    #[serde(default)]
    pub season_number: String,
}

#[derive(Debug, Deserialize)]
pub struct TitleQuery {
    pub number: Option<String>,
}

fn season_form(value: &str, errors: &[String]) -> String {
    format!(
        r#"<form method="post" action="/seasons">
    {errors}
    <label for="season_number">Season number:</label>
    <input id="season_number" name="season_number" value="{value}" required>
    <button type="submit">Load episodes</button>
</form>"#,
        errors = form_errors(errors),
        value = escape_html(value),
    )
}

async fn seasons_body(state: &AppState, value: &str, errors: &[String]) -> ApiResult<String> {
    let stored = seasons::list_seasons(&state.db).await?;
    let links: String = stored
        .iter()
        .map(|s| {
            format!(
                r#"<li><a href="/seasons/{n}">Season {n}</a></li>"#,
                n = s.season_number
            )
        })
        .collect();
    let stored_section = if links.is_empty() {
        String::new()
    } else {
        format!("<h2>Already loaded</h2><ul>{}</ul>", links)
    };

    Ok(format!(
        "<h1>Seasons</h1>{}{}",
        season_form(value, errors),
        stored_section
    ))
}

/// GET /seasons
pub async fn seasons_page(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Response> {
    let body = seasons_body(&state, "", &[]).await?;
    Ok(PageContext::load(&state, &headers).await.render("Seasons", &body))
}

/// POST /seasons
pub async fn submit_season(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<SeasonForm>,
) -> ApiResult<Response> {
    let season_number = match parse_season_number(&form.season_number) {
        Ok(n) => n,
        Err(message) => {
            let body = seasons_body(&state, &form.season_number, &[message]).await?;
            return Ok(PageContext::load(&state, &headers).await.render_with_status(
                StatusCode::UNPROCESSABLE_ENTITY,
                "Seasons",
                &body,
            ));
        }
    };

    let season_id = catalog_season_id(season_number)
        .ok_or_else(|| ApiError::BadRequest(format!("No season {}", season_number)))?;
    let already_loaded = seasons::load_season(&state.db, season_id).await?.is_some();

    state.sync.ensure_season(season_number).await?;

    let location = format!("/seasons/{}", season_number);
    if already_loaded {
        Ok(redirect_with_flash(
            &location,
            &format!("Season {} was already loaded", season_number),
        ))
    } else {
        Ok(Redirect::to(&location).into_response())
    }
}

/// GET /seasons/:number
pub async fn season_page(
    State(state): State<AppState>,
    Path(number): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let season_number = parse_season_number(&number).map_err(ApiError::NotFound)?;
    let season_id = catalog_season_id(season_number)
        .ok_or_else(|| ApiError::NotFound(format!("No season {}", season_number)))?;

    let title = format!("Season {}", season_number);
    let body = match seasons::load_season_with_episodes(&state.db, season_id).await? {
        Some(stored) => {
            let rows: String = stored
                .episodes
                .iter()
                .map(|e| {
                    format!(
                        "<tr><td>{}</td><td>{}</td></tr>",
                        e.episode_number,
                        escape_html(&e.title)
                    )
                })
                .collect();
            format!(
                "<h1>{}</h1><p>{} episodes.</p><table><tr><th>#</th><th>Title</th></tr>{}</table>",
                title,
                stored.episodes.len(),
                rows
            )
        }
        None => format!(
            r#"<h1>{title}</h1>
<p>This season has not been loaded yet.</p>
<form method="post" action="/seasons">
    <input type="hidden" name="season_number" value="{n}">
    <button type="submit">Load it now</button>
</form>"#,
            title = title,
            n = season_number,
        ),
    };

    Ok(PageContext::load(&state, &headers).await.render(&title, &body))
}

fn episode_form(value: &str, errors: &[String]) -> String {
    format!(
        r#"<h1>Episode titles</h1>
{errors}
<form method="get" action="/title">
    <label for="number">Episode number:</label>
    <input id="number" name="number" value="{value}" required>
    <button type="submit">Look up title</button>
</form>"#,
        errors = form_errors(errors),
        value = escape_html(value),
    )
}

/// GET /episodes
pub async fn episodes_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    PageContext::load(&state, &headers)
        .await
        .render("Episode titles", &episode_form("", &[]))
}

/// GET /title?number=N
///
/// Always a live catalog lookup; titles are not stored.
pub async fn episode_title(
    State(state): State<AppState>,
    Query(query): Query<TitleQuery>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let ctx = PageContext::load(&state, &headers).await;

    let raw = query.number.unwrap_or_default();
    if raw.trim().is_empty() {
        return Ok(ctx.render(
            "Episode titles",
            r#"<h1>Episode titles</h1><p>Nothing was submitted yet. <a href="/episodes">Enter an episode number</a>.</p>"#,
        ));
    }

    let episode_number = match parse_episode_number(&raw) {
        Ok(n) => n,
        Err(message) => {
            return Ok(ctx.render_with_status(
                StatusCode::UNPROCESSABLE_ENTITY,
                "Episode titles",
                &episode_form(&raw, &[message]),
            ))
        }
    };

    let record = state.catalog.episode_by_offset(episode_number).await?;
    let title = record.text("title")?;

    let body = format!(
        r#"<h1>Episode {n}</h1>
<p>The title of episode {n} is <strong>{title}</strong>.</p>
<p><a href="/episodes">Look up another episode</a></p>"#,
        n = episode_number,
        title = escape_html(&title),
    );
    Ok(ctx.render(&format!("Episode {}", episode_number), &body))
}
