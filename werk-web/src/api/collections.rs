//! Collection pages
//!
//! Viewing a collection is public; everything else needs a login, and
//! changes need ownership.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::Response,
    Extension, Form,
};
use serde::Deserialize;
use werk_common::db::{Collection, Contestant};

use super::session::{redirect_with_flash, SessionUser};
use super::ui::{contestant_link, escape_html, form_errors, PageContext};
use crate::db::{collections, contestants, users};
use crate::error::{ApiError, ApiResult};
use crate::validation::validate_collection_name;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RenameForm {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct MemberForm {
    #[serde(default)]
    pub contestant_id: String,
}

fn new_collection_form(name: &str, selected: &[i64], available: &[Contestant], errors: &[String]) -> String {
    let choices = if available.is_empty() {
        r#"<p>No contestants are stored yet. <a href="/">Search for some</a> first, or create an empty collection.</p>"#
            .to_string()
    } else {
        let options: String = available
            .iter()
            .map(|c| {
                format!(
                    r#"<option value="{id}"{sel}>{name}</option>"#,
                    id = c.contestant_id,
                    sel = if selected.contains(&c.contestant_id) { " selected" } else { "" },
                    name = escape_html(&c.name)
                )
            })
            .collect();
        format!(
            r#"<p><label for="contestant_id">Pick contestants:</label><br>
    <select id="contestant_id" name="contestant_id" multiple size="10">{}</select></p>"#,
            options
        )
    };

    format!(
        r#"<h1>New collection</h1>
{errors}
<form method="post" action="/collections/new">
    <p><label for="name">Collection name:</label>
    <input id="name" name="name" value="{name}" maxlength="255" required></p>
    {choices}
    <button type="submit">Create collection</button>
</form>"#,
        errors = form_errors(errors),
        name = escape_html(name),
        choices = choices,
    )
}

/// GET /collections/new
pub async fn new_collection_page(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let available = contestants::list_contestants(&state.db).await?;
    Ok(PageContext::load(&state, &headers)
        .await
        .render("New collection", &new_collection_form("", &[], &available, &[])))
}

/// POST /collections/new
///
/// The multi-select arrives as repeated `contestant_id` fields.
pub async fn create_collection(
    State(state): State<AppState>,
    Extension(SessionUser(user)): Extension<SessionUser>,
    headers: HeaderMap,
    Form(fields): Form<Vec<(String, String)>>,
) -> ApiResult<Response> {
    let raw_name = fields
        .iter()
        .find(|(key, _)| key == "name")
        .map(|(_, value)| value.as_str())
        .unwrap_or_default();

    let mut errors = Vec::new();
    let mut contestant_ids = Vec::new();
    for (_, value) in fields.iter().filter(|(key, _)| key == "contestant_id") {
        match value.trim().parse::<i64>() {
            Ok(id) => contestant_ids.push(id),
            Err(_) => errors.push(format!("'{}' is not a contestant id", value)),
        }
    }

    let name = match validate_collection_name(raw_name) {
        Ok(name) => Some(name),
        Err(message) => {
            errors.push(message);
            None
        }
    };

    let Some(name) = name.filter(|_| errors.is_empty()) else {
        let available = contestants::list_contestants(&state.db).await?;
        return Ok(PageContext::load(&state, &headers).await.render_with_status(
            StatusCode::UNPROCESSABLE_ENTITY,
            "New collection",
            &new_collection_form(raw_name, &contestant_ids, &available, &errors),
        ));
    };

    let already_exists = collections::find_collection(&state.db, &user.guid, &name)
        .await?
        .is_some();
    let collection = state
        .sync
        .ensure_collection(&name, &user.guid, &contestant_ids)
        .await?;

    if already_exists {
        Ok(redirect_with_flash(
            &format!("/collections/{}", collection.guid),
            &format!(
                "You already have a collection named '{}'; its members were left unchanged.",
                collection.name
            ),
        ))
    } else {
        Ok(redirect_with_flash(
            &format!("/collections/{}", collection.guid),
            &format!("Created collection '{}'", collection.name),
        ))
    }
}

/// GET /collections
pub async fn list_collections(
    State(state): State<AppState>,
    Extension(SessionUser(user)): Extension<SessionUser>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let summaries = collections::list_collections_for_user(&state.db, &user.guid).await?;

    let body = if summaries.is_empty() {
        r#"<h1>My collections</h1><p>You have no collections yet. <a href="/collections/new">Create one</a>.</p>"#
            .to_string()
    } else {
        let rows: String = summaries
            .iter()
            .map(|c| {
                format!(
                    r#"<tr><td><a href="/collections/{guid}">{name}</a></td><td>{count}</td>
<td><a href="/collections/{guid}/rename">Rename</a></td>
<td><form method="post" action="/collections/{guid}/delete"><button type="submit">Delete</button></form></td></tr>"#,
                    guid = escape_html(&c.guid),
                    name = escape_html(&c.name),
                    count = c.member_count,
                )
            })
            .collect();
        format!(
            "<h1>My collections</h1><table><tr><th>Name</th><th>Contestants</th><th></th><th></th></tr>{}</table>",
            rows
        )
    };

    Ok(PageContext::load(&state, &headers)
        .await
        .render("My collections", &body))
}

/// GET /collections/:guid
pub async fn collection_page(
    State(state): State<AppState>,
    Path(guid): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let collection = collections::load_collection(&state.db, &guid)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Collection {}", guid)))?;
    let owner = users::load_user(&state.db, &collection.user_guid)
        .await?
        .map(|u| u.username)
        .unwrap_or_default();
    let members = collections::list_members(&state.db, &collection.guid).await?;

    let ctx = PageContext::load(&state, &headers).await;
    let is_owner = ctx
        .user
        .as_ref()
        .map_or(false, |u| u.guid == collection.user_guid);

    let body = collection_body(&collection, &owner, &members, is_owner);
    Ok(ctx.render(&collection.name, &body))
}

fn collection_body(collection: &Collection, owner: &str, members: &[Contestant], is_owner: bool) -> String {
    let guid = escape_html(&collection.guid);

    let rows: String = members
        .iter()
        .map(|c| {
            let remove = if is_owner {
                format!(
                    r#"<td><form method="post" action="/collections/{guid}/members/{id}/remove"><button type="submit">Remove</button></form></td>"#,
                    guid = guid,
                    id = c.contestant_id
                )
            } else {
                String::new()
            };
            format!("<tr><td>{}</td>{}</tr>", contestant_link(&c.name), remove)
        })
        .collect();
    let member_section = if rows.is_empty() {
        "<p>This collection is empty.</p>".to_string()
    } else {
        format!("<table>{}</table>", rows)
    };

    let owner_tools = if is_owner {
        format!(
            r#"<h2>Add a contestant</h2>
<form method="post" action="/collections/{guid}/members">
    <label for="contestant_id">Catalog id:</label>
    <input id="contestant_id" name="contestant_id" inputmode="numeric" required>
    <button type="submit">Add</button>
</form>
<p><a href="/collections/{guid}/rename">Rename</a></p>
<form method="post" action="/collections/{guid}/delete"><button type="submit">Delete this collection</button></form>"#,
            guid = guid
        )
    } else {
        String::new()
    };

    format!(
        r#"<h1>{name}</h1>
<p>Collected by {owner}.</p>
{members}
{tools}"#,
        name = escape_html(&collection.name),
        owner = escape_html(owner),
        members = member_section,
        tools = owner_tools,
    )
}

fn rename_form(collection: &Collection, value: &str, errors: &[String]) -> String {
    format!(
        r#"<h1>Rename '{current}'</h1>
{errors}
<form method="post" action="/collections/{guid}/rename">
    <label for="name">New name:</label>
    <input id="name" name="name" value="{value}" maxlength="255" required>
    <button type="submit">Rename</button>
</form>"#,
        current = escape_html(&collection.name),
        errors = form_errors(errors),
        guid = escape_html(&collection.guid),
        value = escape_html(value),
    )
}

/// GET /collections/:guid/rename
pub async fn rename_page(
    State(state): State<AppState>,
    Extension(SessionUser(user)): Extension<SessionUser>,
    Path(guid): Path<String>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let collection = collections::load_owned_collection(&state.db, &guid, &user.guid).await?;
    Ok(PageContext::load(&state, &headers)
        .await
        .render("Rename collection", &rename_form(&collection, &collection.name, &[])))
}

/// POST /collections/:guid/rename
pub async fn rename_collection(
    State(state): State<AppState>,
    Extension(SessionUser(user)): Extension<SessionUser>,
    Path(guid): Path<String>,
    headers: HeaderMap,
    Form(form): Form<RenameForm>,
) -> ApiResult<Response> {
    let collection = collections::load_owned_collection(&state.db, &guid, &user.guid).await?;

    let outcome = match validate_collection_name(&form.name) {
        Ok(new_name) if new_name == collection.name => Ok(new_name),
        Ok(new_name) => match collections::find_collection(&state.db, &user.guid, &new_name).await? {
            Some(_) => Err(format!("You already have a collection named '{}'", new_name)),
            None => match collections::rename_collection(&state.db, &guid, &new_name).await {
                Ok(()) => Ok(new_name),
                Err(werk_common::Error::InvalidInput(message)) => Err(message),
                Err(e) => return Err(e.into()),
            },
        },
        Err(message) => Err(message),
    };

    match outcome {
        Ok(new_name) => Ok(redirect_with_flash(
            "/collections",
            &format!(
                "Updated the name of collection '{}' to '{}'",
                collection.name, new_name
            ),
        )),
        Err(message) => Ok(PageContext::load(&state, &headers).await.render_with_status(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Rename collection",
            &rename_form(&collection, &form.name, &[message]),
        )),
    }
}

/// POST /collections/:guid/delete
pub async fn delete_collection(
    State(state): State<AppState>,
    Extension(SessionUser(user)): Extension<SessionUser>,
    Path(guid): Path<String>,
) -> ApiResult<Response> {
    let collection = collections::load_owned_collection(&state.db, &guid, &user.guid).await?;
    collections::delete_collection(&state.db, &collection.guid).await?;

    tracing::info!(collection = %collection.guid, name = %collection.name, "Deleted collection");

    Ok(redirect_with_flash(
        "/collections",
        &format!("Deleted collection '{}'", collection.name),
    ))
}

/// POST /collections/:guid/members
pub async fn add_member(
    State(state): State<AppState>,
    Extension(SessionUser(user)): Extension<SessionUser>,
    Path(guid): Path<String>,
    Form(form): Form<MemberForm>,
) -> ApiResult<Response> {
    let contestant_id = form
        .contestant_id
        .trim()
        .parse::<i64>()
        .map_err(|_| ApiError::BadRequest(format!("'{}' is not a contestant id", form.contestant_id)))?;

    let contestant = state.sync.add_member(&guid, &user.guid, contestant_id).await?;

    Ok(redirect_with_flash(
        &format!("/collections/{}", guid),
        &format!("Added {} to the collection", contestant.name),
    ))
}

/// POST /collections/:guid/members/:contestant_id/remove
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(SessionUser(user)): Extension<SessionUser>,
    Path((guid, contestant_id)): Path<(String, i64)>,
) -> ApiResult<Response> {
    let removed = state
        .sync
        .remove_member(&guid, &user.guid, contestant_id)
        .await?;

    let message = if removed {
        "Removed contestant from the collection"
    } else {
        "That contestant was not in the collection"
    };
    Ok(redirect_with_flash(&format!("/collections/{}", guid), message))
}
