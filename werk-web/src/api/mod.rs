//! HTTP handlers for werk-web

pub mod accounts;
pub mod collections;
pub mod contestants;
pub mod health;
pub mod seasons;
pub mod session;
pub mod ui;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, Uri},
    response::Response,
};

pub use accounts::{login, login_page, logout, register, register_page};
pub use collections::{
    add_member, collection_page, create_collection, delete_collection, list_collections,
    new_collection_page, remove_member, rename_collection, rename_page,
};
pub use contestants::{all_contestants, contestant_page, search_contestant, search_page};
pub use health::health_routes;
pub use seasons::{episode_title, episodes_page, season_page, seasons_page, submit_season};
pub use session::require_login;

use crate::AppState;

/// Fallback for unknown paths
pub async fn not_found(State(state): State<AppState>, uri: Uri, headers: HeaderMap) -> Response {
    let body = format!(
        r#"<h1>Page not found</h1><p>Nothing lives at <code>{}</code>.</p><p><a href="/">Back to the start page</a></p>"#,
        ui::escape_html(uri.path())
    );
    ui::PageContext::load(&state, &headers)
        .await
        .render_with_status(StatusCode::NOT_FOUND, "Not found", &body)
}
