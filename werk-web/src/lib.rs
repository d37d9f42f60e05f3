//! werk-web library - contestant catalog browser with personal collections
//!
//! Pages read from the local SQLite store; entities missing there are pulled
//! from the remote catalog on first use through the [`sync::Synchronizer`].

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod catalog;
pub mod db;
pub mod error;
pub mod sync;
pub mod validation;

pub use error::{ApiError, ApiResult};

use catalog::Catalog;
use sync::Synchronizer;

/// Name used for the config file and health reports
pub const MODULE_NAME: &str = "werk-web";

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub catalog: Arc<dyn Catalog>,
    pub sync: Arc<Synchronizer>,
    /// Lifetime of new login sessions
    pub session_ttl_hours: i64,
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, catalog: Arc<dyn Catalog>, session_ttl_hours: i64) -> Self {
        let sync = Arc::new(Synchronizer::new(db.clone(), Arc::clone(&catalog)));
        Self {
            db,
            catalog,
            sync,
            session_ttl_hours,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};

    // Login required
    let protected = Router::new()
        .route("/logout", get(api::logout))
        .route("/collections", get(api::list_collections))
        .route(
            "/collections/new",
            get(api::new_collection_page).post(api::create_collection),
        )
        .route(
            "/collections/:guid/rename",
            get(api::rename_page).post(api::rename_collection),
        )
        .route("/collections/:guid/delete", post(api::delete_collection))
        .route("/collections/:guid/members", post(api::add_member))
        .route(
            "/collections/:guid/members/:contestant_id/remove",
            post(api::remove_member),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::require_login,
        ));

    let public = Router::new()
        .route("/", get(api::search_page).post(api::search_contestant))
        .route("/contestants", get(api::all_contestants))
        .route("/contestants/:name", get(api::contestant_page))
        .route("/seasons", get(api::seasons_page).post(api::submit_season))
        .route("/seasons/:number", get(api::season_page))
        .route("/episodes", get(api::episodes_page))
        .route("/title", get(api::episode_title))
        .route("/register", get(api::register_page).post(api::register))
        .route("/login", get(api::login_page).post(api::login))
        .route("/collections/:guid", get(api::collection_page))
        .merge(api::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .fallback(api::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
