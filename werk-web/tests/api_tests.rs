//! Router tests for werk-web pages
//!
//! Each test builds the full router over a temp database and the in-memory
//! catalog, then drives it with `oneshot` requests.

mod helpers;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use helpers::{count_rows, create_test_db, seeded_catalog, FakeCatalog};
use serde_json::Value;
use sqlx::SqlitePool;
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot`
use werk_web::catalog::{CatalogError, Lookup};
use werk_web::{build_router, AppState};

struct TestApp {
    router: Router,
    pool: SqlitePool,
    catalog: Arc<FakeCatalog>,
    _dir: TempDir,
}

async fn setup_app() -> TestApp {
    let (dir, pool) = create_test_db().await;
    let catalog = Arc::new(seeded_catalog());
    let state = AppState::new(pool.clone(), catalog.clone(), 24);
    TestApp {
        router: build_router(state),
        pool,
        catalog,
        _dir: dir,
    }
}

impl TestApp {
    async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    async fn post_form(&self, uri: &str, form: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(form.to_string())).unwrap())
            .await
    }

    /// Register and log in, returning the session cookie pair
    async fn login_as(&self, username: &str) -> String {
        let form = format!("username={0}&password=pw-{0}&password2=pw-{0}", username);
        let registered = self.post_form("/register", &form, None).await;
        assert_eq!(registered.status(), StatusCode::SEE_OTHER);

        let form = format!("username={0}&password=pw-{0}", username);
        let logged_in = self.post_form("/login", &form, None).await;
        assert_eq!(logged_in.status(), StatusCode::SEE_OTHER);
        session_cookie(&logged_in).expect("session cookie set")
    }
}

fn location(response: &Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

fn session_cookie(response: &Response) -> Option<String> {
    set_cookies(response)
        .into_iter()
        .find(|c| c.starts_with("werk_session=") && !c.starts_with("werk_session=;"))
        .and_then(|c| c.split(';').next().map(str::to_string))
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    String::from_utf8(bytes.to_vec()).unwrap()
}

// =============================================================================
// Health and fallback
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app().await;

    let response = app.get("/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["module"], "werk-web");
    assert!(json["uptime_seconds"].as_i64().unwrap() >= 0);
}

#[tokio::test]
async fn test_unknown_path_renders_404_page() {
    let app = setup_app().await;

    let response = app.get("/no/such/page", None).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.contains("Page not found"));
}

// =============================================================================
// Accounts
// =============================================================================

#[tokio::test]
async fn test_login_required_redirects_with_next() {
    let app = setup_app().await;

    let response = app.get("/collections", None).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login?next=%2Fcollections");
    assert!(set_cookies(&response).iter().any(|c| c.starts_with("werk_flash=")));
}

#[tokio::test]
async fn test_register_validations() {
    let app = setup_app().await;

    let bad_name = app
        .post_form("/register", "username=9lives&password=a&password2=a", None)
        .await;
    assert_eq!(bad_name.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let mismatch = app
        .post_form("/register", "username=valentina&password=a&password2=b", None)
        .await;
    assert_eq!(mismatch.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_text(mismatch).await.contains("Passwords must match"));

    let ok = app
        .post_form("/register", "username=valentina&password=a&password2=a", None)
        .await;
    assert_eq!(ok.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&ok), "/login");

    let taken = app
        .post_form("/register", "username=valentina&password=a&password2=a", None)
        .await;
    assert_eq!(taken.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_text(taken).await.contains("Username already taken"));
    assert_eq!(count_rows(&app.pool, "users").await, 1);
}

#[tokio::test]
async fn test_login_flow_and_next_redirect() {
    let app = setup_app().await;
    app.post_form("/register", "username=monet&password=x&password2=x", None)
        .await;

    let wrong = app.post_form("/login", "username=monet&password=y", None).await;
    assert_eq!(wrong.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(session_cookie(&wrong).is_none());

    let ok = app
        .post_form(
            "/login?next=%2Fcollections",
            "username=monet&password=x&remember_me=on",
            None,
        )
        .await;
    assert_eq!(ok.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&ok), "/collections");
    assert!(set_cookies(&ok)
        .iter()
        .any(|c| c.starts_with("werk_session=") && c.contains("Max-Age=86400")));

    let cookie = session_cookie(&ok).unwrap();
    let page = app.get("/collections", Some(&cookie)).await;
    assert_eq!(page.status(), StatusCode::OK);
    assert!(body_text(page).await.contains("monet"));
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app = setup_app().await;
    let cookie = app.login_as("shangela").await;

    let response = app.get("/logout", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(count_rows(&app.pool, "sessions").await, 0);

    let after = app.get("/collections", Some(&cookie)).await;
    assert_eq!(after.status(), StatusCode::SEE_OTHER);
}

// =============================================================================
// Contestants, seasons, episodes
// =============================================================================

#[tokio::test]
async fn test_contestant_search_flow() {
    let app = setup_app().await;

    let response = app.post_form("/", "name=Jinkx+Monsoon", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/contestants/Jinkx%20Monsoon");

    let page = app.get("/contestants/Jinkx%20Monsoon", None).await;
    assert_eq!(page.status(), StatusCode::OK);
    assert!(body_text(page).await.contains("Water off a duck&#x27;s back"));

    // Stored now, so no second canonical-list fetch
    app.post_form("/", "name=Jinkx+Monsoon", None).await;
    assert_eq!(app.catalog.calls(&Lookup::AllContestants), 1);
}

#[tokio::test]
async fn test_unknown_contestant_name_rejected() {
    let app = setup_app().await;

    let response = app.post_form("/", "name=Nobody", None).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_text(response).await.contains("is not a contestant"));
    assert_eq!(count_rows(&app.pool, "contestants").await, 0);
}

#[tokio::test]
async fn test_unstored_contestant_page_is_404() {
    let app = setup_app().await;

    let response = app.get("/contestants/Alaska", None).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_season_submit_and_view() {
    let app = setup_app().await;

    let response = app.post_form("/seasons", "season_number=6", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/seasons/6");

    let page = body_text(app.get("/seasons/6", None).await).await;
    assert!(page.contains("Scream Queens"));
    assert!(page.contains("3 episodes"));

    let again = app.post_form("/seasons", "season_number=6", None).await;
    assert!(set_cookies(&again).iter().any(|c| c.starts_with("werk_flash=")));
    assert_eq!(app.catalog.calls(&Lookup::Season(7)), 1);

    let invalid = app.post_form("/seasons", "season_number=13", None).await;
    assert_eq!(invalid.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_episode_title_lookup() {
    let app = setup_app().await;

    let empty = body_text(app.get("/title", None).await).await;
    assert!(empty.contains("Nothing was submitted yet"));

    let found = app.get("/title?number=1", None).await;
    assert_eq!(found.status(), StatusCode::OK);
    assert!(body_text(found).await.contains("Drag on a Dime"));
    assert_eq!(app.catalog.calls(&Lookup::Episode(8)), 1);

    let invalid = app.get("/title?number=0", None).await;
    assert_eq!(invalid.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_episode_title_rejects_max_integer() {
    let app = setup_app().await;

    let response = app.get("/title?number=9223372036854775807", None).await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_text(response).await.contains("Enter an episode number from 1 to"));
    assert_eq!(app.catalog.total_calls(), 0);
}

#[tokio::test]
async fn test_catalog_outage_renders_bad_gateway() {
    let app = setup_app().await;
    app.catalog.fail(
        Lookup::Episode(9),
        CatalogError::RemoteUnavailable("connection refused".to_string()),
    );

    let response = app.get("/title?number=2", None).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

// =============================================================================
// Collections
// =============================================================================

async fn create_faves(app: &TestApp, cookie: &str) -> String {
    let response = app
        .post_form(
            "/collections/new",
            "name=Faves&contestant_id=101&contestant_id=102",
            Some(cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    location(&response)
        .strip_prefix("/collections/")
        .expect("redirect to collection page")
        .to_string()
}

#[tokio::test]
async fn test_create_collection_fetches_members() {
    let app = setup_app().await;
    let cookie = app.login_as("alyssa").await;

    let guid = create_faves(&app, &cookie).await;

    let page = body_text(app.get(&format!("/collections/{}", guid), None).await).await;
    assert!(page.contains("Alaska"));
    assert!(page.contains("Jinkx Monsoon"));
    assert!(page.contains("alyssa"));
    assert!(!page.contains("/members/101/remove"), "anonymous viewers get no edit buttons");

    let list = body_text(app.get("/collections", Some(&cookie)).await).await;
    assert!(list.contains("Faves"));
}

#[tokio::test]
async fn test_reserved_collection_name_rejected() {
    let app = setup_app().await;
    let cookie = app.login_as("alyssa").await;

    let response = app
        .post_form("/collections/new", "name=RuPaul%27s+Best", Some(&cookie))
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(count_rows(&app.pool, "collections").await, 0);
}

#[tokio::test]
async fn test_repeat_create_keeps_members() {
    let app = setup_app().await;
    let cookie = app.login_as("alyssa").await;
    let guid = create_faves(&app, &cookie).await;

    let again = app
        .post_form("/collections/new", "name=Faves&contestant_id=103", Some(&cookie))
        .await;

    assert_eq!(location(&again), format!("/collections/{}", guid));
    assert_eq!(count_rows(&app.pool, "collection_contestants").await, 2);
    assert_eq!(app.catalog.calls(&Lookup::ContestantById(103)), 0);
}

#[tokio::test]
async fn test_only_owner_may_change_collection() {
    let app = setup_app().await;
    let owner = app.login_as("alyssa").await;
    let intruder = app.login_as("coco").await;
    let guid = create_faves(&app, &owner).await;

    let rename = app
        .post_form(&format!("/collections/{}/rename", guid), "name=Mine", Some(&intruder))
        .await;
    assert_eq!(rename.status(), StatusCode::FORBIDDEN);

    let delete = app
        .post_form(&format!("/collections/{}/delete", guid), "", Some(&intruder))
        .await;
    assert_eq!(delete.status(), StatusCode::FORBIDDEN);

    let add = app
        .post_form(&format!("/collections/{}/members", guid), "contestant_id=103", Some(&intruder))
        .await;
    assert_eq!(add.status(), StatusCode::FORBIDDEN);

    let remove = app
        .post_form(&format!("/collections/{}/members/101/remove", guid), "", Some(&intruder))
        .await;
    assert_eq!(remove.status(), StatusCode::FORBIDDEN);

    assert_eq!(count_rows(&app.pool, "collection_contestants").await, 2);
}

#[tokio::test]
async fn test_owner_edits_collection() {
    let app = setup_app().await;
    let cookie = app.login_as("alyssa").await;
    let guid = create_faves(&app, &cookie).await;

    let add = app
        .post_form(&format!("/collections/{}/members", guid), "contestant_id=103", Some(&cookie))
        .await;
    assert_eq!(add.status(), StatusCode::SEE_OTHER);
    assert_eq!(count_rows(&app.pool, "collection_contestants").await, 3);

    let remove = app
        .post_form(&format!("/collections/{}/members/101/remove", guid), "", Some(&cookie))
        .await;
    assert_eq!(remove.status(), StatusCode::SEE_OTHER);
    assert_eq!(count_rows(&app.pool, "collection_contestants").await, 2);

    let rename = app
        .post_form(&format!("/collections/{}/rename", guid), "name=Legends", Some(&cookie))
        .await;
    assert_eq!(rename.status(), StatusCode::SEE_OTHER);
    let page = body_text(app.get(&format!("/collections/{}", guid), Some(&cookie)).await).await;
    assert!(page.contains("Legends"));
    assert!(page.contains("/members/102/remove"));

    let delete = app
        .post_form(&format!("/collections/{}/delete", guid), "", Some(&cookie))
        .await;
    assert_eq!(delete.status(), StatusCode::SEE_OTHER);
    assert_eq!(count_rows(&app.pool, "collections").await, 0);
    assert_eq!(count_rows(&app.pool, "contestants").await, 3);
}

#[tokio::test]
async fn test_rename_to_existing_name_rejected() {
    let app = setup_app().await;
    let cookie = app.login_as("alyssa").await;
    let guid = create_faves(&app, &cookie).await;
    app.post_form("/collections/new", "name=Other", Some(&cookie)).await;

    let response = app
        .post_form(&format!("/collections/{}/rename", guid), "name=Other", Some(&cookie))
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_text(response).await.contains("already have a collection"));
}
