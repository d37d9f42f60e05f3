//! Shared test helpers
//!
//! An in-memory catalog that counts requests, fixture JSON in the catalog's
//! shape, and throwaway databases.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;
use werk_common::db::init_database;
use werk_web::catalog::{Catalog, CatalogError, CatalogResult, Lookup};

/// Catalog double serving canned responses
///
/// Unknown lookups answer `NotFound`. An optional delay widens race windows
/// for concurrency tests.
#[derive(Default)]
pub struct FakeCatalog {
    responses: Mutex<HashMap<Lookup, CatalogResult<Value>>>,
    calls: Mutex<HashMap<Lookup, usize>>,
    delay: Option<Duration>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn respond(&self, lookup: Lookup, value: Value) {
        self.responses.lock().unwrap().insert(lookup, Ok(value));
    }

    pub fn fail(&self, lookup: Lookup, error: CatalogError) {
        self.responses.lock().unwrap().insert(lookup, Err(error));
    }

    pub fn calls(&self, lookup: &Lookup) -> usize {
        self.calls.lock().unwrap().get(lookup).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn fetch(&self, lookup: &Lookup) -> CatalogResult<Value> {
        *self.calls.lock().unwrap().entry(lookup.clone()).or_insert(0) += 1;

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.responses
            .lock()
            .unwrap()
            .get(lookup)
            .cloned()
            .unwrap_or_else(|| Err(CatalogError::NotFound(lookup.to_string())))
    }
}

pub fn queen_json(id: i64, name: &str, winner: bool, quote: Option<&str>) -> Value {
    json!({
        "id": id,
        "name": name,
        "winner": winner,
        "missCongeniality": false,
        "quote": quote,
    })
}

pub fn season_json(season_number: &str, winner_id: Option<i64>) -> Value {
    json!({
        "id": 0,
        "seasonNumber": season_number,
        "winnerId": winner_id,
    })
}

pub fn episodes_json(titles: &[&str]) -> Value {
    Value::Array(
        titles
            .iter()
            .enumerate()
            .map(|(i, title)| json!({"id": i + 100, "episodeInSeason": i + 1, "title": title}))
            .collect(),
    )
}

/// Catalog preloaded with a few contestants, seasons and episodes
///
/// - contestants 101 Alaska, 102 Jinkx Monsoon, 103 Bob the Drag Queen
/// - season 3 (catalog id 3) with two episodes
/// - season 6 (catalog id 7) with three episodes
/// - episode number 1 (catalog id 8)
pub fn seeded_catalog() -> FakeCatalog {
    let catalog = FakeCatalog::new();
    seed(&catalog);
    catalog
}

pub fn seed(catalog: &FakeCatalog) {
    let queens = [
        queen_json(101, "Alaska", false, Some("Hieee!")),
        queen_json(102, "Jinkx Monsoon", true, Some("Water off a duck's back")),
        queen_json(103, "Bob the Drag Queen", true, None),
    ];

    catalog.respond(
        Lookup::AllContestants,
        json!(queens.iter().map(|q| json!({"id": q["id"], "name": q["name"]})).collect::<Vec<_>>()),
    );
    for queen in &queens {
        let id = queen["id"].as_i64().unwrap();
        let name = queen["name"].as_str().unwrap().to_string();
        catalog.respond(Lookup::ContestantById(id), queen.clone());
        catalog.respond(Lookup::ContestantByName(name), json!([queen]));
    }

    catalog.respond(Lookup::Season(3), season_json("3", Some(77)));
    catalog.respond(
        Lookup::SeasonEpisodes(3),
        episodes_json(&["Queens on Vacation", "Queens in Space"]),
    );

    catalog.respond(Lookup::Season(7), season_json("6", Some(102)));
    catalog.respond(
        Lookup::SeasonEpisodes(7),
        episodes_json(&["RuPaullywood or Bust", "Oh No She Betta Don't!", "Scream Queens"]),
    );

    catalog.respond(Lookup::Episode(8), json!({"id": 8, "title": "Drag on a Dime"}));
}

/// Fresh database in a temp dir; keep the TempDir alive for the test
pub async fn create_test_db() -> (TempDir, SqlitePool) {
    let temp_dir = TempDir::new().expect("temp dir");
    let pool = init_database(&temp_dir.path().join("werk.db"))
        .await
        .expect("init database");
    (temp_dir, pool)
}

pub async fn count_rows(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .unwrap()
}
