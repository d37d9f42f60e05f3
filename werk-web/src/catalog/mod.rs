//! Remote catalog access
//!
//! The catalog is a read-only JSON API. Every call is a fresh round trip:
//! no caching and no retries happen at this layer. Responses are returned as
//! generic [`CatalogRecord`]s and fields are only checked when they are read,
//! so a missing field surfaces as [`CatalogError::MalformedResponse`] at the
//! point of access.

pub mod client;
pub mod record;
pub mod season_map;

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

pub use client::CatalogClient;
pub use record::CatalogRecord;
pub use season_map::{
    catalog_episode_id, catalog_season_id, EPISODE_ID_OFFSET, MAX_EPISODE_NUMBER, MAX_SEASON_NUMBER,
};

/// Catalog client errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// Transport failure, timeout, or an unexpected HTTP status
    #[error("Catalog unavailable: {0}")]
    RemoteUnavailable(String),

    /// Body was not the expected JSON shape, or a field was missing or mistyped
    #[error("Malformed catalog response: {0}")]
    MalformedResponse(String),

    /// The catalog has no such entity
    #[error("Not found in catalog: {0}")]
    NotFound(String),

    /// The lookup itself is out of range; nothing was sent
    #[error("Invalid catalog lookup: {0}")]
    InvalidRequest(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// One read request against the catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Lookup {
    AllContestants,
    ContestantByName(String),
    ContestantById(i64),
    /// Catalog season id (already offset-mapped)
    Season(i64),
    /// Episodes of a catalog season id
    SeasonEpisodes(i64),
    /// Sequential catalog episode id
    Episode(i64),
}

impl Lookup {
    /// Path relative to the catalog base URL
    pub fn path(&self) -> String {
        match self {
            Lookup::AllContestants => "queens/all".to_string(),
            Lookup::ContestantByName(_) => "queens".to_string(),
            Lookup::ContestantById(id) => format!("queens/{}", id),
            Lookup::Season(id) => format!("seasons/{}", id),
            Lookup::SeasonEpisodes(id) => format!("seasons/{}/episodes", id),
            Lookup::Episode(id) => format!("episodes/{}", id),
        }
    }

    /// Query parameter, if the lookup carries one
    pub fn query(&self) -> Option<(&'static str, &str)> {
        match self {
            Lookup::ContestantByName(name) => Some(("name", name.as_str())),
            _ => None,
        }
    }
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookup::AllContestants => write!(f, "all contestants"),
            Lookup::ContestantByName(name) => write!(f, "contestant '{}'", name),
            Lookup::ContestantById(id) => write!(f, "contestant #{}", id),
            Lookup::Season(id) => write!(f, "season #{}", id),
            Lookup::SeasonEpisodes(id) => write!(f, "episodes of season #{}", id),
            Lookup::Episode(id) => write!(f, "episode #{}", id),
        }
    }
}

/// Read access to the remote catalog
///
/// Implementors only provide [`Catalog::fetch`]; the typed lookups are built
/// on top of it.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Issue one request and return the parsed JSON body
    async fn fetch(&self, lookup: &Lookup) -> CatalogResult<Value>;

    /// Canonical list of contestant names
    async fn contestant_names(&self) -> CatalogResult<Vec<String>> {
        let value = self.fetch(&Lookup::AllContestants).await?;
        CatalogRecord::list(value)?
            .iter()
            .map(|record| record.text("name"))
            .collect()
    }

    /// First contestant the catalog returns for a name query
    async fn contestant_by_name(&self, name: &str) -> CatalogResult<CatalogRecord> {
        let lookup = Lookup::ContestantByName(name.to_string());
        let value = self.fetch(&lookup).await?;
        CatalogRecord::list(value)?
            .into_iter()
            .next()
            .ok_or_else(|| CatalogError::NotFound(lookup.to_string()))
    }

    async fn contestant_by_id(&self, contestant_id: i64) -> CatalogResult<CatalogRecord> {
        CatalogRecord::from_value(self.fetch(&Lookup::ContestantById(contestant_id)).await?)
    }

    async fn season_by_id(&self, catalog_season_id: i64) -> CatalogResult<CatalogRecord> {
        CatalogRecord::from_value(self.fetch(&Lookup::Season(catalog_season_id)).await?)
    }

    async fn episodes_for_season(&self, catalog_season_id: i64) -> CatalogResult<Vec<CatalogRecord>> {
        CatalogRecord::list(self.fetch(&Lookup::SeasonEpisodes(catalog_season_id)).await?)
    }

    /// Episode addressed by the user-facing number (offset applied here)
    async fn episode_by_offset(&self, episode_number: i64) -> CatalogResult<CatalogRecord> {
        let episode_id = catalog_episode_id(episode_number).ok_or_else(|| {
            CatalogError::InvalidRequest(format!(
                "episode number {} is outside 1 to {}",
                episode_number, MAX_EPISODE_NUMBER
            ))
        })?;
        CatalogRecord::from_value(self.fetch(&Lookup::Episode(episode_id)).await?)
    }
}
