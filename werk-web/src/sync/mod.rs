//! Get-or-create synchronization between the catalog and the local store
//!
//! Every `ensure_*` call follows the same shape:
//!
//! 1. Look the entity up locally by its natural key; a hit is returned as is
//!    (stored rows are never refreshed).
//! 2. On a miss, take the key's lock and look again, since a concurrent
//!    caller may have created it meanwhile.
//! 3. Fetch from the catalog and map every field before anything is written.
//! 4. Persist in one transaction with `ON CONFLICT DO NOTHING`, then read the
//!    stored row back. A conflict here means another process won the race;
//!    the winner's row is returned.
//!
//! Catalog or mapping failures become [`SyncError::SyncFailed`] and leave the
//! store untouched.

pub mod key_locks;

use crate::catalog::{catalog_season_id, Catalog, CatalogError, CatalogRecord, CatalogResult};
use crate::db::seasons::NewEpisode;
use crate::db::{collections, contestants, seasons, InsertOutcome};
use key_locks::{EntityKey, KeyLocks};
use sqlx::SqlitePool;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;
use werk_common::db::{Collection, Contestant, Season, SeasonWithEpisodes};

/// Synchronizer errors
#[derive(Debug, Error)]
pub enum SyncError {
    /// Catalog unreachable, entity unknown, or response unusable
    #[error("Could not load {key}: {source}")]
    SyncFailed {
        key: String,
        #[source]
        source: CatalogError,
    },

    #[error("Invalid input: {0}")]
    ValidationFailed(String),

    #[error(transparent)]
    Store(#[from] werk_common::Error),
}

impl From<sqlx::Error> for SyncError {
    fn from(err: sqlx::Error) -> Self {
        SyncError::Store(err.into())
    }
}

pub type SyncResult<T> = Result<T, SyncError>;

fn sync_failed(key: impl Into<String>) -> impl FnOnce(CatalogError) -> SyncError {
    let key = key.into();
    move |source| SyncError::SyncFailed { key, source }
}

fn vanished(what: String) -> SyncError {
    SyncError::Store(werk_common::Error::Internal(format!(
        "{} missing right after insert",
        what
    )))
}

/// Lazily mirrors catalog entities into the local store
pub struct Synchronizer {
    pool: SqlitePool,
    catalog: Arc<dyn Catalog>,
    locks: KeyLocks,
}

impl Synchronizer {
    pub fn new(pool: SqlitePool, catalog: Arc<dyn Catalog>) -> Self {
        Self {
            pool,
            catalog,
            locks: KeyLocks::default(),
        }
    }

    /// Stored contestant for a catalog id, fetching it on first use
    pub async fn ensure_contestant(&self, contestant_id: i64) -> SyncResult<Contestant> {
        if let Some(contestant) = contestants::load_contestant(&self.pool, contestant_id).await? {
            return Ok(contestant);
        }

        let _guard = self.locks.lock(&EntityKey::Contestant(contestant_id)).await;
        if let Some(contestant) = contestants::load_contestant(&self.pool, contestant_id).await? {
            debug!(contestant_id, "Contestant created by concurrent caller");
            return Ok(contestant);
        }

        let key = format!("contestant #{}", contestant_id);
        let record = self
            .catalog
            .contestant_by_id(contestant_id)
            .await
            .map_err(sync_failed(key.clone()))?;
        let contestant = map_contestant(&record).map_err(sync_failed(key.clone()))?;
        if contestant.contestant_id != contestant_id {
            return Err(SyncError::SyncFailed {
                key,
                source: CatalogError::MalformedResponse(format!(
                    "asked for id {} but catalog returned id {}",
                    contestant_id, contestant.contestant_id
                )),
            });
        }

        self.persist_contestant(&contestant).await
    }

    /// Stored contestant for a name, fetching by name on a local miss
    ///
    /// The row is keyed by the catalog id the name query returns, so a name
    /// that resolves to an already stored id yields that stored row.
    pub async fn ensure_contestant_by_name(&self, name: &str) -> SyncResult<Contestant> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SyncError::ValidationFailed(
                "Contestant name is required".to_string(),
            ));
        }

        if let Some(contestant) = contestants::load_contestant_by_name(&self.pool, name).await? {
            return Ok(contestant);
        }

        let _guard = self
            .locks
            .lock(&EntityKey::ContestantName(name.to_string()))
            .await;
        if let Some(contestant) = contestants::load_contestant_by_name(&self.pool, name).await? {
            debug!(name = %name, "Contestant created by concurrent caller");
            return Ok(contestant);
        }

        let key = format!("contestant '{}'", name);
        let record = self
            .catalog
            .contestant_by_name(name)
            .await
            .map_err(sync_failed(key.clone()))?;
        let contestant = map_contestant(&record).map_err(sync_failed(key))?;

        self.persist_contestant(&contestant).await
    }

    async fn persist_contestant(&self, contestant: &Contestant) -> SyncResult<Contestant> {
        match contestants::insert_contestant(&self.pool, contestant).await? {
            InsertOutcome::Inserted => {
                info!(contestant_id = contestant.contestant_id, name = %contestant.name, "Stored contestant");
            }
            InsertOutcome::AlreadyPresent => {
                info!(
                    contestant_id = contestant.contestant_id,
                    "Duplicate key race on contestant absorbed"
                );
            }
        }

        contestants::load_contestant(&self.pool, contestant.contestant_id)
            .await?
            .ok_or_else(|| vanished(format!("contestant #{}", contestant.contestant_id)))
    }

    /// Stored season with all its episodes, fetching both on first use
    ///
    /// `season_number` is the public number (1..=12); it is mapped to the
    /// catalog season id before any lookup.
    pub async fn ensure_season(&self, season_number: i64) -> SyncResult<SeasonWithEpisodes> {
        let season_id = catalog_season_id(season_number).ok_or_else(|| {
            SyncError::ValidationFailed(format!(
                "Season number must be between 1 and {}",
                crate::catalog::MAX_SEASON_NUMBER
            ))
        })?;

        if let Some(stored) = seasons::load_season_with_episodes(&self.pool, season_id).await? {
            return Ok(stored);
        }

        let _guard = self.locks.lock(&EntityKey::Season(season_id)).await;
        if let Some(stored) = seasons::load_season_with_episodes(&self.pool, season_id).await? {
            debug!(season_id, "Season created by concurrent caller");
            return Ok(stored);
        }

        let key = format!("season {}", season_number);
        let record = self
            .catalog
            .season_by_id(season_id)
            .await
            .map_err(sync_failed(key.clone()))?;
        let season = map_season(&record, season_id).map_err(sync_failed(key.clone()))?;

        let episode_records = self
            .catalog
            .episodes_for_season(season_id)
            .await
            .map_err(sync_failed(key.clone()))?;
        let episodes = episode_records
            .iter()
            .map(map_episode)
            .collect::<CatalogResult<Vec<_>>>()
            .map_err(sync_failed(key))?;

        match seasons::insert_season_with_episodes(&self.pool, &season, &episodes).await? {
            InsertOutcome::Inserted => info!(
                season_id,
                season_number,
                episodes = episodes.len(),
                "Stored season"
            ),
            InsertOutcome::AlreadyPresent => {
                info!(season_id, "Duplicate key race on season absorbed")
            }
        }

        seasons::load_season_with_episodes(&self.pool, season_id)
            .await?
            .ok_or_else(|| vanished(format!("season #{}", season_id)))
    }

    /// Owner's collection by name, creating it with the given members if absent
    ///
    /// When the collection already exists `contestant_ids` is ignored; use
    /// [`Synchronizer::add_member`] and [`Synchronizer::remove_member`] to edit
    /// an existing collection. Members are resolved before the collection row
    /// is written, so a failed lookup leaves nothing behind.
    pub async fn ensure_collection(
        &self,
        name: &str,
        owner_guid: &str,
        contestant_ids: &[i64],
    ) -> SyncResult<Collection> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SyncError::ValidationFailed(
                "Collection name is required".to_string(),
            ));
        }

        if let Some(existing) = collections::find_collection(&self.pool, owner_guid, name).await? {
            warn_ignored_members(&existing, contestant_ids);
            return Ok(existing);
        }

        // Resolve members without holding any key lock
        let mut member_ids: Vec<i64> = Vec::with_capacity(contestant_ids.len());
        for &contestant_id in contestant_ids {
            if member_ids.contains(&contestant_id) {
                continue;
            }
            let contestant = self.ensure_contestant(contestant_id).await?;
            member_ids.push(contestant.contestant_id);
        }

        let _guard = self
            .locks
            .lock(&EntityKey::Collection {
                owner: owner_guid.to_string(),
                name: name.to_string(),
            })
            .await;

        let collection = Collection {
            guid: Uuid::new_v4().to_string(),
            user_guid: owner_guid.to_string(),
            name: name.to_string(),
        };

        match collections::insert_collection_with_members(&self.pool, &collection, &member_ids)
            .await?
        {
            InsertOutcome::Inserted => {
                info!(collection = %collection.guid, name = %name, members = member_ids.len(), "Created collection");
                Ok(collection)
            }
            InsertOutcome::AlreadyPresent => {
                let existing = collections::find_collection(&self.pool, owner_guid, name)
                    .await?
                    .ok_or_else(|| vanished(format!("collection '{}'", name)))?;
                warn_ignored_members(&existing, contestant_ids);
                Ok(existing)
            }
        }
    }

    /// Add a contestant (fetched if needed) to a collection the caller owns
    pub async fn add_member(
        &self,
        collection_guid: &str,
        owner_guid: &str,
        contestant_id: i64,
    ) -> SyncResult<Contestant> {
        let collection =
            collections::load_owned_collection(&self.pool, collection_guid, owner_guid).await?;
        let contestant = self.ensure_contestant(contestant_id).await?;

        if collections::add_member(&self.pool, &collection.guid, contestant.contestant_id).await? {
            info!(collection = %collection.guid, contestant_id, "Added collection member");
        }

        Ok(contestant)
    }

    /// Remove a contestant from a collection the caller owns
    ///
    /// Returns `false` if it was not a member.
    pub async fn remove_member(
        &self,
        collection_guid: &str,
        owner_guid: &str,
        contestant_id: i64,
    ) -> SyncResult<bool> {
        let collection =
            collections::load_owned_collection(&self.pool, collection_guid, owner_guid).await?;
        let removed = collections::remove_member(&self.pool, &collection.guid, contestant_id).await?;

        if removed {
            info!(collection = %collection.guid, contestant_id, "Removed collection member");
        }

        Ok(removed)
    }
}

fn warn_ignored_members(existing: &Collection, contestant_ids: &[i64]) {
    if !contestant_ids.is_empty() {
        warn!(
            collection = %existing.guid,
            name = %existing.name,
            ignored = contestant_ids.len(),
            "Collection already exists; requested members were not applied"
        );
    }
}

fn map_contestant(record: &CatalogRecord) -> CatalogResult<Contestant> {
    Ok(Contestant {
        contestant_id: record.int("id")?,
        name: record.text("name")?,
        season_winner: record.flag("winner")?,
        congeniality: record.flag("missCongeniality")?,
        quote: record.opt_text("quote")?.unwrap_or_default(),
    })
}

fn map_season(record: &CatalogRecord, season_id: i64) -> CatalogResult<Season> {
    Ok(Season {
        season_id,
        season_number: record.int("seasonNumber")?,
        winner_id: record.opt_int("winnerId")?,
    })
}

fn map_episode(record: &CatalogRecord) -> CatalogResult<NewEpisode> {
    Ok(NewEpisode {
        episode_number: record.int("episodeInSeason")?,
        title: record.text("title")?,
    })
}
