//! User collections and their membership
//!
//! Ownership checks live here so every mutating route goes through
//! [`load_owned_collection`] first.

use super::{is_unique_violation, InsertOutcome};
use sqlx::SqlitePool;
use werk_common::db::{Collection, Contestant};
use werk_common::{Error, Result};

/// Collection plus its member count, for listings
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct CollectionSummary {
    pub guid: String,
    pub user_guid: String,
    pub name: String,
    pub member_count: i64,
}

pub async fn load_collection(pool: &SqlitePool, guid: &str) -> Result<Option<Collection>> {
    let collection = sqlx::query_as::<_, Collection>(
        "SELECT guid, user_guid, name FROM collections WHERE guid = ?",
    )
    .bind(guid)
    .fetch_optional(pool)
    .await?;

    Ok(collection)
}

/// Look up a collection by its natural key (owner, name)
pub async fn find_collection(
    pool: &SqlitePool,
    user_guid: &str,
    name: &str,
) -> Result<Option<Collection>> {
    let collection = sqlx::query_as::<_, Collection>(
        "SELECT guid, user_guid, name FROM collections WHERE user_guid = ? AND name = ?",
    )
    .bind(user_guid)
    .bind(name)
    .fetch_optional(pool)
    .await?;

    Ok(collection)
}

/// Load a collection the given user owns
///
/// Unknown guid → `NotFound`; someone else's collection → `Forbidden`.
pub async fn load_owned_collection(
    pool: &SqlitePool,
    guid: &str,
    user_guid: &str,
) -> Result<Collection> {
    let collection = load_collection(pool, guid)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Collection {}", guid)))?;

    if collection.user_guid != user_guid {
        tracing::warn!(collection = %guid, user = %user_guid, "Rejected change to collection by non-owner");
        return Err(Error::Forbidden(
            "Only the owner may change this collection".to_string(),
        ));
    }

    Ok(collection)
}

/// A user's collections, alphabetical, with member counts
pub async fn list_collections_for_user(
    pool: &SqlitePool,
    user_guid: &str,
) -> Result<Vec<CollectionSummary>> {
    let collections = sqlx::query_as::<_, CollectionSummary>(
        r#"
        SELECT c.guid, c.user_guid, c.name, COUNT(cc.contestant_id) AS member_count
        FROM collections c
        LEFT JOIN collection_contestants cc ON cc.collection_guid = c.guid
        WHERE c.user_guid = ?
        GROUP BY c.guid, c.user_guid, c.name
        ORDER BY c.name COLLATE NOCASE
        "#,
    )
    .bind(user_guid)
    .fetch_all(pool)
    .await?;

    Ok(collections)
}

/// Insert a collection and its initial members in one transaction
///
/// Every member id must already be a stored contestant. If the owner already
/// has a collection with this name nothing is written.
pub async fn insert_collection_with_members(
    pool: &SqlitePool,
    collection: &Collection,
    member_ids: &[i64],
) -> Result<InsertOutcome> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        r#"
        INSERT INTO collections (guid, user_guid, name)
        VALUES (?, ?, ?)
        ON CONFLICT(user_guid, name) DO NOTHING
        "#,
    )
    .bind(&collection.guid)
    .bind(&collection.user_guid)
    .bind(&collection.name)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        tx.rollback().await?;
        return Ok(InsertOutcome::AlreadyPresent);
    }

    for contestant_id in member_ids {
        sqlx::query(
            "INSERT OR IGNORE INTO collection_contestants (collection_guid, contestant_id) VALUES (?, ?)",
        )
        .bind(&collection.guid)
        .bind(contestant_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(InsertOutcome::Inserted)
}

/// Members of a collection, alphabetical
pub async fn list_members(pool: &SqlitePool, collection_guid: &str) -> Result<Vec<Contestant>> {
    let members = sqlx::query_as::<_, Contestant>(
        r#"
        SELECT c.contestant_id, c.name, c.season_winner, c.congeniality, c.quote
        FROM collection_contestants cc
        JOIN contestants c ON c.contestant_id = cc.contestant_id
        WHERE cc.collection_guid = ?
        ORDER BY c.name COLLATE NOCASE, c.contestant_id
        "#,
    )
    .bind(collection_guid)
    .fetch_all(pool)
    .await?;

    Ok(members)
}

/// Attach a stored contestant; `false` if already a member
pub async fn add_member(pool: &SqlitePool, collection_guid: &str, contestant_id: i64) -> Result<bool> {
    let result = sqlx::query(
        "INSERT OR IGNORE INTO collection_contestants (collection_guid, contestant_id) VALUES (?, ?)",
    )
    .bind(collection_guid)
    .bind(contestant_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Detach a contestant; `false` if it was not a member
pub async fn remove_member(
    pool: &SqlitePool,
    collection_guid: &str,
    contestant_id: i64,
) -> Result<bool> {
    let result = sqlx::query(
        "DELETE FROM collection_contestants WHERE collection_guid = ? AND contestant_id = ?",
    )
    .bind(collection_guid)
    .bind(contestant_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Rename a collection; the owner may not end up with two of the same name
pub async fn rename_collection(pool: &SqlitePool, guid: &str, new_name: &str) -> Result<()> {
    let result = sqlx::query("UPDATE collections SET name = ? WHERE guid = ?")
        .bind(new_name)
        .bind(guid)
        .execute(pool)
        .await;

    match result {
        Ok(done) if done.rows_affected() == 0 => {
            Err(Error::NotFound(format!("Collection {}", guid)))
        }
        Ok(_) => Ok(()),
        Err(e) if is_unique_violation(&e) => Err(Error::InvalidInput(format!(
            "You already have a collection named '{}'",
            new_name
        ))),
        Err(e) => Err(e.into()),
    }
}

/// Delete a collection; membership rows cascade, contestants stay
pub async fn delete_collection(pool: &SqlitePool, guid: &str) -> Result<()> {
    sqlx::query("DELETE FROM collections WHERE guid = ?")
        .bind(guid)
        .execute(pool)
        .await?;

    Ok(())
}
