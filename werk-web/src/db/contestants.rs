//! Contestant persistence

use super::InsertOutcome;
use sqlx::SqlitePool;
use werk_common::db::Contestant;
use werk_common::Result;

/// Insert a contestant unless its catalog id is already stored
pub async fn insert_contestant(pool: &SqlitePool, contestant: &Contestant) -> Result<InsertOutcome> {
    let result = sqlx::query(
        r#"
        INSERT INTO contestants (contestant_id, name, season_winner, congeniality, quote)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(contestant_id) DO NOTHING
        "#,
    )
    .bind(contestant.contestant_id)
    .bind(&contestant.name)
    .bind(contestant.season_winner)
    .bind(contestant.congeniality)
    .bind(&contestant.quote)
    .execute(pool)
    .await?;

    Ok(InsertOutcome::from_rows_affected(result.rows_affected()))
}

/// Load contestant by catalog id
pub async fn load_contestant(pool: &SqlitePool, contestant_id: i64) -> Result<Option<Contestant>> {
    let contestant = sqlx::query_as::<_, Contestant>(
        r#"
        SELECT contestant_id, name, season_winner, congeniality, quote
        FROM contestants
        WHERE contestant_id = ?
        "#,
    )
    .bind(contestant_id)
    .fetch_optional(pool)
    .await?;

    Ok(contestant)
}

/// Load contestant by exact name (lowest id wins if names repeat)
pub async fn load_contestant_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Contestant>> {
    let contestant = sqlx::query_as::<_, Contestant>(
        r#"
        SELECT contestant_id, name, season_winner, congeniality, quote
        FROM contestants
        WHERE name = ?
        ORDER BY contestant_id
        LIMIT 1
        "#,
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;

    Ok(contestant)
}

/// All stored contestants, alphabetical
pub async fn list_contestants(pool: &SqlitePool) -> Result<Vec<Contestant>> {
    let contestants = sqlx::query_as::<_, Contestant>(
        r#"
        SELECT contestant_id, name, season_winner, congeniality, quote
        FROM contestants
        ORDER BY name COLLATE NOCASE, contestant_id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(contestants)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use werk_common::db::init_database;

    fn jinkx() -> Contestant {
        Contestant {
            contestant_id: 77,
            name: "Jinkx Monsoon".to_string(),
            season_winner: true,
            congeniality: false,
            quote: "Water off a duck's back".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_database(&temp_dir.path().join("werk.db")).await.unwrap();

        let outcome = insert_contestant(&pool, &jinkx()).await.unwrap();
        assert_eq!(outcome, InsertOutcome::Inserted);

        let loaded = load_contestant(&pool, 77).await.unwrap().unwrap();
        assert_eq!(loaded, jinkx());

        let by_name = load_contestant_by_name(&pool, "Jinkx Monsoon").await.unwrap();
        assert_eq!(by_name, Some(jinkx()));
        assert!(load_contestant(&pool, 78).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_second_insert_keeps_first_row() {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_database(&temp_dir.path().join("werk.db")).await.unwrap();

        insert_contestant(&pool, &jinkx()).await.unwrap();
        let mut changed = jinkx();
        changed.quote = "different".to_string();

        let outcome = insert_contestant(&pool, &changed).await.unwrap();
        assert_eq!(outcome, InsertOutcome::AlreadyPresent);

        let loaded = load_contestant(&pool, 77).await.unwrap().unwrap();
        assert_eq!(loaded.quote, "Water off a duck's back");
    }
}
