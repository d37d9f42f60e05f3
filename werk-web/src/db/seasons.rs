//! Season and episode persistence
//!
//! A season is only ever written together with its episodes, in one
//! transaction, so a stored season always has its full episode list.

use super::InsertOutcome;
use sqlx::SqlitePool;
use werk_common::db::{Episode, Season, SeasonWithEpisodes};
use werk_common::Result;

/// Episode as mapped from the catalog, before it has a row id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEpisode {
    pub episode_number: i64,
    pub title: String,
}

/// Insert a season and all of its episodes atomically
///
/// If the season id is already stored nothing is written and
/// `AlreadyPresent` is returned.
pub async fn insert_season_with_episodes(
    pool: &SqlitePool,
    season: &Season,
    episodes: &[NewEpisode],
) -> Result<InsertOutcome> {
    let mut tx = pool.begin().await?;

    // Write first so the transaction takes the write lock up front
    let result = sqlx::query(
        r#"
        INSERT INTO seasons (season_id, season_number, winner_id)
        VALUES (?, ?, ?)
        ON CONFLICT(season_id) DO NOTHING
        "#,
    )
    .bind(season.season_id)
    .bind(season.season_number)
    .bind(season.winner_id)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        tx.rollback().await?;
        return Ok(InsertOutcome::AlreadyPresent);
    }

    for episode in episodes {
        sqlx::query("INSERT INTO episodes (season_id, episode_number, title) VALUES (?, ?, ?)")
            .bind(season.season_id)
            .bind(episode.episode_number)
            .bind(&episode.title)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    Ok(InsertOutcome::Inserted)
}

/// Load season by catalog season id
pub async fn load_season(pool: &SqlitePool, season_id: i64) -> Result<Option<Season>> {
    let season = sqlx::query_as::<_, Season>(
        "SELECT season_id, season_number, winner_id FROM seasons WHERE season_id = ?",
    )
    .bind(season_id)
    .fetch_optional(pool)
    .await?;

    Ok(season)
}

/// Episodes of a season ordered by in-season number
pub async fn load_episodes(pool: &SqlitePool, season_id: i64) -> Result<Vec<Episode>> {
    let episodes = sqlx::query_as::<_, Episode>(
        r#"
        SELECT id, season_id, episode_number, title
        FROM episodes
        WHERE season_id = ?
        ORDER BY episode_number, id
        "#,
    )
    .bind(season_id)
    .fetch_all(pool)
    .await?;

    Ok(episodes)
}

pub async fn load_season_with_episodes(
    pool: &SqlitePool,
    season_id: i64,
) -> Result<Option<SeasonWithEpisodes>> {
    let Some(season) = load_season(pool, season_id).await? else {
        return Ok(None);
    };
    let episodes = load_episodes(pool, season_id).await?;

    Ok(Some(SeasonWithEpisodes { season, episodes }))
}

/// All stored seasons by season number
pub async fn list_seasons(pool: &SqlitePool) -> Result<Vec<Season>> {
    let seasons = sqlx::query_as::<_, Season>(
        "SELECT season_id, season_number, winner_id FROM seasons ORDER BY season_number, season_id",
    )
    .fetch_all(pool)
    .await?;

    Ok(seasons)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use werk_common::db::init_database;

    fn episodes(n: i64) -> Vec<NewEpisode> {
        (1..=n)
            .rev()
            .map(|i| NewEpisode {
                episode_number: i,
                title: format!("Episode {}", i),
            })
            .collect()
    }

    #[tokio::test]
    async fn test_season_written_with_episodes_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_database(&temp_dir.path().join("werk.db")).await.unwrap();
        let season = Season {
            season_id: 7,
            season_number: 6,
            winner_id: Some(50),
        };

        let outcome = insert_season_with_episodes(&pool, &season, &episodes(4))
            .await
            .unwrap();
        assert_eq!(outcome, InsertOutcome::Inserted);

        let loaded = load_season_with_episodes(&pool, 7).await.unwrap().unwrap();
        assert_eq!(loaded.season, season);
        let numbers: Vec<_> = loaded.episodes.iter().map(|e| e.episode_number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_existing_season_not_duplicated() {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_database(&temp_dir.path().join("werk.db")).await.unwrap();
        let season = Season {
            season_id: 3,
            season_number: 3,
            winner_id: None,
        };

        insert_season_with_episodes(&pool, &season, &episodes(2)).await.unwrap();
        let second = insert_season_with_episodes(&pool, &season, &episodes(5))
            .await
            .unwrap();

        assert_eq!(second, InsertOutcome::AlreadyPresent);
        assert_eq!(load_episodes(&pool, 3).await.unwrap().len(), 2);
        assert!(load_season_with_episodes(&pool, 4).await.unwrap().is_none());
    }
}
