//! Challenge persistence
//!
//! The catalog never supplies challenges; rows only exist when inserted here.

use sqlx::SqlitePool;
use werk_common::db::Challenge;
use werk_common::{Error, Result};

/// Record a challenge for a stored contestant
pub async fn insert_challenge(
    pool: &SqlitePool,
    contestant_id: i64,
    episode_number: Option<i64>,
    challenge_type: &str,
    description: &str,
) -> Result<Challenge> {
    if challenge_type.trim().is_empty() {
        return Err(Error::InvalidInput("Challenge type is required".to_string()));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO challenges (contestant_id, episode_number, challenge_type, description)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(contestant_id)
    .bind(episode_number)
    .bind(challenge_type.trim())
    .bind(description)
    .execute(pool)
    .await?;

    Ok(Challenge {
        challenge_id: result.last_insert_rowid(),
        contestant_id,
        episode_number,
        challenge_type: challenge_type.trim().to_string(),
        description: description.to_string(),
    })
}

/// Challenges of one contestant, by episode then insertion order
pub async fn list_challenges_for_contestant(
    pool: &SqlitePool,
    contestant_id: i64,
) -> Result<Vec<Challenge>> {
    let challenges = sqlx::query_as::<_, Challenge>(
        r#"
        SELECT challenge_id, contestant_id, episode_number, challenge_type, description
        FROM challenges
        WHERE contestant_id = ?
        ORDER BY episode_number IS NULL, episode_number, challenge_id
        "#,
    )
    .bind(contestant_id)
    .fetch_all(pool)
    .await?;

    Ok(challenges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::contestants::insert_contestant;
    use tempfile::TempDir;
    use werk_common::db::{init_database, Contestant};

    #[tokio::test]
    async fn test_challenges_listed_in_episode_order() {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_database(&temp_dir.path().join("werk.db")).await.unwrap();
        insert_contestant(
            &pool,
            &Contestant {
                contestant_id: 5,
                name: "Sasha Velour".to_string(),
                season_winner: true,
                congeniality: false,
                quote: String::new(),
            },
        )
        .await
        .unwrap();

        insert_challenge(&pool, 5, None, "mini", "Reading").await.unwrap();
        insert_challenge(&pool, 5, Some(9), "main", "Finale").await.unwrap();
        insert_challenge(&pool, 5, Some(2), "main", "Ball").await.unwrap();

        let listed = list_challenges_for_contestant(&pool, 5).await.unwrap();
        let order: Vec<_> = listed.iter().map(|c| c.episode_number).collect();
        assert_eq!(order, vec![Some(2), Some(9), None]);
    }

    #[tokio::test]
    async fn test_challenge_for_unknown_contestant_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_database(&temp_dir.path().join("werk.db")).await.unwrap();

        let result = insert_challenge(&pool, 404, Some(1), "main", "").await;
        assert!(matches!(result, Err(Error::Database(_))));

        let blank = insert_challenge(&pool, 404, Some(1), "  ", "").await;
        assert!(matches!(blank, Err(Error::InvalidInput(_))));
    }
}
