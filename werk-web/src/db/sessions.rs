//! Server-side login sessions

use sqlx::SqlitePool;
use werk_common::api::generate_session_token;
use werk_common::db::User;
use werk_common::time::{hours_from_now, now, to_db_string};
use werk_common::Result;

/// Start a session for a user, returning the cookie token
pub async fn create_session(pool: &SqlitePool, user_guid: &str, ttl_hours: i64) -> Result<String> {
    let token = generate_session_token();

    sqlx::query(
        "INSERT INTO sessions (token, user_guid, created_at, expires_at) VALUES (?, ?, ?, ?)",
    )
    .bind(&token)
    .bind(user_guid)
    .bind(to_db_string(now()))
    .bind(to_db_string(hours_from_now(ttl_hours)))
    .execute(pool)
    .await?;

    Ok(token)
}

/// User owning an unexpired session token
pub async fn load_session_user(pool: &SqlitePool, token: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT u.guid, u.username, u.password_hash, u.password_salt
        FROM sessions s
        JOIN users u ON u.guid = s.user_guid
        WHERE s.token = ? AND s.expires_at > ?
        "#,
    )
    .bind(token)
    .bind(to_db_string(now()))
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn delete_session(pool: &SqlitePool, token: &str) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await?;

    Ok(())
}

/// Drop expired sessions, returning how many were removed
pub async fn purge_expired_sessions(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
        .bind(to_db_string(now()))
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
