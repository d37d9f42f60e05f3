//! User accounts

use super::is_unique_violation;
use sqlx::SqlitePool;
use uuid::Uuid;
use werk_common::api::{hash_password, verify_password};
use werk_common::db::User;
use werk_common::{Error, Result};

/// Create a user with a freshly salted password hash
///
/// A taken username is reported as `InvalidInput`.
pub async fn create_user(pool: &SqlitePool, username: &str, password: &str) -> Result<User> {
    let stored = hash_password(password);
    let user = User {
        guid: Uuid::new_v4().to_string(),
        username: username.to_string(),
        password_hash: stored.hash,
        password_salt: stored.salt,
    };

    let result = sqlx::query(
        "INSERT INTO users (guid, username, password_hash, password_salt) VALUES (?, ?, ?, ?)",
    )
    .bind(&user.guid)
    .bind(&user.username)
    .bind(&user.password_hash)
    .bind(&user.password_salt)
    .execute(pool)
    .await;

    match result {
        Ok(_) => {
            tracing::info!(username = %user.username, "Registered user");
            Ok(user)
        }
        Err(e) if is_unique_violation(&e) => Err(Error::InvalidInput(
            "Username already taken".to_string(),
        )),
        Err(e) => Err(e.into()),
    }
}

pub async fn load_user(pool: &SqlitePool, guid: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT guid, username, password_hash, password_salt FROM users WHERE guid = ?",
    )
    .bind(guid)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn load_user_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT guid, username, password_hash, password_salt FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// User whose password matches, `None` for unknown user or wrong password
pub async fn authenticate(pool: &SqlitePool, username: &str, password: &str) -> Result<Option<User>> {
    let Some(user) = load_user_by_username(pool, username).await? else {
        return Ok(None);
    };

    if verify_password(password, &user.password_hash, &user.password_salt) {
        Ok(Some(user))
    } else {
        Ok(None)
    }
}
