//! Database models
//!
//! Row shapes for every table created in [`crate::db::init`]. Guids are stored
//! as TEXT, so they are carried as `String` here.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub guid: String,
    pub username: String,
    pub password_hash: String,
    pub password_salt: String,
}

/// Contestant mirrored from the catalog; `contestant_id` is the catalog id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Contestant {
    pub contestant_id: i64,
    pub name: String,
    pub season_winner: bool,
    pub congeniality: bool,
    pub quote: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Challenge {
    pub challenge_id: i64,
    pub contestant_id: i64,
    pub episode_number: Option<i64>,
    pub challenge_type: String,
    pub description: String,
}

/// Season mirrored from the catalog; `season_id` is the catalog season id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Season {
    pub season_id: i64,
    pub season_number: i64,
    pub winner_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Episode {
    pub id: i64,
    pub season_id: i64,
    pub episode_number: i64,
    pub title: String,
}

/// A season together with its episodes, ordered by episode number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonWithEpisodes {
    pub season: Season,
    pub episodes: Vec<Episode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Collection {
    pub guid: String,
    pub user_guid: String,
    pub name: String,
}
