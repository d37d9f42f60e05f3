//! Public season/episode numbers to catalog ids
//!
//! The catalog interleaves non-regular seasons with the regular ones, so the
//! user-facing season number is shifted before every lookup.

/// Highest regular season number the catalog is mapped for
pub const MAX_SEASON_NUMBER: i64 = 12;

/// Sequential catalog episode id = user-facing episode number + this offset
pub const EPISODE_ID_OFFSET: i64 = 7;

/// Largest public episode number accepted for a title lookup
pub const MAX_EPISODE_NUMBER: i64 = 10_000;

/// Catalog season id for a public season number, `None` outside 1..=12
pub fn catalog_season_id(season_number: i64) -> Option<i64> {
    match season_number {
        1..=4 => Some(season_number),
        5..=8 => Some(season_number + 1),
        9..=MAX_SEASON_NUMBER => Some(season_number + 2),
        _ => None,
    }
}

/// Catalog episode id for a public episode number, `None` outside 1..=MAX_EPISODE_NUMBER
pub fn catalog_episode_id(episode_number: i64) -> Option<i64> {
    if !(1..=MAX_EPISODE_NUMBER).contains(&episode_number) {
        return None;
    }
    episode_number.checked_add(EPISODE_ID_OFFSET)
}
