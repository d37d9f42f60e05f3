//! Form input validation
//!
//! Each check returns the message to show next to the form on failure.

use crate::catalog::{catalog_episode_id, catalog_season_id, MAX_EPISODE_NUMBER, MAX_SEASON_NUMBER};

/// Collection names may not contain this (case-insensitive)
pub const RESERVED_COLLECTION_WORD: &str = "rupaul";

pub const MAX_USERNAME_LEN: usize = 64;
pub const MAX_COLLECTION_NAME_LEN: usize = 255;

/// Letters, digits, dots or underscores, starting with a letter
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() || username.len() > MAX_USERNAME_LEN {
        return Err(format!(
            "Username must be between 1 and {} characters",
            MAX_USERNAME_LEN
        ));
    }

    let mut chars = username.chars();
    let starts_with_letter = chars.next().map_or(false, |c| c.is_ascii_alphabetic());
    let rest_allowed = chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
    if !starts_with_letter || !rest_allowed {
        return Err(
            "Usernames must have only letters, numbers, dots or underscores and start with a letter"
                .to_string(),
        );
    }

    Ok(())
}

pub fn validate_passwords(password: &str, confirm: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }
    if password != confirm {
        return Err("Passwords must match".to_string());
    }
    Ok(())
}

/// Trimmed collection name, or why it is not allowed
pub fn validate_collection_name(name: &str) -> Result<String, String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Collection name is required".to_string());
    }
    if name.len() > MAX_COLLECTION_NAME_LEN {
        return Err(format!(
            "Collection name must be at most {} characters",
            MAX_COLLECTION_NAME_LEN
        ));
    }
    if name.to_lowercase().contains(RESERVED_COLLECTION_WORD) {
        return Err("Collection names may not mention RuPaul".to_string());
    }
    Ok(name.to_string())
}

/// Public season number in 1..=12
pub fn parse_season_number(input: &str) -> Result<i64, String> {
    input
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|n| catalog_season_id(*n).is_some())
        .ok_or_else(|| format!("Enter a season number from 1 to {}", MAX_SEASON_NUMBER))
}

/// Episode number in 1..=MAX_EPISODE_NUMBER
pub fn parse_episode_number(input: &str) -> Result<i64, String> {
    input
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|n| catalog_episode_id(*n).is_some())
        .ok_or_else(|| format!("Enter an episode number from 1 to {}", MAX_EPISODE_NUMBER))
}

/// Name must appear in the catalog's canonical list
pub fn validate_contestant_name(name: &str, canonical_names: &[String]) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Contestant name is required".to_string());
    }
    if canonical_names.iter().any(|n| n == name.trim()) {
        Ok(())
    } else {
        Err(format!(
            "'{}' is not a contestant. Check the spelling and capitalization.",
            name.trim()
        ))
    }
}

/// Redirect target after login; only local absolute paths are honored
pub fn safe_next_path(next: Option<&str>) -> String {
    match next {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && path.chars().all(|c| c.is_ascii_graphic() && c != '\\') =>
        {
            path.to_string()
        }
        _ => "/".to_string(),
    }
}
