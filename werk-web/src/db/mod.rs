//! Local store operations
//!
//! Thin async functions over the tables created by
//! `werk_common::db::init`. Catalog-mirrored rows are written with
//! `ON CONFLICT DO NOTHING` and reported as an [`InsertOutcome`] so callers
//! can tell a fresh insert from a row another writer got to first.

pub mod challenges;
pub mod collections;
pub mod contestants;
pub mod seasons;
pub mod sessions;
pub mod users;

/// Result of an insert that tolerates an existing row with the same key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    AlreadyPresent,
}

impl InsertOutcome {
    pub(crate) fn from_rows_affected(rows: u64) -> Self {
        if rows == 0 {
            InsertOutcome::AlreadyPresent
        } else {
            InsertOutcome::Inserted
        }
    }
}

/// True if the error is a UNIQUE / PRIMARY KEY violation
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db_err| db_err.is_unique_violation())
        .unwrap_or(false)
}
