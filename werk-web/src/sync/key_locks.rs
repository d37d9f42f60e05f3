//! Striped per-key async locks
//!
//! Keys hash onto a fixed set of mutexes. Two keys may share a stripe, so a
//! caller must never hold one guard while acquiring another.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use tokio::sync::{Mutex, MutexGuard};

/// Default number of stripes
pub const DEFAULT_STRIPES: usize = 64;

/// Natural key of an entity the synchronizer may create
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityKey {
    Contestant(i64),
    ContestantName(String),
    Season(i64),
    Collection { owner: String, name: String },
}

pub struct KeyLocks {
    stripes: Vec<Mutex<()>>,
}

impl KeyLocks {
    pub fn new(stripe_count: usize) -> Self {
        let stripe_count = stripe_count.max(1);
        Self {
            stripes: (0..stripe_count).map(|_| Mutex::new(())).collect(),
        }
    }

    /// Wait for exclusive access to a key's stripe
    pub async fn lock(&self, key: &EntityKey) -> MutexGuard<'_, ()> {
        self.stripes[self.stripe_for(key)].lock().await
    }

    fn stripe_for(&self, key: &EntityKey) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() % self.stripes.len() as u64) as usize
    }
}

impl Default for KeyLocks {
    fn default() -> Self {
        Self::new(DEFAULT_STRIPES)
    }
}
