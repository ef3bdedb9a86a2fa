// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Keyed mutual exclusion for naming decisions.
//!
//! Collision resolution reads cluster state and then claims a resource name
//! based on what it saw. Two reconciles racing over the same controller name
//! prefix could both observe the name as free and both claim it, so the
//! reconciler serializes the decision per prefix with a [`KeyedMutexSet`]:
//! hash the key onto a fixed set of async mutexes and hold the shard's lock
//! across the read-decide-write window.
//!
//! Keys are never registered or removed; unrelated keys hashing onto the same
//! shard serialize against each other, which costs a little concurrency and
//! never correctness.

use sha2::{Digest, Sha256};
use tokio::sync::{Mutex, MutexGuard};

/// Number of mutex shards.
///
/// Plenty for the handful of instances a cluster realistically runs; the set
/// is sized for negligible false sharing, not for uniqueness.
pub const LOCK_SHARDS: usize = 64;

/// A fixed set of mutexes indexed by hashed key.
///
/// Equal keys always map to the same mutex, in every process, on every
/// platform: the shard index comes from a SHA-256 prefix rather than the
/// standard library's per-process seeded hasher.
pub struct KeyedMutexSet {
    shards: [Mutex<()>; LOCK_SHARDS],
}

impl KeyedMutexSet {
    /// Creates the shard set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            shards: std::array::from_fn(|_| Mutex::new(())),
        }
    }

    fn shard_index(key: &str) -> usize {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        let digest = hasher.finalize();

        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        usize::try_from(u64::from_be_bytes(prefix) % LOCK_SHARDS as u64).unwrap_or(0)
    }

    /// Acquires the mutex for `key`, waiting until it is free.
    ///
    /// The returned guard releases the mutex on drop. Callers hold it across
    /// `.await` points; it must not be held across a full requeue cycle.
    pub async fn lock(&self, key: &str) -> MutexGuard<'_, ()> {
        self.shards[Self::shard_index(key)].lock().await
    }
}

impl Default for KeyedMutexSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "locks_tests.rs"]
mod locks_tests;
