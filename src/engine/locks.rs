use std::collections::BTreeSet;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::types::AccountId;

/// Per-account serialization points.
///
/// A transfer locks every account it touches before reading any balance.
/// Acquisition is in sorted id order with duplicates collapsed, so two
/// transfers over overlapping account sets can never deadlock; transfers
/// over disjoint sets proceed fully in parallel.
pub(crate) struct AccountLocks {
    locks: DashMap<AccountId, Arc<Mutex<()>>>,
}

impl AccountLocks {
    pub fn new() -> Self {
        Self { locks: DashMap::new() }
    }

    pub async fn acquire<'a>(&self, qrids: impl IntoIterator<Item = &'a AccountId>) -> Vec<OwnedMutexGuard<()>> {
        let ordered: BTreeSet<&AccountId> = qrids.into_iter().collect();
        let mut guards = Vec::with_capacity(ordered.len());

        for qrid in ordered {
            let lock = self.locks.entry(qrid.clone()).or_default().value().clone();
            guards.push(lock.lock_owned().await);
        }

        guards
    }
}
