use std::collections::HashMap;

use crate::error::WatchError;
use crate::repo::{Repository, SubscriptionChange, SubscriptionState};

/// Client-side entity cache, keyed by `"Repository:{id}"`.
///
/// Owned by the GUI event loop and mutated only from completion handling,
/// so it carries no locks. Entries are created by the organization query
/// and overwritten by subscription updates; nothing deletes them.
#[derive(Debug, Clone, Default)]
pub struct RepoCache {
    entries: HashMap<String, Repository>,
}

impl RepoCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Composite key identifying a cached repository by type and id.
    pub fn entry_key(repository_id: &str) -> String {
        format!("Repository:{repository_id}")
    }

    pub fn read_entry(&self, repository_id: &str) -> Option<&Repository> {
        self.entries.get(&Self::entry_key(repository_id))
    }

    pub fn write_entry(&mut self, repository: Repository) {
        self.entries
            .insert(Self::entry_key(&repository.id), repository);
    }

    /// Upsert a batch of repositories from a query result.
    pub fn populate(&mut self, repositories: impl IntoIterator<Item = Repository>) {
        for repository in repositories {
            self.write_entry(repository);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Reconcile the cache with a subscription mutation result.
///
/// The watcher count moves by exactly one relative to the stored value:
/// +1 when the new state is `Subscribed`, -1 when it is `Unsubscribed`.
/// The count is never recomputed from scratch and never clamped, so a
/// stale subscription state can drive it negative. All other fields are
/// carried over unchanged; the subscription state is set to the new value.
///
/// Fails with [`WatchError::MissingEntry`] when no entry exists for the
/// repository, leaving the cache untouched.
pub fn apply_subscription_update(
    cache: &mut RepoCache,
    change: &SubscriptionChange,
) -> Result<Repository, WatchError> {
    let current = cache
        .read_entry(&change.repository_id)
        .cloned()
        .ok_or_else(|| WatchError::MissingEntry(RepoCache::entry_key(&change.repository_id)))?;

    let watcher_count = match change.state {
        SubscriptionState::Subscribed => current.watcher_count + 1,
        SubscriptionState::Unsubscribed => current.watcher_count - 1,
    };

    let updated = Repository {
        watcher_count,
        viewer_subscription: change.state,
        ..current
    };
    cache.write_entry(updated.clone());
    Ok(updated)
}
