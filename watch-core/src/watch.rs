use std::collections::HashMap;

use crate::cache::{apply_subscription_update, RepoCache};
use crate::error::WatchError;
use crate::repo::{Repository, SubscriptionChange};

/// Drives the optimistic watch/unwatch flow for individual repositories.
///
/// For every in-flight mutation the controller keeps the pre-optimistic
/// cache entry. The optimistic patch is applied synchronously on toggle;
/// when the authoritative response arrives the snapshot is restored and
/// the patch is replayed with the real payload, so the net effect on the
/// watcher count is a single increment or decrement. A failed mutation
/// rolls the entry back to the snapshot.
#[derive(Debug, Default)]
pub struct WatchController {
    pending: HashMap<String, Repository>,
}

impl WatchController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self, repository_id: &str) -> bool {
        self.pending.contains_key(repository_id)
    }

    /// Start toggling the subscription of a repository.
    ///
    /// Flips the displayed state immediately via the cache patch and
    /// returns the optimistic payload, which doubles as the mutation
    /// input. Errors with [`WatchError::MissingEntry`] when the
    /// repository is not cached and [`WatchError::MutationInFlight`]
    /// when a mutation for it is already pending; the cache is untouched
    /// in both cases.
    pub fn begin_toggle(
        &mut self,
        cache: &mut RepoCache,
        repository_id: &str,
    ) -> Result<SubscriptionChange, WatchError> {
        if self.is_pending(repository_id) {
            return Err(WatchError::MutationInFlight(repository_id.to_owned()));
        }
        let current = cache
            .read_entry(repository_id)
            .cloned()
            .ok_or_else(|| WatchError::MissingEntry(RepoCache::entry_key(repository_id)))?;

        let optimistic = SubscriptionChange {
            repository_id: repository_id.to_owned(),
            state: current.viewer_subscription.toggled(),
        };
        apply_subscription_update(cache, &optimistic)?;
        self.pending.insert(repository_id.to_owned(), current);
        Ok(optimistic)
    }

    /// Commit the authoritative mutation result.
    ///
    /// Drops the optimistic layer by restoring the snapshot, then applies
    /// the cache patch with the real payload. Without a pending snapshot
    /// this degenerates to a plain patch.
    pub fn settle(
        &mut self,
        cache: &mut RepoCache,
        change: &SubscriptionChange,
    ) -> Result<Repository, WatchError> {
        if let Some(prior) = self.pending.remove(&change.repository_id) {
            cache.write_entry(prior);
        }
        apply_subscription_update(cache, change)
    }

    /// Roll back the optimistic change after a failed mutation.
    ///
    /// Returns whether a pending snapshot was restored.
    pub fn fail(&mut self, cache: &mut RepoCache, repository_id: &str) -> bool {
        match self.pending.remove(repository_id) {
            Some(prior) => {
                cache.write_entry(prior);
                true
            }
            None => false,
        }
    }
}
