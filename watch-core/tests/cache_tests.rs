use watch_core::{
    apply_subscription_update, RepoCache, Repository, SubscriptionChange, SubscriptionState,
    WatchError,
};

fn repository(id: &str, watcher_count: i64, state: SubscriptionState) -> Repository {
    Repository {
        id: id.into(),
        name: format!("repo-{id}"),
        url: format!("https://github.com/acme/repo-{id}"),
        watcher_count,
        viewer_subscription: state,
    }
}

#[test]
fn entry_key_is_type_qualified() {
    assert_eq!(RepoCache::entry_key("MDEwOlJl"), "Repository:MDEwOlJl");
}

#[test]
fn subscribe_increments_count_and_flips_state() {
    let mut cache = RepoCache::new();
    cache.write_entry(repository("r1", 5, SubscriptionState::Unsubscribed));

    let change = SubscriptionChange {
        repository_id: "r1".into(),
        state: SubscriptionState::Subscribed,
    };
    let updated = apply_subscription_update(&mut cache, &change).unwrap();

    assert_eq!(updated.watcher_count, 6);
    assert_eq!(updated.viewer_subscription, SubscriptionState::Subscribed);
    // Everything else is carried over unchanged.
    assert_eq!(updated.name, "repo-r1");
    assert_eq!(updated.url, "https://github.com/acme/repo-r1");
    assert_eq!(cache.read_entry("r1").unwrap(), &updated);
}

#[test]
fn unsubscribe_decrements_count() {
    let mut cache = RepoCache::new();
    cache.write_entry(repository("r1", 10, SubscriptionState::Subscribed));

    let change = SubscriptionChange {
        repository_id: "r1".into(),
        state: SubscriptionState::Unsubscribed,
    };
    let updated = apply_subscription_update(&mut cache, &change).unwrap();

    assert_eq!(updated.watcher_count, 9);
    assert_eq!(updated.viewer_subscription, SubscriptionState::Unsubscribed);
}

#[test]
fn subscribe_then_unsubscribe_restores_count() {
    let mut cache = RepoCache::new();
    cache.write_entry(repository("r1", 5, SubscriptionState::Unsubscribed));

    let subscribe = SubscriptionChange {
        repository_id: "r1".into(),
        state: SubscriptionState::Subscribed,
    };
    let unsubscribe = SubscriptionChange {
        repository_id: "r1".into(),
        state: SubscriptionState::Unsubscribed,
    };
    apply_subscription_update(&mut cache, &subscribe).unwrap();
    apply_subscription_update(&mut cache, &unsubscribe).unwrap();

    let entry = cache.read_entry("r1").unwrap();
    assert_eq!(entry.watcher_count, 5);
    assert_eq!(entry.viewer_subscription, SubscriptionState::Unsubscribed);
}

#[test]
fn repeated_subscribe_patches_accumulate() {
    // The patch always moves the stored value, so two identical patches
    // in a row are not idempotent.
    let mut cache = RepoCache::new();
    cache.write_entry(repository("r1", 5, SubscriptionState::Unsubscribed));

    let subscribe = SubscriptionChange {
        repository_id: "r1".into(),
        state: SubscriptionState::Subscribed,
    };
    let first = apply_subscription_update(&mut cache, &subscribe).unwrap();
    assert_eq!(first.watcher_count, 6);
    let second = apply_subscription_update(&mut cache, &subscribe).unwrap();
    assert_eq!(second.watcher_count, 7);
}

#[test]
fn count_is_not_clamped_at_zero() {
    let mut cache = RepoCache::new();
    cache.write_entry(repository("r1", 0, SubscriptionState::Subscribed));

    let change = SubscriptionChange {
        repository_id: "r1".into(),
        state: SubscriptionState::Unsubscribed,
    };
    let updated = apply_subscription_update(&mut cache, &change).unwrap();

    assert_eq!(updated.watcher_count, -1);
}

#[test]
fn missing_entry_fails_and_leaves_cache_unchanged() {
    let mut cache = RepoCache::new();
    let existing = repository("r1", 5, SubscriptionState::Unsubscribed);
    cache.write_entry(existing.clone());

    let change = SubscriptionChange {
        repository_id: "ghost".into(),
        state: SubscriptionState::Subscribed,
    };
    let err = apply_subscription_update(&mut cache, &change).unwrap_err();

    match err {
        WatchError::MissingEntry(key) => assert_eq!(key, "Repository:ghost"),
        other => panic!("expected MissingEntry, got {other:?}"),
    }
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.read_entry("r1").unwrap(), &existing);
}

#[test]
fn populate_upserts_by_key() {
    let mut cache = RepoCache::new();
    cache.populate(vec![
        repository("r1", 5, SubscriptionState::Unsubscribed),
        repository("r2", 10, SubscriptionState::Subscribed),
    ]);
    assert_eq!(cache.len(), 2);

    // A refresh overwrites rather than duplicating.
    cache.populate(vec![repository("r1", 8, SubscriptionState::Subscribed)]);
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.read_entry("r1").unwrap().watcher_count, 8);
}
