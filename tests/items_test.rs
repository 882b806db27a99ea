use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use starter_backend::prelude::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

async fn backend_with(options: BackendOptions) -> (Backend, Arc<ManualClock>) {
    init_tracing();
    let store = Arc::new(MemoryStore::default());
    for (id, email) in [("alice", "alice@example.com"), ("bob", "bob@example.com")] {
        store.insert_user(User::new(UserId::new(id), email, None)).await.unwrap();
    }
    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap()));
    let backend = Backend::new(store, options).with_clock(clock.clone());
    (backend, clock)
}

async fn backend() -> (Backend, Arc<ManualClock>) {
    backend_with(BackendOptions::default()).await
}

fn alice() -> RequestContext {
    RequestContext::authenticated(UserId::new("alice"))
}

fn bob() -> RequestContext {
    RequestContext::authenticated(UserId::new("bob"))
}

#[tokio::test]
async fn created_item_is_listed_as_open() {
    let (backend, _) = backend().await;
    let items = backend.items();

    let id = items
        .create(&alice(), NewItem::titled("Buy milk").with_description("2 litres"))
        .await
        .unwrap();

    let listed = items.list(&alice()).await.unwrap();
    assert_eq!(listed.len(), 1);
    let item = &listed[0];
    assert_eq!(item.id, id);
    assert_eq!(item.fields.title, "Buy milk");
    assert_eq!(item.fields.description.as_deref(), Some("2 litres"));
    assert_eq!(item.user_id(), &UserId::new("alice"));
    assert!(!item.fields.completed);
    assert_eq!(item.fields.created_at, "2024-01-15T10:30:00.000Z");
    assert_eq!(item.fields.created_at, item.fields.updated_at);
}

#[tokio::test]
async fn completing_changes_only_completed_and_updated_at() {
    let (backend, clock) = backend().await;
    let items = backend.items();
    let id = items
        .create(&alice(), NewItem::titled("Write report").with_description("Q1"))
        .await
        .unwrap();
    let before = items.list(&alice()).await.unwrap().remove(0);

    clock.advance(Duration::seconds(5));
    let after = items.update(&alice(), &id, ItemPatch::completed(true)).await.unwrap();

    assert!(after.fields.completed);
    assert_eq!(after.fields.updated_at, "2024-01-15T10:30:05.000Z");
    assert_eq!(after.fields.title, before.fields.title);
    assert_eq!(after.fields.description, before.fields.description);
    assert_eq!(after.fields.created_at, before.fields.created_at);
    assert_eq!(after.fields.user_id, before.fields.user_id);
}

#[tokio::test]
async fn removed_item_is_gone() {
    let (backend, _) = backend().await;
    let items = backend.items();
    let keep = items.create(&alice(), NewItem::titled("keep")).await.unwrap();
    let drop = items.create(&alice(), NewItem::titled("drop")).await.unwrap();

    items.remove(&alice(), &drop).await.unwrap();

    let ids: Vec<ItemId> = items.list(&alice()).await.unwrap().into_iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![keep]);
    assert!(matches!(
        items.remove(&alice(), &drop).await.unwrap_err(),
        Error::NotFound(_)
    ));
}

#[tokio::test]
async fn anonymous_mutations_are_not_authenticated() {
    let (backend, _) = backend().await;
    let items = backend.items();
    let anonymous = RequestContext::anonymous();
    let missing = ItemId::new("does-not-exist");

    let create = items.create(&anonymous, NewItem::titled("x")).await.unwrap_err();
    let update = items
        .update(&anonymous, &missing, ItemPatch::completed(true))
        .await
        .unwrap_err();
    let remove = items.remove(&anonymous, &missing).await.unwrap_err();

    for err in [create, update, remove] {
        assert!(matches!(err, Error::NotAuthenticated), "got {:?}", err);
        assert_eq!(err.to_string(), "Not authenticated");
    }
}

#[tokio::test]
async fn foreign_items_are_not_authorized() {
    let (backend, _) = backend().await;
    let items = backend.items();
    let id = items.create(&alice(), NewItem::titled("private")).await.unwrap();

    let update = items.update(&bob(), &id, ItemPatch::completed(true)).await.unwrap_err();
    let remove = items.remove(&bob(), &id).await.unwrap_err();
    assert!(matches!(update, Error::NotAuthorized));
    assert!(matches!(remove, Error::NotAuthorized));

    let still_there = items.list(&alice()).await.unwrap();
    assert_eq!(still_there.len(), 1);
    assert!(!still_there[0].fields.completed);
    assert!(items.list(&bob()).await.unwrap().is_empty());
}

#[tokio::test]
async fn foreign_items_can_be_concealed() {
    let (backend, _) = backend_with(BackendOptions::default().with_conceal_foreign_records(true)).await;
    let items = backend.items();
    let id = items.create(&alice(), NewItem::titled("private")).await.unwrap();

    let err = items.remove(&bob(), &id).await.unwrap_err();
    assert_eq!(err.to_string(), "Item not found");
}

#[tokio::test]
async fn missing_item_is_not_found() {
    let (backend, _) = backend().await;
    let err = backend
        .items()
        .update(&alice(), &ItemId::new("nope"), ItemPatch::completed(true))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Item not found");
}

#[tokio::test]
async fn incomplete_list_is_exact_subset() {
    let (backend, _) = backend().await;
    let items = backend.items();
    let mut ids = Vec::new();
    for title in ["a", "b", "c", "d"] {
        ids.push(items.create(&alice(), NewItem::titled(title)).await.unwrap());
    }
    items.create(&bob(), NewItem::titled("other")).await.unwrap();
    items.update(&alice(), &ids[1], ItemPatch::completed(true)).await.unwrap();
    items.update(&alice(), &ids[3], ItemPatch::completed(true)).await.unwrap();

    let mut expected: Vec<ItemId> = items
        .list(&alice())
        .await
        .unwrap()
        .into_iter()
        .filter(|i| !i.fields.completed)
        .map(|i| i.id)
        .collect();
    let mut incomplete: Vec<ItemId> = items
        .list_incomplete(&alice())
        .await
        .unwrap()
        .into_iter()
        .map(|i| i.id)
        .collect();
    expected.sort();
    incomplete.sort();

    assert_eq!(incomplete, expected);
    assert_eq!(incomplete.len(), 2);
}

#[tokio::test]
async fn logins_count_up() {
    let (backend, clock) = backend().await;
    let callbacks = backend.auth_callbacks();
    let user = UserId::new("alice");

    let mut counts = Vec::new();
    for _ in 0..3 {
        let profile = callbacks.after_user_created_or_updated(&user).await.unwrap();
        counts.push(profile.fields.login_count);
        clock.advance(Duration::minutes(1));
    }

    assert_eq!(counts, vec![Some(1), Some(2), Some(3)]);
    let profile = backend.store.find_profile_by_user(&user).await.unwrap().unwrap();
    assert_eq!(profile.fields.created_at, "2024-01-15T10:30:00.000Z");
    assert_eq!(profile.fields.updated_at, "2024-01-15T10:32:00.000Z");
}

#[tokio::test]
async fn current_user_merges_profile() {
    let store = Arc::new(MemoryStore::default());
    let backend = Backend::new(store.clone(), BackendOptions::default());
    let user_id = store
        .insert_user(User::new(UserId::new("alice"), "alice@example.com", Some("Alice")))
        .await
        .unwrap();
    let ctx = RequestContext::authenticated(user_id.clone());

    let before = backend.current_user().get(&ctx).await.unwrap().unwrap();
    assert!(before.profile.is_none());
    assert!(!before.anonymous);

    backend.auth_callbacks().after_user_created_or_updated(&user_id).await.unwrap();
    let after = backend.current_user().get(&ctx).await.unwrap().unwrap();
    assert_eq!(after.user.email.as_deref(), Some("alice@example.com"));
    assert_eq!(after.profile.unwrap().fields.login_count, Some(1));

    assert!(backend.current_user().get(&RequestContext::anonymous()).await.unwrap().is_none());
    assert!(backend.current_user().get(&bob()).await.unwrap().is_none());
}

#[tokio::test]
async fn unknown_user_owns_nothing() {
    let (backend, _) = backend().await;
    let ghost = RequestContext::authenticated(UserId::new("ghost"));

    let err = backend.items().create(&ghost, NewItem::titled("x")).await.unwrap_err();
    assert!(matches!(err, Error::NotAuthenticated));

    let err = backend
        .auth_callbacks()
        .after_user_created_or_updated(&UserId::new("ghost"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "User not found");

    assert!(backend.items().list(&ghost).await.unwrap().is_empty());
    assert!(backend.store.find_profile_by_user(&UserId::new("ghost")).await.unwrap().is_none());
}

#[tokio::test]
async fn update_never_predates_creation() {
    let (backend, clock) = backend().await;
    let items = backend.items();
    let id = items.create(&alice(), NewItem::titled("a")).await.unwrap();

    clock.set(Utc.with_ymd_and_hms(2024, 1, 14, 8, 0, 0).unwrap());
    let item = items.update(&alice(), &id, ItemPatch::completed(true)).await.unwrap();

    assert!(item.fields.completed);
    assert_eq!(item.fields.updated_at, item.fields.created_at);
    assert_eq!(item.fields.updated_at, "2024-01-15T10:30:00.000Z");
}

#[tokio::test]
async fn login_never_predates_profile_creation() {
    let (backend, clock) = backend().await;
    let callbacks = backend.auth_callbacks();
    let user = UserId::new("alice");
    callbacks.after_user_created_or_updated(&user).await.unwrap();

    clock.set(Utc.with_ymd_and_hms(2024, 1, 14, 8, 0, 0).unwrap());
    let profile = callbacks.after_user_created_or_updated(&user).await.unwrap();

    assert_eq!(profile.fields.login_count, Some(2));
    assert_eq!(profile.fields.updated_at, profile.fields.created_at);
}
