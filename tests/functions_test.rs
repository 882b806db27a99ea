use serde_json::{json, Value};
use starter_backend::auth::Claims;
use starter_backend::prelude::*;

const SECRET: &str = "test-jwt-secret";

async fn backend() -> Backend {
    let store = std::sync::Arc::new(MemoryStore::default());
    for id in ["alice", "bob"] {
        store
            .insert_user(User::new(UserId::new(id), &format!("{}@example.com", id), None))
            .await
            .unwrap();
    }
    Backend::new(store, BackendOptions::default().with_jwt_secret(SECRET))
}

fn caller(user: &str) -> RequestContext {
    RequestContext::authenticated(UserId::new(user)).with_request_id("req-1")
}

#[tokio::test]
async fn item_lifecycle_over_json() {
    let router = backend().await.functions();
    let ctx = caller("alice");

    let id = router
        .call(&ctx, "items:create", json!({ "title": "Buy milk", "description": "oat" }))
        .await
        .unwrap();
    let id = id.as_str().unwrap().to_string();

    let listed = router.call(&ctx, "items:list", Value::Null).await.unwrap();
    assert_eq!(listed[0]["_id"], json!(id));
    assert_eq!(listed[0]["userId"], json!("alice"));
    assert_eq!(listed[0]["title"], json!("Buy milk"));
    assert_eq!(listed[0]["completed"], json!(false));

    let updated = router
        .call(&ctx, "items:update", json!({ "id": id, "completed": true }))
        .await
        .unwrap();
    assert_eq!(updated, Value::Null);

    let open = router.call(&ctx, "items:listIncomplete", json!({})).await.unwrap();
    assert_eq!(open, json!([]));

    let removed = router.call(&ctx, "items:remove", json!({ "id": id })).await.unwrap();
    assert_eq!(removed, Value::Null);
    assert_eq!(router.call(&ctx, "items:list", json!({})).await.unwrap(), json!([]));
}

#[tokio::test]
async fn errors_carry_the_platform_trace() {
    let router = backend().await.functions();
    let ctx = RequestContext::anonymous().with_request_id("abc");

    let err = router
        .call(&ctx, "items:create", json!({ "title": "x" }))
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "[Request ID: abc] Server Error Uncaught Error: Not authenticated at handler (items:create)"
    );
    assert_eq!(clean_error_message(Some(&err.to_string())), "Not authenticated");
    assert_eq!(err.message(), "Not authenticated");
}

#[tokio::test]
async fn foreign_update_reports_not_authorized() {
    let router = backend().await.functions();
    let id = router
        .call(&caller("alice"), "items:create", json!({ "title": "mine" }))
        .await
        .unwrap();

    let err = router
        .call(&caller("bob"), "items:update", json!({ "id": id, "title": "yours" }))
        .await
        .unwrap_err();
    assert!(matches!(err.source, Error::NotAuthorized));
    assert_eq!(err.message(), "Not authorized");
}

#[tokio::test]
async fn arguments_are_validated() {
    let router = backend().await.functions();
    let ctx = caller("alice");

    let extra = router
        .call(&ctx, "items:create", json!({ "title": "x", "priority": 1 }))
        .await
        .unwrap_err();
    assert!(matches!(extra.source, Error::Validation(_)));
    assert!(extra.message().contains("extra field `priority`"));

    let wrong_type = router
        .call(&ctx, "items:update", json!({ "id": "x", "completed": "yes" }))
        .await
        .unwrap_err();
    assert!(matches!(wrong_type.source, Error::Validation(_)));

    let null_description = router
        .call(&ctx, "items:update", json!({ "id": "x", "description": null }))
        .await
        .unwrap_err();
    assert!(null_description.message().contains("Path: .description Value: null"));

    let missing = router.call(&ctx, "items:remove", json!({})).await.unwrap_err();
    assert!(missing.message().contains("missing the required field `id`"));

    let blank = router
        .call(&ctx, "items:create", json!({ "title": "  " }))
        .await
        .unwrap_err();
    assert_eq!(blank.message(), "Title cannot be empty");
}

#[tokio::test]
async fn unknown_function_is_rejected() {
    let router = backend().await.functions();
    assert!(router.lookup("items:archive").is_none());

    let err = router
        .call(&caller("alice"), "items:archive", json!({}))
        .await
        .unwrap_err();
    assert_eq!(err.message(), "Could not find public function for 'items:archive'");
}

#[tokio::test]
async fn bearer_token_identifies_the_caller() {
    let backend = backend().await;
    let verifier = backend.session_verifier().unwrap();
    let token = Claims::new(&UserId::new("alice"), 3600).sign(SECRET).unwrap();

    let ctx = verifier.context(Some(&format!("Bearer {}", token))).unwrap();
    assert_eq!(ctx.user_id(), Some(&UserId::new("alice")));

    let router = backend.functions();
    router
        .call(&ctx, "items:create", json!({ "title": "from token" }))
        .await
        .unwrap();
    let listed = router.call(&ctx, "items:list", json!({})).await.unwrap();
    assert_eq!(listed.as_array().map(Vec::len), Some(1));

    let anonymous = verifier.context(None).unwrap();
    assert!(anonymous.user_id().is_none());
    assert!(verifier.context(Some("Bearer not-a-token")).is_err());
}

#[test]
fn cleans_platform_messages() {
    assert_eq!(
        clean_error_message(Some(
            "[Request ID: abc] Server Error Uncaught Error: Invalid email or password at handler (auth.ts:42)"
        )),
        "Invalid email or password"
    );
    assert_eq!(clean_error_message(Some("")), "An unexpected error occurred");
    assert_eq!(clean_error_message(None), "An unexpected error occurred");
    assert_eq!(clean_error_message(Some("Network request failed")), "Network request failed");
}
