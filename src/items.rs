//! Item functions: per-user to-do records

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::auth::{authorize_owner, require_caller, ForeignRecordPolicy, RequestContext};
use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::model::{Item, ItemDraft, ItemId, ItemPatch, NewItem};
use crate::store::Store;

/// The item functions exposed to clients
#[derive(Clone)]
pub struct Items {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
    policy: ForeignRecordPolicy,
}

fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(Error::validation("Title cannot be empty"));
    }
    Ok(())
}

impl Items {
    /// Create the item functions over a store
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>, policy: ForeignRecordPolicy) -> Self {
        Self { store, clock, policy }
    }

    /// All of the caller's items; empty for anonymous callers
    pub async fn list(&self, ctx: &RequestContext) -> Result<Vec<Item>> {
        let Some(user_id) = ctx.user_id() else {
            return Ok(Vec::new());
        };
        debug!(request_id = ctx.request_id(), user_id = %user_id, "items:list");
        self.store.items_by_user(user_id).await
    }

    /// The caller's items that are not completed yet
    pub async fn list_incomplete(&self, ctx: &RequestContext) -> Result<Vec<Item>> {
        let Some(user_id) = ctx.user_id() else {
            return Ok(Vec::new());
        };
        debug!(request_id = ctx.request_id(), user_id = %user_id, "items:listIncomplete");
        self.store.items_by_user_completed(user_id, false).await
    }

    /// Create an item owned by the caller and return its id.
    ///
    /// A caller whose user record is gone counts as unauthenticated, so no
    /// item is left without an owner.
    pub async fn create(&self, ctx: &RequestContext, new_item: NewItem) -> Result<ItemId> {
        let user_id = require_caller(ctx)?;
        if self.store.get_user(user_id).await?.is_none() {
            warn!(request_id = ctx.request_id(), user_id = %user_id, "caller has no user record");
            return Err(Error::NotAuthenticated);
        }
        validate_title(&new_item.title)?;

        let now = self.clock.timestamp();
        let item = self
            .store
            .insert_item(ItemDraft {
                user_id: user_id.clone(),
                title: new_item.title,
                description: new_item.description,
                completed: false,
                created_at: now.clone(),
                updated_at: now,
            })
            .await?;

        info!(request_id = ctx.request_id(), item_id = %item.id, "created item");
        Ok(item.id)
    }

    /// Apply a partial change to one of the caller's items
    pub async fn update(&self, ctx: &RequestContext, id: &ItemId, patch: ItemPatch) -> Result<Item> {
        require_caller(ctx)?;
        let item = authorize_owner(ctx, self.store.get_item(id).await?, self.policy)?;
        if let Some(title) = &patch.title {
            validate_title(title)?;
        }

        let updated_at = self.clock.timestamp().max(item.fields.created_at.clone());
        let item = self.store.patch_item(id, patch.stamped(updated_at)).await?;

        debug!(request_id = ctx.request_id(), item_id = %id, "updated item");
        Ok(item)
    }

    /// Permanently delete one of the caller's items
    pub async fn remove(&self, ctx: &RequestContext, id: &ItemId) -> Result<()> {
        require_caller(ctx)?;
        authorize_owner(ctx, self.store.get_item(id).await?, self.policy)?;
        self.store.delete_item(id).await?;

        info!(request_id = ctx.request_id(), item_id = %id, "removed item");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use crate::model::{User, UserId};
    use crate::store::MemoryStore;

    fn items() -> Items {
        Items::new(
            Arc::new(MemoryStore::default()),
            Arc::new(SystemClock),
            ForeignRecordPolicy::Reveal,
        )
    }

    async fn items_for(user: &str) -> Items {
        let store = MemoryStore::default();
        store
            .insert_user(User::new(UserId::new(user), "u1@example.com", None))
            .await
            .unwrap();
        Items::new(Arc::new(store), Arc::new(SystemClock), ForeignRecordPolicy::Reveal)
    }

    #[tokio::test]
    async fn anonymous_reads_are_empty() {
        let items = items();
        let ctx = RequestContext::anonymous();
        assert!(items.list(&ctx).await.unwrap().is_empty());
        assert!(items.list_incomplete(&ctx).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_titles_are_rejected() {
        let items = items_for("u1").await;
        let ctx = RequestContext::authenticated(UserId::new("u1"));
        for title in ["", "   "] {
            let err = items.create(&ctx, NewItem::titled(title)).await.unwrap_err();
            assert!(matches!(err, Error::Validation(_)));
        }
    }

    #[tokio::test]
    async fn anonymous_create_is_not_authenticated_even_with_blank_title() {
        let items = items();
        let err = items
            .create(&RequestContext::anonymous(), NewItem::titled(""))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotAuthenticated));
    }

    #[tokio::test]
    async fn update_rejects_blank_title() {
        let items = items_for("u1").await;
        let ctx = RequestContext::authenticated(UserId::new("u1"));
        let id = items.create(&ctx, NewItem::titled("a")).await.unwrap();
        let err = items.update(&ctx, &id, ItemPatch::title(" ")).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn caller_without_user_record_cannot_create() {
        let items = items_for("u1").await;
        let ghost = RequestContext::authenticated(UserId::new("ghost"));
        let err = items.create(&ghost, NewItem::titled("x")).await.unwrap_err();
        assert!(matches!(err, Error::NotAuthenticated));
        assert!(items.list(&ghost).await.unwrap().is_empty());
    }
}
