//! Record stores the functions run against

mod memory;
mod rest;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{
    Item, ItemDraft, ItemId, ItemUpdate, ProfileDraft, ProfileId, ProfileUpdate, User, UserId, UserProfile,
};

pub use memory::MemoryStore;
pub use rest::RestStore;

/// Typed access to the persisted tables.
///
/// Each call is one atomic step; callers compose them without further
/// locking. Lookups by owner go through the `by_user` and
/// `by_user_completed` indexes.
#[async_trait]
pub trait Store: Send + Sync {
    /// Fetch a user from the auth platform's table
    async fn get_user(&self, id: &UserId) -> Result<Option<User>>;

    /// First profile whose `userId` matches
    async fn find_profile_by_user(&self, user_id: &UserId) -> Result<Option<UserProfile>>;

    /// Insert a profile and return it with its new id
    async fn insert_profile(&self, draft: ProfileDraft) -> Result<UserProfile>;

    /// Apply changes to an existing profile
    async fn patch_profile(&self, id: &ProfileId, update: ProfileUpdate) -> Result<UserProfile>;

    /// Fetch an item by id
    async fn get_item(&self, id: &ItemId) -> Result<Option<Item>>;

    /// All items owned by a user, in no particular order
    async fn items_by_user(&self, user_id: &UserId) -> Result<Vec<Item>>;

    /// Items owned by a user with the given completion state
    async fn items_by_user_completed(&self, user_id: &UserId, completed: bool) -> Result<Vec<Item>>;

    /// Insert an item and return it with its new id
    async fn insert_item(&self, draft: ItemDraft) -> Result<Item>;

    /// Apply changes to an existing item
    async fn patch_item(&self, id: &ItemId, update: ItemUpdate) -> Result<Item>;

    /// Permanently delete an item
    async fn delete_item(&self, id: &ItemId) -> Result<()>;
}
