//! In-process store with maintained secondary indexes

use async_trait::async_trait;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use tokio::sync::RwLock;
use tracing::debug;

use super::Store;
use crate::error::{Error, Result};
use crate::model::{
    Item, ItemDraft, ItemId, ItemUpdate, ProfileDraft, ProfileId, ProfileUpdate, User, UserId, UserProfile,
};
use crate::schema::{Schema, ITEMS, USERS, USER_PROFILES};

#[derive(Default)]
struct Tables {
    users: HashMap<UserId, User>,
    profiles: HashMap<ProfileId, UserProfile>,
    /// `userProfiles.by_user`
    profiles_by_user: HashMap<UserId, BTreeSet<ProfileId>>,
    items: HashMap<ItemId, Item>,
    /// `items.by_user`
    items_by_user: HashMap<UserId, BTreeSet<ItemId>>,
    /// `items.by_user_completed`
    items_by_user_completed: HashMap<(UserId, bool), BTreeSet<ItemId>>,
}

impl Tables {
    fn index_item(&mut self, item: &Item) {
        let owner = item.user_id().clone();
        self.items_by_user.entry(owner.clone()).or_default().insert(item.id.clone());
        self.items_by_user_completed
            .entry((owner, item.fields.completed))
            .or_default()
            .insert(item.id.clone());
    }

    fn unindex_item(&mut self, item: &Item) {
        let owner = item.user_id();
        if let Some(ids) = self.items_by_user.get_mut(owner) {
            ids.remove(&item.id);
        }
        if let Some(ids) = self.items_by_user_completed.get_mut(&(owner.clone(), item.fields.completed)) {
            ids.remove(&item.id);
        }
    }

    fn collect_items<'a>(&self, ids: impl Iterator<Item = &'a ItemId>) -> Vec<Item> {
        let mut items: Vec<Item> = ids.filter_map(|id| self.items.get(id)).cloned().collect();
        items.sort_by(|a, b| a.fields.created_at.cmp(&b.fields.created_at));
        items
    }
}

/// Schema-validated store kept in process memory.
///
/// Every write is checked against the table's declared shape before it is
/// applied, and the secondary indexes are updated in the same critical
/// section as the row.
pub struct MemoryStore {
    schema: Schema,
    tables: RwLock<Tables>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(Schema::app())
    }
}

impl MemoryStore {
    /// Create an empty store for the given schema
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            tables: RwLock::new(Tables::default()),
        }
    }

    fn validate<T: Serialize>(&self, table: &str, record: &T) -> Result<()> {
        let document = serde_json::to_value(record)?;
        self.schema.validate_document(table, &document)
    }

    /// Add a user, as the auth platform does on sign up
    pub async fn insert_user(&self, user: User) -> Result<UserId> {
        self.validate(USERS, &user)?;
        let id = user.id.clone();
        let mut tables = self.tables.write().await;
        if tables.users.contains_key(&id) {
            return Err(Error::database(format!("user {} already exists", id)));
        }
        tables.users.insert(id.clone(), user);
        Ok(id)
    }

    /// Number of stored items, across all users
    pub async fn item_count(&self) -> usize {
        self.tables.read().await.items.len()
    }

    /// Number of profiles stored for one user
    pub async fn profile_count(&self, user_id: &UserId) -> usize {
        self.tables
            .read()
            .await
            .profiles_by_user
            .get(user_id)
            .map_or(0, BTreeSet::len)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_user(&self, id: &UserId) -> Result<Option<User>> {
        Ok(self.tables.read().await.users.get(id).cloned())
    }

    async fn find_profile_by_user(&self, user_id: &UserId) -> Result<Option<UserProfile>> {
        let tables = self.tables.read().await;
        let profile = tables
            .profiles_by_user
            .get(user_id)
            .and_then(|ids| ids.iter().next())
            .and_then(|id| tables.profiles.get(id))
            .cloned();
        Ok(profile)
    }

    async fn insert_profile(&self, draft: ProfileDraft) -> Result<UserProfile> {
        let profile = UserProfile {
            id: ProfileId::generate(),
            fields: draft,
        };
        self.validate(USER_PROFILES, &profile)?;

        let mut tables = self.tables.write().await;
        tables
            .profiles_by_user
            .entry(profile.fields.user_id.clone())
            .or_default()
            .insert(profile.id.clone());
        tables.profiles.insert(profile.id.clone(), profile.clone());
        debug!(profile_id = %profile.id, "inserted profile");
        Ok(profile)
    }

    async fn patch_profile(&self, id: &ProfileId, update: ProfileUpdate) -> Result<UserProfile> {
        let mut tables = self.tables.write().await;
        let current = tables.profiles.get(id).ok_or_else(|| Error::not_found("Profile"))?;

        let mut patched = current.clone();
        update.apply_to(&mut patched.fields);
        self.validate(USER_PROFILES, &patched)?;

        tables.profiles.insert(id.clone(), patched.clone());
        Ok(patched)
    }

    async fn get_item(&self, id: &ItemId) -> Result<Option<Item>> {
        Ok(self.tables.read().await.items.get(id).cloned())
    }

    async fn items_by_user(&self, user_id: &UserId) -> Result<Vec<Item>> {
        let tables = self.tables.read().await;
        Ok(match tables.items_by_user.get(user_id) {
            Some(ids) => tables.collect_items(ids.iter()),
            None => Vec::new(),
        })
    }

    async fn items_by_user_completed(&self, user_id: &UserId, completed: bool) -> Result<Vec<Item>> {
        let tables = self.tables.read().await;
        Ok(match tables.items_by_user_completed.get(&(user_id.clone(), completed)) {
            Some(ids) => tables.collect_items(ids.iter()),
            None => Vec::new(),
        })
    }

    async fn insert_item(&self, draft: ItemDraft) -> Result<Item> {
        let item = Item {
            id: ItemId::generate(),
            fields: draft,
        };
        self.validate(ITEMS, &item)?;

        let mut tables = self.tables.write().await;
        tables.index_item(&item);
        tables.items.insert(item.id.clone(), item.clone());
        debug!(item_id = %item.id, "inserted item");
        Ok(item)
    }

    async fn patch_item(&self, id: &ItemId, update: ItemUpdate) -> Result<Item> {
        let mut tables = self.tables.write().await;
        let current = tables.items.get(id).cloned().ok_or_else(|| Error::not_found("Item"))?;

        let mut patched = current.clone();
        update.apply_to(&mut patched.fields);
        self.validate(ITEMS, &patched)?;

        tables.unindex_item(&current);
        tables.index_item(&patched);
        tables.items.insert(id.clone(), patched.clone());
        Ok(patched)
    }

    async fn delete_item(&self, id: &ItemId) -> Result<()> {
        let mut tables = self.tables.write().await;
        let item = tables.items.remove(id).ok_or_else(|| Error::not_found("Item"))?;
        tables.unindex_item(&item);
        debug!(item_id = %id, "deleted item");
        Ok(())
    }
}
