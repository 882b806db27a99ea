//! Store backed by a hosted database's PostgREST endpoint

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use super::Store;
use crate::config::BackendOptions;
use crate::error::{Error, Result};
use crate::fetch::{Fetch, FetchBuilder};
use crate::model::{
    Item, ItemDraft, ItemId, ItemUpdate, ProfileDraft, ProfileId, ProfileUpdate, User, UserId, UserProfile,
};
use crate::schema::{ITEMS, USERS, USER_PROFILES};

/// Store talking to `/rest/v1/<table>` with the service role key.
///
/// Row level security is bypassed by the service role, so ownership is
/// still enforced by the functions layer.
pub struct RestStore {
    /// The base URL of the project
    url: String,

    /// The service role key
    key: String,

    /// The database schema tables live in
    schema: String,

    /// HTTP client
    client: Client,
}

impl RestStore {
    /// Create a store with an existing HTTP client
    pub fn new(url: &str, key: &str, client: Client) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            key: key.to_string(),
            schema: "public".to_string(),
            client,
        }
    }

    /// Create a store from backend options; needs `rest_url` and `service_key`
    pub fn from_options(options: &BackendOptions) -> Result<Self> {
        let url = options
            .rest_url
            .as_deref()
            .ok_or_else(|| Error::general("rest_url is not configured"))?;
        let key = options
            .service_key
            .as_deref()
            .ok_or_else(|| Error::general("service_key is not configured"))?;

        let mut builder = Client::builder();
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }

        let mut store = Self::new(url, key, builder.build()?);
        store.schema = options.db_schema.clone();
        Ok(store)
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.url, table)
    }

    fn authorize<'a>(&self, fetch: FetchBuilder<'a>) -> FetchBuilder<'a> {
        fetch
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .header("Accept-Profile", &self.schema)
            .header("Content-Profile", &self.schema)
    }

    async fn select_one<T: DeserializeOwned>(&self, table: &str, column: &str, value: &str) -> Result<Option<T>> {
        let rows: Vec<T> = self
            .authorize(Fetch::get(&self.client, &self.table_url(table)))
            .query("select", "*")
            .query(column, &format!("eq.{}", value))
            .query("limit", "1")
            .execute()
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn select_many<T: DeserializeOwned>(&self, table: &str, filters: &[(&str, String)]) -> Result<Vec<T>> {
        let mut fetch = self
            .authorize(Fetch::get(&self.client, &self.table_url(table)))
            .query("select", "*");
        for (column, value) in filters {
            fetch = fetch.query(column, &format!("eq.{}", value));
        }
        fetch.execute().await
    }

    /// Rows returned by a write with `Prefer: return=representation`
    fn first_row<T>(rows: Vec<T>, missing: Error) -> Result<T> {
        rows.into_iter().next().ok_or(missing)
    }
}

#[async_trait]
impl Store for RestStore {
    async fn get_user(&self, id: &UserId) -> Result<Option<User>> {
        self.select_one(USERS, "_id", id.as_str()).await
    }

    async fn find_profile_by_user(&self, user_id: &UserId) -> Result<Option<UserProfile>> {
        self.select_one(USER_PROFILES, "userId", user_id.as_str()).await
    }

    async fn insert_profile(&self, draft: ProfileDraft) -> Result<UserProfile> {
        let rows = self
            .authorize(Fetch::post(&self.client, &self.table_url(USER_PROFILES)))
            .header("Prefer", "return=representation")
            .json(&draft)?
            .execute()
            .await?;
        Self::first_row(rows, Error::database("insert into userProfiles returned no rows"))
    }

    async fn patch_profile(&self, id: &ProfileId, update: ProfileUpdate) -> Result<UserProfile> {
        let rows = self
            .authorize(Fetch::patch(&self.client, &self.table_url(USER_PROFILES)))
            .query("_id", &format!("eq.{}", id))
            .header("Prefer", "return=representation")
            .json(&update)?
            .execute()
            .await?;
        Self::first_row(rows, Error::not_found("Profile"))
    }

    async fn get_item(&self, id: &ItemId) -> Result<Option<Item>> {
        self.select_one(ITEMS, "_id", id.as_str()).await
    }

    async fn items_by_user(&self, user_id: &UserId) -> Result<Vec<Item>> {
        self.select_many(ITEMS, &[("userId", user_id.to_string())]).await
    }

    async fn items_by_user_completed(&self, user_id: &UserId, completed: bool) -> Result<Vec<Item>> {
        self.select_many(
            ITEMS,
            &[("userId", user_id.to_string()), ("completed", completed.to_string())],
        )
        .await
    }

    async fn insert_item(&self, draft: ItemDraft) -> Result<Item> {
        let rows = self
            .authorize(Fetch::post(&self.client, &self.table_url(ITEMS)))
            .header("Prefer", "return=representation")
            .json(&draft)?
            .execute()
            .await?;
        Self::first_row(rows, Error::database("insert into items returned no rows"))
    }

    async fn patch_item(&self, id: &ItemId, update: ItemUpdate) -> Result<Item> {
        let rows = self
            .authorize(Fetch::patch(&self.client, &self.table_url(ITEMS)))
            .query("_id", &format!("eq.{}", id))
            .header("Prefer", "return=representation")
            .json(&update)?
            .execute()
            .await?;
        Self::first_row(rows, Error::not_found("Item"))
    }

    async fn delete_item(&self, id: &ItemId) -> Result<()> {
        let rows: Vec<Item> = self
            .authorize(Fetch::delete(&self.client, &self.table_url(ITEMS)))
            .query("_id", &format!("eq.{}", id))
            .header("Prefer", "return=representation")
            .execute()
            .await?;
        Self::first_row(rows, Error::not_found("Item")).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_options_requires_url_and_key() {
        let options = BackendOptions::default();
        assert!(RestStore::from_options(&options).is_err());

        let options = options.with_rest_url("http://localhost:54321/").with_service_key("k");
        let store = RestStore::from_options(&options).unwrap();
        assert_eq!(store.table_url(ITEMS), "http://localhost:54321/rest/v1/items");
        assert_eq!(store.schema, "public");
    }
}
