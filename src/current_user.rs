//! The `currentUser` query

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::RequestContext;
use crate::error::Result;
use crate::model::{User, UserProfile};
use crate::store::Store;

/// The signed-in user merged with their profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentUser {
    #[serde(flatten)]
    pub user: User,
    pub profile: Option<UserProfile>,
    pub anonymous: bool,
}

/// Query returning the caller's user record
#[derive(Clone)]
pub struct CurrentUserQuery {
    store: Arc<dyn Store>,
}

impl CurrentUserQuery {
    /// Create the query over a store
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// `None` for anonymous callers and for ids the auth table no longer has
    pub async fn get(&self, ctx: &RequestContext) -> Result<Option<CurrentUser>> {
        let Some(user_id) = ctx.user_id() else {
            return Ok(None);
        };
        let Some(user) = self.store.get_user(user_id).await? else {
            return Ok(None);
        };
        let profile = self.store.find_profile_by_user(user_id).await?;

        Ok(Some(CurrentUser {
            user,
            profile,
            anonymous: false,
        }))
    }
}
