//! Hooks the auth platform calls around sign in

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::model::{ProfileDraft, ProfileUpdate, UserId, UserProfile};
use crate::store::Store;

/// Which password flow the client started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PasswordFlow {
    #[default]
    SignIn,
    SignUp,
}

/// Parameters sent with a password sign in or sign up
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PasswordParams {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub flow: PasswordFlow,
}

/// User fields derived from the password params
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordProfile {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Callbacks registered with the auth platform
pub struct AuthCallbacks {
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
}

impl AuthCallbacks {
    /// Create the callbacks over a store
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Map password params to the user's stored fields.
    ///
    /// Sign up needs a name as well as the credentials.
    pub fn profile(&self, params: &PasswordParams) -> Result<PasswordProfile> {
        let blank = |value: &str| value.trim().is_empty();
        let missing_name = params.flow == PasswordFlow::SignUp && params.name.as_deref().map_or(true, blank);

        if blank(&params.email) || params.password.is_empty() || missing_name {
            return Err(Error::validation("Please fill in all fields"));
        }

        Ok(PasswordProfile {
            email: params.email.trim().to_string(),
            name: params.name.as_ref().map(|name| name.trim().to_string()),
        })
    }

    /// Keep exactly one profile per user and count the logins.
    ///
    /// Runs after the platform created or re-authenticated `user_id`. The
    /// first call inserts a profile with a count of one; later calls bump
    /// the count and refresh `updatedAt`. Unknown users get no profile.
    pub async fn after_user_created_or_updated(&self, user_id: &UserId) -> Result<UserProfile> {
        if self.store.get_user(user_id).await?.is_none() {
            warn!(user_id = %user_id, "login hook for unknown user");
            return Err(Error::not_found("User"));
        }
        let now = self.clock.timestamp();

        match self.store.find_profile_by_user(user_id).await? {
            Some(existing) => {
                let login_count = existing.fields.login_count.unwrap_or(0).saturating_add(1);
                let updated_at = now.max(existing.fields.created_at.clone());
                let profile = self
                    .store
                    .patch_profile(
                        &existing.id,
                        ProfileUpdate {
                            login_count: Some(login_count),
                            updated_at,
                        },
                    )
                    .await?;
                info!(user_id = %user_id, login_count, "recorded login");
                Ok(profile)
            }
            None => {
                let profile = self.store.insert_profile(ProfileDraft::first_login(user_id.clone(), &now)).await?;
                info!(user_id = %user_id, profile_id = %profile.id, "created profile on first login");
                Ok(profile)
            }
        }
    }
}
