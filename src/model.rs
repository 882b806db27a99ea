//! Record types stored in the app tables

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing id
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a fresh random id
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().simple().to_string())
            }

            /// The id as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }
    };
}

record_id!(
    /// Id of a record in the platform `users` table
    UserId
);
record_id!(
    /// Id of a record in `userProfiles`
    ProfileId
);
record_id!(
    /// Id of a record in `items`
    ItemId
);

/// Identity record owned by the auth platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_verification_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_verification_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_anonymous: Option<bool>,
}

impl User {
    /// A user with only an email and a name
    pub fn new(id: UserId, email: &str, name: Option<&str>) -> Self {
        Self {
            id,
            email: Some(email.to_string()),
            name: name.map(str::to_string),
            image: None,
            email_verification_time: None,
            phone: None,
            phone_verification_time: None,
            is_anonymous: None,
        }
    }
}

/// Colour scheme preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    System,
}

/// App settings kept on the profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notifications: Option<bool>,
}

/// App specific data attached one-to-one to a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(rename = "_id")]
    pub id: ProfileId,
    #[serde(flatten)]
    pub fields: ProfileDraft,
}

/// A profile before the store has assigned it an id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDraft {
    pub user_id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<ProfileSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_count: Option<u32>,
    pub created_at: String,
    pub updated_at: String,
}

impl ProfileDraft {
    /// The profile created on a user's first sign in
    pub fn first_login(user_id: UserId, now: &str) -> Self {
        Self {
            user_id,
            display_name: None,
            avatar_url: None,
            bio: None,
            settings: None,
            login_count: Some(1),
            created_at: now.to_string(),
            updated_at: now.to_string(),
        }
    }
}

/// Stored changes to a profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_count: Option<u32>,
    pub updated_at: String,
}

/// A to-do entry owned by one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(rename = "_id")]
    pub id: ItemId,
    #[serde(flatten)]
    pub fields: ItemDraft,
}

impl Item {
    /// Owner of the item
    pub fn user_id(&self) -> &UserId {
        &self.fields.user_id
    }
}

/// An item before the store has assigned it an id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDraft {
    pub user_id: UserId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Caller supplied fields for a new item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewItem {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NewItem {
    /// A new item with just a title
    pub fn titled(title: &str) -> Self {
        Self {
            title: title.to_string(),
            description: None,
        }
    }

    /// Attach a description
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}

/// Partial change to an item; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl ItemPatch {
    /// Mark the item done or not done
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    /// Change the title
    pub fn title(title: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            ..Self::default()
        }
    }

    /// Stamp the patch with its modification time
    pub fn stamped(self, updated_at: String) -> ItemUpdate {
        ItemUpdate {
            title: self.title,
            description: self.description,
            completed: self.completed,
            updated_at,
        }
    }
}

/// Stored changes to an item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    pub updated_at: String,
}

impl ItemUpdate {
    /// Apply the changes to an item in place
    pub fn apply_to(&self, draft: &mut ItemDraft) {
        if let Some(title) = &self.title {
            draft.title = title.clone();
        }
        if let Some(description) = &self.description {
            draft.description = Some(description.clone());
        }
        if let Some(completed) = self.completed {
            draft.completed = completed;
        }
        draft.updated_at = self.updated_at.clone();
    }
}

impl ProfileUpdate {
    /// Apply the changes to a profile in place
    pub fn apply_to(&self, draft: &mut ProfileDraft) {
        if let Some(count) = self.login_count {
            draft.login_count = Some(count);
        }
        draft.updated_at = self.updated_at.clone();
    }
}
