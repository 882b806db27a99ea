//! Starter kit backend
//!
//! The server half of a mobile starter kit: per-user items behind an
//! ownership guard, a profile kept up to date on every sign-in, the
//! `currentUser` query, and the schema those records live in. The UI kit's
//! class merging and error-message cleanup live here too so both sides agree
//! on them.

pub mod auth;
pub mod clock;
pub mod config;
pub mod current_user;
pub mod error;
pub mod fetch;
pub mod functions;
pub mod items;
pub mod model;
pub mod schema;
pub mod store;
pub mod style;

use std::sync::Arc;

use crate::auth::{AuthCallbacks, ForeignRecordPolicy, SessionVerifier};
use crate::clock::{Clock, SystemClock};
use crate::config::BackendOptions;
use crate::current_user::CurrentUserQuery;
use crate::error::Result;
use crate::functions::FunctionRouter;
use crate::items::Items;
use crate::store::{MemoryStore, RestStore, Store};

/// The main entry point: a store plus the functions running against it
#[derive(Clone)]
pub struct Backend {
    /// Where records are kept
    pub store: Arc<dyn Store>,
    /// Source of record timestamps
    pub clock: Arc<dyn Clock>,
    /// Backend options
    pub options: BackendOptions,
}

impl Backend {
    /// Create a backend over any store
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use starter_backend::{Backend, config::BackendOptions, store::MemoryStore};
    ///
    /// let backend = Backend::new(Arc::new(MemoryStore::default()), BackendOptions::default());
    /// ```
    pub fn new(store: Arc<dyn Store>, options: BackendOptions) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            options,
        }
    }

    /// A backend keeping everything in memory
    pub fn in_memory(options: BackendOptions) -> Self {
        Self::new(Arc::new(MemoryStore::default()), options)
    }

    /// A backend over the hosted database named in the options
    pub fn hosted(options: BackendOptions) -> Result<Self> {
        let store = RestStore::from_options(&options)?;
        Ok(Self::new(Arc::new(store), options))
    }

    /// Replace the clock
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// How records owned by someone else are reported
    pub fn foreign_record_policy(&self) -> ForeignRecordPolicy {
        if self.options.conceal_foreign_records {
            ForeignRecordPolicy::Conceal
        } else {
            ForeignRecordPolicy::Reveal
        }
    }

    /// The item functions
    pub fn items(&self) -> Items {
        Items::new(self.store.clone(), self.clock.clone(), self.foreign_record_policy())
    }

    /// The `currentUser` query
    pub fn current_user(&self) -> CurrentUserQuery {
        CurrentUserQuery::new(self.store.clone())
    }

    /// Hooks the auth platform calls around sign-in
    pub fn auth_callbacks(&self) -> AuthCallbacks {
        AuthCallbacks::new(self.store.clone(), self.clock.clone())
    }

    /// The name-addressed function surface
    pub fn functions(&self) -> FunctionRouter {
        FunctionRouter::new(self.items(), self.current_user())
    }

    /// Verifier turning bearer tokens into request contexts
    pub fn session_verifier(&self) -> Result<SessionVerifier> {
        SessionVerifier::from_options(&self.options)
    }
}

/// Re-exports of the commonly used types
pub mod prelude {
    pub use crate::auth::{AuthCallbacks, ForeignRecordPolicy, RequestContext, SessionVerifier};
    pub use crate::clock::{Clock, ManualClock, SystemClock};
    pub use crate::config::BackendOptions;
    pub use crate::current_user::{CurrentUser, CurrentUserQuery};
    pub use crate::error::{clean_error_message, Error, Result};
    pub use crate::functions::{FunctionError, FunctionRouter};
    pub use crate::items::Items;
    pub use crate::model::{Item, ItemId, ItemPatch, NewItem, User, UserId, UserProfile};
    pub use crate::store::{MemoryStore, RestStore, Store};
    pub use crate::style::cn;
    pub use crate::Backend;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_follows_options() {
        let backend = Backend::in_memory(BackendOptions::default());
        assert_eq!(backend.foreign_record_policy(), ForeignRecordPolicy::Reveal);

        let backend = Backend::in_memory(BackendOptions::default().with_conceal_foreign_records(true));
        assert_eq!(backend.foreign_record_policy(), ForeignRecordPolicy::Conceal);
    }

    #[test]
    fn hosted_requires_rest_url() {
        assert!(Backend::hosted(BackendOptions::default()).is_err());
    }
}
