//! The one place record ownership is decided

use tracing::warn;

use super::RequestContext;
use crate::error::{Error, Result};
use crate::model::{Item, UserId};

/// A record that belongs to exactly one user
pub trait Owned {
    /// Kind of record, used in not-found messages
    const KIND: &'static str;

    /// The owning user
    fn owner(&self) -> &UserId;
}

impl Owned for Item {
    const KIND: &'static str = "Item";

    fn owner(&self) -> &UserId {
        self.user_id()
    }
}

/// How to answer a caller who asks for someone else's record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForeignRecordPolicy {
    /// `NotAuthorized`: existence is revealed
    #[default]
    Reveal,
    /// `NotFound`: indistinguishable from a missing record
    Conceal,
}

/// Resolve the caller for a write, or fail with `NotAuthenticated`
pub fn require_caller(ctx: &RequestContext) -> Result<&UserId> {
    ctx.user_id().ok_or(Error::NotAuthenticated)
}

/// Check, in order, that the caller is known, the record exists, and the
/// caller owns it. Returns the record on success.
pub fn authorize_owner<T: Owned>(
    ctx: &RequestContext,
    record: Option<T>,
    policy: ForeignRecordPolicy,
) -> Result<T> {
    let caller = require_caller(ctx)?;
    let record = record.ok_or_else(|| Error::not_found(T::KIND))?;

    if record.owner() != caller {
        warn!(
            request_id = ctx.request_id(),
            caller = %caller,
            owner = %record.owner(),
            "rejected access to foreign {}",
            T::KIND
        );
        return Err(match policy {
            ForeignRecordPolicy::Reveal => Error::NotAuthorized,
            ForeignRecordPolicy::Conceal => Error::not_found(T::KIND),
        });
    }

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ItemDraft, ItemId};

    fn item_of(owner: &str) -> Item {
        Item {
            id: ItemId::new("i1"),
            fields: ItemDraft {
                user_id: UserId::new(owner),
                title: "t".to_string(),
                description: None,
                completed: false,
                created_at: "t0".to_string(),
                updated_at: "t0".to_string(),
            },
        }
    }

    #[test]
    fn authentication_is_checked_first() {
        let ctx = RequestContext::anonymous();
        let result = authorize_owner::<Item>(&ctx, None, ForeignRecordPolicy::Reveal);
        assert!(matches!(result, Err(Error::NotAuthenticated)));
    }

    #[test]
    fn existence_before_ownership() {
        let ctx = RequestContext::authenticated(UserId::new("u1"));
        let result = authorize_owner::<Item>(&ctx, None, ForeignRecordPolicy::Reveal);
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn foreign_records_follow_policy() {
        let ctx = RequestContext::authenticated(UserId::new("u1"));
        let revealed = authorize_owner(&ctx, Some(item_of("u2")), ForeignRecordPolicy::Reveal);
        assert!(matches!(revealed, Err(Error::NotAuthorized)));

        let concealed = authorize_owner(&ctx, Some(item_of("u2")), ForeignRecordPolicy::Conceal);
        assert_eq!(concealed.unwrap_err().to_string(), "Item not found");
    }

    #[test]
    fn owner_gets_the_record() {
        let ctx = RequestContext::authenticated(UserId::new("u1"));
        let item = authorize_owner(&ctx, Some(item_of("u1")), ForeignRecordPolicy::Reveal).unwrap();
        assert_eq!(item.id, ItemId::new("i1"));
    }
}
