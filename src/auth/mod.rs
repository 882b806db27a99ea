//! Caller identity, ownership checks, and the auth platform's callbacks

mod callbacks;
mod guard;
mod session;

use crate::model::UserId;

pub use callbacks::*;
pub use guard::*;
pub use session::*;

/// The authenticated user behind a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: UserId,
}

/// Per-request context handed to every function.
///
/// The auth platform resolves the caller; the functions never reach for
/// ambient session state.
#[derive(Debug, Clone)]
pub struct RequestContext {
    caller: Option<Caller>,
    request_id: String,
}

impl RequestContext {
    /// A request with no resolvable identity
    pub fn anonymous() -> Self {
        Self {
            caller: None,
            request_id: new_request_id(),
        }
    }

    /// A request made by the given user
    pub fn authenticated(user_id: UserId) -> Self {
        Self {
            caller: Some(Caller { user_id }),
            request_id: new_request_id(),
        }
    }

    /// Replace the generated request id
    pub fn with_request_id(mut self, request_id: &str) -> Self {
        self.request_id = request_id.to_string();
        self
    }

    /// The caller, if any
    pub fn caller(&self) -> Option<&Caller> {
        self.caller.as_ref()
    }

    /// The caller's user id, if any
    pub fn user_id(&self) -> Option<&UserId> {
        self.caller.as_ref().map(|caller| &caller.user_id)
    }

    /// Id used to correlate errors with server logs
    pub fn request_id(&self) -> &str {
        &self.request_id
    }
}

fn new_request_id() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    id[..16].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contexts_carry_identity() {
        let anon = RequestContext::anonymous();
        assert!(anon.caller().is_none());
        assert_eq!(anon.request_id().len(), 16);

        let ctx = RequestContext::authenticated(UserId::new("u1")).with_request_id("req-1");
        assert_eq!(ctx.user_id(), Some(&UserId::new("u1")));
        assert_eq!(ctx.request_id(), "req-1");
    }
}
