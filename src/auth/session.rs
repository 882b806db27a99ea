//! Resolving the caller from a session token

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::debug;

use super::RequestContext;
use crate::config::BackendOptions;
use crate::error::{Error, Result};
use crate::model::UserId;

/// Claims carried by a session token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// The user id
    pub sub: String,

    /// The expiry timestamp in seconds since the epoch
    pub exp: i64,

    /// The role granted to the session
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Claims {
    /// Claims for `user_id` expiring `expires_in` seconds from now
    pub fn new(user_id: &UserId, expires_in: i64) -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::from_secs(0))
            .as_secs() as i64;

        Self {
            sub: user_id.to_string(),
            exp: now + expires_in,
            role: Some("authenticated".to_string()),
        }
    }

    /// Sign the claims with an HS256 secret
    pub fn sign(&self, secret: &str) -> Result<String> {
        Ok(encode(
            &Header::new(Algorithm::HS256),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )?)
    }
}

/// Verifies HS256 session tokens issued by the auth platform
pub struct SessionVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl SessionVerifier {
    /// Create a verifier for tokens signed with `secret`
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Create a verifier from the configured secret
    pub fn from_options(options: &BackendOptions) -> Result<Self> {
        options
            .jwt_secret
            .as_deref()
            .map(Self::new)
            .ok_or_else(|| Error::general("jwt_secret is not configured"))
    }

    /// Decode and check a token
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let data = decode::<Claims>(token, &self.key, &self.validation)?;
        if data.claims.sub.is_empty() {
            return Err(Error::NotAuthenticated);
        }
        Ok(data.claims)
    }

    /// Build the request context for an `Authorization` header value.
    ///
    /// No header, or an empty one, gives an anonymous context; a token that
    /// fails verification is an error rather than a silent downgrade.
    pub fn context(&self, authorization: Option<&str>) -> Result<RequestContext> {
        let token = authorization
            .map(|value| value.trim())
            .map(|value| value.strip_prefix("Bearer ").unwrap_or(value).trim())
            .filter(|token| !token.is_empty());

        match token {
            None => Ok(RequestContext::anonymous()),
            Some(token) => {
                let claims = self.verify(token)?;
                debug!(user_id = %claims.sub, "resolved caller from session token");
                Ok(RequestContext::authenticated(UserId::new(claims.sub)))
            }
        }
    }
}
