//! Configuration options for the backend

use std::env;
use std::time::Duration;

use crate::error::{Error, Result};

/// Environment variable holding the JWT signing secret
pub const ENV_JWT_SECRET: &str = "BACKEND_JWT_SECRET";
/// Environment variable holding the PostgREST base URL
pub const ENV_REST_URL: &str = "BACKEND_REST_URL";
/// Environment variable holding the service role key
pub const ENV_SERVICE_KEY: &str = "BACKEND_SERVICE_KEY";
/// Environment variable holding the request timeout in seconds
pub const ENV_REQUEST_TIMEOUT: &str = "BACKEND_REQUEST_TIMEOUT_SECS";

/// Configuration options for the backend
#[derive(Debug, Clone)]
pub struct BackendOptions {
    /// Secret used to verify caller session tokens
    pub jwt_secret: Option<String>,

    /// Base URL of the hosted database's REST endpoint
    pub rest_url: Option<String>,

    /// Service role key sent to the REST endpoint
    pub service_key: Option<String>,

    /// The request timeout for store calls over HTTP
    pub request_timeout: Option<Duration>,

    /// The database schema
    pub db_schema: String,

    /// Answer `NotFound` instead of `NotAuthorized` for records owned by
    /// someone else
    pub conceal_foreign_records: bool,
}

impl Default for BackendOptions {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            rest_url: None,
            service_key: None,
            request_timeout: Some(Duration::from_secs(30)),
            db_schema: "public".to_string(),
            conceal_foreign_records: false,
        }
    }
}

impl BackendOptions {
    /// Build options from the `BACKEND_*` environment variables.
    ///
    /// Unset variables keep their defaults; a timeout that is not a whole
    /// number of seconds is an error.
    pub fn from_env() -> Result<Self> {
        let mut options = Self::default();

        if let Ok(secret) = env::var(ENV_JWT_SECRET) {
            options = options.with_jwt_secret(&secret);
        }
        if let Ok(url) = env::var(ENV_REST_URL) {
            options = options.with_rest_url(&url);
        }
        if let Ok(key) = env::var(ENV_SERVICE_KEY) {
            options = options.with_service_key(&key);
        }
        if let Ok(secs) = env::var(ENV_REQUEST_TIMEOUT) {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                Error::general(format!("{} must be a number of seconds, got {:?}", ENV_REQUEST_TIMEOUT, secs))
            })?;
            options = options.with_request_timeout(Some(Duration::from_secs(secs)));
        }

        Ok(options)
    }

    /// Set the session token secret
    pub fn with_jwt_secret(mut self, value: &str) -> Self {
        self.jwt_secret = Some(value.to_string());
        self
    }

    /// Set the REST endpoint base URL
    pub fn with_rest_url(mut self, value: &str) -> Self {
        self.rest_url = Some(value.trim_end_matches('/').to_string());
        self
    }

    /// Set the service role key
    pub fn with_service_key(mut self, value: &str) -> Self {
        self.service_key = Some(value.to_string());
        self
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the database schema
    pub fn with_db_schema(mut self, value: &str) -> Self {
        self.db_schema = value.to_string();
        self
    }

    /// Set whether foreign records are reported as missing
    pub fn with_conceal_foreign_records(mut self, value: bool) -> Self {
        self.conceal_foreign_records = value;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = BackendOptions::default();
        assert_eq!(options.db_schema, "public");
        assert_eq!(options.request_timeout, Some(Duration::from_secs(30)));
        assert!(!options.conceal_foreign_records);
        assert!(options.jwt_secret.is_none());
    }

    #[test]
    fn builder_trims_trailing_slash() {
        let options = BackendOptions::default()
            .with_rest_url("http://localhost:54321/")
            .with_service_key("service")
            .with_conceal_foreign_records(true);
        assert_eq!(options.rest_url.as_deref(), Some("http://localhost:54321"));
        assert_eq!(options.service_key.as_deref(), Some("service"));
        assert!(options.conceal_foreign_records);
    }
}
