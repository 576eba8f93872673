//! Credentials for the platform API.
//!
//! Provisioning them is someone else's job; this module only picks them up
//! from the environment once and hands them to the client explicitly.

use crate::error::PlatformError;
use std::fmt;

/// API key used for public read calls.
pub const API_KEY_VAR: &str = "YOUTUBE_API_KEY";

/// OAuth bearer token used for playlist reads and mutations.
pub const ACCESS_TOKEN_VAR: &str = "YOUTUBE_ACCESS_TOKEN";

#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    api_key: Option<String>,
    access_token: Option<String>,
}

impl Credentials {
    pub fn new(api_key: Option<String>, access_token: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|v| !v.trim().is_empty()),
            access_token: access_token.filter(|v| !v.trim().is_empty()),
        }
    }

    /// Read credentials from the process environment.
    pub fn from_env() -> Result<Self, PlatformError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read credentials through `lookup`; at least one must be present.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PlatformError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credentials = Self::new(lookup(API_KEY_VAR), lookup(ACCESS_TOKEN_VAR));
        if credentials.api_key.is_none() && credentials.access_token.is_none() {
            return Err(PlatformError::Unauthorized(format!(
                "set {API_KEY_VAR} or {ACCESS_TOKEN_VAR}"
            )));
        }
        Ok(credentials)
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn can_mutate(&self) -> bool {
        self.access_token.is_some()
    }
}

// Never print secret values.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
