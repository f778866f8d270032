//! AWS credentials used to sign requests.

use std::fmt;

use crate::error::{Error, Result};

pub const ENV_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
pub const ENV_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const ENV_SESSION_TOKEN: &str = "AWS_SESSION_TOKEN";

/// Static access key credentials, optionally with a session token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl Credentials {
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        }
    }

    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.session_token = if token.is_empty() { None } else { Some(token) };
        self
    }

    /// Reads credentials from the standard AWS environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let access_key_id = lookup(ENV_ACCESS_KEY_ID).unwrap_or_default();
        let secret_access_key = lookup(ENV_SECRET_ACCESS_KEY).unwrap_or_default();
        if access_key_id.is_empty() || secret_access_key.is_empty() {
            return Err(Error::Config(format!(
                "no credentials: set {ENV_ACCESS_KEY_ID} and {ENV_SECRET_ACCESS_KEY} or pass credentials explicitly"
            )));
        }
        let creds = Self::new(access_key_id, secret_access_key);
        Ok(match lookup(ENV_SESSION_TOKEN) {
            Some(token) => creds.with_session_token(token),
            None => creds,
        })
    }
}

// Keep the secret out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"***")
            .field("session_token", &self.session_token.as_ref().map(|_| "***"))
            .finish()
    }
}
