use std::time::Duration;

use giztoy_s3vectors::{Client, Credentials, Error, Result};

pub const ENV_BUCKET: &str = "VECBUCKET_BUCKET";
pub const ENV_ENDPOINT: &str = "VECBUCKET_ENDPOINT";
pub const ENV_REGION: &str = "AWS_REGION";
pub const ENV_DEFAULT_REGION: &str = "AWS_DEFAULT_REGION";

/// Connection settings for a [`VectorStore`](crate::VectorStore).
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub bucket: String,
    pub region: String,
    /// Explicit credentials; read from the environment when absent.
    pub credentials: Option<Credentials>,
    /// Alternate endpoint, e.g. an emulator.
    pub endpoint: Option<String>,
    pub timeout: Option<Duration>,
    /// Check embedding lengths against the index before writing or querying.
    pub validate_dimensions: bool,
}

impl StoreConfig {
    pub fn new(bucket: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            region: region.into(),
            credentials: None,
            endpoint: None,
            timeout: None,
            validate_dimensions: false,
        }
    }

    /// Reads `VECBUCKET_BUCKET`, `AWS_REGION` (or `AWS_DEFAULT_REGION`)
    /// and `VECBUCKET_ENDPOINT`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let bucket = non_empty(ENV_BUCKET)
            .ok_or_else(|| Error::Config(format!("{ENV_BUCKET} is not set")))?;
        let region = non_empty(ENV_REGION)
            .or_else(|| non_empty(ENV_DEFAULT_REGION))
            .ok_or_else(|| Error::Config(format!("{ENV_REGION} is not set")))?;

        let mut cfg = Self::new(bucket, region);
        cfg.endpoint = non_empty(ENV_ENDPOINT);
        Ok(cfg)
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        self.endpoint = if endpoint.is_empty() { None } else { Some(endpoint) };
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_validate_dimensions(mut self, enabled: bool) -> Self {
        self.validate_dimensions = enabled;
        self
    }

    /// Builds the signed HTTP client.
    pub fn build_client(&self) -> Result<Client> {
        if self.bucket.is_empty() {
            return Err(Error::Config("bucket must be non-empty".to_string()));
        }
        let mut builder = Client::builder(self.region.clone());
        if let Some(creds) = &self.credentials {
            builder = builder.credentials(creds.clone());
        }
        if let Some(endpoint) = &self.endpoint {
            builder = builder.endpoint(endpoint.clone());
        }
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder.build()
    }
}
