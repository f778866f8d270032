//! S3 Vectors API client.

use std::sync::Arc;
use std::time::Duration;

use super::{
    credentials::Credentials,
    error::{Error, Result},
    http::HttpClient,
    index::IndexService,
    sigv4::Signer,
    vectors::VectorService,
};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Returns the public endpoint for a region.
pub fn default_endpoint(region: &str) -> String {
    format!("https://s3vectors.{region}.api.aws")
}

/// S3 Vectors API client.
///
/// # Example
///
/// ```rust,no_run
/// use giztoy_s3vectors::{Client, GetIndexRequest};
///
/// # async fn run() -> giztoy_s3vectors::Result<()> {
/// let client = Client::new("us-east-1")?;
/// let resp = client
///     .index()
///     .get(&GetIndexRequest {
///         vector_bucket_name: "my-bucket".into(),
///         index_name: "docs".into(),
///     })
///     .await?;
/// println!("dimension = {}", resp.index.dimension);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    http: Arc<HttpClient>,
    region: String,
}

impl Client {
    /// Creates a client for `region` using credentials from the environment.
    pub fn new(region: impl Into<String>) -> Result<Self> {
        ClientBuilder::new(region).build()
    }

    /// Creates a new client builder for more configuration options.
    pub fn builder(region: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(region)
    }

    /// Returns the configured region.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Returns the endpoint requests are sent to.
    pub fn endpoint(&self) -> &str {
        self.http.endpoint().as_str()
    }

    /// Returns the index management service.
    pub fn index(&self) -> IndexService {
        IndexService::new(self.http.clone())
    }

    /// Returns the vector read/write service.
    pub fn vectors(&self) -> VectorService {
        VectorService::new(self.http.clone())
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("region", &self.region)
            .field("endpoint", &self.endpoint())
            .finish()
    }
}

/// Builder for creating an S3 Vectors API client.
pub struct ClientBuilder {
    region: String,
    credentials: Option<Credentials>,
    endpoint: Option<String>,
    timeout: Duration,
}

impl ClientBuilder {
    /// Creates a new client builder.
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            credentials: None,
            endpoint: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets explicit credentials. Without this, credentials are read from
    /// `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY` and `AWS_SESSION_TOKEN`.
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Sets a custom endpoint, e.g. a local emulator.
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.endpoint = if url.is_empty() { None } else { Some(url) };
        self
    }

    /// Sets the transport timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds the client.
    pub fn build(self) -> Result<Client> {
        if self.region.is_empty() {
            return Err(Error::Config("region must be non-empty".to_string()));
        }

        let credentials = match self.credentials {
            Some(c) => c,
            None => Credentials::from_env()?,
        };
        let endpoint = self
            .endpoint
            .unwrap_or_else(|| default_endpoint(&self.region));

        let signer = Signer::new(credentials, self.region.clone());
        let http = HttpClient::new(&endpoint, signer, self.timeout)?;

        Ok(Client {
            http: Arc::new(http),
            region: self.region,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoint() {
        let client = Client::builder("us-west-2")
            .credentials(Credentials::new("AKID", "SECRET"))
            .build()
            .unwrap();
        assert_eq!(client.region(), "us-west-2");
        assert_eq!(client.endpoint(), "https://s3vectors.us-west-2.api.aws/");
    }

    #[test]
    fn test_custom_endpoint() {
        let client = Client::builder("us-east-1")
            .credentials(Credentials::new("AKID", "SECRET"))
            .endpoint("http://localhost:4566")
            .build()
            .unwrap();
        assert_eq!(client.endpoint(), "http://localhost:4566/");
    }

    #[test]
    fn test_empty_region() {
        let err = Client::builder("")
            .credentials(Credentials::new("AKID", "SECRET"))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
