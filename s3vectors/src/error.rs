//! Error types for the S3 Vectors API client.

use thiserror::Error;

/// Well-known error codes returned by the S3 Vectors service.
pub mod error_code {
    pub const NOT_FOUND: &str = "NotFoundException";
    pub const CONFLICT: &str = "ConflictException";
    pub const VALIDATION: &str = "ValidationException";
    pub const ACCESS_DENIED: &str = "AccessDeniedException";
    pub const TOO_MANY_REQUESTS: &str = "TooManyRequestsException";
    pub const SERVICE_QUOTA_EXCEEDED: &str = "ServiceQuotaExceededException";
    pub const SERVICE_UNAVAILABLE: &str = "ServiceUnavailableException";
    pub const INTERNAL_SERVER: &str = "InternalServerException";
}

/// Result type alias for S3 Vectors operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for S3 Vectors API operations.
#[derive(Error, Debug)]
pub enum Error {
    /// API error returned by the service.
    #[error("s3vectors: {code}: {message} (status={status}, request_id={request_id})")]
    Api {
        status: u16,
        code: String,
        message: String,
        request_id: String,
    },

    /// HTTP transport error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Endpoint could not be parsed.
    #[error("invalid endpoint: {0}")]
    Url(#[from] url::ParseError),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Request signing failed.
    #[error("signing error: {0}")]
    Signing(String),
}

impl Error {
    /// Creates a new API error.
    pub fn api(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Api {
            status,
            code: code.into(),
            message: message.into(),
            request_id: String::new(),
        }
    }

    /// Creates a new API error with request ID.
    pub fn api_with_request_id(
        status: u16,
        code: impl Into<String>,
        message: impl Into<String>,
        request_id: impl Into<String>,
    ) -> Self {
        Error::Api {
            status,
            code: code.into(),
            message: message.into(),
            request_id: request_id.into(),
        }
    }

    /// Returns the service error code, if this is an API error.
    pub fn code(&self) -> Option<&str> {
        match self {
            Error::Api { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Returns the HTTP status, if this is an API error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns true if the bucket, index or vector does not exist.
    pub fn is_not_found(&self) -> bool {
        self.matches(404, error_code::NOT_FOUND)
    }

    /// Returns true if the resource already exists.
    pub fn is_conflict(&self) -> bool {
        self.matches(409, error_code::CONFLICT)
    }

    /// Returns true if the service rejected the request parameters.
    pub fn is_validation(&self) -> bool {
        self.matches(400, error_code::VALIDATION)
    }

    /// Returns true if the request was throttled.
    pub fn is_throttling(&self) -> bool {
        self.matches(429, error_code::TOO_MANY_REQUESTS)
    }

    /// Returns true if this is a server-side error.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::Api { status, .. } if *status >= 500)
    }

    fn matches(&self, want_status: u16, want_code: &str) -> bool {
        match self {
            Error::Api { status, code, .. } => *status == want_status || code == want_code,
            _ => false,
        }
    }
}

/// Normalizes a raw error type as found in `x-amzn-ErrorType` or `__type`.
///
/// The service may send `NotFoundException:http://internal.amazon.com/...`
/// or `com.amazonaws.s3vectors#NotFoundException`; both become
/// `NotFoundException`.
pub(crate) fn sanitize_error_code(raw: &str) -> String {
    let code = raw.split(':').next().unwrap_or(raw);
    let code = code.rsplit('#').next().unwrap_or(code);
    code.trim().to_string()
}
