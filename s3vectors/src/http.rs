//! HTTP transport for the S3 Vectors API.

use std::time::Duration;

use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT},
    Client as ReqwestClient, Response,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;
use url::Url;

use super::{
    error::{sanitize_error_code, Error, Result},
    sigv4::Signer,
};

const JSON_CONTENT_TYPE: &str = "application/json";

/// HTTP client that signs and sends JSON requests.
///
/// There is no retry loop: every call is attempted exactly once and the
/// only deadline is the transport timeout.
pub struct HttpClient {
    client: ReqwestClient,
    endpoint: Url,
    host: String,
    signer: Signer,
}

impl HttpClient {
    /// Creates a new HTTP client.
    pub fn new(endpoint: &str, signer: Signer, timeout: Duration) -> Result<Self> {
        let endpoint = Url::parse(endpoint)?;
        let host = match (endpoint.host_str(), endpoint.port()) {
            (Some(h), Some(p)) => format!("{h}:{p}"),
            (Some(h), None) => h.to_string(),
            (None, _) => {
                return Err(Error::Config(format!("endpoint has no host: {endpoint}")));
            }
        };

        let client = ReqwestClient::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint,
            host,
            signer,
        })
    }

    /// Returns the endpoint requests are sent to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Calls `operation` and decodes the JSON response.
    pub async fn post<T, R>(&self, operation: &str, body: &T) -> Result<R>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self.send(operation, body).await?;
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(serde_json::from_slice(b"{}")?);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Calls `operation` and discards the response body.
    pub async fn post_empty<T>(&self, operation: &str, body: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        self.send(operation, body).await?;
        Ok(())
    }

    async fn send<T>(&self, operation: &str, body: &T) -> Result<Response>
    where
        T: Serialize + ?Sized,
    {
        let path = self.operation_path(operation);
        let payload = serde_json::to_vec(body)?;
        let signed = self
            .signer
            .sign("POST", &self.host, &path, JSON_CONTENT_TYPE, &payload)?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static("giztoy-s3vectors-rust/1.0"),
        );
        headers.insert(AUTHORIZATION, header_value(&signed.authorization)?);
        headers.insert("x-amz-date", header_value(&signed.amz_date)?);
        headers.insert("x-amz-content-sha256", header_value(&signed.content_sha256)?);
        if let Some(token) = &signed.security_token {
            headers.insert("x-amz-security-token", header_value(token)?);
        }

        let mut url = self.endpoint.clone();
        url.set_path(&path);

        debug!("s3vectors: {} ({} bytes)", operation, payload.len());

        let response = self
            .client
            .post(url)
            .headers(headers)
            .body(payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(parse_error_response(response).await);
        }
        Ok(response)
    }

    fn operation_path(&self, operation: &str) -> String {
        let base = self.endpoint.path().trim_end_matches('/');
        format!("{base}/{operation}")
    }
}

fn header_value(s: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(s).map_err(|e| Error::Signing(e.to_string()))
}

#[derive(Deserialize, Default)]
struct ErrorBody {
    #[serde(default, alias = "Message")]
    message: Option<String>,
    #[serde(default, rename = "__type")]
    type_: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

/// Converts a non-2xx response into `Error::Api`.
async fn parse_error_response(response: Response) -> Error {
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.bytes().await.unwrap_or_default();
    parse_error(status.as_u16(), &headers, &body)
}

fn parse_error(status: u16, headers: &HeaderMap, body: &[u8]) -> Error {
    let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();

    let raw_code = headers
        .get("x-amzn-errortype")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or(parsed.type_)
        .or(parsed.code)
        .unwrap_or_default();

    let message = parsed.message.unwrap_or_else(|| {
        let text = String::from_utf8_lossy(body).trim().to_string();
        if text.is_empty() {
            format!("HTTP {status}")
        } else {
            text
        }
    });

    let request_id = headers
        .get("x-amzn-requestid")
        .or_else(|| headers.get("x-amz-request-id"))
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    Error::api_with_request_id(status, sanitize_error_code(&raw_code), message, request_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::Credentials;

    fn signer() -> Signer {
        Signer::new(Credentials::new("AKID", "SECRET"), "us-east-1")
    }

    #[test]
    fn test_host_with_port() {
        let http = HttpClient::new("http://127.0.0.1:9000", signer(), Duration::from_secs(1)).unwrap();
        assert_eq!(http.host, "127.0.0.1:9000");
        assert_eq!(http.operation_path("GetIndex"), "/GetIndex");
    }

    #[test]
    fn test_host_default_port() {
        let http = HttpClient::new(
            "https://s3vectors.us-east-1.api.aws",
            signer(),
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(http.host, "s3vectors.us-east-1.api.aws");
    }

    #[test]
    fn test_endpoint_with_base_path() {
        let http = HttpClient::new("http://localhost:8080/emulator/", signer(), Duration::from_secs(1)).unwrap();
        assert_eq!(http.operation_path("PutVectors"), "/emulator/PutVectors");
    }

    #[test]
    fn test_invalid_endpoint() {
        assert!(HttpClient::new("not a url", signer(), Duration::from_secs(1)).is_err());
    }

    #[test]
    fn test_parse_error_from_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-amzn-errortype",
            HeaderValue::from_static("NotFoundException:http://internal.amazon.com/"),
        );
        headers.insert("x-amzn-requestid", HeaderValue::from_static("req-42"));
        let err = parse_error(404, &headers, br#"{"message":"The specified index could not be found"}"#);
        match err {
            Error::Api {
                status,
                code,
                message,
                request_id,
            } => {
                assert_eq!(status, 404);
                assert_eq!(code, "NotFoundException");
                assert_eq!(message, "The specified index could not be found");
                assert_eq!(request_id, "req-42");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_error_from_body_type() {
        let err = parse_error(
            409,
            &HeaderMap::new(),
            br#"{"__type":"com.amazonaws.s3vectors#ConflictException","Message":"exists"}"#,
        );
        assert!(err.is_conflict());
        assert_eq!(err.code(), Some("ConflictException"));
    }

    #[test]
    fn test_parse_error_plain_body() {
        let err = parse_error(502, &HeaderMap::new(), b"Bad Gateway");
        assert!(err.is_server_error());
        assert!(err.to_string().contains("Bad Gateway"));
    }
}
