//! Loading request parameters from YAML or JSON files.

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Path that selects stdin instead of a file.
pub const STDIN_PATH: &str = "-";

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("failed to read request: {0}")]
    Read(#[from] io::Error),
    #[error("failed to parse YAML request: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("failed to parse JSON request: {0}")]
    Json(#[from] serde_json::Error),
    #[error("request is neither valid YAML nor valid JSON")]
    Unrecognized,
}

/// Loads a request from `path`, or from stdin when `path` is `-`.
pub fn load_request<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, RequestError> {
    let path = path.as_ref();
    if path == Path::new(STDIN_PATH) {
        let mut data = Vec::new();
        io::stdin().read_to_end(&mut data)?;
        return parse_request(&data, path);
    }
    let data = fs::read(path)?;
    parse_request(&data, path)
}

/// Parses by extension: `.yaml`/`.yml` or `.json`. Anything else is tried
/// as JSON, then YAML.
pub fn parse_request<T: DeserializeOwned>(
    data: &[u8],
    path: impl AsRef<Path>,
) -> Result<T, RequestError> {
    let ext = path
        .as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);

    match ext.as_deref() {
        Some("yaml") | Some("yml") => Ok(serde_yaml::from_slice(data)?),
        Some("json") => Ok(serde_json::from_slice(data)?),
        _ => serde_json::from_slice(data)
            .or_else(|_| serde_yaml::from_slice(data))
            .map_err(|_| RequestError::Unrecognized),
    }
}
