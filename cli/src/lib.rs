//! CLI utilities for giztoy.
//!
//! kubectl-style contexts stored in `~/.giztoy/{app}/config.yaml`, request
//! loading from YAML or JSON files, and YAML/JSON result output.

pub mod config;
pub mod output;
pub mod request;

pub use config::{load_config, mask_secret, Config, Context};
pub use output::{Output, OutputFormat};
pub use request::{load_request, parse_request, RequestError};
