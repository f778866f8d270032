//! Amazon S3 Vectors API client for Rust.
//!
//! This crate provides a signed JSON client for the vector bucket API:
//! index management (create, get, list, delete) and vector writes, queries
//! and deletes.

mod client;
mod credentials;
mod error;
pub mod http;
mod index;
pub mod sigv4;
mod types;
mod vectors;

pub use client::{default_endpoint, Client, ClientBuilder, DEFAULT_TIMEOUT};
pub use credentials::Credentials;
pub use error::{error_code, Error, Result};
pub use index::IndexService;
pub use types::*;
pub use vectors::{VectorService, MAX_PUT_VECTORS};
