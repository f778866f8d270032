//! Vector storage on Amazon S3 Vectors.
//!
//! [`VectorStore`] creates, describes, lists and deletes indexes in a vector
//! bucket, and upserts, queries, updates and deletes vectors in them. Every
//! failure is a [`StoreError`] with a stable [`ErrorCode`].
//!
//! The store talks to a [`VectorBackend`]: the signed HTTP client from
//! `giztoy-s3vectors`, or [`MemoryBackend`] for tests and local use.

mod backend;
mod batch;
mod config;
mod distance;
mod error;
mod mapping;
mod memory;
mod query;
mod store;
mod types;

pub use backend::VectorBackend;
pub use batch::{chunk_count, generate_ids, UPSERT_BATCH_SIZE};
pub use config::StoreConfig;
pub use distance::{cosine_distance, euclidean_distance};
pub use error::{BackendError, ErrorCode, Result, StoreError};
pub use memory::{MemoryBackend, Operation};
pub use query::distance_to_score;
pub use store::VectorStore;
pub use types::{
    CreateIndexParams, IndexShape, IndexStats, Metadata, Metric, QueryParams, QueryResult,
    UpdateVectorParams, UpsertParams, DEFAULT_TOP_K,
};
