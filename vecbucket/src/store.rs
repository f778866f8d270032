use std::collections::HashSet;

use giztoy_s3vectors::MAX_PUT_VECTORS;
use tracing::{debug, info};

use crate::backend::VectorBackend;
use crate::batch::{build_records, put_in_batches, UPSERT_BATCH_SIZE};
use crate::config::StoreConfig;
use crate::error::{BackendError, Result, StoreError};
use crate::mapping;
use crate::query::postprocess;
use crate::types::{
    CreateIndexParams, IndexShape, IndexStats, Metric, QueryParams, QueryResult,
    UpdateVectorParams, UpsertParams,
};

/// VectorStore manages indexes and vectors in one vector bucket.
///
/// The store owns its backend handle until [`disconnect`](Self::disconnect);
/// afterwards every operation fails with [`BackendError::Disconnected`].
/// No operation retries. Upserts are written in sequential chunks of
/// [`UPSERT_BATCH_SIZE`] and a failed chunk leaves earlier chunks written.
///
/// # Example
///
/// ```rust
/// use giztoy_vecbucket::{CreateIndexParams, MemoryBackend, QueryParams, UpsertParams, VectorStore};
///
/// # async fn run() -> giztoy_vecbucket::Result<()> {
/// let store = VectorStore::new("bucket", MemoryBackend::new());
/// store.create_index(CreateIndexParams::new("docs", 3)).await?;
/// store
///     .upsert(UpsertParams::new("docs", vec![vec![1.0, 0.0, 0.0]]).with_ids(["a"]))
///     .await?;
/// let hits = store
///     .query(QueryParams::new("docs", vec![1.0, 0.0, 0.0]).with_top_k(1))
///     .await?;
/// assert_eq!(hits[0].id, "a");
/// # Ok(())
/// # }
/// ```
pub struct VectorStore {
    bucket: String,
    backend: Option<Box<dyn VectorBackend>>,
    validate_dimensions: bool,
    batch_size: usize,
}

impl VectorStore {
    /// Creates a store over an existing backend.
    pub fn new(bucket: impl Into<String>, backend: impl VectorBackend + 'static) -> Self {
        Self {
            bucket: bucket.into(),
            backend: Some(Box::new(backend)),
            validate_dimensions: false,
            batch_size: UPSERT_BATCH_SIZE,
        }
    }

    /// Builds a signed S3 Vectors client from `config`.
    pub fn connect(config: StoreConfig) -> giztoy_s3vectors::Result<Self> {
        let client = config.build_client()?;
        info!(
            "vecbucket: connected to bucket {} at {}",
            config.bucket,
            client.endpoint()
        );
        Ok(Self::new(config.bucket, client).with_validate_dimensions(config.validate_dimensions))
    }

    pub fn with_validate_dimensions(mut self, enabled: bool) -> Self {
        self.validate_dimensions = enabled;
        self
    }

    /// Overrides the upsert chunk size, up to the service limit.
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.clamp(1, MAX_PUT_VECTORS);
        self
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn is_connected(&self) -> bool {
        self.backend.is_some()
    }

    fn backend(&self) -> std::result::Result<&dyn VectorBackend, BackendError> {
        self.backend.as_deref().ok_or(BackendError::Disconnected)
    }

    // ========================================================================
    // Indexes
    // ========================================================================

    /// Creates an index.
    ///
    /// If the index already exists with the same dimension and metric the
    /// call succeeds; a different shape fails with `index_mismatch`.
    pub async fn create_index(&self, params: CreateIndexParams) -> Result<()> {
        let index = params.index_name.clone();
        let wrap = |source: BackendError| StoreError::IndexCreation {
            index: index.clone(),
            source,
        };

        let backend = self.backend().map_err(wrap)?;
        let req = mapping::create_index_request(&self.bucket, &params).map_err(wrap)?;
        match backend.create_index(&req).await {
            Ok(()) => {
                info!(
                    "vecbucket: created index {} (dimension={}, metric={})",
                    index, params.dimension, params.metric
                );
                Ok(())
            }
            Err(e) if e.is_conflict() => {
                match self
                    .validate_existing_index(&index, params.dimension, params.metric)
                    .await
                {
                    Ok(()) => {
                        info!("vecbucket: index {} already exists with the same shape", index);
                        Ok(())
                    }
                    Err(StoreError::Describe { source, .. }) => Err(wrap(source)),
                    Err(other) => Err(other),
                }
            }
            Err(e) => Err(wrap(e.into())),
        }
    }

    /// Describes `index` and checks its dimension and metric.
    pub async fn validate_existing_index(
        &self,
        index: &str,
        dimension: usize,
        metric: Metric,
    ) -> Result<()> {
        let actual = self.describe_index(index).await?.shape();
        let expected = IndexShape { dimension, metric };
        if actual != expected {
            return Err(StoreError::IndexMismatch {
                index: index.to_string(),
                expected,
                actual,
            });
        }
        Ok(())
    }

    /// Returns the index dimension and metric. `count` is always 0.
    pub async fn describe_index(&self, index: &str) -> Result<IndexStats> {
        let wrap = |source: BackendError| StoreError::Describe {
            index: index.to_string(),
            source,
        };
        let backend = self.backend().map_err(wrap)?;
        let resp = backend
            .get_index(&mapping::get_index_request(&self.bucket, index))
            .await
            .map_err(|e| wrap(e.into()))?;
        Ok(mapping::index_stats(&resp))
    }

    pub async fn delete_index(&self, index: &str) -> Result<()> {
        let wrap = |source: BackendError| StoreError::DeleteIndex {
            index: index.to_string(),
            source,
        };
        let backend = self.backend().map_err(wrap)?;
        backend
            .delete_index(&mapping::delete_index_request(&self.bucket, index))
            .await
            .map_err(|e| wrap(e.into()))?;
        info!("vecbucket: deleted index {}", index);
        Ok(())
    }

    /// Returns the names of every index in the bucket, following pagination.
    pub async fn list_indexes(&self) -> Result<Vec<String>> {
        let wrap = |source: BackendError| StoreError::ListIndexes {
            bucket: self.bucket.clone(),
            source,
        };
        let backend = self.backend().map_err(wrap)?;

        let mut names = Vec::new();
        let mut seen = HashSet::new();
        let mut next_token = None;
        loop {
            let resp = backend
                .list_indexes(&mapping::list_indexes_request(&self.bucket, next_token))
                .await
                .map_err(|e| wrap(e.into()))?;
            names.extend(resp.indexes.into_iter().map(|i| i.index_name));
            match resp.next_token {
                Some(token) if !token.is_empty() => {
                    if !seen.insert(token.clone()) {
                        return Err(wrap(BackendError::InvalidRequest(format!(
                            "non-advancing next token {token:?}"
                        ))));
                    }
                    next_token = Some(token);
                }
                _ => break,
            }
        }
        Ok(names)
    }

    // ========================================================================
    // Vectors
    // ========================================================================

    /// Writes vectors and returns their ids in input order.
    ///
    /// Missing ids are generated as `vector_{i}`. Records are written in
    /// sequential chunks; on failure the error reports how many records
    /// were already committed.
    pub async fn upsert(&self, params: UpsertParams) -> Result<Vec<String>> {
        let index = params.index_name.clone();
        let wrap = |source: BackendError| StoreError::Upsert {
            index: index.clone(),
            committed: 0,
            source,
        };

        let backend = self.backend().map_err(wrap)?;
        let (ids, records) = build_records(params).map_err(wrap)?;
        if records.is_empty() {
            return Ok(ids);
        }
        if self.validate_dimensions {
            self.check_dimensions(backend, &index, records.iter().map(|r| r.data.float32.as_slice()))
                .await
                .map_err(wrap)?;
        }

        let written = put_in_batches(backend, &self.bucket, &index, records, self.batch_size)
            .await
            .map_err(|f| StoreError::Upsert {
                index: index.clone(),
                committed: f.committed,
                source: f.source.into(),
            })?;
        debug!("vecbucket: upserted {} vectors into {}", written, index);
        Ok(ids)
    }

    /// Runs a nearest-neighbor query.
    ///
    /// Scores are `1 - distance` and results keep the service's order.
    pub async fn query(&self, params: QueryParams) -> Result<Vec<QueryResult>> {
        let wrap = |source: BackendError| StoreError::Query {
            index: params.index_name.clone(),
            source,
        };

        let backend = self.backend().map_err(wrap)?;
        if self.validate_dimensions {
            self.check_dimensions(
                backend,
                &params.index_name,
                std::iter::once(params.query_vector.as_slice()),
            )
            .await
            .map_err(wrap)?;
        }

        let req = mapping::query_vectors_request(&self.bucket, &params).map_err(wrap)?;
        let resp = backend
            .query_vectors(&req)
            .await
            .map_err(|e| wrap(e.into()))?;
        let candidates = resp.vectors.len();
        let results = postprocess(resp.vectors, params.include_vector, params.min_score);
        debug!(
            "vecbucket: query {} returned {} of {} candidates",
            params.index_name,
            results.len(),
            candidates
        );
        Ok(results)
    }

    /// Replaces a vector's embedding and metadata.
    ///
    /// Fails locally with `update_requires_vector_data` when no embedding is
    /// given.
    pub async fn update_vector(
        &self,
        index: &str,
        id: &str,
        update: UpdateVectorParams,
    ) -> Result<()> {
        let Some(embedding) = update.embedding else {
            return Err(StoreError::UpdateRequiresVectorData {
                index: index.to_string(),
                id: id.to_string(),
            });
        };
        let wrap = |source: BackendError| StoreError::UpdateVector {
            index: index.to_string(),
            id: id.to_string(),
            source,
        };

        let backend = self.backend().map_err(wrap)?;
        if self.validate_dimensions {
            self.check_dimensions(backend, index, std::iter::once(embedding.as_slice()))
                .await
                .map_err(wrap)?;
        }

        let record = mapping::put_input_vector(id.to_string(), embedding, update.metadata);
        backend
            .put_vectors(&mapping::put_vectors_request(&self.bucket, index, vec![record]))
            .await
            .map_err(|e| wrap(e.into()))?;
        debug!("vecbucket: updated vector {} in {}", id, index);
        Ok(())
    }

    pub async fn delete_vector(&self, index: &str, id: &str) -> Result<()> {
        let wrap = |source: BackendError| StoreError::DeleteVector {
            index: index.to_string(),
            id: id.to_string(),
            source,
        };
        let backend = self.backend().map_err(wrap)?;
        backend
            .delete_vectors(&mapping::delete_vectors_request(
                &self.bucket,
                index,
                vec![id.to_string()],
            ))
            .await
            .map_err(|e| wrap(e.into()))
    }

    /// Deletes several vectors in one request.
    pub async fn delete_vectors(&self, index: &str, ids: &[String]) -> Result<()> {
        let wrap = |source: BackendError| StoreError::DeleteVector {
            index: index.to_string(),
            id: ids.join(","),
            source,
        };
        let backend = self.backend().map_err(wrap)?;
        if ids.is_empty() {
            return Ok(());
        }
        backend
            .delete_vectors(&mapping::delete_vectors_request(
                &self.bucket,
                index,
                ids.to_vec(),
            ))
            .await
            .map_err(|e| wrap(e.into()))
    }

    /// Releases the backend. Safe to call more than once.
    pub fn disconnect(&mut self) {
        if self.backend.take().is_some() {
            info!("vecbucket: disconnected from bucket {}", self.bucket);
        }
    }

    async fn check_dimensions<'a>(
        &self,
        backend: &dyn VectorBackend,
        index: &str,
        mut vectors: impl Iterator<Item = &'a [f32]>,
    ) -> std::result::Result<(), BackendError> {
        let resp = backend
            .get_index(&mapping::get_index_request(&self.bucket, index))
            .await?;
        let expected = resp.index.dimension as usize;
        match vectors.position(|v| v.len() != expected) {
            Some(pos) => Err(BackendError::InvalidRequest(format!(
                "embedding {pos} does not match index dimension {expected}"
            ))),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for VectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorStore")
            .field("bucket", &self.bucket)
            .field("connected", &self.is_connected())
            .field("validate_dimensions", &self.validate_dimensions)
            .field("batch_size", &self.batch_size)
            .finish()
    }
}
