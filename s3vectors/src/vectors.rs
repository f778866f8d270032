//! Vector reads and writes.

use std::sync::Arc;

use super::{
    error::Result,
    http::HttpClient,
    types::{DeleteVectorsRequest, PutVectorsRequest, QueryVectorsRequest, QueryVectorsResponse},
};

/// Maximum number of vectors the service accepts in one `PutVectors` call.
pub const MAX_PUT_VECTORS: usize = 500;

/// Service for writing, querying and deleting vectors.
pub struct VectorService {
    http: Arc<HttpClient>,
}

impl VectorService {
    pub(crate) fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    /// Inserts or replaces vectors. Existing keys are overwritten in full.
    pub async fn put(&self, req: &PutVectorsRequest) -> Result<()> {
        self.http.post_empty("PutVectors", req).await
    }

    /// Runs an approximate nearest-neighbor query.
    pub async fn query(&self, req: &QueryVectorsRequest) -> Result<QueryVectorsResponse> {
        self.http.post("QueryVectors", req).await
    }

    /// Deletes vectors by key.
    pub async fn delete(&self, req: &DeleteVectorsRequest) -> Result<()> {
        self.http.post_empty("DeleteVectors", req).await
    }
}
