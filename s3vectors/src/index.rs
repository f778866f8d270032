//! Vector index management.

use std::sync::Arc;

use super::{
    error::Result,
    http::HttpClient,
    types::{
        CreateIndexRequest, DeleteIndexRequest, GetIndexRequest, GetIndexResponse,
        ListIndexesRequest, ListIndexesResponse,
    },
};

/// Service for creating, describing, listing and deleting indexes.
pub struct IndexService {
    http: Arc<HttpClient>,
}

impl IndexService {
    pub(crate) fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    /// Creates a vector index in a bucket.
    pub async fn create(&self, req: &CreateIndexRequest) -> Result<()> {
        self.http.post_empty("CreateIndex", req).await
    }

    /// Returns the attributes of an index.
    pub async fn get(&self, req: &GetIndexRequest) -> Result<GetIndexResponse> {
        self.http.post("GetIndex", req).await
    }

    /// Deletes an index and every vector in it.
    pub async fn delete(&self, req: &DeleteIndexRequest) -> Result<()> {
        self.http.post_empty("DeleteIndex", req).await
    }

    /// Returns one page of indexes. Callers pass the previous `next_token`
    /// to continue.
    pub async fn list(&self, req: &ListIndexesRequest) -> Result<ListIndexesResponse> {
        self.http.post("ListIndexes", req).await
    }
}
