use async_trait::async_trait;
use giztoy_s3vectors::{
    Client, CreateIndexRequest, DeleteIndexRequest, DeleteVectorsRequest, GetIndexRequest,
    GetIndexResponse, ListIndexesRequest, ListIndexesResponse, PutVectorsRequest,
    QueryVectorsRequest, QueryVectorsResponse, Result,
};

/// The remote operations the store consumes.
///
/// Implemented by the signed HTTP [`Client`] and by
/// [`MemoryBackend`](crate::MemoryBackend). Every method is one request.
#[async_trait]
pub trait VectorBackend: Send + Sync {
    async fn create_index(&self, req: &CreateIndexRequest) -> Result<()>;

    async fn get_index(&self, req: &GetIndexRequest) -> Result<GetIndexResponse>;

    async fn delete_index(&self, req: &DeleteIndexRequest) -> Result<()>;

    /// Returns one page; callers follow `next_token`.
    async fn list_indexes(&self, req: &ListIndexesRequest) -> Result<ListIndexesResponse>;

    async fn put_vectors(&self, req: &PutVectorsRequest) -> Result<()>;

    async fn query_vectors(&self, req: &QueryVectorsRequest) -> Result<QueryVectorsResponse>;

    async fn delete_vectors(&self, req: &DeleteVectorsRequest) -> Result<()>;
}

#[async_trait]
impl VectorBackend for Client {
    async fn create_index(&self, req: &CreateIndexRequest) -> Result<()> {
        self.index().create(req).await
    }

    async fn get_index(&self, req: &GetIndexRequest) -> Result<GetIndexResponse> {
        self.index().get(req).await
    }

    async fn delete_index(&self, req: &DeleteIndexRequest) -> Result<()> {
        self.index().delete(req).await
    }

    async fn list_indexes(&self, req: &ListIndexesRequest) -> Result<ListIndexesResponse> {
        self.index().list(req).await
    }

    async fn put_vectors(&self, req: &PutVectorsRequest) -> Result<()> {
        self.vectors().put(req).await
    }

    async fn query_vectors(&self, req: &QueryVectorsRequest) -> Result<QueryVectorsResponse> {
        self.vectors().query(req).await
    }

    async fn delete_vectors(&self, req: &DeleteVectorsRequest) -> Result<()> {
        self.vectors().delete(req).await
    }
}
