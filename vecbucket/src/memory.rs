//! In-process stand-in for the S3 Vectors service.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use giztoy_s3vectors::{
    error_code, CreateIndexRequest, DataType, DeleteIndexRequest, DeleteVectorsRequest, Document,
    Error, GetIndexRequest, GetIndexResponse, Index, IndexSummary, ListIndexesRequest,
    ListIndexesResponse, PutVectorsRequest, QueryOutputVector,
    QueryVectorsRequest, QueryVectorsResponse, Result,
};

use crate::backend::VectorBackend;
use crate::distance::distance;

const DEFAULT_PAGE_SIZE: usize = 500;

/// Remote operations, for call counting and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateIndex,
    GetIndex,
    DeleteIndex,
    ListIndexes,
    PutVectors,
    QueryVectors,
    DeleteVectors,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::CreateIndex => "CreateIndex",
            Operation::GetIndex => "GetIndex",
            Operation::DeleteIndex => "DeleteIndex",
            Operation::ListIndexes => "ListIndexes",
            Operation::PutVectors => "PutVectors",
            Operation::QueryVectors => "QueryVectors",
            Operation::DeleteVectors => "DeleteVectors",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
struct Record {
    key: String,
    data: Vec<f32>,
    metadata: Option<Document>,
}

#[derive(Debug)]
struct IndexState {
    index: Index,
    records: Vec<Record>,
}

impl IndexState {
    fn non_filterable(&self) -> &[String] {
        self.index
            .metadata_configuration
            .as_ref()
            .map(|c| c.non_filterable_metadata_keys.as_slice())
            .unwrap_or(&[])
    }
}

type IndexKey = (String, String);

#[derive(Default)]
struct Inner {
    indexes: RwLock<HashMap<IndexKey, IndexState>>,
    calls: Mutex<HashMap<Operation, usize>>,
    /// Remaining successful calls before an operation starts failing.
    failures: Mutex<HashMap<Operation, usize>>,
    return_data: AtomicBool,
    page_size: Mutex<Option<usize>>,
    put_sizes: Mutex<Vec<usize>>,
}

/// MemoryBackend emulates the vector bucket API in memory.
///
/// Buckets are created implicitly. Records keep insertion order and queries
/// are brute force. Clones share state, so a test can keep a handle while
/// the store owns another.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    inner: Arc<Inner>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `QueryVectors` return stored vector data with each hit.
    pub fn returning_data(self, enabled: bool) -> Self {
        self.inner.return_data.store(enabled, Ordering::SeqCst);
        self
    }

    /// Limits the number of indexes per `ListIndexes` page.
    pub fn with_page_size(self, size: usize) -> Self {
        *lock(&self.inner.page_size) = Some(size.max(1));
        self
    }

    /// Lets `op` succeed `successes` more times, then fail with a 503.
    pub fn fail_operation_after(&self, op: Operation, successes: usize) {
        lock(&self.inner.failures).insert(op, successes);
    }

    /// Removes injected failures.
    pub fn clear_failures(&self) {
        lock(&self.inner.failures).clear();
    }

    /// Number of calls made to `op`, including failed ones.
    pub fn call_count(&self, op: Operation) -> usize {
        lock(&self.inner.calls).get(&op).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        lock(&self.inner.calls).values().sum()
    }

    /// Record count of every `PutVectors` request, in call order.
    pub fn put_batch_sizes(&self) -> Vec<usize> {
        lock(&self.inner.put_sizes).clone()
    }

    /// Number of records stored in an index, if it exists.
    pub fn vector_count(&self, bucket: &str, index: &str) -> Option<usize> {
        read(&self.inner.indexes)
            .get(&(bucket.to_string(), index.to_string()))
            .map(|s| s.records.len())
    }

    /// Stored keys of an index, in insertion order.
    pub fn keys(&self, bucket: &str, index: &str) -> Vec<String> {
        read(&self.inner.indexes)
            .get(&(bucket.to_string(), index.to_string()))
            .map(|s| s.records.iter().map(|r| r.key.clone()).collect())
            .unwrap_or_default()
    }

    /// Stored data and metadata of one vector.
    pub fn get_vector(&self, bucket: &str, index: &str, key: &str) -> Option<(Vec<f32>, Option<Document>)> {
        read(&self.inner.indexes)
            .get(&(bucket.to_string(), index.to_string()))
            .and_then(|s| s.records.iter().find(|r| r.key == key))
            .map(|r| (r.data.clone(), r.metadata.clone()))
    }

    fn begin(&self, op: Operation) -> Result<()> {
        *lock(&self.inner.calls).entry(op).or_insert(0) += 1;

        let mut failures = lock(&self.inner.failures);
        if let Some(remaining) = failures.get_mut(&op) {
            if *remaining == 0 {
                return Err(Error::api(
                    503,
                    error_code::SERVICE_UNAVAILABLE,
                    format!("injected failure for {op}"),
                ));
            }
            *remaining -= 1;
        }
        Ok(())
    }
}

impl fmt::Debug for MemoryBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryBackend")
            .field("indexes", &read(&self.inner.indexes).len())
            .field("calls", &self.total_calls())
            .finish()
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

fn read<T>(l: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    l.read().unwrap_or_else(|e| e.into_inner())
}

fn write<T>(l: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    l.write().unwrap_or_else(|e| e.into_inner())
}

fn not_found(bucket: &str, index: &str) -> Error {
    Error::api(
        404,
        error_code::NOT_FOUND,
        format!("index {index} not found in vector bucket {bucket}"),
    )
}

fn validation(message: impl Into<String>) -> Error {
    Error::api(400, error_code::VALIDATION, message)
}

fn matches_filter(metadata: Option<&Document>, filter: &Document) -> bool {
    filter
        .iter()
        .all(|(k, v)| metadata.and_then(|m| m.get(k)) == Some(v))
}

#[async_trait]
impl VectorBackend for MemoryBackend {
    async fn create_index(&self, req: &CreateIndexRequest) -> Result<()> {
        self.begin(Operation::CreateIndex)?;
        if req.dimension == 0 {
            return Err(validation("dimension must be at least 1"));
        }

        let key = (req.vector_bucket_name.clone(), req.index_name.clone());
        let mut indexes = write(&self.inner.indexes);
        if indexes.contains_key(&key) {
            return Err(Error::api(
                409,
                error_code::CONFLICT,
                format!("index {} already exists", req.index_name),
            ));
        }
        indexes.insert(
            key,
            IndexState {
                index: Index {
                    vector_bucket_name: req.vector_bucket_name.clone(),
                    index_name: req.index_name.clone(),
                    index_arn: None,
                    creation_time: None,
                    data_type: DataType::Float32,
                    dimension: req.dimension,
                    distance_metric: req.distance_metric,
                    metadata_configuration: req.metadata_configuration.clone(),
                },
                records: Vec::new(),
            },
        );
        Ok(())
    }

    async fn get_index(&self, req: &GetIndexRequest) -> Result<GetIndexResponse> {
        self.begin(Operation::GetIndex)?;
        let indexes = read(&self.inner.indexes);
        let state = indexes
            .get(&(req.vector_bucket_name.clone(), req.index_name.clone()))
            .ok_or_else(|| not_found(&req.vector_bucket_name, &req.index_name))?;
        Ok(GetIndexResponse {
            index: state.index.clone(),
        })
    }

    async fn delete_index(&self, req: &DeleteIndexRequest) -> Result<()> {
        self.begin(Operation::DeleteIndex)?;
        write(&self.inner.indexes)
            .remove(&(req.vector_bucket_name.clone(), req.index_name.clone()))
            .map(|_| ())
            .ok_or_else(|| not_found(&req.vector_bucket_name, &req.index_name))
    }

    async fn list_indexes(&self, req: &ListIndexesRequest) -> Result<ListIndexesResponse> {
        self.begin(Operation::ListIndexes)?;
        let prefix = req.prefix.as_deref().unwrap_or("");
        let mut names: Vec<String> = read(&self.inner.indexes)
            .keys()
            .filter(|(bucket, name)| *bucket == req.vector_bucket_name && name.starts_with(prefix))
            .map(|(_, name)| name.clone())
            .collect();
        names.sort();

        let start = match &req.next_token {
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| validation(format!("invalid next token {token:?}")))?,
            None => 0,
        };
        if start > names.len() {
            return Err(validation(format!("next token {start} is past the last index")));
        }
        let page_size = req
            .max_results
            .map(|n| n as usize)
            .or(*lock(&self.inner.page_size))
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .max(1);
        let end = start.saturating_add(page_size).min(names.len());

        let indexes = names[start..end]
            .iter()
            .map(|name| IndexSummary {
                vector_bucket_name: req.vector_bucket_name.clone(),
                index_name: name.clone(),
                index_arn: None,
                creation_time: None,
            })
            .collect();
        let next_token = (end < names.len()).then(|| end.to_string());
        Ok(ListIndexesResponse {
            indexes,
            next_token,
        })
    }

    async fn put_vectors(&self, req: &PutVectorsRequest) -> Result<()> {
        lock(&self.inner.put_sizes).push(req.vectors.len());
        self.begin(Operation::PutVectors)?;
        let mut indexes = write(&self.inner.indexes);
        let state = indexes
            .get_mut(&(req.vector_bucket_name.clone(), req.index_name.clone()))
            .ok_or_else(|| not_found(&req.vector_bucket_name, &req.index_name))?;

        let dimension = state.index.dimension as usize;
        if let Some(bad) = req.vectors.iter().find(|v| v.data.float32.len() != dimension) {
            return Err(validation(format!(
                "vector {} has dimension {}, index {} expects {}",
                bad.key,
                bad.data.float32.len(),
                req.index_name,
                dimension
            )));
        }

        for v in &req.vectors {
            let record = Record {
                key: v.key.clone(),
                data: v.data.float32.clone(),
                metadata: v.metadata.clone(),
            };
            match state.records.iter_mut().find(|r| r.key == v.key) {
                Some(existing) => *existing = record,
                None => state.records.push(record),
            }
        }
        Ok(())
    }

    async fn query_vectors(&self, req: &QueryVectorsRequest) -> Result<QueryVectorsResponse> {
        self.begin(Operation::QueryVectors)?;
        let indexes = read(&self.inner.indexes);
        let state = indexes
            .get(&(req.vector_bucket_name.clone(), req.index_name.clone()))
            .ok_or_else(|| not_found(&req.vector_bucket_name, &req.index_name))?;

        if req.top_k == 0 {
            return Err(validation("topK must be at least 1"));
        }
        if req.query_vector.float32.len() != state.index.dimension as usize {
            return Err(validation(format!(
                "query vector has dimension {}, index {} expects {}",
                req.query_vector.float32.len(),
                req.index_name,
                state.index.dimension
            )));
        }
        let filter = req.filter.as_ref().filter(|f| !f.is_empty());
        if let Some(f) = filter {
            if let Some(k) = f.keys().find(|k| state.non_filterable().contains(k)) {
                return Err(validation(format!("metadata key {k} is not filterable")));
            }
        }

        let metric = state.index.distance_metric.into();
        let mut hits: Vec<(&Record, f32)> = state
            .records
            .iter()
            .filter(|r| filter.is_none_or(|f| matches_filter(r.metadata.as_ref(), f)))
            .map(|r| (r, distance(metric, &req.query_vector.float32, &r.data)))
            .collect();
        hits.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(req.top_k as usize);

        let return_data = self.inner.return_data.load(Ordering::SeqCst);
        let vectors = hits
            .into_iter()
            .map(|(r, d)| QueryOutputVector {
                key: r.key.clone(),
                distance: req.return_distance.then_some(d),
                metadata: if req.return_metadata {
                    r.metadata.clone()
                } else {
                    None
                },
                data: return_data.then(|| r.data.clone().into()),
            })
            .collect();

        Ok(QueryVectorsResponse {
            vectors,
            distance_metric: Some(state.index.distance_metric),
        })
    }

    async fn delete_vectors(&self, req: &DeleteVectorsRequest) -> Result<()> {
        self.begin(Operation::DeleteVectors)?;
        let mut indexes = write(&self.inner.indexes);
        let state = indexes
            .get_mut(&(req.vector_bucket_name.clone(), req.index_name.clone()))
            .ok_or_else(|| not_found(&req.vector_bucket_name, &req.index_name))?;
        state.records.retain(|r| !req.keys.contains(&r.key));
        Ok(())
    }
}
