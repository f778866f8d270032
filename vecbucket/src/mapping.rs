//! Conversions between store parameters and S3 Vectors wire requests.

use giztoy_s3vectors::{
    CreateIndexRequest, DataType, DeleteIndexRequest, DeleteVectorsRequest, GetIndexRequest,
    GetIndexResponse, ListIndexesRequest, MetadataConfiguration, PutInputVector,
    PutVectorsRequest, QueryVectorsRequest,
};

use crate::error::BackendError;
use crate::types::{CreateIndexParams, IndexShape, IndexStats, Metadata, QueryParams};

pub fn create_index_request(
    bucket: &str,
    params: &CreateIndexParams,
) -> Result<CreateIndexRequest, BackendError> {
    if params.dimension == 0 {
        return Err(BackendError::InvalidRequest(
            "dimension must be positive".to_string(),
        ));
    }
    let dimension = u32::try_from(params.dimension).map_err(|_| {
        BackendError::InvalidRequest(format!("dimension {} is too large", params.dimension))
    })?;
    let metadata_configuration = if params.non_filterable_metadata_keys.is_empty() {
        None
    } else {
        Some(MetadataConfiguration {
            non_filterable_metadata_keys: params.non_filterable_metadata_keys.clone(),
        })
    };
    Ok(CreateIndexRequest {
        vector_bucket_name: bucket.to_string(),
        index_name: params.index_name.clone(),
        data_type: DataType::Float32,
        dimension,
        distance_metric: params.metric.into(),
        metadata_configuration,
    })
}

pub fn get_index_request(bucket: &str, index: &str) -> GetIndexRequest {
    GetIndexRequest {
        vector_bucket_name: bucket.to_string(),
        index_name: index.to_string(),
    }
}

pub fn delete_index_request(bucket: &str, index: &str) -> DeleteIndexRequest {
    DeleteIndexRequest {
        vector_bucket_name: bucket.to_string(),
        index_name: index.to_string(),
    }
}

pub fn list_indexes_request(bucket: &str, next_token: Option<String>) -> ListIndexesRequest {
    ListIndexesRequest {
        vector_bucket_name: bucket.to_string(),
        next_token,
        ..Default::default()
    }
}

/// Builds one wire record. Empty metadata is omitted.
pub fn put_input_vector(key: String, data: Vec<f32>, metadata: Option<Metadata>) -> PutInputVector {
    PutInputVector {
        key,
        data: data.into(),
        metadata: metadata.filter(|m| !m.is_empty()),
    }
}

pub fn put_vectors_request(
    bucket: &str,
    index: &str,
    vectors: Vec<PutInputVector>,
) -> PutVectorsRequest {
    PutVectorsRequest {
        vector_bucket_name: bucket.to_string(),
        index_name: index.to_string(),
        vectors,
    }
}

/// Builds a nearest-neighbor request. Distance and metadata are always
/// requested; an empty filter is dropped.
pub fn query_vectors_request(
    bucket: &str,
    params: &QueryParams,
) -> Result<QueryVectorsRequest, BackendError> {
    let top_k = u32::try_from(params.top_k()).map_err(|_| {
        BackendError::InvalidRequest(format!("top_k {} is too large", params.top_k()))
    })?;
    Ok(QueryVectorsRequest {
        vector_bucket_name: bucket.to_string(),
        index_name: params.index_name.clone(),
        top_k,
        query_vector: params.query_vector.clone().into(),
        filter: params.filter.clone().filter(|f| !f.is_empty()),
        return_metadata: true,
        return_distance: true,
    })
}

pub fn delete_vectors_request(bucket: &str, index: &str, keys: Vec<String>) -> DeleteVectorsRequest {
    DeleteVectorsRequest {
        vector_bucket_name: bucket.to_string(),
        index_name: index.to_string(),
        keys,
    }
}

pub fn index_shape(resp: &GetIndexResponse) -> IndexShape {
    IndexShape {
        dimension: resp.index.dimension as usize,
        metric: resp.index.distance_metric.into(),
    }
}

pub fn index_stats(resp: &GetIndexResponse) -> IndexStats {
    let shape = index_shape(resp);
    IndexStats {
        dimension: shape.dimension,
        count: 0,
        metric: shape.metric,
    }
}
