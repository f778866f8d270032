//! Request and response shapes of the S3 Vectors API.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Metadata document attached to a vector. Values are strings, numbers,
/// booleans, null, or lists of those.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Distance metric of an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    #[default]
    Cosine,
    Euclidean,
}

impl DistanceMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceMetric::Cosine => "cosine",
            DistanceMetric::Euclidean => "euclidean",
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistanceMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cosine" => Ok(DistanceMetric::Cosine),
            "euclidean" => Ok(DistanceMetric::Euclidean),
            other => Err(format!("unsupported distance metric: {other}")),
        }
    }
}

/// Element type of stored vectors. Only float32 is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    #[default]
    Float32,
}

/// Vector payload in its wire form: `{"float32": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorData {
    pub float32: Vec<f32>,
}

impl From<Vec<f32>> for VectorData {
    fn from(float32: Vec<f32>) -> Self {
        Self { float32 }
    }
}

/// Index-level metadata settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataConfiguration {
    /// Metadata keys that are stored but cannot be used in query filters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub non_filterable_metadata_keys: Vec<String>,
}

// ============================================================================
// Index operations
// ============================================================================

/// Request body of `CreateIndex`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIndexRequest {
    pub vector_bucket_name: String,
    pub index_name: String,
    pub data_type: DataType,
    pub dimension: u32,
    pub distance_metric: DistanceMetric,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_configuration: Option<MetadataConfiguration>,
}

/// Request body of `GetIndex`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetIndexRequest {
    pub vector_bucket_name: String,
    pub index_name: String,
}

/// Index attributes as reported by `GetIndex`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Index {
    #[serde(default)]
    pub vector_bucket_name: String,
    pub index_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_arn: Option<String>,
    /// Epoch seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<f64>,
    #[serde(default)]
    pub data_type: DataType,
    pub dimension: u32,
    pub distance_metric: DistanceMetric,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_configuration: Option<MetadataConfiguration>,
}

/// Response body of `GetIndex`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetIndexResponse {
    pub index: Index,
}

/// Request body of `DeleteIndex`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteIndexRequest {
    pub vector_bucket_name: String,
    pub index_name: String,
}

/// Request body of `ListIndexes`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListIndexesRequest {
    pub vector_bucket_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_results: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

/// One entry of a `ListIndexes` page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSummary {
    #[serde(default)]
    pub vector_bucket_name: String,
    pub index_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<f64>,
}

/// Response body of `ListIndexes`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListIndexesResponse {
    #[serde(default)]
    pub indexes: Vec<IndexSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

// ============================================================================
// Vector operations
// ============================================================================

/// A vector to write with `PutVectors`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PutInputVector {
    pub key: String,
    pub data: VectorData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Document>,
}

/// Request body of `PutVectors`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PutVectorsRequest {
    pub vector_bucket_name: String,
    pub index_name: String,
    pub vectors: Vec<PutInputVector>,
}

/// Request body of `QueryVectors`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryVectorsRequest {
    pub vector_bucket_name: String,
    pub index_name: String,
    pub top_k: u32,
    pub query_vector: VectorData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Document>,
    #[serde(default)]
    pub return_metadata: bool,
    #[serde(default)]
    pub return_distance: bool,
}

/// A single nearest-neighbor candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryOutputVector {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Document>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<VectorData>,
}

/// Response body of `QueryVectors`. Candidates are ordered closest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryVectorsResponse {
    #[serde(default)]
    pub vectors: Vec<QueryOutputVector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_metric: Option<DistanceMetric>,
}

/// Request body of `DeleteVectors`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteVectorsRequest {
    pub vector_bucket_name: String,
    pub index_name: String,
    pub keys: Vec<String>,
}
