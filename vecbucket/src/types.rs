use std::fmt;
use std::str::FromStr;

use giztoy_s3vectors::DistanceMetric;
use serde::{Deserialize, Serialize};

/// Metadata attached to a vector record.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Default number of results returned by [`query`](crate::VectorStore::query).
pub const DEFAULT_TOP_K: usize = 10;

/// Distance metric used to rank nearest neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    Cosine,
    Euclidean,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Cosine => "cosine",
            Metric::Euclidean => "euclidean",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cosine" => Ok(Metric::Cosine),
            "euclidean" => Ok(Metric::Euclidean),
            other => Err(format!("unknown metric {other:?}, expected cosine or euclidean")),
        }
    }
}

impl From<Metric> for DistanceMetric {
    fn from(m: Metric) -> Self {
        match m {
            Metric::Cosine => DistanceMetric::Cosine,
            Metric::Euclidean => DistanceMetric::Euclidean,
        }
    }
}

impl From<DistanceMetric> for Metric {
    fn from(m: DistanceMetric) -> Self {
        match m {
            DistanceMetric::Cosine => Metric::Cosine,
            DistanceMetric::Euclidean => Metric::Euclidean,
        }
    }
}

/// The immutable shape of an index: fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexShape {
    pub dimension: usize,
    pub metric: Metric,
}

impl fmt::Display for IndexShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dimension {} and metric {}", self.dimension, self.metric)
    }
}

/// Result of [`describe_index`](crate::VectorStore::describe_index).
///
/// The service does not report cardinality, so `count` is always 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexStats {
    pub dimension: usize,
    pub count: usize,
    pub metric: Metric,
}

impl IndexStats {
    pub fn shape(&self) -> IndexShape {
        IndexShape {
            dimension: self.dimension,
            metric: self.metric,
        }
    }
}

/// One nearest-neighbor hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub id: String,
    /// `1 - distance`; absent when the service reported no distance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

/// Parameters of [`create_index`](crate::VectorStore::create_index).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateIndexParams {
    pub index_name: String,
    pub dimension: usize,
    #[serde(default)]
    pub metric: Metric,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub non_filterable_metadata_keys: Vec<String>,
}

impl CreateIndexParams {
    pub fn new(index_name: impl Into<String>, dimension: usize) -> Self {
        Self {
            index_name: index_name.into(),
            dimension,
            metric: Metric::default(),
            non_filterable_metadata_keys: Vec::new(),
        }
    }

    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_non_filterable_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.non_filterable_metadata_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn shape(&self) -> IndexShape {
        IndexShape {
            dimension: self.dimension,
            metric: self.metric,
        }
    }
}

/// Parameters of [`upsert`](crate::VectorStore::upsert).
///
/// `metadata` and `ids`, when present, run parallel to `vectors`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpsertParams {
    pub index_name: String,
    pub vectors: Vec<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Vec<Metadata>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ids: Option<Vec<String>>,
}

impl UpsertParams {
    pub fn new(index_name: impl Into<String>, vectors: Vec<Vec<f32>>) -> Self {
        Self {
            index_name: index_name.into(),
            vectors,
            metadata: None,
            ids: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Vec<Metadata>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn with_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }
}

/// Parameters of [`query`](crate::VectorStore::query).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryParams {
    pub index_name: String,
    pub query_vector: Vec<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<usize>,
    /// Exact-match conjunction over metadata keys; evaluated remotely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Metadata>,
    #[serde(default)]
    pub include_vector: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f32>,
}

impl QueryParams {
    pub fn new(index_name: impl Into<String>, query_vector: Vec<f32>) -> Self {
        Self {
            index_name: index_name.into(),
            query_vector,
            top_k: None,
            filter: None,
            include_vector: false,
            min_score: None,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn with_filter(mut self, filter: Metadata) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_include_vector(mut self, include: bool) -> Self {
        self.include_vector = include;
        self
    }

    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = Some(min_score);
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k.unwrap_or(DEFAULT_TOP_K)
    }
}

/// Replacement data for [`update_vector`](crate::VectorStore::update_vector).
///
/// The service only supports whole-record writes, so `embedding` is
/// required; metadata is replaced, not merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateVectorParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl UpdateVectorParams {
    pub fn embedding(embedding: Vec<f32>) -> Self {
        Self {
            embedding: Some(embedding),
            metadata: None,
        }
    }

    pub fn metadata_only(metadata: Metadata) -> Self {
        Self {
            embedding: None,
            metadata: Some(metadata),
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}
