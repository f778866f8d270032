use std::fmt;

use thiserror::Error;

use crate::types::IndexShape;

/// Stable, machine-readable error codes. Every [`StoreError`] maps to
/// exactly one code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    IndexCreationFailed,
    UpsertFailed,
    QueryFailed,
    DescribeFailed,
    DeleteIndexFailed,
    ListIndexesFailed,
    UpdateVectorFailed,
    DeleteVectorFailed,
    UpdateRequiresVectorData,
    IndexMismatch,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::IndexCreationFailed => "index_creation_failed",
            ErrorCode::UpsertFailed => "upsert_failed",
            ErrorCode::QueryFailed => "query_failed",
            ErrorCode::DescribeFailed => "describe_failed",
            ErrorCode::DeleteIndexFailed => "delete_index_failed",
            ErrorCode::ListIndexesFailed => "list_indexes_failed",
            ErrorCode::UpdateVectorFailed => "update_vector_failed",
            ErrorCode::DeleteVectorFailed => "delete_vector_failed",
            ErrorCode::UpdateRequiresVectorData => "update_requires_vector_data",
            ErrorCode::IndexMismatch => "index_mismatch",
        }
    }

    /// Returns true for codes raised without contacting the service.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ErrorCode::UpdateRequiresVectorData | ErrorCode::IndexMismatch
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Underlying cause of a failed operation.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The remote call failed.
    #[error(transparent)]
    Remote(#[from] giztoy_s3vectors::Error),

    /// The store was disconnected before the call.
    #[error("store is disconnected")]
    Disconnected,

    /// Arguments were rejected before any request was sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl BackendError {
    /// Returns the remote error, if the failure came from the service.
    pub fn remote(&self) -> Option<&giztoy_s3vectors::Error> {
        match self {
            BackendError::Remote(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.remote().is_some_and(|e| e.is_not_found())
    }

    pub fn is_conflict(&self) -> bool {
        self.remote().is_some_and(|e| e.is_conflict())
    }
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Error returned by every [`VectorStore`](crate::VectorStore) operation.
///
/// Each variant corresponds to one [`ErrorCode`] and carries the index and,
/// where relevant, vector id it concerns. Remote failures are attached
/// verbatim as `source` and exposed through [`StoreError::details`].
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("vecbucket: failed to create index {index}: {source}")]
    IndexCreation { index: String, source: BackendError },

    /// Batches written before the failing one stay committed.
    #[error(
        "vecbucket: failed to upsert vectors into index {index} ({committed} committed before the failure): {source}"
    )]
    Upsert {
        index: String,
        committed: usize,
        source: BackendError,
    },

    #[error("vecbucket: failed to query index {index}: {source}")]
    Query { index: String, source: BackendError },

    #[error("vecbucket: failed to describe index {index}: {source}")]
    Describe { index: String, source: BackendError },

    #[error("vecbucket: failed to delete index {index}: {source}")]
    DeleteIndex { index: String, source: BackendError },

    #[error("vecbucket: failed to list indexes in bucket {bucket}: {source}")]
    ListIndexes { bucket: String, source: BackendError },

    #[error("vecbucket: failed to update vector {id} in index {index}: {source}")]
    UpdateVector {
        index: String,
        id: String,
        source: BackendError,
    },

    #[error("vecbucket: failed to delete vector {id} from index {index}: {source}")]
    DeleteVector {
        index: String,
        id: String,
        source: BackendError,
    },

    #[error(
        "vecbucket: updating vector {id} in index {index} requires an embedding; metadata-only updates are not supported"
    )]
    UpdateRequiresVectorData { index: String, id: String },

    #[error("vecbucket: index {index} has {actual}, expected {expected}")]
    IndexMismatch {
        index: String,
        expected: IndexShape,
        actual: IndexShape,
    },
}

impl StoreError {
    pub fn code(&self) -> ErrorCode {
        match self {
            StoreError::IndexCreation { .. } => ErrorCode::IndexCreationFailed,
            StoreError::Upsert { .. } => ErrorCode::UpsertFailed,
            StoreError::Query { .. } => ErrorCode::QueryFailed,
            StoreError::Describe { .. } => ErrorCode::DescribeFailed,
            StoreError::DeleteIndex { .. } => ErrorCode::DeleteIndexFailed,
            StoreError::ListIndexes { .. } => ErrorCode::ListIndexesFailed,
            StoreError::UpdateVector { .. } => ErrorCode::UpdateVectorFailed,
            StoreError::DeleteVector { .. } => ErrorCode::DeleteVectorFailed,
            StoreError::UpdateRequiresVectorData { .. } => ErrorCode::UpdateRequiresVectorData,
            StoreError::IndexMismatch { .. } => ErrorCode::IndexMismatch,
        }
    }

    /// Human-readable description naming the operation and its target.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// The wrapped cause, absent for purely local validation errors.
    pub fn details(&self) -> Option<&BackendError> {
        match self {
            StoreError::IndexCreation { source, .. }
            | StoreError::Upsert { source, .. }
            | StoreError::Query { source, .. }
            | StoreError::Describe { source, .. }
            | StoreError::DeleteIndex { source, .. }
            | StoreError::ListIndexes { source, .. }
            | StoreError::UpdateVector { source, .. }
            | StoreError::DeleteVector { source, .. } => Some(source),
            StoreError::UpdateRequiresVectorData { .. } | StoreError::IndexMismatch { .. } => None,
        }
    }

    /// The index the failed operation targeted, if any.
    pub fn index(&self) -> Option<&str> {
        match self {
            StoreError::IndexCreation { index, .. }
            | StoreError::Upsert { index, .. }
            | StoreError::Query { index, .. }
            | StoreError::Describe { index, .. }
            | StoreError::DeleteIndex { index, .. }
            | StoreError::UpdateVector { index, .. }
            | StoreError::DeleteVector { index, .. }
            | StoreError::UpdateRequiresVectorData { index, .. }
            | StoreError::IndexMismatch { index, .. } => Some(index),
            StoreError::ListIndexes { .. } => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.details().is_some_and(|d| d.is_not_found())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Metric;
    use std::error::Error as _;

    #[test]
    fn test_codes_are_snake_case() {
        let err = StoreError::UpdateRequiresVectorData {
            index: "docs".into(),
            id: "a".into(),
        };
        assert_eq!(err.code().as_str(), "update_requires_vector_data");
        assert_eq!(err.code().to_string(), "update_requires_vector_data");
        assert!(err.code().is_local());
        assert!(err.details().is_none());
        assert_eq!(err.index(), Some("docs"));
    }

    #[test]
    fn test_remote_cause_is_kept_verbatim() {
        let remote = giztoy_s3vectors::Error::api(404, "NotFoundException", "no such index");
        let err = StoreError::Describe {
            index: "docs".into(),
            source: remote.into(),
        };
        assert_eq!(err.code(), ErrorCode::DescribeFailed);
        assert!(!err.code().is_local());
        assert!(err.is_not_found());

        let msg = err.message();
        assert!(msg.contains("describe index docs"), "{msg}");
        assert!(msg.contains("no such index"), "{msg}");

        let details = err.details().unwrap();
        assert_eq!(details.remote().unwrap().code(), Some("NotFoundException"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_upsert_message_reports_committed() {
        let err = StoreError::Upsert {
            index: "docs".into(),
            committed: 20,
            source: BackendError::Disconnected,
        };
        assert_eq!(err.code(), ErrorCode::UpsertFailed);
        assert!(err.message().contains("20 committed"));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_index_mismatch_message() {
        let err = StoreError::IndexMismatch {
            index: "docs".into(),
            expected: IndexShape {
                dimension: 3,
                metric: Metric::Cosine,
            },
            actual: IndexShape {
                dimension: 4,
                metric: Metric::Euclidean,
            },
        };
        assert_eq!(err.code(), ErrorCode::IndexMismatch);
        assert_eq!(
            err.message(),
            "vecbucket: index docs has dimension 4 and metric euclidean, expected dimension 3 and metric cosine"
        );
    }

    #[test]
    fn test_list_indexes_has_no_index() {
        let err = StoreError::ListIndexes {
            bucket: "b".into(),
            source: BackendError::InvalidRequest("x".into()),
        };
        assert_eq!(err.index(), None);
        assert_eq!(err.code(), ErrorCode::ListIndexesFailed);
    }
}
