//! Sequential chunked upsert.

use giztoy_s3vectors::PutInputVector;
use tracing::{debug, warn};

use crate::backend::VectorBackend;
use crate::error::BackendError;
use crate::mapping::{put_input_vector, put_vectors_request};
use crate::types::UpsertParams;

/// Maximum number of records per `PutVectors` request.
pub const UPSERT_BATCH_SIZE: usize = 10;

/// Generates ids by position in the whole input, so chunking never
/// changes them.
pub fn generate_ids(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("vector_{i}")).collect()
}

/// Builds wire records from upsert parameters, returning them with their
/// ids in input order.
///
/// `ids` and `metadata`, when given, must have one entry per vector.
pub fn build_records(params: UpsertParams) -> Result<(Vec<String>, Vec<PutInputVector>), BackendError> {
    let n = params.vectors.len();
    let ids = match params.ids {
        Some(ids) if ids.len() != n => {
            return Err(BackendError::InvalidRequest(format!(
                "got {} ids for {} vectors",
                ids.len(),
                n
            )));
        }
        Some(ids) => ids,
        None => generate_ids(n),
    };
    let metadata: Vec<_> = match params.metadata {
        Some(m) if m.len() != n => {
            return Err(BackendError::InvalidRequest(format!(
                "got {} metadata entries for {} vectors",
                m.len(),
                n
            )));
        }
        Some(m) => m.into_iter().map(Some).collect(),
        None => vec![None; n],
    };

    let records = ids
        .iter()
        .cloned()
        .zip(params.vectors)
        .zip(metadata)
        .map(|((id, data), meta)| put_input_vector(id, data, meta))
        .collect();
    Ok((ids, records))
}

/// A chunk write that failed after `committed` records were stored.
#[derive(Debug)]
pub struct BatchFailure {
    pub committed: usize,
    pub chunk: usize,
    pub source: giztoy_s3vectors::Error,
}

/// Writes `records` in chunks of `batch_size`, one request at a time.
///
/// Stops at the first failing chunk. Earlier chunks stay written.
pub async fn put_in_batches(
    backend: &dyn VectorBackend,
    bucket: &str,
    index: &str,
    records: Vec<PutInputVector>,
    batch_size: usize,
) -> Result<usize, BatchFailure> {
    let batch_size = batch_size.max(1);
    let total = records.len();
    let mut committed = 0;

    for (chunk, batch) in records.chunks(batch_size).enumerate() {
        debug!(
            "vecbucket: upsert {} chunk {} ({} records, {}/{} committed)",
            index,
            chunk,
            batch.len(),
            committed,
            total
        );
        let req = put_vectors_request(bucket, index, batch.to_vec());
        if let Err(source) = backend.put_vectors(&req).await {
            warn!(
                "vecbucket: upsert {} failed at chunk {}, {} of {} records already committed: {}",
                index, chunk, committed, total, source
            );
            return Err(BatchFailure {
                committed,
                chunk,
                source,
            });
        }
        committed += batch.len();
    }
    Ok(committed)
}

/// Number of requests needed to write `count` records.
pub fn chunk_count(count: usize, batch_size: usize) -> usize {
    count.div_ceil(batch_size.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Metadata;
    use serde_json::json;

    #[test]
    fn test_generate_ids() {
        assert_eq!(generate_ids(3), vec!["vector_0", "vector_1", "vector_2"]);
        assert!(generate_ids(0).is_empty());
    }

    #[test]
    fn test_chunk_count() {
        assert_eq!(chunk_count(0, 10), 0);
        assert_eq!(chunk_count(10, 10), 1);
        assert_eq!(chunk_count(11, 10), 2);
        assert_eq!(chunk_count(25, 10), 3);
    }

    #[test]
    fn test_build_records_generates_ids() {
        let params = UpsertParams::new("docs", vec![vec![1.0]; 12]);
        let (ids, records) = build_records(params).unwrap();
        assert_eq!(ids.len(), 12);
        assert_eq!(ids[11], "vector_11");
        assert_eq!(records[11].key, "vector_11");
        assert!(records.iter().all(|r| r.metadata.is_none()));
    }

    #[test]
    fn test_build_records_keeps_supplied_ids_and_metadata() {
        let mut m = Metadata::new();
        m.insert("lang".into(), json!("en"));
        let params = UpsertParams::new("docs", vec![vec![1.0], vec![2.0]])
            .with_ids(["a", "b"])
            .with_metadata(vec![m.clone(), Metadata::new()]);
        let (ids, records) = build_records(params).unwrap();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(records[0].metadata, Some(m));
        assert!(records[1].metadata.is_none());
        assert_eq!(records[1].data.float32, vec![2.0]);
    }

    #[test]
    fn test_build_records_rejects_length_mismatch() {
        let params = UpsertParams::new("docs", vec![vec![1.0], vec![2.0]]).with_ids(["a"]);
        assert!(matches!(build_records(params), Err(BackendError::InvalidRequest(_))));

        let params =
            UpsertParams::new("docs", vec![vec![1.0]]).with_metadata(vec![Metadata::new(); 2]);
        assert!(matches!(build_records(params), Err(BackendError::InvalidRequest(_))));
    }
}
