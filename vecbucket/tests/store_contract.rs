//! Store behavior against the in-memory backend.

use serde_json::json;

use giztoy_vecbucket::{
    chunk_count, distance_to_score, BackendError, CreateIndexParams, ErrorCode, MemoryBackend,
    Metadata, Metric, Operation, QueryParams, StoreError, UpdateVectorParams, UpsertParams,
    VectorStore,
};

const BUCKET: &str = "bucket";

fn store() -> (VectorStore, MemoryBackend) {
    let mem = MemoryBackend::new();
    (VectorStore::new(BUCKET, mem.clone()), mem)
}

fn meta(v: serde_json::Value) -> Metadata {
    v.as_object().cloned().unwrap()
}

fn unit_vectors(n: usize, dim: usize) -> Vec<Vec<f32>> {
    (0..n)
        .map(|i| {
            let mut v = vec![0.0; dim];
            v[i % dim] = 1.0;
            v[(i + 1) % dim] += i as f32 / 100.0;
            v
        })
        .collect()
}

#[tokio::test]
async fn test_docs_scenario() {
    let (store, _) = store();
    store
        .create_index(CreateIndexParams::new("docs", 3).with_metric(Metric::Cosine))
        .await
        .unwrap();
    store
        .upsert(
            UpsertParams::new("docs", vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]])
                .with_ids(["a", "b"]),
        )
        .await
        .unwrap();

    let hits = store
        .query(QueryParams::new("docs", vec![1.0, 0.0, 0.0]).with_top_k(1))
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "a");
    assert_eq!(hits[0].score, Some(1.0));
    assert!(hits[0].metadata.is_empty());
    assert!(hits[0].embedding.is_none());
}

#[tokio::test]
async fn test_upsert_25_generates_ids_in_three_chunks() {
    let (store, mem) = store();
    store.create_index(CreateIndexParams::new("docs", 4)).await.unwrap();

    let ids = store
        .upsert(UpsertParams::new("docs", unit_vectors(25, 4)))
        .await
        .unwrap();

    let expected: Vec<String> = (0..25).map(|i| format!("vector_{i}")).collect();
    assert_eq!(ids, expected);
    assert_eq!(mem.call_count(Operation::PutVectors), 3);
    assert_eq!(mem.put_batch_sizes(), vec![10, 10, 5]);
    assert_eq!(mem.keys(BUCKET, "docs"), expected);
}

#[tokio::test]
async fn test_chunk_count_matches_put_calls() {
    for n in [1usize, 9, 10, 11, 20, 21, 37] {
        let (store, mem) = store();
        store.create_index(CreateIndexParams::new("docs", 4)).await.unwrap();
        store
            .upsert(UpsertParams::new("docs", unit_vectors(n, 4)))
            .await
            .unwrap();
        assert_eq!(mem.call_count(Operation::PutVectors), chunk_count(n, 10), "n={n}");
        assert_eq!(mem.vector_count(BUCKET, "docs"), Some(n));

        let sizes = mem.put_batch_sizes();
        assert!(sizes.iter().all(|&s| (1..=10).contains(&s)), "n={n}: {sizes:?}");
        assert!(sizes[..sizes.len() - 1].iter().all(|&s| s == 10), "n={n}: {sizes:?}");
        assert_eq!(sizes.iter().sum::<usize>(), n);
    }
}

#[tokio::test]
async fn test_generated_ids_do_not_depend_on_chunk_size() {
    let mem = MemoryBackend::new();
    let default = VectorStore::new(BUCKET, mem.clone());
    let small = VectorStore::new(BUCKET, mem.clone()).with_batch_size(3);
    default.create_index(CreateIndexParams::new("a", 2)).await.unwrap();
    default.create_index(CreateIndexParams::new("b", 2)).await.unwrap();

    let x = default.upsert(UpsertParams::new("a", unit_vectors(14, 2))).await.unwrap();
    let y = small.upsert(UpsertParams::new("b", unit_vectors(14, 2))).await.unwrap();
    assert_eq!(x, y);
    assert_eq!(mem.keys(BUCKET, "a"), mem.keys(BUCKET, "b"));
    assert_eq!(mem.call_count(Operation::PutVectors), 2 + 5);
    assert_eq!(mem.put_batch_sizes(), vec![10, 4, 3, 3, 3, 3, 2]);
}

#[tokio::test]
async fn test_partial_batch_failure_keeps_committed_chunks() {
    let (store, mem) = store();
    store.create_index(CreateIndexParams::new("docs", 4)).await.unwrap();
    mem.fail_operation_after(Operation::PutVectors, 2);

    let err = store
        .upsert(UpsertParams::new("docs", unit_vectors(25, 4)))
        .await
        .unwrap_err();

    assert_eq!(err.code(), ErrorCode::UpsertFailed);
    assert!(matches!(err, StoreError::Upsert { committed: 20, .. }));
    assert!(err.message().contains("docs"));
    let remote = err.details().and_then(BackendError::remote).unwrap();
    assert!(remote.is_server_error());

    assert_eq!(mem.call_count(Operation::PutVectors), 3);
    assert_eq!(mem.vector_count(BUCKET, "docs"), Some(20));
}

#[tokio::test]
async fn test_upsert_length_mismatch_is_local() {
    let (store, mem) = store();
    let err = store
        .upsert(UpsertParams::new("docs", unit_vectors(3, 2)).with_ids(["a", "b"]))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::UpsertFailed);
    assert!(matches!(err.details(), Some(BackendError::InvalidRequest(_))));
    assert_eq!(mem.total_calls(), 0);
}

#[tokio::test]
async fn test_upsert_metadata_round_trip() {
    let (store, _) = store();
    store.create_index(CreateIndexParams::new("docs", 2)).await.unwrap();
    store
        .upsert(
            UpsertParams::new("docs", vec![vec![1.0, 0.0], vec![0.0, 1.0]])
                .with_ids(["en", "fr"])
                .with_metadata(vec![meta(json!({"lang": "en"})), meta(json!({"lang": "fr"}))]),
        )
        .await
        .unwrap();

    let hits = store
        .query(
            QueryParams::new("docs", vec![1.0, 0.0])
                .with_filter(meta(json!({"lang": "fr"}))),
        )
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "fr");
    assert_eq!(hits[0].metadata, meta(json!({"lang": "fr"})));
    assert_eq!(hits[0].score, Some(0.0));
}

#[tokio::test]
async fn test_min_score_filter() {
    let (store, _) = store();
    store.create_index(CreateIndexParams::new("docs", 2)).await.unwrap();
    store
        .upsert(
            UpsertParams::new(
                "docs",
                vec![vec![1.0, 0.0], vec![1.0, 1.0], vec![0.0, 1.0], vec![-1.0, 0.0]],
            )
            .with_ids(["same", "diag", "ortho", "opposite"]),
        )
        .await
        .unwrap();

    let all = store
        .query(QueryParams::new("docs", vec![1.0, 0.0]))
        .await
        .unwrap();
    let ids: Vec<_> = all.iter().map(|h| h.id.as_str()).collect();
    assert_eq!(ids, vec!["same", "diag", "ortho", "opposite"]);

    let filtered = store
        .query(QueryParams::new("docs", vec![1.0, 0.0]).with_min_score(0.5))
        .await
        .unwrap();
    let ids: Vec<_> = filtered.iter().map(|h| h.id.as_str()).collect();
    assert_eq!(ids, vec!["same", "diag"]);
    assert!(filtered.iter().all(|h| h.score.unwrap() >= 0.5));
}

#[tokio::test]
async fn test_include_vector() {
    let mem = MemoryBackend::new().returning_data(true);
    let store = VectorStore::new(BUCKET, mem);
    store.create_index(CreateIndexParams::new("docs", 2)).await.unwrap();
    store
        .upsert(UpsertParams::new("docs", vec![vec![0.6, 0.8]]).with_ids(["a"]))
        .await
        .unwrap();

    let without = store
        .query(QueryParams::new("docs", vec![0.6, 0.8]))
        .await
        .unwrap();
    assert!(without[0].embedding.is_none());

    let with = store
        .query(QueryParams::new("docs", vec![0.6, 0.8]).with_include_vector(true))
        .await
        .unwrap();
    assert_eq!(with[0].embedding, Some(vec![0.6, 0.8]));
}

#[test]
fn test_score_transform_over_unit_interval() {
    for i in 0..=1000 {
        let d = i as f32 / 1000.0;
        assert_eq!(distance_to_score(d), 1.0 - d);
    }
}

#[tokio::test]
async fn test_metadata_only_update_makes_no_calls() {
    let (store, mem) = store();
    let err = store
        .update_vector(
            "docs",
            "a",
            UpdateVectorParams::metadata_only(meta(json!({"lang": "en"}))),
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::UpdateRequiresVectorData);
    assert_eq!(err.code().as_str(), "update_requires_vector_data");
    assert!(err.details().is_none());
    assert_eq!(mem.total_calls(), 0);
}

#[tokio::test]
async fn test_update_replaces_vector() {
    let (store, mem) = store();
    store.create_index(CreateIndexParams::new("docs", 2)).await.unwrap();
    store
        .upsert(
            UpsertParams::new("docs", vec![vec![1.0, 0.0]])
                .with_ids(["a"])
                .with_metadata(vec![meta(json!({"v": 1}))]),
        )
        .await
        .unwrap();
    store
        .update_vector(
            "docs",
            "a",
            UpdateVectorParams::embedding(vec![0.0, 1.0]).with_metadata(meta(json!({"v": 2}))),
        )
        .await
        .unwrap();

    let (data, metadata) = mem.get_vector(BUCKET, "docs", "a").unwrap();
    assert_eq!(data, vec![0.0, 1.0]);
    assert_eq!(metadata, Some(meta(json!({"v": 2}))));
    assert_eq!(mem.vector_count(BUCKET, "docs"), Some(1));
}

#[tokio::test]
async fn test_update_missing_index() {
    let (store, _) = store();
    let err = store
        .update_vector("nope", "a", UpdateVectorParams::embedding(vec![1.0]))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::UpdateVectorFailed);
    assert!(err.is_not_found());
    assert!(err.message().contains("vector a"));
}

#[tokio::test]
async fn test_delete_index_then_describe() {
    let (store, _) = store();
    store.create_index(CreateIndexParams::new("docs", 3)).await.unwrap();
    let stats = store.describe_index("docs").await.unwrap();
    assert_eq!(stats.dimension, 3);
    assert_eq!(stats.count, 0);
    assert_eq!(stats.metric, Metric::Cosine);

    store.delete_index("docs").await.unwrap();
    let err = store.describe_index("docs").await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::DescribeFailed);
    assert!(err.is_not_found());
    assert_eq!(err.index(), Some("docs"));
}

#[tokio::test]
async fn test_delete_missing_index() {
    let (store, _) = store();
    let err = store.delete_index("docs").await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::DeleteIndexFailed);
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_create_existing_index() {
    let (store, mem) = store();
    store.create_index(CreateIndexParams::new("docs", 3)).await.unwrap();

    store.create_index(CreateIndexParams::new("docs", 3)).await.unwrap();
    assert_eq!(mem.call_count(Operation::GetIndex), 1);

    let err = store
        .create_index(CreateIndexParams::new("docs", 4).with_metric(Metric::Euclidean))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::IndexMismatch);
    match err {
        StoreError::IndexMismatch {
            expected, actual, ..
        } => {
            assert_eq!(expected.dimension, 4);
            assert_eq!(actual.dimension, 3);
            assert_eq!(actual.metric, Metric::Cosine);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_create_index_remote_failure() {
    let (store, mem) = store();
    mem.fail_operation_after(Operation::CreateIndex, 0);
    let err = store
        .create_index(CreateIndexParams::new("docs", 3))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::IndexCreationFailed);
    assert!(err.message().contains("create index docs"));
}

#[tokio::test]
async fn test_validate_existing_index() {
    let (store, _) = store();
    store
        .create_index(CreateIndexParams::new("docs", 3).with_metric(Metric::Euclidean))
        .await
        .unwrap();
    store
        .validate_existing_index("docs", 3, Metric::Euclidean)
        .await
        .unwrap();
    let err = store
        .validate_existing_index("docs", 3, Metric::Cosine)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::IndexMismatch);
    assert!(err.details().is_none());

    let err = store
        .validate_existing_index("missing", 3, Metric::Cosine)
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::DescribeFailed);
}

#[tokio::test]
async fn test_list_indexes_follows_pages() {
    let mem = MemoryBackend::new().with_page_size(2);
    let store = VectorStore::new(BUCKET, mem.clone());
    for name in ["e", "d", "c", "b", "a"] {
        store.create_index(CreateIndexParams::new(name, 2)).await.unwrap();
    }
    let names = store.list_indexes().await.unwrap();
    assert_eq!(names, vec!["a", "b", "c", "d", "e"]);
    assert_eq!(mem.call_count(Operation::ListIndexes), 3);
}

#[tokio::test]
async fn test_list_indexes_failure() {
    let (store, mem) = store();
    mem.fail_operation_after(Operation::ListIndexes, 0);
    let err = store.list_indexes().await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::ListIndexesFailed);
    assert!(err.message().contains("bucket"));
}

#[tokio::test]
async fn test_delete_vectors() {
    let (store, mem) = store();
    store.create_index(CreateIndexParams::new("docs", 2)).await.unwrap();
    store
        .upsert(UpsertParams::new("docs", unit_vectors(4, 2)).with_ids(["a", "b", "c", "d"]))
        .await
        .unwrap();

    store.delete_vector("docs", "a").await.unwrap();
    store.delete_vector("docs", "not-there").await.unwrap();
    store
        .delete_vectors("docs", &["b".to_string(), "c".to_string()])
        .await
        .unwrap();
    assert_eq!(mem.keys(BUCKET, "docs"), vec!["d"]);

    let err = store.delete_vector("missing", "a").await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::DeleteVectorFailed);
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_query_failure() {
    let (store, _) = store();
    let err = store
        .query(QueryParams::new("missing", vec![1.0]))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::QueryFailed);
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_validate_dimensions() {
    let mem = MemoryBackend::new();
    let store = VectorStore::new(BUCKET, mem.clone()).with_validate_dimensions(true);
    store.create_index(CreateIndexParams::new("docs", 3)).await.unwrap();

    let err = store
        .upsert(UpsertParams::new("docs", vec![vec![1.0, 0.0]]))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::UpsertFailed);
    assert!(matches!(err.details(), Some(BackendError::InvalidRequest(_))));
    assert_eq!(mem.call_count(Operation::PutVectors), 0);
    assert_eq!(mem.call_count(Operation::GetIndex), 1);

    let err = store
        .query(QueryParams::new("docs", vec![1.0]))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::QueryFailed);
    assert_eq!(mem.call_count(Operation::QueryVectors), 0);

    let err = store
        .update_vector("docs", "a", UpdateVectorParams::embedding(vec![1.0]))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::UpdateVectorFailed);
    assert_eq!(mem.call_count(Operation::PutVectors), 0);
}

#[tokio::test]
async fn test_operations_after_disconnect() {
    let (mut store, mem) = store();
    store.create_index(CreateIndexParams::new("docs", 2)).await.unwrap();
    store.disconnect();
    store.disconnect();
    let before = mem.total_calls();

    let codes = vec![
        store
            .create_index(CreateIndexParams::new("x", 2))
            .await
            .unwrap_err(),
        store
            .upsert(UpsertParams::new("docs", vec![vec![1.0, 0.0]]))
            .await
            .unwrap_err(),
        store
            .query(QueryParams::new("docs", vec![1.0, 0.0]))
            .await
            .unwrap_err(),
        store.describe_index("docs").await.unwrap_err(),
        store.delete_index("docs").await.unwrap_err(),
        store.list_indexes().await.unwrap_err(),
        store
            .update_vector("docs", "a", UpdateVectorParams::embedding(vec![1.0, 0.0]))
            .await
            .unwrap_err(),
        store.delete_vector("docs", "a").await.unwrap_err(),
    ];
    let expected = [
        ErrorCode::IndexCreationFailed,
        ErrorCode::UpsertFailed,
        ErrorCode::QueryFailed,
        ErrorCode::DescribeFailed,
        ErrorCode::DeleteIndexFailed,
        ErrorCode::ListIndexesFailed,
        ErrorCode::UpdateVectorFailed,
        ErrorCode::DeleteVectorFailed,
    ];
    for (err, code) in codes.iter().zip(expected) {
        assert_eq!(err.code(), code);
        assert!(matches!(err.details(), Some(BackendError::Disconnected)));
    }
    assert_eq!(mem.total_calls(), before);
    assert_eq!(mem.vector_count(BUCKET, "docs"), Some(0));
}
