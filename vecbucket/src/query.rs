//! Turns raw nearest-neighbor candidates into [`QueryResult`]s.

use giztoy_s3vectors::QueryOutputVector;

use crate::types::{Metadata, QueryResult};

/// Converts a service distance to a similarity score.
///
/// Exact only for cosine distance in `[0, 1]`; euclidean distances are
/// passed through the same transform.
pub fn distance_to_score(distance: f32) -> f32 {
    1.0 - distance
}

/// Scores candidates, drops those below `min_score`, and keeps the
/// service's order. Candidates without a distance are never dropped.
pub fn postprocess(
    candidates: Vec<QueryOutputVector>,
    include_vector: bool,
    min_score: Option<f32>,
) -> Vec<QueryResult> {
    candidates
        .into_iter()
        .filter_map(|c| {
            let score = c.distance.map(distance_to_score);
            if let (Some(min), Some(s)) = (min_score, score) {
                if s < min {
                    return None;
                }
            }
            Some(QueryResult {
                id: c.key,
                score,
                metadata: c.metadata.unwrap_or_else(Metadata::new),
                embedding: if include_vector {
                    c.data.map(|d| d.float32)
                } else {
                    None
                },
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn candidate(key: &str, distance: Option<f32>) -> QueryOutputVector {
        QueryOutputVector {
            key: key.to_string(),
            distance,
            metadata: None,
            data: Some(vec![1.0, 2.0].into()),
        }
    }

    #[test]
    fn test_score_is_one_minus_distance() {
        for i in 0..=100 {
            let d = i as f32 / 100.0;
            assert_eq!(distance_to_score(d), 1.0 - d);
        }
    }

    #[test]
    fn test_min_score_filter_keeps_order() {
        let out = postprocess(
            vec![
                candidate("a", Some(0.1)),
                candidate("b", Some(0.6)),
                candidate("c", None),
                candidate("d", Some(0.3)),
            ],
            false,
            Some(0.5),
        );
        let ids: Vec<_> = out.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c", "d"]);
        assert!(out[1].score.is_none());
        assert!(out.iter().all(|r| r.embedding.is_none()));
    }

    #[test]
    fn test_include_vector_and_metadata() {
        let mut c = candidate("a", Some(0.0));
        let mut m = Metadata::new();
        m.insert("k".into(), json!(1));
        c.metadata = Some(m.clone());
        let no_data = QueryOutputVector {
            data: None,
            ..candidate("b", Some(0.2))
        };

        let out = postprocess(vec![c, no_data], true, None);
        assert_eq!(out[0].score, Some(1.0));
        assert_eq!(out[0].metadata, m);
        assert_eq!(out[0].embedding, Some(vec![1.0, 2.0]));
        assert!(out[1].metadata.is_empty());
        assert!(out[1].embedding.is_none());
    }
}
