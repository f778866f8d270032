use crate::types::Metric;

/// Angular dissimilarity between two embeddings: 0.0 for the same
/// direction, 1.0 for orthogonal, 2.0 for opposite.
///
/// Embeddings of different lengths, or with a zero norm, rank as far apart
/// as possible (2.0).
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 2.0;
    }

    let (dot, aa, bb) = a.iter().zip(b).fold((0f64, 0f64, 0f64), |(dot, aa, bb), (&x, &y)| {
        let (x, y) = (f64::from(x), f64::from(y));
        (dot + x * y, aa + x * x, bb + y * y)
    });
    let norms = (aa * bb).sqrt();
    if norms == 0.0 {
        return 2.0;
    }
    (1.0 - (dot / norms).clamp(-1.0, 1.0)) as f32
}

/// Euclidean (L2) distance. Returns `f32::INFINITY` for mismatched lengths.
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return f32::INFINITY;
    }
    let sum: f64 = a
        .iter()
        .zip(b)
        .map(|(x, y)| {
            let d = f64::from(*x) - f64::from(*y);
            d * d
        })
        .sum();
    sum.sqrt() as f32
}

pub fn distance(metric: Metric, a: &[f32], b: &[f32]) -> f32 {
    match metric {
        Metric::Cosine => cosine_distance(a, b),
        Metric::Euclidean => euclidean_distance(a, b),
    }
}
