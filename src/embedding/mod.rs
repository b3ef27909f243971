//! Text embedding: the service seam, its HTTP adapter, and cosine similarity.

pub mod client;
mod types;

pub use client::{EmbeddingError, HttpEmbedder};

pub type Embedding = Vec<f32>;

/// Maps text to dense vectors.
/// Implemented by `HttpEmbedder` for production; mock implementations used in tests.
/// Must be deterministic for identical input.
pub trait Embedder {
    /// One vector per input, in input order. An empty slice yields an empty result.
    async fn encode_batch(&self, texts: &[String]) -> Result<Vec<Embedding>, EmbeddingError>;

    async fn encode(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        let mut vectors = self.encode_batch(&[text.to_string()]).await?;
        ensure_count(&vectors, 1)?;
        vectors
            .pop()
            .ok_or_else(|| EmbeddingError::Malformed("no vector returned".into()))
    }
}

/// Fails unless there is exactly one vector per input.
pub fn ensure_count(vectors: &[Embedding], expected: usize) -> Result<(), EmbeddingError> {
    if vectors.len() == expected {
        Ok(())
    } else {
        Err(EmbeddingError::Malformed(format!(
            "expected {expected} vectors, got {}",
            vectors.len()
        )))
    }
}

/// Cosine similarity; 0.0 for mismatched dimensions or zero vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let (dot, norm_a, norm_b) = a
        .iter()
        .zip(b)
        .fold((0.0f32, 0.0f32, 0.0f32), |(dot, na, nb), (x, y)| {
            (dot + x * y, na + x * x, nb + y * y)
        });

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 { 0.0 } else { dot / denom }
}

/// Scores every candidate against `query`, preserving candidate order.
pub fn similarities(query: &[f32], candidates: &[Embedding]) -> Vec<f32> {
    candidates
        .iter()
        .map(|v| cosine_similarity(query, v))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_vectors_score_one() {
        let v = [0.3, 0.4, 0.5];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn orthogonal_vectors_score_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn opposite_vectors_score_minus_one() {
        assert!((cosine_similarity(&[1.0, 2.0], &[-1.0, -2.0]) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn scale_does_not_matter() {
        let a = cosine_similarity(&[1.0, 2.0], &[2.0, 1.0]);
        let b = cosine_similarity(&[10.0, 20.0], &[2.0, 1.0]);
        assert!((a - b).abs() < 1e-6);
    }

    #[test]
    fn mismatched_or_zero_vectors_score_zero() {
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn vector_count_must_match_inputs() {
        let vectors = vec![vec![1.0], vec![0.5]];
        assert!(ensure_count(&vectors, 2).is_ok());
        assert!(matches!(
            ensure_count(&vectors, 3),
            Err(EmbeddingError::Malformed(_))
        ));
    }

    #[test]
    fn similarities_preserve_order() {
        let scores = similarities(&[1.0, 0.0], &[vec![0.0, 1.0], vec![1.0, 0.0]]);
        assert_eq!(scores, vec![0.0, 1.0]);
    }
}
