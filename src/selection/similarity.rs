use std::cmp::Ordering;

use serde::Serialize;

use crate::article::Article;

/// Cosine similarity of two embeddings.
///
/// Returns 0.0 when either vector has zero norm or the lengths differ, so
/// one malformed embedding cannot abort a batch comparison.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let similarity = dot / (norm_a.sqrt() * norm_b.sqrt());
    if similarity.is_finite() {
        similarity as f32
    } else {
        0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityHit<P> {
    pub similarity: f32,
    pub payload: P,
}

/// Exact top-k by cosine similarity over a small in-memory candidate set.
///
/// Linear scan. Ties keep their input order.
pub fn top_k<'v, P, I>(query: &[f32], candidates: I, k: usize) -> Vec<SimilarityHit<P>>
where
    I: IntoIterator<Item = (&'v [f32], P)>,
{
    if k == 0 {
        return Vec::new();
    }

    let mut hits: Vec<SimilarityHit<P>> = candidates
        .into_iter()
        .map(|(vector, payload)| SimilarityHit {
            similarity: cosine_similarity(query, vector),
            payload,
        })
        .collect();

    // sort_by is stable
    hits.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(Ordering::Equal)
    });
    hits.truncate(k);
    hits
}

/// The `k` articles most similar to `query`. Articles without an embedding
/// are not candidates.
pub fn similar_articles<'a>(
    query: &[f32],
    articles: &'a [Article],
    k: usize,
) -> Vec<SimilarityHit<&'a Article>> {
    let candidates = articles
        .iter()
        .filter_map(|article| article.usable_embedding().map(|v| (v, article)));
    top_k(query, candidates, k)
}
