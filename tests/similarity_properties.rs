use digest_core::article::Article;
use digest_core::selection::{cosine_similarity, similar_articles, top_k};

const EPS: f32 = 1e-6;

fn sample_vectors() -> Vec<Vec<f32>> {
    vec![
        vec![1.0, 0.0, 0.0],
        vec![0.3, -0.7, 2.5],
        vec![-4.0, 1.5, 0.25],
        vec![1e-3, 2e-3, -5e-4],
        vec![10.0, 10.0, 10.0],
    ]
}

#[test]
fn invariant_self_similarity_is_one() {
    for v in sample_vectors() {
        let s = cosine_similarity(&v, &v);
        assert!((s - 1.0).abs() < EPS, "similarity({v:?}, itself) = {s}");
    }
}

#[test]
fn invariant_similarity_is_symmetric() {
    let vectors = sample_vectors();
    for a in &vectors {
        for b in &vectors {
            assert_eq!(cosine_similarity(a, b), cosine_similarity(b, a));
        }
    }
}

#[test]
fn invariant_zero_vector_scores_zero() {
    let zero = vec![0.0; 3];
    for v in sample_vectors() {
        assert_eq!(cosine_similarity(&zero, &v), 0.0);
        assert_eq!(cosine_similarity(&v, &zero), 0.0);
    }
    assert_eq!(cosine_similarity(&zero, &zero), 0.0);
}

#[test]
fn mismatched_or_empty_vectors_score_zero() {
    assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]), 0.0);
    assert_eq!(cosine_similarity(&[], &[]), 0.0);
}

#[test]
fn opposite_and_orthogonal_vectors() {
    assert!((cosine_similarity(&[1.0, 2.0], &[-1.0, -2.0]) + 1.0).abs() < EPS);
    assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 3.0]).abs() < EPS);
}

#[test]
fn top_k_ranks_descending_and_truncates() {
    let query = [1.0, 0.0];
    let a = [0.0, 1.0];
    let b = [1.0, 0.1];
    let c = [1.0, 1.0];
    let candidates = vec![(&a[..], "a"), (&b[..], "b"), (&c[..], "c")];

    let hits = top_k(&query, candidates, 2);
    let order: Vec<&str> = hits.iter().map(|h| h.payload).collect();
    assert_eq!(order, vec!["b", "c"]);
    assert!(hits[0].similarity >= hits[1].similarity);
}

#[test]
fn top_k_ties_keep_input_order() {
    let query = [1.0, 0.0];
    let same = [2.0, 0.0];
    let candidates = vec![(&same[..], 3), (&same[..], 1), (&same[..], 2)];

    let hits = top_k(&query, candidates, 3);
    let order: Vec<i32> = hits.iter().map(|h| h.payload).collect();
    assert_eq!(order, vec![3, 1, 2]);
}

#[test]
fn top_k_edge_sizes() {
    let query = [1.0, 0.0];
    let v = [1.0, 0.0];
    assert!(top_k(&query, vec![(&v[..], ())], 0).is_empty());
    assert_eq!(top_k(&query, vec![(&v[..], ())], 10).len(), 1);
}

#[test]
fn similar_articles_skips_articles_without_embedding() {
    let articles = vec![
        Article::new("no vector", ""),
        Article::new("far", "").with_embedding(vec![0.0, 1.0]),
        Article::new("near", "").with_embedding(vec![0.9, 0.1]),
        Article::new("empty vector", "").with_embedding(vec![]),
    ];

    let hits = similar_articles(&[1.0, 0.0], &articles, 5);
    let titles: Vec<&str> = hits.iter().map(|h| h.payload.title.as_str()).collect();
    assert_eq!(titles, vec!["near", "far"]);
}
