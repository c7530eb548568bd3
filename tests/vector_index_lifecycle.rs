use digest_core::article::Article;
use digest_core::config::IndexConfig;
use digest_core::index::VectorIndex;
use digest_core::types::EntryId;
use tempfile::tempdir;

const DIM: usize = 4;

fn config(dir: &std::path::Path) -> IndexConfig {
    IndexConfig::new(dir).with_dimension(DIM)
}

fn embedded(title: &str, embedding: [f32; DIM]) -> Article {
    Article::new(title, format!("{title} body"))
        .with_url(format!("https://example.com/{title}"))
        .with_source("feed")
        .with_published_date("2024-06-14T10:00:00Z")
        .with_embedding(embedding.to_vec())
}

fn seed_articles() -> Vec<Article> {
    vec![
        embedded("x-axis", [1.0, 0.0, 0.0, 0.0]),
        embedded("y-axis", [0.0, 1.0, 0.0, 0.0]),
        embedded("xy-diagonal", [1.0, 1.0, 0.0, 0.0]),
    ]
}

#[test]
fn add_assigns_sequential_ids_and_persists() {
    let dir = tempdir().unwrap();
    let mut index = VectorIndex::open(config(dir.path())).unwrap();
    assert!(index.is_empty());
    assert_eq!(index.current_id(), EntryId::FIRST);

    let added = index.add(&seed_articles()).unwrap();

    assert_eq!(added, 3);
    assert_eq!(index.len(), 3);
    assert_eq!(index.current_id(), EntryId::new(3));
    assert_eq!(index.metadata(EntryId::new(1)).unwrap().title, "y-axis");
    assert!(index.paths().both_exist());
}

#[test]
fn wrong_dimension_is_skipped_without_advancing() {
    let dir = tempdir().unwrap();
    let mut index = VectorIndex::open(config(dir.path())).unwrap();

    let wrong = Article::new("short", "").with_embedding(vec![1.0, 0.0]);
    let added = index.add(&[wrong]).unwrap();

    assert_eq!(added, 0);
    assert_eq!(index.current_id(), EntryId::FIRST);
    assert!(index.is_empty());
}

#[test]
fn unusable_embeddings_are_skipped_in_a_mixed_batch() {
    let dir = tempdir().unwrap();
    let mut index = VectorIndex::open(config(dir.path())).unwrap();

    let batch = vec![
        Article::new("no embedding", ""),
        embedded("good", [0.0, 0.0, 1.0, 0.0]),
        Article::new("nan", "").with_embedding(vec![f32::NAN, 0.0, 0.0, 0.0]),
        Article::new("too long", "").with_embedding(vec![1.0; DIM + 1]),
        embedded("also good", [0.0, 0.0, 0.0, 1.0]),
    ];

    assert_eq!(index.add(&batch).unwrap(), 2);
    assert_eq!(index.current_id(), EntryId::new(2));
    assert_eq!(index.metadata(EntryId::new(0)).unwrap().title, "good");
    assert_eq!(index.metadata(EntryId::new(1)).unwrap().title, "also good");
}

#[test]
fn search_ranks_by_angular_similarity() {
    let dir = tempdir().unwrap();
    let mut index = VectorIndex::open(config(dir.path())).unwrap();
    index.add(&seed_articles()).unwrap();

    let hits = index.search(&[1.0, 0.0, 0.0, 0.0], 3);
    let titles: Vec<&str> = hits.iter().map(|h| h.metadata.title.as_str()).collect();
    assert_eq!(titles, vec!["x-axis", "xy-diagonal", "y-axis"]);

    assert!((hits[0].similarity - 1.0).abs() < 1e-6);
    // Orthogonal: distance sqrt(2).
    assert!((hits[2].similarity - (1.0 - 2f32.sqrt() / 2.0)).abs() < 1e-5);
    assert_eq!(hits[0].metadata.url, "https://example.com/x-axis");
}

#[test]
fn opposite_vector_is_not_clamped_above_zero() {
    let dir = tempdir().unwrap();
    let mut index = VectorIndex::open(config(dir.path())).unwrap();
    index.add(&[embedded("east", [1.0, 0.0, 0.0, 0.0])]).unwrap();

    let hits = index.search(&[-1.0, 0.0, 0.0, 0.0], 1);
    assert_eq!(hits.len(), 1);
    assert!(hits[0].similarity.abs() < 1e-6);
}

#[test]
fn search_edge_cases() {
    let dir = tempdir().unwrap();
    let mut index = VectorIndex::open(config(dir.path())).unwrap();
    assert!(index.search(&[1.0, 0.0, 0.0, 0.0], 3).is_empty());

    index.add(&seed_articles()).unwrap();
    assert!(index.search(&[1.0, 0.0, 0.0, 0.0], 0).is_empty());
    assert_eq!(index.search(&[1.0, 0.0, 0.0, 0.0], 50).len(), 3);
    assert!(index.search(&[1.0, 0.0], 3).is_empty());
}

#[test]
fn round_trip_restores_results_and_next_id() {
    let dir = tempdir().unwrap();
    let query = [0.9, 0.4, 0.0, 0.0];

    let before = {
        let mut index = VectorIndex::open(config(dir.path())).unwrap();
        index.add(&seed_articles()).unwrap();
        index.search(&query, 3)
    };

    let restored = VectorIndex::open(config(dir.path())).unwrap();
    assert_eq!(restored.len(), 3);
    assert_eq!(restored.current_id(), EntryId::new(3));
    assert_eq!(restored.search(&query, 3), before);
}

#[test]
fn ids_are_never_reused_after_restore() {
    let dir = tempdir().unwrap();
    {
        let mut index = VectorIndex::open(config(dir.path())).unwrap();
        index.add(&seed_articles()).unwrap();
    }

    let mut index = VectorIndex::open(config(dir.path())).unwrap();
    index.add(&[embedded("later", [0.0, 0.0, 1.0, 1.0])]).unwrap();

    assert_eq!(index.current_id(), EntryId::new(4));
    assert_eq!(index.metadata(EntryId::new(3)).unwrap().title, "later");
    assert_eq!(index.metadata(EntryId::new(0)).unwrap().title, "x-axis");
}

#[test]
fn clear_resets_memory_and_disk() {
    let dir = tempdir().unwrap();
    let mut index = VectorIndex::open(config(dir.path())).unwrap();
    index.add(&seed_articles()).unwrap();

    index.clear().unwrap();

    assert!(index.is_empty());
    assert_eq!(index.current_id(), EntryId::FIRST);
    assert!(!index.paths().any_exist());

    let reopened = VectorIndex::open(config(dir.path())).unwrap();
    assert!(reopened.is_empty());
}

#[test]
fn larger_index_finds_exact_match_through_splits() {
    let dir = tempdir().unwrap();
    let mut index = VectorIndex::open(config(dir.path())).unwrap();

    let articles: Vec<Article> = (0..200)
        .map(|i| {
            let t = i as f32;
            embedded(
                &format!("item-{i}"),
                [(t * 0.37).sin(), (t * 0.61).cos(), (t * 0.13).sin() + 0.1, 1.0 + t / 200.0],
            )
        })
        .collect();
    index.add(&articles).unwrap();

    for probe in [0usize, 57, 123, 199] {
        let query = articles[probe].embedding.clone().unwrap();

        let exhaustive = index.search_with(&query, 5, Some(articles.len()));
        assert_eq!(exhaustive.len(), 5);
        assert_eq!(exhaustive[0].metadata.title, format!("item-{probe}"));
        assert!((exhaustive[0].similarity - 1.0).abs() < 1e-5);
        for pair in exhaustive.windows(2) {
            assert!(pair[0].similarity >= pair[1].similarity);
        }

        let approximate = index.search(&query, 5);
        assert!(!approximate.is_empty());
        assert!(approximate.len() <= 5);
    }
}
