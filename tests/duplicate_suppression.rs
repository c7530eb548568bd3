use digest_core::article::Article;
use digest_core::selection::{title_similarity, DuplicateSuppressor};

fn titled(titles: &[&str]) -> Vec<Article> {
    titles.iter().map(|t| Article::new(*t, "")).collect()
}

fn titles(articles: &[Article]) -> Vec<&str> {
    articles.iter().map(|a| a.title.as_str()).collect()
}

#[test]
fn near_duplicate_keeps_first_occurrence() {
    let articles = titled(&["AI Breakthrough 2024", "Ai breakthrough 2024!!"]);
    assert!(title_similarity(&articles[0].title, &articles[1].title) >= 0.8);

    let unique = DuplicateSuppressor::default().suppress(articles);
    assert_eq!(titles(&unique), vec!["AI Breakthrough 2024"]);
}

#[test]
fn exact_duplicates_compare_case_folded() {
    let unique = DuplicateSuppressor::default().suppress(titled(&[
        "Rust 2.0 Released",
        "RUST 2.0 RELEASED",
        "Product roadmap review",
    ]));
    assert_eq!(titles(&unique), vec!["Rust 2.0 Released", "Product roadmap review"]);
}

#[test]
fn empty_titles_are_always_dropped() {
    let unique = DuplicateSuppressor::default().suppress(titled(&["", "   ", "Real title"]));
    assert_eq!(titles(&unique), vec!["Real title"]);
}

#[test]
fn distinct_titles_keep_their_order() {
    let input = ["Zebra migration", "Agile retrospectives", "Quantum error correction"];
    let unique = DuplicateSuppressor::default().suppress(titled(&input));
    assert_eq!(titles(&unique), input.to_vec());
}

#[test]
fn threshold_must_be_exceeded() {
    // 4 shared of 5 distinct words: exactly 0.8, kept.
    let at_threshold = titled(&["a b c d", "a b c d e"]);
    assert_eq!(DuplicateSuppressor::default().suppress(at_threshold).len(), 2);

    // 5 of 6: above 0.8, dropped.
    let above = titled(&["a b c d e", "a b c d e f"]);
    assert_eq!(DuplicateSuppressor::default().suppress(above).len(), 1);
}

#[test]
fn later_title_is_compared_against_every_accepted_title() {
    let unique = DuplicateSuppressor::default().suppress(titled(&[
        "launch of the new model",
        "quarterly hiring update",
        "Launch of the new model!",
    ]));
    assert_eq!(titles(&unique), vec!["launch of the new model", "quarterly hiring update"]);
}

#[test]
fn invariant_suppression_is_idempotent() {
    let input = titled(&[
        "AI Breakthrough 2024",
        "",
        "Ai breakthrough 2024!!",
        "Agile at scale",
        "agile at scale",
        "Agile at scale, revisited",
        "Deep learning for tabular data",
        "deep learning for tabular data?",
        "Edge inference",
    ]);
    let suppressor = DuplicateSuppressor::default();

    let once = suppressor.suppress(input);
    let twice = suppressor.suppress(once.clone());
    assert_eq!(once, twice);
}

#[test]
fn custom_threshold_is_respected() {
    let input = titled(&["open source model weights", "open source model licences"]);
    // 3 shared of 5 distinct words: 0.6.
    assert_eq!(DuplicateSuppressor::new(0.5).suppress(input.clone()).len(), 1);
    assert_eq!(DuplicateSuppressor::new(0.8).suppress(input).len(), 2);
}

#[test]
fn punctuation_only_titles_share_no_words() {
    assert_eq!(title_similarity("!!!", "???"), 0.0);
    assert_eq!(title_similarity("", ""), 0.0);
}
