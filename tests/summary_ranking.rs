use digest_core::article::Article;
use digest_core::config::Vocabulary;
use digest_core::selection::SummaryRanker;

fn words(n: usize) -> String {
    vec!["word"; n].join(" ")
}

#[test]
fn scores_length_keywords_and_technical_marker() {
    let ranker = SummaryRanker::new(&Vocabulary::default(), 5);

    let long = Article::new("a", "").with_summary(words(150));
    assert_eq!(ranker.score(&long), Some(1.0));

    let keywords = Article::new("b", "").with_summary("AI meets product innovation");
    assert_eq!(ranker.score(&keywords), Some(1.5));

    // "Details" contains "ai", so isolate the marker with an empty keyword list.
    let bare = SummaryRanker::new(
        &Vocabulary {
            summary_keywords: Vec::new(),
            ..Vocabulary::default()
        },
        5,
    );
    let technical = Article::new("c", "").with_summary("Technical Details: none");
    assert_eq!(bare.score(&technical), Some(1.0));
    assert_eq!(ranker.score(&technical), Some(1.5));

    assert_eq!(ranker.score(&Article::new("d", "")), None);
}

#[test]
fn ranks_best_first_and_drops_unsummarized() {
    let ranker = SummaryRanker::new(&Vocabulary::default(), 2);
    let articles = vec![
        Article::new("plain", "").with_summary("nothing to see"),
        Article::new("unsummarized", ""),
        Article::new("rich", "").with_summary(words(120) + " Technical Details: AI technology"),
        Article::new("medium", "").with_summary("machine learning notes"),
    ];

    let ranked = ranker.rank(articles);
    let titles: Vec<&str> = ranked.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["rich", "medium"]);
}
