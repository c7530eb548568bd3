use std::cmp::Ordering;

use crate::article::Article;
use crate::config::{fold_terms, Vocabulary};

const SUMMARY_LENGTH_BAND: std::ops::RangeInclusive<usize> = 100..=300;
const TECHNICAL_MARKER: &str = "Technical Details:";

/// Re-ranks articles once a summary has been attached to them.
///
/// Scores are unbounded ranking keys, not relevance scores.
#[derive(Debug, Clone)]
pub struct SummaryRanker {
    keywords: Vec<String>,
    max_articles: usize,
}

impl SummaryRanker {
    pub fn new(vocabulary: &Vocabulary, max_articles: usize) -> Self {
        Self {
            keywords: fold_terms(&vocabulary.summary_keywords),
            max_articles,
        }
    }

    /// `None` when the article has no summary yet.
    pub fn score(&self, article: &Article) -> Option<f32> {
        let summary = article.summary.as_deref()?;

        let mut score = 0.0;
        if SUMMARY_LENGTH_BAND.contains(&summary.split_whitespace().count()) {
            score += 1.0;
        }

        let lowered = summary.to_lowercase();
        let matches = self
            .keywords
            .iter()
            .filter(|keyword| !keyword.is_empty() && lowered.contains(keyword.as_str()))
            .count();
        score += 0.5 * matches as f32;

        if summary.contains(TECHNICAL_MARKER) {
            score += 1.0;
        }

        Some(score)
    }

    /// Best-first, ties in input order, truncated to `max_articles`.
    /// Articles without a summary are dropped.
    pub fn rank(&self, articles: Vec<Article>) -> Vec<Article> {
        let mut ranked: Vec<(f32, Article)> = articles
            .into_iter()
            .filter_map(|article| self.score(&article).map(|score| (score, article)))
            .collect();

        ranked.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
        ranked.truncate(self.max_articles);
        ranked.into_iter().map(|(_, article)| article).collect()
    }
}
