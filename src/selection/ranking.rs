use chrono::{DateTime, Utc};

use crate::article::{age_in_days, Article};
use crate::config::{fold_terms, Vocabulary};
use crate::types::selection_result::RelevanceDetails;

const KEYWORD_WEIGHT: f32 = 0.2;
const LENGTH_WEIGHT: f32 = 0.3;
const TECHNICAL_WEIGHT: f32 = 0.2;
const FRESH_WEIGHT: f32 = 0.3;
const RECENT_WEIGHT: f32 = 0.2;

const LENGTH_BAND: std::ops::RangeInclusive<usize> = 500..=2000;
const FRESH_DAYS: i64 = 2;
const RECENT_DAYS: i64 = 5;

/// A bounded relevance score together with the signals behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct Relevance {
    pub score: f32,
    pub why: RelevanceDetails,
}

pub trait RelevanceScorer {
    /// Score an article as of `now`. Implementations must not fail: a signal
    /// that cannot be computed contributes nothing.
    fn score(&self, article: &Article, now: DateTime<Utc>) -> Relevance;
}

/// v0: additive keyword / length / recency heuristic, capped at 1.0.
#[derive(Debug, Clone)]
pub struct KeywordRelevanceScorer {
    vocabulary: Vocabulary,
}

impl Default for KeywordRelevanceScorer {
    fn default() -> Self {
        Self::new(Vocabulary::default())
    }
}

impl KeywordRelevanceScorer {
    pub fn new(vocabulary: Vocabulary) -> Self {
        let vocabulary = Vocabulary {
            title_keywords: fold_terms(&vocabulary.title_keywords),
            technical_terms: fold_terms(&vocabulary.technical_terms),
            summary_keywords: fold_terms(&vocabulary.summary_keywords),
        };
        Self { vocabulary }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn details(&self, article: &Article, now: DateTime<Utc>) -> RelevanceDetails {
        let title = article.title.to_lowercase();
        let keyword_matches = self
            .vocabulary
            .title_keywords
            .iter()
            .filter(|keyword| !keyword.is_empty() && title.contains(keyword.as_str()))
            .count();

        let word_count = article.content.split_whitespace().count();

        let content = article.content.to_lowercase();
        let technical = self
            .vocabulary
            .technical_terms
            .iter()
            .any(|term| !term.is_empty() && content.contains(term.as_str()));

        // An unusable date only forfeits the recency signal.
        let age_days = article
            .published()
            .ok()
            .map(|published| age_in_days(published, now));

        RelevanceDetails {
            keyword_matches,
            word_count,
            technical,
            age_days,
        }
    }

    pub fn score_value(&self, details: &RelevanceDetails) -> f32 {
        let mut score = KEYWORD_WEIGHT * details.keyword_matches as f32;

        if LENGTH_BAND.contains(&details.word_count) {
            score += LENGTH_WEIGHT;
        }
        if details.technical {
            score += TECHNICAL_WEIGHT;
        }
        score += match details.age_days {
            Some(age) if age <= FRESH_DAYS => FRESH_WEIGHT,
            Some(age) if age <= RECENT_DAYS => RECENT_WEIGHT,
            _ => 0.0,
        };

        let score = score.clamp(0.0, 1.0);
        debug_assert!((0.0..=1.0).contains(&score), "score {score} out of range [0.0, 1.0]");
        score
    }
}

impl RelevanceScorer for KeywordRelevanceScorer {
    fn score(&self, article: &Article, now: DateTime<Utc>) -> Relevance {
        let why = self.details(article, now);
        let score = self.score_value(&why);
        Relevance { score, why }
    }
}

