use serde::{Deserialize, Serialize};

use crate::article::Article;

/// The signals behind a relevance score.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RelevanceDetails {
    pub keyword_matches: usize,
    pub word_count: usize,
    pub technical: bool,
    /// Whole days since publication; `None` when the date was unusable.
    pub age_days: Option<i64>,
}

/// An article that survived selection.
/// Serializes as the article's own fields plus `relevance_score` and `why`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedArticle {
    #[serde(flatten)]
    pub article: Article,
    pub relevance_score: f32,
    pub why: RelevanceDetails,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStage {
    Age,
    Relevance,
    Duplicates,
    Limit,
}

/// Counters describing one selection run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SelectionMetadata {
    pub considered: usize,
    pub excluded_by_age: usize,
    pub excluded_by_relevance: usize,
    pub excluded_as_duplicate: usize,
    pub excluded_by_limit: usize,
    pub selected: usize,

    /// Stages that failed and passed their input through unfiltered.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub degraded: Vec<SelectionStage>,
}

/// The final result of a selection run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SelectionResult {
    pub articles: Vec<SelectedArticle>,
    pub selection: SelectionMetadata,
}

impl SelectionResult {
    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SelectionError {
    #[error("Invalid relevance threshold: {0}")]
    InvalidThreshold(f32),

    #[error("Invalid max age: {0} days")]
    InvalidMaxAge(i64),

    #[error("Age window of {0} days is out of the representable date range")]
    AgeWindowOutOfRange(i64),
}
