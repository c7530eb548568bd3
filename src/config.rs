use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Knobs for one selection run. Missing fields take the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub max_age_days: i64,
    pub relevance_threshold: f32,
    pub max_articles: usize,
    /// Titles whose word-set Jaccard similarity exceeds this are duplicates.
    pub duplicate_threshold: f32,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            max_age_days: 7,
            relevance_threshold: 0.75,
            max_articles: 5,
            duplicate_threshold: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub dir: PathBuf,
    pub dimension: usize,
    pub n_trees: usize,
    pub leaf_size: usize,
    /// Seeds pivot selection; the same seed and input build the same forest.
    pub seed: u64,
}

impl IndexConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ..Self::default()
        }
    }

    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = dimension;
        self
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data/vectorstore"),
            dimension: 384,
            n_trees: 10,
            leaf_size: 16,
            seed: 0,
        }
    }
}

/// Keyword tables consulted by the heuristic scorers.
///
/// Entries are matched as case-insensitive substrings; the scorers fold
/// case when they are constructed, so entries may be stored as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vocabulary {
    pub title_keywords: Vec<String>,
    pub technical_terms: Vec<String>,
    pub summary_keywords: Vec<String>,
}

impl Vocabulary {
    pub fn new(
        title_keywords: impl IntoIterator<Item = impl Into<String>>,
        technical_terms: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            title_keywords: strings(title_keywords),
            technical_terms: strings(technical_terms),
            ..Self::default()
        }
    }
}

fn strings(words: impl IntoIterator<Item = impl Into<String>>) -> Vec<String> {
    words.into_iter().map(Into::into).collect()
}

/// Case-folded copy of a keyword list, as the scorers match against it.
pub(crate) fn fold_terms(terms: &[String]) -> Vec<String> {
    terms.iter().map(|term| term.to_lowercase()).collect()
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            title_keywords: strings([
                "ai",
                "machine learning",
                "deep learning",
                "product management",
                "agile",
                "innovation",
                "technology",
            ]),
            technical_terms: strings(["technical", "algorithm"]),
            summary_keywords: strings([
                "ai",
                "machine learning",
                "deep learning",
                "product",
                "management",
                "innovation",
                "technology",
            ]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub selection: SelectionConfig,
    pub index: IndexConfig,
    pub vocabulary: Vocabulary,
}

impl EngineConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read(path)?;
        Ok(serde_json::from_slice(&raw)?)
    }
}
