use std::collections::BTreeSet;

use crate::article::Article;
use crate::types::selection_result::SelectedArticle;

/// Anything that can be deduplicated by title.
pub trait Titled {
    fn title(&self) -> &str;
}

impl Titled for Article {
    fn title(&self) -> &str {
        &self.title
    }
}

impl Titled for SelectedArticle {
    fn title(&self) -> &str {
        &self.article.title
    }
}

/// Near-duplicate suppression over titles.
///
/// Quadratic in the number of accepted titles; sized for batches in the
/// tens to low hundreds.
#[derive(Debug, Clone, Copy)]
pub struct DuplicateSuppressor {
    threshold: f32,
}

impl Default for DuplicateSuppressor {
    fn default() -> Self {
        Self { threshold: 0.8 }
    }
}

impl DuplicateSuppressor {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Drop empty titles, case-insensitive repeats and titles too similar to
    /// one already accepted. Survivors keep their first-occurrence order.
    pub fn suppress<T: Titled>(&self, items: Vec<T>) -> Vec<T> {
        let mut accepted_titles: Vec<(String, BTreeSet<String>)> = Vec::new();
        let mut unique = Vec::with_capacity(items.len());

        for item in items {
            let title = item.title().to_lowercase();
            if title.trim().is_empty() {
                continue;
            }
            if accepted_titles.iter().any(|(seen, _)| *seen == title) {
                continue;
            }

            let words = title_words(&title);
            let near_duplicate = accepted_titles
                .iter()
                .any(|(_, seen_words)| jaccard(&words, seen_words) > self.threshold);
            if near_duplicate {
                continue;
            }

            accepted_titles.push((title, words));
            unique.push(item);
        }

        unique
    }
}

/// Lower-cased whitespace tokens with surrounding punctuation stripped, so
/// "2024!!" and "2024" count as the same word.
pub fn title_words(title: &str) -> BTreeSet<String> {
    title
        .split_whitespace()
        .map(|word| {
            word.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|word| !word.is_empty())
        .collect()
}

/// Jaccard similarity of two word sets; 0.0 when both are empty.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f32 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    intersection as f32 / union as f32
}

/// Jaccard similarity of the word sets of two titles.
pub fn title_similarity(a: &str, b: &str) -> f32 {
    jaccard(&title_words(a), &title_words(b))
}
