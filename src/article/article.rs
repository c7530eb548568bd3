use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::published::{parse_published, PublishedDateError};

/// A candidate article as produced by the upstream fetch/parse/embed stages.
///
/// Articles have no identity of their own. Every field is optional on the
/// wire; missing fields make an article drop out of selection rather than
/// fail deserialization.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Article {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub url: String,
    /// ISO-8601 timestamp as received. Parsed lazily so that a malformed
    /// value only excludes this article.
    #[serde(default)]
    pub published_date: Option<String>,
    #[serde(default)]
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl Article {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Article {
            title: title.into(),
            content: content.into(),
            ..Article::default()
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn with_published_date(mut self, published_date: impl Into<String>) -> Self {
        self.published_date = Some(published_date.into());
        self
    }

    pub fn published_at(mut self, published: DateTime<Utc>) -> Self {
        self.published_date = Some(published.to_rfc3339());
        self
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn published(&self) -> Result<DateTime<Utc>, PublishedDateError> {
        match self.published_date.as_deref() {
            Some(raw) => parse_published(raw),
            None => Err(PublishedDateError::Missing),
        }
    }

    /// The embedding, if upstream processing produced a usable one.
    pub fn usable_embedding(&self) -> Option<&[f32]> {
        self.embedding.as_deref().filter(|v| !v.is_empty())
    }
}

/// The metadata record persisted next to each indexed vector.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EntryMetadata {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub published_date: Option<String>,
    #[serde(default)]
    pub source: String,
}

impl From<&Article> for EntryMetadata {
    fn from(article: &Article) -> Self {
        EntryMetadata {
            title: article.title.clone(),
            url: article.url.clone(),
            content: article.content.clone(),
            published_date: article.published_date.clone(),
            source: article.source.clone(),
        }
    }
}
