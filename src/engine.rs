use chrono::{DateTime, Utc};

use crate::article::Article;
use crate::config::EngineConfig;
use crate::index::{IndexError, SearchHit, VectorIndex};
use crate::selection::{KeywordRelevanceScorer, RelevanceScorer, SelectionPipeline};
use crate::types::selection_result::SelectionResult;

/// One digest cycle: index the embedded batch, then select from it.
///
/// Index failures never block selection; the batch is selected in memory
/// whether or not it could be persisted.
pub struct CandidateEngine<S = KeywordRelevanceScorer> {
    index: VectorIndex,
    pipeline: SelectionPipeline<S>,
}

impl CandidateEngine<KeywordRelevanceScorer> {
    pub fn open(config: EngineConfig) -> Result<Self, IndexError> {
        let index = VectorIndex::open(config.index)?;
        let pipeline = SelectionPipeline::with_vocabulary(config.selection, config.vocabulary);
        Ok(Self { index, pipeline })
    }
}

impl<S> CandidateEngine<S>
where
    S: RelevanceScorer,
{
    pub fn new(index: VectorIndex, pipeline: SelectionPipeline<S>) -> Self {
        Self { index, pipeline }
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    pub fn pipeline(&self) -> &SelectionPipeline<S> {
        &self.pipeline
    }

    pub fn run(&mut self, articles: Vec<Article>) -> SelectionResult {
        self.run_at(articles, Utc::now())
    }

    pub fn run_at(&mut self, articles: Vec<Article>, now: DateTime<Utc>) -> SelectionResult {
        if let Err(err) = self.index.add(&articles) {
            tracing::error!("Error adding articles to vector store: {}", err);
        }
        self.pipeline.select_at(articles, now)
    }

    /// Previously indexed articles closest to `article`. Empty when the
    /// article has no embedding.
    pub fn related(&self, article: &Article, k: usize) -> Vec<SearchHit> {
        match article.usable_embedding() {
            Some(embedding) => self.index.search(embedding, k),
            None => Vec::new(),
        }
    }

    /// Periodic cleanup: empties the index and its artifacts.
    pub fn housekeeping(&mut self) -> Result<(), IndexError> {
        self.index.clear()
    }
}
