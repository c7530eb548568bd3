pub mod dedup;
pub mod ranking;
pub mod similarity;
pub mod summary;

use std::cmp::Ordering;

use chrono::{DateTime, Duration, Utc};

use crate::article::{Article, PublishedDateError};
use crate::config::{SelectionConfig, Vocabulary};
use crate::types::selection_result::{
	SelectedArticle, SelectionError, SelectionMetadata, SelectionResult, SelectionStage,
};
pub use dedup::{jaccard, title_similarity, title_words, DuplicateSuppressor, Titled};
pub use ranking::{KeywordRelevanceScorer, Relevance, RelevanceScorer};
pub use similarity::{cosine_similarity, similar_articles, top_k, SimilarityHit};
pub use summary::SummaryRanker;

/// Narrows a batch of candidate articles down to a short ranked list.
///
/// Stages run strictly in order: age, relevance, duplicates, limit. A stage
/// that fails hands its input through unchanged and is recorded in
/// [`SelectionMetadata::degraded`]; a run never fails as a whole.
pub struct SelectionPipeline<S> {
	scorer: S,
	config: SelectionConfig,
	suppressor: DuplicateSuppressor,
}

impl Default for SelectionPipeline<KeywordRelevanceScorer> {
	fn default() -> Self {
		Self::new(KeywordRelevanceScorer::default(), SelectionConfig::default())
	}
}

impl SelectionPipeline<KeywordRelevanceScorer> {
	pub fn with_vocabulary(config: SelectionConfig, vocabulary: Vocabulary) -> Self {
		Self::new(KeywordRelevanceScorer::new(vocabulary), config)
	}
}

impl<S> SelectionPipeline<S>
where
	S: RelevanceScorer,
{
	pub fn new(scorer: S, config: SelectionConfig) -> Self {
		let suppressor = DuplicateSuppressor::new(config.duplicate_threshold);
		Self {
			scorer,
			config,
			suppressor,
		}
	}

	pub fn config(&self) -> &SelectionConfig {
		&self.config
	}

	pub fn scorer(&self) -> &S {
		&self.scorer
	}

	pub fn select(&self, articles: Vec<Article>) -> SelectionResult {
		self.select_at(articles, Utc::now())
	}

	pub fn select_at(&self, articles: Vec<Article>, now: DateTime<Utc>) -> SelectionResult {
		let considered = articles.len();
		let mut degraded = Vec::new();

		// 1. Age
		let recent = match self.age_cutoff(now) {
			Ok(cutoff) => retain_recent(articles, cutoff),
			Err(err) => {
				tracing::error!(error = %err, "age filter failed, passing batch through");
				degraded.push(SelectionStage::Age);
				articles
			}
		};
		let after_age = recent.len();

		// 2. Relevance
		let relevant = match self.checked_threshold() {
			Ok(threshold) => self.rank_relevant(recent, threshold, now),
			Err(err) => {
				tracing::error!(error = %err, "relevance filter failed, passing batch through unranked");
				degraded.push(SelectionStage::Relevance);
				self.score_all(recent, now)
			}
		};
		let after_relevance = relevant.len();

		// 3. Duplicates
		let unique = self.filter_duplicates(relevant);
		let after_duplicates = unique.len();

		// 4. Limit
		let selected = self.limit(unique);

		tracing::debug!(
			after_age,
			after_relevance,
			after_duplicates,
			"selection stage counts"
		);
		tracing::info!(
			"Filtered {} articles down to {}",
			considered,
			selected.len()
		);

		let selection = SelectionMetadata {
			considered,
			excluded_by_age: considered - after_age,
			excluded_by_relevance: after_age - after_relevance,
			excluded_as_duplicate: after_relevance - after_duplicates,
			excluded_by_limit: after_duplicates - selected.len(),
			selected: selected.len(),
			degraded,
		};

		SelectionResult {
			articles: selected,
			selection,
		}
	}

	/// Keep articles published within the last `max_age_days`. Articles with
	/// a missing or unparsable date are dropped.
	pub fn filter_by_age(
		&self,
		articles: Vec<Article>,
		now: DateTime<Utc>,
	) -> Result<Vec<Article>, SelectionError> {
		let cutoff = self.age_cutoff(now)?;
		Ok(retain_recent(articles, cutoff))
	}

	fn age_cutoff(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, SelectionError> {
		let max_age_days = self.config.max_age_days;
		if max_age_days < 0 {
			return Err(SelectionError::InvalidMaxAge(max_age_days));
		}
		Duration::try_days(max_age_days)
			.and_then(|window| now.checked_sub_signed(window))
			.ok_or(SelectionError::AgeWindowOutOfRange(max_age_days))
	}

	/// Score articles that carry an embedding and keep those at or above the
	/// threshold, best first. Equal scores keep their input order.
	pub fn filter_by_relevance(
		&self,
		articles: Vec<Article>,
		now: DateTime<Utc>,
	) -> Result<Vec<SelectedArticle>, SelectionError> {
		let threshold = self.checked_threshold()?;
		Ok(self.rank_relevant(articles, threshold, now))
	}

	fn checked_threshold(&self) -> Result<f32, SelectionError> {
		let threshold = self.config.relevance_threshold;
		if !(0.0..=1.0).contains(&threshold) {
			return Err(SelectionError::InvalidThreshold(threshold));
		}
		Ok(threshold)
	}

	fn rank_relevant(
		&self,
		articles: Vec<Article>,
		threshold: f32,
		now: DateTime<Utc>,
	) -> Vec<SelectedArticle> {
		let mut relevant: Vec<SelectedArticle> = articles
			.into_iter()
			// No embedding means upstream processing did not finish.
			.filter(|article| article.usable_embedding().is_some())
			.filter_map(|article| {
				let relevance = self.scorer.score(&article, now);
				if !relevance.score.is_finite() {
					tracing::warn!(title = %article.title, "non-finite relevance score, excluding");
					return None;
				}
				(relevance.score >= threshold).then(|| SelectedArticle {
					article,
					relevance_score: relevance.score,
					why: relevance.why,
				})
			})
			.collect();

		// sort_by is stable: ties stay in input order
		relevant.sort_by(|a, b| {
			b.relevance_score
				.partial_cmp(&a.relevance_score)
				.unwrap_or(Ordering::Equal)
		});

		debug_assert!(relevant
			.windows(2)
			.all(|w| w[0].relevance_score >= w[1].relevance_score));

		relevant
	}

	fn score_all(&self, articles: Vec<Article>, now: DateTime<Utc>) -> Vec<SelectedArticle> {
		articles
			.into_iter()
			.map(|article| {
				let relevance = self.scorer.score(&article, now);
				SelectedArticle {
					article,
					relevance_score: relevance.score,
					why: relevance.why,
				}
			})
			.collect()
	}

	/// Runs on score-sorted input, so the better-scored copy of a duplicate
	/// is the one retained.
	pub fn filter_duplicates(&self, articles: Vec<SelectedArticle>) -> Vec<SelectedArticle> {
		self.suppressor.suppress(articles)
	}

	pub fn limit(&self, mut articles: Vec<SelectedArticle>) -> Vec<SelectedArticle> {
		articles.truncate(self.config.max_articles);
		articles
	}
}

fn retain_recent(mut articles: Vec<Article>, cutoff: DateTime<Utc>) -> Vec<Article> {
	articles.retain(|article| match article.published() {
		Ok(published) => published >= cutoff,
		Err(PublishedDateError::Missing) => false,
		Err(err) => {
			tracing::warn!(title = %article.title, error = %err, "Invalid date format");
			false
		}
	});
	articles
}
