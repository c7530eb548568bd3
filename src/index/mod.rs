pub mod error;
pub mod forest;
pub mod persistence;

use std::collections::BTreeMap;
use std::fs;

use serde::{Deserialize, Serialize};

use crate::article::{Article, EntryMetadata};
use crate::config::IndexConfig;
use crate::types::identifiers::EntryId;
pub use error::IndexError;
pub use forest::{angular_distance, Forest, ForestParams, StoredVector};
pub use persistence::{ArtifactPaths, Snapshot, INDEX_FILE, METADATA_FILE};

/// A nearest-neighbour match with its persisted metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: EntryId,
    #[serde(flatten)]
    pub metadata: EntryMetadata,
    /// `1 - angular_distance / 2`. Not clamped.
    pub similarity: f32,
}

/// Append-only approximate nearest-neighbour index over article embeddings.
///
/// Single writer per process. Every successful [`VectorIndex::add`] rebuilds
/// the forest over all vectors and persists the artifact pair.
#[derive(Debug)]
pub struct VectorIndex {
    config: IndexConfig,
    paths: ArtifactPaths,
    forest: Forest,
    metadata: BTreeMap<EntryId, EntryMetadata>,
    current_id: EntryId,
}

impl VectorIndex {
    /// An empty index that has not touched the disk yet.
    pub fn new(config: IndexConfig) -> Self {
        let paths = ArtifactPaths::in_dir(&config.dir);
        Self {
            config,
            paths,
            forest: Forest::default(),
            metadata: BTreeMap::new(),
            current_id: EntryId::FIRST,
        }
    }

    /// Create the index directory and restore persisted state if a complete
    /// artifact pair is present. An unreadable pair is a cold start.
    pub fn open(config: IndexConfig) -> Result<Self, IndexError> {
        fs::create_dir_all(&config.dir)?;
        let mut index = Self::new(config);

        if index.paths.both_exist() {
            if let Err(err) = index.load() {
                tracing::warn!("Error loading vector store, starting empty: {}", err);
                index.reset();
            }
        } else if index.paths.any_exist() {
            tracing::warn!(
                "Incomplete vector store in {:?}, starting empty",
                index.config.dir
            );
        }

        tracing::info!(
            "Initialized vector store at {:?} ({} entries)",
            index.config.dir,
            index.len()
        );
        Ok(index)
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    pub fn paths(&self) -> &ArtifactPaths {
        &self.paths
    }

    pub fn dimension(&self) -> usize {
        self.config.dimension
    }

    pub fn params(&self) -> ForestParams {
        ForestParams {
            n_trees: self.config.n_trees,
            leaf_size: self.config.leaf_size,
            seed: self.config.seed,
        }
    }

    /// The id the next accepted entry will receive.
    pub fn current_id(&self) -> EntryId {
        self.current_id
    }

    pub fn len(&self) -> usize {
        self.forest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forest.is_empty()
    }

    pub fn metadata(&self, id: EntryId) -> Option<&EntryMetadata> {
        self.metadata.get(&id)
    }

    /// Append every article that carries a finite embedding of the index
    /// dimension, rebuild, and persist. Returns how many were accepted;
    /// rejected articles are logged and skipped.
    pub fn add(&mut self, articles: &[Article]) -> Result<usize, IndexError> {
        let mut staged = Vec::new();
        let mut next_id = self.current_id;

        for article in articles {
            let Some(embedding) = article.usable_embedding() else {
                tracing::warn!("Article missing embedding, skipping: {}", article.title);
                continue;
            };
            if embedding.len() != self.config.dimension {
                tracing::warn!(
                    "Article embedding has dimension {}, expected {}, skipping: {}",
                    embedding.len(),
                    self.config.dimension,
                    article.title
                );
                continue;
            }
            if !embedding.iter().all(|v| v.is_finite()) {
                tracing::warn!("Article embedding is not finite, skipping: {}", article.title);
                continue;
            }

            let id = next_id;
            next_id = id.next().ok_or(IndexError::IdsExhausted(id))?;
            staged.push((
                StoredVector {
                    id,
                    vector: embedding.to_vec(),
                },
                EntryMetadata::from(article),
            ));
        }

        if staged.is_empty() {
            tracing::debug!("No articles accepted, index left unchanged");
            return Ok(0);
        }

        let added = staged.len();
        let mut items = std::mem::take(&mut self.forest).into_items();
        for (vector, metadata) in staged {
            self.metadata.insert(vector.id, metadata);
            items.push(vector);
        }

        // Full rebuild: the forest is not incrementally balanced.
        self.forest = Forest::build(items, self.params());
        self.current_id = next_id;
        self.save()?;

        tracing::info!("Added {} articles to vector store", added);
        Ok(added)
    }

    pub fn search(&self, query: &[f32], k: usize) -> Vec<SearchHit> {
        self.search_with(query, k, None)
    }

    /// Like [`VectorIndex::search`] with an explicit candidate pool size;
    /// larger pools trade query time for recall.
    pub fn search_with(&self, query: &[f32], k: usize, search_k: Option<usize>) -> Vec<SearchHit> {
        if query.len() != self.config.dimension {
            tracing::warn!(
                "Query has dimension {}, expected {}",
                query.len(),
                self.config.dimension
            );
            return Vec::new();
        }

        self.forest
            .search(query, k, search_k)
            .into_iter()
            .filter_map(|(id, distance)| {
                let metadata = self.metadata.get(&id)?.clone();
                Some(SearchHit {
                    id,
                    metadata,
                    similarity: 1.0 - distance / 2.0,
                })
            })
            .collect()
    }

    pub fn save(&self) -> Result<(), IndexError> {
        persistence::save_pair(
            &self.paths,
            self.config.dimension,
            self.params(),
            &self.forest,
            &self.metadata,
        )?;
        Ok(())
    }

    /// Replace in-memory state with the persisted pair. On error the current
    /// state is left untouched.
    pub fn load(&mut self) -> Result<(), IndexError> {
        let snapshot = persistence::load_pair(&self.paths)?;
        if snapshot.dimension != self.config.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.config.dimension,
                actual: snapshot.dimension,
            });
        }
        if snapshot.params != self.params() {
            tracing::debug!(
                "Persisted forest was built with {:?}, next rebuild uses {:?}",
                snapshot.params,
                self.params()
            );
        }

        let max_id = snapshot
            .forest
            .items()
            .iter()
            .map(|item| item.id)
            .chain(snapshot.metadata.keys().copied())
            .max();
        let current_id = match max_id {
            Some(max_id) => max_id.next().ok_or(IndexError::IdsExhausted(max_id))?,
            None => EntryId::FIRST,
        };
        self.current_id = current_id;
        self.forest = snapshot.forest;
        self.metadata = snapshot.metadata;

        tracing::info!("Loaded vector store from disk ({} entries)", self.len());
        Ok(())
    }

    /// Drop every entry and delete the persisted artifacts.
    pub fn clear(&mut self) -> Result<(), IndexError> {
        self.reset();
        persistence::remove_pair(&self.paths)?;
        tracing::info!("Cleared vector store");
        Ok(())
    }

    fn reset(&mut self) {
        self.forest = Forest::default();
        self.metadata.clear();
        self.current_id = EntryId::FIRST;
    }
}
