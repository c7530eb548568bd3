//! Deterministic candidate selection engine for generated digests.
//!
//! `digest-core` narrows a batch of embedded articles down to a short ranked
//! list: age filtering, heuristic relevance scoring, near-duplicate
//! suppression and top-k truncation. Alongside it sits a persistent,
//! append-only approximate nearest-neighbour index over the same embeddings.
//!
//! Embeddings are produced elsewhere; this crate only consumes them. Bad
//! input excludes the affected article and never aborts a run.

pub mod article;
pub mod config;
pub mod engine;
pub mod index;
pub mod selection;
pub mod types;
