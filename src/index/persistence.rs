//! On-disk form of a vector index: a binary forest file plus a JSON metadata
//! table, always written and read as a pair.
//!
//! The forest file records the SHA-256 digest of the metadata bytes it was
//! saved with. Both files are written to temporaries, synced, then renamed
//! metadata first. A crash between the two renames leaves a pair whose
//! digests disagree, which loads as an error instead of a mixed state.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::IndexError;
use super::forest::{Forest, ForestParams};
use crate::article::EntryMetadata;
use crate::types::identifiers::{ArtifactDigest, EntryId};

pub const INDEX_FILE: &str = "articles.ann";
pub const METADATA_FILE: &str = "metadata.json";

const INDEX_MAGIC: &[u8; 4] = b"DANN";
const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub index: PathBuf,
    pub metadata: PathBuf,
}

impl ArtifactPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            index: dir.join(INDEX_FILE),
            metadata: dir.join(METADATA_FILE),
        }
    }

    pub fn both_exist(&self) -> bool {
        self.index.exists() && self.metadata.exists()
    }

    pub fn any_exist(&self) -> bool {
        self.index.exists() || self.metadata.exists()
    }
}

// Field order is the bincode layout; keep both structs in step.
#[derive(Serialize)]
struct IndexArtifactRef<'a> {
    format_version: u32,
    dimension: usize,
    params: ForestParams,
    metadata_digest: &'a ArtifactDigest,
    forest: &'a Forest,
}

#[derive(Deserialize)]
struct IndexArtifact {
    format_version: u32,
    dimension: usize,
    params: ForestParams,
    metadata_digest: ArtifactDigest,
    forest: Forest,
}

/// Everything a restored index needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub dimension: usize,
    pub params: ForestParams,
    pub forest: Forest,
    pub metadata: BTreeMap<EntryId, EntryMetadata>,
}

pub fn save_pair(
    paths: &ArtifactPaths,
    dimension: usize,
    params: ForestParams,
    forest: &Forest,
    metadata: &BTreeMap<EntryId, EntryMetadata>,
) -> Result<ArtifactDigest, IndexError> {
    let metadata_bytes = serde_json::to_vec_pretty(metadata)?;
    let metadata_digest = ArtifactDigest::from_bytes(&metadata_bytes);

    let artifact = IndexArtifactRef {
        format_version: FORMAT_VERSION,
        dimension,
        params,
        metadata_digest: &metadata_digest,
        forest,
    };
    let mut index_bytes = Vec::with_capacity(INDEX_MAGIC.len());
    index_bytes.extend_from_slice(INDEX_MAGIC);
    bincode::serialize_into(&mut index_bytes, &artifact)?;

    if let Some(parent) = paths.index.parent() {
        fs::create_dir_all(parent)?;
    }

    let metadata_tmp = temp_path(&paths.metadata);
    let index_tmp = temp_path(&paths.index);
    write_synced(&metadata_tmp, &metadata_bytes)?;
    write_synced(&index_tmp, &index_bytes)?;

    fs::rename(&metadata_tmp, &paths.metadata)?;
    fs::rename(&index_tmp, &paths.index)?;

    tracing::info!(
        "Saved vector index ({} vectors, {} bytes, metadata {})",
        forest.len(),
        index_bytes.len(),
        metadata_digest
    );
    Ok(metadata_digest)
}

pub fn load_pair(paths: &ArtifactPaths) -> Result<Snapshot, IndexError> {
    for path in [&paths.index, &paths.metadata] {
        if !path.exists() {
            return Err(IndexError::IncompletePair(path.clone()));
        }
    }

    let index_bytes = fs::read(&paths.index)?;
    let payload = index_bytes
        .strip_prefix(INDEX_MAGIC.as_slice())
        .ok_or_else(|| IndexError::BadMagic(paths.index.clone()))?;
    let artifact: IndexArtifact = bincode::deserialize(payload)?;
    if artifact.format_version != FORMAT_VERSION {
        return Err(IndexError::UnsupportedFormat(artifact.format_version));
    }

    let metadata_bytes = fs::read(&paths.metadata)?;
    let actual = ArtifactDigest::from_bytes(&metadata_bytes);
    if actual != artifact.metadata_digest {
        return Err(IndexError::DigestMismatch {
            expected: artifact.metadata_digest,
            actual,
        });
    }
    let metadata: BTreeMap<EntryId, EntryMetadata> = serde_json::from_slice(&metadata_bytes)?;
    artifact
        .forest
        .validate(artifact.dimension)
        .map_err(IndexError::Corrupt)?;

    tracing::debug!("Verified metadata digest {}", actual);

    Ok(Snapshot {
        dimension: artifact.dimension,
        params: artifact.params,
        forest: artifact.forest,
        metadata,
    })
}

/// Delete both artifacts and any temporaries left by an interrupted save.
pub fn remove_pair(paths: &ArtifactPaths) -> Result<(), IndexError> {
    for path in [
        paths.index.clone(),
        paths.metadata.clone(),
        temp_path(&paths.index),
        temp_path(&paths.metadata),
    ] {
        if path.exists() {
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn write_synced(path: &Path, bytes: &[u8]) -> Result<(), IndexError> {
    let mut f = fs::File::create(path)?;
    f.write_all(bytes)?;
    f.sync_all()?;
    Ok(())
}
