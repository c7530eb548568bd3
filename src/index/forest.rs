//! Random-projection forest over the angular metric.
//!
//! Each tree recursively splits its members by the hyperplane between two
//! pivot vectors until a node holds at most `leaf_size` members. Queries walk
//! every tree best-first by hyperplane margin, collect a candidate pool and
//! rank it by exact angular distance. The forest is static: adding vectors
//! means building a new one.

use std::collections::{BTreeSet, BinaryHeap};

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::selection::similarity::cosine_similarity;
use crate::types::identifiers::EntryId;

// Pivot pairs tried before a node falls back to an even split.
const SPLIT_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredVector {
    pub id: EntryId,
    pub vector: Vec<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_trees: usize,
    pub leaf_size: usize,
    pub seed: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Node {
    /// Positions into `Forest::items`.
    Leaf(Vec<u32>),
    /// Members with `dot(normal, v) > 0` go right. An empty normal marks an
    /// even split with no hyperplane.
    Split { normal: Vec<f32>, left: u32, right: u32 },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Forest {
    items: Vec<StoredVector>,
    nodes: Vec<Node>,
    roots: Vec<u32>,
}

/// Best-first frontier entry; BinaryHeap pops the largest margin first.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Frontier {
    priority: OrderedFloat<f32>,
    node: u32,
}

impl Forest {
    pub fn build(items: Vec<StoredVector>, params: ForestParams) -> Self {
        let mut forest = Forest {
            items,
            nodes: Vec::new(),
            roots: Vec::new(),
        };
        if forest.items.is_empty() {
            return forest;
        }

        for tree in 0..params.n_trees.max(1) {
            let root = forest.build_tree(&params, tree as u64);
            forest.roots.push(root);
        }
        forest
    }

    pub fn items(&self) -> &[StoredVector] {
        &self.items
    }

    pub fn into_items(self) -> Vec<StoredVector> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn tree_count(&self) -> usize {
        self.roots.len()
    }

    /// Structural check for a forest read back from disk. Every node
    /// reference must resolve, children must sit after their parent (so no
    /// walk can cycle), and every vector must have `dimension` components.
    pub fn validate(&self, dimension: usize) -> Result<(), String> {
        if let Some(item) = self.items.iter().find(|item| item.vector.len() != dimension) {
            return Err(format!(
                "entry {} has {} components, expected {}",
                item.id,
                item.vector.len(),
                dimension
            ));
        }
        if !self.items.is_empty() && self.roots.is_empty() {
            return Err("forest has entries but no trees".to_string());
        }

        let node_count = self.nodes.len();
        if let Some(root) = self.roots.iter().find(|&&root| root as usize >= node_count) {
            return Err(format!("root {} out of {} nodes", root, node_count));
        }

        for (slot, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Leaf(members) => {
                    if let Some(member) = members.iter().find(|&&m| m as usize >= self.items.len()) {
                        return Err(format!(
                            "leaf {} references entry {} of {}",
                            slot,
                            member,
                            self.items.len()
                        ));
                    }
                }
                Node::Split { normal, left, right } => {
                    if !normal.is_empty() && normal.len() != dimension {
                        return Err(format!(
                            "split {} has a {}-component normal, expected {}",
                            slot,
                            normal.len(),
                            dimension
                        ));
                    }
                    for child in [*left, *right] {
                        let child = child as usize;
                        if child <= slot || child >= node_count {
                            return Err(format!("split {} has invalid child {}", slot, child));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn push_placeholder(&mut self) -> u32 {
        self.nodes.push(Node::Leaf(Vec::new()));
        (self.nodes.len() - 1) as u32
    }

    // Iterative so lopsided splits cannot exhaust the stack.
    fn build_tree(&mut self, params: &ForestParams, tree: u64) -> u32 {
        let leaf_size = params.leaf_size.max(1);
        let root = self.push_placeholder();
        let all: Vec<u32> = (0..self.items.len() as u32).collect();
        let mut pending = vec![(root, all, 0u32)];

        while let Some((slot, members, depth)) = pending.pop() {
            if members.len() <= leaf_size {
                self.nodes[slot as usize] = Node::Leaf(members);
                continue;
            }

            let (normal, left_members, right_members) =
                self.split(&members, params.seed, tree, depth);
            let left = self.push_placeholder();
            let right = self.push_placeholder();
            self.nodes[slot as usize] = Node::Split {
                normal,
                left,
                right,
            };
            pending.push((right, right_members, depth + 1));
            pending.push((left, left_members, depth + 1));
        }

        root
    }

    fn split(&self, members: &[u32], seed: u64, tree: u64, depth: u32) -> (Vec<f32>, Vec<u32>, Vec<u32>) {
        for attempt in 0..SPLIT_ATTEMPTS {
            let (i, j) = pick_pivots(seed, tree, depth, attempt, members);
            let a = unit(&self.items[members[i] as usize].vector);
            let b = unit(&self.items[members[j] as usize].vector);
            let normal: Vec<f32> = a.iter().zip(&b).map(|(x, y)| x - y).collect();
            if normal.iter().all(|v| *v == 0.0) {
                continue;
            }

            let (right, left): (Vec<u32>, Vec<u32>) = members
                .iter()
                .copied()
                .partition(|m| dot(&normal, &self.items[*m as usize].vector) > 0.0);
            if !left.is_empty() && !right.is_empty() {
                return (normal, left, right);
            }
        }

        // All members point the same way.
        let mid = members.len() / 2;
        (Vec::new(), members[..mid].to_vec(), members[mid..].to_vec())
    }

    /// Up to `k` nearest entries by angular distance, closest first, ties by
    /// ascending id. `search_k` bounds the candidate pool and defaults to
    /// `k * tree_count`.
    pub fn search(&self, query: &[f32], k: usize, search_k: Option<usize>) -> Vec<(EntryId, f32)> {
        if k == 0 || self.items.is_empty() {
            return Vec::new();
        }
        let search_k = search_k
            .unwrap_or_else(|| k.saturating_mul(self.roots.len()))
            .max(k);

        let mut frontier: BinaryHeap<Frontier> = self
            .roots
            .iter()
            .map(|&node| Frontier {
                priority: OrderedFloat(f32::INFINITY),
                node,
            })
            .collect();
        let mut candidates = BTreeSet::new();

        while candidates.len() < search_k {
            let Some(Frontier { priority, node }) = frontier.pop() else {
                break;
            };
            match &self.nodes[node as usize] {
                Node::Leaf(members) => candidates.extend(members.iter().copied()),
                Node::Split { normal, left, right } => {
                    let margin = dot(normal, query);
                    frontier.push(Frontier {
                        priority: priority.min(OrderedFloat(margin)),
                        node: *right,
                    });
                    frontier.push(Frontier {
                        priority: priority.min(OrderedFloat(-margin)),
                        node: *left,
                    });
                }
            }
        }

        let mut ranked: Vec<(EntryId, f32)> = candidates
            .into_iter()
            .map(|position| {
                let item = &self.items[position as usize];
                (item.id, angular_distance(query, &item.vector))
            })
            .collect();
        ranked.sort_by(|a, b| {
            OrderedFloat(a.1)
                .cmp(&OrderedFloat(b.1))
                .then_with(|| a.0.cmp(&b.0))
        });
        ranked.truncate(k);
        ranked
    }
}

/// Euclidean distance between the normalized vectors, in [0, 2].
pub fn angular_distance(a: &[f32], b: &[f32]) -> f32 {
    let cos = cosine_similarity(a, b);
    (2.0 - 2.0 * cos).max(0.0).sqrt()
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn unit(v: &[f32]) -> Vec<f32> {
    let norm = dot(v, v).sqrt();
    if norm == 0.0 {
        return vec![0.0; v.len()];
    }
    v.iter().map(|x| x / norm).collect()
}

/// Two distinct positions in `members`, derived from the build coordinates
/// so that rebuilding the same input yields the same forest.
fn pick_pivots(seed: u64, tree: u64, depth: u32, attempt: u32, members: &[u32]) -> (usize, usize) {
    let n = members.len();
    debug_assert!(n >= 2);

    let mut hasher = Sha256::new();
    hasher.update(seed.to_le_bytes());
    hasher.update(tree.to_le_bytes());
    hasher.update(depth.to_le_bytes());
    hasher.update(attempt.to_le_bytes());
    hasher.update((n as u64).to_le_bytes());
    hasher.update(members[0].to_le_bytes());
    hasher.update(members[n - 1].to_le_bytes());
    let hash = hasher.finalize();

    let word = |bytes: &[u8]| bytes.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b));
    let i = (word(&hash[..8]) % n as u64) as usize;
    let mut j = (word(&hash[8..16]) % (n as u64 - 1)) as usize;
    if j >= i {
        j += 1;
    }
    (i, j)
}
