//! Binary keccak-256 Merkle tree over allowlist leaves.
//!
//! Layout rules, all of which the on-chain verifier depends on:
//!
//! - leaves stay in allowlist order; adjacent hashes `(2i, 2i+1)` pair up
//! - a node is `keccak256(min(a, b) || max(a, b))`, so proofs carry no
//!   left/right flags
//! - an unpaired last hash is promoted unchanged to the next level and
//!   contributes no proof element at that level

use sha3::{Digest, Keccak256};
use tracing::debug;

use merkledrop_core::{Hash, Leaf, LeafEncoding, MerkleDropError, Result};

pub fn keccak256(data: &[u8]) -> Hash {
    Keccak256::digest(data).into()
}

/// Hash a leaf under the given encoding.
pub fn leaf_hash(leaf: &Leaf, encoding: LeafEncoding) -> Hash {
    let preimage = encoding.encode(leaf);
    match encoding {
        LeafEncoding::Packed => keccak256(&preimage),
        LeafEncoding::Standard => keccak256(&keccak256(&preimage)),
    }
}

/// Commutative node hash: `keccak256(min(a, b) || max(a, b))`.
pub fn hash_pair(a: &Hash, b: &Hash) -> Hash {
    let (first, second) = if a <= b { (a, b) } else { (b, a) };
    Keccak256::new()
        .chain_update(first)
        .chain_update(second)
        .finalize()
        .into()
}

/// Fold one level into the next. The odd-node rule lives here and only here.
fn next_level(level: &[Hash]) -> Vec<Hash> {
    level
        .chunks(2)
        .map(|pair| match pair {
            [left, right] => hash_pair(left, right),
            [single] => *single,
            _ => unreachable!("chunks(2) yields one or two elements"),
        })
        .collect()
}

/// Recompute a root from a leaf hash and its sibling path.
fn fold_proof(leaf: &Hash, siblings: &[Hash]) -> Hash {
    siblings
        .iter()
        .fold(*leaf, |acc, sibling| hash_pair(&acc, sibling))
}

/// Check a sibling path against a root.
///
/// A non-matching proof is an ordinary `false`, never an error.
pub fn verify_proof(leaf: &Hash, siblings: &[Hash], root: &Hash) -> bool {
    fold_proof(leaf, siblings) == *root
}

/// Inclusion proof for one leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleProof {
    /// Position of the leaf in the allowlist
    pub leaf_index: usize,
    /// Hash of the proven leaf
    pub leaf: Hash,
    /// Sibling hashes from the leaf level up to (not including) the root
    pub siblings: Vec<Hash>,
}

impl MerkleProof {
    pub fn compute_root(&self) -> Hash {
        fold_proof(&self.leaf, &self.siblings)
    }

    pub fn verify(&self, root: &Hash) -> bool {
        verify_proof(&self.leaf, &self.siblings, root)
    }
}

/// Fully materialised tree: `levels[0]` are the leaf hashes, the last level
/// holds only the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleTree {
    levels: Vec<Vec<Hash>>,
}

impl MerkleTree {
    /// Build from precomputed leaf hashes.
    pub fn from_leaf_hashes(leaves: Vec<Hash>) -> Result<Self> {
        if leaves.is_empty() {
            return Err(MerkleDropError::EmptyTree);
        }

        let mut levels = vec![leaves];
        while let Some(level) = levels.last().filter(|level| level.len() > 1) {
            let next = next_level(level);
            levels.push(next);
        }

        debug!(
            "Built Merkle tree: {} leaves, {} levels",
            levels[0].len(),
            levels.len()
        );
        Ok(Self { levels })
    }

    /// Hash `leaves` under `encoding` and build the tree.
    pub fn from_leaves(leaves: &[Leaf], encoding: LeafEncoding) -> Result<Self> {
        let hashes = leaves.iter().map(|leaf| leaf_hash(leaf, encoding)).collect();
        Self::from_leaf_hashes(hashes)
    }

    pub fn root(&self) -> Hash {
        // Construction guarantees a non-empty final level.
        self.levels[self.levels.len() - 1][0]
    }

    pub fn leaf_count(&self) -> usize {
        self.levels[0].len()
    }

    /// Number of hashing levels above the leaves.
    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    pub fn leaf(&self, index: usize) -> Option<&Hash> {
        self.levels[0].get(index)
    }

    pub fn levels(&self) -> &[Vec<Hash>] {
        &self.levels
    }

    /// Sibling path for the leaf at `index`, or `None` if out of range.
    pub fn proof(&self, index: usize) -> Option<MerkleProof> {
        let leaf = *self.leaf(index)?;
        let mut siblings = Vec::with_capacity(self.depth());
        let mut position = index;

        for level in &self.levels[..self.depth()] {
            let sibling = position ^ 1;
            if let Some(hash) = level.get(sibling) {
                siblings.push(*hash);
            }
            position /= 2;
        }

        Some(MerkleProof {
            leaf_index: index,
            leaf,
            siblings,
        })
    }
}
