//! Eligibility engine: allowlist lookups, proof generation and claim
//! packaging on top of `MerkleTree`.

use std::sync::Arc;

use parking_lot::Mutex;
use sha3::{Digest, Keccak256};
use tracing::{debug, warn};

use merkledrop_core::{
    Address, Allowlist, Eligibility, Hash, Leaf, LeafEncoding, MerkleDropError, Result, U256,
};

use crate::claim::ClaimCall;
use crate::merkle::{leaf_hash, verify_proof, MerkleProof, MerkleTree};

/// Which allowlist entry a proof is requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimTarget {
    /// Match on address alone; the assigned amount comes from the allowlist.
    Address(Address),
    /// Match on the exact `(address, amount)` pair.
    Exact(Leaf),
}

impl ClaimTarget {
    pub fn address(&self) -> &Address {
        match self {
            Self::Address(address) => address,
            Self::Exact(leaf) => &leaf.address,
        }
    }
}

/// Content digest of an allowlist, used as the tree cache key.
///
/// `keccak256(len_be[8] || address_0 || amount_0 || ...)`
pub fn allowlist_digest(allowlist: &Allowlist) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update((allowlist.len() as u64).to_be_bytes());
    for leaf in allowlist.leaves() {
        hasher.update(leaf.address.as_slice());
        hasher.update(leaf.amount.to_be_bytes::<32>());
    }
    hasher.finalize().into()
}

#[derive(Debug)]
struct CachedTree {
    digest: Hash,
    tree: Arc<MerkleTree>,
}

/// Builds trees and proofs for one leaf encoding.
///
/// Holds no allowlist of its own; every call takes the allowlist as input.
/// The single-entry cache only skips rebuilding the tree for the allowlist
/// seen last, and never changes a result.
#[derive(Debug)]
pub struct EligibilityEngine {
    encoding: LeafEncoding,
    expected_root: Option<Hash>,
    cache_enabled: bool,
    cache: Mutex<Option<CachedTree>>,
}

impl Default for EligibilityEngine {
    fn default() -> Self {
        Self::new(LeafEncoding::default())
    }
}

impl EligibilityEngine {
    pub fn new(encoding: LeafEncoding) -> Self {
        Self {
            encoding,
            expected_root: None,
            cache_enabled: true,
            cache: Mutex::new(None),
        }
    }

    /// Require every built tree to have this root.
    pub fn with_expected_root(mut self, root: Hash) -> Self {
        self.expected_root = Some(root);
        self
    }

    pub fn without_cache(mut self) -> Self {
        self.cache_enabled = false;
        self
    }

    pub fn encoding(&self) -> LeafEncoding {
        self.encoding
    }

    pub fn expected_root(&self) -> Option<&Hash> {
        self.expected_root.as_ref()
    }

    pub fn leaf_hash(&self, leaf: &Leaf) -> Hash {
        leaf_hash(leaf, self.encoding)
    }

    /// Build (or fetch from cache) the tree for `allowlist`.
    ///
    /// Fails with `EmptyTree` for an empty allowlist and with
    /// `EncodingMismatch` when an expected root is set and differs.
    pub fn build_tree(&self, allowlist: &Allowlist) -> Result<Arc<MerkleTree>> {
        if allowlist.is_empty() {
            return Err(MerkleDropError::EmptyTree);
        }

        let digest = self.cache_enabled.then(|| allowlist_digest(allowlist));
        if let Some(digest) = digest {
            if let Some(cached) = self.cache.lock().as_ref() {
                if cached.digest == digest {
                    debug!("Tree cache hit for allowlist 0x{}", hex::encode(digest));
                    return Ok(cached.tree.clone());
                }
            }
        }

        let tree = MerkleTree::from_leaves(allowlist.leaves(), self.encoding)?;
        let root = tree.root();
        if let Some(expected) = &self.expected_root {
            if *expected != root {
                warn!(
                    "Rebuilt root 0x{} does not match expected 0x{} ({} encoding)",
                    hex::encode(root),
                    hex::encode(expected),
                    self.encoding
                );
                return Err(MerkleDropError::root_mismatch(expected, &root));
            }
        }

        let tree = Arc::new(tree);
        if let Some(digest) = digest {
            *self.cache.lock() = Some(CachedTree {
                digest,
                tree: tree.clone(),
            });
        }
        Ok(tree)
    }

    pub fn root(&self, allowlist: &Allowlist) -> Result<Hash> {
        Ok(self.build_tree(allowlist)?.root())
    }

    /// Inclusion proof for `target`.
    ///
    /// An empty allowlist is `EmptyTree`, not `NotFound`.
    pub fn generate_proof(&self, allowlist: &Allowlist, target: &ClaimTarget) -> Result<MerkleProof> {
        if allowlist.is_empty() {
            return Err(MerkleDropError::EmptyTree);
        }
        let index = match target {
            ClaimTarget::Address(address) => allowlist.find(address).map(|(index, _)| index),
            ClaimTarget::Exact(leaf) => allowlist.position(leaf),
        }
        .ok_or_else(|| MerkleDropError::NotFound(target.address().to_string()))?;

        let tree = self.build_tree(allowlist)?;
        let proof = tree.proof(index).ok_or_else(|| {
            MerkleDropError::NotFound(format!("leaf index {} outside tree", index))
        })?;

        debug!(
            "Generated proof for {} (leaf {}, {} siblings)",
            target.address(),
            index,
            proof.siblings.len()
        );
        Ok(proof)
    }

    /// Local mirror of the on-chain check.
    pub fn verify_proof(&self, leaf_hash: &Hash, proof: &[Hash], expected_root: &Hash) -> bool {
        verify_proof(leaf_hash, proof, expected_root)
    }

    pub fn check_eligibility(&self, allowlist: &Allowlist, address: &Address) -> Eligibility {
        allowlist.check_eligibility(address)
    }

    /// Arguments for `airdrop(witnesses, totalAssigned, claimedAmount)`.
    ///
    /// `claimed_amount` must be non-zero and no larger than the amount
    /// assigned to `address`.
    pub fn prepare_claim(
        &self,
        allowlist: &Allowlist,
        address: &Address,
        claimed_amount: U256,
    ) -> Result<ClaimCall> {
        if allowlist.is_empty() {
            return Err(MerkleDropError::EmptyTree);
        }
        let (_, leaf) = allowlist
            .find(address)
            .ok_or_else(|| MerkleDropError::NotFound(address.to_string()))?;

        if claimed_amount.is_zero() {
            return Err(MerkleDropError::InvalidClaim(
                "claimed amount must be greater than zero".to_string(),
            ));
        }
        if claimed_amount > leaf.amount {
            return Err(MerkleDropError::InvalidClaim(format!(
                "claimed {} exceeds assigned {}",
                claimed_amount, leaf.amount
            )));
        }

        let leaf = *leaf;
        let proof = self.generate_proof(allowlist, &ClaimTarget::Exact(leaf))?;
        Ok(ClaimCall::new(leaf, proof, claimed_amount))
    }

    pub fn clear_cache(&self) {
        *self.cache.lock() = None;
    }

    pub fn is_cached(&self, allowlist: &Allowlist) -> bool {
        let digest = allowlist_digest(allowlist);
        self.cache
            .lock()
            .as_ref()
            .map_or(false, |cached| cached.digest == digest)
    }
}
