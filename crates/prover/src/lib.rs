//! MerkleDrop Prover
//!
//! Keccak-256 Merkle tree and eligibility engine for airdrop claims.
//!
//! The `MerkleTree` mirrors the claiming contract's verifier: sorted-pair
//! node hashing, with the unpaired last node of a level promoted unchanged.
//! The `EligibilityEngine` wraps it with allowlist lookups, an optional
//! expected-root check and a single-entry tree cache, and packages
//! `ClaimCall` arguments for the transaction layer.

pub mod claim;
pub mod engine;
pub mod merkle;

pub use claim::ClaimCall;
pub use engine::{allowlist_digest, ClaimTarget, EligibilityEngine};
pub use merkle::{hash_pair, keccak256, leaf_hash, verify_proof, MerkleProof, MerkleTree};
