//! Validated, ordered allowlist for one airdrop round.

use std::collections::HashSet;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::{parse_address, parse_amount, Leaf, MerkleDropError, Result};

/// Unvalidated allowlist entry as it appears in an input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntry {
    pub address: String,
    /// Amount in the token's smallest unit, decimal.
    pub amount: String,
}

impl RawEntry {
    pub fn new(address: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            amount: amount.into(),
        }
    }
}

/// Eligibility of a single address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Eligible { index: usize, total_assigned: U256 },
    NotEligible,
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Self::Eligible { .. })
    }
}

/// Ordered list of leaves. Leaf order is the tree order and is never
/// changed after construction.
///
/// Addresses are unique: a duplicate would make the assigned amount of an
/// address ambiguous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allowlist {
    leaves: Vec<Leaf>,
}

impl Allowlist {
    /// Build from already-typed leaves.
    pub fn new(leaves: Vec<Leaf>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(leaves.len());
        for (i, leaf) in leaves.iter().enumerate() {
            if leaf.address.is_zero() {
                return Err(MerkleDropError::validation(format!(
                    "entry {}: zero address not allowed",
                    i
                )));
            }
            if !seen.insert(leaf.address) {
                return Err(MerkleDropError::validation(format!(
                    "entry {}: duplicate address {}",
                    i, leaf.address
                )));
            }
        }
        Ok(Self { leaves })
    }

    /// Validate raw textual entries. Fails on the first malformed entry.
    pub fn from_raw(entries: &[RawEntry]) -> Result<Self> {
        let leaves = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let address = parse_address(&entry.address).map_err(|e| at_entry(i, e))?;
                let amount = parse_amount(&entry.amount).map_err(|e| at_entry(i, e))?;
                Ok(Leaf::new(address, amount))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(leaves)
    }

    /// Every address is assigned the same amount.
    pub fn uniform<S: AsRef<str>>(addresses: &[S], amount: U256) -> Result<Self> {
        let leaves = addresses
            .iter()
            .enumerate()
            .map(|(i, addr)| {
                parse_address(addr.as_ref())
                    .map(|address| Leaf::new(address, amount))
                    .map_err(|e| at_entry(i, e))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(leaves)
    }

    pub fn leaves(&self) -> &[Leaf] {
        &self.leaves
    }

    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Position and leaf for an address.
    pub fn find(&self, address: &Address) -> Option<(usize, &Leaf)> {
        self.leaves
            .iter()
            .enumerate()
            .find(|(_, leaf)| leaf.address == *address)
    }

    /// Position of an exact `(address, amount)` pair.
    pub fn position(&self, leaf: &Leaf) -> Option<usize> {
        self.leaves.iter().position(|l| l == leaf)
    }

    pub fn check_eligibility(&self, address: &Address) -> Eligibility {
        match self.find(address) {
            Some((index, leaf)) => Eligibility::Eligible {
                index,
                total_assigned: leaf.amount,
            },
            None => Eligibility::NotEligible,
        }
    }

    /// Sum of all assigned amounts.
    pub fn total_assigned(&self) -> Result<U256> {
        self.leaves.iter().try_fold(U256::ZERO, |acc, leaf| {
            acc.checked_add(leaf.amount)
                .ok_or_else(|| MerkleDropError::validation("total assigned overflows uint256"))
        })
    }
}

fn at_entry(index: usize, err: MerkleDropError) -> MerkleDropError {
    match err {
        MerkleDropError::Validation(msg) => {
            MerkleDropError::Validation(format!("entry {}: {}", index, msg))
        }
        other => other,
    }
}
