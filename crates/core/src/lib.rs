//! MerkleDrop Core Types
//!
//! Allowlist data model shared by the eligibility engine, settings loader
//! and CLI. Everything here is plain validated data: no hashing and no I/O.

mod allowlist;
mod error;
mod types;

pub use allowlist::*;
pub use error::*;
pub use types::*;

pub use alloy_primitives::{Address, U256};
