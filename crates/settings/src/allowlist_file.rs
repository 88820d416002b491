//! Allowlist input files.
//!
//! Two JSON shapes are accepted:
//!
//! ```json
//! { "entries": [ { "address": "0x…", "amount": "100000000000000000000" } ] }
//! { "addresses": [ "0x…", "0x…" ], "tokens_per_address": "100" }
//! ```
//!
//! Explicit amounts are in the token's smallest unit; `tokens_per_address`
//! is in whole tokens (18 decimals).

use std::path::Path;

use merkledrop_core::{parse_tokens, Allowlist, RawEntry};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{Result, SettingsError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AllowlistFile {
    Explicit {
        entries: Vec<RawEntry>,
    },
    Uniform {
        addresses: Vec<String>,
        tokens_per_address: String,
    },
}

impl AllowlistFile {
    /// Validate into an `Allowlist`.
    pub fn into_allowlist(self) -> Result<Allowlist> {
        let allowlist = match self {
            Self::Explicit { entries } => Allowlist::from_raw(&entries)?,
            Self::Uniform {
                addresses,
                tokens_per_address,
            } => Allowlist::uniform(addresses.as_slice(), parse_tokens(&tokens_per_address)?)?,
        };
        Ok(allowlist)
    }
}

/// Read, parse and validate an allowlist file.
pub fn load_allowlist(path: &Path) -> Result<Allowlist> {
    let content =
        std::fs::read_to_string(path).map_err(|source| SettingsError::AllowlistReadError {
            path: path.to_path_buf(),
            source,
        })?;
    let file: AllowlistFile =
        serde_json::from_str(&content).map_err(|source| SettingsError::AllowlistParseError {
            path: path.to_path_buf(),
            source,
        })?;
    let allowlist = file.into_allowlist()?;
    info!("Loaded {} allowlist entries from {:?}", allowlist.len(), path);
    Ok(allowlist)
}
