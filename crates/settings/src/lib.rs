//! MerkleDrop Settings
//!
//! Configuration and allowlist input files for MerkleDrop tools.
//!
//! ## Features
//!
//! - Leaf encoding and expected Merkle root for the airdrop round
//! - Allowlist file location
//! - Allowlist files in explicit (`entries`) or uniform (`addresses`) form
//! - JSON serialization
//!
//! ## Usage
//!
//! ```no_run
//! use merkledrop_settings::{load_allowlist, Settings};
//!
//! let settings = Settings::load_or_default()?;
//! if let Some(path) = &settings.allowlist.path {
//!     let allowlist = load_allowlist(path)?;
//!     println!("{} eligible addresses", allowlist.len());
//! }
//! # Ok::<(), merkledrop_settings::SettingsError>(())
//! ```

mod allowlist_file;
mod config;

pub use allowlist_file::{load_allowlist, AllowlistFile};
pub use config::{AllowlistSettings, Settings, TreeSettings};

use std::path::PathBuf;

use merkledrop_core::MerkleDropError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to read settings: {0}")]
    ReadError(std::io::Error),

    #[error("Failed to write settings: {0}")]
    WriteError(std::io::Error),

    #[error("Failed to parse settings: {0}")]
    ParseError(serde_json::Error),

    #[error("Failed to create config directory: {0}")]
    CreateDirError(std::io::Error),

    #[error("Failed to read allowlist {path:?}: {source}")]
    AllowlistReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse allowlist {path:?}: {source}")]
    AllowlistParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Invalid(#[from] MerkleDropError),
}

pub type Result<T> = std::result::Result<T, SettingsError>;

/// Per-user configuration directory: `$XDG_CONFIG_HOME/merkledrop`, else
/// `$HOME/.config/merkledrop`, else `./.merkledrop`.
pub fn default_config_dir() -> PathBuf {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(xdg).join("merkledrop");
    }
    match std::env::var_os("HOME").filter(|v| !v.is_empty()) {
        Some(home) => PathBuf::from(home).join(".config").join("merkledrop"),
        None => PathBuf::from(".merkledrop"),
    }
}

/// Get the default settings file path
pub fn default_settings_path() -> PathBuf {
    default_config_dir().join("settings.json")
}
