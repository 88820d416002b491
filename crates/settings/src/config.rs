//! Configuration types

use std::path::{Path, PathBuf};

use merkledrop_core::{Hash, LeafEncoding, MerkleDropError};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{default_settings_path, Result, SettingsError};

/// Main settings structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Allowlist input
    #[serde(default)]
    pub allowlist: AllowlistSettings,

    /// Tree construction convention
    #[serde(default)]
    pub tree: TreeSettings,

    /// Custom settings file path (not serialized)
    #[serde(skip)]
    config_path: Option<PathBuf>,
}

impl Settings {
    /// Load settings from the default path, or create defaults
    pub fn load_or_default() -> Result<Self> {
        Self::load_from(&default_settings_path())
    }

    /// Load settings from a specific path, or create defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path).map_err(SettingsError::ReadError)?;
            let mut settings: Settings =
                serde_json::from_str(&content).map_err(SettingsError::ParseError)?;
            settings.tree.expected_root()?;
            settings.config_path = Some(path.to_path_buf());
            info!("Loaded settings from {:?}", path);
            Ok(settings)
        } else {
            let mut settings = Self::default();
            settings.config_path = Some(path.to_path_buf());
            Ok(settings)
        }
    }

    /// Save settings to the configured path
    pub fn save(&self) -> Result<()> {
        let path = self.config_path.clone().unwrap_or_else(default_settings_path);
        self.save_to(&path)
    }

    /// Save settings to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(SettingsError::CreateDirError)?;
            }
        }

        let content = serde_json::to_string_pretty(self).map_err(SettingsError::ParseError)?;
        std::fs::write(path, content).map_err(SettingsError::WriteError)?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }
}

/// Where the round's allowlist lives
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AllowlistSettings {
    /// Allowlist JSON file
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Tree settings. These must match the deployed claiming contract.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TreeSettings {
    /// Leaf encoding used by the contract
    #[serde(default)]
    pub leaf_encoding: LeafEncoding,

    /// Root the contract was deployed with (`0x`-prefixed hex)
    #[serde(default)]
    pub expected_root: Option<String>,
}

impl TreeSettings {
    /// Parsed expected root, if configured.
    pub fn expected_root(&self) -> Result<Option<Hash>> {
        self.expected_root.as_deref().map(parse_root).transpose()
    }
}

/// Parse a `0x`-prefixed (or bare) 32-byte hex root.
pub(crate) fn parse_root(s: &str) -> Result<Hash> {
    let cleaned = s.trim().trim_start_matches("0x");
    let mut root = [0u8; 32];
    hex::decode_to_slice(cleaned, &mut root).map_err(|e| {
        MerkleDropError::validation(format!("expected root '{}' is not 32-byte hex: {}", s, e))
    })?;
    Ok(root)
}
