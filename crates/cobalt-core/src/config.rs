//! Backend configuration
//!
//! Defaults match the reference deployment: three JSON files under
//! `data/`, with owner `1` (the demo account) as the seed template.
//! Values come from an optional TOML file, then `COBALT_DATA_DIR`.

use crate::error::CobaltError;
use cobalt_store::OwnerId;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding [`CobaltConfig::data_dir`]
pub const DATA_DIR_ENV: &str = "COBALT_DATA_DIR";

/// Cobalt configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CobaltConfig {
    /// Directory holding the document files
    pub data_dir: PathBuf,
    /// Credit ratings document, relative to `data_dir` unless absolute
    pub ratings_file: PathBuf,
    /// Scenarios document, relative to `data_dir` unless absolute
    pub scenarios_file: PathBuf,
    /// Scenario surface cache document, relative to `data_dir` unless absolute
    pub surfaces_file: PathBuf,
    /// Owner whose records seed new accounts
    pub template_owner: String,
}

impl CobaltConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With data directory
    #[inline]
    #[must_use]
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// With seed template owner
    #[inline]
    #[must_use]
    pub fn with_template_owner(mut self, owner: impl Into<String>) -> Self {
        self.template_owner = owner.into();
        self
    }

    /// Parse TOML; missing keys take their defaults
    ///
    /// # Errors
    /// [`CobaltError::Config`] on malformed TOML or unknown keys.
    pub fn from_toml_str(text: &str) -> Result<Self, CobaltError> {
        toml::from_str(text).map_err(|e| CobaltError::Config(e.to_string()))
    }

    /// Load from `path` (if given) and apply environment overrides
    ///
    /// # Errors
    /// [`CobaltError::Config`] if the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, CobaltError> {
        let config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| {
                    CobaltError::Config(format!("cannot read {}: {e}", path.display()))
                })?;
                Self::from_toml_str(&text)?
            }
            None => Self::default(),
        };
        Ok(config.with_env_overrides(std::env::var_os(DATA_DIR_ENV).map(PathBuf::from)))
    }

    /// Apply an optional data directory override
    #[must_use]
    pub fn with_env_overrides(self, data_dir: Option<PathBuf>) -> Self {
        match data_dir {
            Some(dir) if !dir.as_os_str().is_empty() => self.with_data_dir(dir),
            _ => self,
        }
    }

    /// Resolved ratings document path
    #[must_use]
    pub fn ratings_path(&self) -> PathBuf {
        self.resolve(&self.ratings_file)
    }

    /// Resolved scenarios document path
    #[must_use]
    pub fn scenarios_path(&self) -> PathBuf {
        self.resolve(&self.scenarios_file)
    }

    /// Resolved surface cache document path
    #[must_use]
    pub fn surfaces_path(&self) -> PathBuf {
        self.resolve(&self.surfaces_file)
    }

    /// Template owner as an id
    #[must_use]
    pub fn template(&self) -> OwnerId {
        OwnerId::new(self.template_owner.clone())
    }

    fn resolve(&self, file: &Path) -> PathBuf {
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            self.data_dir.join(file)
        }
    }
}

impl Default for CobaltConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            ratings_file: PathBuf::from("credit_ratings.json"),
            scenarios_file: PathBuf::from("scenarios.json"),
            surfaces_file: PathBuf::from("scenario_surfaces.json"),
            template_owner: "1".to_string(),
        }
    }
}
