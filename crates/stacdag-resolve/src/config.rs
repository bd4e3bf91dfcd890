use std::path::Path;

use serde::{Deserialize, Serialize};
use stacdag_codec::DEFAULT_MAX_BLOCK_SIZE;

/// Errors from loading a [`ResolverConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: `{0}` must be greater than zero")]
    Zero(&'static str),
}

/// Configuration for catalog resolution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverConfig {
    /// Subdirectories resolved at the same time, per directory.
    pub max_concurrent_directories: usize,
    /// Documents of one wave addressed at the same time.
    pub max_concurrent_documents: usize,
    /// Extension (without the dot) of the files treated as documents.
    pub document_extension: String,
    /// Largest encoded block accepted, in bytes. `0` disables the limit.
    pub max_block_size: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_concurrent_directories: 8,
            max_concurrent_documents: 16,
            document_extension: "json".into(),
            max_block_size: DEFAULT_MAX_BLOCK_SIZE,
        }
    }
}

impl ResolverConfig {
    /// Parse a TOML document. Missing keys take their default.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    /// Reject settings that would stall the traversal.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_concurrent_directories == 0 {
            return Err(ConfigError::Zero("max_concurrent_directories"));
        }
        if self.max_concurrent_documents == 0 {
            return Err(ConfigError::Zero("max_concurrent_documents"));
        }
        Ok(())
    }

    /// Whether a file name denotes a document.
    pub fn is_document(&self, name: &str) -> bool {
        Path::new(name)
            .extension()
            .is_some_and(|ext| ext == self.document_extension.as_str())
    }
}
