//! Pipeline configuration files
//!
//! A configuration holds either an inline script or a list of already
//! compiled operation descriptors:
//!
//! ```toml
//! script = '''
//! split($.data, separator="|")
//! print()
//! '''
//! ```
//!
//! ```json
//! {"transforms": [{"type": "split_string", "source": "$.data", "settings": {"separator": "|"}}]}
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::script::{self, SyntaxError};
use crate::types::OperationDescriptor;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("configuration script does not compile: {0}")]
    Script(#[from] SyntaxError),
    #[error("configuration defines neither 'script' nor 'transforms'")]
    Empty,
    #[error("configuration defines both 'script' and 'transforms'")]
    Ambiguous,
}

/// A pipeline definition loaded from a file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Inline script text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    /// Pre-compiled operations
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transforms: Vec<OperationDescriptor>,
}

impl Config {
    /// Load a configuration, choosing the format by file extension
    ///
    /// `.toml` files are parsed as TOML; everything else as JSON.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        let config = if is_toml {
            Self::from_toml(&text)?
        } else {
            Self::from_json(&text)?
        };

        log::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// The operation list this configuration describes
    pub fn descriptors(&self) -> Result<Vec<OperationDescriptor>, ConfigError> {
        match (&self.script, self.transforms.is_empty()) {
            (Some(_), false) => Err(ConfigError::Ambiguous),
            (Some(text), true) => Ok(script::compile(text)?),
            (None, false) => Ok(self.transforms.clone()),
            (None, true) => Err(ConfigError::Empty),
        }
    }
}
