//! errside_options: errside.json parsing and render options.
//!
//! The configuration file holds the same settings as the command line, all
//! optional. Settings are layered: command-line flags over the file over the
//! defaults of [`RenderConfig`].

pub use errside_printer::RenderConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The name looked up in the working directory when no file is given.
pub const CONFIG_FILE_NAME: &str = "errside.json";

/// Render settings, each of which may be left unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOptions {
    pub column: Option<usize>,
    pub tab_width: Option<usize>,
    pub use_spaces: Option<bool>,
}

impl RenderOptions {
    /// Layer `overrides` on top of `self`.
    pub fn merge(self, overrides: RenderOptions) -> RenderOptions {
        RenderOptions {
            column: overrides.column.or(self.column),
            tab_width: overrides.tab_width.or(self.tab_width),
            use_spaces: overrides.use_spaces.or(self.use_spaces),
        }
    }

    /// Fill in defaults and validate.
    pub fn resolve(&self) -> Result<RenderConfig, ConfigError> {
        let defaults = RenderConfig::default();
        let config = RenderConfig {
            column: self.column.unwrap_or(defaults.column),
            tab_width: self.tab_width.unwrap_or(defaults.tab_width),
            use_spaces: self.use_spaces.unwrap_or(defaults.use_spaces),
        };
        if config.column == 0 {
            return Err(ConfigError::Invalid { field: "column" });
        }
        if config.tab_width == 0 {
            return Err(ConfigError::Invalid { field: "tabWidth" });
        }
        Ok(config)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{field} must be greater than 0")]
    Invalid { field: &'static str },
}

/// Parse an errside.json file from a string.
pub fn parse_config(content: &str) -> Result<RenderOptions, serde_json::Error> {
    serde_json::from_str(content)
}

/// Parse an errside.json file from a path.
pub fn parse_config_file(path: &Path) -> Result<RenderOptions, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let options = parse_config(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), ?options, "loaded configuration");
    Ok(options)
}

/// The configuration file of `dir`, if there is one.
pub fn find_config_file(dir: &Path) -> Option<PathBuf> {
    let path = dir.join(CONFIG_FILE_NAME);
    path.is_file().then_some(path)
}
