//! Configuration file loading

use super::schema::ConfigSchema;
use crate::error::{Error, ErrorCode, Result};
use std::path::{Path, PathBuf};

/// Configuration wrapper
#[derive(Debug, Clone)]
pub struct Config {
    pub schema: ConfigSchema,
    pub path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from an explicit path, a discovered file, or defaults.
    ///
    /// An explicit path that does not exist is an error; discovery that finds
    /// nothing falls back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) if !p.exists() => return Err(Error::config_not_found(p)),
            Some(p) => Some(p.to_path_buf()),
            None => find_config_file(Path::new(".")),
        };

        let schema = match config_path {
            Some(ref p) => load_config_file(p)?,
            None => ConfigSchema::default(),
        };

        Ok(Self {
            schema,
            path: config_path,
        })
    }

    /// Load with defaults only (no file)
    pub fn default() -> Self {
        Self {
            schema: ConfigSchema::default(),
            path: None,
        }
    }
}

/// Find configuration file in standard locations
fn find_config_file(root: &Path) -> Option<PathBuf> {
    let candidates = [".pinmap.toml", "pinmap.toml", ".config/pinmap.toml"];

    candidates
        .iter()
        .map(|candidate| root.join(candidate))
        .find(|path| path.exists())
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &Path) -> Result<ConfigSchema> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;

    let schema: ConfigSchema = toml::from_str(&content).map_err(|e| {
        Error::new(
            ErrorCode::ConfigParseError,
            format!("Failed to parse config file {}: {}", path.display(), e),
        )
    })?;

    validate(&schema).map_err(|e| e.with_context(format!("In {}", path.display())))?;
    Ok(schema)
}

fn validate(schema: &ConfigSchema) -> Result<()> {
    if schema.storage.key.is_empty() {
        return Err(Error::new(ErrorCode::InvalidConfigValue, "storage.key must not be empty"));
    }
    if !schema.map.center.is_valid() {
        return Err(Error::new(ErrorCode::InvalidConfigValue, "map.center is out of range"));
    }
    if let Some(position) = schema.geolocation.position {
        if !position.is_valid() {
            return Err(Error::new(
                ErrorCode::InvalidConfigValue,
                "geolocation.position is out of range",
            ));
        }
    }
    Ok(())
}
