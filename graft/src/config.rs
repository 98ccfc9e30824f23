//! Container defaults loaded from the environment
//!
//! | variable                 | field              | default     |
//! |--------------------------|--------------------|-------------|
//! | `GRAFT_DEFAULT_LIFETIME` | `default_lifetime` | `transient` |
//! | `GRAFT_ALLOW_OVERWRITE`  | `allow_overwrite`  | `true`      |
//!
//! ```rust,ignore
//! use graft::{ContainerConfig, DefinitionContainer, FromEnv};
//!
//! let config = ContainerConfig::load_from_env()?;
//! let container = DefinitionContainer::with_config(config);
//!
//! // Or from a dotenv file
//! let config = ContainerConfig::from_file(".env.test")?;
//! ```

use std::env::{self, VarError};
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::lifetime::Lifetime;

pub const DEFAULT_LIFETIME_VAR: &str = "GRAFT_DEFAULT_LIFETIME";
pub const ALLOW_OVERWRITE_VAR: &str = "GRAFT_ALLOW_OVERWRITE";

/// Trait for loading configuration from environment
pub trait FromEnv: Sized {
    fn load_from_env() -> Result<Self, ConfigError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerConfig {
    /// Lifetime used by `add` when the caller does not pick one.
    pub default_lifetime: Lifetime,
    /// Whether registering an existing identifier replaces its definition.
    pub allow_overwrite: bool,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            default_lifetime: Lifetime::Transient,
            allow_overwrite: true,
        }
    }
}

impl ContainerConfig {
    #[must_use]
    pub fn with_default_lifetime(mut self, lifetime: Lifetime) -> Self {
        self.default_lifetime = lifetime;
        self
    }

    #[must_use]
    pub fn with_allow_overwrite(mut self, allow: bool) -> Self {
        self.allow_overwrite = allow;
        self
    }

    /// Load a .env file into the process environment, then read it
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        dotenv::from_path(path.into())?;
        Self::load_from_env()
    }
}

impl FromEnv for ContainerConfig {
    fn load_from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            default_lifetime: read_var(DEFAULT_LIFETIME_VAR, defaults.default_lifetime, |raw| {
                raw.parse::<Lifetime>()
            })?,
            allow_overwrite: read_var(ALLOW_OVERWRITE_VAR, defaults.allow_overwrite, parse_flag)?,
        })
    }
}

// If the variable is set it must parse; if it is not set the default applies
fn read_var<T, E, F>(key: &str, default: T, parse: F) -> Result<T, ConfigError>
where
    F: FnOnce(&str) -> Result<T, E>,
    E: std::fmt::Display,
{
    let parse_error = |message: String| ConfigError::ParseError {
        key: key.to_string(),
        message,
    };
    match env::var(key) {
        Ok(raw) => parse(&raw).map_err(|e| parse_error(e.to_string())),
        Err(VarError::NotPresent) => Ok(default),
        Err(VarError::NotUnicode(raw)) => Err(parse_error(format!(
            "value is not valid UTF-8: {}",
            raw.to_string_lossy()
        ))),
    }
}

fn parse_flag(raw: &str) -> Result<bool, String> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(format!("expected a boolean flag, got '{}'", raw.trim())),
    }
}
