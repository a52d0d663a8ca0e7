//! Connection configuration
//!
//! Databases live under a fixed base location and are selected by name.
//! The base never changes after construction: every connection URI is
//! composed fresh from the base plus the database name.

use crate::error::TransferResult;
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_BASE_URI: &str = "file:./";
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;
pub const DATABASE_EXTENSION: &str = "db";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// SQLite URI prefix the database name is appended to
    pub base_uri: String,
    pub busy_timeout_ms: u64,
    /// Create the database file when it does not exist yet
    pub create_if_missing: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            base_uri: DEFAULT_BASE_URI.to_string(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            create_if_missing: false,
        }
    }
}

impl ConnectionConfig {
    /// Config rooted at a directory, e.g. a temp dir in tests.
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let mut base = dir.as_ref().to_string_lossy().replace('\\', "/");
        if !base.ends_with('/') {
            base.push('/');
        }
        Self {
            base_uri: format!("file:{}", base),
            ..Self::default()
        }
    }

    /// Load a YAML config file. Missing keys fall back to the defaults.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> TransferResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> TransferResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn with_base_uri(mut self, base_uri: impl Into<String>) -> Self {
        self.base_uri = base_uri.into();
        self
    }

    pub fn with_create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    /// Full URI for `database`. Pure: repeated calls return the same string.
    pub fn connection_uri(&self, database: &str) -> String {
        format!("{}{}.{}", self.base_uri, database, DATABASE_EXTENSION)
    }
}
