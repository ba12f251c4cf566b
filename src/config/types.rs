//! Configuration types and structures.

use crate::query::filter::DEFAULT_DATE_FORMAT;
use crate::query::paginate::DEFAULT_PER_PAGE;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default database file, relative to the working directory.
pub const DEFAULT_DB_PATH: &str = "taskscope/tasks.db";

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub query: QueryConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite file (default: taskscope/tasks.db).
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from(DEFAULT_DB_PATH)
}

/// Retrieval defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Date format used when the request context has none (default: %Y-%m-%d).
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Page size when the request has none (default: 10).
    #[serde(default = "default_per_page")]
    pub per_page: usize,

    /// Upper bound on requested page sizes. Unbounded when absent.
    #[serde(default)]
    pub max_per_page: Option<usize>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            date_format: default_date_format(),
            per_page: default_per_page(),
            max_per_page: None,
        }
    }
}

fn default_date_format() -> String {
    DEFAULT_DATE_FORMAT.to_string()
}

fn default_per_page() -> usize {
    DEFAULT_PER_PAGE
}

impl Config {
    /// Load a single configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        // Empty or comment-only files parse as null
        let config: Option<Config> = serde_yaml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_fills_defaults() {
        let config: Config = serde_yaml::from_str("query:\n  per_page: 25\n").unwrap();
        assert_eq!(config.query.per_page, 25);
        assert_eq!(config.query.date_format, "%Y-%m-%d");
        assert_eq!(config.database.path, PathBuf::from(DEFAULT_DB_PATH));
    }

    #[test]
    fn empty_file_loads_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "# nothing here\n").unwrap();
        assert_eq!(Config::load(&path).unwrap(), Config::default());
    }
}
