//! Locating and layering `config.yaml` files.
//!
//! Built-in defaults are overlaid by the project file, then the user file,
//! then `TASKSCOPE_*` variables. An explicit file replaces both files.

use super::merge::deep_merge_all;
use super::types::Config;
use anyhow::{Context, Result};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name looked up inside each config directory.
pub const CONFIG_FILE: &str = "config.yaml";

/// A directory that may hold a config file, in merge order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigTier {
    /// `$CWD/taskscope`
    Project,
    /// `~/.taskscope`, wins over the project file
    User,
}

impl fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConfigTier::Project => "project",
            ConfigTier::User => "user",
        })
    }
}

/// Where the loader looks.
#[derive(Debug, Clone, Default)]
pub struct ConfigPaths {
    /// Single file used instead of the project and user tiers
    pub explicit: Option<PathBuf>,
    pub project_dir: Option<PathBuf>,
    pub user_dir: Option<PathBuf>,
}

impl ConfigPaths {
    /// Resolve directories from `TASKSCOPE_CONFIG_PATH`, `TASKSCOPE_PROJECT_DIR`
    /// and `TASKSCOPE_USER_DIR`, falling back to `./taskscope` and `~/.taskscope`.
    pub fn discover() -> Self {
        let env_path = |key: &str| std::env::var(key).ok().map(PathBuf::from);

        Self {
            explicit: env_path("TASKSCOPE_CONFIG_PATH"),
            project_dir: env_path("TASKSCOPE_PROJECT_DIR").or_else(|| Some(PathBuf::from("taskscope"))),
            user_dir: env_path("TASKSCOPE_USER_DIR")
                .or_else(|| dirs::home_dir().map(|home| home.join(".taskscope"))),
        }
    }

    pub fn with_dirs(project_dir: Option<PathBuf>, user_dir: Option<PathBuf>) -> Self {
        Self {
            explicit: None,
            project_dir,
            user_dir,
        }
    }

    pub fn with_explicit(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit = Some(path.into());
        self
    }

    fn file_for(&self, tier: ConfigTier) -> Option<PathBuf> {
        let dir = match tier {
            ConfigTier::Project => self.project_dir.as_ref(),
            ConfigTier::User => self.user_dir.as_ref(),
        };
        dir.map(|d| d.join(CONFIG_FILE))
    }
}

/// The merged configuration and the files it came from.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    pub paths: ConfigPaths,
    config: Config,
    sources: Vec<PathBuf>,
}

impl ConfigLoader {
    pub fn load_with_paths(paths: ConfigPaths) -> Result<Self> {
        let (mut config, sources) = match paths.explicit.clone() {
            Some(explicit) => (Config::load(&explicit)?, vec![explicit]),
            None => merge_tiers(&paths)?,
        };
        apply_env_overrides(&mut config, |key| std::env::var(key).ok());

        Ok(Self {
            paths,
            config,
            sources,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn into_config(self) -> Config {
        self.config
    }

    /// Files that were read, lowest priority first.
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }
}

fn merge_tiers(paths: &ConfigPaths) -> Result<(Config, Vec<PathBuf>)> {
    let mut layers = vec![serde_json::to_value(Config::default())?];
    let mut sources = Vec::new();

    for tier in [ConfigTier::Project, ConfigTier::User] {
        let Some(file) = paths.file_for(tier).filter(|f| f.exists()) else {
            continue;
        };
        match read_yaml(&file) {
            Ok(Value::Null) => {}
            Ok(layer) => {
                debug!(%tier, path = %file.display(), "config file merged");
                layers.push(layer);
                sources.push(file);
            }
            Err(e) => warn!(%tier, path = %file.display(), "skipping config file: {:#}", e),
        }
    }

    let config = serde_json::from_value(deep_merge_all(layers)).context("invalid merged configuration")?;
    Ok((config, sources))
}

fn read_yaml(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&content)?)
}

/// Apply `TASKSCOPE_DB_PATH`, `TASKSCOPE_DATE_FORMAT` and `TASKSCOPE_PER_PAGE`.
pub fn apply_env_overrides(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(db_path) = lookup("TASKSCOPE_DB_PATH") {
        config.database.path = PathBuf::from(db_path);
    }

    if let Some(format) = lookup("TASKSCOPE_DATE_FORMAT") {
        config.query.date_format = format;
    }

    if let Some(per_page) = lookup("TASKSCOPE_PER_PAGE") {
        match per_page.trim().parse::<usize>() {
            Ok(n) if n > 0 => config.query.per_page = n,
            _ => warn!(value = %per_page, "ignoring invalid TASKSCOPE_PER_PAGE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, yaml: &str) {
        std::fs::create_dir_all(dir).unwrap();
        std::fs::write(dir.join(CONFIG_FILE), yaml).unwrap();
    }

    #[test]
    fn missing_files_leave_defaults() {
        let temp = TempDir::new().unwrap();
        let loader = ConfigLoader::load_with_paths(ConfigPaths::with_dirs(
            Some(temp.path().join("nowhere")),
            None,
        ))
        .unwrap();

        assert_eq!(loader.config().query.per_page, 10);
        assert_eq!(loader.config().query.date_format, "%Y-%m-%d");
        assert!(loader.sources().is_empty());
    }

    #[test]
    fn user_file_wins_field_by_field() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("taskscope");
        let user = temp.path().join("home");
        write(&project, "query:\n  per_page: 25\n  date_format: \"%d/%m/%Y\"\n");
        write(&user, "query:\n  per_page: 50\n");

        let loader =
            ConfigLoader::load_with_paths(ConfigPaths::with_dirs(Some(project), Some(user))).unwrap();

        assert_eq!(loader.config().query.per_page, 50);
        assert_eq!(loader.config().query.date_format, "%d/%m/%Y");
        assert_eq!(loader.sources().len(), 2);
    }

    #[test]
    fn explicit_file_replaces_the_tiers() {
        let temp = TempDir::new().unwrap();
        let project = temp.path().join("taskscope");
        write(&project, "query:\n  per_page: 25\n");
        let explicit = temp.path().join("other.yaml");
        std::fs::write(&explicit, "database:\n  path: /tmp/elsewhere.db\n").unwrap();

        let paths = ConfigPaths::with_dirs(Some(project), None).with_explicit(&explicit);
        let config = ConfigLoader::load_with_paths(paths).unwrap().into_config();

        assert_eq!(config.query.per_page, 10);
        assert_eq!(config.database.path, PathBuf::from("/tmp/elsewhere.db"));
    }

    #[test]
    fn env_overrides_reject_zero_page_size() {
        let mut config = Config::default();
        apply_env_overrides(&mut config, |key| match key {
            "TASKSCOPE_DB_PATH" => Some("env.db".to_string()),
            "TASKSCOPE_PER_PAGE" => Some("0".to_string()),
            _ => None,
        });

        assert_eq!(config.database.path, PathBuf::from("env.db"));
        assert_eq!(config.query.per_page, 10);
    }
}
