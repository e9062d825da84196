use std::{env, path::{Path, PathBuf}};

use tracing::{error, info};

use crate::logger::LogConfig;

pub const LOG_LEVEL_VAR: &str = "DIALOG_GRAPH_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "DIALOG_GRAPH_LOG_DIR";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Process-level settings, read from the environment (optionally seeded from
/// a `.env` file).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

/// What happened to the `.env` file during [`RuntimeConfig::load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvFile {
    None,
    Loaded(PathBuf),
    Missing(PathBuf),
    Invalid(PathBuf, String),
}

impl EnvFile {
    pub fn log(&self) {
        match self {
            EnvFile::None => {}
            EnvFile::Loaded(path) => info!("Loaded .env from {}", path.display()),
            EnvFile::Missing(path) => error!("could not load .env from {}", path.display()),
            EnvFile::Invalid(path, e) => error!("could not parse .env {}: {e}", path.display()),
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_dir: None,
        }
    }
}

impl RuntimeConfig {
    /// Load `env_file` into the environment if it exists, then read the config.
    ///
    /// Nothing is logged here since this runs before tracing is installed;
    /// call [`EnvFile::log`] once it is.
    pub fn load(env_file: Option<&Path>) -> (Self, EnvFile) {
        let env_file = match env_file {
            Some(path) if path.exists() => match dotenvy::from_path(path) {
                Ok(()) => EnvFile::Loaded(path.to_path_buf()),
                Err(e) => EnvFile::Invalid(path.to_path_buf(), e.to_string()),
            },
            Some(path) => EnvFile::Missing(path.to_path_buf()),
            None => match dotenvy::dotenv() {
                Ok(path) => EnvFile::Loaded(path),
                Err(_) => EnvFile::None,
            },
        };
        (Self::from_lookup(|key| env::var(key).ok()), env_file)
    }

    /// Build the config from any key → value source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            log_level: get(LOG_LEVEL_VAR).unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            log_dir: get(LOG_DIR_VAR).map(PathBuf::from),
        }
    }

    pub fn with_log_level(mut self, log_level: Option<String>) -> Self {
        if let Some(level) = log_level {
            self.log_level = level;
        }
        self
    }

    pub fn log_config(&self) -> LogConfig {
        LogConfig::new(self.log_level.clone(), self.log_dir.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let cfg = RuntimeConfig::from_lookup(lookup(&[]));
        assert_eq!(cfg, RuntimeConfig::default());
        assert_eq!(cfg.log_level, "info");
        assert!(cfg.log_dir.is_none());
    }

    #[test]
    fn test_values_from_lookup() {
        let cfg = RuntimeConfig::from_lookup(lookup(&[
            (LOG_LEVEL_VAR, "debug"),
            (LOG_DIR_VAR, "/tmp/dialog-logs"),
        ]));
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.log_dir, Some(PathBuf::from("/tmp/dialog-logs")));
    }

    #[test]
    fn test_blank_values_ignored() {
        let cfg = RuntimeConfig::from_lookup(lookup(&[(LOG_LEVEL_VAR, "  "), (LOG_DIR_VAR, "")]));
        assert_eq!(cfg, RuntimeConfig::default());
    }

    #[test]
    fn test_cli_override() {
        let cfg = RuntimeConfig::default().with_log_level(Some("trace".into()));
        assert_eq!(cfg.log_level, "trace");
        let cfg = cfg.with_log_level(None);
        assert_eq!(cfg.log_level, "trace");
    }

    #[test]
    fn test_load_reads_env_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "{LOG_DIR_VAR}=/var/log/dialog-graph-test").unwrap();

        let (cfg, env_file) = RuntimeConfig::load(Some(&path));
        assert_eq!(cfg.log_dir, Some(PathBuf::from("/var/log/dialog-graph-test")));
        assert_eq!(env_file, EnvFile::Loaded(path));
    }

    #[test]
    fn test_load_reports_missing_env_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.env");

        let (_, env_file) = RuntimeConfig::load(Some(&path));
        assert_eq!(env_file, EnvFile::Missing(path));
    }
}
