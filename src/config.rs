//! Runtime settings for the `forge` tool.
//!
//! Settings come from built-in defaults, then an optional YAML file, then
//! `FORGE_*` environment variables, each layer overriding the last.

use crate::error::{ForgeError, Result};
use crate::experiment::{MAX_TEST_SIZE, MIN_TEST_SIZE};
use crate::preprocess::{DEFAULT_SPLIT_SEED, DEFAULT_TEST_FRACTION};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable names.
pub const ENV_DATA_PATH: &str = "FORGE_DATA_PATH";
pub const ENV_TEST_SIZE: &str = "FORGE_TEST_SIZE";
pub const ENV_SPLIT_SEED: &str = "FORGE_SPLIT_SEED";
pub const ENV_LOG_LEVEL: &str = "FORGE_LOG_LEVEL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding uploaded datasets and experiment artifacts.
    pub data_path: PathBuf,
    /// Test fraction used when a request does not give one.
    pub default_test_size: f64,
    pub split_seed: u64,
    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("./data"),
            default_test_size: DEFAULT_TEST_FRACTION,
            split_seed: DEFAULT_SPLIT_SEED,
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Parse settings from YAML. Missing keys keep their defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let settings: Self = serde_yaml::from_str(yaml)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Defaults, overlaid with the file at `path` if given, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(path) => Self::from_yaml(&std::fs::read_to_string(path)?)?,
            None => Self::default(),
        };
        settings.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    /// Apply overrides from a key lookup, normally the process environment.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_DATA_PATH) {
            self.data_path = PathBuf::from(path);
        }
        if let Some(raw) = lookup(ENV_TEST_SIZE) {
            self.default_test_size = parse_env(ENV_TEST_SIZE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_SPLIT_SEED) {
            self.split_seed = parse_env(ENV_SPLIT_SEED, &raw)?;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.log_level = level;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        if !(MIN_TEST_SIZE..=MAX_TEST_SIZE).contains(&self.default_test_size) {
            return Err(ForgeError::InvalidParameter(format!(
                "default_test_size must be between {} and {}, got {}",
                MIN_TEST_SIZE, MAX_TEST_SIZE, self.default_test_size
            )));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| ForgeError::InvalidParameter(format!("{}: cannot parse '{}'", key, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.default_test_size, 0.2);
        assert_eq!(s.split_seed, 42);
        assert_eq!(s.log_level, "info");
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let s = Settings::from_yaml("split_seed: 7\n").unwrap();
        assert_eq!(s.split_seed, 7);
        assert_eq!(s.default_test_size, 0.2);
        assert_eq!(s.data_path, PathBuf::from("./data"));
    }

    #[test]
    fn test_yaml_out_of_range_test_size() {
        assert!(Settings::from_yaml("default_test_size: 0.9\n").is_err());
    }

    #[test]
    fn test_yaml_round_trip() {
        let s = Settings {
            log_level: "debug".to_string(),
            ..Settings::default()
        };
        let parsed = Settings::from_yaml(&s.to_yaml().unwrap()).unwrap();
        assert_eq!(parsed, s);
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_DATA_PATH, "/srv/forge"),
            (ENV_TEST_SIZE, "0.3"),
            (ENV_SPLIT_SEED, "11"),
        ]
        .into_iter()
        .collect();

        let mut s = Settings::default();
        s.apply_overrides(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(s.data_path, PathBuf::from("/srv/forge"));
        assert_eq!(s.default_test_size, 0.3);
        assert_eq!(s.split_seed, 11);
        assert_eq!(s.log_level, "info");
    }

    #[test]
    fn test_bad_override() {
        let mut s = Settings::default();
        let err = s
            .apply_overrides(|k| (k == ENV_SPLIT_SEED).then(|| "abc".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_SPLIT_SEED));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "log_level: warn").unwrap();
        writeln!(file, "default_test_size: 0.25").unwrap();

        let s = Settings::from_yaml(&std::fs::read_to_string(file.path()).unwrap()).unwrap();
        assert_eq!(s.log_level, "warn");
        assert_eq!(s.default_test_size, 0.25);
    }
}
