use pmath_syntax::parser::DEFAULT_MAX_DEPTH;
use pmath_syntax::{ErrorMode, GroupOptions, ParseOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// What the command line tool prints for each parsed input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Show {
    #[default]
    Boxes,
    Spans,
    Tree,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Grammar nesting limit.
    pub max_depth: usize,
    /// Suppress diagnostics; only the exit status reports errors.
    pub quiet: bool,
    /// Drop whitespace and comments when building boxes.
    pub parseable: bool,
    pub show: Show,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            quiet: false,
            parseable: true,
            show: Show::default(),
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/pmath-syntax");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            max_depth: self.max_depth,
            error_mode: if self.quiet {
                ErrorMode::Quiet
            } else {
                ErrorMode::Report
            },
        }
    }

    pub fn group_options(&self) -> GroupOptions {
        GroupOptions {
            parseable: self.parseable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/pmath-syntax/config.toml"));
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let config: Config = toml::from_str("quiet = true\n").unwrap();

        assert_eq!(config, Config {
            quiet: true,
            ..Config::default()
        });
    }

    #[test]
    fn test_show_is_lowercase_in_toml() {
        let config: Config = toml::from_str("show = \"tree\"\n").unwrap();
        assert_eq!(config.show, Show::Tree);

        let toml_str = toml::to_string(&config).unwrap();
        assert!(toml_str.contains("show = \"tree\""), "{toml_str}");
    }

    #[test]
    fn test_converts_into_library_options() {
        let config = Config {
            max_depth: 12,
            quiet: true,
            parseable: false,
            show: Show::Spans,
        };

        assert_eq!(config.parse_options(), ParseOptions {
            max_depth: 12,
            error_mode: ErrorMode::Quiet,
        });
        assert_eq!(config.group_options(), GroupOptions { parseable: false });
        assert_eq!(Config::default().parse_options(), ParseOptions::default());
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = Config::load_from_path(&non_existent_config).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_load_invalid_toml_names_the_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "max_depth = \"deep\"").unwrap();

        let error = Config::load_from_path(&config_file).unwrap_err();

        assert!(matches!(error, ConfigError::ConfigParseError { .. }));
        assert!(error.to_string().contains("config.toml"));
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested/dir/config.toml");
        let test_config = Config {
            max_depth: 64,
            show: Show::Tree,
            ..Config::default()
        };

        test_config.save_to_path(&config_file).unwrap();
        let loaded_config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded_config, test_config);
    }
}
