//! Parser configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$MAILSIFT_CONFIG` (environment variable)
//! 2. `~/.config/mailsift/config.toml` (Linux/macOS)
//!    `%APPDATA%\mailsift\config.toml` (Windows)
//! 3. Built-in defaults

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ParseError, Result};
use crate::parser::header::DEFAULT_CHARSET;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Message parsing settings.
    pub parser: ParserConfig,
}

/// Message parsing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Charset used for encoded-words whose declared charset is unknown.
    pub default_charset: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            default_charset: DEFAULT_CHARSET.to_string(),
        }
    }
}

// ── Load / save ─────────────────────────────────────────────────

/// Load configuration, searching standard locations.
///
/// Returns the default configuration if no file is found or on parse error.
pub fn load_config() -> Config {
    if let Some(path) = config_file_path() {
        if path.exists() {
            match load_config_from(&path) {
                Ok(cfg) => {
                    tracing::info!(path = %path.display(), "Loaded config");
                    return cfg;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to load config, using defaults");
                }
            }
        }
    }
    Config::default()
}

/// Load configuration from an explicit path.
pub fn load_config_from(path: &Path) -> Result<Config> {
    let contents = std::fs::read_to_string(path).map_err(|e| ParseError::config(path, e))?;
    toml::from_str(&contents).map_err(|e| ParseError::config(path, e))
}

/// Save configuration to `path`, creating parent directories as needed.
pub fn save_config(config: &Config, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    tracing::info!(path = %path.display(), "Saved config");
    Ok(())
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var("MAILSIFT_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    dirs::config_dir().map(|d| d.join("mailsift").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.parser.default_charset, "us-ascii");
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        let cfg = Config {
            parser: ParserConfig {
                default_charset: "iso-8859-1".to_string(),
            },
        };
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let parsed: Config = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let cfg: Config = toml::from_str("").expect("parse empty");
        assert_eq!(cfg, Config::default());
        let cfg: Config = toml::from_str("[parser]\n").expect("parse empty section");
        assert_eq!(cfg.parser.default_charset, "us-ascii");
    }

    #[test]
    fn test_save_and_load_from_path() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("config.toml");
        let cfg = Config {
            parser: ParserConfig {
                default_charset: "windows-1252".to_string(),
            },
        };
        save_config(&cfg, &path).unwrap();
        assert_eq!(load_config_from(&path).unwrap(), cfg);
    }

    #[test]
    fn test_load_invalid_file_is_config_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[parser]\ndefault_charset = 42\n").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, ParseError::Config { .. }));
    }

    // The only test that touches MAILSIFT_CONFIG, so it cannot race another.
    #[test]
    fn test_env_var_selects_config_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("custom.toml");
        std::env::set_var("MAILSIFT_CONFIG", &path);

        assert_eq!(config_file_path(), Some(path.clone()));
        // Missing file: defaults.
        assert_eq!(load_config(), Config::default());

        let cfg = Config {
            parser: ParserConfig {
                default_charset: "iso-8859-2".to_string(),
            },
        };
        save_config(&cfg, &path).unwrap();
        assert_eq!(load_config(), cfg);
        assert_eq!(
            crate::parser::mime::EmailParser::from_user_config().default_charset(),
            "iso-8859-2"
        );

        // Unparseable file: defaults again.
        std::fs::write(&path, "[parser\n").unwrap();
        assert_eq!(load_config(), Config::default());

        std::env::remove_var("MAILSIFT_CONFIG");
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = load_config_from(&tmp.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ParseError::Config { .. }));
    }
}
