/// Configuration module for codenotes.
///
/// Handles loading, validating, and providing default configuration values.
use std::net::SocketAddr;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::annotator::Verbosity;
use crate::languages::{Language, UnsupportedLanguage};

pub const DEFAULT_CONFIG_PATH: &str = "codenotes.json";

// ── Default value functions ──────────────────────────────────────────

fn default_listen_addr() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_max_input_bytes() -> usize {
    256 * 1024
}

fn default_enabled_languages() -> Vec<String> {
    Language::all().iter().map(|l| l.name().to_string()).collect()
}

// ── Config structs ───────────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// Address the HTTP server binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Requests with more code than this are rejected before any work.
    #[serde(default = "default_max_input_bytes")]
    pub max_input_bytes: usize,

    #[serde(default = "default_enabled_languages")]
    pub enabled_languages: Vec<String>,

    #[serde(default)]
    pub annotation: AnnotationConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AnnotationConfig {
    #[serde(default)]
    pub verbosity: Verbosity,
}

// ── Default impls ────────────────────────────────────────────────────

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            max_input_bytes: default_max_input_bytes(),
            enabled_languages: default_enabled_languages(),
            annotation: AnnotationConfig::default(),
        }
    }
}

// ── Config implementation ────────────────────────────────────────────

impl Config {
    /// Load configuration from a JSON file.
    ///
    /// If `config_path` is empty, defaults to `"codenotes.json"`.
    /// If the file does not exist, returns a default config and generates a
    /// template file at the default path.
    pub fn load(config_path: &str) -> Result<Self> {
        let path = if config_path.is_empty() {
            DEFAULT_CONFIG_PATH
        } else {
            config_path
        };

        if !Path::new(path).exists() {
            info!("{path} not found, using defaults");
            let cfg = Self::default();

            // Generate template only for the default path
            if path == DEFAULT_CONFIG_PATH {
                match cfg.save(path) {
                    Ok(()) => info!("Generated config template: {path}"),
                    Err(e) => warn!("Failed to generate config template: {e}"),
                }
            }

            return Ok(cfg);
        }

        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {path}"))?;

        let mut cfg: Config = match serde_json::from_str(&data) {
            Ok(c) => c,
            Err(e) => {
                warn!("Invalid JSON in {path}: {e}");
                warn!("Using default configuration");
                return Ok(Self::default());
            }
        };

        info!("Loaded configuration from {path}");

        if cfg.enabled_languages.is_empty() {
            warn!("enabled_languages is empty, enabling all languages");
            cfg.enabled_languages = default_enabled_languages();
        }

        Ok(cfg)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &str) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("failed to marshal config")?;
        std::fs::write(path, data).with_context(|| format!("failed to write config: {path}"))?;
        Ok(())
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.max_input_bytes > 0, "max_input_bytes must be positive");
        anyhow::ensure!(
            !self.enabled_languages.is_empty(),
            "at least one language must be enabled"
        );
        for name in &self.enabled_languages {
            name.parse::<Language>()
                .with_context(|| format!("enabled_languages contains {name:?}"))?;
        }
        self.socket_addr()?;
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.listen_addr
            .parse()
            .with_context(|| format!("invalid listen_addr: {}", self.listen_addr))
    }

    /// Languages switched on in this configuration, in declaration order.
    #[must_use]
    pub fn languages(&self) -> Vec<Language> {
        Language::all()
            .into_iter()
            .filter(|lang| {
                self.enabled_languages
                    .iter()
                    .any(|name| name.parse::<Language>().is_ok_and(|parsed| parsed == *lang))
            })
            .collect()
    }

    /// Parse a requested language name; a known language that is switched
    /// off is reported the same way as an unknown one.
    pub fn resolve_language(&self, name: &str) -> Result<Language, UnsupportedLanguage> {
        let language: Language = name.parse()?;
        if self.languages().contains(&language) {
            Ok(language)
        } else {
            Err(UnsupportedLanguage(name.to_string()))
        }
    }

    #[must_use]
    pub fn input_within_limit(&self, code: &str) -> bool {
        code.len() <= self.max_input_bytes
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.listen_addr, "127.0.0.1:5000");
        assert_eq!(config.max_input_bytes, 262_144);
        assert_eq!(config.enabled_languages, vec!["python", "javascript", "c"]);
        assert_eq!(config.annotation.verbosity, Verbosity::Structural);
    }

    #[test]
    fn test_load_from_json() {
        let json = r#"{"max_input_bytes": 1024, "annotation": {"verbosity": "detailed"}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.max_input_bytes, 1024);
        assert_eq!(config.annotation.verbosity, Verbosity::Detailed);
        // Other fields should have defaults
        assert_eq!(config.listen_addr, "127.0.0.1:5000");
        assert_eq!(config.languages().len(), 3);
    }

    #[test]
    fn test_validate_ok() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_bad_values() {
        let mut config = Config::default();
        config.max_input_bytes = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.enabled_languages = vec!["cobol".to_string()];
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.listen_addr = "not an address".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolve_language_respects_enabled_list() {
        let mut config = Config::default();
        config.enabled_languages = vec!["py".to_string()];
        assert_eq!(config.resolve_language("Python"), Ok(Language::Python));
        assert!(config.resolve_language("javascript").is_err());
        assert!(config.resolve_language("rust").is_err());
    }

    #[test]
    fn test_input_limit() {
        let mut config = Config::default();
        config.max_input_bytes = 4;
        assert!(config.input_within_limit("abcd"));
        assert!(!config.input_within_limit("abcde"));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("codenotes.json");
        let path = path.to_str().unwrap();

        let mut config = Config::default();
        config.listen_addr = "0.0.0.0:8080".to_string();
        config.annotation.verbosity = Verbosity::Detailed;
        config.save(path).unwrap();

        let loaded = Config::load(path).unwrap();
        assert_eq!(loaded.listen_addr, "0.0.0.0:8080");
        assert_eq!(loaded.annotation.verbosity, Verbosity::Detailed);
    }

    #[test]
    fn test_missing_custom_path_uses_defaults_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let config = Config::load(path.to_str().unwrap()).unwrap();
        assert_eq!(config.max_input_bytes, 262_144);
        assert!(!path.exists());
    }
}
