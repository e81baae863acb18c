//! Configuration
//!
//! Layered in order: built-in defaults, an optional JSON file, environment
//! variables. Command-line flags are applied last in `main`.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::Level;

use crate::error::{Result, TarotError};

const DEFAULT_CONFIG_FILE: &str = "tarot.json";
const API_KEY_PLACEHOLDER: &str = "REPLACE_THIS_WITH_YOUR_GROQ_API_KEY";

/// Hosted model settings.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub max_tokens: u32,
    /// How "creative" the readings are.
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.groq.com/openai/v1/chat/completions".to_string(),
            model: "llama-3.1-70b-versatile".to_string(),
            api_key: None,
            max_tokens: 5000,
            temperature: 0.6,
            timeout_secs: 120,
        }
    }
}

impl OracleConfig {
    /// The API key, unless it is missing or still the placeholder.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && *key != API_KEY_PLACEHOLDER)
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Card dataset; images and `back.gif` are resolved next to it.
    pub deck: PathBuf,
    pub log_level: String,
    pub oracle: OracleConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            deck: PathBuf::from("assets/deck.json"),
            log_level: "info".to_string(),
            oracle: OracleConfig::default(),
        }
    }
}

impl Config {
    /// Load from `path`, `$TAROT_CONFIG`, or `./tarot.json`. Only an
    /// explicitly named file has to exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let explicit = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os("TAROT_CONFIG").map(PathBuf::from));

        let mut config = match explicit {
            Some(path) => Self::from_file(&path)?,
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|source| TarotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| TarotError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Override fields from environment variables.
    pub fn apply_env<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = var("GROQ_API_KEY") {
            self.oracle.api_key = Some(key);
        }
        if let Some(model) = var("TAROT_MODEL") {
            self.oracle.model = model;
        }
        if let Some(endpoint) = var("TAROT_ENDPOINT") {
            self.oracle.endpoint = endpoint;
        }
        if let Some(deck) = var("TAROT_DECK") {
            self.deck = PathBuf::from(deck);
        }
        if let Some(level) = var("TAROT_LOG") {
            self.log_level = level;
        }
    }

    /// Logging level, falling back to INFO on unknown names.
    pub fn level(&self) -> Level {
        self.log_level.parse().unwrap_or(Level::INFO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_point_at_groq() {
        let config = Config::default();
        assert_eq!(config.oracle.model, "llama-3.1-70b-versatile");
        assert_eq!(config.oracle.max_tokens, 5000);
        assert_eq!(config.oracle.api_key(), None);
        assert_eq!(config.level(), Level::INFO);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"oracle": {"temperature": 0.9}, "log_level": "debug"}"#).unwrap();
        assert_eq!(config.oracle.temperature, 0.9);
        assert_eq!(config.oracle.max_tokens, 5000);
        assert_eq!(config.deck, PathBuf::from("assets/deck.json"));
        assert_eq!(config.level(), Level::DEBUG);
    }

    #[test]
    fn environment_overrides_file() {
        let env: HashMap<&str, &str> = [
            ("GROQ_API_KEY", "gsk_live"),
            ("TAROT_DECK", "/srv/deck.json"),
            ("TAROT_LOG", "warn"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.oracle.api_key(), Some("gsk_live"));
        assert_eq!(config.deck, PathBuf::from("/srv/deck.json"));
        assert_eq!(config.level(), Level::WARN);
    }

    #[test]
    fn placeholder_key_disables_the_oracle() {
        let mut oracle = OracleConfig::default();
        oracle.api_key = Some(API_KEY_PLACEHOLDER.to_string());
        assert_eq!(oracle.api_key(), None);

        oracle.api_key = Some("   ".to_string());
        assert_eq!(oracle.api_key(), None);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let path = std::env::temp_dir().join("tarot-no-such-config.json");
        assert!(matches!(Config::from_file(&path), Err(TarotError::Io { .. })));
    }
}
