use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::engine::{PoolFilter, TypeFilter};
use crate::question::{ALL_CATEGORIES, AnswerFormat, Category};
use crate::session::turn::TurnSettings;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_chars_per_second")]
    pub chars_per_second: f64,
    #[serde(default = "default_buzz_window_secs")]
    pub buzz_window_secs: u32,
    #[serde(default = "default_history_cap")]
    pub history_cap: usize,
    #[serde(default = "default_categories")]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub question_type: TypeFilter,
    /// Empty means every answer format.
    #[serde(default)]
    pub formats: Vec<AnswerFormat>,
    /// JSON question bank; the bundled sample bank is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub questions_file: Option<PathBuf>,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_chars_per_second() -> f64 {
    20.0
}
fn default_buzz_window_secs() -> u32 {
    5
}
fn default_history_cap() -> usize {
    100
}
fn default_categories() -> Vec<Category> {
    ALL_CATEGORIES.to_vec()
}
fn default_theme() -> String {
    "terminal-default".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chars_per_second: default_chars_per_second(),
            buzz_window_secs: default_buzz_window_secs(),
            history_cap: default_history_cap(),
            categories: default_categories(),
            question_type: TypeFilter::default(),
            formats: Vec::new(),
            questions_file: None,
            theme: default_theme(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate();
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Write only the practice filters back to the config file, leaving
    /// every other stored field as it was on disk.
    pub fn save_filters(&self) -> Result<()> {
        self.save_filters_to(&Self::config_path())
    }

    pub fn save_filters_to(&self, path: &Path) -> Result<()> {
        let mut stored = Self::load_from(path)?;
        stored.categories = self.categories.clone();
        stored.question_type = self.question_type;
        stored.formats = self.formats.clone();
        stored.save_to(path)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("buzzread")
            .join("config.toml")
    }

    /// Clamp numeric fields into usable ranges and drop duplicate filters.
    pub fn validate(&mut self) {
        if !self.chars_per_second.is_finite() {
            self.chars_per_second = default_chars_per_second();
        }
        self.chars_per_second = self.chars_per_second.clamp(1.0, 200.0);
        self.buzz_window_secs = self.buzz_window_secs.clamp(1, 60);
        self.history_cap = self.history_cap.clamp(1, 1000);
        self.categories.sort();
        self.categories.dedup();
        self.formats.sort();
        self.formats.dedup();
        if self.log_level.trim().is_empty() {
            self.log_level = default_log_level();
        }
    }

    pub fn pool_filter(&self) -> PoolFilter {
        PoolFilter {
            categories: self.categories.clone(),
            question_type: self.question_type,
            formats: self.formats.clone(),
        }
    }

    pub fn turn_settings(&self) -> TurnSettings {
        TurnSettings {
            chars_per_second: self.chars_per_second,
            buzz_window_secs: self.buzz_window_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serde_defaults_from_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.chars_per_second, 20.0);
        assert_eq!(config.buzz_window_secs, 5);
        assert_eq!(config.history_cap, 100);
        assert_eq!(config.categories.len(), 7);
        assert_eq!(config.question_type, TypeFilter::All);
        assert!(config.formats.is_empty());
        assert!(config.questions_file.is_none());
    }

    #[test]
    fn test_config_partial_fields() {
        let toml_str = r#"
chars_per_second = 35.0
categories = ["Physics", "ESS"]
question_type = "bonus"
formats = ["rank", "identify_all"]
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.chars_per_second, 35.0);
        assert_eq!(config.categories, vec![Category::Physics, Category::EarthSpace]);
        assert_eq!(config.question_type, TypeFilter::Bonus);
        assert_eq!(config.buzz_window_secs, 5);

        let filter = config.pool_filter();
        assert_eq!(filter.formats, vec![AnswerFormat::Rank, AnswerFormat::IdentifyAll]);
    }

    #[test]
    fn test_validate_clamps() {
        let mut config = Config {
            chars_per_second: 0.0,
            buzz_window_secs: 0,
            history_cap: 50_000,
            categories: vec![Category::Math, Category::Math],
            ..Config::default()
        };
        config.validate();
        assert_eq!(config.chars_per_second, 1.0);
        assert_eq!(config.buzz_window_secs, 1);
        assert_eq!(config.history_cap, 1000);
        assert_eq!(config.categories, vec![Category::Math]);

        config.chars_per_second = f64::NAN;
        config.validate();
        assert_eq!(config.chars_per_second, 20.0);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config {
            chars_per_second: 12.5,
            questions_file: Some(PathBuf::from("/tmp/bank.json")),
            ..Config::default()
        };
        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_save_filters_keeps_stored_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let stored = Config {
            chars_per_second: 30.0,
            ..Config::default()
        };
        stored.save_to(&path).unwrap();

        let session = Config {
            chars_per_second: 90.0,
            buzz_window_secs: 12,
            questions_file: Some(PathBuf::from("/tmp/once.json")),
            theme: "gruvbox-dark".to_string(),
            categories: vec![Category::Biology],
            question_type: TypeFilter::Tossup,
            formats: vec![AnswerFormat::Rank],
            ..Config::default()
        };
        session.save_filters_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.categories, vec![Category::Biology]);
        assert_eq!(loaded.question_type, TypeFilter::Tossup);
        assert_eq!(loaded.formats, vec![AnswerFormat::Rank]);
        assert_eq!(loaded.chars_per_second, 30.0);
        assert_eq!(loaded.buzz_window_secs, 5);
        assert!(loaded.questions_file.is_none());
        assert_eq!(loaded.theme, Config::default().theme);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "chars_per_second = \"fast\"").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
