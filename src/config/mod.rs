//! Configuration management for groupfeed.
//!
//! Configuration is read from `~/.config/groupfeed/config.toml` (or the path
//! given with `--config`). If the default file doesn't exist, one with
//! comments is created. Command-line flags override file values.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::capture::parallel::DEFAULT_WORKERS;
use crate::normalizer::QueryMarkers;

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scrape: ScrapeConfig,
    pub markers: QueryMarkers,
}

/// Limits and defaults for one scrape session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// Stop offering posts once this many are stored (0 = no limit).
    pub max_posts: usize,
    /// Default CSV path for `export`.
    pub output: PathBuf,
    /// Capture files read concurrently.
    pub workers: usize,
    /// Fall back to searching the whole payload when a field's paths miss.
    pub deep_search: bool,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            max_posts: 40,
            output: PathBuf::from("posts_comments.csv"),
            workers: DEFAULT_WORKERS,
            deep_search: true,
        }
    }
}

impl ScrapeConfig {
    pub fn cap(&self) -> Option<usize> {
        (self.max_posts > 0).then_some(self.max_posts)
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// Missing fields in the config file use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit path, which must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/groupfeed/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("groupfeed").join("config.toml"))
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        tracing::info!(path = %path.display(), "created default config");
        Ok(())
    }

    fn default_config_content() -> &'static str {
        r##"# groupfeed configuration

[scrape]
# Stop storing posts after this many (0 = no limit)
max_posts = 40

# Default CSV file written by `groupfeed export`
output = "posts_comments.csv"

# Capture files read in parallel
workers = 4

# Search the whole payload for a field when its known paths are missing.
# Recovers from layout changes but can pick up an unrelated field with the
# same name.
deep_search = true

[markers]
# Query names looked for in intercepted request bodies
feed = ["GroupsCometFeedRegularStoriesPaginationQuery", "FeedQuery"]
focused_comments = ["CometFocusedStoryViewUFIQuery"]
"##
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_deserializes() {
        let config: Config =
            toml::from_str(Config::default_config_content()).expect("Default config should be valid TOML");

        assert_eq!(config.scrape, ScrapeConfig::default());
        assert_eq!(config.markers, QueryMarkers::default());
    }

    #[test]
    fn test_partial_config() {
        let content = r##"
[scrape]
max_posts = 0
"##;
        let config: Config = toml::from_str(content).expect("Partial config should work");

        assert_eq!(config.scrape.max_posts, 0);
        assert_eq!(config.scrape.cap(), None);
        assert_eq!(config.scrape.workers, DEFAULT_WORKERS);
        assert_eq!(config.markers, QueryMarkers::default());
    }

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").expect("Empty config should work");
        assert_eq!(config.scrape.cap(), Some(40));
        assert!(config.scrape.deep_search);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[markers]\nfeed = [\"OtherFeedQuery\"]\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.markers.feed, vec!["OtherFeedQuery"]);
        assert_eq!(
            config.markers.focused_comments,
            QueryMarkers::default().focused_comments
        );
    }

    #[test]
    fn test_invalid_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[scrape]\nmax_posts = \"lots\"\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("config.toml"));
    }
}
