//! Studio configuration
//!
//! Loaded from TOML; every field has a default so an empty file is valid.
//!
//! ```toml
//! author = "alice"
//!
//! [cache]
//! dir = "/var/lib/chatbot-studio"
//! key = "chatbots"
//!
//! [remote]
//! base_url = "https://api.example.com"
//! timeout_secs = 10
//!
//! [embed]
//! origin = "https://bots.example.com"
//!
//! [preview]
//! origin = "https://preview.example.com"
//! device = "mobile"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use studio_model::DEFAULT_AUTHOR;
use studio_preview::{DeviceHint, TargetOrigin};
use studio_store::DEFAULT_CACHE_KEY;

/// Default origin for embed snippets and the preview surface
pub const DEFAULT_ORIGIN: &str = "http://localhost:3000";

/// Default local cache directory
pub const DEFAULT_CACHE_DIR: &str = ".chatbot-studio";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this shape
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range
    #[error("invalid config value for {field}: {message}")]
    Invalid { field: &'static str, message: String },
}

/// Local cache settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory holding the cache slot
    pub dir: PathBuf,
    /// Slot key
    pub key: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_CACHE_DIR),
            key: DEFAULT_CACHE_KEY.to_string(),
        }
    }
}

/// Remote store settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Base URL; absent means every commit is local
    pub base_url: Option<String>,
    /// Per-request timeout; absent leaves it to the transport
    pub timeout_secs: Option<u64>,
}

impl RemoteConfig {
    /// Request timeout
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Embed snippet settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedConfig {
    /// Base URL used when a configuration has no custom domain
    pub origin: String,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
        }
    }
}

/// Preview surface settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Origin the render surface is served from
    pub origin: String,
    /// Device emulated by default
    pub device: DeviceHint,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_string(),
            device: DeviceHint::default(),
        }
    }
}

/// Studio configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Label written into version records
    pub author: String,
    pub cache: CacheConfig,
    pub remote: RemoteConfig,
    pub embed: EmbedConfig,
    pub preview: PreviewConfig,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            author: DEFAULT_AUTHOR.to_string(),
            cache: CacheConfig::default(),
            remote: RemoteConfig::default(),
            embed: EmbedConfig::default(),
            preview: PreviewConfig::default(),
        }
    }
}

impl StudioConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse TOML text
    ///
    /// # Errors
    /// Returns error if the text does not parse or a value is invalid
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check values that the type system cannot
    ///
    /// # Errors
    /// Returns the first invalid field
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.author.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "author",
                message: "must not be empty".to_string(),
            });
        }
        if self.cache.key.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "cache.key",
                message: "must not be empty".to_string(),
            });
        }
        if self.remote.timeout_secs == Some(0) {
            return Err(ConfigError::Invalid {
                field: "remote.timeout_secs",
                message: "must be positive".to_string(),
            });
        }
        TargetOrigin::parse(&self.embed.origin).map_err(|e| ConfigError::Invalid {
            field: "embed.origin",
            message: e.to_string(),
        })?;
        self.preview_origin()?;
        Ok(())
    }

    /// Parsed preview origin
    ///
    /// # Errors
    /// Returns error if `preview.origin` is not a concrete origin
    pub fn preview_origin(&self) -> Result<TargetOrigin, ConfigError> {
        TargetOrigin::parse(&self.preview.origin).map_err(|e| ConfigError::Invalid {
            field: "preview.origin",
            message: e.to_string(),
        })
    }

    /// With author label
    #[inline]
    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// With cache directory
    #[inline]
    #[must_use]
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache.dir = dir.into();
        self
    }

    /// With remote store base URL
    #[inline]
    #[must_use]
    pub fn with_remote(mut self, base_url: impl Into<String>) -> Self {
        self.remote.base_url = Some(base_url.into());
        self
    }

    /// With embed origin
    #[inline]
    #[must_use]
    pub fn with_embed_origin(mut self, origin: impl Into<String>) -> Self {
        self.embed.origin = origin.into();
        self
    }

    /// With preview origin
    #[inline]
    #[must_use]
    pub fn with_preview_origin(mut self, origin: impl Into<String>) -> Self {
        self.preview.origin = origin.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = StudioConfig::from_toml_str("").unwrap();
        assert_eq!(config, StudioConfig::default());
        assert_eq!(config.author, "editor");
        assert_eq!(config.cache.key, "chatbots");
        assert!(config.remote.base_url.is_none());
        assert!(config.remote.timeout().is_none());
    }

    #[test]
    fn full_file_parses() {
        let config = StudioConfig::from_toml_str(
            r#"
            author = "alice"

            [cache]
            dir = "/tmp/studio"

            [remote]
            base_url = "https://api.example.com"
            timeout_secs = 10

            [embed]
            origin = "https://bots.example.com"

            [preview]
            origin = "https://preview.example.com"
            device = "mobile"
            "#,
        )
        .unwrap();

        assert_eq!(config.author, "alice");
        assert_eq!(config.cache.dir, PathBuf::from("/tmp/studio"));
        assert_eq!(config.cache.key, "chatbots");
        assert_eq!(config.remote.timeout(), Some(Duration::from_secs(10)));
        assert_eq!(config.preview.device, DeviceHint::Mobile);
    }

    #[test]
    fn invalid_values_rejected() {
        assert!(matches!(
            StudioConfig::from_toml_str("author = \"  \""),
            Err(ConfigError::Invalid { field: "author", .. })
        ));
        assert!(matches!(
            StudioConfig::from_toml_str("[preview]\norigin = \"*\""),
            Err(ConfigError::Invalid { field: "preview.origin", .. })
        ));
        assert!(matches!(
            StudioConfig::from_toml_str("[remote]\ntimeout_secs = 0"),
            Err(ConfigError::Invalid { field: "remote.timeout_secs", .. })
        ));
        assert!(matches!(
            StudioConfig::from_toml_str("author = ["),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn builders_compose() {
        let config = StudioConfig::new()
            .with_author("bob")
            .with_remote("https://api.example.com")
            .with_cache_dir("/tmp/x");
        assert_eq!(config.author, "bob");
        assert_eq!(config.remote.base_url.as_deref(), Some("https://api.example.com"));
        assert!(config.validate().is_ok());
    }
}
