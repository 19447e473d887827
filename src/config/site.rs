//! Site settings (settings.yml)

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Base URL used for absolute links when `FREEZER_BASE_URL` is unset
pub const DEFAULT_BASE_URL: &str = "http://localhost/";

/// Blog settings. Keys are upper-case in the settings file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct BlogConfig {
    // Content
    pub posts_root_directory: String,
    pub posts_file_extension: String,

    // Freezing
    pub freezer_base_url: Option<String>,
    pub freezer_destination: String,

    // Assets
    pub static_directory: String,
    pub templates_directory: String,

    // Site
    pub site_title: String,
    pub site_author: String,

    // Feed
    pub feed_max_entries: usize,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            posts_root_directory: "posts".to_string(),
            posts_file_extension: ".markdown".to_string(),

            freezer_base_url: None,
            freezer_destination: "build".to_string(),

            static_directory: "static".to_string(),
            templates_directory: "templates".to_string(),

            site_title: "My Blog".to_string(),
            site_author: "Anonymous".to_string(),

            feed_max_entries: 10,
        }
    }
}

impl BlogConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;

        // An empty settings file is a valid "all defaults" file
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: BlogConfig =
            serde_yaml::from_str(&content).map_err(|source| Error::Config {
                path: path.to_path_buf(),
                source,
            })?;
        tracing::debug!("Loaded settings from {:?}", path);
        Ok(config)
    }

    /// The post file extension, always with a leading dot
    pub fn file_extension(&self) -> String {
        let ext = self.posts_file_extension.trim();
        if ext.starts_with('.') {
            ext.to_string()
        } else {
            format!(".{}", ext)
        }
    }

    /// Base URL for absolute links, always ending with a slash
    pub fn base_url(&self) -> String {
        let base = self
            .freezer_base_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or(DEFAULT_BASE_URL);

        if base.ends_with('/') {
            base.to_string()
        } else {
            format!("{}/", base)
        }
    }

    /// Join a site path such as `/blog/foo/` onto the base URL
    pub fn absolute_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BlogConfig::default();
        assert_eq!(config.posts_root_directory, "posts");
        assert_eq!(config.posts_file_extension, ".markdown");
        assert_eq!(config.freezer_base_url, None);
        assert_eq!(config.feed_max_entries, 10);
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
POSTS_ROOT_DIRECTORY: content
POSTS_FILE_EXTENSION: md
FREEZER_BASE_URL: https://example.com/blog
site_title: ignored because lower-case
"#;
        let config: BlogConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.posts_root_directory, "content");
        assert_eq!(config.file_extension(), ".md");
        assert_eq!(config.site_title, "My Blog");
        assert_eq!(config.base_url(), "https://example.com/blog/");
    }

    #[test]
    fn test_absolute_url() {
        let config = BlogConfig::default();
        assert_eq!(
            config.absolute_url("/blog/hello/"),
            "http://localhost/blog/hello/"
        );

        let config = BlogConfig {
            freezer_base_url: Some("https://example.com/".to_string()),
            ..Default::default()
        };
        assert_eq!(config.absolute_url("/"), "https://example.com/");
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yml");
        fs::write(&path, "FEED_MAX_ENTRIES: [not, a, number]\n").unwrap();

        let err = BlogConfig::load(&path).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }
}
