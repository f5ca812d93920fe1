use std::{fmt, path::Path};

use serde::{Deserialize, Serialize};

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parsing(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parsing(e) => write!(f, "TOML parse error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        ConfigError::Io(value)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        ConfigError::Parsing(value)
    }
}

#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
}

impl Config {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&data)?;

        Ok(config)
    }
}

/// Site-wide presentation settings. Read once at startup, never mutated.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(default)]
pub struct SiteConfig {
    /// Markup shown in the site header.
    pub logo: String,
    /// External repository link shown next to the logo.
    pub project_link: Option<String>,
    /// Base URL of the repository the docs themselves live in, used for
    /// "edit this page" links.
    pub docs_repository_base: Option<String>,
    /// Sidebar folders deeper than this level start collapsed. 0 keeps
    /// everything expanded.
    pub sidebar_collapse_level: u8,
    /// Footer text.
    pub footer: String,
    /// Single character rendered into the favicon.
    pub favicon_glyph: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            logo: "\u{1F4DA} Documentation".to_string(),
            project_link: None,
            docs_repository_base: None,
            sidebar_collapse_level: 0,
            footer: String::new(),
            favicon_glyph: "\u{1F4DA}".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_for_missing_fields() {
        let config: Config = toml::from_str(
            r#"
            [site]
            logo = "<span>Acme Docs</span>"
            footer = "Acme Engineering"
            "#,
        )
        .unwrap();

        assert_eq!(config.site.logo, "<span>Acme Docs</span>");
        assert_eq!(config.site.footer, "Acme Engineering");
        assert_eq!(config.site.sidebar_collapse_level, 0);
        assert!(config.site.project_link.is_none());
    }

    #[test]
    fn parses_every_field() {
        let config: Config = toml::from_str(
            r#"
            [site]
            logo = "docs"
            project_link = "https://github.com/acme"
            docs_repository_base = "https://github.com/acme/docs"
            sidebar_collapse_level = 2
            footer = "Acme"
            favicon_glyph = "A"
            "#,
        )
        .unwrap();

        assert_eq!(config.site.project_link.as_deref(), Some("https://github.com/acme"));
        assert_eq!(config.site.sidebar_collapse_level, 2);
        assert_eq!(config.site.favicon_glyph, "A");
    }
}
