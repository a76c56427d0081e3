//! Process configuration from an optional TOML file.
//!
//! Lookup: `--config` > `PILLARS_CONFIG` env > `~/.pillars/config.toml`.
//! A missing file means defaults.

use std::path::{Path, PathBuf};
use std::{env, fs};

use anyhow::{Context, Result};
use serde::Deserialize;

pub const DEFAULT_BIND: &str = "127.0.0.1:8787";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub output: OutputConfig,
    pub http: HttpConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `--verbose` is absent.
    pub filter: Option<String>,
}

/// Resolve the config path. An explicit path must exist; the fallbacks are
/// only used if present.
pub fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Ok(path) = env::var("PILLARS_CONFIG") {
        return Some(PathBuf::from(path));
    }
    let home = env::var("HOME").or_else(|_| env::var("USERPROFILE")).ok()?;
    let path = PathBuf::from(home).join(".pillars").join("config.toml");
    path.is_file().then_some(path)
}

impl Config {
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match resolve_path(explicit) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        if let Ok(bind) = env::var("PILLARS_HTTP_BIND") {
            config.http.bind = bind;
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_default() {
        let c = Config::parse("").unwrap();
        assert_eq!(c.output.format, OutputFormat::Text);
        assert_eq!(c.http.bind, DEFAULT_BIND);
        assert!(c.log.filter.is_none());
    }

    #[test]
    fn test_all_sections() {
        let c = Config::parse(
            r#"
            [output]
            format = "json"

            [http]
            bind = "0.0.0.0:9000"

            [log]
            filter = "pillars_core=debug"
            "#,
        )
        .unwrap();
        assert_eq!(c.output.format, OutputFormat::Json);
        assert_eq!(c.http.bind, "0.0.0.0:9000");
        assert_eq!(c.log.filter.as_deref(), Some("pillars_core=debug"));
    }

    #[test]
    fn test_unknown_format_rejected() {
        assert!(Config::parse("[output]\nformat = \"xml\"").is_err());
    }

    #[test]
    fn test_explicit_missing_file_errors() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(Config::from_file(&dir.path().join("nope.toml")).is_err());
    }
}
