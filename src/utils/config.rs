use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the reports directory from the config file
pub const REPORTS_PATH_ENV: &str = "AUTOBOT_REPORTS_PATH";

/// Source of the directory test case reports are written to
pub trait ConfigProvider {
    fn reports_path(&self) -> PathBuf;
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory receiving one report file per test case run
    #[serde(default = "default_reports_path")]
    pub reports_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reports_path: default_reports_path(),
        }
    }
}

fn default_reports_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("autobot").join("reports"))
        .unwrap_or_else(|| PathBuf::from("reports"))
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Resolve the effective configuration.
    ///
    /// Precedence, lowest first: defaults, config file, `AUTOBOT_REPORTS_PATH`,
    /// `reports_override`.
    pub fn resolve(file: Option<&Path>, reports_override: Option<&Path>) -> Result<Self> {
        let env_value = std::env::var_os(REPORTS_PATH_ENV).map(PathBuf::from);
        Self::resolve_with_env(file, env_value, reports_override)
    }

    fn resolve_with_env(
        file: Option<&Path>,
        env_value: Option<PathBuf>,
        reports_override: Option<&Path>,
    ) -> Result<Self> {
        let mut config = match file {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };

        if let Some(dir) = env_value.filter(|p| !p.as_os_str().is_empty()) {
            log::debug!("Reports path taken from {}", REPORTS_PATH_ENV);
            config.reports_path = dir;
        }

        if let Some(dir) = reports_override {
            config.reports_path = dir.to_path_buf();
        }

        Ok(config)
    }
}

impl ConfigProvider for Config {
    fn reports_path(&self) -> PathBuf {
        self.reports_path.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_yaml_reads_reports_path() {
        let config = Config::from_yaml("reportsPath: /tmp/autobot\n").unwrap();
        assert_eq!(config.reports_path, PathBuf::from("/tmp/autobot"));
    }

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config = Config::from_yaml("").unwrap();
        assert_eq!(config, Config::default());
        assert!(config.reports_path.ends_with("reports"));
    }

    #[test]
    fn test_resolve_precedence() {
        let config = Config::resolve_with_env(None, Some(PathBuf::from("/env/reports")), None)
            .unwrap();
        assert_eq!(config.reports_path(), PathBuf::from("/env/reports"));

        let config = Config::resolve_with_env(
            None,
            Some(PathBuf::from("/env/reports")),
            Some(Path::new("/cli/reports")),
        )
        .unwrap();
        assert_eq!(config.reports_path(), PathBuf::from("/cli/reports"));
    }

    #[test]
    fn test_resolve_ignores_empty_env() {
        let config = Config::resolve_with_env(None, Some(PathBuf::new()), None).unwrap();
        assert_eq!(config, Config::default());
    }
}
