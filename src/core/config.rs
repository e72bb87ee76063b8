use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_format")]
    pub default_format: String,
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_format() -> String {
    "text".to_string()
}
fn default_color() -> String {
    "auto".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_format: default_format(),
            color: default_color(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSettings {
    /// Length of the recent-days window, in days.
    #[serde(default = "default_window_days")]
    pub window_days: u32,
}

fn default_window_days() -> u32 {
    30
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogSettings {
    /// Extra roots scanned for `projects/*/*.jsonl` session logs, in
    /// addition to the builtin locations.
    #[serde(default)]
    pub roots: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub report: ReportSettings,
    #[serde(default)]
    pub logs: LogSettings,
}

impl AppConfig {
    /// Get the config file path, respecting XDG_CONFIG_HOME.
    pub fn config_path() -> PathBuf {
        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("~"))
                    .join(".config")
            });
        config_dir.join("ccl").join("config.toml")
    }

    /// Load config from the default path, falling back to defaults if not found.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Serialize and write this config to the config file path.
    pub fn save(&self) -> Result<PathBuf, std::io::Error> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).expect("Failed to serialize config");
        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// Validate the config.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if !["text", "json"].contains(&self.settings.default_format.as_str()) {
            issues.push(format!(
                "Invalid default_format: '{}' (must be 'text' or 'json')",
                self.settings.default_format
            ));
        }
        if !["auto", "always", "never"].contains(&self.settings.color.as_str()) {
            issues.push(format!(
                "Invalid color: '{}' (must be 'auto', 'always', or 'never')",
                self.settings.color
            ));
        }
        if self.report.window_days == 0 {
            issues.push("window_days must be at least 1".to_string());
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        let issues = config.validate();
        assert!(issues.is_empty(), "Default config should be valid, got: {:?}", issues);
    }

    #[test]
    fn default_window_is_30_days() {
        assert_eq!(ReportSettings::default().window_days, 30);
    }

    #[test]
    fn parse_partial_toml_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [settings]
            color = "never"
            "#,
        )
        .unwrap();
        assert_eq!(config.settings.color, "never");
        assert_eq!(config.settings.default_format, "text");
        assert_eq!(config.report.window_days, 30);
        assert!(config.logs.roots.is_empty());
    }

    #[test]
    fn parse_log_roots() {
        let config: AppConfig = toml::from_str(
            r#"
            [logs]
            roots = ["/srv/claude-logs"]
            "#,
        )
        .unwrap();
        assert_eq!(config.logs.roots, vec![PathBuf::from("/srv/claude-logs")]);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.settings.default_format = "yaml".to_string();
        config.report.window_days = 0;
        let issues = config.validate();
        assert_eq!(issues.len(), 2);
    }

    #[test]
    fn config_roundtrips_through_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let back: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(back.settings.default_format, config.settings.default_format);
        assert_eq!(back.report.window_days, config.report.window_days);
    }
}
