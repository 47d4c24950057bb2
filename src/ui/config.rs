//! # Configuration
//!
//! User configuration stored in `~/.config/pbrun/config.json`.
//!
//! ```json
//! {
//!   "playbook_folder": "/opt/playbooks",
//!   "theme": "Catppuccin Mocha",
//!   "escalation": "sudo",
//!   "scrollback_lines": 10000
//! }
//! ```
//!
//! Every field is optional. `escalation` defaults to `sudo`, or `none` when
//! running as root. The file is only read; command-line flags
//! override whatever it contains. The `directories` crate resolves the
//! platform config directory.

use crate::playbook::DEFAULT_PLAYBOOK_FOLDER;
use crate::spawn::Escalation;
use crate::ui::output::DEFAULT_SCROLLBACK_LINES;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// User configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Folder listed when the panel opens.
    #[serde(default = "default_playbook_folder")]
    pub playbook_folder: String,

    /// Name of a built-in theme.
    #[serde(default = "default_theme_name")]
    pub theme: String,

    /// How listings and runs acquire superuser rights.
    #[serde(default)]
    pub escalation: Escalation,

    /// Scrollback rows kept in the output pane.
    #[serde(default = "default_scrollback_lines")]
    pub scrollback_lines: usize,
}

fn default_playbook_folder() -> String {
    DEFAULT_PLAYBOOK_FOLDER.to_string()
}

fn default_theme_name() -> String {
    "Catppuccin Mocha".to_string()
}

fn default_scrollback_lines() -> usize {
    DEFAULT_SCROLLBACK_LINES
}

impl Default for Config {
    fn default() -> Self {
        Self {
            playbook_folder: default_playbook_folder(),
            theme: default_theme_name(),
            escalation: Escalation::default(),
            scrollback_lines: default_scrollback_lines(),
        }
    }
}

impl Config {
    /// Load from the default location; a missing file yields the defaults.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Load from a specific path; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Path of the default config file.
    pub fn config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "pbrun")
            .context("Could not determine config directory")?;
        Ok(dirs.config_dir().join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.playbook_folder, "/opt/playbooks");
        assert_eq!(config.theme, "Catppuccin Mocha");
        assert_eq!(config.escalation, Escalation::default());
        assert_eq!(config.scrollback_lines, 10_000);
    }

    #[test]
    fn test_empty_object_uses_defaults() {
        let config: Config = serde_json::from_str("{}").expect("deserialize");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_config() {
        let json = r#"{"playbook_folder": "/srv/ansible", "escalation": "pkexec"}"#;
        let config: Config = serde_json::from_str(json).expect("deserialize");
        assert_eq!(config.playbook_folder, "/srv/ansible");
        assert_eq!(config.escalation, Escalation::Pkexec);
        assert_eq!(config.theme, "Catppuccin Mocha");
    }

    #[test]
    fn test_load_from_full_file() {
        let temp_dir = TempDir::new().expect("create temp dir");
        let config_path = temp_dir.path().join("config.json");
        fs::write(
            &config_path,
            r#"{
                "playbook_folder": "/home/ops/playbooks",
                "theme": "Nord",
                "escalation": "sudo",
                "scrollback_lines": 2000
            }"#,
        )
        .expect("write");

        let loaded = Config::load_from(&config_path).expect("load_from");
        assert_eq!(
            loaded,
            Config {
                playbook_folder: "/home/ops/playbooks".to_string(),
                theme: "Nord".to_string(),
                escalation: Escalation::Sudo,
                scrollback_lines: 2_000,
            }
        );
    }

    #[test]
    fn test_load_from_missing_file_returns_default() {
        let temp_dir = TempDir::new().expect("create temp dir");
        let loaded =
            Config::load_from(&temp_dir.path().join("absent.json")).expect("load_from");
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn test_load_from_invalid_json_is_error() {
        let temp_dir = TempDir::new().expect("create temp dir");
        let path = temp_dir.path().join("config.json");
        fs::write(&path, "{ not json").expect("write");

        let err = Config::load_from(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse config file"));
    }

    #[test]
    fn test_deny_unknown_fields() {
        let json = r#"{"theme": "Nord", "superuser": true}"#;
        let result: Result<Config, _> = serde_json::from_str(json);
        assert!(result.is_err(), "should reject unknown fields");
    }
}
