use crate::error::Result;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CURRENT_CONFIG_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Per-project settings read from `.knowledgeforge/config.yaml`.
///
/// Every field is defaulted, so a missing or partial file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    /// XP granted for a completed task when the caller does not pass one.
    #[serde(default = "default_task_xp")]
    pub default_task_xp: u64,
    #[serde(default = "default_write_ignore_marker")]
    pub write_ignore_marker: bool,
}

fn default_version() -> u32 {
    CURRENT_CONFIG_VERSION
}

fn default_task_xp() -> u64 {
    10
}

fn default_write_ignore_marker() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            default_task_xp: default_task_xp(),
            write_ignore_marker: default_write_ignore_marker(),
        }
    }
}

impl Config {
    /// Load the project config, falling back to defaults when the file is absent.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.version > CURRENT_CONFIG_VERSION {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "config version {} is newer than supported version {}",
                    self.version, CURRENT_CONFIG_VERSION
                ),
            });
        }

        if self.version == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "config version 0 is not valid".to_string(),
            });
        }

        if self.default_task_xp > 1_000 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "default_task_xp={} is unusually large (>1000)",
                    self.default_task_xp
                ),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = Config::load(dir.path()).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.default_task_xp, 10);
        assert!(cfg.write_ignore_marker);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".knowledgeforge")).unwrap();
        std::fs::write(
            dir.path().join(".knowledgeforge/config.yaml"),
            "default_task_xp: 25\n",
        )
        .unwrap();

        let cfg = Config::load(dir.path()).unwrap();
        assert_eq!(cfg.default_task_xp, 25);
        assert_eq!(cfg.version, 1);
        assert!(cfg.write_ignore_marker);
    }

    #[test]
    fn config_roundtrip() {
        let dir = TempDir::new().unwrap();
        let cfg = Config {
            write_ignore_marker: false,
            ..Config::default()
        };
        cfg.save(dir.path()).unwrap();
        assert_eq!(Config::load(dir.path()).unwrap(), cfg);
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".knowledgeforge")).unwrap();
        std::fs::write(
            dir.path().join(".knowledgeforge/config.yaml"),
            "default_task_xp: [not a number\n",
        )
        .unwrap();
        assert!(Config::load(dir.path()).is_err());
    }

    #[test]
    fn validate_flags_future_version() {
        let cfg = Config {
            version: 7,
            ..Config::default()
        };
        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("newer than supported"));
        assert!(Config::default().validate().is_empty());
    }
}
