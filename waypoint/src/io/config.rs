//! Engine configuration stored under `.waypoint/config.toml`.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::invariants::InvariantLimits;

/// Engine configuration (TOML).
///
/// This file is intended to be edited by humans and must remain stable and
/// automatable. Missing fields default to sensible values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum nesting depth of the mission hierarchy.
    pub max_tree_depth: usize,

    /// Pattern every variable display name must match.
    pub variable_name_pattern: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_tree_depth: 16,
            variable_name_pattern: "^[A-Za-z][A-Za-z0-9 _-]*$".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_tree_depth == 0 {
            return Err(anyhow!("max_tree_depth must be > 0"));
        }
        Regex::new(&self.variable_name_pattern)
            .map_err(|err| anyhow!("variable_name_pattern is not a valid regex: {}", err))?;
        Ok(())
    }

    /// Compile the config into the limits consumed by the invariant
    /// validator.
    pub fn limits(&self) -> Result<InvariantLimits> {
        let variable_name_pattern = Regex::new(&self.variable_name_pattern)
            .map_err(|err| anyhow!("variable_name_pattern is not a valid regex: {}", err))?;
        Ok(InvariantLimits {
            max_tree_depth: self.max_tree_depth,
            variable_name_pattern,
        })
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `EngineConfig::default()`.
pub fn load_config(path: &Path) -> Result<EngineConfig> {
    if !path.exists() {
        let cfg = EngineConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: EngineConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &EngineConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, EngineConfig::default());
    }

    #[test]
    fn write_and_load_round_trip() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("config.toml");
        let cfg = EngineConfig {
            max_tree_depth: 8,
            ..EngineConfig::default()
        };
        write_config(&path, &cfg).expect("write");
        assert_eq!(load_config(&path).expect("load"), cfg);
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let cfg = EngineConfig {
            variable_name_pattern: "([unclosed".to_string(),
            ..EngineConfig::default()
        };
        let err = cfg.validate().expect_err("should fail");
        assert!(err.to_string().contains("not a valid regex"));
    }

    #[test]
    fn zero_depth_is_rejected() {
        let cfg = EngineConfig {
            max_tree_depth: 0,
            ..EngineConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
