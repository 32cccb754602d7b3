//! Config store for loading and saving runway.toml.

use std::path::{Path, PathBuf};

use anyhow::Context;

use super::{RunwayConfig, parser, paths::resolve_config_path};

#[derive(Debug, Clone)]
pub struct ConfigStore {
    config_path: PathBuf,
}

impl ConfigStore {
    /// Store at the resolved default location (`RUNWAY_CONFIG` or the
    /// platform config directory).
    pub fn from_default() -> anyhow::Result<Self> {
        Ok(Self::from_path(resolve_config_path(None)?))
    }

    pub fn from_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Missing file yields the defaults.
    pub fn load(&self) -> anyhow::Result<RunwayConfig> {
        if !self.config_path.exists() {
            return Ok(RunwayConfig::new());
        }
        parser::parse_runway_toml(&self.config_path)
    }

    pub fn save(&self, config: &RunwayConfig) -> anyhow::Result<()> {
        let content = parser::to_toml(config).context("Failed to serialize config to TOML")?;
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        std::fs::write(&self.config_path, content).with_context(|| {
            format!(
                "Failed to write config file: {}",
                self.config_path.display()
            )
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_loads_defaults() {
        let tmp = TempDir::new().expect("tempdir should succeed");
        let store = ConfigStore::from_path(tmp.path().join("runway.toml"));

        let config = store.load().expect("load should succeed");
        assert_eq!(config, RunwayConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let tmp = TempDir::new().expect("tempdir should succeed");
        let store = ConfigStore::from_path(tmp.path().join("nested").join("runway.toml"));
        let config = RunwayConfig {
            storage_root: Some(tmp.path().join("runtimes")),
            install_timeout_secs: 30,
            ..RunwayConfig::default()
        };

        store.save(&config).expect("save should succeed");
        assert_eq!(store.load().expect("load should succeed"), config);
    }
}
