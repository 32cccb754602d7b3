//! Config path resolution helpers.

use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "runway.toml";

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV_VAR: &str = "RUNWAY_CONFIG";

pub fn default_config_dir() -> anyhow::Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
        .join("runway"))
}

/// Pick the config file: explicit path, then `RUNWAY_CONFIG`, then the
/// platform config directory.
pub fn resolve_config_path(explicit: Option<&Path>) -> anyhow::Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = std::env::var_os(CONFIG_ENV_VAR).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    Ok(default_config_dir()?.join(CONFIG_FILE_NAME))
}
