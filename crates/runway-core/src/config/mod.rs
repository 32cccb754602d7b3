//! Host configuration (`runway.toml`).

pub mod parser;
pub mod paths;
pub mod schema;
pub mod store;

pub use parser::{parse_runway_toml, parse_runway_toml_str, to_toml};
pub use paths::{CONFIG_ENV_VAR, CONFIG_FILE_NAME, default_config_dir, resolve_config_path};
pub use schema::{DEFAULT_INSTALL_TIMEOUT_SECS, InstallerConfig, RunwayConfig};
pub use store::ConfigStore;
