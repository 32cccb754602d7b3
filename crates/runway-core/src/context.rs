//! Application context for unified dependency injection.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::acquisition::{AcquisitionCoordinator, CoordinatorOptions};
use crate::config::{ConfigStore, RunwayConfig, resolve_config_path};
use crate::error::InstallError;
use crate::events::{EventSink, EventStream, JsonlEventSink, TracingEventSink};
use crate::existing_path::ExistingPath;
use crate::installer::{InstallContext, Installer, ScriptInstaller};
use crate::state::{JsonFileStateStore, StateStore};
use crate::validator::FsInstallValidator;

/// Configuration plus the coordinator wired from it.
///
/// Frontends create this once and hand it to commands.
#[derive(Clone)]
pub struct AppContext {
    config: RunwayConfig,
    config_path: PathBuf,
    events: Arc<dyn EventSink>,
    coordinator: AcquisitionCoordinator,
}

impl AppContext {
    /// Load config from `explicit`, `RUNWAY_CONFIG`, or the default location.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let store = ConfigStore::from_path(resolve_config_path(explicit)?);
        let config = store.load()?;
        Self::from_config(config, store.config_path().to_path_buf())
    }

    /// Production wiring: script installer, JSON state file, tracing events
    /// and, when configured, a JSON-lines event log.
    pub fn from_config(config: RunwayConfig, config_path: PathBuf) -> anyhow::Result<Self> {
        let mut events = EventStream::new().with_sink(Arc::new(TracingEventSink));
        if let Some(log) = &config.event_log {
            events.subscribe(Arc::new(JsonlEventSink::new(log.clone())));
        }

        let installer: Arc<dyn Installer> = match &config.installer.command {
            Some(command) => Arc::new(
                ScriptInstaller::new(command.clone()).with_args(config.installer.args.clone()),
            ),
            None => Arc::new(UnconfiguredInstaller {
                config_path: config_path.clone(),
            }),
        };
        let store = Arc::new(JsonFileStateStore::new(config.state_file()?));

        Self::with_collaborators(config, config_path, installer, store, Arc::new(events))
    }

    /// Wire the coordinator around caller-supplied collaborators.
    pub fn with_collaborators(
        config: RunwayConfig,
        config_path: PathBuf,
        installer: Arc<dyn Installer>,
        store: Arc<dyn StateStore>,
        events: Arc<dyn EventSink>,
    ) -> anyhow::Result<Self> {
        let options =
            CoordinatorOptions::new(config.layout()?).with_install_timeout(config.install_timeout());
        let coordinator = AcquisitionCoordinator::new(
            options,
            installer,
            Arc::new(FsInstallValidator),
            store,
            events.clone(),
        );
        Ok(Self {
            config,
            config_path,
            events,
            coordinator,
        })
    }

    pub fn config(&self) -> &RunwayConfig {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn storage_root(&self) -> &Path {
        self.coordinator.layout().storage_root()
    }

    pub fn state_file(&self) -> anyhow::Result<PathBuf> {
        self.config.state_file()
    }

    pub fn existing_paths(&self) -> &[ExistingPath] {
        &self.config.existing_paths
    }

    pub fn events(&self) -> Arc<dyn EventSink> {
        self.events.clone()
    }

    pub fn coordinator(&self) -> &AcquisitionCoordinator {
        &self.coordinator
    }
}

/// Stands in when no install command is configured, so status queries and
/// uninstall still work.
struct UnconfiguredInstaller {
    config_path: PathBuf,
}

#[async_trait]
impl Installer for UnconfiguredInstaller {
    async fn install(&self, ctx: &InstallContext) -> Result<(), InstallError> {
        Err(InstallError::new(format!(
            "no installer command configured for version {}; set [installer] command in {}",
            ctx.version,
            self.config_path.display()
        )))
    }
}
