use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::{InstallContext, Installer};
use crate::error::InstallError;
use crate::types::AcquisitionKind;

/// Runs an external install script for each attempt.
///
/// The script is invoked as
/// `<command> [extra args..] --install-dir <dir> --version <v> [--runtime dotnet]`,
/// where `--runtime dotnet` is passed only for [`AcquisitionKind::Runtime`].
#[derive(Debug, Clone)]
pub struct ScriptInstaller {
    command: PathBuf,
    extra_args: Vec<String>,
}

impl ScriptInstaller {
    pub fn new(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            extra_args: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.extra_args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn command(&self) -> &PathBuf {
        &self.command
    }

    /// Full argument list passed to the script for `ctx`.
    pub fn arguments(&self, ctx: &InstallContext) -> Vec<String> {
        let mut args = self.extra_args.clone();
        args.push("--install-dir".to_string());
        args.push(ctx.install_dir.display().to_string());
        args.push("--version".to_string());
        args.push(ctx.version.clone());
        if ctx.kind == AcquisitionKind::Runtime {
            args.push("--runtime".to_string());
            args.push("dotnet".to_string());
        }
        args
    }
}

#[async_trait]
impl Installer for ScriptInstaller {
    async fn install(&self, ctx: &InstallContext) -> Result<(), InstallError> {
        let args = self.arguments(ctx);
        debug!(
            command = %self.command.display(),
            args = ?args,
            "running install script"
        );

        let mut cmd = Command::new(&self.command);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Dropping the output future on expiry drops the child, which kills it.
        let output = match tokio::time::timeout(ctx.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(err)) => {
                return Err(InstallError::new(format!(
                    "failed to run {}: {err}",
                    self.command.display()
                )));
            }
            Err(_) => {
                return Err(InstallError::new(format!(
                    "install of version {} timed out after {}s",
                    ctx.version,
                    ctx.timeout.as_secs_f64()
                )));
            }
        };

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let mut err = InstallError::new(match output.status.code() {
            Some(code) => format!("install script exited with code {code}"),
            None => "install script was terminated by a signal".to_string(),
        })
        .with_stderr(stderr);
        if let Some(code) = output.status.code() {
            err = err.with_exit_code(code);
        }
        Err(err)
    }
}
