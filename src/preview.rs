use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::{config::RunConfig, types::Preview};

/// Runs the preview by spawning `config.preview_command` with the pull
/// request number appended.
///
/// Dry run reaches the child as `DRY_RUN=true` in its environment only; an
/// inherited `DRY_RUN` is removed when dry run is off.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandPreview;

#[async_trait]
impl Preview for CommandPreview {
    async fn preview(&self, number: u64, config: &RunConfig) -> Result<()> {
        let (program, args) = config
            .preview_command
            .split_first()
            .context("preview command is empty")?;

        let mut command = Command::new(program);
        command.args(args).arg(number.to_string());
        if config.dry_run {
            command.env("DRY_RUN", "true");
        } else {
            command.env_remove("DRY_RUN");
        }

        debug!("Spawning {program} for pull request #{number}");
        let status = command
            .status()
            .await
            .with_context(|| format!("Failed to spawn preview command '{program}'"))?;

        if !status.success() {
            anyhow::bail!("preview command '{program}' exited with {status}");
        }
        Ok(())
    }
}
