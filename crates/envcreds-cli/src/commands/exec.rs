//! `envcreds exec`: run a command with the credentials in its environment.

use anyhow::Context;
use clap::Args;
use envcreds_core::Config;
use tokio::process::Command;
use tracing::debug;

use super::TargetArgs;

/// Exec command arguments.
#[derive(Args)]
pub struct ExecArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Command and arguments to run, after `--`
    #[arg(last = true, required = true, num_args = 1..)]
    pub command: Vec<String>,
}

/// Run the exec command and return the child's exit code.
pub async fn run(args: ExecArgs, config: &Config) -> anyhow::Result<i32> {
    let Some((program, rest)) = args.command.split_first() else {
        anyhow::bail!("no command given");
    };

    let secrets = envcreds_secrets::load(&args.target.options(config)).await?;
    debug!(program = %program, count = secrets.len(), "running command with credentials");

    let status = Command::new(program)
        .args(rest)
        .status()
        .await
        .with_context(|| format!("failed to run '{program}'"))?;

    // Terminated by a signal.
    Ok(status.code().unwrap_or(1))
}
