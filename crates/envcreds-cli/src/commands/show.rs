//! `envcreds show`: print the decrypted credentials.

use clap::Args;
use envcreds_core::Config;

use super::TargetArgs;

/// Show command arguments.
#[derive(Args)]
pub struct ShowArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

/// Run the show command.
pub async fn run(args: ShowArgs, config: &Config) -> anyhow::Result<()> {
    let secrets = envcreds_secrets::read(&args.target.options(config)).await?;
    println!("{}", secrets.to_pretty_json()?);
    Ok(())
}
