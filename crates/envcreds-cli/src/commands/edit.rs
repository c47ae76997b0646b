//! `envcreds edit`: open the credentials in an editor.

use clap::Args;
use console::style;
use envcreds_core::Config;

use super::{resolve_editor, TargetArgs};

/// Edit command arguments.
#[derive(Args)]
pub struct EditArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

/// Run the edit command.
pub async fn run(args: EditArgs, config: &Config) -> anyhow::Result<()> {
    let options = args.target.options(config);
    let editor = resolve_editor(config);

    envcreds_secrets::edit(&options, &editor).await?;

    let store = options.store()?;
    eprintln!(
        "{} Saved {} credentials to {}",
        style("✓").green(),
        store.env(),
        style(store.path().display()).cyan()
    );
    Ok(())
}
