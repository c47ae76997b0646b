//! envcreds command-line interface.

pub mod commands;
pub mod gitignore;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use envcreds_core::env::vars;
use envcreds_core::Config;

/// envcreds - encrypted per-environment credentials
#[derive(Parser)]
#[command(name = "envcreds")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase logging verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to the project config file
    #[arg(long, global = true, env = vars::ENVCREDS_CONFIG)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Generate a master key and store it next to the credentials
    MasterKey(commands::master_key::MasterKeyArgs),

    /// Edit the credentials in $EDITOR
    Edit(commands::edit::EditArgs),

    /// Encrypt a plain JSON file into the credentials directory
    EncryptFile(commands::encrypt_file::EncryptFileArgs),

    /// Print the decrypted credentials
    Show(commands::show::ShowArgs),

    /// Run a command with the credentials exported to its environment
    Exec(commands::exec::ExecArgs),

    /// Show version information
    Version,
}

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Load the project config named on the command line, or the default one.
pub fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Config::load_default().context("failed to load project config"),
    }
}

/// Run the CLI with the given arguments.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Version => {
            println!("envcreds {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        command => {
            let config = load_config(cli.config.as_deref())?;
            dispatch(command, &config).await
        }
    }
}

async fn dispatch(command: Commands, config: &Config) -> anyhow::Result<()> {
    match command {
        Commands::MasterKey(args) => commands::master_key::run(args, config).await,
        Commands::Edit(args) => commands::edit::run(args, config).await,
        Commands::EncryptFile(args) => commands::encrypt_file::run(args, config).await,
        Commands::Show(args) => commands::show::run(args, config).await,
        Commands::Exec(args) => {
            let code = commands::exec::run(args, config).await?;
            if code != 0 {
                std::process::exit(code);
            }
            Ok(())
        }
        Commands::Version => Ok(()),
    }
}
