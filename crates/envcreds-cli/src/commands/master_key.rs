//! `envcreds master-key`: generate a master key.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use console::style;
use envcreds_core::{paths, Config};
use envcreds_secrets::{generate_key, write_secret_file, Environment};
use tracing::info;

use super::{resolve_dir, resolve_env};
use crate::gitignore;

/// Master-key command arguments.
#[derive(Args)]
pub struct MasterKeyArgs {
    /// Directory to store the key in [default: config, then "credentials"]
    #[arg(short = 'c', long)]
    pub credentials_dir: Option<PathBuf>,

    /// Environment the key belongs to [default: $APP_ENV, then config, then "development"]
    #[arg(short, long)]
    pub env: Option<String>,

    /// Only print the key, do not write a key file
    #[arg(long)]
    pub no_save: bool,
}

/// Run the master-key command. The key is printed to stdout.
pub async fn run(args: MasterKeyArgs, config: &Config) -> anyhow::Result<()> {
    let key = generate_key();

    if !args.no_save {
        let env = Environment::resolve(resolve_env(args.env.as_deref(), config).as_deref());
        let dir = resolve_dir(args.credentials_dir.as_ref(), config)
            .unwrap_or_else(paths::default_credentials_dir);
        let key_file = save_key(&dir, env.name(), &key).await?;

        let pattern = ignore_pattern(&dir);
        if gitignore::ensure_entry(Path::new(gitignore::FILE_NAME), &pattern)
            .await
            .context("failed to update .gitignore")?
        {
            info!(pattern = %pattern, "added key pattern to .gitignore");
        }

        eprintln!(
            "{} Saved {} master key to {}",
            style("✓").green(),
            env,
            style(key_file.display()).cyan()
        );
    }

    println!("{key}");
    Ok(())
}

async fn save_key(dir: &Path, env: &str, key: &str) -> anyhow::Result<PathBuf> {
    let key_file = paths::key_file(dir, env);
    if tokio::fs::try_exists(&key_file).await.unwrap_or(false) {
        anyhow::bail!(
            "{} already exists; remove it first to generate a new key",
            key_file.display()
        );
    }

    if !dir.as_os_str().is_empty() {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }
    write_secret_file(&key_file, format!("{key}\n").as_bytes())
        .await
        .with_context(|| format!("failed to write {}", key_file.display()))?;

    Ok(key_file)
}

/// `.gitignore` line covering every key file in `dir`.
fn ignore_pattern(dir: &Path) -> String {
    let dir = dir.to_string_lossy();
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() {
        "*.key".to_string()
    } else {
        format!("{dir}/*.key")
    }
}
