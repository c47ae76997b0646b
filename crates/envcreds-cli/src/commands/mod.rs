//! CLI command implementations.

pub mod edit;
pub mod encrypt_file;
pub mod exec;
pub mod master_key;
pub mod show;

use std::path::PathBuf;

use clap::Args;
use envcreds_core::env::{self, vars};
use envcreds_core::Config;
use envcreds_secrets::editor::DEFAULT_EDITOR;
use envcreds_secrets::{Editor, Options};

/// Environment, directory and key selection shared by most commands.
#[derive(Args, Debug, Clone, Default)]
pub struct CredentialArgs {
    /// Environment name [default: $APP_ENV, then config, then "development"]
    #[arg(short, long)]
    pub env: Option<String>,

    /// Credentials directory [default: config, then "credentials"]
    #[arg(short = 'c', long)]
    pub credentials_dir: Option<PathBuf>,

    /// Hex master key [default: $APP_MASTER_KEY, then <DIR>/<ENV>.key]
    #[arg(short, long)]
    pub master_key: Option<String>,
}

impl CredentialArgs {
    /// Build library options. Flags win over process variables, which win
    /// over the project config.
    pub fn options(&self, config: &Config) -> Options {
        let mut options = Options::new();
        if let Some(env) = resolve_env(self.env.as_deref(), config) {
            options = options.env(env);
        }
        if let Some(dir) = resolve_dir(self.credentials_dir.as_ref(), config) {
            options = options.credentials_dir(dir);
        }
        if let Some(key) = &self.master_key {
            options = options.master_key(key.as_str());
        }
        options
    }
}

/// Credential selection plus an explicit file name.
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    #[command(flatten)]
    pub credentials: CredentialArgs,

    /// Credentials file name [default: credentials.<shortcode>.json.enc]
    #[arg(short, long)]
    pub file: Option<String>,
}

impl TargetArgs {
    pub fn options(&self, config: &Config) -> Options {
        let options = self.credentials.options(config);
        match &self.file {
            Some(file) => options.credentials_file(file.clone()),
            None => options,
        }
    }
}

/// Flag, then `APP_ENV`, then the config file.
pub(crate) fn resolve_env(flag: Option<&str>, config: &Config) -> Option<String> {
    env::explicit_or_var(flag, vars::APP_ENV).or_else(|| config.environment.clone())
}

/// Flag, then the config file.
pub(crate) fn resolve_dir(flag: Option<&PathBuf>, config: &Config) -> Option<PathBuf> {
    flag.cloned().or_else(|| config.credentials_dir.clone())
}

/// `EDITOR`, then the config file, then `vi`.
pub(crate) fn resolve_editor(config: &Config) -> Editor {
    let command = env::get_var(vars::EDITOR)
        .or_else(|| config.editor.clone())
        .unwrap_or_else(|| DEFAULT_EDITOR.to_string());
    Editor::new(&command)
}
