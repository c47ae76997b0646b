//! `envcreds encrypt-file`: encrypt a plain JSON file.

use std::path::PathBuf;

use clap::Args;
use envcreds_core::Config;
use envcreds_secrets::EncryptFileOptions;

use super::CredentialArgs;

/// Encrypt-file command arguments.
#[derive(Args)]
pub struct EncryptFileArgs {
    /// Plain JSON file to encrypt
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file name inside the credentials directory [default: <INPUT>.enc]
    #[arg(short, long)]
    pub output: Option<String>,

    #[command(flatten)]
    pub credentials: CredentialArgs,
}

/// Run the encrypt-file command. Prints the path of the encrypted file.
pub async fn run(args: EncryptFileArgs, config: &Config) -> anyhow::Result<()> {
    let options = EncryptFileOptions {
        input: args.input,
        output: args.output,
        options: args.credentials.options(config),
    };

    let output = envcreds_secrets::encrypt_file(&options).await?;
    println!("{}", output.display());
    Ok(())
}
