//! External editor invocation.
//!
//! An interactive edit walks through [`EditPhase`] in order. The plaintext
//! lives in a fresh `0600` temporary file owned by one [`EditSession`]; the
//! file is removed by [`EditSession::finish`] or, on any early return, when
//! the session is dropped.

use std::fmt;
use std::io::Write;
use std::path::Path;
use std::process::{ExitStatus, Stdio};

use envcreds_core::env::{self, vars};
use tempfile::NamedTempFile;
use tokio::process::Command;
use tracing::debug;

use crate::error::{CredentialsError, Result};
use crate::types::Secrets;

/// Editor used when `EDITOR` is unset.
pub const DEFAULT_EDITOR: &str = "vi";

/// Steps of an interactive edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditPhase {
    Idle,
    TempFileWritten,
    EditorRunning,
    EditorExited,
    EncryptedAndSaved,
    CleanedUp,
}

/// An editor command line. The file to edit is appended as the last argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Editor {
    program: String,
    args: Vec<String>,
}

impl Editor {
    /// Parse a command such as `"vim"` or `"code --wait"`.
    pub fn new(command: &str) -> Self {
        let mut words = command.split_whitespace().map(str::to_string);
        match words.next() {
            Some(program) => Self {
                program,
                args: words.collect(),
            },
            None => Self {
                program: DEFAULT_EDITOR.to_string(),
                args: Vec::new(),
            },
        }
    }

    /// The editor named by `EDITOR`, or `vi`.
    pub fn from_env() -> Self {
        Self::new(&env::get_var_or(vars::EDITOR, DEFAULT_EDITOR))
    }

    /// Program name.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Launch the editor on `path` with the terminal attached and wait for
    /// it to exit.
    pub async fn open(&self, path: &Path) -> std::io::Result<ExitStatus> {
        Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
    }
}

impl fmt::Display for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// One in-flight interactive edit and the plaintext file it owns.
pub struct EditSession {
    env: String,
    file: NamedTempFile,
    phase: EditPhase,
}

impl EditSession {
    /// Write `secrets` as 4-space JSON into a new temporary file.
    pub fn begin(env: &str, secrets: &Secrets) -> Result<Self> {
        let json = secrets
            .to_pretty_json()
            .map_err(|e| CredentialsError::InvalidFormat {
                env: env.to_string(),
                cause: e.to_string(),
            })?;

        let mut file = tempfile::Builder::new()
            .prefix("credentials-")
            .suffix(".json")
            .tempfile()
            .map_err(|e| CredentialsError::io(env, std::env::temp_dir(), e))?;
        file.write_all(json.as_bytes())
            .and_then(|()| file.flush())
            .map_err(|e| CredentialsError::io(env, file.path(), e))?;

        let mut session = Self {
            env: env.to_string(),
            file,
            phase: EditPhase::Idle,
        };
        session.advance(EditPhase::TempFileWritten);
        Ok(session)
    }

    /// Path of the plaintext file.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Current phase.
    pub fn phase(&self) -> EditPhase {
        self.phase
    }

    /// Run `editor` on the temporary file until it exits.
    pub async fn run_editor(&mut self, editor: &Editor) -> Result<ExitStatus> {
        self.advance(EditPhase::EditorRunning);
        let status = editor
            .open(self.file.path())
            .await
            .map_err(|e| CredentialsError::Editor {
                env: self.env.clone(),
                editor: editor.to_string(),
                cause: e.to_string(),
            })?;
        self.advance(EditPhase::EditorExited);
        Ok(status)
    }

    /// Read the (possibly edited) plaintext back.
    pub async fn read_back(&self) -> Result<String> {
        tokio::fs::read_to_string(self.file.path())
            .await
            .map_err(|e| CredentialsError::io(&self.env, self.file.path(), e))
    }

    /// Record that the edited content has been encrypted and written.
    pub fn mark_saved(&mut self) {
        self.advance(EditPhase::EncryptedAndSaved);
    }

    /// Remove the temporary file.
    pub fn finish(mut self) -> Result<()> {
        let path = self.file.path().to_path_buf();
        self.advance(EditPhase::CleanedUp);
        self.file
            .close()
            .map_err(|e| CredentialsError::io(&self.env, path, e))
    }

    fn advance(&mut self, next: EditPhase) {
        debug!(env = %self.env, from = ?self.phase, to = ?next, "edit phase");
        self.phase = next;
    }
}

impl fmt::Debug for EditSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditSession")
            .field("env", &self.env)
            .field("path", &self.file.path())
            .field("phase", &self.phase)
            .finish()
    }
}
