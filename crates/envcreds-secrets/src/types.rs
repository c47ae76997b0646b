//! Core types for credential management.
//!
//! [`Environment`] and [`CredentialsFile`] decide where a secrets file lives;
//! [`Secrets`] is its decrypted content and [`Contents`] is what callers hand
//! to [`crate::CredentialStore::update`].

use std::fmt;
use std::path::{Path, PathBuf};

use envcreds_core::env::{self, vars};
use envcreds_core::paths;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Environment used when neither the caller nor `APP_ENV` names one.
pub const DEFAULT_ENV: &str = "development";

/// A deployment environment name such as "production" or "ci-custom".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Environment(String);

impl Environment {
    /// Create an environment from a name, used verbatim.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Resolve the environment: explicit name, then `APP_ENV`, then
    /// `"development"`.
    pub fn resolve(explicit: Option<&str>) -> Self {
        Self(
            env::explicit_or_var(explicit, vars::APP_ENV)
                .unwrap_or_else(|| DEFAULT_ENV.to_string()),
        )
    }

    /// The full environment name.
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Short code used in file names. Known names are abbreviated, anything
    /// else is used as-is.
    pub fn shortcode(&self) -> &str {
        match self.0.as_str() {
            "development" => "dev",
            "production" => "prod",
            "test" => "test",
            "stage" => "stage",
            other => other,
        }
    }

    /// Default credentials file name, `credentials.<shortcode>.json.enc`.
    pub fn default_file_name(&self) -> String {
        format!("credentials.{}.json.enc", self.shortcode())
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where one environment's encrypted credentials live.
///
/// Computed once; there are no setters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialsFile {
    env: Environment,
    dir: PathBuf,
    name: String,
    path: PathBuf,
}

impl CredentialsFile {
    /// Build a file reference.
    ///
    /// `dir: None` means the conventional `credentials` directory. An
    /// explicitly empty directory is honored and places the file in the
    /// working directory. `name: None` derives the name from `env`.
    pub fn new(env: Environment, dir: Option<PathBuf>, name: Option<String>) -> Self {
        let dir = dir.unwrap_or_else(paths::default_credentials_dir);
        let name = name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| env.default_file_name());
        let path = if dir.as_os_str().is_empty() {
            PathBuf::from(&name)
        } else {
            dir.join(&name)
        };

        Self {
            env,
            dir,
            name,
            path,
        }
    }

    /// The environment this file belongs to.
    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Directory component; empty when the file sits in the working directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name without directory.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full path to the encrypted file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Decrypted credentials: a JSON object of names to values.
///
/// Debug output lists key names only.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secrets(Map<String, Value>);

impl Secrets {
    /// An empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse JSON text that must be an object.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Serialize with sorted keys and 4-space indentation.
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.0.serialize(&mut ser)?;
        // serde_json only ever writes valid UTF-8.
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Look up a value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Iterate over all pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Key names.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the mapping has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// A new mapping with `overrides` applied on top; overrides win.
    pub fn merged(mut self, overrides: &Secrets) -> Self {
        for (key, value) in overrides.iter() {
            self.0.insert(key.clone(), value.clone());
        }
        self
    }

    /// Render a value the way it is exported as an environment variable.
    ///
    /// Strings are verbatim, `null` is empty, everything else is compact JSON.
    pub fn env_value(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("keys", &self.0.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl From<Map<String, Value>> for Secrets {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Secrets {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// New content for a credentials file.
///
/// Debug output never includes raw text.
#[derive(Clone)]
pub enum Contents {
    /// An already-parsed mapping.
    Secrets(Secrets),
    /// JSON text, validated before anything is written.
    Raw(String),
}

impl Contents {
    /// Validate and produce the canonical plaintext that gets encrypted.
    pub fn canonicalize(&self) -> serde_json::Result<String> {
        match self {
            Self::Secrets(secrets) => secrets.to_pretty_json(),
            Self::Raw(text) => Secrets::from_json(text)?.to_pretty_json(),
        }
    }
}

impl fmt::Debug for Contents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Secrets(secrets) => f.debug_tuple("Secrets").field(secrets).finish(),
            Self::Raw(text) => f
                .debug_tuple("Raw")
                .field(&format_args!("[{} bytes]", text.len()))
                .finish(),
        }
    }
}

impl From<Secrets> for Contents {
    fn from(secrets: Secrets) -> Self {
        Self::Secrets(secrets)
    }
}

impl From<String> for Contents {
    fn from(text: String) -> Self {
        Self::Raw(text)
    }
}

impl From<&str> for Contents {
    fn from(text: &str) -> Self {
        Self::Raw(text.to_string())
    }
}
