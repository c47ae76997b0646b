//! # envcreds-core
//!
//! Shared building blocks for envcreds:
//!
//! - **Configuration**: the optional `envcreds.json5` project file
//! - **Environment**: process variable names and lookup helpers
//! - **Utilities**: path conventions and a zeroizing secret string

pub mod config;
pub mod env;
pub mod error;
pub mod paths;
pub mod secret;

pub use config::Config;
pub use error::ConfigError;
pub use secret::SecretString;
