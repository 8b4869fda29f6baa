//! Error types
//!
//! None of these escape the mount/render/unmount path: compile failures are
//! logged and turned into the "no sheet" state there.

use std::path::PathBuf;
use thiserror::Error;

/// The compiler declined a definition
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("style key must not be empty")]
    EmptyKey,

    #[error("invalid property '{property}' in rule '{key}'")]
    InvalidProperty { key: String, property: String },

    #[error("nested selector '{selector}' in rule '{key}' must reference the parent with '&'")]
    InvalidSelector { key: String, selector: String },

    #[error("duplicate style key '{0}'")]
    DuplicateKey(String),
}

/// Failure loading a [`ContextConfig`](crate::config::ContextConfig)
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),
}

/// Failure loading a [`StyleModule`](crate::module::StyleModule)
#[derive(Error, Debug)]
pub enum ModuleError {
    #[error("Failed to read style module {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse style module: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid rule '{key}': {message}")]
    InvalidRule { key: String, message: String },
}
