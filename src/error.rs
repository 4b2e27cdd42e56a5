//! Error types for the configuration store and alias expansion.

use std::{io, path::PathBuf};

use crate::alias::words::WordsError;
use crate::config::parse::SyntaxError;

/// Errors raised while loading, querying or persisting configuration.
///
/// `Clone` so a memoized load failure can be reported more than once.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("{what} not found: {name}")]
    NotFound { what: &'static str, name: String },

    #[error("config file does not exist: {}", path.display())]
    NotExist { path: PathBuf },

    #[error("failed to {op} {}: {message}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        kind: io::ErrorKind,
        message: String,
    },

    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: SyntaxError,
    },

    #[error("{} is not a directory; remove or rename it", path.display())]
    Path { path: PathBuf },

    #[error("failed to migrate legacy config {}: {message}", path.display())]
    Migration { path: PathBuf, message: String },

    #[error("could not parse hosts config: {0}")]
    Hosts(String),

    #[error("cannot set {key}: existing value is not a {expected}")]
    InvalidNode { key: String, expected: &'static str },

    #[error("could not determine a config directory (set GLAB_CONFIG_DIR)")]
    NoConfigDir,
}

impl ConfigError {
    pub fn not_found(what: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            what,
            name: name.into(),
        }
    }

    /// Maps an I/O failure, turning `NotFound` into [`ConfigError::NotExist`].
    pub fn io(op: &'static str, path: impl Into<PathBuf>, err: &io::Error) -> Self {
        let path = path.into();
        if err.kind() == io::ErrorKind::NotFound {
            return Self::NotExist { path };
        }
        Self::Io {
            op,
            path,
            kind: err.kind(),
            message: err.to_string(),
        }
    }

    pub fn migration(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Migration {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn is_not_exist(&self) -> bool {
        matches!(self, Self::NotExist { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Errors raised while rewriting an invocation through the alias table.
#[derive(Debug, thiserror::Error)]
pub enum AliasError {
    #[error("not enough arguments for alias: {0}")]
    NotEnoughArguments(String),

    #[error("could not parse alias expansion {expansion:?}: {source}")]
    Tokenize {
        expansion: String,
        #[source]
        source: WordsError,
    },

    #[error("unable to locate sh to execute the shell alias with. The sh.exe interpreter is typically distributed with Git for Windows.")]
    ShellNotFoundWindows,

    #[error("unable to locate sh to execute shell alias with")]
    ShellNotFound,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Rejections raised when a new alias is defined.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("could not create alias: {0:?} is already a command")]
    CommandCollision(String),

    #[error("could not create alias: {0} does not correspond to a command")]
    UnknownCommand(String),

    #[error("could not create alias: {0}")]
    Tokenize(#[from] WordsError),
}
