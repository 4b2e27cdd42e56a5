// src/config/mod.rs

use std::path::PathBuf;

use crate::alias::{self, Expansion};
use crate::error::{AliasError, ConfigError};

pub mod aliases;
pub mod document;
pub mod emit;
pub mod env;
pub mod file;
pub mod keys;
pub mod memory;
pub mod migrate;
pub mod parse;
pub mod paths;
pub mod scope;

pub use aliases::{is_shell_alias, AliasMap};
pub use document::{Document, Entry, NodeId, NodeKind, ScalarStyle};
pub use env::{EnvMap, EnvSource, ProcessEnv};
pub use file::FileConfig;
pub use keys::{canonical_key, default_value, DEFAULT_HOSTNAME};
pub use memory::MemoryConfig;
pub use parse::SyntaxError;
pub use paths::ConfigPaths;
pub use scope::{HostConfig, ScopeKind, ScopeView, SettingsScope};

/// Resolves `sh` for shell aliases.
pub type FindShell<'a> = &'a dyn Fn() -> Result<PathBuf, AliasError>;

/// What the command front end sees of the configuration.
///
/// Lookup order for [`ConfigStore::get`]: environment, host, local, global,
/// compiled default. Only the first step lives here; stores implement the
/// rest in [`ConfigStore::get_with_source`].
pub trait ConfigStore {
    fn env(&self) -> &dyn EnvSource;

    /// Value and the file it came from, ignoring the environment.
    fn get_with_source(&self, hostname: &str, key: &str) -> Result<(String, PathBuf), ConfigError>;

    /// Writes the global value, or the host value when `hostname` is set.
    /// Never touches the local scope.
    fn set(&mut self, hostname: &str, key: &str, value: &str) -> Result<(), ConfigError>;

    /// Configured hosts, default hostname first. Fails when no `hosts`
    /// entry exists at all.
    fn hosts(&self) -> Result<Vec<String>, ConfigError>;

    fn unset_host(&mut self, hostname: &str);

    fn aliases(&mut self) -> Result<Box<dyn SettingsScope + '_>, ConfigError>;

    fn local(&mut self) -> Result<Box<dyn SettingsScope + '_>, ConfigError>;

    /// Persists the main file; `aliases` and `local` are left to their scopes.
    fn write(&self) -> Result<(), ConfigError>;

    fn get(&self, hostname: &str, key: &str) -> Result<String, ConfigError> {
        let key = canonical_key(key);
        if let Some(value) = env::first_non_empty(self.env(), keys::env_names(key)) {
            return Ok(value);
        }
        self.get_with_source(hostname, key).map(|(value, _)| value)
    }

    /// The main file, then the alias file. Local settings are written as they change.
    fn write_all(&mut self) -> Result<(), ConfigError> {
        self.write()?;
        self.aliases()?.write()
    }

    /// Rewrites `argv` through the alias table.
    fn expand_alias(&mut self, argv: &[String], find_shell: FindShell<'_>) -> Result<Expansion, AliasError> {
        let table = self.aliases()?.all();
        alias::expand(argv, |name| table.get(name).cloned(), find_shell)
    }
}
