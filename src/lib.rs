pub mod alias;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;

// Convenience re-exports
pub use alias::{expand, Expansion};
pub use config::{ConfigPaths, ConfigStore, Document, FileConfig, MemoryConfig, SettingsScope};
pub use context::ConfigContext;
pub use error::{AliasError, ConfigError, ValidationError};
