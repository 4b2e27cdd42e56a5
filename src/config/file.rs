// src/config/file.rs
//! The YAML-backed store: one merged [`Document`] persisted as three files.

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

use tracing::{debug, info};

use super::{
    document::Document,
    env::EnvSource,
    keys::{canonical_key, default_document, default_value, order_hosts},
    migrate,
    paths::{read_config_file, write_config_file, ConfigPaths},
    scope::{HostConfig, ScopeKind, ScopeView, SettingsScope},
    ConfigStore,
};
use crate::error::ConfigError;

pub struct FileConfig {
    doc: Document,
    paths: ConfigPaths,
    env: Arc<dyn EnvSource>,
}

impl fmt::Debug for FileConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileConfig")
            .field("paths", &self.paths)
            .finish_non_exhaustive()
    }
}

impl FileConfig {
    /// Loads the main file (migrating or bootstrapping it first when needed)
    /// and merges the alias and local files under `aliases` and `local`.
    pub fn load(paths: ConfigPaths, env: Arc<dyn EnvSource>) -> Result<Self, ConfigError> {
        let doc = match migrate::migrate_if_legacy(&paths, Arc::clone(&env))? {
            Some(doc) => doc,
            None => load_main(&paths.config_file())?,
        };

        let aliases_file = paths.aliases_file();
        let local_file = paths.local_file();
        let mut config = Self::from_document(doc, paths, env);
        config.merge_file(ScopeKind::Aliases, &aliases_file)?;
        config.merge_file(ScopeKind::Local, &local_file)?;

        debug!(dir = %config.paths.config_dir.display(), "loaded config");
        Ok(config)
    }

    /// Wraps an already parsed document; nothing is read from disk.
    pub fn from_document(doc: Document, paths: ConfigPaths, env: Arc<dyn EnvSource>) -> Self {
        Self { doc, paths, env }
    }

    fn merge_file(&mut self, kind: ScopeKind, path: &Path) -> Result<(), ConfigError> {
        let part = match read_document(path) {
            Ok(part) => part,
            Err(e) if e.is_not_exist() => return Ok(()),
            Err(e) => return Err(e),
        };
        let node = self.doc.graft(&part, part.root());
        let root = self.doc.root();
        self.doc.splice_value(root, kind.key(), node);
        debug!(scope = kind.key(), path = %path.display(), "merged scope file");
        Ok(())
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn paths(&self) -> &ConfigPaths {
        &self.paths
    }

    /// Host scope for `hostname`, creating `hosts` and the host entry on demand.
    pub fn host(&mut self, hostname: &str) -> Result<HostConfig<'_>, ConfigError> {
        let root = self.doc.root();
        let hosts = self.doc.ensure_mapping(root, "hosts")?;
        let host = self.doc.ensure_mapping(hosts, hostname)?;
        Ok(HostConfig::new(&mut self.doc, host, hostname))
    }

    fn host_value(&self, hostname: &str, key: &str) -> Option<&str> {
        let root = self.doc.root();
        let hosts = self.doc.find_entry(root, "hosts")?.value;
        let host = self.doc.find_entry(hosts, hostname)?.value;
        self.doc.get_str(host, key)
    }

    fn scope(&mut self, kind: ScopeKind) -> Result<ScopeView<'_>, ConfigError> {
        let root = self.doc.root();
        let map = self.doc.ensure_mapping(root, kind.key())?;
        let file = match kind {
            ScopeKind::Aliases => self.paths.aliases_file(),
            ScopeKind::Local => self.paths.local_file(),
        };
        Ok(ScopeView::new(&mut self.doc, map, file, kind))
    }

    fn global_value(&self, key: &str) -> Option<&str> {
        self.doc.get_str(self.doc.root(), key)
    }

    fn local_value(&self, key: &str) -> Option<&str> {
        let local = self.doc.find_entry(self.doc.root(), ScopeKind::Local.key())?;
        self.doc.get_str(local.value, key)
    }
}

impl ConfigStore for FileConfig {
    fn env(&self) -> &dyn EnvSource {
        self.env.as_ref()
    }

    fn get_with_source(&self, hostname: &str, key: &str) -> Result<(String, PathBuf), ConfigError> {
        let key = canonical_key(key);
        let main = self.paths.config_file();

        // empty values at any scope fall through to the next one
        if !hostname.is_empty() {
            if let Some(value) = self.host_value(hostname, key).filter(|v| !v.is_empty()) {
                return Ok((value.to_string(), main));
            }
        }

        if let Some(value) = self.local_value(key).filter(|v| !v.is_empty()) {
            return Ok((value.to_string(), self.paths.local_file()));
        }
        if let Some(value) = self.global_value(key).filter(|v| !v.is_empty()) {
            return Ok((value.to_string(), main));
        }

        Ok((default_value(key).to_string(), main))
    }

    fn set(&mut self, hostname: &str, key: &str, value: &str) -> Result<(), ConfigError> {
        let key = canonical_key(key);
        if hostname.is_empty() {
            let root = self.doc.root();
            self.doc.set_string_value(root, key, value)?;
        } else {
            self.host(hostname)?.set(key, value)?;
        }
        debug!(hostname, key, "set config value");
        Ok(())
    }

    fn hosts(&self) -> Result<Vec<String>, ConfigError> {
        let root = self.doc.root();
        let Some(entry) = self.doc.find_entry(root, "hosts") else {
            return Err(ConfigError::Hosts("no hosts entry".to_string()));
        };

        if !self.doc.is_mapping(entry.value) {
            return match self.doc.scalar(entry.value) {
                Some("") => Ok(order_hosts(Vec::new())),
                _ => Err(ConfigError::Hosts("hosts is not a mapping".to_string())),
            };
        }

        Ok(order_hosts(self.doc.keys(entry.value).map(str::to_string)))
    }

    fn unset_host(&mut self, hostname: &str) {
        if hostname.is_empty() {
            return;
        }
        let root = self.doc.root();
        let Some(hosts) = self.doc.find_entry(root, "hosts") else {
            return;
        };
        if self.doc.remove_entry(hosts.value, hostname).is_some() {
            debug!(hostname, "removed host entry");
        }
    }

    fn aliases(&mut self) -> Result<Box<dyn SettingsScope + '_>, ConfigError> {
        Ok(Box::new(self.scope(ScopeKind::Aliases)?))
    }

    fn local(&mut self) -> Result<Box<dyn SettingsScope + '_>, ConfigError> {
        Ok(Box::new(self.scope(ScopeKind::Local)?))
    }

    fn write(&self) -> Result<(), ConfigError> {
        let text = self.doc.encode(
            self.doc.root(),
            &[ScopeKind::Aliases.key(), ScopeKind::Local.key()],
        );
        write_config_file(&self.paths.config_file(), &text)
    }
}

// -------------------- helpers --------------------

pub(crate) fn read_document(path: &Path) -> Result<Document, ConfigError> {
    let text = read_config_file(path)?;
    Document::parse(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads the main file, writing the defaults first when it does not exist.
fn load_main(path: &Path) -> Result<Document, ConfigError> {
    match read_document(path) {
        Ok(doc) => Ok(doc),
        Err(e) if e.is_not_exist() => {
            info!(path = %path.display(), "no config file found, writing defaults");
            let defaults = default_document();
            write_config_file(path, &defaults.encode(defaults.root(), &[]))?;
            read_document(path)
        }
        Err(e) => Err(e),
    }
}
