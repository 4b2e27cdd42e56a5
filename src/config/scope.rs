// src/config/scope.rs
//! Views over one mapping of the document: a host, the alias table, or the
//! repository-local settings.

use std::path::PathBuf;

use indexmap::IndexMap;
use tracing::debug;

use super::{
    document::{Document, NodeId},
    keys::canonical_key,
    paths::write_config_file,
};
use crate::error::ConfigError;

/// Contract shared by the alias and local scopes.
pub trait SettingsScope {
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` and persists the scope.
    fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError>;

    /// Removes `key` and persists the scope; `NotFound` when it is absent.
    fn delete(&mut self, key: &str) -> Result<(), ConfigError>;

    /// Ordered snapshot of every scalar entry.
    fn all(&self) -> IndexMap<String, String>;

    fn write(&self) -> Result<(), ConfigError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Aliases,
    Local,
}

impl ScopeKind {
    /// Top-level key the scope is merged under.
    pub fn key(self) -> &'static str {
        match self {
            ScopeKind::Aliases => "aliases",
            ScopeKind::Local => "local",
        }
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            ScopeKind::Aliases => "alias",
            ScopeKind::Local => "local setting",
        }
    }

    /// Alias names are kept verbatim; local keys accept every spelling.
    pub fn normalize(self, key: &str) -> &str {
        match self {
            ScopeKind::Aliases => key,
            ScopeKind::Local => canonical_key(key),
        }
    }
}

/// First value wins for repeated keys, like [`Document::find_entry`].
pub(crate) fn snapshot(doc: &Document, map: NodeId) -> IndexMap<String, String> {
    let mut out = IndexMap::new();
    for (k, v) in doc.entries(map) {
        if let (Some(key), Some(value)) = (doc.scalar(*k), doc.scalar(*v)) {
            out.entry(key.to_string())
                .or_insert_with(|| value.to_string());
        }
    }
    out
}

// ---------- alias / local ----------

/// A scope backed by a mapping of the merged document and written to its own file.
pub struct ScopeView<'a> {
    doc: &'a mut Document,
    map: NodeId,
    file: PathBuf,
    kind: ScopeKind,
}

impl<'a> ScopeView<'a> {
    pub(crate) fn new(doc: &'a mut Document, map: NodeId, file: PathBuf, kind: ScopeKind) -> Self {
        Self {
            doc,
            map,
            file,
            kind,
        }
    }

    pub fn kind(&self) -> ScopeKind {
        self.kind
    }
}

impl SettingsScope for ScopeView<'_> {
    fn get(&self, key: &str) -> Option<String> {
        self.doc
            .get_str(self.map, self.kind.normalize(key))
            .map(str::to_string)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let key = self.kind.normalize(key);
        self.doc.set_string_value(self.map, key, value)?;
        debug!(scope = self.kind.key(), key, "set");
        self.write()
    }

    fn delete(&mut self, key: &str) -> Result<(), ConfigError> {
        let key = self.kind.normalize(key);
        if self.doc.remove_entry(self.map, key).is_none() {
            return Err(ConfigError::not_found(self.kind.label(), key));
        }
        debug!(scope = self.kind.key(), key, "deleted");
        self.write()
    }

    fn all(&self) -> IndexMap<String, String> {
        snapshot(self.doc, self.map)
    }

    fn write(&self) -> Result<(), ConfigError> {
        write_config_file(&self.file, &self.doc.encode(self.map, &[]))
    }
}

// ---------- host ----------

/// Settings of one hostname under `hosts`. Changes are persisted by the
/// owning config's `write`.
pub struct HostConfig<'a> {
    doc: &'a mut Document,
    map: NodeId,
    hostname: String,
}

impl<'a> HostConfig<'a> {
    pub(crate) fn new(doc: &'a mut Document, map: NodeId, hostname: &str) -> Self {
        Self {
            doc,
            map,
            hostname: hostname.to_string(),
        }
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.doc
            .get_str(self.map, canonical_key(key))
            .map(str::to_string)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.doc
            .set_string_value(self.map, canonical_key(key), value)?;
        Ok(())
    }

    pub fn all(&self) -> IndexMap<String, String> {
        snapshot(self.doc, self.map)
    }
}
