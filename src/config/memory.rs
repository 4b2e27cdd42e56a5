// src/config/memory.rs
//! In-memory store with the same contract as [`FileConfig`](super::FileConfig).

use std::path::PathBuf;

use indexmap::IndexMap;

use super::{
    env::{EnvMap, EnvSource},
    keys::{canonical_key, default_value, order_hosts},
    scope::{ScopeKind, SettingsScope},
    ConfigStore,
};
use crate::error::ConfigError;

const SOURCE: &str = "<memory>";

type Settings = IndexMap<String, String>;

#[derive(Debug, Default)]
pub struct MemoryConfig {
    env: EnvMap,
    global: Settings,
    hosts: Option<IndexMap<String, Settings>>,
    aliases: Settings,
    local: Settings,
}

impl MemoryConfig {
    pub fn new(env: EnvMap) -> Self {
        Self {
            env,
            ..Self::default()
        }
    }

    /// Seeds the alias table without going through a scope.
    pub fn with_alias(mut self, name: &str, expansion: &str) -> Self {
        self.aliases.insert(name.to_string(), expansion.to_string());
        self
    }
}

impl ConfigStore for MemoryConfig {
    fn env(&self) -> &dyn EnvSource {
        &self.env
    }

    fn get_with_source(&self, hostname: &str, key: &str) -> Result<(String, PathBuf), ConfigError> {
        let key = canonical_key(key);

        if !hostname.is_empty() {
            let host_value = self
                .hosts
                .as_ref()
                .and_then(|hosts| hosts.get(hostname))
                .and_then(|host| host.get(key))
                .filter(|v| !v.is_empty());
            if let Some(value) = host_value {
                return Ok((value.clone(), PathBuf::from(SOURCE)));
            }
        }

        let found = [&self.local, &self.global]
            .into_iter()
            .find_map(|scope| scope.get(key).filter(|v| !v.is_empty()));

        let value = found.map_or_else(|| default_value(key).to_string(), String::clone);
        Ok((value, PathBuf::from(SOURCE)))
    }

    fn set(&mut self, hostname: &str, key: &str, value: &str) -> Result<(), ConfigError> {
        let key = canonical_key(key).to_string();
        if hostname.is_empty() {
            self.global.insert(key, value.to_string());
        } else {
            self.hosts
                .get_or_insert_with(IndexMap::new)
                .entry(hostname.to_string())
                .or_default()
                .insert(key, value.to_string());
        }
        Ok(())
    }

    fn hosts(&self) -> Result<Vec<String>, ConfigError> {
        let hosts = self
            .hosts
            .as_ref()
            .ok_or_else(|| ConfigError::Hosts("no hosts entry".to_string()))?;
        Ok(order_hosts(hosts.keys().cloned()))
    }

    fn unset_host(&mut self, hostname: &str) {
        if let Some(hosts) = self.hosts.as_mut() {
            hosts.shift_remove(hostname);
        }
    }

    fn aliases(&mut self) -> Result<Box<dyn SettingsScope + '_>, ConfigError> {
        Ok(Box::new(MemoryScope {
            map: &mut self.aliases,
            kind: ScopeKind::Aliases,
        }))
    }

    fn local(&mut self) -> Result<Box<dyn SettingsScope + '_>, ConfigError> {
        Ok(Box::new(MemoryScope {
            map: &mut self.local,
            kind: ScopeKind::Local,
        }))
    }

    fn write(&self) -> Result<(), ConfigError> {
        Ok(())
    }
}

struct MemoryScope<'a> {
    map: &'a mut Settings,
    kind: ScopeKind,
}

impl SettingsScope for MemoryScope<'_> {
    fn get(&self, key: &str) -> Option<String> {
        self.map.get(self.kind.normalize(key)).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let key = self.kind.normalize(key).to_string();
        self.map.insert(key, value.to_string());
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<(), ConfigError> {
        let key = self.kind.normalize(key);
        match self.map.shift_remove(key) {
            Some(_) => Ok(()),
            None => Err(ConfigError::not_found(self.kind.label(), key)),
        }
    }

    fn all(&self) -> IndexMap<String, String> {
        self.map.clone()
    }

    fn write(&self) -> Result<(), ConfigError> {
        Ok(())
    }
}
