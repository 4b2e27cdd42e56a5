// src/config/migrate.rs
//! Rewrites the old config layout, where every host mapped to a one-element
//! list (`gitlab.com: [{token: ...}]`), into the current `hosts:` layout.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_yaml::Value;
use tracing::{info, warn};

use super::{
    document::Document,
    env::EnvSource,
    file::{read_document, FileConfig},
    keys::{default_document, DEFAULT_HOSTNAME},
    paths::{backup_config_file, read_config_file, ConfigPaths},
    ConfigStore,
};
use crate::error::ConfigError;

/// Legacy files keyed the default host at the top level with a list value.
pub fn is_legacy(text: &str) -> bool {
    serde_yaml::from_str::<Value>(text)
        .ok()
        .and_then(|root| root.get(DEFAULT_HOSTNAME).map(Value::is_sequence))
        .unwrap_or(false)
}

/// Migrates the main config file in place when it has the legacy shape.
///
/// The original is renamed to `config.yml.bak` before the new file is
/// written, and the returned document is parsed back from disk.
pub(crate) fn migrate_if_legacy(
    paths: &ConfigPaths,
    env: Arc<dyn EnvSource>,
) -> Result<Option<Document>, ConfigError> {
    let path = paths.config_file();
    let text = match read_config_file(&path) {
        Ok(text) => text,
        Err(e) if e.is_not_exist() => return Ok(None),
        Err(e) => return Err(e),
    };
    if !is_legacy(&text) {
        return Ok(None);
    }

    info!(path = %path.display(), "migrating legacy config layout");

    let legacy: IndexMap<String, Value> = serde_yaml::from_str(&text)
        .map_err(|e| ConfigError::migration(&path, format!("error decoding legacy format: {e}")))?;

    let mut config = FileConfig::from_document(default_document(), paths.clone(), env);
    for (name, value) in &legacy {
        let (hostname, settings) = match value {
            // only the first mapping of the list was ever used
            Value::Sequence(items) => match items.first().and_then(Value::as_mapping) {
                Some(settings) => (name.as_str(), settings),
                None => continue,
            },
            other => match scalar_text(other) {
                Some(text) => {
                    config
                        .set("", name, &text)
                        .map_err(|e| ConfigError::migration(&path, e.to_string()))?;
                    continue;
                }
                None => {
                    warn!(key = %name, "skipping non-scalar legacy entry");
                    continue;
                }
            },
        };

        for (key, value) in settings {
            let (Some(key), Some(value)) = (key.as_str(), scalar_text(value)) else {
                warn!(hostname, "skipping non-scalar legacy host setting");
                continue;
            };
            config
                .set(hostname, key, &value)
                .map_err(|e| ConfigError::migration(&path, e.to_string()))?;
        }
    }

    backup_config_file(&path, &paths.backup_file())
        .map_err(|e| ConfigError::migration(&path, e.to_string()))?;
    config.write()?;

    read_document(&path).map(Some)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::env::EnvMap;
    use std::fs;

    const LEGACY: &str = "\
gitlab.com:
    - token: abc123
      git_protocol: https
gitlab.example.org:
    - oauth_token: xyz
      api_protocol: http
";

    #[test]
    fn test_detects_legacy_shape() {
        assert!(is_legacy(LEGACY));
        assert!(!is_legacy("hosts:\n    gitlab.com:\n        token: abc\n"));
        assert!(!is_legacy("gitlab.com: plain\n"));
        assert!(!is_legacy("- not a mapping\n"));
    }

    #[test]
    fn test_migration_keeps_backup_and_values() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = ConfigPaths::new(tmp.path(), tmp.path());
        fs::write(paths.config_file(), LEGACY).unwrap();

        let doc = migrate_if_legacy(&paths, Arc::new(EnvMap::new()))
            .unwrap()
            .unwrap();

        assert_eq!(fs::read_to_string(paths.backup_file()).unwrap(), LEGACY);

        let config = FileConfig::from_document(doc, paths.clone(), Arc::new(EnvMap::new()));
        assert_eq!(config.get("gitlab.com", "token").unwrap(), "abc123");
        assert_eq!(config.get("gitlab.com", "git_protocol").unwrap(), "https");
        assert_eq!(config.get("gitlab.example.org", "oauth_token").unwrap(), "xyz");
        assert_eq!(config.get("gitlab.example.org", "api_protocol").unwrap(), "http");
        assert_eq!(config.hosts().unwrap(), ["gitlab.com", "gitlab.example.org"]);

        // second run sees the new layout and leaves it alone
        assert!(migrate_if_legacy(&paths, Arc::new(EnvMap::new())).unwrap().is_none());
    }

    #[test]
    fn test_existing_backup_blocks_migration() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = ConfigPaths::new(tmp.path(), tmp.path());
        fs::write(paths.config_file(), LEGACY).unwrap();
        fs::write(paths.backup_file(), "earlier backup\n").unwrap();

        let err = migrate_if_legacy(&paths, Arc::new(EnvMap::new())).unwrap_err();
        assert!(matches!(err, ConfigError::Migration { .. }));
        assert!(err.to_string().contains("already exists"));
        assert_eq!(fs::read_to_string(paths.backup_file()).unwrap(), "earlier backup\n");
        assert_eq!(fs::read_to_string(paths.config_file()).unwrap(), LEGACY);
    }

    #[test]
    fn test_current_layout_is_untouched() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = ConfigPaths::new(tmp.path(), tmp.path());
        fs::write(paths.config_file(), "editor: vim\n").unwrap();

        assert!(migrate_if_legacy(&paths, Arc::new(EnvMap::new())).unwrap().is_none());
        assert!(!paths.backup_file().exists());
    }
}
