// src/config/paths.rs
use std::{
    ffi::OsString,
    fs,
    io::{self, Write as _},
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use super::env::EnvSource;
use crate::error::ConfigError;

/// Where the three physical files live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    pub config_dir: PathBuf,
    pub local_dir: PathBuf,
}

impl ConfigPaths {
    pub fn new(config_dir: impl Into<PathBuf>, repo_root: impl AsRef<Path>) -> Self {
        Self {
            config_dir: config_dir.into(),
            local_dir: repo_root.as_ref().join(".glab-cli").join("config"),
        }
    }

    /// Config directory precedence:
    /// 1) GLAB_CONFIG_DIR
    /// 2) XDG_CONFIG_HOME/glab-cli
    /// 3) ~/.config/glab-cli
    ///
    /// The local directory hangs off the repository containing `cwd`.
    pub fn resolve(env: &dyn EnvSource, cwd: &Path) -> Result<Self, ConfigError> {
        Ok(Self::new(config_dir(env)?, find_repo_root(cwd)))
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.yml")
    }

    pub fn aliases_file(&self) -> PathBuf {
        self.config_dir.join("aliases.yml")
    }

    pub fn local_file(&self) -> PathBuf {
        self.local_dir.join("config.yml")
    }

    /// `config.yml.bak`, where a migrated legacy file is kept.
    pub fn backup_file(&self) -> PathBuf {
        let mut name = OsString::from(self.config_file());
        name.push(".bak");
        PathBuf::from(name)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn config_dir(env: &dyn EnvSource) -> Result<PathBuf, ConfigError> {
    if let Some(dir) = non_empty(env.var("GLAB_CONFIG_DIR")) {
        return Ok(PathBuf::from(dir));
    }
    if let Some(xdg) = non_empty(env.var("XDG_CONFIG_HOME")) {
        return Ok(PathBuf::from(xdg).join("glab-cli"));
    }
    dirs::home_dir()
        .map(|home| home.join(".config").join("glab-cli"))
        .ok_or(ConfigError::NoConfigDir)
}

/// Nearest ancestor of `cwd` holding a `.git` entry, else `cwd` itself.
pub fn find_repo_root(cwd: &Path) -> PathBuf {
    cwd.ancestors()
        .find(|dir| dir.join(".git").exists())
        .unwrap_or(cwd)
        .to_path_buf()
}

/// Fails with [`ConfigError::Path`] when the closest existing ancestor of
/// `dir` is not a directory.
pub fn check_dir_path(dir: &Path) -> Result<(), ConfigError> {
    for ancestor in dir.ancestors() {
        match fs::metadata(ancestor) {
            Ok(meta) if meta.is_dir() => return Ok(()),
            Ok(_) => {
                return Err(ConfigError::Path {
                    path: ancestor.to_path_buf(),
                })
            }
            Err(_) => continue,
        }
    }
    Ok(())
}

fn parent_dir(path: &Path) -> &Path {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."))
}

pub fn read_config_file(path: &Path) -> Result<String, ConfigError> {
    check_dir_path(parent_dir(path))?;
    fs::read_to_string(path).map_err(|e| ConfigError::io("read", path, &e))
}

/// Writes `contents` to a temp file next to `path` and renames it into place.
pub fn write_config_file(path: &Path, contents: &str) -> Result<(), ConfigError> {
    let dir = parent_dir(path);
    check_dir_path(dir)?;
    fs::create_dir_all(dir).map_err(|e| ConfigError::io("create directory", dir, &e))?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| ConfigError::io("create temp file in", dir, &e))?;
    tmp.write_all(contents.as_bytes())
        .and_then(|()| tmp.flush())
        .map_err(|e| ConfigError::io("write", path, &e))?;
    tmp.persist(path)
        .map_err(|e| ConfigError::io("replace", path, &e.error))?;

    debug!(path = %path.display(), bytes = contents.len(), "wrote config file");
    Ok(())
}

/// Renames `path` to `backup`; the original bytes are never rewritten.
/// An existing backup is never replaced.
pub fn backup_config_file(path: &Path, backup: &Path) -> Result<(), ConfigError> {
    if fs::symlink_metadata(backup).is_ok() {
        let exists = io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists", backup.display()),
        );
        return Err(ConfigError::io("back up", path, &exists));
    }
    fs::rename(path, backup).map_err(|e| ConfigError::io("back up", path, &e))?;
    warn!(from = %path.display(), to = %backup.display(), "backed up config file");
    Ok(())
}
