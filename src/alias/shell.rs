// src/alias/shell.rs
use std::{
    env,
    path::{Path, PathBuf},
};

use crate::config::env::EnvSource;
use crate::error::AliasError;

/// Locates `sh` for shell aliases. On Windows, falls back to the `sh.exe`
/// shipped next to Git for Windows.
pub fn find_sh(vars: &dyn EnvSource) -> Result<PathBuf, AliasError> {
    if let Some(sh) = look_path(vars, "sh") {
        return Ok(sh);
    }

    if cfg!(windows) {
        // <git>/cmd/git.exe -> <git>/bin/sh.exe
        let bundled = look_path(vars, "git")
            .and_then(|git| git.parent()?.parent().map(|root| root.join("bin").join("sh.exe")))
            .filter(|sh| sh.is_file());
        return bundled.ok_or(AliasError::ShellNotFoundWindows);
    }

    Err(AliasError::ShellNotFound)
}

/// Resolves `cmd` against `PATH` the way a shell would.
pub fn look_path(vars: &dyn EnvSource, cmd: &str) -> Option<PathBuf> {
    // If it contains a path separator, treat as a path.
    if cmd.contains('/') || cmd.contains('\\') {
        let path = PathBuf::from(cmd);
        return is_executable(&path).then_some(path);
    }

    let path_val = vars.var("PATH").or_else(|| vars.var("Path"))?;
    let exts = if cfg!(windows) {
        pathext_list(vars)
    } else {
        Vec::new()
    };

    for dir in env::split_paths(&path_val).filter(|d| !d.as_os_str().is_empty()) {
        if cfg!(windows) && !cmd.contains('.') {
            // ext comes with leading dot (".exe")
            for ext in &exts {
                let candidate = dir.join(format!("{cmd}{ext}"));
                if candidate.is_file() {
                    return Some(candidate);
                }
            }
            continue;
        }

        let candidate = dir.join(cmd);
        if is_executable(&candidate) {
            return Some(candidate);
        }
    }

    None
}

fn pathext_list(vars: &dyn EnvSource) -> Vec<String> {
    // Prefer PATHEXT, else common defaults.
    let raw = vars
        .var("PATHEXT")
        .unwrap_or_else(|| ".COM;.EXE;.BAT;.CMD".to_string());

    let mut out = Vec::new();
    for part in raw.split(';') {
        let p = part.trim();
        if p.is_empty() {
            continue;
        }
        let mut p = p.to_string();
        if !p.starts_with('.') {
            p.insert(0, '.');
        }
        out.push(p.to_ascii_lowercase());
    }

    if out.is_empty() {
        out = [".com", ".exe", ".bat", ".cmd"].map(String::from).to_vec();
    }

    out
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
