use std::sync::Arc;

use tracing::debug;

use crate::config::{
    env::{EnvSource, ProcessEnv},
    ConfigPaths, FileConfig,
};
use crate::error::ConfigError;

/// Everything one run needs to reach its configuration.
///
/// Built once in `main` and passed down. The store is loaded on the first
/// [`ConfigContext::config`] call; the outcome, including a failure, is
/// kept for the rest of the run so the files are read at most once.
pub struct ConfigContext {
    paths: ConfigPaths,
    env: Arc<dyn EnvSource>,
    cached: Option<Result<FileConfig, ConfigError>>,
}

impl ConfigContext {
    /// Resolves paths from the process environment and working directory.
    pub fn from_env() -> Result<Self, ConfigError> {
        let env: Arc<dyn EnvSource> = Arc::new(ProcessEnv);
        let cwd = std::env::current_dir().map_err(|e| ConfigError::io("read working directory", ".", &e))?;
        let paths = ConfigPaths::resolve(env.as_ref(), &cwd)?;
        Ok(Self::with_paths(paths, env))
    }

    pub fn with_paths(paths: ConfigPaths, env: Arc<dyn EnvSource>) -> Self {
        Self {
            paths,
            env,
            cached: None,
        }
    }

    // ---------- public getters ----------

    pub fn paths(&self) -> &ConfigPaths {
        &self.paths
    }

    pub fn env(&self) -> &dyn EnvSource {
        self.env.as_ref()
    }

    /// The loaded store, loading it on first use.
    pub fn config(&mut self) -> Result<&mut FileConfig, ConfigError> {
        let paths = &self.paths;
        let env = &self.env;
        let cached = self.cached.get_or_insert_with(|| {
            debug!(dir = %paths.config_dir.display(), "loading config");
            FileConfig::load(paths.clone(), Arc::clone(env))
        });
        match cached {
            Ok(config) => Ok(config),
            Err(e) => Err(e.clone()),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.cached.is_some()
    }

    // ---------- dump ----------

    /// Human-readable summary of the resolved paths and the settings
    /// relevant to them. Token-like values are hidden when `redact` is set.
    pub fn debug_dump(&self, redact: bool) -> String {
        let mut out = String::new();

        out.push_str("glab-config context (debug)\n");
        out.push_str("===========================\n");

        out.push_str(&format!("config_dir: {}\n", self.paths.config_dir.display()));
        out.push_str(&format!("config_file: {}\n", self.paths.config_file().display()));
        out.push_str(&format!("aliases_file: {}\n", self.paths.aliases_file().display()));
        out.push_str(&format!("local_file: {}\n", self.paths.local_file().display()));
        out.push_str(&format!(
            "loaded: {}\n",
            match &self.cached {
                None => "no".to_string(),
                Some(Ok(_)) => "yes".to_string(),
                Some(Err(e)) => format!("failed ({e})"),
            }
        ));

        out.push_str("\nvars:\n");
        for name in DUMPED_VARS {
            let Some(value) = self.env.var(name) else {
                continue;
            };
            out.push_str(&format!("  {name} = {}\n", display_value(name, &value, redact)));
        }

        out
    }
}

const DUMPED_VARS: &[&str] = &[
    "GLAB_CONFIG_DIR",
    "XDG_CONFIG_HOME",
    "GLAB_LOG",
    "GITLAB_HOST",
    "GITLAB_URI",
    "GL_HOST",
    "GITLAB_API_HOST",
    "GITLAB_API_PROTOCOL",
    "GITLAB_TOKEN",
    "GITLAB_ACCESS_TOKEN",
    "OAUTH_TOKEN",
    "GLAB_EDITOR",
    "VISUAL",
    "EDITOR",
    "BROWSER",
    "GLAMOUR_STYLE",
    "GLAB_CHECK_UPDATE",
    "NO_PROMPT",
];

/// `value`, or `<redacted>` for secret-looking keys when `redact` is set.
pub fn display_value(key: &str, value: &str, redact: bool) -> String {
    if redact && looks_sensitive_key(key) && !value.is_empty() {
        "<redacted>".to_string()
    } else {
        value.to_string()
    }
}

pub fn looks_sensitive_key(k: &str) -> bool {
    let u = k.to_ascii_uppercase();
    u.contains("TOKEN") || u.contains("SECRET") || u.contains("PASSWORD") || u.contains("PRIVATE")
}
