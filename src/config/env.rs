// src/config/env.rs
use std::collections::BTreeMap;

pub type EnvMap = BTreeMap<String, String>;

/// Read access to environment variables.
pub trait EnvSource {
    fn var(&self, name: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvSource for EnvMap {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// First variable in `names` holding a non-empty value.
pub fn first_non_empty(env: &dyn EnvSource, names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| env.var(name))
        .find(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_non_empty_skips_blank() {
        let env: EnvMap = [
            ("GITLAB_TOKEN".to_string(), String::new()),
            ("OAUTH_TOKEN".to_string(), "t0k".to_string()),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            first_non_empty(&env, &["GITLAB_TOKEN", "GITLAB_ACCESS_TOKEN", "OAUTH_TOKEN"]),
            Some("t0k".to_string())
        );
        assert_eq!(first_non_empty(&env, &["GITLAB_TOKEN"]), None);
    }
}
