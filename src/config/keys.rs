// src/config/keys.rs
//! Setting names: accepted spellings, environment names and compiled defaults.

use super::document::Document;

/// Host assumed when none is configured.
pub const DEFAULT_HOSTNAME: &str = "gitlab.com";

struct KeySpec {
    canonical: &'static str,
    spellings: &'static [&'static str],
    env: &'static [&'static str],
    default: &'static str,
}

const KEYS: &[KeySpec] = &[
    KeySpec {
        canonical: "token",
        spellings: &["gitlab_token", "oauth_token"],
        env: &["GITLAB_TOKEN", "GITLAB_ACCESS_TOKEN", "OAUTH_TOKEN"],
        default: "",
    },
    KeySpec {
        canonical: "host",
        spellings: &["gitlab_host", "gitlab_uri"],
        env: &["GITLAB_HOST", "GITLAB_URI", "GL_HOST"],
        default: DEFAULT_HOSTNAME,
    },
    KeySpec {
        canonical: "api_host",
        spellings: &["gitlab_api_host"],
        env: &["GITLAB_API_HOST"],
        default: "",
    },
    KeySpec {
        canonical: "api_protocol",
        spellings: &[],
        env: &["GITLAB_API_PROTOCOL"],
        default: "https",
    },
    KeySpec {
        canonical: "git_protocol",
        spellings: &[],
        env: &[],
        default: "ssh",
    },
    KeySpec {
        canonical: "editor",
        spellings: &[],
        env: &["GLAB_EDITOR", "VISUAL", "EDITOR"],
        default: "",
    },
    KeySpec {
        canonical: "browser",
        spellings: &[],
        env: &["BROWSER"],
        default: "",
    },
    KeySpec {
        canonical: "glamour_style",
        spellings: &[],
        env: &["GLAMOUR_STYLE"],
        default: "dark",
    },
    KeySpec {
        canonical: "check_update",
        spellings: &[],
        env: &["GLAB_CHECK_UPDATE"],
        default: "true",
    },
    KeySpec {
        canonical: "no_prompt",
        spellings: &[],
        env: &["NO_PROMPT"],
        default: "false",
    },
    KeySpec {
        canonical: "ca_cert",
        spellings: &[],
        env: &[],
        default: "",
    },
    KeySpec {
        canonical: "skip_tls_verify",
        spellings: &[],
        env: &[],
        default: "false",
    },
];

fn spec(key: &str) -> Option<&'static KeySpec> {
    KEYS.iter()
        .find(|k| k.canonical == key || k.spellings.contains(&key))
}

/// Resolves an accepted spelling to its canonical key. Unknown keys map to themselves.
pub fn canonical_key(key: &str) -> &str {
    spec(key).map_or(key, |k| k.canonical)
}

/// Environment variables consulted for `key`, highest priority first.
pub fn env_names(key: &str) -> &'static [&'static str] {
    spec(key).map_or(&[], |k| k.env)
}

pub fn default_value(key: &str) -> &'static str {
    spec(key).map_or("", |k| k.default)
}

/// Canonical names of every known setting, in table order.
pub fn known_keys() -> impl Iterator<Item = &'static str> {
    KEYS.iter().map(|k| k.canonical)
}

/// Document written on first run, one explanatory comment per key.
pub fn default_document() -> Document {
    const GLOBAL: &[(&str, &str, &str)] = &[
        (
            "git_protocol",
            "ssh",
            "# What protocol to use when performing git operations. Supported values: ssh, https",
        ),
        (
            "editor",
            "",
            "# What editor glab should run when creating issues, merge requests, etc. This is a global config that cannot be overridden by hostname.",
        ),
        (
            "browser",
            "",
            "# What browser glab should run when opening links. This is a global config that cannot be overridden by hostname.",
        ),
        (
            "glamour_style",
            "dark",
            "# Set your desired markdown renderer style. Available options are [dark, light, notty].",
        ),
        (
            "check_update",
            "true",
            "# Allow glab to automatically check for updates and notify you when there are new updates",
        ),
    ];
    const HOST: &[(&str, &str, &str)] = &[
        (
            "api_protocol",
            "https",
            "# What protocol to use to access the api endpoint. Supported values: http, https",
        ),
        (
            "api_host",
            DEFAULT_HOSTNAME,
            "# Configure host for api endpoint, defaults to the host itself",
        ),
        (
            "token",
            "",
            "# Your GitLab access token. Get an access token at https://gitlab.com/-/profile/personal_access_tokens",
        ),
    ];

    let mut doc = Document::new();
    let root = doc.root();

    for (key, value, comment) in GLOBAL {
        if let Ok(entry) = doc.set_string_value(root, key, value) {
            doc.set_head_comment(entry.key, [*comment]);
        }
    }

    let Ok(hosts) = doc.ensure_mapping(root, "hosts") else {
        return doc;
    };
    if let Some(entry) = doc.find_entry(root, "hosts") {
        doc.set_head_comment(entry.key, ["# Configuration specific for GitLab instances"]);
    }
    let Ok(host) = doc.ensure_mapping(hosts, DEFAULT_HOSTNAME) else {
        return doc;
    };
    for (key, value, comment) in HOST {
        if let Ok(entry) = doc.set_string_value(host, key, value) {
            doc.set_head_comment(entry.key, [*comment]);
        }
    }

    doc
}

/// Puts the default hostname first (adding it when missing) and drops
/// repeated names; other hosts keep their order.
pub fn order_hosts<I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut out = vec![DEFAULT_HOSTNAME.to_string()];
    for name in names {
        if !out.contains(&name) {
            out.push(name);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_spellings() {
        assert_eq!(canonical_key("gitlab_token"), "token");
        assert_eq!(canonical_key("oauth_token"), "token");
        assert_eq!(canonical_key("gitlab_uri"), "host");
        assert_eq!(canonical_key("token"), "token");
        assert_eq!(canonical_key("something_else"), "something_else");
    }

    #[test]
    fn test_env_names_follow_spelling() {
        assert_eq!(
            env_names("oauth_token"),
            &["GITLAB_TOKEN", "GITLAB_ACCESS_TOKEN", "OAUTH_TOKEN"]
        );
        assert!(env_names("git_protocol").is_empty());
        assert!(env_names("unknown").is_empty());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(default_value("git_protocol"), "ssh");
        assert_eq!(default_value("glamour_style"), "dark");
        assert_eq!(default_value("token"), "");
        assert_eq!(default_value("unknown"), "");
    }

    #[test]
    fn test_default_document_shape() {
        let doc = default_document();
        let root = doc.root();
        let keys: Vec<_> = doc.keys(root).collect();
        assert_eq!(
            keys,
            ["git_protocol", "editor", "browser", "glamour_style", "check_update", "hosts"]
        );

        for (k, _) in doc.entries(root) {
            assert_eq!(doc.node(*k).head_comment.len(), 1);
        }

        let hosts = doc.find_entry(root, "hosts").unwrap().value;
        let host = doc.find_entry(hosts, DEFAULT_HOSTNAME).unwrap().value;
        assert_eq!(doc.get_str(host, "api_protocol"), Some("https"));
        assert_eq!(doc.get_str(host, "token"), Some(""));
    }

    #[test]
    fn test_default_document_survives_reparse() {
        let doc = default_document();
        let text = doc.encode(doc.root(), &[]);
        assert_eq!(Document::parse(&text).unwrap(), doc);
    }

    #[test]
    fn test_order_hosts() {
        let hosts = order_hosts(["a.example".to_string(), "gitlab.com".to_string(), "b.example".to_string()]);
        assert_eq!(hosts, ["gitlab.com", "a.example", "b.example"]);

        let hosts = order_hosts(["b.example".to_string(), "b.example".to_string()]);
        assert_eq!(hosts, ["gitlab.com", "b.example"]);
    }
}
