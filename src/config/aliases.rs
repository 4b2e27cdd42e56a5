// src/config/aliases.rs
use indexmap::IndexMap;

pub type AliasMap = IndexMap<String, String>;

/// Expansions starting with `!` run through `sh -c` instead of the command tree.
pub fn is_shell_alias(expansion: &str) -> bool {
    expansion.starts_with('!')
}

/// Command line handed to the shell, without the leading `!`.
pub fn shell_body(expansion: &str) -> Option<&str> {
    expansion.strip_prefix('!')
}

/// Stored form of an alias defined with `--shell`.
pub fn as_shell_alias(expansion: &str) -> String {
    if is_shell_alias(expansion) {
        expansion.to_string()
    } else {
        format!("!{expansion}")
    }
}

/// `name: expansion` lines, names padded to a common width.
pub fn format_alias_list(aliases: &AliasMap) -> String {
    let width = aliases.keys().map(|k| k.chars().count()).max().unwrap_or(0);
    let mut out = String::new();
    for (name, expansion) in aliases {
        out.push_str(&format!("{name:<width$}  {expansion}\n", width = width + 1));
    }
    out
}
