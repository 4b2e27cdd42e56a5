// src/alias/mod.rs
//! Rewrites an invocation through the alias table before it reaches the
//! command tree.

use std::{path::PathBuf, sync::OnceLock};

use regex::Regex;
use tracing::debug;

use crate::config::aliases::shell_body;
use crate::error::AliasError;

pub mod shell;
pub mod validate;
pub mod words;

pub use shell::{find_sh, look_path};
pub use validate::{validate_alias_definition, CommandTree, Traversal};

/// Result of [`expand`]: the argv to dispatch, without the program name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expansion {
    pub args: Vec<String>,
    pub is_shell: bool,
}

impl Expansion {
    fn passthrough(argv: &[String]) -> Self {
        Self {
            args: argv.iter().skip(1).cloned().collect(),
            is_shell: false,
        }
    }
}

fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\d").expect("placeholder pattern is valid"))
}

/// Expands `argv[1]` when `lookup` knows it as an alias.
///
/// Shell aliases (`!cmd`) become `[sh, -c, cmd, --, args...]`. Other
/// aliases get `$1`, `$2`, ... replaced by the trailing arguments; when the
/// expansion has no `$` left, the arguments are appended instead. A
/// placeholder left unfilled is an error naming the partly filled expansion.
pub fn expand<L, S>(argv: &[String], lookup: L, find_shell: S) -> Result<Expansion, AliasError>
where
    L: Fn(&str) -> Option<String>,
    S: FnOnce() -> Result<PathBuf, AliasError>,
{
    if argv.len() < 2 {
        return Ok(Expansion::passthrough(argv));
    }
    let Some(expansion) = lookup(&argv[1]) else {
        return Ok(Expansion::passthrough(argv));
    };
    let rest = &argv[2..];

    if let Some(body) = shell_body(&expansion) {
        let sh = find_shell()?;
        let mut args = vec![
            sh.to_string_lossy().into_owned(),
            "-c".to_string(),
            body.to_string(),
        ];
        if !rest.is_empty() {
            args.push("--".to_string());
            args.extend(rest.iter().cloned());
        }
        debug!(alias = %argv[1], "expanded shell alias");
        return Ok(Expansion {
            args,
            is_shell: true,
        });
    }

    let mut expanded = expansion;
    let mut extra = Vec::new();
    for (i, arg) in rest.iter().enumerate() {
        if !expanded.contains('$') {
            extra.push(arg.clone());
        } else {
            expanded = expanded.replace(&format!("${}", i + 1), arg);
        }
    }

    if placeholder().is_match(&expanded) {
        return Err(AliasError::NotEnoughArguments(expanded));
    }

    let mut args = words::split(&expanded).map_err(|source| AliasError::Tokenize {
        expansion: expanded.clone(),
        source,
    })?;
    args.extend(extra);

    debug!(alias = %argv[1], ?args, "expanded alias");
    Ok(Expansion {
        args,
        is_shell: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn table(name: &str) -> Option<String> {
        match name {
            "co" => Some("mr checkout".to_string()),
            "il" => Some(r#"issue list --author="$1" --label="$2""#.to_string()),
            "igrep" => Some("!glab issue list | grep".to_string()),
            _ => None,
        }
    }

    fn fake_sh() -> Result<PathBuf, AliasError> {
        Ok(PathBuf::from("/usr/bin/sh"))
    }

    fn no_sh() -> Result<PathBuf, AliasError> {
        Err(AliasError::ShellNotFound)
    }

    #[test]
    fn test_no_subcommand() {
        let out = expand(&argv(&["glab"]), table, no_sh).unwrap();
        assert_eq!(out, Expansion::default());

        let out = expand(&[], table, no_sh).unwrap();
        assert!(out.args.is_empty());
    }

    #[test]
    fn test_no_match() {
        let out = expand(&argv(&["glab", "mr", "status"]), table, no_sh).unwrap();
        assert_eq!(out.args, ["mr", "status"]);
        assert!(!out.is_shell);
    }

    #[test]
    fn test_simple_and_passthrough() {
        let out = expand(&argv(&["glab", "co"]), table, no_sh).unwrap();
        assert_eq!(out.args, ["mr", "checkout"]);

        let out = expand(&argv(&["glab", "co", "123"]), table, no_sh).unwrap();
        assert_eq!(out.args, ["mr", "checkout", "123"]);
    }

    #[test]
    fn test_positional_substitution() {
        let out = expand(&argv(&["glab", "il", "vilmibm", "help wanted"]), table, no_sh).unwrap();
        assert_eq!(
            out.args,
            ["issue", "list", "--author=vilmibm", "--label=help wanted"]
        );
    }

    #[test]
    fn test_insufficient_arguments_reports_partial_expansion() {
        let err = expand(&argv(&["glab", "il", "vilmibm"]), table, no_sh).unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"not enough arguments for alias: issue list --author="vilmibm" --label="$2""#
        );
    }

    #[test]
    fn test_shell_alias() {
        let out = expand(&argv(&["glab", "igrep", "user", "foo"]), table, fake_sh).unwrap();
        assert!(out.is_shell);
        assert_eq!(
            out.args,
            ["/usr/bin/sh", "-c", "glab issue list | grep", "--", "user", "foo"]
        );

        let out = expand(&argv(&["glab", "igrep"]), table, fake_sh).unwrap();
        assert_eq!(out.args, ["/usr/bin/sh", "-c", "glab issue list | grep"]);
    }

    #[test]
    fn test_shell_alias_without_interpreter() {
        let err = expand(&argv(&["glab", "igrep"]), table, no_sh).unwrap_err();
        assert!(matches!(err, AliasError::ShellNotFound));
    }

    #[test]
    fn test_unbalanced_quote_in_expansion() {
        let lookup = |_: &str| Some("issue list --label=\"oops".to_string());
        let err = expand(&argv(&["glab", "bad"]), lookup, no_sh).unwrap_err();
        assert!(matches!(err, AliasError::Tokenize { .. }));
    }
}
