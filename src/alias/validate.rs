// src/alias/validate.rs
//! Checks run when an alias is defined (never when it is expanded).

use crate::config::aliases::is_shell_alias;
use crate::error::ValidationError;

use super::words;

/// How far a token list walked into the command tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Traversal {
    /// Names of the subcommands matched, outermost first.
    pub matched: Vec<String>,
    pub remaining: Vec<String>,
}

impl Traversal {
    /// True when at least one real subcommand was reached.
    pub fn found_command(&self) -> bool {
        !self.matched.is_empty()
    }
}

pub trait CommandTree {
    fn traverse(&self, tokens: &[String]) -> Traversal;
}

impl CommandTree for clap::Command {
    fn traverse(&self, tokens: &[String]) -> Traversal {
        let mut cmd = self;
        let mut matched = Vec::new();
        let mut consumed = 0;

        for token in tokens {
            let Some(sub) = cmd.find_subcommand(token) else {
                break;
            };
            matched.push(sub.get_name().to_string());
            cmd = sub;
            consumed += 1;
        }

        Traversal {
            matched,
            remaining: tokens[consumed..].to_vec(),
        }
    }
}

/// Rejects names that shadow a command and non-shell expansions that do not
/// start with one.
pub fn validate_alias_definition(
    tree: &dyn CommandTree,
    name: &str,
    expansion: &str,
) -> Result<(), ValidationError> {
    if tree.traverse(&[name.to_string()]).found_command() {
        return Err(ValidationError::CommandCollision(name.to_string()));
    }

    if is_shell_alias(expansion) {
        return Ok(());
    }

    let tokens = words::split(expansion)?;
    if !tree.traverse(&tokens).found_command() {
        return Err(ValidationError::UnknownCommand(expansion.to_string()));
    }

    Ok(())
}
