use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "glab-config", version, about)]
pub struct Args {
    /// Dump runtime context (resolved config paths + relevant env vars)
    #[arg(long, default_value_t = false)]
    pub dump_context: bool,

    /// Disable redaction in context dump
    #[arg(long = "no-redact", default_value_t = false)]
    pub no_redact: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Read and write settings
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Manage command aliases
    #[command(subcommand)]
    Alias(AliasCommand),
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective value of a setting
    Get {
        key: String,

        /// Resolve the value for this host
        #[arg(long, default_value = "")]
        host: String,

        /// Print value and source as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Update a setting
    Set {
        key: String,
        value: String,

        /// Store the value for this host only
        #[arg(long, default_value = "", conflicts_with = "local")]
        host: String,

        /// Store the value in the repository-local config
        #[arg(long, default_value_t = false)]
        local: bool,
    },

    /// Print every known setting
    List {
        #[arg(long, default_value = "")]
        host: String,

        /// Print tokens instead of <redacted>
        #[arg(long, default_value_t = false)]
        show_secrets: bool,
    },

    /// List the configured hosts
    Hosts,

    /// Remove a host entry
    UnsetHost { hostname: String },
}

#[derive(Subcommand, Debug)]
pub enum AliasCommand {
    /// Create or replace an alias
    Set {
        name: String,
        expansion: String,

        /// Run the expansion through sh instead of this tool
        #[arg(long, default_value_t = false)]
        shell: bool,
    },

    /// Remove an alias
    Delete { name: String },

    /// Print the alias table
    List {
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

impl Args {
    pub fn effective_redact(&self) -> bool {
        !self.no_redact
    }
}
