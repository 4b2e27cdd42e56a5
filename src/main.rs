use anyhow::{Context as _, Result};
use clap::{CommandFactory, Parser};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use glab_config::alias::{find_sh, validate_alias_definition};
use glab_config::cli::{AliasCommand, Args, Command, ConfigCommand};
use glab_config::config::{
    aliases::{as_shell_alias, format_alias_list},
    env::{first_non_empty, ProcessEnv},
    keys::{env_names, known_keys},
    ConfigStore, FileConfig,
};
use glab_config::context::{display_value, ConfigContext};

fn main() -> Result<()> {
    init_tracing()?;

    let mut ctx = ConfigContext::from_env().context("could not resolve config paths")?;
    let argv: Vec<String> = std::env::args().collect();

    let expansion = ctx
        .config()
        .context("failed to load config")?
        .expand_alias(&argv, &|| find_sh(&ProcessEnv))?;

    if expansion.is_shell {
        // [sh, -c, body, --, args...]
        let Some((program, rest)) = expansion.args.split_first() else {
            return Ok(());
        };
        debug!(?rest, "running shell alias");
        let status = std::process::Command::new(program)
            .args(rest)
            .status()
            .with_context(|| format!("failed to run {program}"))?;
        std::process::exit(status.code().unwrap_or(1));
    }

    let program = argv.first().cloned().unwrap_or_else(|| "glab-config".to_string());
    let args = Args::parse_from(std::iter::once(program).chain(expansion.args));

    if args.dump_context {
        print!("{}", ctx.debug_dump(args.effective_redact()));
        return Ok(());
    }

    match args.command {
        Some(Command::Config(cmd)) => run_config(&mut ctx, cmd),
        Some(Command::Alias(cmd)) => run_alias(&mut ctx, cmd),
        None => {
            Args::command().print_help()?;
            Ok(())
        }
    }
}

/// Log filter from GLAB_LOG (e.g. `glab_config=debug`), warnings by default.
fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_env("GLAB_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

// ---------- config ----------

#[derive(Serialize)]
struct GetOutput<'a> {
    key: &'a str,
    value: String,
    source: String,
}

fn run_config(ctx: &mut ConfigContext, cmd: ConfigCommand) -> Result<()> {
    let cfg = ctx.config()?;

    match cmd {
        ConfigCommand::Get { key, host, json } => {
            let value = cfg.get(&host, &key)?;
            if !json {
                println!("{value}");
                return Ok(());
            }
            let out = GetOutput {
                key: &key,
                source: value_source(cfg, &host, &key)?,
                value,
            };
            println!("{}", serde_json::to_string_pretty(&out)?);
        }

        ConfigCommand::Set {
            key,
            value,
            host,
            local,
        } => {
            if local {
                cfg.local()?.set(&key, &value)?;
            } else {
                cfg.set(&host, &key, &value)?;
                cfg.write().context("failed to write config")?;
            }
        }

        ConfigCommand::List { host, show_secrets } => {
            for key in known_keys() {
                let value = cfg.get(&host, key)?;
                println!("{key}={}", display_value(key, &value, !show_secrets));
            }
        }

        ConfigCommand::Hosts => {
            for host in cfg.hosts()? {
                println!("{host}");
            }
        }

        ConfigCommand::UnsetHost { hostname } => {
            cfg.unset_host(&hostname);
            cfg.write().context("failed to write config")?;
        }
    }

    Ok(())
}

/// Where `get` found its value: an environment variable or a file.
fn value_source(cfg: &FileConfig, host: &str, key: &str) -> Result<String> {
    let env_hit = env_names(key)
        .iter()
        .copied()
        .find(|name| first_non_empty(cfg.env(), &[*name]).is_some());
    if let Some(name) = env_hit {
        return Ok(format!("${name}"));
    }
    let (_, source) = cfg.get_with_source(host, key)?;
    Ok(source.display().to_string())
}

// ---------- alias ----------

fn run_alias(ctx: &mut ConfigContext, cmd: AliasCommand) -> Result<()> {
    let cfg = ctx.config()?;

    match cmd {
        AliasCommand::Set {
            name,
            expansion,
            shell,
        } => {
            let expansion = if shell {
                as_shell_alias(&expansion)
            } else {
                expansion
            };
            validate_alias_definition(&Args::command(), &name, &expansion)?;

            let mut aliases = cfg.aliases()?;
            let verb = if aliases.get(&name).is_some() {
                "Changed"
            } else {
                "Added"
            };
            aliases.set(&name, &expansion)?;
            eprintln!("{verb} alias {name}: {expansion}");
        }

        AliasCommand::Delete { name } => {
            let mut aliases = cfg.aliases()?;
            let expansion = aliases.get(&name).unwrap_or_default();
            aliases.delete(&name)?;
            eprintln!("Deleted alias {name}; was {expansion}");
        }

        AliasCommand::List { json } => {
            let all = cfg.aliases()?.all();
            if json {
                println!("{}", serde_json::to_string_pretty(&all)?);
            } else if all.is_empty() {
                eprintln!("no aliases configured");
            } else {
                print!("{}", format_alias_list(&all));
            }
        }
    }

    Ok(())
}
