// Lineage CLI - Command Line Interface Entry Point

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use lineage_config::{Config, ConfigLoader, parse_override};
use lineage_core::{
    SpawnRequest, compute_spawn_depth, is_nested_spawn_allowed, plan_spawn,
    resolve_agent_id_from_session_key, resolve_nested_tools_policy,
};
use lineage_protocol::{SessionSnapshot, SessionStore, load_session_store};

/// Lineage - inspect nested spawn policy decisions
#[derive(Parser, Debug)]
#[command(name = "lineage")]
#[command(version, about, long_about = None)]
struct TopCli {
    #[clap(flatten)]
    config_overrides: CliConfigOverrides,

    /// Config file layered above global and project config
    #[arg(long = "config-file", global = true)]
    config_file: Option<PathBuf>,

    /// Project directory containing .lineage/config.toml
    #[arg(short = 'd', long = "project-dir", global = true)]
    project_dir: Option<PathBuf>,

    /// Session store snapshot: JSON object of session key -> record
    #[arg(short = 's', long = "store", global = true)]
    store: Option<PathBuf>,

    #[clap(subcommand)]
    command: Commands,
}

/// CLI configuration overrides
#[derive(Debug, clap::Args)]
struct CliConfigOverrides {
    /// Configuration override in key=value format
    #[arg(short = 'c', long = "config", value_name = "KEY=VALUE", global = true)]
    overrides: Vec<String>,
}

/// Available commands
#[derive(Debug, Subcommand)]
enum Commands {
    /// Print the spawn depth of a session
    Depth {
        /// Session key
        session_key: String,
    },

    /// Check whether a session may spawn another agent
    Check {
        /// Requester session key
        session_key: String,

        /// Requester agent id (defaults to the key's agent scope)
        #[arg(short = 'a', long = "agent")]
        agent: Option<String>,

        /// Exit with status 2 when the spawn is denied
        #[arg(long)]
        strict: bool,
    },

    /// Print the nested tool policy for an agent at a depth
    Tools {
        /// Agent id
        #[arg(short = 'a', long = "agent")]
        agent: String,

        /// Spawn depth of the session the policy is for
        #[arg(long)]
        depth: u32,
    },

    /// Check a spawn and resolve the child's depth and tool policy
    Plan {
        /// Requester session key
        session_key: String,

        /// Requester agent id (defaults to the key's agent scope)
        #[arg(short = 'a', long = "agent")]
        agent: Option<String>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        config_command: ConfigCommands,
    },
}

/// Configuration commands
#[derive(Debug, Subcommand)]
enum ConfigCommands {
    /// Show the effective merged configuration
    Show,
}

fn main() -> Result<ExitCode> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = TopCli::parse();
    info!("Lineage CLI starting...");

    let config = load_config(&cli)?;
    let store = cli.store.as_deref().map(read_store).transpose()?;
    let store_ref = store.as_ref().map(|s| s as &dyn SessionStore);

    match cli.command {
        Commands::Depth { session_key } => {
            println!("{}", compute_spawn_depth(&session_key, store_ref));
        }
        Commands::Check {
            session_key,
            agent,
            strict,
        } => {
            let agent = agent.unwrap_or_else(|| resolve_agent_id_from_session_key(&session_key));
            let decision = is_nested_spawn_allowed(SpawnRequest {
                requester_session_key: &session_key,
                requester_agent_id: &agent,
                cfg: &config,
                store: store_ref,
            });
            println!("{}", serde_json::to_string_pretty(&decision)?);
            if strict && !decision.allowed {
                return Ok(ExitCode::from(2));
            }
        }
        Commands::Tools { agent, depth } => {
            let policy = resolve_nested_tools_policy(&config, &agent, depth);
            println!("{}", serde_json::to_string_pretty(&policy)?);
        }
        Commands::Plan { session_key, agent } => {
            let agent = agent.unwrap_or_else(|| resolve_agent_id_from_session_key(&session_key));
            let plan = plan_spawn(SpawnRequest {
                requester_session_key: &session_key,
                requester_agent_id: &agent,
                cfg: &config,
                store: store_ref,
            });
            let out = json!({
                "decision": plan.decision,
                "childDepth": plan.child_depth,
                "tools": plan.tools,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        Commands::Config { config_command } => match config_command {
            ConfigCommands::Show => {
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
        },
    }

    Ok(ExitCode::SUCCESS)
}

/// Load layered configuration and apply `-c` overrides
fn load_config(cli: &TopCli) -> Result<Config> {
    let overrides = cli
        .config_overrides
        .overrides
        .iter()
        .map(|raw| parse_override(raw))
        .collect::<Result<Vec<_>, _>>()?;

    let mut loader = ConfigLoader::new();
    if let Some(dir) = &cli.project_dir {
        loader = loader.with_project_dir(dir.clone());
    }
    if let Some(path) = &cli.config_file {
        loader = loader.with_config_file(path.clone());
    }
    let config = loader
        .load_with_cli_overrides(&overrides)
        .context("failed to load configuration")?;
    debug!(agents = config.agents.list.len(), "configuration loaded");
    Ok(config)
}

/// Read a JSON session store snapshot
fn read_store(path: &Path) -> Result<SessionSnapshot> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read session store {}", path.display()))?;
    let store = load_session_store(&content)
        .with_context(|| format!("failed to parse session store {}", path.display()))?;
    debug!(sessions = store.len(), "session store loaded");
    Ok(store)
}
