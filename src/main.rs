use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use playbuild::config::{default_config_dir, load_engine_config};
use playbuild::playbook::absolute_path;
use playbuild::Engine;

#[derive(Parser)]
#[command(name = "playbuild")]
#[command(about = "Run and inspect playbooks handed to ansible-playbook")]
#[command(version)]
struct Cli {
    /// Configuration directory (default: /etc/playbuild if exists, otherwise ~/.config/playbuild)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase verbosity; also forwarded to the runner as --verbose flags
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hand an existing playbook to the runner
    Run {
        /// Playbook file, relative to the current directory
        playbook: PathBuf,
        /// Working directory for the runner (default: current directory)
        #[arg(long)]
        root: Option<PathBuf>,
    },
    /// Report which environment variables the runner expects
    Env,
    /// Print the effective engine configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .compact()
        .init();

    let config_dir = cli.config.unwrap_or_else(default_config_dir);
    let config = load_engine_config(&config_dir)?;
    let engine = Engine::from_config(&config);

    match cli.command {
        Commands::Run { playbook, root } => {
            let root = match root {
                Some(root) => root,
                None => std::env::current_dir().context("Failed to determine current directory")?,
            };
            let playbook = absolute_path(&playbook)?;
            if !playbook.is_file() {
                anyhow::bail!("Playbook not found: {}", playbook.display());
            }
            if let Err(e) = engine.run(&playbook, &root, cli.verbose) {
                error!("{:#}", e);
                return Err(e);
            }
            info!("Playbook {} completed", playbook.display());
        }
        Commands::Env => {
            let missing = engine.missing_environment();
            for name in &config.required_env {
                let state = if missing.contains(&name.as_str()) {
                    "missing"
                } else {
                    "set"
                };
                println!("{}: {}", name, state);
            }
            if !missing.is_empty() {
                anyhow::bail!("{} required variable(s) not set", missing.len());
            }
        }
        Commands::Config => {
            println!("# {}", config_dir.display());
            print!("{}", serde_yaml::to_string(&config)?);
        }
    }

    Ok(())
}
