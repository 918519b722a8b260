use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use command_relay::{server, RelayConfig, SudoPolicy};

#[derive(Parser)]
#[command(name = "command-relay")]
#[command(about = "Authenticated remote command relay with a sudo allow-list")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (TOML)
    #[arg(long, global = true, env = "RELAY_CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Address to bind (overrides config)
    #[arg(long, global = true)]
    host: Option<String>,

    /// Port to listen on (overrides config and PORT)
    #[arg(long, global = true)]
    port: Option<u16>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve POST /run (default)
    Serve,
    /// Show how the sudo allow-list classifies a command, without running it
    Check {
        /// Command string exactly as a caller would send it
        command: String,
    },
}

impl Cli {
    /// `--host` and `--port` win over the config file and the environment
    fn apply_overrides(&self, config: &mut RelayConfig) {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
    }
}

/// Render how the allow-list classifies `command`
fn check_report(allowed_sudo: &[String], command: &str) -> String {
    let decision = SudoPolicy::new(allowed_sudo.iter().cloned()).decide(command);
    format!(
        "privileged: {}\nallowed: {}",
        decision.privileged, decision.allowed
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    relay_common::init_tracing("command_relay")?;

    let cli = Cli::parse();

    let mut config = RelayConfig::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => server::serve(config).await?,
        Commands::Check { command } => println!("{}", check_report(&config.allowed_sudo, &command)),
    }

    Ok(())
}
