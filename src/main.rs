use anyhow::Result;
use clap::{Parser, Subcommand};

use citypulse::cli;
use citypulse::config;
use citypulse::web;

#[derive(Debug, Parser)]
#[command(name = "citypulse")]
#[command(about = "Simulated smart-city operations console")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Ask the assistant one question and print the answer
    Ask {
        /// The question to ask
        #[arg(trailing_var_arg = true, required = true)]
        args: Vec<String>,
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Interactive assistant chat
    Chat,
    /// Show the city metric cards
    Overview {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
        /// Apply N updater ticks before rendering
        #[arg(long, default_value = "0")]
        ticks: u32,
    },
    /// Show the public safety alert feed and sensor board
    Safety {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
        /// Apply N updater ticks before rendering
        #[arg(long, default_value = "0")]
        ticks: u32,
    },
    /// Run the live telemetry loop against the real clock
    Watch {
        /// How long to watch, in seconds
        #[arg(long, default_value = "30")]
        duration_secs: u64,
    },
    /// Check system health: config, history log, seed data
    Health,
    /// Show logged exchange statistics
    History {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
        /// Only include the last N days of data
        #[arg(long)]
        days: Option<u32>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Start the embedded web dashboard
    Web {
        /// Address to bind, host:port
        #[arg(long)]
        addr: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Show the effective (merged) configuration
    Show,
    /// Write the default config to ~/.citypulse/config.toml
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
    /// Set a single config value (dotted key, e.g. assistant.overlap)
    Set { key: String, value: String },
    /// Reset the config file to defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();

    match app.command {
        Commands::Ask { args, format } => {
            let query = args.join(" ");
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_ask(&query, fmt)
        }
        Commands::Chat => cli::run_chat(),
        Commands::Overview { format, ticks } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_overview(fmt, ticks)
        }
        Commands::Safety { format, ticks } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_safety(fmt, ticks)
        }
        Commands::Watch { duration_secs } => cli::run_watch(duration_secs),
        Commands::Health => cli::run_health(),
        Commands::History { format, days } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_history(fmt, days)
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
        Commands::Web { addr } => {
            let addr = addr.unwrap_or_else(|| config::load().web.addr);
            web::serve(&addr)
        }
    }
}
