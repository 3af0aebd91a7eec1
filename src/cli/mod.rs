pub mod client;
pub mod commands;
pub mod config;
pub mod form;
pub mod utils;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "workbench")]
#[command(about = "Workbench CLI - client for the Workbench records API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(long, global = true, help = "Server base URL (overrides the stored session)")]
    pub server: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Authentication and session management")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Data operations on record collections")]
    Data {
        #[command(subcommand)]
        cmd: commands::data::DataCommands,
    },

    #[command(about = "Show per-collection record counts")]
    Dashboard,
}

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    let mut session = config::load()?;
    if let Some(server) = &cli.server {
        session.server = server.clone();
    }

    match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, &mut session, output_format).await,
        Commands::Data { cmd } => commands::data::handle(cmd, &session, output_format).await,
        Commands::Dashboard => commands::dashboard::handle(&session, output_format).await,
    }
}
