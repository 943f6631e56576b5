pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::app::Console;
use crate::config::ConsoleConfig;
use crate::error::ClientError;

#[derive(Parser)]
#[command(name = "beacon")]
#[command(about = "Beacon - public safety admin console for incidents, live SOS and personnel")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Sign in, sign up, sign out and show the current session")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Open a console page (e.g. /dashboard, /personnel?q=ana)")]
    Open {
        #[arg(help = "Location to open", default_value = "/dashboard")]
        path: String,
    },

    #[command(about = "Show the navigation available to the current session")]
    Nav,

    #[command(about = "List, inspect and update incidents")]
    Incidents {
        #[command(subcommand)]
        cmd: commands::incidents::IncidentCommands,
    },

    #[command(about = "Monitor and act on SOS alerts")]
    Sos {
        #[command(subcommand)]
        cmd: commands::sos::SosCommands,
    },

    #[command(about = "Personnel directory")]
    Personnel {
        #[command(subcommand)]
        cmd: commands::personnel::PersonnelCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
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

/// Build the console from the environment and resolve any stored session
pub async fn connect() -> anyhow::Result<Console> {
    let console = Console::from_config(ConsoleConfig::from_env())?;
    console.mount().await;
    Ok(console)
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let console = connect().await?;

    let result = match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(&console, cmd, &output_format).await,
        Commands::Open { path } => commands::open::handle(&console, &path, &output_format).await,
        Commands::Nav => commands::open::nav(&console, &output_format),
        Commands::Incidents { cmd } => commands::incidents::handle(&console, cmd, &output_format).await,
        Commands::Sos { cmd } => commands::sos::handle(&console, cmd, &output_format).await,
        Commands::Personnel { cmd } => commands::personnel::handle(&console, cmd, &output_format).await,
    };

    finish(result, &output_format)
}

/// Marks a failure that has already been written to stdout as JSON
#[derive(Debug, thiserror::Error)]
#[error("error already reported")]
pub struct ErrorReported;

/// True when `main` should not print `err` again
pub fn is_reported(err: &anyhow::Error) -> bool {
    err.downcast_ref::<ErrorReported>().is_some()
}

/// In JSON mode, write the failure as a JSON document and tag it as reported
fn finish(result: anyhow::Result<()>, output_format: &OutputFormat) -> anyhow::Result<()> {
    match (result, output_format) {
        (Err(e), OutputFormat::Json) => {
            let code = e.downcast_ref::<ClientError>().map(|c| c.error_code());
            utils::output_error(output_format, &e.to_string(), code)?;
            Err(e.context(ErrorReported))
        }
        (result, _) => result,
    }
}
