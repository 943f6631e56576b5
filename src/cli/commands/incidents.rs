use clap::Subcommand;
use serde_json::json;

use crate::app::Console;
use crate::cli::utils::{output_item, output_records, output_success};
use crate::cli::OutputFormat;
use crate::models::{IncidentPriority, IncidentStatus, IncidentUpdate};

#[derive(Subcommand)]
pub enum IncidentCommands {
    #[command(about = "List incidents")]
    List {
        #[arg(long, help = "Only incidents in this status (pending, dispatched, in_progress, resolved, closed)")]
        status: Option<IncidentStatus>,
    },

    #[command(about = "Show one incident")]
    Show {
        #[arg(help = "Incident id")]
        id: String,
    },

    #[command(about = "Change an incident's status, priority or notes")]
    Update {
        #[arg(help = "Incident id")]
        id: String,
        #[arg(long)]
        status: Option<IncidentStatus>,
        #[arg(long)]
        priority: Option<IncidentPriority>,
        #[arg(long)]
        notes: Option<String>,
    },
}

pub async fn handle(console: &Console, cmd: IncidentCommands, output_format: &OutputFormat) -> anyhow::Result<()> {
    match cmd {
        IncidentCommands::List { status } => match output_format {
            OutputFormat::Json => {
                let incidents = match status {
                    Some(status) => console.incidents().by_status(status).await?,
                    None => console.incidents().list().await?,
                };
                output_records(output_format, "incidents", &incidents)
            }
            OutputFormat::Text => {
                let location = match status {
                    Some(status) => format!("/incidents?status={}", status.as_str()),
                    None => "/incidents".to_string(),
                };
                output_item(output_format, &console.open(&location).await)
            }
        },
        IncidentCommands::Show { id } => {
            let incident = console.incidents().detail(&id).await?;
            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&incident)?),
                OutputFormat::Text => {
                    println!("#{} {}", incident.id, incident.title);
                    println!("Category: {}", incident.category.label());
                    println!("Priority: {}", incident.priority.label());
                    println!("Status: {}", incident.status.label());
                    if let Some(loc) = &incident.location {
                        println!("Location: {:.5}, {:.5}", loc.latitude, loc.longitude);
                    }
                    if !incident.description.is_empty() {
                        println!();
                        println!("{}", incident.description);
                    }
                }
            }
            Ok(())
        }
        IncidentCommands::Update {
            id,
            status,
            priority,
            notes,
        } => {
            let update = IncidentUpdate { status, priority, notes };
            let updated = console.incidents().update(&id, &update).await?;
            output_success(
                output_format,
                &format!("Incident {} updated", id),
                Some(json!({ "incident": updated })),
            )
        }
    }
}
