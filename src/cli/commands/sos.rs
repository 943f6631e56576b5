use std::time::Duration;

use clap::Subcommand;
use futures::StreamExt;

use crate::api::sos::ACTIVE_REFRESH_INTERVAL;
use crate::app::Console;
use crate::cli::utils::{output_item, output_records, output_success};
use crate::cli::OutputFormat;
use crate::models::SosAlert;
use crate::pages::sos::SosCounts;

#[derive(Subcommand)]
pub enum SosCommands {
    #[command(about = "List SOS alerts")]
    List {
        #[arg(long, help = "Only alerts still active")]
        active: bool,
    },

    #[command(about = "Show one SOS alert")]
    Show {
        #[arg(help = "Alert id")]
        id: String,
    },

    #[command(about = "Acknowledge an alert")]
    Acknowledge {
        #[arg(help = "Alert id")]
        id: String,
    },

    #[command(about = "Dispatch responders to an alert")]
    Dispatch {
        #[arg(help = "Alert id")]
        id: String,
        #[arg(long, help = "Responder to assign")]
        responder: Option<String>,
    },

    #[command(about = "Mark the person behind an alert safe")]
    Safe {
        #[arg(help = "Alert id")]
        id: String,
    },

    #[command(about = "Follow active alerts as they change")]
    Watch {
        #[arg(long, help = "Seconds between refreshes")]
        interval: Option<u64>,
        #[arg(long, help = "Stop after this many refreshes")]
        count: Option<usize>,
    },
}

pub async fn handle(console: &Console, cmd: SosCommands, output_format: &OutputFormat) -> anyhow::Result<()> {
    let sos = console.sos();

    match cmd {
        SosCommands::List { active: false } if matches!(output_format, OutputFormat::Text) => {
            output_item(output_format, &console.open("/sos").await)
        }
        SosCommands::List { active } => {
            let alerts = if active { sos.active().await? } else { sos.list().await? };
            output_records(output_format, "sos_alerts", &alerts)
        }
        SosCommands::Show { id } => {
            let alert = sos.detail(&id).await?;
            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&alert)?),
                OutputFormat::Text => {
                    for line in describe(&alert) {
                        println!("{}", line);
                    }
                }
            }
            Ok(())
        }
        SosCommands::Acknowledge { id } => {
            sos.acknowledge(&id).await?;
            output_success(output_format, &format!("SOS {} acknowledged", id), None)
        }
        SosCommands::Dispatch { id, responder } => {
            sos.dispatch(&id, responder.as_deref()).await?;
            output_success(output_format, &format!("Responders dispatched to SOS {}", id), None)
        }
        SosCommands::Safe { id } => {
            sos.mark_safe(&id).await?;
            output_success(output_format, &format!("SOS {} marked safe", id), None)
        }
        SosCommands::Watch { interval, count } => {
            let interval = interval.map(Duration::from_secs).unwrap_or(ACTIVE_REFRESH_INTERVAL);
            let feed = sos.watch_active(interval);
            let mut feed = match count {
                Some(n) => feed.take(n).boxed_local(),
                None => feed.boxed_local(),
            };

            while let Some(result) = feed.next().await {
                match result {
                    Ok(alerts) => match output_format {
                        OutputFormat::Json => println!("{}", serde_json::to_string(&alerts)?),
                        OutputFormat::Text => {
                            let counts = SosCounts::from_alerts(&alerts);
                            let ids: Vec<&str> = alerts.iter().map(|a| a.id.as_str()).collect();
                            println!(
                                "{} active SOS{}{}",
                                counts.active,
                                if ids.is_empty() { "" } else { ": " },
                                ids.join(", ")
                            );
                        }
                    },
                    Err(e) if e.is_unauthorized() => return Err(e.into()),
                    Err(e) => tracing::warn!("SOS feed refresh failed: {}", e),
                }
            }
            Ok(())
        }
    }
}

/// Text rendering of one alert for `sos show`
fn describe(alert: &SosAlert) -> Vec<String> {
    let mut lines = vec![format!("SOS {} from {}", alert.id, alert.user_name)];
    lines.push(format!("Status: {}", alert.status));
    if let Some(phone) = &alert.user_phone {
        lines.push(format!("Phone: {}", phone));
    }
    if let Some(message) = &alert.message {
        lines.push(format!("Message: {}", message));
    }
    if let Some(loc) = &alert.location {
        lines.push(format!("Location: {:.5}, {:.5}", loc.latitude, loc.longitude));
    }
    if let Some(at) = alert.timestamp {
        lines.push(format!("Raised: {}", at.format("%Y-%m-%d %H:%M")));
    }
    if let Some(by) = &alert.acknowledged_by {
        lines.push(format!("Acknowledged by: {}", by));
    }
    lines
}
