use clap::Subcommand;

use crate::app::Console;
use crate::cli::utils::{output_item, output_records};
use crate::cli::OutputFormat;
use crate::permissions::Permission;

#[derive(Subcommand)]
pub enum PersonnelCommands {
    #[command(about = "List admin and personnel accounts")]
    List {
        #[arg(long, help = "Filter by name or email")]
        search: Option<String>,
        #[arg(long, help = "List registered public users instead of staff")]
        users: bool,
    },
}

pub async fn handle(console: &Console, cmd: PersonnelCommands, output_format: &OutputFormat) -> anyhow::Result<()> {
    match cmd {
        PersonnelCommands::List { search, users } => {
            if !console.session().has_permission(&Permission::ManageUsers) {
                anyhow::bail!("The personnel directory requires the manage_users permission");
            }

            match output_format {
                OutputFormat::Text => {
                    let location = match &search {
                        Some(q) => format!(
                            "/personnel?q={}",
                            url::form_urlencoded::byte_serialize(q.as_bytes()).collect::<String>()
                        ),
                        None => "/personnel".to_string(),
                    };
                    output_item(output_format, &console.open(&location).await)
                }
                OutputFormat::Json => {
                    let people = if users {
                        console.personnel().users().await?
                    } else {
                        console.personnel().admins().await?
                    };
                    let query = search.unwrap_or_default();
                    let matching: Vec<_> = people.into_iter().filter(|p| p.matches(&query)).collect();
                    output_records(output_format, if users { "users" } else { "personnel" }, &matching)
                }
            }
        }
    }
}
