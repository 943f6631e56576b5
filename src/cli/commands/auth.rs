use clap::Subcommand;
use serde_json::json;

use crate::api::SignupRole;
use crate::app::Console;
use crate::cli::utils::{output_item, output_success};
use crate::cli::OutputFormat;
use crate::session::Session;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Sign in and store the session token")]
    Login {
        #[arg(help = "Email")]
        email: String,
        #[arg(long, env = "BEACON_PASSWORD", hide_env_values = true, help = "Password")]
        password: String,
    },

    #[command(about = "Create an account and sign in")]
    Signup {
        #[arg(help = "Full name")]
        full_name: String,
        #[arg(help = "Email")]
        email: String,
        #[arg(long, env = "BEACON_PASSWORD", hide_env_values = true, help = "Password (at least 8 characters)")]
        password: String,
        #[arg(long, default_value = "personnel", help = "Requested role: admin or personnel")]
        role: SignupRole,
    },

    #[command(about = "Sign out and forget the stored token")]
    Logout,

    #[command(about = "Show the signed-in principal and permissions")]
    Whoami,
}

pub async fn handle(console: &Console, cmd: AuthCommands, output_format: &OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { email, password } => {
            let session = console.login(&email, &password).await?;
            signed_in(&session, output_format)
        }
        AuthCommands::Signup {
            full_name,
            email,
            password,
            role,
        } => {
            let session = console.signup(&full_name, &email, &password, role).await?;
            signed_in(&session, output_format)
        }
        AuthCommands::Logout => {
            console.logout()?;
            output_success(output_format, "Signed out", None)
        }
        AuthCommands::Whoami => {
            let session = console.session().snapshot();
            if !session.is_authenticated() {
                anyhow::bail!("Not signed in. Run `beacon auth login <email>` first.");
            }
            output_item(output_format, &Whoami(session))
        }
    }
}

fn signed_in(session: &Session, output_format: &OutputFormat) -> anyhow::Result<()> {
    let name = session.principal.as_ref().map(|p| p.name.as_str()).unwrap_or("?");
    output_success(
        output_format,
        &format!("Signed in as {}", name),
        Some(json!({ "session": session })),
    )
}

#[derive(serde::Serialize)]
#[serde(transparent)]
struct Whoami(Session);

impl std::fmt::Display for Whoami {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(p) = &self.0.principal {
            writeln!(f, "Name: {}", p.name)?;
            if let Some(email) = &p.email {
                writeln!(f, "Email: {}", email)?;
            }
            writeln!(f, "Role: {}", p.role.label())?;
        }
        let perms = self.0.permissions.sorted_names();
        if perms.is_empty() {
            writeln!(f, "Permissions: (none)")
        } else {
            writeln!(f, "Permissions: {}", perms.join(", "))
        }
    }
}
