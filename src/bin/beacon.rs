use beacon_console::cli::Cli;
use beacon_console::ConsoleConfig;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so BEACON_API_BASE_URL and friends apply
    let _ = dotenvy::dotenv();

    let default_filter = ConsoleConfig::from_env().logging.default_filter;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = beacon_console::cli::run(cli).await {
        if beacon_console::cli::is_reported(&e) {
            std::process::exit(1);
        }
        match std::env::var("BEACON_VERBOSE").as_deref() {
            Ok("true") | Ok("1") => eprintln!("Error: {e:?}"),
            _ => eprintln!("Error: {e}"),
        }
        std::process::exit(1);
    }

    Ok(())
}
