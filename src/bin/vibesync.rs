mod commands;

use clap::Parser;
use commands::{build_client, execute_command, Commands, ConnectionArgs};

/// Browse your streaming dashboard from the terminal
#[derive(Parser)]
#[command(
    name = "vibesync",
    about = "Streaming dashboard: profile, playlists, full track lists and player embeds",
    long_about = None
)]
struct Cli {
    /// Show detailed debug information
    #[arg(long, global = true)]
    verbose: bool,

    /// Print results as JSON instead of formatted text
    #[arg(long, global = true)]
    json: bool,

    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let client = match build_client(&args.connection) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("❌ Failed to create client: {e}");
            eprintln!();
            eprintln!("Provide a token with --token or VIBESYNC_ACCESS_TOKEN,");
            eprintln!("or point --token-url at the dashboard's token endpoint.");
            std::process::exit(1);
        }
    };

    if let Err(e) = execute_command(args.command, &client, args.json).await {
        eprintln!("❌ Command failed: {e}");
        std::process::exit(1);
    }

    Ok(())
}
