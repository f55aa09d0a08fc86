//! `telegraph-relay`: a Telegram bot that republishes shared media on Telegraph.
//!
//! Secrets come from the environment (a `.env` file is loaded first); other
//! knobs from an optional RON settings file.

mod platform;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "telegraph-relay", about = "Relay Telegram media to Telegraph", version)]
struct Cli {
    /// RON settings file (defaults to $RELAY_CONFIG, then ./relay.ron if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve bot updates until interrupted (default)
    Run,
    /// Create a Telegraph account and print its access token
    CreateToken {
        /// Account short name shown only to the account owner
        #[arg(long, default_value = "TelegraphRelay")]
        short_name: String,
        /// Default author name for pages
        #[arg(long, default_value = relay_engine::DEFAULT_AUTHOR_NAME)]
        author_name: String,
        /// Profile link opened when readers click the author name
        #[arg(long)]
        author_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is normal; real environment variables still apply.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config_path = cli
        .config
        .or_else(|| std::env::var_os(platform::CONFIG_ENV).map(PathBuf::from));
    let settings = platform::load_settings(config_path.as_deref())?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => platform::run_bot(settings).await,
        Commands::CreateToken {
            short_name,
            author_name,
            author_url,
        } => platform::create_token(&settings, &short_name, &author_name, author_url.as_deref()).await,
    }
}
