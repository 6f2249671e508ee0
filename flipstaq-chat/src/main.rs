//! FlipStaq Chat CLI
//!
//! Terminal client for the FlipStaq realtime channel.

mod commands;
mod config;
mod display;
mod session;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use config::CliConfig;

#[derive(Parser)]
#[command(name = "flipstaq-chat")]
#[command(version, about = "Terminal client for FlipStaq realtime chat")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Data directory (default: platform data dir + "flipstaq")
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Realtime endpoint URL
    #[arg(
        long,
        global = true,
        env = "FLIPSTAQ_WS_URL",
        default_value = "ws://localhost:4101/ws"
    )]
    endpoint: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Store an access token for the realtime channel
    Login {
        /// Bearer token issued by the auth service
        token: String,
    },

    /// Forget the stored access token
    Logout,

    /// Show session and endpoint details
    Status,

    /// Send one message and wait for the server's verdict
    Send {
        /// Conversation to post into
        #[arg(long)]
        conversation: String,

        /// Message text
        text: String,
    },

    /// Stream channel events to the terminal
    Watch {
        /// Join this conversation before streaming
        #[arg(long)]
        conversation: Option<String>,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("flipstaq_chat=warn".parse().unwrap())
                .add_directive("flipstaq_realtime=warn".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    // Resolve data directory
    let data_dir = cli.data_dir.unwrap_or_else(|| {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("flipstaq")
    });

    let config = CliConfig {
        data_dir,
        endpoint: cli.endpoint,
    };

    match cli.command {
        Commands::Login { token } => {
            commands::auth::login(&config, &token)?;
        }
        Commands::Logout => {
            commands::auth::logout(&config)?;
        }
        Commands::Status => {
            commands::auth::status(&config)?;
        }
        Commands::Send { conversation, text } => {
            commands::chat::send(&config, &conversation, &text)?;
        }
        Commands::Watch { conversation } => {
            commands::chat::watch(&config, conversation.as_deref())?;
        }
    }

    Ok(())
}
