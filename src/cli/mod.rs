pub mod commands;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "chatbot-api")]
#[command(about = "Chatbot Management API - message templates and per-user assignments")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, env = "API_HOST", help = "Address to bind")]
        host: Option<String>,
        #[arg(long, help = "Port to bind")]
        port: Option<u16>,
    },

    #[command(about = "Apply database migrations and exit")]
    Migrate,

    #[command(about = "Create an active user account")]
    CreateUser {
        #[arg(long)]
        username: String,
        #[arg(long, env = "CREATE_USER_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        client_id: Option<String>,
    },

    #[command(about = "Delete expired entries from the token denylist")]
    PurgeRevoked,
}

pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve { host: None, port: None }) {
        Commands::Serve { host, port } => commands::serve::handle(config, host, port).await,
        Commands::Migrate => commands::migrate::handle(config).await,
        Commands::CreateUser {
            username,
            password,
            name,
            email,
            client_id,
        } => {
            let input = crate::api::schemas::UserCreate {
                username,
                email,
                password,
                name,
                is_active: true,
                client_id,
            };
            commands::user::create(config, input).await
        }
        Commands::PurgeRevoked => commands::denylist::purge(config).await,
    }
}
