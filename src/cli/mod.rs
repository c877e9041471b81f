pub mod app;
pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "motors")]
#[command(about = "Brutal Motors CLI - browse the catalog, book test drives, manage the dealership")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Sign in, sign out, and account management")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Browse the public vehicle catalog")]
    Inventory {
        #[command(subcommand)]
        cmd: commands::inventory::InventoryCommands,
    },

    #[command(about = "Your test-drive appointments")]
    Appointments {
        #[command(subcommand)]
        cmd: commands::appointments::AppointmentCommands,
    },

    #[command(about = "Administrator back-office (inventory, users, bookings)")]
    Admin {
        #[command(subcommand)]
        cmd: commands::admin::AdminCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
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

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, output_format).await,
        Commands::Inventory { cmd } => commands::inventory::handle(cmd, output_format).await,
        Commands::Appointments { cmd } => commands::appointments::handle(cmd, output_format).await,
        Commands::Admin { cmd } => commands::admin::handle(cmd, output_format).await,
    }
}
