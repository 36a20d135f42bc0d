pub mod export;
pub mod init;
#[cfg(debug_assertions)]
pub mod migrations;
pub mod reset;
pub mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Initialize the database: schema, migrations, default categories")]
    Init,
    #[command(about = "Export a full JSON snapshot of all data")]
    Export(export::ExportArgs),
    #[command(about = "Show budget and focus summaries")]
    Summary,
    #[command(about = "Delete ALL local data and recreate the schema")]
    Reset(reset::ResetArgs),
    #[cfg(debug_assertions)]
    #[command(about = "Inspect migration status and history")]
    Migrations(migrations::MigrationsArgs),
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help(true))]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub fn menu() -> Result<()> {
        let cli = Self::parse();
        match cli.command {
            Commands::Init => init::cmd(),
            Commands::Export(args) => export::cmd(args),
            Commands::Summary => summary::cmd(),
            Commands::Reset(args) => reset::cmd(args),
            #[cfg(debug_assertions)]
            Commands::Migrations(args) => migrations::cmd(args),
        }
    }
}
