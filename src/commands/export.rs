use crate::db::db::Db;
use crate::libs::export::Exporter;
use crate::libs::messages::Message;
use crate::{msg_error, msg_success};
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Output file; defaults to a timestamped file in the data directory.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub fn cmd(args: ExportArgs) -> Result<()> {
    let db_path = Db::default_path()?;
    let exporter = Exporter::new(&db_path);

    let result = match args.output {
        Some(path) => exporter.export_to(&path).map(|_| path),
        None => exporter.export(),
    };

    match result {
        Ok(path) => {
            msg_success!(Message::ExportCompleted(path.display().to_string()));
            Ok(())
        }
        Err(e) => {
            msg_error!(Message::ExportFailed(e.to_string()));
            Err(e)
        }
    }
}
