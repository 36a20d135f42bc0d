use crate::db::categories::Categories;
use crate::db::db::Db;
use crate::libs::messages::Message;
use crate::{msg_info, msg_success};
use anyhow::Result;
use clap::Args;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Confirm;

#[derive(Debug, Args)]
pub struct ResetArgs {
    /// Skip the confirmation prompt.
    #[arg(long)]
    yes: bool,
}

/// Destructive clear-all-data surface: drops every table, recreates the
/// schema and reseeds the default categories. Gated behind an explicit
/// confirmation because there is no way back.
pub fn cmd(args: ResetArgs) -> Result<()> {
    if !args.yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::ResetConfirmPrompt.to_string())
            .default(false)
            .interact()?;
        if !confirmed {
            msg_info!(Message::ResetCancelled);
            return Ok(());
        }
    }

    let mut db = Db::new()?;
    db.reset()?;
    let db_path = db.path().to_path_buf();
    drop(db);

    Categories::new(&db_path)?.seed_defaults()?;

    msg_success!(Message::ResetCompleted);
    Ok(())
}
