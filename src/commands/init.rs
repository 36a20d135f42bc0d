use crate::analytics::budget_status::BudgetEvaluator;
use crate::db::categories::Categories;
use crate::db::db::Db;
use crate::libs::config::Config;
use crate::libs::messages::Message;
use crate::{msg_info, msg_success};
use anyhow::Result;

/// Brings the store to a usable state: opens (and thereby migrates) the
/// database, seeds the default category catalogue if missing, and rolls
/// recurring budgets forward. Every step is idempotent, so running `init`
/// on each start is safe.
pub fn cmd() -> Result<()> {
    Config::read()?.save()?;

    let db = Db::new()?;
    let path = db.path().display().to_string();
    let db_path = db.path().to_path_buf();
    drop(db);

    let seeded = Categories::new(&db_path)?.seed_defaults()?;
    if seeded > 0 {
        msg_info!(Message::DefaultCategoriesSeeded(seeded));
    } else {
        msg_info!(Message::DefaultCategoriesPresent);
    }

    BudgetEvaluator::new(&db_path)?.rollover_recurring()?;

    msg_success!(Message::DatabaseInitialized(path));
    Ok(())
}
