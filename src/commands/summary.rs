use crate::analytics::budget_status::BudgetEvaluator;
use crate::analytics::latency::LatencyAggregator;
use crate::db::db::Db;
use crate::db::focus::FocusSessions;
use crate::libs::config::Config;
use crate::libs::messages::Message;
use crate::msg_print;
use anyhow::Result;
use chrono::Local;
use prettytable::{format, row, Table};

/// Prints the live budget table for today, the focus-session rollups and the
/// task completion-latency overview.
pub fn cmd() -> Result<()> {
    let db_path = Db::default_path()?;
    let today = Local::now().date_naive();

    let evaluator = BudgetEvaluator::new(&db_path)?;
    let evaluated = evaluator.evaluate_active(today)?;

    msg_print!(Message::BudgetSummaryHeader, true);
    if evaluated.is_empty() {
        msg_print!(Message::NoActiveBudgets);
    } else {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_BOX_CHARS);
        table.set_titles(row!["Category", "Budget", "Spent", "Used", "Status"]);
        for entry in &evaluated {
            table.add_row(row![
                entry.budget.category,
                format!("{:.2}", entry.budget.amount),
                format!("{:.2}", entry.spent),
                format!("{:.0}%", entry.percent_used),
                entry.status.as_str(),
            ]);
        }
        table.printstd();

        let summary = evaluator.summary(today)?;
        msg_print!(Message::Custom(format!(
            "{} active, {} warning, {} exceeded. {:.2} of {:.2} remaining",
            summary.active_count, summary.warning_count, summary.exceeded_count, summary.total_remaining, summary.total_budgeted
        )));
    }

    let focus = FocusSessions::new(&db_path)?;
    let day = focus.rollup_for_day(today)?;
    let week = focus.rollup_for_week(today)?;
    let streaks = focus.streaks(today)?;
    msg_print!(Message::Custom(format!(
        "Focus today: {} session(s), {} min. This week: {} session(s), {} min (avg {:.0}). Streak: {} day(s), best {}.",
        day.sessions, day.total_minutes, week.sessions, week.total_minutes, week.average_minutes, streaks.current, streaks.longest
    )));

    let aggregator = LatencyAggregator::new(&db_path, Config::read()?.stale_task_days)?;
    let report = aggregator.report()?;
    let stale = aggregator.stale()?;
    msg_print!(Message::Custom(format!(
        "Tasks: {} completed, avg {:.1} day(s) to completion. {} stale task(s).",
        report.overall.completed_count, report.overall.average_days, stale.len()
    )));

    Ok(())
}
