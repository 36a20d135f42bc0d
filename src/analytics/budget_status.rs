//! Budget evaluation: live spend, status classification, recurring rollover.
//!
//! A stored budget definition says nothing about money actually spent; this
//! engine joins it with the matching expense transactions on demand and
//! classifies the result. Nothing is cached — every call re-aggregates from
//! the raw rows.

use crate::db::budgets::{Budget, BudgetPeriod, Budgets, NewBudget};
use crate::db::transactions::Transactions;
use crate::libs::messages::Message;
use crate::msg_debug;
use anyhow::Result;
use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    Safe,
    Warning,
    Exceeded,
}

impl BudgetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetStatus::Safe => "safe",
            BudgetStatus::Warning => "warning",
            BudgetStatus::Exceeded => "exceeded",
        }
    }
}

/// A budget definition joined with its live spending data.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatedBudget {
    pub budget: Budget,
    pub spent: f64,
    pub transaction_count: u32,
    pub percent_used: f64,
    pub status: BudgetStatus,
}

/// Aggregate view across all currently-active budgets.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BudgetSummary {
    pub total_budgeted: f64,
    pub total_spent: f64,
    pub total_remaining: f64,
    pub active_count: u32,
    pub warning_count: u32,
    pub exceeded_count: u32,
}

/// Resolves the calendar window for a period kind around an anchor date:
/// monthly = first to last day of the anchor's month, weekly = Monday to
/// Sunday of the anchor's week, yearly = Jan 1 to Dec 31.
pub fn period_window(period: BudgetPeriod, anchor: NaiveDate) -> (NaiveDate, NaiveDate) {
    match period {
        BudgetPeriod::Monthly => {
            let start = NaiveDate::from_ymd_opt(anchor.year(), anchor.month(), 1).unwrap_or(anchor);
            let end = last_day_of_month(anchor.year(), anchor.month()).unwrap_or(anchor);
            (start, end)
        }
        BudgetPeriod::Weekly => {
            let monday = anchor - Duration::days(anchor.weekday().num_days_from_monday() as i64);
            (monday, monday + Duration::days(6))
        }
        BudgetPeriod::Yearly => {
            let start = NaiveDate::from_ymd_opt(anchor.year(), 1, 1).unwrap_or(anchor);
            let end = NaiveDate::from_ymd_opt(anchor.year(), 12, 31).unwrap_or(anchor);
            (start, end)
        }
    }
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    Some(NaiveDate::from_ymd_opt(next_year, next_month, 1)? - Duration::days(1))
}

/// Classifies spending against a budget amount and alert threshold.
pub fn classify(amount: f64, alert_threshold: f64, spent: f64) -> (f64, BudgetStatus) {
    let percent_used = if amount > 0.0 { spent / amount * 100.0 } else { 100.0 };
    let status = if percent_used >= 100.0 {
        BudgetStatus::Exceeded
    } else if percent_used >= alert_threshold * 100.0 {
        BudgetStatus::Warning
    } else {
        BudgetStatus::Safe
    };
    (percent_used, status)
}

pub struct BudgetEvaluator {
    budgets: Budgets,
    transactions: Transactions,
}

impl BudgetEvaluator {
    pub fn new(db_path: &Path) -> Result<Self> {
        Ok(Self {
            budgets: Budgets::new(db_path)?,
            transactions: Transactions::new(db_path)?,
        })
    }

    /// Joins one budget with its spend inside its own window.
    pub fn evaluate(&self, budget: &Budget) -> Result<EvaluatedBudget> {
        let (spent, transaction_count) = self.transactions.expense_total(&budget.category, budget.start_date, budget.end_date)?;
        let (percent_used, status) = classify(budget.amount, budget.alert_threshold, spent);

        Ok(EvaluatedBudget {
            budget: budget.clone(),
            spent,
            transaction_count,
            percent_used,
            status,
        })
    }

    /// Evaluates every budget active on the given day.
    pub fn evaluate_active(&self, today: NaiveDate) -> Result<Vec<EvaluatedBudget>> {
        let active = self.budgets.fetch_active(today)?;
        active.iter().map(|budget| self.evaluate(budget)).collect()
    }

    /// Totals and warning/exceeded counts across active budgets.
    pub fn summary(&self, today: NaiveDate) -> Result<BudgetSummary> {
        let evaluated = self.evaluate_active(today)?;

        let mut summary = BudgetSummary::default();
        for entry in &evaluated {
            summary.total_budgeted += entry.budget.amount;
            summary.total_spent += entry.spent;
            summary.active_count += 1;
            match entry.status {
                BudgetStatus::Warning => summary.warning_count += 1,
                BudgetStatus::Exceeded => summary.exceeded_count += 1,
                BudgetStatus::Safe => {}
            }
        }
        summary.total_remaining = summary.total_budgeted - summary.total_spent;
        Ok(summary)
    }

    /// Creates next-month successors for recurring monthly budgets. The next
    /// window is derived from the current budget's `end_date + 1 day`; a
    /// successor is only created when no budget for that category overlaps
    /// the new window, so the rollover is idempotent and safe to run on
    /// every app open.
    pub fn rollover_recurring(&mut self) -> Result<usize> {
        let all = self.budgets.list()?;
        let mut created = 0;

        for budget in all.iter().filter(|b| b.is_recurring && b.period == BudgetPeriod::Monthly) {
            let anchor = budget.end_date + Duration::days(1);
            let (start, end) = period_window(BudgetPeriod::Monthly, anchor);

            if self.budgets.exists_in_window(&budget.category, start, end)? {
                continue;
            }

            self.budgets.create(NewBudget {
                category: budget.category.clone(),
                amount: budget.amount,
                period: budget.period,
                start_date: start,
                end_date: end,
                is_recurring: true,
                alert_threshold: budget.alert_threshold,
            })?;
            msg_debug!(Message::BudgetRolloverCreated(budget.category.clone(), start.format("%Y-%m-%d").to_string()));
            created += 1;
        }

        Ok(created)
    }
}
