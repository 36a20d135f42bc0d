#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use std::path::PathBuf;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};
    use vitalog::db::assets::{Assets, Liabilities};
    use vitalog::db::transactions::{NewTransaction, TransactionFilter, TransactionPatch, TransactionType, Transactions};

    struct FinanceTestContext {
        _temp_dir: TempDir,
        db_path: PathBuf,
    }

    impl TestContext for FinanceTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let db_path = temp_dir.path().join("vitalog.db");
            FinanceTestContext { _temp_dir: temp_dir, db_path }
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn transaction(kind: TransactionType, amount: f64, category: &str, date: NaiveDate) -> NewTransaction {
        NewTransaction {
            kind,
            amount,
            category: category.to_string(),
            description: None,
            date,
            currency: None,
        }
    }

    #[test_context(FinanceTestContext)]
    #[test]
    fn test_transaction_round_trip(ctx: &mut FinanceTestContext) {
        let mut transactions = Transactions::new(&ctx.db_path).unwrap();

        let created = transactions
            .create(transaction(TransactionType::Expense, 12.50, "Dining", day(2026, 8, 20)))
            .unwrap();
        assert_eq!(created.kind, TransactionType::Expense);
        assert_eq!(created.amount, 12.50);
        assert_eq!(created.currency, "USD");
        assert!(!created.synced);

        let fetched = transactions.get(&created.id).unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[test_context(FinanceTestContext)]
    #[test]
    fn test_filter_by_kind_and_window(ctx: &mut FinanceTestContext) {
        let mut transactions = Transactions::new(&ctx.db_path).unwrap();
        transactions.create(transaction(TransactionType::Income, 3000.0, "Salary", day(2026, 8, 1))).unwrap();
        transactions.create(transaction(TransactionType::Expense, 50.0, "Groceries", day(2026, 8, 5))).unwrap();
        transactions.create(transaction(TransactionType::Expense, 30.0, "Groceries", day(2026, 7, 28))).unwrap();

        let expenses = transactions
            .fetch(&TransactionFilter {
                kind: Some(TransactionType::Expense),
                date_after: Some(day(2026, 8, 1)),
                date_before: Some(day(2026, 8, 31)),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(expenses.len(), 1);
        assert_eq!(expenses[0].amount, 50.0);
    }

    #[test_context(FinanceTestContext)]
    #[test]
    fn test_expense_total_excludes_income(ctx: &mut FinanceTestContext) {
        let mut transactions = Transactions::new(&ctx.db_path).unwrap();
        transactions.create(transaction(TransactionType::Expense, 20.0, "Transport", day(2026, 8, 2))).unwrap();
        transactions.create(transaction(TransactionType::Expense, 15.0, "Transport", day(2026, 8, 9))).unwrap();
        transactions.create(transaction(TransactionType::Income, 100.0, "Transport", day(2026, 8, 9))).unwrap();

        let (total, count) = transactions.expense_total("Transport", day(2026, 8, 1), day(2026, 8, 31)).unwrap();
        assert_eq!(total, 35.0);
        assert_eq!(count, 2);
    }

    #[test_context(FinanceTestContext)]
    #[test]
    fn test_total_by_type(ctx: &mut FinanceTestContext) {
        let mut transactions = Transactions::new(&ctx.db_path).unwrap();
        transactions.create(transaction(TransactionType::Income, 3000.0, "Salary", day(2026, 8, 1))).unwrap();
        transactions.create(transaction(TransactionType::Expense, 100.0, "Groceries", day(2026, 8, 3))).unwrap();
        transactions.create(transaction(TransactionType::Expense, 200.0, "Housing", day(2026, 8, 4))).unwrap();

        let income = transactions.total_by_type(TransactionType::Income, day(2026, 8, 1), day(2026, 8, 31)).unwrap();
        let spent = transactions.total_by_type(TransactionType::Expense, day(2026, 8, 1), day(2026, 8, 31)).unwrap();
        assert_eq!(income, 3000.0);
        assert_eq!(spent, 300.0);
    }

    #[test_context(FinanceTestContext)]
    #[test]
    fn test_update_and_delete(ctx: &mut FinanceTestContext) {
        let mut transactions = Transactions::new(&ctx.db_path).unwrap();
        let created = transactions
            .create(transaction(TransactionType::Expense, 10.0, "Dining", day(2026, 8, 15)))
            .unwrap();

        let updated = transactions
            .update(
                &created.id,
                &TransactionPatch {
                    amount: Some(14.0),
                    description: Some(Some("lunch".to_string())),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.amount, 14.0);
        assert_eq!(updated.description.as_deref(), Some("lunch"));
        assert_eq!(updated.category, created.category);

        transactions.delete(&created.id).unwrap();
        assert!(transactions.get(&created.id).unwrap().is_none());
    }

    #[test_context(FinanceTestContext)]
    #[test]
    fn test_asset_totals(ctx: &mut FinanceTestContext) {
        let mut assets = Assets::new(&ctx.db_path).unwrap();
        let savings = assets.create("Savings", "cash", 5000.0, None).unwrap();
        assets.create("Index fund", "investment", 12000.0, Some("USD")).unwrap();
        assert_eq!(assets.total_value().unwrap(), 17000.0);

        let updated = assets.update_value(&savings.id, 5500.0).unwrap();
        assert_eq!(updated.value, 5500.0);
        assert_eq!(assets.total_value().unwrap(), 17500.0);

        assets.delete(&savings.id).unwrap();
        assert_eq!(assets.list().unwrap().len(), 1);
    }

    #[test_context(FinanceTestContext)]
    #[test]
    fn test_liability_totals(ctx: &mut FinanceTestContext) {
        let mut liabilities = Liabilities::new(&ctx.db_path).unwrap();
        let loan = liabilities.create("Car loan", "loan", 8000.0, None).unwrap();
        liabilities.create("Credit card", "credit", 450.0, None).unwrap();
        assert_eq!(liabilities.total_amount().unwrap(), 8450.0);

        liabilities.update_amount(&loan.id, 7500.0).unwrap();
        assert_eq!(liabilities.total_amount().unwrap(), 7950.0);
    }

    #[test_context(FinanceTestContext)]
    #[test]
    fn test_empty_totals_are_zero(ctx: &mut FinanceTestContext) {
        let assets = Assets::new(&ctx.db_path).unwrap();
        let liabilities = Liabilities::new(&ctx.db_path).unwrap();
        assert_eq!(assets.total_value().unwrap(), 0.0);
        assert_eq!(liabilities.total_amount().unwrap(), 0.0);
    }
}
