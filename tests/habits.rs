#[cfg(test)]
mod tests {
    use chrono::{Duration, Local};
    use std::path::PathBuf;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};
    use vitalog::db::habits::{HabitCadence, HabitPatch, Habits, NewHabit};

    struct HabitTestContext {
        _temp_dir: TempDir,
        db_path: PathBuf,
    }

    impl TestContext for HabitTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let db_path = temp_dir.path().join("vitalog.db");
            HabitTestContext { _temp_dir: temp_dir, db_path }
        }
    }

    #[test_context(HabitTestContext)]
    #[test]
    fn test_create_and_get(ctx: &mut HabitTestContext) {
        let mut habits = Habits::new(&ctx.db_path).unwrap();

        let mut new = NewHabit::new("Meditate", HabitCadence::Daily);
        new.reminder_time = Some("07:30".to_string());
        let created = habits.create(new).unwrap();

        assert_eq!(created.name, "Meditate");
        assert_eq!(created.cadence, HabitCadence::Daily);
        assert_eq!(created.current_streak, 0);
        assert_eq!(created.longest_streak, 0);
        // The log scheduler hands back a deterministic id.
        assert!(created.notification_id.is_some());

        let fetched = habits.get(&created.id).unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[test_context(HabitTestContext)]
    #[test]
    fn test_log_completion_is_unique_per_day(ctx: &mut HabitTestContext) {
        let mut habits = Habits::new(&ctx.db_path).unwrap();
        let habit = habits.create(NewHabit::new("Read", HabitCadence::Daily)).unwrap();
        let today = Local::now().date_naive();

        habits.log_completion(&habit.id, today, None).unwrap();
        // Second log for the same day updates in place instead of duplicating.
        habits.log_completion(&habit.id, today, Some("twice")).unwrap();

        let logs = habits.logs_for(&habit.id).unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].notes.as_deref(), Some("twice"));
    }

    #[test_context(HabitTestContext)]
    #[test]
    fn test_streaks_recalculated_on_log(ctx: &mut HabitTestContext) {
        let mut habits = Habits::new(&ctx.db_path).unwrap();
        let habit = habits.create(NewHabit::new("Run", HabitCadence::Daily)).unwrap();
        let today = Local::now().date_naive();

        habits.log_completion(&habit.id, today - Duration::days(2), None).unwrap();
        habits.log_completion(&habit.id, today - Duration::days(1), None).unwrap();
        habits.log_completion(&habit.id, today, None).unwrap();

        let updated = habits.get(&habit.id).unwrap().unwrap();
        assert_eq!(updated.current_streak, 3);
        assert_eq!(updated.longest_streak, 3);
    }

    #[test_context(HabitTestContext)]
    #[test]
    fn test_broken_streak_keeps_longest(ctx: &mut HabitTestContext) {
        let mut habits = Habits::new(&ctx.db_path).unwrap();
        let habit = habits.create(NewHabit::new("Stretch", HabitCadence::Daily)).unwrap();
        let today = Local::now().date_naive();

        // A two-day run that ended three days ago.
        habits.log_completion(&habit.id, today - Duration::days(4), None).unwrap();
        habits.log_completion(&habit.id, today - Duration::days(3), None).unwrap();

        let updated = habits.get(&habit.id).unwrap().unwrap();
        assert_eq!(updated.current_streak, 0);
        assert_eq!(updated.longest_streak, 2);
    }

    #[test_context(HabitTestContext)]
    #[test]
    fn test_remove_log_recalculates(ctx: &mut HabitTestContext) {
        let mut habits = Habits::new(&ctx.db_path).unwrap();
        let habit = habits.create(NewHabit::new("Journal", HabitCadence::Daily)).unwrap();
        let today = Local::now().date_naive();

        habits.log_completion(&habit.id, today - Duration::days(1), None).unwrap();
        habits.log_completion(&habit.id, today, None).unwrap();
        habits.remove_log(&habit.id, today).unwrap();

        let updated = habits.get(&habit.id).unwrap().unwrap();
        assert_eq!(updated.current_streak, 1);
        assert_eq!(updated.longest_streak, 1);
        assert_eq!(habits.logs_for(&habit.id).unwrap().len(), 1);
    }

    #[test_context(HabitTestContext)]
    #[test]
    fn test_update_patch(ctx: &mut HabitTestContext) {
        let mut habits = Habits::new(&ctx.db_path).unwrap();
        let habit = habits.create(NewHabit::new("Hydrate", HabitCadence::Daily)).unwrap();

        let updated = habits
            .update(
                &habit.id,
                &HabitPatch {
                    target_count: Some(8),
                    reminder_time: Some(Some("09:00".to_string())),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.target_count, 8);
        assert_eq!(updated.reminder_time.as_deref(), Some("09:00"));
        assert_eq!(updated.name, habit.name);
    }

    #[test_context(HabitTestContext)]
    #[test]
    fn test_delete_cascades_logs(ctx: &mut HabitTestContext) {
        let mut habits = Habits::new(&ctx.db_path).unwrap();
        let habit = habits.create(NewHabit::new("Floss", HabitCadence::Daily)).unwrap();
        let today = Local::now().date_naive();
        habits.log_completion(&habit.id, today, None).unwrap();

        habits.delete(&habit.id).unwrap();

        assert!(habits.get(&habit.id).unwrap().is_none());
        assert!(habits.all_logs().unwrap().is_empty());
    }

    #[test_context(HabitTestContext)]
    #[test]
    fn test_list_by_cadence(ctx: &mut HabitTestContext) {
        let mut habits = Habits::new(&ctx.db_path).unwrap();
        habits.create(NewHabit::new("Daily one", HabitCadence::Daily)).unwrap();
        habits.create(NewHabit::new("Weekly one", HabitCadence::Weekly)).unwrap();

        let weekly = habits.list_by_cadence(HabitCadence::Weekly).unwrap();
        assert_eq!(weekly.len(), 1);
        assert_eq!(weekly[0].name, "Weekly one");
    }
}
