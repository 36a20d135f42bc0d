#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};
    use std::path::PathBuf;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};
    use vitalog::db::focus::{FocusSessions, NewSession, SessionStatus, TransitionError};
    use vitalog::db::tasks::{NewTask, Tasks};

    struct FocusTestContext {
        _temp_dir: TempDir,
        db_path: PathBuf,
    }

    impl TestContext for FocusTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let db_path = temp_dir.path().join("vitalog.db");
            FocusTestContext { _temp_dir: temp_dir, db_path }
        }
    }

    fn at(y: i32, m: u32, d: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(hour, minute, 0).unwrap()
    }

    #[test_context(FocusTestContext)]
    #[test]
    fn test_lifecycle_happy_path(ctx: &mut FocusTestContext) {
        let mut sessions = FocusSessions::new(&ctx.db_path).unwrap();
        let created = sessions.create(NewSession::new("Deep work", 50)).unwrap();
        assert_eq!(created.status, SessionStatus::Scheduled);
        assert!(created.start_time.is_none());

        let started = sessions.start(&created.id, at(2026, 8, 28, 9, 0)).unwrap();
        assert_eq!(started.status, SessionStatus::InProgress);
        assert_eq!(started.start_time, Some(at(2026, 8, 28, 9, 0)));

        let completed = sessions.complete(&created.id, at(2026, 8, 28, 9, 45), None).unwrap();
        assert_eq!(completed.status, SessionStatus::Completed);
        assert_eq!(completed.end_time, Some(at(2026, 8, 28, 9, 45)));
        // Derived from the start stamp.
        assert_eq!(completed.actual_minutes, Some(45));
    }

    #[test_context(FocusTestContext)]
    #[test]
    fn test_explicit_actual_minutes_wins(ctx: &mut FocusTestContext) {
        let mut sessions = FocusSessions::new(&ctx.db_path).unwrap();
        let created = sessions.create(NewSession::new("Sprint", 25)).unwrap();
        sessions.start(&created.id, at(2026, 8, 28, 10, 0)).unwrap();
        let completed = sessions.complete(&created.id, at(2026, 8, 28, 10, 30), Some(20)).unwrap();
        assert_eq!(completed.actual_minutes, Some(20));
    }

    #[test_context(FocusTestContext)]
    #[test]
    fn test_illegal_transitions_rejected(ctx: &mut FocusTestContext) {
        let mut sessions = FocusSessions::new(&ctx.db_path).unwrap();
        let created = sessions.create(NewSession::new("Strict", 25)).unwrap();

        // Completing a session that never started is rejected.
        let err = sessions.complete(&created.id, at(2026, 8, 28, 11, 0), None).unwrap_err();
        assert!(err.downcast_ref::<TransitionError>().is_some());

        sessions.start(&created.id, at(2026, 8, 28, 11, 0)).unwrap();
        // Starting twice is rejected.
        assert!(sessions.start(&created.id, at(2026, 8, 28, 11, 5)).is_err());

        sessions.complete(&created.id, at(2026, 8, 28, 11, 30), None).unwrap();
        // Completed is terminal.
        assert!(sessions.complete(&created.id, at(2026, 8, 28, 11, 31), None).is_err());
        assert!(sessions.cancel(&created.id, at(2026, 8, 28, 11, 31)).is_err());

        // The rejected calls left the row untouched.
        let final_state = sessions.get(&created.id).unwrap().unwrap();
        assert_eq!(final_state.status, SessionStatus::Completed);
        assert_eq!(final_state.end_time, Some(at(2026, 8, 28, 11, 30)));
    }

    #[test_context(FocusTestContext)]
    #[test]
    fn test_cancel_from_either_live_state(ctx: &mut FocusTestContext) {
        let mut sessions = FocusSessions::new(&ctx.db_path).unwrap();

        let scheduled = sessions.create(NewSession::new("Never started", 25)).unwrap();
        let cancelled = sessions.cancel(&scheduled.id, at(2026, 8, 28, 12, 0)).unwrap();
        assert_eq!(cancelled.status, SessionStatus::Cancelled);

        let running = sessions.create(NewSession::new("Interrupted", 25)).unwrap();
        sessions.start(&running.id, at(2026, 8, 28, 12, 0)).unwrap();
        let cancelled = sessions.cancel(&running.id, at(2026, 8, 28, 12, 10)).unwrap();
        assert_eq!(cancelled.status, SessionStatus::Cancelled);
        // Cancelled is terminal too.
        assert!(sessions.start(&running.id, at(2026, 8, 28, 12, 15)).is_err());
    }

    #[test_context(FocusTestContext)]
    #[test]
    fn test_rollups_count_only_completed(ctx: &mut FocusTestContext) {
        let mut sessions = FocusSessions::new(&ctx.db_path).unwrap();
        let day = NaiveDate::from_ymd_opt(2026, 8, 26).unwrap(); // a Wednesday

        for minutes in [25, 50] {
            let s = sessions.create(NewSession::new("Block", minutes)).unwrap();
            sessions.start(&s.id, day.and_hms_opt(9, 0, 0).unwrap()).unwrap();
            sessions
                .complete(&s.id, day.and_hms_opt(9, 0, 0).unwrap() + chrono::Duration::minutes(minutes), None)
                .unwrap();
        }
        // A cancelled session contributes nothing.
        let dropped = sessions.create(NewSession::new("Dropped", 25)).unwrap();
        sessions.cancel(&dropped.id, day.and_hms_opt(10, 0, 0).unwrap()).unwrap();

        let daily = sessions.rollup_for_day(day).unwrap();
        assert_eq!(daily.sessions, 2);
        assert_eq!(daily.total_minutes, 75);
        assert_eq!(daily.average_minutes, 37.5);

        let weekly = sessions.rollup_for_week(day).unwrap();
        assert_eq!(weekly.sessions, 2);

        // A different week sees nothing.
        let far = sessions.rollup_for_week(day + chrono::Duration::days(14)).unwrap();
        assert_eq!(far.sessions, 0);
        assert_eq!(far.average_minutes, 0.0);
    }

    #[test_context(FocusTestContext)]
    #[test]
    fn test_streaks_over_completed_days(ctx: &mut FocusTestContext) {
        let mut sessions = FocusSessions::new(&ctx.db_path).unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 8, 29).unwrap();

        for offset in 0..3 {
            let day = today - chrono::Duration::days(offset);
            let s = sessions.create(NewSession::new("Daily block", 25)).unwrap();
            sessions.start(&s.id, day.and_hms_opt(8, 0, 0).unwrap()).unwrap();
            sessions.complete(&s.id, day.and_hms_opt(8, 25, 0).unwrap(), None).unwrap();
        }

        let streaks = sessions.streaks(today).unwrap();
        assert_eq!(streaks.current, 3);
        assert_eq!(streaks.longest, 3);
    }

    #[test_context(FocusTestContext)]
    #[test]
    fn test_task_link_cleared_on_task_delete(ctx: &mut FocusTestContext) {
        let mut tasks = Tasks::new(&ctx.db_path).unwrap();
        let task = tasks.create(NewTask::new("Linked")).unwrap();

        let mut sessions = FocusSessions::new(&ctx.db_path).unwrap();
        let mut new = NewSession::new("On task", 25);
        new.task_id = Some(task.id.clone());
        let session = sessions.create(new).unwrap();
        assert_eq!(sessions.list_for_task(&task.id).unwrap().len(), 1);

        tasks.delete(&task.id).unwrap();

        // The session survives with its link nulled out.
        let orphan = sessions.get(&session.id).unwrap().unwrap();
        assert!(orphan.task_id.is_none());
    }
}
