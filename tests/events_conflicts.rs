#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};
    use std::path::PathBuf;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};
    use vitalog::analytics::conflicts::ConflictDetector;
    use vitalog::db::events::{EventPatch, Events, NewEvent};

    struct EventTestContext {
        _temp_dir: TempDir,
        db_path: PathBuf,
    }

    impl TestContext for EventTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let db_path = temp_dir.path().join("vitalog.db");
            EventTestContext { _temp_dir: temp_dir, db_path }
        }
    }

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 9, 1).unwrap().and_hms_opt(hour, minute, 0).unwrap()
    }

    #[test_context(EventTestContext)]
    #[test]
    fn test_create_round_trip(ctx: &mut EventTestContext) {
        let mut events = Events::new(&ctx.db_path).unwrap();

        let mut new = NewEvent::new("Standup", at(9, 0), at(9, 15));
        new.location = Some("Room 4".to_string());
        let created = events.create(new).unwrap();

        assert_eq!(created.title, "Standup");
        assert_eq!(created.start_time, at(9, 0));
        assert_eq!(created.end_time, at(9, 15));
        assert!(!created.is_all_day);
        assert_eq!(created.location.as_deref(), Some("Room 4"));

        let fetched = events.get(&created.id).unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[test_context(EventTestContext)]
    #[test]
    fn test_partial_overlap_reports_exact_window(ctx: &mut EventTestContext) {
        let mut events = Events::new(&ctx.db_path).unwrap();
        let existing = events.create(NewEvent::new("Existing", at(10, 30), at(10, 45))).unwrap();

        let detector = ConflictDetector::new(&ctx.db_path).unwrap();
        let conflicts = detector.detect(at(10, 0), at(11, 0), false, None).unwrap();

        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].event.id, existing.id);
        assert_eq!(conflicts[0].overlap_start, at(10, 30));
        assert_eq!(conflicts[0].overlap_end, at(10, 45));
        assert_eq!(conflicts[0].overlap_minutes, 15);
    }

    #[test_context(EventTestContext)]
    #[test]
    fn test_back_to_back_events_do_not_conflict(ctx: &mut EventTestContext) {
        let mut events = Events::new(&ctx.db_path).unwrap();
        events.create(NewEvent::new("Morning block", at(9, 0), at(10, 0))).unwrap();

        let detector = ConflictDetector::new(&ctx.db_path).unwrap();
        let conflicts = detector.detect(at(10, 0), at(11, 0), false, None).unwrap();
        assert!(conflicts.is_empty());
    }

    #[test_context(EventTestContext)]
    #[test]
    fn test_all_day_events_never_conflict(ctx: &mut EventTestContext) {
        let mut events = Events::new(&ctx.db_path).unwrap();
        let mut all_day = NewEvent::new("Holiday", at(0, 0), at(23, 59));
        all_day.is_all_day = true;
        events.create(all_day).unwrap();

        let detector = ConflictDetector::new(&ctx.db_path).unwrap();
        // All-day events are excluded from the candidate set.
        assert!(detector.detect(at(10, 0), at(11, 0), false, None).unwrap().is_empty());
        // And an all-day candidate conflicts with nothing.
        events.create(NewEvent::new("Timed", at(10, 0), at(11, 0))).unwrap();
        assert!(detector.detect(at(0, 0), at(23, 59), true, None).unwrap().is_empty());
    }

    #[test_context(EventTestContext)]
    #[test]
    fn test_exclude_self_when_editing(ctx: &mut EventTestContext) {
        let mut events = Events::new(&ctx.db_path).unwrap();
        let editing = events.create(NewEvent::new("Editing", at(10, 0), at(11, 0))).unwrap();

        let detector = ConflictDetector::new(&ctx.db_path).unwrap();
        let with_self = detector.detect(at(10, 0), at(11, 0), false, None).unwrap();
        assert_eq!(with_self.len(), 1);

        let without_self = detector.detect(at(10, 0), at(11, 0), false, Some(&editing.id)).unwrap();
        assert!(without_self.is_empty());
    }

    #[test_context(EventTestContext)]
    #[test]
    fn test_conflicts_sorted_by_start_time(ctx: &mut EventTestContext) {
        let mut events = Events::new(&ctx.db_path).unwrap();
        events.create(NewEvent::new("Later", at(10, 30), at(11, 30))).unwrap();
        events.create(NewEvent::new("Earlier", at(9, 30), at(10, 30))).unwrap();

        let detector = ConflictDetector::new(&ctx.db_path).unwrap();
        let conflicts = detector.detect(at(9, 0), at(12, 0), false, None).unwrap();
        assert_eq!(conflicts.len(), 2);
        assert_eq!(conflicts[0].event.title, "Earlier");
        assert_eq!(conflicts[1].event.title, "Later");
    }

    #[test_context(EventTestContext)]
    #[test]
    fn test_fetch_between_window(ctx: &mut EventTestContext) {
        let mut events = Events::new(&ctx.db_path).unwrap();
        events.create(NewEvent::new("Inside", at(10, 0), at(11, 0))).unwrap();
        events.create(NewEvent::new("Outside", at(15, 0), at(16, 0))).unwrap();

        let found = events.fetch_between(at(9, 0), at(12, 0)).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Inside");
    }

    #[test_context(EventTestContext)]
    #[test]
    fn test_update_patch(ctx: &mut EventTestContext) {
        let mut events = Events::new(&ctx.db_path).unwrap();
        let created = events.create(NewEvent::new("Review", at(14, 0), at(15, 0))).unwrap();

        let updated = events
            .update(
                &created.id,
                &EventPatch {
                    start_time: Some(at(14, 30)),
                    location: Some(Some("Online".to_string())),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.start_time, at(14, 30));
        assert_eq!(updated.end_time, at(15, 0));
        assert_eq!(updated.location.as_deref(), Some("Online"));
        assert_eq!(updated.title, created.title);
    }

    #[test_context(EventTestContext)]
    #[test]
    fn test_delete(ctx: &mut EventTestContext) {
        let mut events = Events::new(&ctx.db_path).unwrap();
        let created = events.create(NewEvent::new("Gone", at(8, 0), at(9, 0))).unwrap();
        events.delete(&created.id).unwrap();
        assert!(events.get(&created.id).unwrap().is_none());
    }
}
