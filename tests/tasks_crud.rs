#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};
    use vitalog::db::tasks::{NewTask, SortDirection, TaskFilter, TaskPatch, TaskPriority, TaskSort, TaskSortField, TaskStatus, Tasks};

    struct TaskTestContext {
        _temp_dir: TempDir,
        db_path: PathBuf,
    }

    impl TestContext for TaskTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let db_path = temp_dir.path().join("vitalog.db");
            TaskTestContext { _temp_dir: temp_dir, db_path }
        }
    }

    #[test_context(TaskTestContext)]
    #[test]
    fn test_create_round_trip(ctx: &mut TaskTestContext) {
        let mut tasks = Tasks::new(&ctx.db_path).unwrap();

        let mut new = NewTask::new("Write report");
        new.tags = vec!["work".to_string(), "urgent".to_string()];
        new.priority = Some(TaskPriority::High);
        let created = tasks.create(new).unwrap();

        assert_eq!(created.title, "Write report");
        assert_eq!(created.status, TaskStatus::Todo);
        assert_eq!(created.priority, TaskPriority::High);
        assert_eq!(created.tags, vec!["work", "urgent"]);
        assert!(!created.synced);
        assert!(created.completed_at.is_none());

        // Re-read returns the row field-for-field.
        let fetched = tasks.get(&created.id).unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[test_context(TaskTestContext)]
    #[test]
    fn test_update_partiality(ctx: &mut TaskTestContext) {
        let mut tasks = Tasks::new(&ctx.db_path).unwrap();

        let mut new = NewTask::new("Original");
        new.description = Some("keep me".to_string());
        new.due_date = Some("2026-09-15".to_string());
        new.tags = vec!["a".to_string()];
        let created = tasks.create(new).unwrap();

        // Only the priority changes.
        let updated = tasks
            .update(
                &created.id,
                &TaskPatch {
                    priority: Some(TaskPriority::Urgent),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.priority, TaskPriority::Urgent);
        assert_eq!(updated.title, created.title);
        assert_eq!(updated.description, created.description);
        assert_eq!(updated.due_date, created.due_date);
        assert_eq!(updated.tags, created.tags);
        assert_eq!(updated.created_at, created.created_at);
        assert!(!updated.synced);
    }

    #[test_context(TaskTestContext)]
    #[test]
    fn test_completed_at_follows_status(ctx: &mut TaskTestContext) {
        let mut tasks = Tasks::new(&ctx.db_path).unwrap();
        let created = tasks.create(NewTask::new("Finish me")).unwrap();

        let completed = tasks
            .update(
                &created.id,
                &TaskPatch {
                    status: Some(TaskStatus::Completed),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(completed.status, TaskStatus::Completed);
        assert!(completed.completed_at.is_some());

        // Moving back out of completed clears the stamp.
        let reopened = tasks
            .update(
                &created.id,
                &TaskPatch {
                    status: Some(TaskStatus::Todo),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(reopened.completed_at.is_none());
    }

    #[test_context(TaskTestContext)]
    #[test]
    fn test_update_missing_task_is_not_found(ctx: &mut TaskTestContext) {
        let mut tasks = Tasks::new(&ctx.db_path).unwrap();
        let result = tasks.update(
            "no-such-id",
            &TaskPatch {
                title: Some("x".to_string()),
                ..Default::default()
            },
        );
        assert!(result.is_err());
    }

    #[test_context(TaskTestContext)]
    #[test]
    fn test_filters_and_priority_sort(ctx: &mut TaskTestContext) {
        let mut tasks = Tasks::new(&ctx.db_path).unwrap();

        for (title, priority) in [
            ("low one", TaskPriority::Low),
            ("urgent one", TaskPriority::Urgent),
            ("medium one", TaskPriority::Medium),
        ] {
            let mut new = NewTask::new(title);
            new.priority = Some(priority);
            tasks.create(new).unwrap();
        }

        let sorted = tasks
            .fetch(
                &TaskFilter::default(),
                TaskSort {
                    field: TaskSortField::Priority,
                    direction: SortDirection::Desc,
                },
            )
            .unwrap();
        let priorities: Vec<TaskPriority> = sorted.iter().map(|t| t.priority).collect();
        assert_eq!(priorities, vec![TaskPriority::Urgent, TaskPriority::Medium, TaskPriority::Low]);

        let filter = TaskFilter {
            priorities: vec![TaskPriority::Urgent, TaskPriority::Low],
            ..Default::default()
        };
        let subset = tasks.fetch(&filter, TaskSort::default()).unwrap();
        assert_eq!(subset.len(), 2);

        let search = tasks
            .fetch(
                &TaskFilter {
                    search: Some("medium".to_string()),
                    ..Default::default()
                },
                TaskSort::default(),
            )
            .unwrap();
        assert_eq!(search.len(), 1);
        assert_eq!(search[0].title, "medium one");
    }

    #[test_context(TaskTestContext)]
    #[test]
    fn test_tag_filter(ctx: &mut TaskTestContext) {
        let mut tasks = Tasks::new(&ctx.db_path).unwrap();

        let mut tagged = NewTask::new("tagged");
        tagged.tags = vec!["deep-work".to_string()];
        tasks.create(tagged).unwrap();
        tasks.create(NewTask::new("untagged")).unwrap();

        let found = tasks
            .fetch(
                &TaskFilter {
                    tag: Some("deep-work".to_string()),
                    ..Default::default()
                },
                TaskSort::default(),
            )
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "tagged");
    }

    #[test_context(TaskTestContext)]
    #[test]
    fn test_delete_and_delete_many(ctx: &mut TaskTestContext) {
        let mut tasks = Tasks::new(&ctx.db_path).unwrap();

        let ids: Vec<String> = (1..=5).map(|i| tasks.create(NewTask::new(&format!("Task {}", i))).unwrap().id).collect();

        tasks.delete(&ids[0]).unwrap();
        assert!(tasks.get(&ids[0]).unwrap().is_none());
        assert!(tasks.delete(&ids[0]).is_err());

        let deleted = tasks.delete_many(&ids[1..4]).unwrap();
        assert_eq!(deleted, 3);

        let remaining = tasks.fetch(&TaskFilter::default(), TaskSort::default()).unwrap();
        assert_eq!(remaining.len(), 1);
    }

    #[test_context(TaskTestContext)]
    #[test]
    fn test_clear_project_detaches_tasks(ctx: &mut TaskTestContext) {
        let mut tasks = Tasks::new(&ctx.db_path).unwrap();

        let mut new = NewTask::new("in project");
        new.project_id = Some("proj-1".to_string());
        let created = tasks.create(new).unwrap();
        assert_eq!(tasks.fetch_by_project("proj-1").unwrap().len(), 1);

        let affected = tasks.clear_project("proj-1").unwrap();
        assert_eq!(affected, 1);
        let detached = tasks.get(&created.id).unwrap().unwrap();
        assert!(detached.project_id.is_none());
    }
}
