#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, Local, TimeZone};
    use hours::db::db::{Db, DB_FILE_NAME};
    use hours::db::error::DbError;
    use hours::db::stats::Stats;
    use hours::db::task_logs::TaskLogs;
    use hours::db::tasks::Tasks;
    use hours::libs::task::Task;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    struct TaskLogTestContext {
        _temp_dir: TempDir,
        db: Db,
    }

    impl TestContext for TaskLogTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let db = Db::open(&temp_dir.path().join(DB_FILE_NAME)).unwrap();
            TaskLogTestContext { _temp_dir: temp_dir, db }
        }
    }

    fn at(day: u32, hour: u32, min: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 6, day, hour, min, 0).unwrap()
    }

    fn task(db: &Db, summary: &str) -> Task {
        Tasks::new(db).insert(summary, at(1, 9, 0)).unwrap()
    }

    fn updated_at(db: &Db, task_id: i64) -> DateTime<Local> {
        Tasks::new(db).fetch(task_id).unwrap().unwrap().updated_at
    }

    fn secs_spent(db: &Db, task_id: i64) -> i64 {
        Tasks::new(db).fetch(task_id).unwrap().unwrap().secs_spent
    }

    fn closed_logs_sum(db: &Db, task_id: i64) -> i64 {
        db.lock()
            .query_row(
                "SELECT COALESCE(SUM(secs_spent), 0) FROM task_log WHERE task_id = ?1 AND active = 0",
                [task_id],
                |row| row.get(0),
            )
            .unwrap()
    }

    fn active_count(db: &Db) -> i64 {
        db.lock()
            .query_row("SELECT COUNT(*) FROM task_log WHERE active = 1", [], |row| row.get(0))
            .unwrap()
    }

    #[test_context(TaskLogTestContext)]
    #[test]
    fn test_second_active_log_is_rejected(ctx: &mut TaskLogTestContext) {
        let a = task(&ctx.db, "a");
        let b = task(&ctx.db, "b");
        let logs = TaskLogs::new(&ctx.db);

        logs.insert_active_log(a.id, at(20, 10, 0), None).unwrap();
        let result = logs.insert_active_log(b.id, at(20, 10, 5), None);

        assert!(matches!(result, Err(DbError::AlreadyActive)));
        assert_eq!(active_count(&ctx.db), 1);
        assert_eq!(logs.fetch_active_log_details().unwrap().unwrap().task_id, a.id);
    }

    #[test_context(TaskLogTestContext)]
    #[test]
    fn test_finish_active_log_updates_aggregate(ctx: &mut TaskLogTestContext) {
        let a = task(&ctx.db, "a");
        let logs = TaskLogs::new(&ctx.db);

        logs.insert_active_log(a.id, at(20, 10, 0), Some("draft")).unwrap();
        let details = logs.fetch_active_log_details().unwrap().unwrap();
        assert_eq!(details.task_summary, "a");
        assert_eq!(details.current_begin_ts, at(20, 10, 0));
        assert_eq!(details.current_comment.as_deref(), Some("draft"));

        let id = logs.finish_active_log(a.id, at(20, 10, 0), at(20, 10, 45), Some("done"), at(20, 10, 45)).unwrap();
        assert_eq!(id, details.current_log_id);

        let log = logs.fetch_log(id).unwrap().unwrap();
        assert!(!log.active);
        assert_eq!(log.end_ts, Some(at(20, 10, 45)));
        assert_eq!(log.secs_spent, 2700);
        assert_eq!(log.comment.as_deref(), Some("done"));

        assert_eq!(secs_spent(&ctx.db, a.id), 2700);
        assert_eq!(active_count(&ctx.db), 0);
    }

    #[test_context(TaskLogTestContext)]
    #[test]
    fn test_finish_requires_matching_active_log(ctx: &mut TaskLogTestContext) {
        let a = task(&ctx.db, "a");
        let b = task(&ctx.db, "b");
        let logs = TaskLogs::new(&ctx.db);

        let result = logs.finish_active_log(a.id, at(20, 10, 0), at(20, 11, 0), None, at(20, 11, 0));
        assert!(matches!(result, Err(DbError::NoActiveLog)));

        logs.insert_active_log(a.id, at(20, 10, 0), None).unwrap();
        let result = logs.finish_active_log(b.id, at(20, 10, 0), at(20, 11, 0), None, at(20, 11, 0));
        assert!(matches!(result, Err(DbError::NoActiveLog)));
        assert_eq!(secs_spent(&ctx.db, b.id), 0);
        assert_eq!(active_count(&ctx.db), 1);
    }

    #[test_context(TaskLogTestContext)]
    #[test]
    fn test_edit_active_log(ctx: &mut TaskLogTestContext) {
        let a = task(&ctx.db, "a");
        let logs = TaskLogs::new(&ctx.db);

        assert!(matches!(logs.edit_active_log(Some(at(20, 9, 0)), None), Err(DbError::NoActiveLog)));

        logs.insert_active_log(a.id, at(20, 10, 0), Some("draft")).unwrap();

        logs.edit_active_log(Some(at(20, 9, 30)), None).unwrap();
        let details = logs.fetch_active_log_details().unwrap().unwrap();
        assert_eq!(details.current_begin_ts, at(20, 9, 30));
        assert_eq!(details.current_comment.as_deref(), Some("draft"));

        logs.edit_active_log(None, Some(None)).unwrap();
        let details = logs.fetch_active_log_details().unwrap().unwrap();
        assert_eq!(details.current_begin_ts, at(20, 9, 30));
        assert_eq!(details.current_comment, None);
    }

    #[test_context(TaskLogTestContext)]
    #[test]
    fn test_quick_switch(ctx: &mut TaskLogTestContext) {
        let a = task(&ctx.db, "a");
        let b = task(&ctx.db, "b");
        let logs = TaskLogs::new(&ctx.db);

        logs.insert_active_log(a.id, at(20, 10, 0), None).unwrap();
        let new_id = logs.quick_switch_active(b.id, at(20, 10, 30), Some("next")).unwrap();

        let details = logs.fetch_active_log_details().unwrap().unwrap();
        assert_eq!(details.current_log_id, new_id);
        assert_eq!(details.task_id, b.id);
        assert_eq!(details.current_begin_ts, at(20, 10, 30));
        assert_eq!(active_count(&ctx.db), 1);

        let closed = logs.fetch_logs(true, 10).unwrap();
        assert_eq!(closed.len(), 1);
        assert_eq!(closed[0].task_id, a.id);
        assert_eq!(closed[0].begin_ts, at(20, 10, 0));
        assert_eq!(closed[0].end_ts, Some(at(20, 10, 30)));
        assert_eq!(closed[0].secs_spent, 1800);
        assert_eq!(secs_spent(&ctx.db, a.id), 1800);
    }

    #[test_context(TaskLogTestContext)]
    #[test]
    fn test_quick_switch_drops_sub_minute_log(ctx: &mut TaskLogTestContext) {
        let a = task(&ctx.db, "a");
        let b = task(&ctx.db, "b");
        let logs = TaskLogs::new(&ctx.db);

        logs.insert_active_log(a.id, at(20, 10, 0), None).unwrap();
        logs.quick_switch_active(b.id, at(20, 10, 0) + Duration::seconds(30), None).unwrap();

        assert!(logs.fetch_logs(true, 10).unwrap().is_empty());
        assert_eq!(secs_spent(&ctx.db, a.id), 0);
        assert_eq!(logs.fetch_active_log_details().unwrap().unwrap().task_id, b.id);
    }

    #[test_context(TaskLogTestContext)]
    #[test]
    fn test_delete_active_log_keeps_aggregate(ctx: &mut TaskLogTestContext) {
        let a = task(&ctx.db, "a");
        let logs = TaskLogs::new(&ctx.db);

        assert!(matches!(logs.delete_active_log(), Err(DbError::NoActiveLog)));

        logs.insert_manual_log(a.id, at(19, 9, 0), at(19, 10, 0), None, at(19, 10, 0)).unwrap();
        logs.insert_active_log(a.id, at(20, 10, 0), None).unwrap();
        logs.delete_active_log().unwrap();

        assert_eq!(active_count(&ctx.db), 0);
        assert_eq!(secs_spent(&ctx.db, a.id), 3600);
    }

    #[test_context(TaskLogTestContext)]
    #[test]
    fn test_delete_restores_aggregate(ctx: &mut TaskLogTestContext) {
        let a = task(&ctx.db, "a");
        let logs = TaskLogs::new(&ctx.db);

        let two_hours = logs.insert_manual_log(a.id, at(20, 8, 0), at(20, 10, 0), None, at(20, 10, 0)).unwrap();
        logs.insert_manual_log(a.id, at(20, 11, 0), at(20, 14, 0), None, at(20, 14, 0)).unwrap();
        assert_eq!(secs_spent(&ctx.db, a.id), 18000);

        let log = logs.fetch_log(two_hours).unwrap().unwrap();
        logs.delete_log(&log, at(21, 9, 0)).unwrap();

        assert_eq!(secs_spent(&ctx.db, a.id), 10800);
        assert_eq!(logs.fetch_logs(true, 10).unwrap().len(), 1);
        assert!(matches!(logs.delete_log(&log, at(21, 9, 0)), Err(DbError::LogNotFound(id)) if id == two_hours));
    }

    #[test_context(TaskLogTestContext)]
    #[test]
    fn test_delete_log_refuses_active_log(ctx: &mut TaskLogTestContext) {
        let a = task(&ctx.db, "a");
        let logs = TaskLogs::new(&ctx.db);

        let id = logs.insert_active_log(a.id, at(20, 10, 0), None).unwrap();
        let active = logs.fetch_log(id).unwrap().unwrap();

        assert!(matches!(logs.delete_log(&active, at(20, 10, 5)), Err(DbError::LogNotFound(_))));
        assert_eq!(active_count(&ctx.db), 1);
    }

    #[test_context(TaskLogTestContext)]
    #[test]
    fn test_manual_insert_for_missing_task_rolls_back(ctx: &mut TaskLogTestContext) {
        let logs = TaskLogs::new(&ctx.db);

        assert!(logs.insert_manual_log(99, at(20, 8, 0), at(20, 9, 0), None, at(20, 9, 0)).is_err());
        assert!(logs.fetch_logs(true, 10).unwrap().is_empty());
    }

    #[test_context(TaskLogTestContext)]
    #[test]
    fn test_aggregate_matches_closed_logs(ctx: &mut TaskLogTestContext) {
        let a = task(&ctx.db, "a");
        let b = task(&ctx.db, "b");
        let logs = TaskLogs::new(&ctx.db);

        logs.insert_manual_log(a.id, at(18, 9, 0), at(18, 9, 45), None, at(18, 9, 45)).unwrap();
        logs.insert_active_log(a.id, at(20, 9, 0), None).unwrap();
        logs.quick_switch_active(b.id, at(20, 9, 20), None).unwrap();
        logs.finish_active_log(b.id, at(20, 9, 20), at(20, 11, 0), None, at(20, 11, 0)).unwrap();
        let extra = logs.insert_manual_log(b.id, at(19, 13, 0), at(19, 13, 10), None, at(19, 13, 10)).unwrap();
        logs.delete_log(&logs.fetch_log(extra).unwrap().unwrap(), at(20, 11, 5)).unwrap();

        for task_id in [a.id, b.id] {
            assert_eq!(secs_spent(&ctx.db, task_id), closed_logs_sum(&ctx.db, task_id));
        }
        assert_eq!(secs_spent(&ctx.db, a.id), 45 * 60 + 20 * 60);
        assert_eq!(secs_spent(&ctx.db, b.id), 100 * 60);
    }

    #[test_context(TaskLogTestContext)]
    #[test]
    fn test_aggregate_writes_advance_updated_at(ctx: &mut TaskLogTestContext) {
        let a = task(&ctx.db, "a");
        let b = task(&ctx.db, "b");
        let logs = TaskLogs::new(&ctx.db);
        let created = updated_at(&ctx.db, a.id);

        logs.insert_active_log(a.id, at(20, 9, 0), None).unwrap();
        logs.finish_active_log(a.id, at(20, 9, 0), at(20, 10, 0), None, at(20, 10, 1)).unwrap();
        let finished = updated_at(&ctx.db, a.id);
        assert_eq!(finished, at(20, 10, 1));
        assert!(finished > created);

        logs.insert_active_log(a.id, at(20, 11, 0), None).unwrap();
        logs.quick_switch_active(b.id, at(20, 11, 30), None).unwrap();
        let switched = updated_at(&ctx.db, a.id);
        assert_eq!(switched, at(20, 11, 30));
        assert!(switched > finished);

        let manual = logs.insert_manual_log(a.id, at(19, 8, 0), at(19, 9, 0), None, at(20, 12, 0)).unwrap();
        let inserted = updated_at(&ctx.db, a.id);
        assert_eq!(inserted, at(20, 12, 0));
        assert!(inserted > switched);

        logs.delete_log(&logs.fetch_log(manual).unwrap().unwrap(), at(20, 12, 15)).unwrap();
        let deleted = updated_at(&ctx.db, a.id);
        assert_eq!(deleted, at(20, 12, 15));
        assert!(deleted > inserted);

        assert_eq!(secs_spent(&ctx.db, a.id), 3600 + 1800);
    }

    #[test_context(TaskLogTestContext)]
    #[test]
    fn test_fetch_logs_between_uses_end_ts(ctx: &mut TaskLogTestContext) {
        let a = task(&ctx.db, "a");
        let logs = TaskLogs::new(&ctx.db);

        // ends on the 20th although it began on the 19th
        logs.insert_manual_log(a.id, at(19, 23, 0), at(20, 0, 30), None, at(20, 0, 30)).unwrap();
        logs.insert_manual_log(a.id, at(20, 9, 0), at(20, 10, 0), None, at(20, 10, 0)).unwrap();
        // ends exactly at the exclusive bound
        logs.insert_manual_log(a.id, at(20, 23, 0), at(21, 0, 0), None, at(21, 0, 0)).unwrap();

        let between = logs.fetch_logs_between(at(20, 0, 0), at(21, 0, 0), 10).unwrap();
        assert_eq!(between.len(), 2);
        assert_eq!(between[0].begin_ts, at(19, 23, 0));
        assert_eq!(between[1].begin_ts, at(20, 9, 0));
    }

    #[test_context(TaskLogTestContext)]
    #[test]
    fn test_stats_aggregates(ctx: &mut TaskLogTestContext) {
        let a = task(&ctx.db, "a");
        let b = task(&ctx.db, "b");
        let logs = TaskLogs::new(&ctx.db);

        logs.insert_manual_log(a.id, at(18, 9, 0), at(18, 12, 0), None, at(18, 12, 0)).unwrap();
        logs.insert_manual_log(b.id, at(20, 9, 0), at(20, 10, 0), None, at(20, 10, 0)).unwrap();
        logs.insert_manual_log(a.id, at(20, 11, 0), at(20, 11, 30), None, at(20, 11, 30)).unwrap();

        let stats = Stats::new(&ctx.db);

        let all_time = stats.aggregate_per_task(10).unwrap();
        assert_eq!(all_time.len(), 2);
        assert_eq!((all_time[0].task_id, all_time[0].num_entries, all_time[0].secs_spent), (a.id, 2, 3 * 3600 + 1800));
        assert_eq!((all_time[1].task_id, all_time[1].secs_spent), (b.id, 3600));

        let day = stats.aggregate_per_task_between(at(20, 0, 0), at(21, 0, 0), 10).unwrap();
        assert_eq!(day.len(), 2);
        assert_eq!((day[0].task_id, day[0].secs_spent), (b.id, 3600));
        assert_eq!((day[1].task_id, day[1].num_entries, day[1].secs_spent), (a.id, 1, 1800));

        assert_eq!(stats.aggregate_per_task(1).unwrap().len(), 1);
    }
}
