#[cfg(test)]
mod tests {
    use hours::db::db::{Db, DB_FILE_NAME};
    use hours::db::error::DbError;
    use hours::db::migrations::{current_version, init, needs_migration, Migration, MigrationManager, LATEST_VERSION};
    use rusqlite::{params, Connection, Transaction};
    use std::path::PathBuf;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    struct MigrationTestContext {
        _temp_dir: TempDir,
        db_path: PathBuf,
    }

    impl TestContext for MigrationTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let db_path = temp_dir.path().join(DB_FILE_NAME);
            MigrationTestContext {
                _temp_dir: temp_dir,
                db_path,
            }
        }
    }

    fn noop(_tx: &Transaction) -> rusqlite::Result<()> {
        Ok(())
    }

    fn broken(tx: &Transaction) -> rusqlite::Result<()> {
        tx.execute_batch("CREATE TABLE half_done (id INTEGER); CREATE TABLE broken (")
    }

    fn table_exists(conn: &Connection, name: &str) -> bool {
        conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
            params![name],
            |row| row.get(0),
        )
        .unwrap()
    }

    #[test_context(MigrationTestContext)]
    #[test]
    fn test_open_applies_all_migrations(ctx: &mut MigrationTestContext) {
        let db = Db::open(&ctx.db_path).unwrap();
        let conn = db.lock();

        assert_eq!(current_version(&conn).unwrap(), LATEST_VERSION);
        assert!(!needs_migration(&conn).unwrap());

        let history = MigrationManager::new().history(&conn).unwrap();
        let versions: Vec<u32> = history.iter().map(|(version, _)| *version).collect();
        assert_eq!(versions, vec![1, 2]);
    }

    #[test_context(MigrationTestContext)]
    #[test]
    fn test_reopen_is_idempotent(ctx: &mut MigrationTestContext) {
        drop(Db::open(&ctx.db_path).unwrap());
        let db = Db::open(&ctx.db_path).unwrap();
        let conn = db.lock();

        let rows: i64 = conn.query_row("SELECT COUNT(*) FROM db_versions", [], |row| row.get(0)).unwrap();
        assert_eq!(rows, i64::from(LATEST_VERSION));
    }

    #[test_context(MigrationTestContext)]
    #[test]
    fn test_init_leaves_existing_database_alone(ctx: &mut MigrationTestContext) {
        let mut conn = Db::open_without_migrations(&ctx.db_path).unwrap();
        assert_eq!(current_version(&conn).unwrap(), 0);

        init(&mut conn).unwrap();
        init(&mut conn).unwrap();

        assert_eq!(current_version(&conn).unwrap(), 1);
        assert!(table_exists(&conn, "task"));
        assert!(table_exists(&conn, "task_log"));
        assert!(needs_migration(&conn).unwrap());
    }

    #[test_context(MigrationTestContext)]
    #[test]
    fn test_upgrade_with_custom_registry(ctx: &mut MigrationTestContext) {
        let mut conn = Db::open_without_migrations(&ctx.db_path).unwrap();
        init(&mut conn).unwrap();

        let manager = MigrationManager::with_migrations(vec![Migration {
            version: 2,
            name: "noop",
            up: noop,
        }]);
        manager.upgrade(&mut conn).unwrap();

        assert_eq!(current_version(&conn).unwrap(), 2);
        assert_eq!(manager.name_of(2), Some("noop"));
        assert_eq!(manager.name_of(1), Some("initial_schema"));
    }

    #[test_context(MigrationTestContext)]
    #[test]
    fn test_downgrade_is_refused(ctx: &mut MigrationTestContext) {
        let mut conn = Db::open_without_migrations(&ctx.db_path).unwrap();
        init(&mut conn).unwrap();
        conn.execute(
            "INSERT INTO db_versions (version, created_at) VALUES (3, '2024-06-20 10:00:00.000')",
            [],
        )
        .unwrap();

        let result = MigrationManager::new().upgrade(&mut conn);
        assert!(matches!(result, Err(DbError::DowngradeDetected { db_version: 3, latest: 2 })));
        drop(conn);

        let err = Db::open(&ctx.db_path).err().unwrap();
        assert!(matches!(err, DbError::DowngradeDetected { .. }));
        assert!(err.is_fatal());
    }

    #[test_context(MigrationTestContext)]
    #[test]
    fn test_failed_migration_rolls_back(ctx: &mut MigrationTestContext) {
        let mut conn = Db::open_without_migrations(&ctx.db_path).unwrap();
        init(&mut conn).unwrap();

        let manager = MigrationManager::with_migrations(vec![
            Migration {
                version: 3,
                name: "broken",
                up: broken,
            },
            Migration {
                version: 2,
                name: "noop",
                up: noop,
            },
        ]);

        let result = manager.upgrade(&mut conn);
        assert!(matches!(result, Err(DbError::MigrationFailed { version: 3, .. })));

        // version 2 committed on its own, version 3 left nothing behind
        assert_eq!(current_version(&conn).unwrap(), 2);
        assert!(!table_exists(&conn, "half_done"));
    }

    #[test_context(MigrationTestContext)]
    #[test]
    fn test_missing_registry_entry_fails(ctx: &mut MigrationTestContext) {
        let mut conn = Db::open_without_migrations(&ctx.db_path).unwrap();
        init(&mut conn).unwrap();

        let manager = MigrationManager::with_migrations(vec![Migration {
            version: 3,
            name: "skips_two",
            up: noop,
        }]);

        assert!(matches!(manager.upgrade(&mut conn), Err(DbError::MigrationFailed { version: 2, .. })));
        assert_eq!(current_version(&conn).unwrap(), 1);
    }

    #[test]
    fn test_empty_registry_latest_version() {
        assert_eq!(MigrationManager::with_migrations(Vec::new()).latest_version(), 1);
        assert_eq!(MigrationManager::new().latest_version(), LATEST_VERSION);
    }
}
