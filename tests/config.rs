#[cfg(test)]
mod tests {
    use hours::db::db::DB_FILE_NAME;
    use hours::libs::config::{Config, LimitsConfig, CONFIG_FILE_NAME, STATS_LIMIT, TASK_LIST_LIMIT};
    use hours::libs::data_storage::expand_tilde;
    use hours::libs::time::{REPORT_MAX_DAYS, STATS_MAX_DAYS};
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    struct ConfigTestContext {
        temp_dir: TempDir,
    }

    impl TestContext for ConfigTestContext {
        fn setup() -> Self {
            ConfigTestContext {
                temp_dir: tempfile::tempdir().unwrap(),
            }
        }
    }

    impl ConfigTestContext {
        fn config_path(&self) -> PathBuf {
            self.temp_dir.path().join(CONFIG_FILE_NAME)
        }
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_missing_file_gives_defaults(ctx: &mut ConfigTestContext) {
        let config = Config::read_from(&ctx.config_path()).unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.limits.report_max_days, REPORT_MAX_DAYS);
        assert_eq!(config.limits.stats_max_days, STATS_MAX_DAYS);
        assert_eq!(config.limits.task_list_limit, TASK_LIST_LIMIT);
        assert_eq!(config.limits.stats_limit, STATS_LIMIT);
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_partial_file_keeps_other_defaults(ctx: &mut ConfigTestContext) {
        fs::write(ctx.config_path(), r#"{ "limits": { "report_max_days": 14 } }"#).unwrap();

        let config = Config::read_from(&ctx.config_path()).unwrap();
        assert_eq!(config.db_path, None);
        assert_eq!(config.limits.report_max_days, 14);
        assert_eq!(config.limits.stats_max_days, STATS_MAX_DAYS);
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_invalid_file_is_an_error(ctx: &mut ConfigTestContext) {
        fs::write(ctx.config_path(), "{ not json").unwrap();
        assert!(Config::read_from(&ctx.config_path()).is_err());
    }

    #[test_context(ConfigTestContext)]
    #[test]
    fn test_save_and_read_back(ctx: &mut ConfigTestContext) {
        let config = Config {
            db_path: Some("~/work/hours.db".to_string()),
            limits: LimitsConfig {
                task_list_limit: 50,
                ..LimitsConfig::default()
            },
        };

        config.save_to(&ctx.config_path()).unwrap();
        assert_eq!(Config::read_from(&ctx.config_path()).unwrap(), config);
    }

    #[test]
    fn test_db_path_precedence() {
        let home = Path::new("/home/someone");
        let configured = Config {
            db_path: Some("~/work/hours.db".to_string()),
            ..Config::default()
        };

        assert_eq!(Config::default().db_path(None, home), home.join(DB_FILE_NAME));
        assert_eq!(configured.db_path(None, home), home.join("work/hours.db"));
        assert_eq!(configured.db_path(Some("/tmp/other.db"), home), PathBuf::from("/tmp/other.db"));
    }

    #[test]
    fn test_expand_tilde() {
        let home = Path::new("/home/someone");

        assert_eq!(expand_tilde("~", home), home.to_path_buf());
        assert_eq!(expand_tilde("~/a.db", home), home.join("a.db"));
        assert_eq!(expand_tilde("relative/a.db", home), PathBuf::from("relative/a.db"));
        assert_eq!(expand_tilde("~other/a.db", home), PathBuf::from("~other/a.db"));
    }
}
