use anyhow::Result;
use chrono::{Datelike, Timelike};
use tracing_log::LogTracer;
use tracing_subscriber::{fmt, EnvFilter};

struct LogTimer;

impl fmt::time::FormatTime for LogTimer {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        let now = chrono::Local::now();
        write!(
            w,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:03}",
            now.year(),
            now.month(),
            now.day(),
            now.hour(),
            now.minute(),
            now.second(),
            now.timestamp_subsec_millis()
        )
    }
}

/// 日志过滤表达式 / Filter directive for the subscriber
///
/// `logging.level` 为基础级别，`logging.sql = true` 时打开 SQL 语句日志
/// `logging.level` is the base level; `logging.sql = true` turns on statement logs
pub fn filter_directive(level: &str, log_sql: bool) -> String {
    let sql_level = if log_sql { "debug" } else { "warn" };
    format!("{},datalayer::db={},sqlx={}", level, sql_level, sql_level)
}

/// 初始化日志（重复调用无副作用）/ Initialise tracing; repeated calls are no-ops
pub fn init_tracing() -> Result<()> {
    let mgr = crate::comm::config::get_global_config_manager().ok();
    let level: String = mgr
        .as_ref()
        .and_then(|m| m.get("logging.level").ok())
        .unwrap_or_else(|| "info".to_string());
    let log_sql: bool = mgr
        .as_ref()
        .map(|m| m.get_or("logging.sql", false))
        .unwrap_or(false);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter_directive(&level, log_sql)))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    LogTracer::init().ok();
    fmt::SubscriberBuilder::default()
        .with_env_filter(filter)
        .with_timer(LogTimer)
        .compact()
        .with_target(false)
        .try_init()
        .ok();
    Ok(())
}
