use datalayer::{Database, Dialect};

/// 演示表结构；时间列统一存为 `YYYY-MM-DD HH:MM:SS` 文本
/// Demo tables; timestamp columns hold `YYYY-MM-DD HH:MM:SS` text
fn ddl(dialect: Dialect) -> &'static str {
    match dialect {
        Dialect::Sqlite => {
            "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT,
                age INTEGER NOT NULL DEFAULT 0,
                created_at TEXT,
                updated_at TEXT,
                deleted_at TEXT
             );
             CREATE TABLE IF NOT EXISTS posts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                title TEXT NOT NULL
             )"
        }
        Dialect::Postgres => {
            "CREATE TABLE IF NOT EXISTS users (
                id BIGSERIAL PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT,
                age BIGINT NOT NULL DEFAULT 0,
                created_at TEXT,
                updated_at TEXT,
                deleted_at TEXT
             );
             CREATE TABLE IF NOT EXISTS posts (
                id BIGSERIAL PRIMARY KEY,
                user_id BIGINT NOT NULL,
                title TEXT NOT NULL
             )"
        }
        Dialect::MySql => {
            "CREATE TABLE IF NOT EXISTS users (
                id BIGINT AUTO_INCREMENT PRIMARY KEY,
                name VARCHAR(255) NOT NULL,
                email VARCHAR(255),
                age BIGINT NOT NULL DEFAULT 0,
                created_at VARCHAR(19),
                updated_at VARCHAR(19),
                deleted_at VARCHAR(19)
             );
             CREATE TABLE IF NOT EXISTS posts (
                id BIGINT AUTO_INCREMENT PRIMARY KEY,
                user_id BIGINT NOT NULL,
                title VARCHAR(255) NOT NULL
             )"
        }
    }
}

/// 建表（幂等）/ Create the demo tables if they are missing
pub async fn migrate(db: &Database) -> datalayer::Result<()> {
    db.execute_script(ddl(db.dialect())).await?;
    tracing::info!(database = db.name(), "schema ready");
    Ok(())
}
