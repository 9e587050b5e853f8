use actix_web::{middleware::Logger, web, App, HttpServer};
use datalayer::{get_database, get_global_config_manager, CacheSettings, ConfigError, Database, MemoryCache};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};

use crate::error::{AppError, AppResult};
use crate::route_registry::{configure_global_routes, log_global_routes};

/// 应用配置结构体
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            workers: Some(8),
        }
    }
}

impl AppConfig {
    /// 从 `server.*` 读取，缺省项保留默认值
    /// Reads `server.*`, missing keys keep their defaults
    pub fn from_config() -> AppResult<Self> {
        let mgr = get_global_config_manager().map_err(init_error)?;
        let defaults = Self::default();
        let port: i64 = match mgr.get_safe::<i64>("server.port") {
            Ok(port) => port,
            Err(ConfigError::KeyNotFound { .. }) => defaults.port as i64,
            Err(e) => return Err(e.into()),
        };
        let port = u16::try_from(port)
            .map_err(|_| AppError::validation("server.port", format!("{} 超出端口范围", port)))?;
        Ok(Self {
            host: mgr.get_or("server.host", defaults.host),
            port,
            workers: mgr
                .get::<i64>("server.workers")
                .ok()
                .and_then(|w| usize::try_from(w).ok())
                .or(defaults.workers),
        })
    }
}

/// 请求间共享的状态：数据库句柄与可选缓存
/// State shared between requests: database handle and optional cache
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub cache: Option<CacheSettings>,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        Self { db, cache: None }
    }

    pub fn with_cache(mut self, settings: CacheSettings) -> Self {
        self.cache = Some(settings);
        self
    }
}

fn init_error(e: anyhow::Error) -> AppError {
    AppError::Config(ConfigError::InitializationError {
        message: e.to_string(),
    })
}

/// 初始化日志：`logging.format = "json"` 时输出 bunyan JSON，否则使用紧凑格式
/// Logging: bunyan JSON when `logging.format = "json"`, compact text otherwise
pub fn init_logging() -> AppResult<()> {
    let mgr = get_global_config_manager().map_err(init_error)?;
    let format: String = mgr.get_or("logging.format", "text".to_string());
    if format != "json" {
        return datalayer::init_tracing().map_err(AppError::Internal);
    }

    let level: String = mgr.get_or("logging.level", "info".to_string());
    let log_sql: bool = mgr.get_or("logging.sql", false);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(datalayer::comm::tracing::filter_directive(&level, log_sql)))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let formatting_layer = BunyanFormattingLayer::new("datalayer-server".into(), std::io::stdout);
    // actix Logger 走 log 门面 / actix Logger writes through `log`
    LogTracer::init().ok();
    let subscriber = Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(formatting_layer);
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("设置日志订阅器失败: {}", e)))
}

/// 按 `cache.enabled` / `cache.ttl`（秒）构建内存缓存
/// Builds the in-memory cache from `cache.enabled` and `cache.ttl` (seconds)
pub fn cache_from_config() -> AppResult<Option<CacheSettings>> {
    let mgr = get_global_config_manager().map_err(init_error)?;
    if !mgr.get_or("cache.enabled", true) {
        return Ok(None);
    }
    let ttl: u64 = mgr.get_or("cache.ttl", 60);
    Ok(Some(CacheSettings::new(
        Arc::new(MemoryCache::new()),
        Duration::from_secs(ttl),
    )))
}

/// 应用启动器
pub struct AppBootstrap {
    config: Option<AppConfig>,
}

impl AppBootstrap {
    pub fn new() -> Self {
        Self { config: None }
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// 运行应用服务器：数据库 → 建表 → HTTP
    /// Runs the server: database, then schema, then HTTP
    #[instrument(skip(self))]
    pub async fn run(self) -> AppResult<()> {
        let config = self.config.clone().unwrap_or_default();
        info!(?config, "启动应用服务器");

        let mgr = get_global_config_manager().map_err(init_error)?;
        mgr.log_sources();

        let db = get_database("default").await?;
        crate::schema::migrate(&db).await?;

        let mut state = AppState::new(db);
        if let Some(settings) = cache_from_config()? {
            state = state.with_cache(settings);
        }

        log_global_routes();
        match self.start_http_server(config, state).await {
            Ok(_) => {
                info!("服务器已停止");
                Ok(())
            }
            Err(e) => {
                error!("服务器启动失败: {}", e);
                Err(e)
            }
        }
    }

    /// 启动HTTP服务器
    async fn start_http_server(&self, config: AppConfig, state: AppState) -> AppResult<()> {
        let data = web::Data::new(state);
        let mut server = HttpServer::new(move || {
            App::new()
                .wrap(Logger::default())
                .app_data(data.clone())
                .configure(configure_global_routes)
        });
        if let Some(workers) = config.workers {
            server = server.workers(workers);
        }

        info!(host = %config.host, port = config.port, "服务器监听中");
        server.bind((config.host.as_str(), config.port))?.run().await?;
        Ok(())
    }
}

impl Default for AppBootstrap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datalayer::{set_global_config_manager, ConfigManager, ConfigSource};
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_config_from_sources() {
        let map: HashMap<String, serde_json::Value> = [
            ("server.host", json!("127.0.0.1")),
            ("server.port", json!(8088)),
            ("cache.enabled", json!(false)),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        let manager = ConfigManager::with_sources(vec![ConfigSource::Memory(map)]).unwrap();
        set_global_config_manager(manager).unwrap();

        let config = AppConfig::from_config().unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8088);
        assert!(cache_from_config().unwrap().is_none());
    }
}
