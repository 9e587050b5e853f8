// datalayer 库主入口，按需导出模块

pub mod comm;
pub use crate::comm::config::*;
pub use crate::comm::tracing::init_tracing;

pub mod db;
pub use crate::db::connection::*;
pub use crate::db::dialect::Dialect;
pub use crate::db::error::*;
pub use crate::db::model::*;
pub use crate::db::query::*;
pub use crate::db::value::{ColumnKind, Value};

// 导出通用仓库
pub mod repo;
pub use crate::repo::*;

pub mod http;

pub use tracing::{debug, error, info, trace, warn};

// 健康检查接口与状态定义（统一对外暴露）
// Health check interface and status definitions (unified public exposure)
use async_trait::async_trait;

/// 健康状态结构体：用于表示组件当前健康状况
/// Health status struct: represents the current health of a component
#[derive(Debug, serde::Serialize)]
pub struct HealthStatus {
    /// 组件名称（如 sqlite_pool）/ Component name, e.g. sqlite_pool
    pub component: String,
    pub healthy: bool,
    /// 附加消息（错误信息或提示）/ Additional message
    pub message: Option<String>,
    /// 采样时间戳（UTC）/ Sample timestamp (UTC)
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// 健康检查通用接口 / Generic health check interface
#[async_trait]
pub trait HealthCheck {
    async fn check_health(&self) -> HealthStatus;
}
