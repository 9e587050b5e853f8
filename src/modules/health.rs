use actix_web::{web, HttpResponse};
use datalayer::HealthCheck;

use crate::app_bootstrap::AppState;
use crate::error::{ApiResponse, AppError, AppResult};

/// 健康检查：执行 `SELECT 1`，失败时返回 503
/// Health check: runs `SELECT 1`, answers 503 on failure
#[actix_web::get("/health")]
pub async fn health(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let status = state.db.check_health().await;
    if !status.healthy {
        tracing::warn!(component = %status.component, message = ?status.message, "health check failed");
        return Err(AppError::unavailable(status.component));
    }
    Ok(HttpResponse::Ok().json(ApiResponse::success(status)))
}

pub fn configure_health_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health);
}

/// 注册health模块的路由
pub fn register_health_routes() {
    crate::register_route!("health", "数据库健康检查", "health", configure_health_routes);
}
