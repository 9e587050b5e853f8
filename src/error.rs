use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use datalayer::{ConfigError, DbError};
use serde_json::json;
use thiserror::Error;

/// 服务层统一错误类型（启动流程与非资源接口）
/// Server-level error: boot sequence and non-resource endpoints
#[derive(Error, Debug)]
pub enum AppError {
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    #[error("数据库错误: {0}")]
    Database(#[from] DbError),

    #[error("验证错误: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("服务不可用: {component}")]
    Unavailable { component: String },

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("内部错误: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation<T: Into<String>, U: Into<String>>(field: T, message: U) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn unavailable<T: Into<String>>(component: T) -> Self {
        Self::Unavailable {
            component: component.into(),
        }
    }

    /// 获取错误代码
    pub fn error_code(&self) -> i32 {
        match self {
            AppError::Config(_) => 1001,
            AppError::Database(_) => 1006,
            AppError::Validation { .. } => 1004,
            AppError::Unavailable { .. } => 1010,
            AppError::Io(_) => 1005,
            AppError::Internal(_) => 1000,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            AppError::Config(_) => "Config",
            AppError::Database(_) => "Database",
            AppError::Validation { .. } => "Validation",
            AppError::Unavailable { .. } => "Unavailable",
            AppError::Io(_) => "Io",
            AppError::Internal(_) => "Internal",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(e) => {
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = ResponseError::status_code(self);
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::info!(error = %self, "client error");
        }

        HttpResponse::build(status).json(json!({
            "success": false,
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
                "type": self.kind()
            },
            "timestamp": chrono::Utc::now().to_rfc3339()
        }))
    }
}

/// 应用结果类型
pub type AppResult<T> = Result<T, AppError>;

/// 成功响应结构
#[derive(serde::Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn test_error_response_shape() {
        let resp = AppError::unavailable("sqlite_pool").error_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], 1010);
        assert_eq!(json["error"]["type"], "Unavailable");
    }

    #[test]
    fn test_database_error_status() {
        let err = AppError::from(DbError::NotFound);
        assert_eq!(ResponseError::status_code(&err), StatusCode::NOT_FOUND);
        assert_eq!(
            ResponseError::status_code(&AppError::validation("port", "out of range")),
            StatusCode::BAD_REQUEST
        );
    }
}
