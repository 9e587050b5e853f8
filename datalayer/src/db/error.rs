use thiserror::Error;

pub type Result<T> = std::result::Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("配置错误: {0}")]
    Config(String),
    #[error("SQLx 错误: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("未找到记录")]
    NotFound,
    #[error("序列化错误: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("非法列名: {0}")]
    InvalidColumn(String),
    #[error("列不允许批量赋值: {0}")]
    MassAssignment(String),
    #[error("未定义的关联: {0}")]
    UnknownRelation(String),
    #[error("{message}")]
    OnCreating { errors: Vec<String>, message: String },
    #[error("{message}")]
    OnUpdating { errors: Vec<String>, message: String },
    #[error("{message}")]
    OnDeleting { errors: Vec<String>, message: String },
}

impl DbError {
    /// 对应的 HTTP 状态码 / Matching HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            DbError::NotFound => 404,
            DbError::InvalidColumn(_)
            | DbError::MassAssignment(_)
            | DbError::UnknownRelation(_) => 422,
            _ => 500,
        }
    }

    /// 附带的错误明细 / Attached error details
    pub fn errors(&self) -> &[String] {
        match self {
            DbError::OnCreating { errors, .. }
            | DbError::OnUpdating { errors, .. }
            | DbError::OnDeleting { errors, .. } => errors.as_slice(),
            _ => &[],
        }
    }
}

/// 创建失败 / Creating failed
pub fn throw_error_on_creating(errors: Vec<String>, message: Option<&str>) -> DbError {
    DbError::OnCreating {
        errors,
        message: message
            .unwrap_or("An error occurred while creating the record")
            .to_string(),
    }
}

/// 更新失败 / Updating failed
pub fn throw_error_on_updating(errors: Vec<String>, message: Option<&str>) -> DbError {
    DbError::OnUpdating {
        errors,
        message: message
            .unwrap_or("An error occurred while updating the record")
            .to_string(),
    }
}

/// 删除失败 / Deleting failed
pub fn throw_error_on_deleting(errors: Vec<String>, message: Option<&str>) -> DbError {
    DbError::OnDeleting {
        errors,
        message: message
            .unwrap_or("An error occurred while deleting the record")
            .to_string(),
    }
}

/// 获取详细错误描述（中英文） / Get detailed error description (CN/EN)
pub fn describe_error(e: &DbError) -> String {
    match e {
        DbError::Config(msg) => format!("配置错误 / Config error: {}", msg),
        DbError::Sqlx(err) => format!("SQLx 错误 / SQLx error: {}", err),
        DbError::NotFound => "未找到记录 / Record not found".to_string(),
        DbError::Serde(msg) => format!("序列化错误 / Serialization error: {}", msg),
        DbError::InvalidColumn(c) => format!("非法列名 / Invalid column: {}", c),
        DbError::MassAssignment(c) => format!("不可批量赋值 / Not fillable: {}", c),
        DbError::UnknownRelation(r) => format!("未定义的关联 / Unknown relation: {}", r),
        DbError::OnCreating { message, errors }
        | DbError::OnUpdating { message, errors }
        | DbError::OnDeleting { message, errors } => {
            if errors.is_empty() {
                message.clone()
            } else {
                format!("{}: {}", message, errors.join("; "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(DbError::NotFound.status_code(), 404);
        assert_eq!(DbError::InvalidColumn("x y".into()).status_code(), 422);
        assert_eq!(throw_error_on_creating(vec![], None).status_code(), 500);
    }

    #[test]
    fn test_error_helpers_carry_details() {
        let e = throw_error_on_updating(vec!["email taken".into()], Some("cannot update"));
        assert_eq!(e.to_string(), "cannot update");
        assert_eq!(e.errors(), &["email taken".to_string()]);
        assert_eq!(describe_error(&e), "cannot update: email taken");

        let e = throw_error_on_deleting(vec![], None);
        assert_eq!(e.to_string(), "An error occurred while deleting the record");
        assert!(e.errors().is_empty());
    }
}
