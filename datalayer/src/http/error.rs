use serde::{Deserialize, Serialize};

use crate::db::error::DbError;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GitHubFieldError {
    pub resource: String,
    pub field: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GitHubErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<GitHubFieldError>>,
    /// 写操作失败时的明细 / Details of a failed write
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub enum HttpError {
    BadRequest(String),
    NotFound(String),
    Validation(Vec<GitHubFieldError>),
    Internal { message: String, details: Vec<String> },
}

impl HttpError {
    pub fn internal(message: &str) -> Self {
        HttpError::Internal {
            message: message.to_string(),
            details: Vec::new(),
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            HttpError::BadRequest(_) => 400,
            HttpError::NotFound(_) => 404,
            HttpError::Validation(_) => 422,
            HttpError::Internal { .. } => 500,
        }
    }

    pub fn to_body(&self, documentation_url: Option<String>) -> GitHubErrorBody {
        match self {
            HttpError::BadRequest(msg) | HttpError::NotFound(msg) => GitHubErrorBody {
                message: msg.clone(),
                documentation_url,
                errors: None,
                details: None,
            },
            HttpError::Validation(errors) => GitHubErrorBody {
                message: "Validation Failed".to_string(),
                documentation_url,
                errors: Some(errors.clone()),
                details: None,
            },
            HttpError::Internal { message, details } => GitHubErrorBody {
                message: message.clone(),
                documentation_url,
                errors: None,
                details: (!details.is_empty()).then(|| details.clone()),
            },
        }
    }

    /// 资源不存在 / Resource not found
    pub fn not_found(resource: &str) -> Self {
        HttpError::NotFound(format!("{} not found", resource))
    }

    /// 带资源名的数据库错误转换 / Convert a database error for a named resource
    pub fn from_db(resource: &str, err: DbError) -> Self {
        let field_error = |field: &str, code: &str, err: &DbError| GitHubFieldError {
            resource: resource.to_string(),
            field: field.to_string(),
            code: code.to_string(),
            message: Some(err.to_string()),
        };
        match &err {
            DbError::NotFound => HttpError::not_found(resource),
            DbError::InvalidColumn(column) => {
                HttpError::Validation(vec![field_error(column, "invalid", &err)])
            }
            DbError::MassAssignment(_) => {
                HttpError::Validation(vec![field_error("*", "missing_field", &err)])
            }
            DbError::UnknownRelation(name) => {
                HttpError::Validation(vec![field_error(name, "invalid", &err)])
            }
            DbError::OnCreating { errors, message }
            | DbError::OnUpdating { errors, message }
            | DbError::OnDeleting { errors, message } => {
                tracing::error!(resource, error = %err, "write failed");
                HttpError::Internal {
                    message: message.clone(),
                    details: errors.clone(),
                }
            }
            _ => {
                tracing::error!(resource, error = %err, "database error");
                HttpError::internal("Internal Server Error")
            }
        }
    }
}

impl From<DbError> for HttpError {
    fn from(err: DbError) -> Self {
        HttpError::from_db("Resource", err)
    }
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            HttpError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            HttpError::Validation(_) => write!(f, "Validation Failed"),
            HttpError::Internal { message, .. } => write!(f, "Internal Error: {}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::error::throw_error_on_updating;

    #[test]
    fn test_validation_body_serialization() {
        let errs = vec![GitHubFieldError {
            resource: "User".to_string(),
            field: "email".to_string(),
            code: "invalid".to_string(),
            message: Some("must be email".to_string()),
        }];
        let e = HttpError::Validation(errs.clone());
        let body = e.to_body(Some("https://docs.example".to_string()));
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("Validation Failed"));
        assert!(json.contains("documentation_url"));
        assert!(json.contains("email"));
        assert!(!json.contains("details"));
        assert_eq!(e.status_code(), 422);
        assert_eq!(body.errors.unwrap().len(), 1);
    }

    #[test]
    fn test_from_db_error() {
        let e = HttpError::from_db("User", DbError::NotFound);
        assert_eq!(e.status_code(), 404);
        assert_eq!(e.to_string(), "Not Found: User not found");

        let e = HttpError::from_db("User", DbError::InvalidColumn("na me".into()));
        match &e {
            HttpError::Validation(errs) => assert_eq!(errs[0].field, "na me"),
            other => panic!("unexpected {:?}", other),
        }

        let e: HttpError = throw_error_on_updating(vec!["disk full".into()], None).into();
        assert_eq!(e.status_code(), 500);
        let body = e.to_body(None);
        assert_eq!(body.message, "An error occurred while updating the record");
        assert_eq!(body.details, Some(vec!["disk full".to_string()]));
    }
}
