#[cfg(feature = "web_actix")]
use actix_web::{
    http::header::{HeaderName, HeaderValue},
    http::StatusCode,
    HttpResponse, ResponseError,
};
use serde::Serialize;

use super::error::{GitHubErrorBody, HttpError};
use crate::repo::paginator::Paginator;

/// 分页响应头：`Link` 与 `X-Total-Count` / Paging headers: `Link` and `X-Total-Count`
pub fn page_headers<T>(page: &Paginator<T>, base_url: &str) -> Vec<(String, String)> {
    vec![
        ("link".to_string(), page.link_header(base_url)),
        ("x-total-count".to_string(), page.total.to_string()),
    ]
}

#[cfg(feature = "web_actix")]
impl ResponseError for HttpError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        let body: GitHubErrorBody = self.to_body(None);
        HttpResponse::build(ResponseError::status_code(self)).json(body)
    }
}

#[cfg(feature = "web_actix")]
pub fn json_ok<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(data)
}

#[cfg(feature = "web_actix")]
pub fn json_created<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Created().json(data)
}

#[cfg(feature = "web_actix")]
pub fn no_content() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

#[cfg(feature = "web_actix")]
pub fn ok_with_headers<T: Serialize>(data: T, headers: &[(String, String)]) -> HttpResponse {
    let mut builder = HttpResponse::Ok();
    for (k, v) in headers {
        let name = HeaderName::from_lowercase(k.as_bytes())
            .unwrap_or(HeaderName::from_static("x-invalid"));
        let value = HeaderValue::from_str(v).unwrap_or(HeaderValue::from_static(""));
        builder.insert_header((name, value));
    }
    builder.json(data)
}

/// 分页结果 + 分页响应头 / Page body plus paging headers
#[cfg(feature = "web_actix")]
pub fn paginated<T: Serialize>(page: Paginator<T>, base_url: &str) -> HttpResponse {
    let headers = page_headers(&page, base_url);
    ok_with_headers(page, &headers)
}
