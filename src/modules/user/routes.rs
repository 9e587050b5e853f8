use actix_web::{web, HttpRequest, HttpResponse};
use datalayer::http::{
    json_created, json_ok, no_content, page_params, paginated, parse_query_pairs, HttpError,
};

use super::repository::{user_repository, UserRepository};
use crate::app_bootstrap::AppState;

const RESOURCE: &str = "User";

type HandlerResult = Result<HttpResponse, HttpError>;

fn repository(state: &AppState) -> UserRepository {
    user_repository(state.db.clone(), state.cache.clone())
}

fn db_error(e: datalayer::DbError) -> HttpError {
    HttpError::from_db(RESOURCE, e)
}

/// 取出 `with=a,b` 预加载参数，其余参数原样保留
/// Pulls the `with=a,b` eager-load parameter out, leaving the rest untouched
fn take_relations(pairs: &mut Vec<(String, String)>) -> Vec<String> {
    let mut relations = Vec::new();
    pairs.retain(|(key, value)| {
        if key != "with" {
            return true;
        }
        relations.extend(
            value
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(String::from),
        );
        false
    });
    relations
}

/// 用户列表：查询字符串过滤 + 分页 + `Link` 头
#[actix_web::get("/users")]
pub async fn list_users(req: HttpRequest, state: web::Data<AppState>) -> HandlerResult {
    let mut pairs = parse_query_pairs(req.query_string());
    let relations = take_relations(&mut pairs);
    let names: Vec<&str> = relations.iter().map(String::as_str).collect();
    let (page, per_page) = page_params(&pairs);

    let mut repo = repository(&state);
    repo.query_string(&pairs).with(&names);
    if state.cache.is_some() {
        repo.cached();
    }
    let page = repo.paginate_json(per_page, page).await.map_err(db_error)?;
    Ok(paginated(page, req.path()))
}

#[actix_web::get("/users/{id}")]
pub async fn show_user(
    req: HttpRequest,
    path: web::Path<i64>,
    state: web::Data<AppState>,
) -> HandlerResult {
    let mut pairs = parse_query_pairs(req.query_string());
    let relations = take_relations(&mut pairs);
    let names: Vec<&str> = relations.iter().map(String::as_str).collect();

    let mut repo = repository(&state);
    match repo.with(&names).find(path.into_inner()).await.map_err(db_error)? {
        Some(user) => Ok(json_ok(user)),
        None => Err(HttpError::not_found(RESOURCE)),
    }
}

#[actix_web::post("/users")]
pub async fn create_user(
    body: web::Json<serde_json::Value>,
    state: web::Data<AppState>,
) -> HandlerResult {
    let mut repo = repository(&state);
    match repo.create(body.into_inner()).await.map_err(db_error)? {
        Some(user) => Ok(json_created(user)),
        None => Err(HttpError::internal("An error occurred while creating the record")),
    }
}

#[actix_web::put("/users/{id}")]
pub async fn update_user(
    path: web::Path<i64>,
    body: web::Json<serde_json::Value>,
    state: web::Data<AppState>,
) -> HandlerResult {
    let mut repo = repository(&state);
    match repo
        .update(body.into_inner(), path.into_inner())
        .await
        .map_err(db_error)?
    {
        Some(user) => Ok(json_ok(user)),
        None => Err(HttpError::not_found(RESOURCE)),
    }
}

#[actix_web::delete("/users/{id}")]
pub async fn delete_user(path: web::Path<i64>, state: web::Data<AppState>) -> HandlerResult {
    let mut repo = repository(&state);
    match repo.delete(path.into_inner()).await.map_err(db_error)? {
        0 => Err(HttpError::not_found(RESOURCE)),
        _ => Ok(no_content()),
    }
}

pub fn configure_user_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_users)
        .service(show_user)
        .service(create_user)
        .service(update_user)
        .service(delete_user);
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test, App};
    use datalayer::{CacheSettings, Database, MemoryCache};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;

    async fn state() -> AppState {
        let db = Database::connect("sqlite::memory:", 1).await.unwrap();
        crate::schema::migrate(&db).await.unwrap();
        db.execute_script(
            "INSERT INTO users (name, email, age) VALUES
                ('ann lee', 'ann@example.com', 31),
                ('bob', 'bob@example.com', 17),
                ('anna', NULL, 45);
             INSERT INTO posts (user_id, title) VALUES (1, 'hello'), (1, 'again')",
        )
        .await
        .unwrap();
        AppState::new(db).with_cache(CacheSettings::new(
            Arc::new(MemoryCache::new()),
            Duration::from_secs(60),
        ))
    }

    macro_rules! app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($state))
                    .configure(configure_user_routes),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_list_with_filters_and_link_header() {
        let app = app!(state().await);
        let req = test::TestRequest::get()
            .uri("/users?status=adult&sort=-age&per_page=1&page=1")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let link = resp.headers().get("link").unwrap().to_str().unwrap().to_string();
        assert!(link.contains("</users?page=2&per_page=1>; rel=\"next\""));
        assert_eq!(resp.headers().get("x-total-count").unwrap(), "2");

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"][0]["name"], "anna");
        assert_eq!(body["last_page"], 2);
    }

    #[actix_web::test]
    async fn test_list_projection_and_eager_loading() {
        let app = app!(state().await);
        let req = test::TestRequest::get()
            .uri("/users?attrs=id,name&with=posts&name=ann+lee")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let row = &body["data"][0];
        assert_eq!(row["name"], "ann lee");
        assert!(row.get("email").is_none());
        assert_eq!(row["posts"].as_array().unwrap().len(), 2);

        let req = test::TestRequest::get().uri("/users?with=friends").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[actix_web::test]
    async fn test_crud_roundtrip() {
        let app = app!(state().await);

        let req = test::TestRequest::post()
            .uri("/users")
            .set_json(json!({"name": "cleo", "email": "cleo@example.com", "age": 28, "role": "admin"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Value = test::read_body_json(resp).await;
        let id = created["id"].as_i64().unwrap();
        assert_eq!(created["name"], "cleo");
        assert!(created["created_at"].is_string());

        let req = test::TestRequest::put()
            .uri(&format!("/users/{}", id))
            .set_json(json!({"age": 29}))
            .to_request();
        let updated: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(updated["age"], 29);

        let req = test::TestRequest::put()
            .uri(&format!("/users/{}", id))
            .set_json(json!({"email": null}))
            .to_request();
        let cleared: Value = test::call_and_read_body_json(&app, req).await;
        assert!(cleared["email"].is_null());

        let req = test::TestRequest::get().uri("/users?email=12345").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total"], 0);

        let req = test::TestRequest::delete()
            .uri(&format!("/users/{}", id))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NO_CONTENT);

        let req = test::TestRequest::get()
            .uri(&format!("/users/{}", id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "User not found");

        let req = test::TestRequest::delete()
            .uri(&format!("/users/{}", id))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_create_rejects_unassignable_payload() {
        let app = app!(state().await);
        let req = test::TestRequest::post()
            .uri("/users")
            .set_json(json!({"role": "admin"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Validation Failed");
        assert_eq!(body["errors"][0]["resource"], "User");
    }

    #[actix_web::test]
    async fn test_list_cache_flushed_by_writes() {
        let app = app!(state().await);
        let list = || test::TestRequest::get().uri("/users").to_request();

        let first: Value = test::call_and_read_body_json(&app, list()).await;
        assert_eq!(first["total"], 3);

        let req = test::TestRequest::post()
            .uri("/users")
            .set_json(json!({"name": "dan", "age": 50}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        let second: Value = test::call_and_read_body_json(&app, list()).await;
        assert_eq!(second["total"], 4);
    }

    #[actix_web::test]
    async fn test_list_huge_page_numbers() {
        let app = app!(state().await);
        let req = test::TestRequest::get()
            .uri("/users?page=18446744073709551615")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 0);
        assert_eq!(body["total"], 3);

        let req = test::TestRequest::get()
            .uri("/users?page=200000000000000000")
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri("/users?page=5000000000&per_page=1")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let link = resp.headers().get("link").unwrap().to_str().unwrap().to_string();
        assert!(link.contains("</users?page=4999999999&per_page=1>; rel=\"prev\""), "{}", link);
    }

    #[actix_web::test]
    async fn test_take_relations() {
        let mut pairs = vec![
            ("with".to_string(), "posts, author".to_string()),
            ("name".to_string(), "ann".to_string()),
        ];
        assert_eq!(take_relations(&mut pairs), vec!["posts", "author"]);
        assert_eq!(pairs, vec![("name".to_string(), "ann".to_string())]);
    }
}
