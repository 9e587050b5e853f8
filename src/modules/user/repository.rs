use datalayer::{BaseRepository, CacheSettings, Database};

use super::models::User;

pub type UserRepository = BaseRepository<User>;

/// 构建用户仓库：模糊搜索 `name`，`mail` 是 `email` 的别名，
/// `status=adult|minor` 为自定义过滤
///
/// Builds the user repository: `name` is a partial search, `mail` aliases
/// `email`, `status=adult|minor` are custom filters
pub fn user_repository(db: Database, cache: Option<CacheSettings>) -> UserRepository {
    let mut repo = BaseRepository::<User>::new(db);
    if let Some(settings) = cache {
        repo = repo.with_cache(settings.with_tag("users"));
    }
    repo.add_partial_search("name")
        .refer("mail", "email")
        .allowed_filters(&["id", "name", "email", "mail", "age"])
        .allowed_sorts(&["id", "name", "age", "mail", "created_at"])
        .add_custom_filter("status", "adult", "age >= 18")
        .add_custom_filter("status", "minor", "age < 18");
    repo
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::user::Post;
    use crate::schema::migrate;

    async fn seeded() -> Database {
        let db = Database::connect("sqlite::memory:", 1).await.unwrap();
        migrate(&db).await.unwrap();
        db.execute_script(
            "INSERT INTO users (name, email, age) VALUES
                ('ann lee', 'ann@example.com', 31),
                ('bob', 'bob@example.com', 17),
                ('anna', NULL, 45);
             INSERT INTO posts (user_id, title) VALUES (1, 'hello'), (3, 'world')",
        )
        .await
        .unwrap();
        db
    }

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_partial_search_and_sort() {
        let mut repo = user_repository(seeded().await, None);
        let users = repo
            .query_string(&pairs(&[("name", "ann"), ("sort", "-age")]))
            .fetch()
            .await
            .unwrap();
        let names: Vec<_> = users.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["anna", "ann lee"]);
    }

    #[tokio::test]
    async fn test_alias_and_custom_filter() {
        let mut repo = user_repository(seeded().await, None);
        let found = repo
            .query_string(&pairs(&[("mail", "bob@example.com")]))
            .fetch()
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].age, 17);

        let adults = repo
            .query_string(&pairs(&[("status", "adult"), ("secret", "x")]))
            .count()
            .await
            .unwrap();
        assert_eq!(adults, 2);
    }

    #[tokio::test]
    async fn test_post_author_relation() {
        let db = seeded().await;
        let rows = BaseRepository::<Post>::new(db)
            .with(&["author"])
            .order_by("id", "asc")
            .fetch_json()
            .await
            .unwrap();
        assert_eq!(rows[0]["author"]["name"], "ann lee");
        assert_eq!(rows[1]["author"]["name"], "anna");
    }

    #[tokio::test]
    async fn test_post_author_skips_soft_deleted_users() {
        let db = seeded().await;
        let mut users = user_repository(db.clone(), None);
        assert_eq!(users.delete(3).await.unwrap(), 1);

        let rows = BaseRepository::<Post>::new(db)
            .with(&["author"])
            .order_by("id", "asc")
            .fetch_json()
            .await
            .unwrap();
        assert_eq!(rows[0]["author"]["name"], "ann lee");
        assert!(rows[1]["author"].is_null());
    }
}
