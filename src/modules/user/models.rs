use datalayer::{ColumnKind, Model, Relation};
use serde::{Deserialize, Serialize};

/// 用户
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub age: i64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    /// 仅在 `with=posts` 预加载时出现 / Present only when eager loaded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posts: Option<Vec<Post>>,
}

impl Model for User {
    fn table_name() -> &'static str {
        "users"
    }

    fn fillable() -> &'static [&'static str] {
        &["name", "email", "age"]
    }

    fn soft_delete_column() -> Option<&'static str> {
        Some("deleted_at")
    }

    fn timestamps() -> bool {
        true
    }

    fn column_kinds() -> &'static [(&'static str, ColumnKind)] {
        &[
            ("id", ColumnKind::Integer),
            ("name", ColumnKind::Text),
            ("email", ColumnKind::Text),
            ("age", ColumnKind::Integer),
            ("created_at", ColumnKind::Text),
            ("updated_at", ColumnKind::Text),
            ("deleted_at", ColumnKind::Text),
        ]
    }

    fn relations() -> &'static [Relation] {
        const RELATIONS: &[Relation] = &[Relation::has_many("posts", "posts", "user_id", "id")];
        RELATIONS
    }
}

/// 文章
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
}

impl Model for Post {
    fn table_name() -> &'static str {
        "posts"
    }

    fn fillable() -> &'static [&'static str] {
        &["user_id", "title"]
    }

    fn column_kinds() -> &'static [(&'static str, ColumnKind)] {
        &[
            ("id", ColumnKind::Integer),
            ("user_id", ColumnKind::Integer),
            ("title", ColumnKind::Text),
        ]
    }

    fn relations() -> &'static [Relation] {
        const RELATIONS: &[Relation] = &[
            Relation::belongs_to("author", "users", "user_id", "id").with_soft_deletes("deleted_at"),
        ];
        RELATIONS
    }
}
