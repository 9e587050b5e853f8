use crate::db::query::Builder;
use crate::db::value::ColumnKind;

/// 关联类型 / Relation kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// 一对多：子表 `foreign_key` 指向本表 `local_key`
    /// one-to-many: child `foreign_key` points at our `local_key`
    HasMany,
    /// 从属：本表 `foreign_key` 指向父表 `owner_key`
    /// belongs-to: our `foreign_key` points at the parent's `owner_key`
    BelongsTo,
}

/// 关联定义（用于 `with` 预加载）/ Relation definition, used by `with` eager loading
#[derive(Debug, Clone, Copy)]
pub struct Relation {
    pub name: &'static str,
    pub kind: RelationKind,
    pub table: &'static str,
    pub foreign_key: &'static str,
    pub other_key: &'static str,
    /// 关联表的软删除列 / Soft-delete column of the related table
    pub soft_delete: Option<&'static str>,
}

impl Relation {
    pub const fn has_many(
        name: &'static str,
        table: &'static str,
        foreign_key: &'static str,
        local_key: &'static str,
    ) -> Self {
        Self {
            name,
            kind: RelationKind::HasMany,
            table,
            foreign_key,
            other_key: local_key,
            soft_delete: None,
        }
    }

    pub const fn belongs_to(
        name: &'static str,
        table: &'static str,
        foreign_key: &'static str,
        owner_key: &'static str,
    ) -> Self {
        Self {
            name,
            kind: RelationKind::BelongsTo,
            table,
            foreign_key,
            other_key: owner_key,
            soft_delete: None,
        }
    }

    /// 预加载时排除关联表中已软删除的行
    /// Exclude soft-deleted related rows when eager loading
    pub const fn with_soft_deletes(mut self, column: &'static str) -> Self {
        self.soft_delete = Some(column);
        self
    }
}

/// 通用模型元信息 Trait（表名与分库组）
/// Generic model meta trait (table name and group)
pub trait Model {
    fn table_name() -> &'static str;

    fn table_group() -> &'static str {
        "default"
    }

    fn primary_key() -> &'static str {
        "id"
    }

    /// 可批量赋值的列；为空表示不限制
    /// Mass-assignable columns; empty means unrestricted
    fn fillable() -> &'static [&'static str] {
        &[]
    }

    /// 软删除列；`None` 表示物理删除
    /// Soft-delete column; `None` means hard deletes
    fn soft_delete_column() -> Option<&'static str> {
        None
    }

    /// 是否自动维护 `created_at` / `updated_at`
    fn timestamps() -> bool {
        false
    }

    /// 列的存储类型；未列出的列按查询串内容推断
    /// Column storage kinds; unlisted columns are inferred from the query-string token
    fn column_kinds() -> &'static [(&'static str, ColumnKind)] {
        &[]
    }

    fn column_kind(column: &str) -> Option<ColumnKind> {
        Self::column_kinds()
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, k)| *k)
    }

    fn relations() -> &'static [Relation] {
        &[]
    }

    fn relation(name: &str) -> Option<&'static Relation> {
        Self::relations().iter().find(|r| r.name == name)
    }

    /// 模型的初始查询 / Fresh builder for the model
    fn new_query() -> Builder {
        Builder::table(Self::table_name())
            .soft_deletes(Self::soft_delete_column())
            .column_kinds(Self::column_kinds())
    }
}

/// 便捷宏：为模型实现 Model（表名与分组）
/// Helper macro: implement Model with a table name and optional group
#[macro_export]
macro_rules! impl_table_meta {
    ($ty:path, $table:expr) => {
        impl $crate::db::model::Model for $ty {
            fn table_name() -> &'static str {
                $table
            }
        }
    };
    ($ty:path, $table:expr, $group:expr) => {
        impl $crate::db::model::Model for $ty {
            fn table_name() -> &'static str {
                $table
            }
            fn table_group() -> &'static str {
                $group
            }
        }
    };
}
