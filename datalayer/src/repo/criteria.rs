use serde::de::DeserializeOwned;

use crate::db::dialect::Dialect;
use crate::db::error::Result;
use crate::db::model::Model;
use crate::db::query::{Builder, Direction};
use crate::db::value::Value;
use crate::repo::base::BaseRepository;
use crate::repo::paginator::Paginator;

/// 条件值 / Condition value
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// `IS NULL`
    Null,
    /// 区间、模糊、`!` 或等值 / range, pattern, `!` or equality
    Text(String),
    /// `IN (...)`
    List(Vec<String>),
}

/// 有序条件列表 / Ordered conditions
pub type Conditions = Vec<(String, FilterValue)>;

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        FilterValue::Text(v.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        FilterValue::Text(v)
    }
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        FilterValue::Text(v.to_string())
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(v: Vec<String>) -> Self {
        FilterValue::List(v)
    }
}

impl From<Vec<&str>> for FilterValue {
    fn from(v: Vec<&str>) -> Self {
        FilterValue::List(v.into_iter().map(str::to_string).collect())
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(FilterValue::Null, Into::into)
    }
}

const RANGE_INCLUSIVE: &str = "...";
const RANGE_EXCLUSIVE: &str = "..";
const NOT_NULL: &str = "!";

/// 把条件逐条写入构建器 / Apply conditions to a builder, one by one
///
/// - 列表 → `IN`
/// - `a...b` → `>= a AND <= b`，`a..b` → `> a AND < b`（任一侧可空）
/// - 含 `%` → `LIKE`（Postgres 为 `ILIKE`）
/// - `Null` → `IS NULL`，`!` → `IS NOT NULL`
/// - 其他 → 等值
pub fn apply_conditions(builder: &mut Builder, conditions: &[(String, FilterValue)]) {
    for (column, value) in conditions {
        match value {
            FilterValue::List(items) => {
                let values: Vec<Value> = items.iter().map(|v| builder.typed_value(column, v)).collect();
                builder.where_in(column, values);
            }
            FilterValue::Null => {
                builder.where_null(column);
            }
            FilterValue::Text(raw) => {
                if raw.contains(RANGE_INCLUSIVE) {
                    interval(builder, column, raw, RANGE_INCLUSIVE);
                } else if raw.contains(RANGE_EXCLUSIVE) {
                    interval(builder, column, raw, RANGE_EXCLUSIVE);
                } else if raw.contains('%') {
                    builder.where_op(column, "ILIKE", raw.as_str());
                } else if raw == NOT_NULL {
                    builder.where_not_null(column);
                } else {
                    let value = builder.typed_value(column, raw);
                    builder.where_eq(column, value);
                }
            }
        }
    }
}

fn interval(builder: &mut Builder, column: &str, raw: &str, separator: &str) {
    let (low, high) = raw.split_once(separator).unwrap_or((raw, ""));
    let inclusive = if separator == RANGE_INCLUSIVE { "=" } else { "" };
    if !low.is_empty() {
        let value = builder.typed_value(column, low);
        builder.where_op(column, &format!(">{}", inclusive), value);
    }
    if !high.is_empty() {
        let value = builder.typed_value(column, high);
        builder.where_op(column, &format!("<{}", inclusive), value);
    }
}

/// 解析 `["-a", "+b", "c"]` 形式的排序 / Parse `["-a", "+b", "c"]` style sorts
pub fn parse_sort(field: &str) -> (String, Direction) {
    let direction = if field.contains('-') {
        Direction::Desc
    } else {
        Direction::Asc
    };
    (field.replace(['+', '-'], ""), direction)
}

/// 结构化条件查询 / Structured criteria query
///
/// 在仓库当前查询的副本上累积条件，不会改动仓库本身
/// Works on a copy of the repository's pending query; the repository is left untouched
pub struct Criteria<'r, M> {
    repo: &'r BaseRepository<M>,
    builder: Builder,
    relations: Vec<String>,
}

impl<'r, M> Criteria<'r, M>
where
    M: Model + DeserializeOwned + Send + Sync,
{
    pub(crate) fn new(repo: &'r BaseRepository<M>, builder: Builder) -> Self {
        Self {
            repo,
            builder,
            relations: Vec::new(),
        }
    }

    pub fn with(mut self, relations: &[&str]) -> Self {
        self.relations
            .extend(relations.iter().map(|r| r.to_string()));
        self
    }

    pub fn select(mut self, columns: &[&str]) -> Self {
        if !columns.is_empty() {
            self.builder.select(columns);
        }
        self
    }

    pub fn apply(mut self, conditions: &[(String, FilterValue)]) -> Self {
        apply_conditions(&mut self.builder, conditions);
        self
    }

    pub fn group_by(mut self, columns: &[&str]) -> Self {
        if !columns.is_empty() {
            self.builder.group_by(columns);
        }
        self
    }

    pub fn having(mut self, clause: &str) -> Self {
        if !clause.trim().is_empty() {
            self.builder.having_raw(clause);
        }
        self
    }

    pub fn order_by(mut self, fields: &[&str]) -> Self {
        for field in fields {
            let (column, direction) = parse_sort(field);
            self.builder.order_by(&column, direction);
        }
        self
    }

    /// `0` 表示不限制 / `0` means no limit
    pub fn limit(mut self, quantity: u64) -> Self {
        if quantity > 0 {
            self.builder.limit(quantity);
        }
        self
    }

    pub fn scope<F: FnOnce(&mut Builder)>(mut self, scope: F) -> Self {
        scope(&mut self.builder);
        self
    }

    pub async fn first(mut self) -> Result<Option<M>> {
        self.builder.limit(1);
        let mut rows = self.repo.select_rows(&self.builder, &self.relations).await?;
        if rows.is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(rows.swap_remove(0))?))
    }

    pub async fn get(self) -> Result<Vec<M>> {
        let rows = self.repo.select_rows(&self.builder, &self.relations).await?;
        rows.into_iter()
            .map(|r| serde_json::from_value(r).map_err(Into::into))
            .collect()
    }

    pub async fn paginate(self, per_page: u64, page: u64) -> Result<Paginator<M>> {
        let page = self
            .repo
            .paginate_rows(self.builder, &self.relations, per_page, page)
            .await?;
        decode_page(page)
    }

    /// 编译后的 SQL / Compiled SQL
    pub fn sql(&self) -> String {
        self.builder.to_select(self.dialect()).0
    }

    fn dialect(&self) -> Dialect {
        self.repo.database().dialect()
    }
}

pub(crate) fn decode_page<M: DeserializeOwned>(
    page: Paginator<serde_json::Value>,
) -> Result<Paginator<M>> {
    let items = page
        .items
        .into_iter()
        .map(serde_json::from_value)
        .collect::<std::result::Result<Vec<M>, _>>()?;
    Ok(Paginator {
        items,
        total: page.total,
        per_page: page.per_page,
        current_page: page.current_page,
        last_page: page.last_page,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::value::ColumnKind;

    fn compile(conditions: Conditions, dialect: Dialect) -> (String, Vec<Value>) {
        let mut b = Builder::table("products");
        apply_conditions(&mut b, &conditions);
        b.to_select(dialect)
    }

    #[test]
    fn test_conditions_follow_column_kinds() {
        const KINDS: &[(&str, ColumnKind)] = &[("sku", ColumnKind::Text), ("price", ColumnKind::Float)];
        let mut b = Builder::table("products").column_kinds(KINDS);
        apply_conditions(
            &mut b,
            &[
                ("sku".into(), "0042".into()),
                ("sku".into(), FilterValue::List(vec!["1".into(), "2".into()])),
                ("price".into(), "10...20".into()),
            ],
        );
        let (_, binds) = b.to_select(Dialect::Postgres);
        assert_eq!(
            binds,
            vec![
                Value::from("0042"),
                Value::from("1"),
                Value::from("2"),
                Value::Float(10.0),
                Value::Float(20.0),
            ]
        );
    }

    #[test]
    fn test_range_conditions() {
        let (sql, binds) = compile(
            vec![
                ("price".into(), "10...20".into()),
                ("stock".into(), "5..".into()),
            ],
            Dialect::Sqlite,
        );
        assert_eq!(
            sql,
            "SELECT * FROM \"products\" WHERE \"price\" >= ? AND \"price\" <= ? AND \"stock\" > ?"
        );
        assert_eq!(binds, vec![Value::Int(10), Value::Int(20), Value::Int(5)]);

        let (sql, binds) = compile(vec![("price".into(), "..9.5".into())], Dialect::Sqlite);
        assert!(sql.ends_with("WHERE \"price\" < ?"));
        assert_eq!(binds, vec![Value::Float(9.5)]);
    }

    #[test]
    fn test_like_null_and_list() {
        let conditions: Conditions = vec![
            ("name".into(), "%phone%".into()),
            ("deleted_at".into(), FilterValue::Null),
            ("sku".into(), "!".into()),
            ("id".into(), vec!["1", "2"].into()),
            ("brand".into(), "acme".into()),
        ];
        let (sql, binds) = compile(conditions.clone(), Dialect::Postgres);
        assert_eq!(
            sql,
            "SELECT * FROM \"products\" WHERE \"name\" ILIKE $1 AND \"deleted_at\" IS NULL \
AND \"sku\" IS NOT NULL AND \"id\" IN ($2, $3) AND \"brand\" = $4"
        );
        assert_eq!(binds[0], Value::from("%phone%"));
        assert_eq!(binds[3], Value::from("acme"));
        let (sql, _) = compile(conditions, Dialect::MySql);
        assert!(sql.contains("`name` LIKE ?"));
    }

    #[test]
    fn test_parse_sort() {
        assert_eq!(parse_sort("-created_at"), ("created_at".to_string(), Direction::Desc));
        assert_eq!(parse_sort("+name"), ("name".to_string(), Direction::Asc));
        assert_eq!(parse_sort("id"), ("id".to_string(), Direction::Asc));
    }

    #[test]
    fn test_filter_value_from_option() {
        assert_eq!(FilterValue::from(None::<&str>), FilterValue::Null);
        assert_eq!(FilterValue::from(Some("x")), FilterValue::Text("x".into()));
        assert_eq!(FilterValue::from(7i64), FilterValue::Text("7".into()));
    }
}
