use crate::db::dialect::Dialect;
use crate::db::value::{ColumnKind, Value};

/// 排序方向 / Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    /// 解析方向；非 `asc`/`desc` 一律按升序
    /// Parse a direction; anything but `asc`/`desc` falls back to ascending
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("desc") {
            Direction::Desc
        } else {
            Direction::Asc
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
}

#[derive(Debug, Clone)]
struct Join {
    kind: JoinKind,
    table: String,
    on: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
enum Condition {
    Basic {
        column: String,
        op: String,
        value: Value,
    },
    In {
        column: String,
        values: Vec<Value>,
    },
    Null {
        column: String,
        negate: bool,
    },
    Raw {
        sql: String,
        binds: Vec<Value>,
    },
}

#[derive(Debug, Clone)]
enum Having {
    Basic { expr: String, op: String, value: Value },
    Raw(String),
}

/// 软删除范围 / Soft-delete scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrashedScope {
    /// 仅未删除记录 / live rows only
    Exclude,
    /// 包含已删除记录 / live and deleted rows
    Include,
    /// 仅已删除记录 / deleted rows only
    Only,
}

/// LIMIT/OFFSET 可渲染的最大值 / Largest LIMIT or OFFSET the databases accept
pub const MAX_ROW_COUNT: u64 = i64::MAX as u64;

const OPERATORS: &[&str] = &[
    "=", "<>", "!=", "<", ">", "<=", ">=", "LIKE", "NOT LIKE", "ILIKE", "NOT ILIKE",
];

/// 查询构建器 / Query builder
///
/// 纯数据结构：只累积子句，编译时才按方言生成 SQL 与绑定值
/// Plain data: clauses accumulate here and are compiled per dialect into SQL plus binds
#[derive(Debug, Clone)]
pub struct Builder {
    table: String,
    columns: Vec<String>,
    distinct: bool,
    joins: Vec<Join>,
    wheres: Vec<Condition>,
    groups: Vec<String>,
    havings: Vec<Having>,
    orders: Vec<(String, Direction)>,
    limit: Option<u64>,
    offset: Option<u64>,
    soft_delete_column: Option<String>,
    trashed: TrashedScope,
    column_kinds: &'static [(&'static str, ColumnKind)],
}

impl Builder {
    pub fn table(table: &str) -> Self {
        Self {
            table: table.to_string(),
            columns: Vec::new(),
            distinct: false,
            joins: Vec::new(),
            wheres: Vec::new(),
            groups: Vec::new(),
            havings: Vec::new(),
            orders: Vec::new(),
            limit: None,
            offset: None,
            soft_delete_column: None,
            trashed: TrashedScope::Exclude,
            column_kinds: &[],
        }
    }

    /// 声明列类型，查询串过滤按此绑定 / Declared column kinds used to bind query-string filters
    pub fn column_kinds(mut self, kinds: &'static [(&'static str, ColumnKind)]) -> Self {
        self.column_kinds = kinds;
        self
    }

    /// 列类型查找，忽略 `table.` 前缀 / Kind lookup, ignoring any `table.` prefix
    pub fn column_kind(&self, column: &str) -> Option<ColumnKind> {
        let name = column.rsplit('.').next().unwrap_or(column);
        self.column_kinds
            .iter()
            .find(|(c, _)| *c == name)
            .map(|(_, k)| *k)
    }

    /// 把查询串文本转成与列类型一致的值 / Typed value for a query-string token on `column`
    pub fn typed_value(&self, column: &str, raw: &str) -> Value {
        Value::coerce(raw, self.column_kind(column))
    }

    /// 启用软删除列 / Enable the soft-delete column
    pub fn soft_deletes(mut self, column: Option<&str>) -> Self {
        self.soft_delete_column = column.map(|c| c.to_string());
        self
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn has_conditions(&self) -> bool {
        !self.wheres.is_empty()
    }

    pub fn is_aggregated(&self) -> bool {
        !self.groups.is_empty() || self.distinct
    }

    /// 选择列；空列表恢复为 `*` / Select columns; an empty list restores `*`
    pub fn select<S: AsRef<str>>(&mut self, columns: &[S]) -> &mut Self {
        self.columns = columns.iter().map(|c| c.as_ref().to_string()).collect();
        self
    }

    pub fn add_select(&mut self, column: &str) -> &mut Self {
        self.columns.push(column.to_string());
        self
    }

    pub fn selected(&self) -> &[String] {
        &self.columns
    }

    pub fn distinct(&mut self) -> &mut Self {
        self.distinct = true;
        self
    }

    pub fn where_op<V: Into<Value>>(&mut self, column: &str, op: &str, value: V) -> &mut Self {
        let op = op.trim().to_ascii_uppercase();
        let op = if OPERATORS.contains(&op.as_str()) {
            op
        } else {
            tracing::warn!(operator = %op, column, "unsupported operator, falling back to '='");
            "=".to_string()
        };
        self.wheres.push(Condition::Basic {
            column: column.to_string(),
            op,
            value: value.into(),
        });
        self
    }

    pub fn where_eq<V: Into<Value>>(&mut self, column: &str, value: V) -> &mut Self {
        self.where_op(column, "=", value)
    }

    pub fn where_in<V: Into<Value>>(&mut self, column: &str, values: Vec<V>) -> &mut Self {
        self.wheres.push(Condition::In {
            column: column.to_string(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn where_null(&mut self, column: &str) -> &mut Self {
        self.wheres.push(Condition::Null {
            column: column.to_string(),
            negate: false,
        });
        self
    }

    pub fn where_not_null(&mut self, column: &str) -> &mut Self {
        self.wheres.push(Condition::Null {
            column: column.to_string(),
            negate: true,
        });
        self
    }

    /// 原生条件；`?` 为绑定占位 / Raw condition; `?` marks a bind
    pub fn where_raw(&mut self, sql: &str, binds: Vec<Value>) -> &mut Self {
        self.wheres.push(Condition::Raw {
            sql: sql.to_string(),
            binds,
        });
        self
    }

    pub fn join(&mut self, table: &str, on: &[(&str, &str)]) -> &mut Self {
        self.push_join(JoinKind::Inner, table, on)
    }

    pub fn left_join(&mut self, table: &str, on: &[(&str, &str)]) -> &mut Self {
        self.push_join(JoinKind::Left, table, on)
    }

    fn push_join(&mut self, kind: JoinKind, table: &str, on: &[(&str, &str)]) -> &mut Self {
        self.joins.push(Join {
            kind,
            table: table.to_string(),
            on: on
                .iter()
                .map(|(l, r)| (l.to_string(), r.to_string()))
                .collect(),
        });
        self
    }

    pub fn group_by<S: AsRef<str>>(&mut self, columns: &[S]) -> &mut Self {
        self.groups
            .extend(columns.iter().map(|c| c.as_ref().to_string()));
        self
    }

    pub fn having<V: Into<Value>>(&mut self, expr: &str, op: &str, value: V) -> &mut Self {
        let op = op.trim().to_ascii_uppercase();
        let op = if OPERATORS.contains(&op.as_str()) {
            op
        } else {
            "=".to_string()
        };
        self.havings.push(Having::Basic {
            expr: expr.to_string(),
            op,
            value: value.into(),
        });
        self
    }

    pub fn having_raw(&mut self, sql: &str) -> &mut Self {
        self.havings.push(Having::Raw(sql.to_string()));
        self
    }

    pub fn order_by(&mut self, column: &str, direction: Direction) -> &mut Self {
        self.orders.push((column.to_string(), direction));
        self
    }

    pub fn limit(&mut self, n: u64) -> &mut Self {
        self.limit = Some(n);
        self
    }

    pub fn offset(&mut self, n: u64) -> &mut Self {
        self.offset = Some(n);
        self
    }

    /// 分页窗口（页码从 1 开始）/ Page window, 1-based
    ///
    /// 偏移量饱和到 `i64::MAX`，超大页码只会得到空页
    /// The offset saturates at `i64::MAX`, so huge page numbers yield an empty page
    pub fn for_page(&mut self, page: u64, per_page: u64) -> &mut Self {
        let page = page.max(1);
        self.limit = Some(per_page);
        self.offset = Some((page - 1).saturating_mul(per_page).min(MAX_ROW_COUNT));
        self
    }

    pub fn with_trashed(&mut self) -> &mut Self {
        self.trashed = TrashedScope::Include;
        self
    }

    pub fn only_trashed(&mut self) -> &mut Self {
        self.trashed = TrashedScope::Only;
        self
    }

    pub fn trashed_scope(&self) -> TrashedScope {
        self.trashed
    }

    // ---- compilers ----

    /// 编译 SELECT / Compile SELECT
    pub fn to_select(&self, dialect: Dialect) -> (String, Vec<Value>) {
        let mut w = SqlWriter::new(dialect, false);
        self.write_select(&mut w, true);
        w.finish()
    }

    /// 编译 COUNT；分组或去重时包一层子查询
    /// Compile COUNT; grouped or distinct queries are wrapped in a subquery
    pub fn to_count(&self, dialect: Dialect) -> (String, Vec<Value>) {
        let mut w = SqlWriter::new(dialect, false);
        self.write_count(&mut w);
        w.finish()
    }

    /// 编译聚合函数 / Compile an aggregate function
    pub fn to_aggregate(&self, dialect: Dialect, func: &str, column: &str) -> (String, Vec<Value>) {
        let mut w = SqlWriter::new(dialect, false);
        let func = func.to_ascii_uppercase();
        let mut expr = format!("{}({})", func, dialect.quote(column));
        if func == "SUM" || func == "AVG" {
            expr = dialect.float_cast(&expr);
        }
        w.push(&format!(
            "SELECT {} AS aggregate FROM {}",
            expr,
            dialect.quote(&self.table)
        ));
        self.write_joins(&mut w);
        self.write_wheres(&mut w);
        w.finish()
    }

    pub fn to_insert(&self, dialect: Dialect, values: &[(String, Value)]) -> (String, Vec<Value>) {
        let mut w = SqlWriter::new(dialect, false);
        let cols = values
            .iter()
            .map(|(c, _)| dialect.quote(c))
            .collect::<Vec<_>>()
            .join(", ");
        w.push(&format!("INSERT INTO {} ({}) VALUES (", dialect.quote(&self.table), cols));
        for (i, (_, v)) in values.iter().enumerate() {
            if i > 0 {
                w.push(", ");
            }
            w.push_bind(v.clone());
        }
        w.push(")");
        if dialect.supports_returning() {
            w.push(" RETURNING *");
        }
        w.finish()
    }

    pub fn to_update(&self, dialect: Dialect, values: &[(String, Value)]) -> (String, Vec<Value>) {
        let mut w = SqlWriter::new(dialect, false);
        w.push(&format!("UPDATE {} SET ", dialect.quote(&self.table)));
        for (i, (c, v)) in values.iter().enumerate() {
            if i > 0 {
                w.push(", ");
            }
            w.push(&format!("{} = ", dialect.quote(c)));
            w.push_bind(v.clone());
        }
        self.write_wheres(&mut w);
        w.finish()
    }

    pub fn to_delete(&self, dialect: Dialect) -> (String, Vec<Value>) {
        let mut w = SqlWriter::new(dialect, false);
        w.push(&format!("DELETE FROM {}", dialect.quote(&self.table)));
        self.write_wheres(&mut w);
        w.finish()
    }

    /// 绑定值内联后的 SQL（调试与缓存键）/ SQL with binds inlined, for debugging and cache keys
    pub fn to_raw_sql(&self, dialect: Dialect) -> String {
        let mut w = SqlWriter::new(dialect, true);
        self.write_select(&mut w, true);
        w.finish().0
    }

    fn write_select(&self, w: &mut SqlWriter, with_tail: bool) {
        let d = w.dialect;
        w.push("SELECT ");
        if self.distinct {
            w.push("DISTINCT ");
        }
        if self.columns.is_empty() {
            w.push("*");
        } else {
            let cols = self
                .columns
                .iter()
                .map(|c| d.quote(c))
                .collect::<Vec<_>>()
                .join(", ");
            w.push(&cols);
        }
        w.push(&format!(" FROM {}", d.quote(&self.table)));
        self.write_joins(w);
        self.write_wheres(w);
        if !self.groups.is_empty() {
            let groups = self
                .groups
                .iter()
                .map(|g| d.quote(g))
                .collect::<Vec<_>>()
                .join(", ");
            w.push(&format!(" GROUP BY {}", groups));
        }
        self.write_havings(w);
        if !with_tail {
            return;
        }
        if !self.orders.is_empty() {
            let orders = self
                .orders
                .iter()
                .map(|(c, dir)| format!("{} {}", d.quote(c), dir.as_sql()))
                .collect::<Vec<_>>()
                .join(", ");
            w.push(&format!(" ORDER BY {}", orders));
        }
        // 数据库的 LIMIT/OFFSET 为有符号 64 位 / LIMIT and OFFSET are signed 64-bit in SQL
        let limit = self.limit.map(|l| l.min(MAX_ROW_COUNT));
        let offset = self.offset.map(|o| o.min(MAX_ROW_COUNT));
        match (limit, offset) {
            (Some(l), Some(o)) => w.push(&format!(" LIMIT {} OFFSET {}", l, o)),
            (Some(l), None) => w.push(&format!(" LIMIT {}", l)),
            (None, Some(o)) => match d {
                Dialect::Postgres => w.push(&format!(" OFFSET {}", o)),
                Dialect::Sqlite => w.push(&format!(" LIMIT -1 OFFSET {}", o)),
                Dialect::MySql => w.push(&format!(" LIMIT 18446744073709551615 OFFSET {}", o)),
            },
            (None, None) => {}
        }
    }

    fn write_count(&self, w: &mut SqlWriter) {
        let d = w.dialect;
        if self.is_aggregated() {
            w.push("SELECT COUNT(*) AS aggregate FROM (");
            self.write_select(w, false);
            w.push(") AS aggregate_table");
            return;
        }
        w.push(&format!("SELECT COUNT(*) AS aggregate FROM {}", d.quote(&self.table)));
        self.write_joins(w);
        self.write_wheres(w);
    }

    fn write_joins(&self, w: &mut SqlWriter) {
        let d = w.dialect;
        for join in &self.joins {
            let kw = match join.kind {
                JoinKind::Inner => "INNER JOIN",
                JoinKind::Left => "LEFT JOIN",
            };
            let on = join
                .on
                .iter()
                .map(|(l, r)| format!("{} = {}", d.quote(l), d.quote(r)))
                .collect::<Vec<_>>()
                .join(" AND ");
            w.push(&format!(" {} {} ON {}", kw, d.quote(&join.table), on));
        }
    }

    fn write_wheres(&self, w: &mut SqlWriter) {
        let d = w.dialect;
        let mut first = true;
        let mut sep = |w: &mut SqlWriter| {
            w.push(if first { " WHERE " } else { " AND " });
            first = false;
        };
        for cond in &self.wheres {
            sep(w);
            match cond {
                Condition::Basic { column, op, value } => {
                    let op = match op.as_str() {
                        "ILIKE" => d.like_operator().to_string(),
                        "NOT ILIKE" => format!("NOT {}", d.like_operator()),
                        other => other.to_string(),
                    };
                    w.push(&format!("{} {} ", d.quote(column), op));
                    w.push_bind(value.clone());
                }
                Condition::In { column, values } => {
                    if values.is_empty() {
                        w.push("0 = 1");
                        continue;
                    }
                    w.push(&format!("{} IN (", d.quote(column)));
                    for (i, v) in values.iter().enumerate() {
                        if i > 0 {
                            w.push(", ");
                        }
                        w.push_bind(v.clone());
                    }
                    w.push(")");
                }
                Condition::Null { column, negate } => {
                    let is = if *negate { "IS NOT NULL" } else { "IS NULL" };
                    w.push(&format!("{} {}", d.quote(column), is));
                }
                Condition::Raw { sql, binds } => {
                    w.push("(");
                    w.push_raw_with_binds(sql, binds);
                    w.push(")");
                }
            }
        }
        if let Some(col) = &self.soft_delete_column {
            let qualified = d.quote(&format!("{}.{}", self.table, col));
            match self.trashed {
                TrashedScope::Exclude => {
                    sep(w);
                    w.push(&format!("{} IS NULL", qualified));
                }
                TrashedScope::Only => {
                    sep(w);
                    w.push(&format!("{} IS NOT NULL", qualified));
                }
                TrashedScope::Include => {}
            }
        }
    }

    fn write_havings(&self, w: &mut SqlWriter) {
        let d = w.dialect;
        for (i, h) in self.havings.iter().enumerate() {
            w.push(if i == 0 { " HAVING " } else { " AND " });
            match h {
                Having::Basic { expr, op, value } => {
                    w.push(&format!("{} {} ", d.quote(expr), op));
                    w.push_bind(value.clone());
                }
                Having::Raw(sql) => w.push(sql),
            }
        }
    }
}

/// SQL 拼接器：负责占位符编号或内联字面量
/// SQL writer: numbers placeholders, or inlines literals for raw output
struct SqlWriter {
    dialect: Dialect,
    inline: bool,
    sql: String,
    binds: Vec<Value>,
    placeholders: usize,
}

impl SqlWriter {
    fn new(dialect: Dialect, inline: bool) -> Self {
        Self {
            dialect,
            inline,
            sql: String::new(),
            binds: Vec::new(),
            placeholders: 0,
        }
    }

    fn push(&mut self, s: &str) {
        self.sql.push_str(s);
    }

    fn push_bind(&mut self, v: Value) {
        // NULL 不绑定，避免驱动给它指定文本类型 / NULL is never bound, so the driver cannot type it as text
        if self.inline || v.is_null() {
            self.sql.push_str(&v.to_sql_literal());
            return;
        }
        self.placeholders += 1;
        self.sql.push_str(&self.dialect.placeholder(self.placeholders));
        self.binds.push(v);
    }

    /// `?` 按顺序替换为绑定；单引号内的 `?` 保持原样
    /// Each `?` becomes the next bind; `?` inside single quotes is left alone
    fn push_raw_with_binds(&mut self, sql: &str, binds: &[Value]) {
        let mut in_quote = false;
        let mut it = binds.iter();
        for c in sql.chars() {
            match c {
                '\'' => {
                    in_quote = !in_quote;
                    self.sql.push(c);
                }
                '?' if !in_quote => match it.next() {
                    Some(v) => self.push_bind(v.clone()),
                    None => self.sql.push(c),
                },
                _ => self.sql.push(c),
            }
        }
    }

    fn finish(self) -> (String, Vec<Value>) {
        (self.sql, self.binds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_select() {
        let b = Builder::table("users");
        let (sql, binds) = b.to_select(Dialect::Postgres);
        assert_eq!(sql, "SELECT * FROM \"users\"");
        assert!(binds.is_empty());
    }

    #[test]
    fn test_wheres_and_placeholders() {
        let mut b = Builder::table("users");
        b.where_eq("name", "john")
            .where_op("age", ">=", 18)
            .where_in("id", vec![1, 2, 3])
            .where_null("banned_at");
        let (sql, binds) = b.to_select(Dialect::Postgres);
        assert_eq!(
            sql,
            "SELECT * FROM \"users\" WHERE \"name\" = $1 AND \"age\" >= $2 AND \"id\" IN ($3, $4, $5) AND \"banned_at\" IS NULL"
        );
        assert_eq!(binds.len(), 5);
        let (sql, _) = b.to_select(Dialect::Sqlite);
        assert!(sql.contains("\"age\" >= ? AND \"id\" IN (?, ?, ?)"));
    }

    #[test]
    fn test_empty_in_is_false() {
        let mut b = Builder::table("users");
        b.where_in::<i64>("id", vec![]);
        let (sql, binds) = b.to_select(Dialect::Sqlite);
        assert!(sql.ends_with("WHERE 0 = 1"));
        assert!(binds.is_empty());
    }

    #[test]
    fn test_ilike_degrades_outside_postgres() {
        let mut b = Builder::table("users");
        b.where_op("name", "ilike", "%jo%");
        assert!(b.to_select(Dialect::Postgres).0.contains("\"name\" ILIKE $1"));
        assert!(b.to_select(Dialect::MySql).0.contains("`name` LIKE ?"));
    }

    #[test]
    fn test_unknown_operator_falls_back() {
        let mut b = Builder::table("users");
        b.where_op("id", "; DROP", 1);
        assert!(b.to_select(Dialect::Sqlite).0.contains("\"id\" = ?"));
    }

    #[test]
    fn test_raw_where_binds() {
        let mut b = Builder::table("users");
        b.where_eq("a", 1)
            .where_raw("age > ? OR name = '?'", vec![Value::Int(3)]);
        let (sql, binds) = b.to_select(Dialect::Postgres);
        assert!(sql.ends_with("(age > $2 OR name = '?')"));
        assert_eq!(binds, vec![Value::Int(1), Value::Int(3)]);
    }

    #[test]
    fn test_joins_groups_orders_limit() {
        let mut b = Builder::table("users");
        b.select(&["users.id", "COUNT(posts.id) AS total"])
            .join("posts", &[("posts.user_id", "users.id")])
            .left_join("teams", &[("teams.id", "users.team_id"), ("teams.org", "users.org")])
            .group_by(&["users.id"])
            .having("COUNT(posts.id)", ">", 2)
            .order_by("users.id", Direction::Desc)
            .for_page(3, 10);
        let (sql, binds) = b.to_select(Dialect::Postgres);
        assert_eq!(
            sql,
            "SELECT \"users\".\"id\", COUNT(posts.id) AS total FROM \"users\" \
INNER JOIN \"posts\" ON \"posts\".\"user_id\" = \"users\".\"id\" \
LEFT JOIN \"teams\" ON \"teams\".\"id\" = \"users\".\"team_id\" AND \"teams\".\"org\" = \"users\".\"org\" \
GROUP BY \"users\".\"id\" HAVING COUNT(posts.id) > $1 \
ORDER BY \"users\".\"id\" DESC LIMIT 10 OFFSET 20"
        );
        assert_eq!(binds, vec![Value::Int(2)]);
    }

    #[test]
    fn test_soft_delete_scopes() {
        let mut b = Builder::table("users").soft_deletes(Some("deleted_at"));
        b.where_eq("id", 1);
        assert!(b
            .to_select(Dialect::Sqlite)
            .0
            .ends_with("\"id\" = ? AND \"users\".\"deleted_at\" IS NULL"));
        b.only_trashed();
        assert!(b.to_select(Dialect::Sqlite).0.ends_with("\"users\".\"deleted_at\" IS NOT NULL"));
        b.with_trashed();
        assert!(!b.to_select(Dialect::Sqlite).0.contains("deleted_at"));
    }

    #[test]
    fn test_count_wraps_grouped_query() {
        let mut b = Builder::table("orders");
        b.where_eq("status", "paid").order_by("id", Direction::Asc).limit(5);
        assert_eq!(
            b.to_count(Dialect::Sqlite).0,
            "SELECT COUNT(*) AS aggregate FROM \"orders\" WHERE \"status\" = ?"
        );
        b.group_by(&["customer_id"]);
        assert_eq!(
            b.to_count(Dialect::Sqlite).0,
            "SELECT COUNT(*) AS aggregate FROM (SELECT * FROM \"orders\" WHERE \"status\" = ? GROUP BY \"customer_id\") AS aggregate_table"
        );
    }

    #[test]
    fn test_aggregate() {
        let mut b = Builder::table("orders");
        b.where_op("total", ">", 10);
        let (sql, binds) = b.to_aggregate(Dialect::Postgres, "sum", "total");
        assert_eq!(
            sql,
            "SELECT CAST(SUM(\"total\") AS DOUBLE PRECISION) AS aggregate FROM \"orders\" WHERE \"total\" > $1"
        );
        assert_eq!(binds.len(), 1);
        let (sql, _) = b.to_aggregate(Dialect::Sqlite, "max", "total");
        assert!(sql.starts_with("SELECT MAX(\"total\") AS aggregate"));
    }

    #[test]
    fn test_insert_update_delete() {
        let mut b = Builder::table("users");
        let values = vec![
            ("name".to_string(), Value::from("a")),
            ("age".to_string(), Value::from(3)),
        ];
        let (sql, _) = b.to_insert(Dialect::Postgres, &values);
        assert_eq!(
            sql,
            "INSERT INTO \"users\" (\"name\", \"age\") VALUES ($1, $2) RETURNING *"
        );
        let (sql, _) = b.to_insert(Dialect::MySql, &values);
        assert_eq!(sql, "INSERT INTO `users` (`name`, `age`) VALUES (?, ?)");

        b.where_eq("id", 7);
        let (sql, binds) = b.to_update(Dialect::Postgres, &values);
        assert_eq!(
            sql,
            "UPDATE \"users\" SET \"name\" = $1, \"age\" = $2 WHERE \"id\" = $3"
        );
        assert_eq!(binds.last(), Some(&Value::Int(7)));
        assert_eq!(
            b.to_delete(Dialect::Postgres).0,
            "DELETE FROM \"users\" WHERE \"id\" = $1"
        );
    }

    #[test]
    fn test_null_is_written_not_bound() {
        let mut b = Builder::table("users");
        b.where_eq("id", 1);
        let values = vec![
            ("age".to_string(), Value::Null),
            ("name".to_string(), Value::from("a")),
        ];
        let (sql, binds) = b.to_update(Dialect::Postgres, &values);
        assert_eq!(
            sql,
            "UPDATE \"users\" SET \"age\" = NULL, \"name\" = $1 WHERE \"id\" = $2"
        );
        assert_eq!(binds, vec![Value::from("a"), Value::Int(1)]);
    }

    #[test]
    fn test_typed_value_uses_column_kinds() {
        const KINDS: &[(&str, ColumnKind)] = &[("email", ColumnKind::Text), ("age", ColumnKind::Integer)];
        let b = Builder::table("users").column_kinds(KINDS);
        assert_eq!(b.typed_value("email", "12345"), Value::Text("12345".into()));
        assert_eq!(b.typed_value("users.email", "12345"), Value::Text("12345".into()));
        assert_eq!(b.typed_value("age", "31"), Value::Int(31));
        assert_eq!(b.typed_value("score", "1.5"), Value::Float(1.5));
    }

    #[test]
    fn test_offset_without_limit() {
        let mut b = Builder::table("t");
        b.offset(5);
        assert!(b.to_select(Dialect::Sqlite).0.ends_with("LIMIT -1 OFFSET 5"));
        assert!(b.to_select(Dialect::Postgres).0.ends_with(" OFFSET 5"));
    }

    #[test]
    fn test_for_page_saturates_huge_pages() {
        let mut b = Builder::table("t");
        b.for_page(u64::MAX, 50);
        let sql = b.to_select(Dialect::Postgres).0;
        assert!(sql.ends_with(&format!(" LIMIT 50 OFFSET {}", i64::MAX)), "{}", sql);

        b.for_page(200_000_000_000_000_000, 50);
        assert!(b.to_select(Dialect::Sqlite).0.ends_with(&format!("OFFSET {}", i64::MAX)));

        b.for_page(3, 10);
        assert!(b.to_select(Dialect::Sqlite).0.ends_with(" LIMIT 10 OFFSET 20"));

        let mut b = Builder::table("t");
        b.limit(u64::MAX);
        assert!(b.to_select(Dialect::Postgres).0.ends_with(&format!(" LIMIT {}", i64::MAX)));
    }

    #[test]
    fn test_raw_sql_inlines_values() {
        let mut b = Builder::table("users");
        b.where_eq("name", "O'Neil").where_op("age", ">", 3);
        assert_eq!(
            b.to_raw_sql(Dialect::Postgres),
            "SELECT * FROM \"users\" WHERE \"name\" = 'O''Neil' AND \"age\" > 3"
        );
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!(Direction::parse("DESC"), Direction::Desc);
        assert_eq!(Direction::parse("desc"), Direction::Desc);
        assert_eq!(Direction::parse("sideways"), Direction::Asc);
    }
}
