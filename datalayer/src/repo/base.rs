use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::db::connection::{get_database, Database};
use crate::db::dialect::is_identifier;
use crate::db::error::{
    throw_error_on_creating, throw_error_on_deleting, throw_error_on_updating, DbError, Result,
};
use crate::db::model::Model;
use crate::db::query::{Builder, Direction};
use crate::db::value::Value;
use crate::repo::cache::{cache_key, remember, CacheSettings};
use crate::repo::criteria::{decode_page, Criteria};
use crate::repo::paginator::Paginator;
use crate::repo::relations::load_relations;
use crate::repo::request::RequestSettings;

pub const DEFAULT_PER_PAGE: u64 = 50;

/// 保存的查询范围 / Stored query scope
pub type Scope = Arc<dyn Fn(&mut Builder) + Send + Sync>;

/// `where_eq` 的取值：单值为比较，列表为 `IN`
/// Value for `where_eq`: a single value compares, a list becomes `IN`
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    One(Value),
    Many(Vec<Value>),
}

impl From<Value> for Operand {
    fn from(v: Value) -> Self {
        Operand::One(v)
    }
}

impl From<i32> for Operand {
    fn from(v: i32) -> Self {
        Operand::One(v.into())
    }
}

impl From<i64> for Operand {
    fn from(v: i64) -> Self {
        Operand::One(v.into())
    }
}

impl From<bool> for Operand {
    fn from(v: bool) -> Self {
        Operand::One(v.into())
    }
}

impl From<f64> for Operand {
    fn from(v: f64) -> Self {
        Operand::One(v.into())
    }
}

impl From<&str> for Operand {
    fn from(v: &str) -> Self {
        Operand::One(v.into())
    }
}

impl From<String> for Operand {
    fn from(v: String) -> Self {
        Operand::One(v.into())
    }
}

impl From<Vec<Value>> for Operand {
    fn from(v: Vec<Value>) -> Self {
        Operand::Many(v)
    }
}

impl From<Vec<i64>> for Operand {
    fn from(v: Vec<i64>) -> Self {
        Operand::Many(v.into_iter().map(Value::from).collect())
    }
}

impl From<Vec<&str>> for Operand {
    fn from(v: Vec<&str>) -> Self {
        Operand::Many(v.into_iter().map(Value::from).collect())
    }
}

impl From<Vec<String>> for Operand {
    fn from(v: Vec<String>) -> Self {
        Operand::Many(v.into_iter().map(Value::from).collect())
    }
}

/// 通用仓库实现 / Generic repository
///
/// 持有模型的待执行查询；读写等终结操作执行后重置为新查询
/// Holds the model's pending query; terminal reads and writes reset it to a fresh one
pub struct BaseRepository<M> {
    db: Database,
    query: Builder,
    equals: String,
    scope: Option<Scope>,
    eager: Vec<String>,
    request: RequestSettings,
    cache: Option<CacheSettings>,
    cached: bool,
    _marker: PhantomData<fn() -> M>,
}

impl<M> BaseRepository<M>
where
    M: Model + DeserializeOwned + Send + Sync,
{
    pub fn new(db: Database) -> Self {
        Self {
            db,
            query: M::new_query(),
            equals: "=".to_string(),
            scope: None,
            eager: Vec::new(),
            request: RequestSettings::default(),
            cache: None,
            cached: false,
            _marker: PhantomData,
        }
    }

    /// 使用模型所在分组的数据库 / Use the database of the model's group
    pub async fn from_group() -> Result<Self> {
        Ok(Self::new(get_database(M::table_group()).await?))
    }

    pub fn with_cache(mut self, settings: CacheSettings) -> Self {
        self.cache = Some(settings);
        self
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn query(&self) -> &Builder {
        &self.query
    }

    pub fn query_mut(&mut self) -> &mut Builder {
        &mut self.query
    }

    pub fn reset_query(&mut self) -> &mut Self {
        self.query = M::new_query();
        self
    }

    /// 在待执行查询的副本上构造条件查询 / Criteria over a copy of the pending query
    pub fn criteria(&self) -> Criteria<'_, M> {
        Criteria::new(self, self.query.clone())
    }

    // ---- conditions ----

    /// 设置 `where_eq` 使用的比较符 / Operator used by `where_eq`
    pub fn set_equals(&mut self, operator: &str) -> &mut Self {
        self.equals = operator.to_string();
        self
    }

    pub fn where_eq<O: Into<Operand>>(&mut self, column: &str, value: O) -> &mut Self {
        match value.into() {
            Operand::One(v) => self.query.where_op(column, &self.equals, v),
            Operand::Many(values) => self.query.where_in(column, values),
        };
        self
    }

    pub fn where_op<V: Into<Value>>(&mut self, column: &str, op: &str, value: V) -> &mut Self {
        self.query.where_op(column, op, value);
        self
    }

    pub fn where_in<V: Into<Value>>(&mut self, column: &str, values: Vec<V>) -> &mut Self {
        self.query.where_in(column, values);
        self
    }

    pub fn where_null(&mut self, column: &str) -> &mut Self {
        self.query.where_null(column);
        self
    }

    pub fn where_not_null(&mut self, column: &str) -> &mut Self {
        self.query.where_not_null(column);
        self
    }

    pub fn where_raw(&mut self, sql: &str, binds: Vec<Value>) -> &mut Self {
        self.query.where_raw(sql, binds);
        self
    }

    pub fn set_scope<F>(&mut self, scope: F) -> &mut Self
    where
        F: Fn(&mut Builder) + Send + Sync + 'static,
    {
        self.scope = Some(Arc::new(scope));
        self
    }

    pub fn reset_scope(&mut self) -> &mut Self {
        self.scope = None;
        self
    }

    /// 把保存的范围作用到待执行查询 / Run the stored scope against the pending query
    pub fn apply_scope(&mut self) -> &mut Self {
        if let Some(scope) = &self.scope {
            scope(&mut self.query);
        }
        self
    }

    // ---- search ----

    /// 选择列；空列表为 `*` / Select columns; empty means `*`
    pub fn select(&mut self, columns: &[&str]) -> &mut Self {
        self.query.select(columns);
        self
    }

    /// 非 `asc`/`desc` 的方向按升序 / Directions other than `asc`/`desc` sort ascending
    pub fn order_by(&mut self, column: &str, direction: &str) -> &mut Self {
        self.query.order_by(column, Direction::parse(direction));
        self
    }

    pub fn order_by_many(&mut self, orders: &[(&str, &str)]) -> &mut Self {
        for (column, direction) in orders {
            self.order_by(column, direction);
        }
        self
    }

    pub fn group_by(&mut self, columns: &[&str]) -> &mut Self {
        self.query.group_by(columns);
        self
    }

    pub fn having<V: Into<Value>>(&mut self, expr: &str, op: &str, value: V) -> &mut Self {
        self.query.having(expr, op, value);
        self
    }

    pub fn having_raw(&mut self, sql: &str) -> &mut Self {
        self.query.having_raw(sql);
        self
    }

    pub fn distinct(&mut self) -> &mut Self {
        self.query.distinct();
        self
    }

    pub fn take(&mut self, n: u64) -> &mut Self {
        self.query.limit(n);
        self
    }

    pub fn skip(&mut self, n: u64) -> &mut Self {
        self.query.offset(n);
        self
    }

    // ---- joins ----

    pub fn join(&mut self, table: &str, on: &[(&str, &str)]) -> &mut Self {
        self.query.join(table, on);
        self
    }

    pub fn inner_join(&mut self, table: &str, on: &[(&str, &str)]) -> &mut Self {
        self.join(table, on)
    }

    pub fn left_join(&mut self, table: &str, on: &[(&str, &str)]) -> &mut Self {
        self.query.left_join(table, on);
        self
    }

    /// 预加载关联 / Eager-load relations on the next read
    pub fn with(&mut self, relations: &[&str]) -> &mut Self {
        self.eager.extend(relations.iter().map(|r| r.to_string()));
        self
    }

    // ---- trashed ----

    pub fn add_deleted_records(&mut self) -> &mut Self {
        self.query.with_trashed();
        self
    }

    pub fn only_deleted_records(&mut self) -> &mut Self {
        self.query.only_trashed();
        self
    }

    // ---- query string ----

    pub fn add_partial_search(&mut self, column: &str) -> &mut Self {
        self.request.add_partial_search(column);
        self
    }

    pub fn allowed_filters(&mut self, fields: &[&str]) -> &mut Self {
        self.request.allowed_filters(fields);
        self
    }

    pub fn allowed_sorts(&mut self, fields: &[&str]) -> &mut Self {
        self.request.allowed_sorts(fields);
        self
    }

    pub fn refer(&mut self, alias: &str, column: &str) -> &mut Self {
        self.request.refer(alias, column);
        self
    }

    pub fn add_custom_filters(
        &mut self,
        filters: std::collections::HashMap<String, std::collections::HashMap<String, String>>,
    ) -> &mut Self {
        self.request.add_custom_filters(filters);
        self
    }

    pub fn add_custom_filter(&mut self, param: &str, value: &str, sql: &str) -> &mut Self {
        self.request.add_custom_filter(param, value, sql);
        self
    }

    pub fn change_attrs_param(&mut self, param: &str) -> &mut Self {
        self.request.change_attrs_param(param);
        self
    }

    pub fn change_sort_param(&mut self, param: &str) -> &mut Self {
        self.request.change_sort_param(param);
        self
    }

    pub fn select_fields(&mut self, attributes: &str) -> &mut Self {
        self.request.select_fields(&mut self.query, attributes);
        self
    }

    pub fn apply_sorting(&mut self, fields: &str) -> &mut Self {
        self.request.apply_sorting(&mut self.query, fields);
        self
    }

    pub fn apply_custom_filters(&mut self, param: &str, value: &str) -> &mut Self {
        self.request.apply_custom_filter(&mut self.query, param, value);
        self
    }

    /// 把请求参数转换为查询条件 / Translate request parameters into clauses
    pub fn query_string(&mut self, params: &[(String, String)]) -> &mut Self {
        self.request.apply(&mut self.query, &self.equals, params);
        self
    }

    // ---- cache ----

    /// 下一次读取走缓存 / Memoize the next read
    pub fn cached(&mut self) -> &mut Self {
        if self.cache.is_none() {
            tracing::warn!(table = M::table_name(), "cached() called without a cache store");
        }
        self.cached = true;
        self
    }

    /// 清空本仓库的缓存标签 / Flush this repository's cache tag
    pub async fn flush_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.store.flush(cache.tag.as_deref()).await;
        }
    }

    fn take_cache(&mut self) -> Option<CacheSettings> {
        if std::mem::take(&mut self.cached) {
            self.cache.clone()
        } else {
            None
        }
    }

    async fn memoize<F, Fut>(
        &self,
        cache: Option<CacheSettings>,
        sql: &str,
        binds: &[Value],
        load: F,
    ) -> Result<serde_json::Value>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<serde_json::Value>>,
    {
        match cache {
            Some(c) => {
                let key = cache_key(self.db.name(), sql, binds);
                remember(c.store.as_ref(), c.tag.as_deref(), &key, c.ttl, load).await
            }
            None => load().await,
        }
    }

    fn take_query(&mut self) -> Builder {
        std::mem::replace(&mut self.query, M::new_query())
    }

    // ---- reads ----

    pub(crate) async fn select_rows(
        &self,
        query: &Builder,
        relations: &[String],
    ) -> Result<Vec<serde_json::Value>> {
        let (sql, binds) = query.to_select(self.db.dialect());
        let mut rows = self.db.fetch_all_json(&sql, &binds).await?;
        if !relations.is_empty() && !rows.is_empty() {
            load_relations::<M>(&self.db, &mut rows, relations).await?;
        }
        Ok(rows)
    }

    pub(crate) async fn paginate_rows(
        &self,
        mut query: Builder,
        relations: &[String],
        per_page: u64,
        page: u64,
    ) -> Result<Paginator<serde_json::Value>> {
        let per_page = if per_page == 0 { DEFAULT_PER_PAGE } else { per_page };
        let (sql, binds) = query.to_count(self.db.dialect());
        let total = as_u64(&self.db.fetch_scalar(&sql, &binds).await?);
        query.for_page(page, per_page);
        let rows = self.select_rows(&query, relations).await?;
        Ok(Paginator::new(rows, total, per_page, page))
    }

    async fn load_rows(&mut self, query: Builder) -> Result<Vec<serde_json::Value>> {
        self.load_rows_keyed(query, None).await
    }

    /// `key_sql` 替代缓存键中的 SQL / `key_sql` replaces the SQL in the cache key
    async fn load_rows_keyed(
        &mut self,
        query: Builder,
        key_sql: Option<String>,
    ) -> Result<Vec<serde_json::Value>> {
        let cache = self.take_cache();
        let eager = std::mem::take(&mut self.eager);
        let (rendered, binds) = query.to_select(self.db.dialect());
        let mut sql = key_sql.unwrap_or(rendered);
        if !eager.is_empty() {
            sql = format!("{} /* with {} */", sql, eager.join(","));
        }
        let this = &*self;
        let (q, e) = (&query, &eager);
        let value = this
            .memoize(cache, &sql, &binds, move || async move {
                let rows = this.select_rows(q, e).await?;
                Ok::<_, DbError>(serde_json::Value::Array(rows))
            })
            .await?;
        Ok(into_rows(value))
    }

    /// 按主键查找 / Find by primary key
    pub async fn find<I: Into<Value>>(&mut self, id: I) -> Result<Option<M>> {
        let mut query = self.take_query();
        query
            .where_eq(&qualified_key::<M>(), id)
            .limit(1);
        first_of(self.load_rows(query).await?)
    }

    pub async fn find_by_id<I: Into<Value>>(&mut self, id: I) -> Result<Option<M>> {
        self.find(id).await
    }

    /// 找不到时返回 `NotFound` / `NotFound` when missing
    pub async fn find_or_fail<I: Into<Value>>(&mut self, id: I) -> Result<M> {
        self.find(id).await?.ok_or(DbError::NotFound)
    }

    pub async fn first(&mut self) -> Result<Option<M>> {
        let mut query = self.take_query();
        query.limit(1);
        first_of(self.load_rows(query).await?)
    }

    /// 等值条件取首条；`Null` 为 `IS NULL`
    /// First row matching equality conditions; `Null` means `IS NULL`
    pub async fn first_where(&mut self, conditions: &[(&str, Value)]) -> Result<Option<M>> {
        for (column, value) in conditions {
            match value {
                Value::Null => self.query.where_null(column),
                other => self.query.where_eq(column, other.clone()),
            };
        }
        self.first().await
    }

    pub async fn fetch(&mut self) -> Result<Vec<M>> {
        let query = self.take_query();
        decode_rows(self.load_rows(query).await?)
    }

    /// 以 JSON 行返回（可保留别名列）/ Rows as JSON, keeps aliased columns
    pub async fn fetch_json(&mut self) -> Result<Vec<serde_json::Value>> {
        let query = self.take_query();
        self.load_rows(query).await
    }

    /// 全表读取，忽略待执行条件 / Every row, ignoring pending conditions
    ///
    /// 缓存键固定为 `SELECT * FROM <table>`，软删除范围仍然生效
    /// Cached under `SELECT * FROM <table>`; the soft-delete scope still applies
    pub async fn fetch_all(&mut self) -> Result<Vec<M>> {
        self.reset_query();
        let key_sql = format!("SELECT * FROM {}", M::table_name());
        decode_rows(self.load_rows_keyed(M::new_query(), Some(key_sql)).await?)
    }

    pub async fn paginate(&mut self, per_page: u64, page: u64) -> Result<Paginator<M>> {
        decode_page(self.paginate_json(per_page, page).await?)
    }

    pub async fn paginate_json(
        &mut self,
        per_page: u64,
        page: u64,
    ) -> Result<Paginator<serde_json::Value>> {
        let cache = self.take_cache();
        let eager = std::mem::take(&mut self.eager);
        let query = self.take_query();
        let (sql, binds) = query.to_select(self.db.dialect());
        let key_sql = format!("{} /* page {} of {} with {} */", sql, page, per_page, eager.join(","));
        let this = &*self;
        let (q, e) = (&query, &eager);
        let value = this
            .memoize(cache, &key_sql, &binds, move || async move {
                let page = this.paginate_rows(q.clone(), e, per_page, page).await?;
                Ok::<_, DbError>(serde_json::to_value(page)?)
            })
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    pub async fn count(&mut self) -> Result<u64> {
        let cache = self.take_cache();
        let query = self.take_query();
        let (sql, binds) = query.to_count(self.db.dialect());
        let value = self.scalar(cache, &sql, &binds).await?;
        Ok(as_u64(&value))
    }

    pub async fn exists(&mut self) -> Result<bool> {
        Ok(self.count().await? > 0)
    }

    async fn aggregate(&mut self, func: &str, column: &str) -> Result<serde_json::Value> {
        let cache = self.take_cache();
        let query = self.take_query();
        let (sql, binds) = query.to_aggregate(self.db.dialect(), func, column);
        self.scalar(cache, &sql, &binds).await
    }

    async fn scalar(
        &self,
        cache: Option<CacheSettings>,
        sql: &str,
        binds: &[Value],
    ) -> Result<serde_json::Value> {
        let db = &self.db;
        self.memoize(cache, sql, binds, move || db.fetch_scalar(sql, binds))
            .await
    }

    /// 没有匹配行时为 0 / Zero when nothing matches
    pub async fn sum(&mut self, column: &str) -> Result<f64> {
        Ok(self.aggregate("sum", column).await?.as_f64().unwrap_or(0.0))
    }

    pub async fn avg(&mut self, column: &str) -> Result<Option<f64>> {
        Ok(self.aggregate("avg", column).await?.as_f64())
    }

    pub async fn max(&mut self, column: &str) -> Result<serde_json::Value> {
        self.aggregate("max", column).await
    }

    pub async fn min(&mut self, column: &str) -> Result<serde_json::Value> {
        self.aggregate("min", column).await
    }

    /// 带占位符的 SQL / SQL with placeholders
    pub fn to_sql(&self) -> String {
        self.query.to_select(self.db.dialect()).0
    }

    /// 内联绑定值后的 SQL，同时写入 debug 日志
    /// SQL with binds inlined, also written to the debug log
    pub fn debug(&self) -> String {
        let sql = self.query.to_raw_sql(self.db.dialect());
        tracing::debug!(table = M::table_name(), sql = %sql, "pending query");
        sql
    }

    // ---- writes ----

    async fn find_row(&self, id: Value) -> Result<Option<serde_json::Value>> {
        let mut query = M::new_query();
        query.where_eq(&qualified_key::<M>(), id).limit(1);
        let (sql, binds) = query.to_select(self.db.dialect());
        self.db.fetch_optional_json(&sql, &binds).await
    }

    /// 新建记录；只写入可批量赋值的列
    /// Create a record; only mass-assignable columns are written
    pub async fn create(&mut self, fields: serde_json::Value) -> Result<Option<M>> {
        let mut values = assignable::<M>(&fields, false, throw_error_on_creating)?;
        if values.is_empty() {
            return Err(DbError::MassAssignment(format!(
                "no assignable attributes for {}",
                M::table_name()
            )));
        }
        if M::timestamps() {
            let now = now_string();
            for column in ["created_at", "updated_at"] {
                if !values.iter().any(|(c, _)| c == column) {
                    values.push((column.to_string(), Value::Text(now.clone())));
                }
            }
        }

        let dialect = self.db.dialect();
        let (sql, binds) = M::new_query().to_insert(dialect, &values);
        let row = if dialect.supports_returning() {
            self.db
                .fetch_optional_json(&sql, &binds)
                .await
                .map_err(|e| throw_error_on_creating(vec![e.to_string()], None))?
        } else {
            let res = self
                .db
                .execute(&sql, &binds)
                .await
                .map_err(|e| throw_error_on_creating(vec![e.to_string()], None))?;
            let id = res
                .last_insert_id()
                .map(Value::Int)
                .or_else(|| fields.get(M::primary_key()).map(Value::from));
            match id {
                Some(id) => self.find_row(id).await?,
                None => None,
            }
        };

        tracing::debug!(table = M::table_name(), "record created");
        self.flush_cache().await;
        row.map(serde_json::from_value).transpose().map_err(Into::into)
    }

    /// 更新记录；记录不存在时返回 `None`
    /// Update a record; `None` when it does not exist
    pub async fn update<I: Into<Value>>(
        &mut self,
        fields: serde_json::Value,
        id: I,
    ) -> Result<Option<M>> {
        let id = id.into();
        let Some(existing) = self.find_row(id.clone()).await? else {
            return Ok(None);
        };
        let mut values = assignable::<M>(&fields, true, throw_error_on_updating)?;
        if values.is_empty() {
            return Ok(Some(serde_json::from_value(existing)?));
        }
        if M::timestamps() && !values.iter().any(|(c, _)| c == "updated_at") {
            values.push(("updated_at".to_string(), Value::Text(now_string())));
        }

        let mut query = M::new_query();
        query.where_eq(M::primary_key(), id.clone());
        let (sql, binds) = query.to_update(self.db.dialect(), &values);
        self.db
            .execute(&sql, &binds)
            .await
            .map_err(|e| throw_error_on_updating(vec![e.to_string()], None))?;

        tracing::debug!(table = M::table_name(), id = %id, "record updated");
        self.flush_cache().await;
        self.find_row(id)
            .await?
            .map(serde_json::from_value)
            .transpose()
            .map_err(Into::into)
    }

    /// 按主键删除，返回影响行数；支持软删除的模型只标记删除时间
    /// Delete by primary key and return affected rows; soft-deleting models only stamp the column
    pub async fn delete<I: Into<Value>>(&mut self, id: I) -> Result<u64> {
        let id = id.into();
        let mut query = M::new_query();
        query.where_eq(M::primary_key(), id.clone());
        let affected = self.remove(&query).await?;
        tracing::debug!(table = M::table_name(), id = %id, affected, "record deleted");
        Ok(affected)
    }

    async fn remove(&self, query: &Builder) -> Result<u64> {
        let dialect = self.db.dialect();
        let (sql, binds) = match M::soft_delete_column() {
            Some(column) => query.to_update(
                dialect,
                &[(column.to_string(), Value::Text(now_string()))],
            ),
            None => query.to_delete(dialect),
        };
        self.write(&sql, &binds).await
    }

    async fn write(&self, sql: &str, binds: &[Value]) -> Result<u64> {
        let affected = self
            .db
            .execute(sql, binds)
            .await
            .map_err(|e| throw_error_on_deleting(vec![e.to_string()], None))?
            .rows_affected();
        if affected > 0 {
            self.flush_cache().await;
        }
        Ok(affected)
    }

    /// 按待执行条件批量更新 / Update every row matching the pending query
    pub async fn mass_update(&mut self, fields: serde_json::Value) -> Result<u64> {
        let values = assignable::<M>(&fields, true, throw_error_on_updating)?;
        let query = self.take_query();
        if values.is_empty() {
            return Ok(0);
        }
        let (sql, binds) = query.to_update(self.db.dialect(), &values);
        let affected = self
            .db
            .execute(&sql, &binds)
            .await
            .map_err(|e| throw_error_on_updating(vec![e.to_string()], None))?
            .rows_affected();
        if affected > 0 {
            self.flush_cache().await;
        }
        Ok(affected)
    }

    /// 按待执行条件批量删除 / Delete every row matching the pending query
    pub async fn mass_delete(&mut self) -> Result<u64> {
        let query = self.take_query();
        self.remove(&query).await
    }

    /// 物理删除（包括已软删除的行）/ Hard delete, soft-deleted rows included
    pub async fn force_delete(&mut self) -> Result<u64> {
        let mut query = self.take_query();
        query.with_trashed();
        let (sql, binds) = query.to_delete(self.db.dialect());
        self.write(&sql, &binds).await
    }

    /// 恢复匹配的已删除记录 / Restore matching soft-deleted rows
    pub async fn restore_deleted_records(&mut self) -> Result<u64> {
        let mut query = self.take_query();
        let Some(column) = M::soft_delete_column() else {
            return Ok(0);
        };
        query.only_trashed();
        let (sql, binds) = query.to_update(self.db.dialect(), &[(column.to_string(), Value::Null)]);
        let affected = self
            .db
            .execute(&sql, &binds)
            .await
            .map_err(|e| throw_error_on_updating(vec![e.to_string()], None))?
            .rows_affected();
        if affected > 0 {
            self.flush_cache().await;
        }
        Ok(affected)
    }
}

fn qualified_key<M: Model>() -> String {
    format!("{}.{}", M::table_name(), M::primary_key())
}

fn now_string() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// 取出可写入的列；`skip_key` 时忽略主键
/// Writable columns of a payload; the primary key is dropped when `skip_key`
fn assignable<M: Model>(
    fields: &serde_json::Value,
    skip_key: bool,
    on_error: fn(Vec<String>, Option<&str>) -> DbError,
) -> Result<Vec<(String, Value)>> {
    let Some(map) = fields.as_object() else {
        return Err(on_error(
            vec!["payload must be a JSON object".to_string()],
            None,
        ));
    };
    let fillable = M::fillable();
    let mut values = Vec::with_capacity(map.len());
    for (column, value) in map {
        if skip_key && column == M::primary_key() {
            continue;
        }
        if !fillable.is_empty() && !fillable.contains(&column.as_str()) {
            tracing::debug!(table = M::table_name(), column = %column, "dropping guarded attribute");
            continue;
        }
        if !is_identifier(column) || column.contains('.') {
            return Err(DbError::InvalidColumn(column.clone()));
        }
        values.push((column.clone(), Value::from(value).conform(M::column_kind(column))));
    }
    Ok(values)
}

fn into_rows(value: serde_json::Value) -> Vec<serde_json::Value> {
    match value {
        serde_json::Value::Array(rows) => rows,
        serde_json::Value::Null => Vec::new(),
        other => vec![other],
    }
}

fn first_of<M: DeserializeOwned>(mut rows: Vec<serde_json::Value>) -> Result<Option<M>> {
    if rows.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_value(rows.swap_remove(0))?))
}

fn decode_rows<M: DeserializeOwned>(rows: Vec<serde_json::Value>) -> Result<Vec<M>> {
    rows.into_iter()
        .map(|r| serde_json::from_value(r).map_err(Into::into))
        .collect()
}

fn as_u64(v: &serde_json::Value) -> u64 {
    v.as_u64()
        .or_else(|| v.as_f64().map(|f| f.max(0.0) as u64))
        .or_else(|| v.as_str().and_then(|s| s.parse().ok()))
        .unwrap_or(0)
}
