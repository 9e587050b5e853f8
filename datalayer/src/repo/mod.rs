use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::db::error::Result;
use crate::db::model::Model;
use crate::db::value::Value;

pub mod base;
pub mod cache;
pub mod criteria;
pub mod paginator;
pub mod relations;
pub mod request;

pub use base::{BaseRepository, Operand, Scope, DEFAULT_PER_PAGE};
pub use cache::{cache_key, remember, CacheSettings, CacheStore, MemoryCache};
pub use criteria::{apply_conditions, parse_sort, Conditions, Criteria, FilterValue};
pub use paginator::Paginator;
pub use request::RequestSettings;

/// 通用仓库 Trait，约定标准 CRUD 操作。
/// 不依赖具体数据库类型；条件按 `apply_conditions` 的规则解释，排序字段以 `-` 表示降序。
#[async_trait]
pub trait Repository<T, PK>: Send {
    /// 读取全部记录；`limit = 0` 不限制
    async fn find_all(&mut self, columns: &[&str], sort: &[&str], limit: u64) -> Result<Vec<T>>;

    /// 按条件读取第一条
    async fn find_first(&mut self, conditions: &[(String, FilterValue)], columns: &[&str]) -> Result<Option<T>>;

    /// 按主键读取
    async fn find_by_id(&mut self, id: PK, columns: &[&str]) -> Result<Option<T>>;

    /// 按条件读取
    async fn find_by(
        &mut self,
        conditions: &[(String, FilterValue)],
        columns: &[&str],
        sort: &[&str],
        limit: u64,
    ) -> Result<Vec<T>>;

    /// 分页读取
    async fn paginate_by(
        &mut self,
        per_page: u64,
        page: u64,
        conditions: &[(String, FilterValue)],
        columns: &[&str],
        sort: &[&str],
    ) -> Result<Paginator<T>>;

    /// 创建记录，返回新记录
    async fn create(&mut self, data: serde_json::Value) -> Result<Option<T>>;

    /// 更新记录；不存在时返回 `None`
    async fn update(&mut self, data: serde_json::Value, id: PK) -> Result<Option<T>>;

    /// 删除记录，返回影响行数
    async fn delete(&mut self, id: PK) -> Result<u64>;
}

#[async_trait]
impl<M, PK> Repository<M, PK> for BaseRepository<M>
where
    M: Model + DeserializeOwned + Send + Sync + 'static,
    PK: Into<Value> + Send + 'static,
{
    async fn find_all(&mut self, columns: &[&str], sort: &[&str], limit: u64) -> Result<Vec<M>> {
        self.reset_query();
        self.criteria().select(columns).order_by(sort).limit(limit).get().await
    }

    async fn find_first(
        &mut self,
        conditions: &[(String, FilterValue)],
        columns: &[&str],
    ) -> Result<Option<M>> {
        let found = self.criteria().apply(conditions).select(columns).first().await;
        self.reset_query();
        found
    }

    async fn find_by_id(&mut self, id: PK, columns: &[&str]) -> Result<Option<M>> {
        self.select(columns);
        self.find(id).await
    }

    async fn find_by(
        &mut self,
        conditions: &[(String, FilterValue)],
        columns: &[&str],
        sort: &[&str],
        limit: u64,
    ) -> Result<Vec<M>> {
        let found = self
            .criteria()
            .apply(conditions)
            .select(columns)
            .order_by(sort)
            .limit(limit)
            .get()
            .await;
        self.reset_query();
        found
    }

    async fn paginate_by(
        &mut self,
        per_page: u64,
        page: u64,
        conditions: &[(String, FilterValue)],
        columns: &[&str],
        sort: &[&str],
    ) -> Result<Paginator<M>> {
        let found = self
            .criteria()
            .apply(conditions)
            .select(columns)
            .order_by(sort)
            .paginate(per_page, page)
            .await;
        self.reset_query();
        found
    }

    async fn create(&mut self, data: serde_json::Value) -> Result<Option<M>> {
        BaseRepository::create(self, data).await
    }

    async fn update(&mut self, data: serde_json::Value, id: PK) -> Result<Option<M>> {
        BaseRepository::update(self, data, id).await
    }

    async fn delete(&mut self, id: PK) -> Result<u64> {
        BaseRepository::delete(self, id).await
    }
}
