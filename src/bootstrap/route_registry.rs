use actix_web::web;
use lazy_static::lazy_static;
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard};

/// 路由配置函数类型
pub type RouteConfigFn = fn(&mut web::ServiceConfig);

/// 路由信息结构
#[derive(Debug, Clone)]
pub struct RouteInfo {
    pub name: String,
    pub description: String,
    pub module: String,
    pub config_fn: RouteConfigFn,
}

/// 路由注册器；按名称去重，重复注册以最后一次为准
/// Route registry keyed by name; registering a name twice keeps the last one
#[derive(Debug, Default)]
pub struct RouteRegistry {
    routes: BTreeMap<String, RouteInfo>,
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_route(&mut self, route_info: RouteInfo) {
        self.routes.insert(route_info.name.clone(), route_info);
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// 配置所有路由到 ServiceConfig
    pub fn configure_all_routes(&self, cfg: &mut web::ServiceConfig) {
        for route_info in self.routes.values() {
            (route_info.config_fn)(cfg);
        }
    }

    /// 记录路由信息
    pub fn log_routes(&self) {
        for route in self.routes.values() {
            tracing::info!(
                module = %route.module,
                name = %route.name,
                "route registered: {}",
                route.description
            );
        }
        tracing::info!(total = self.routes.len(), "routes configured");
    }
}

lazy_static! {
    static ref GLOBAL_ROUTE_REGISTRY: RwLock<RouteRegistry> = RwLock::new(RouteRegistry::new());
}

fn registry() -> RwLockReadGuard<'static, RouteRegistry> {
    // 锁中毒时仍可读取已注册的路由 / a poisoned lock still holds usable routes
    GLOBAL_ROUTE_REGISTRY
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// 注册路由到全局注册器
pub fn register_global_route(route_info: RouteInfo) {
    let mut registry = GLOBAL_ROUTE_REGISTRY
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    registry.register_route(route_info);
}

/// 配置所有全局路由
pub fn configure_global_routes(cfg: &mut web::ServiceConfig) {
    registry().configure_all_routes(cfg);
}

pub fn log_global_routes() {
    registry().log_routes();
}

/// 便捷宏：注册路由
#[macro_export]
macro_rules! register_route {
    ($name:expr, $description:expr, $module:expr, $config_fn:expr) => {
        $crate::route_registry::register_global_route($crate::route_registry::RouteInfo {
            name: $name.to_string(),
            description: $description.to_string(),
            module: $module.to_string(),
            config_fn: $config_fn,
        });
    };
}
