/// User 模块：基于仓库层的演示资源
/// Demo resource built on the repository layer
pub mod models;
pub mod repository;
pub mod routes;

pub use models::{Post, User};
pub use repository::{user_repository, UserRepository};

/// 注册user模块的路由
pub fn register_user_routes() {
    crate::register_route!(
        "users",
        "用户资源 CRUD 与查询字符串过滤",
        "user",
        routes::configure_user_routes
    );
}
