pub mod error;
#[path = "bootstrap/app_bootstrap.rs"]
pub mod app_bootstrap;
#[path = "bootstrap/command_registry.rs"]
pub mod command_registry;
#[path = "bootstrap/route_registry.rs"]
pub mod route_registry;

// Modules
pub mod modules;
pub mod schema;

/// 初始化所有模块的路由
pub fn init_routes() {
    modules::user::register_user_routes();
    modules::health::register_health_routes();
}

// Re-export bootstrap modules
pub use app_bootstrap::*;
pub use command_registry::*;
pub use route_registry::*;
