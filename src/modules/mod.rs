/// 业务模块
pub mod health;
pub mod user;
