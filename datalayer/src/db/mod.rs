pub mod connection;
pub mod dialect;
pub mod error;
pub mod model;
pub mod query;
pub mod value;
