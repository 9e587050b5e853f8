pub mod error;
pub mod pagination;
pub mod query;
pub mod response;

pub use error::*;
pub use pagination::*;
pub use query::*;
pub use response::*;
