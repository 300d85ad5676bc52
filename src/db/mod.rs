pub mod collection;
pub mod models;
pub mod pool;
pub mod repository;

pub use pool::{health_check, pool, DbError};
pub use repository::Repository;
