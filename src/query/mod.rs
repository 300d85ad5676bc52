pub mod collection;
pub mod error;
pub mod plan;
pub mod sql;
pub mod translate;
pub mod types;

pub use collection::{Collection, Field, FieldType};
pub use error::QueryError;
pub use plan::QueryPlan;
pub use types::*;
