pub mod error;
pub mod migrations;
pub mod pool;
pub mod types;

pub use error::DbError;
pub use pool::DbPool;
pub use types::DbValue;
