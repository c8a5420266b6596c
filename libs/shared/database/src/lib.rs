pub mod error;
pub mod sqlite;

pub use error::DatabaseError;
pub use sqlite::{bootstrap_schema, connect, connect_with_url};
