use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Invalid database URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Failed to open database pool: {0}")]
    Connection(#[source] sqlx::Error),

    #[error("Schema bootstrap failed: {0}")]
    Schema(#[source] sqlx::Error),
}
