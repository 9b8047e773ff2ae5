use thiserror::Error;

#[derive(Error, Debug)]
pub enum WarehouseError {
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    #[error("Query error: {0}")]
    QueryError(String),
}
