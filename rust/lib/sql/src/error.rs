use thiserror::Error;

/// Driver-level failure. Callers map these onto service errors.
#[derive(Error, Debug)]
pub enum SQLError {
    /// Preparing or running a query failed.
    #[error("query error: {0}")]
    Query(String),

    /// A statement (or the commit) failed.
    #[error("execution error: {0}")]
    Execution(String),

    /// The database file could not be opened or configured.
    #[error("connection error: {0}")]
    Connection(String),
}
