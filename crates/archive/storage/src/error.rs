use thiserror::Error;

/// Errors that may occur while reading from the archive collaborators.
///
/// This enum is used across all implementations of the storage traits.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The archive database returned an error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Reading a backing file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A line of the exclusion log could not be parsed.
    #[error("malformed exclusion record at line {line}: {reason}")]
    MalformedRecord {
        /// 1-based line number of the offending record.
        line: u64,
        /// What was wrong with the record.
        reason: String,
    },

    /// A row returned by the archive violates the expected shape.
    #[error("invalid archive row: {0}")]
    InvalidRow(String),
}
