//! Error types.
//!
//! Every error here is a configuration error raised synchronously by a
//! constructor or a collection mutation. Structural events that reference an
//! unknown column are not errors: the row logs and ignores them.

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("'{0}' is required")]
    MissingOption(&'static str),

    #[error("column name must not be empty")]
    EmptyColumnName,

    #[error("duplicate column: {0}")]
    DuplicateColumn(String),

    #[error("no column named {0}")]
    UnknownColumn(String),

    #[error("index {index} out of bounds for {len} columns")]
    IndexOutOfBounds { index: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, GridError>;
