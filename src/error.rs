use thiserror::Error;

/// Error type for crudrs operations
#[derive(Debug, Error)]
pub enum CrudRsError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Expected {expected} row(s), got {actual}")]
    UnexpectedRowCount { expected: usize, actual: usize },

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Cannot convert {found} into {expected}")]
    ValueConversion {
        expected: &'static str,
        found: String,
    },

    #[error("{operation} requires {entity} to have a key field (an explicit key or a field named Id)")]
    NoKey {
        entity: String,
        operation: &'static str,
    },

    #[error("{operation} only supports {entity} with a single key field, found {count}")]
    MultipleKeys {
        entity: String,
        operation: &'static str,
        count: usize,
    },

    #[error("Key field {field} is missing from the supplied id")]
    MissingKeyValue { field: String },

    #[error("Unsupported key type {kind} for {entity}: only integer, uuid and text keys can be inserted")]
    UnsupportedKeyType { entity: String, kind: String },

    #[error("Cannot return the {key} key of {entity} as {requested}")]
    KeyTypeMismatch {
        entity: String,
        key: String,
        requested: String,
    },

    #[error("{entity} has no updatable fields")]
    NoUpdatableFields { entity: String },

    #[error("Field {field} does not exist on {entity}")]
    UnknownField { entity: String, field: String },

    #[error("DeleteList requires a where clause: {0}")]
    MissingWhereClause(&'static str),

    #[error("Paged queries are not supported by the {dialect} dialect")]
    PagingNotSupported { dialect: String },

    #[error("Page number must be greater than 0, got {0}")]
    InvalidPageNumber(u32),

    #[error("Upsert is not supported by the {dialect} dialect")]
    UpsertNotSupported { dialect: String },

    #[error("Unknown dialect: {0}")]
    UnknownDialect(String),

    #[error("Mapping already registered: {0}")]
    DuplicateMapping(String),
}

/// Result type alias for crudrs operations
pub type Result<T> = std::result::Result<T, CrudRsError>;
