//! Error types for the tubetrack library.

use std::path::PathBuf;
use thiserror::Error;

use crate::dtype::SemanticType;

/// Main error type for tubetrack operations.
#[derive(Debug, Error)]
pub enum TubeTrackError {
    /// A value or column does not match the semantic type expected at a
    /// validation boundary.
    #[error("column '{column}' must contain {expected} data (classified as: {actual})")]
    TypeMismatch {
        column: String,
        expected: String,
        actual: SemanticType,
    },

    /// A coercion was requested that cannot preserve value identity.
    #[error(
        "cannot coerce column{col} values to {target} without losing information (head: [{preview}])",
        col = .column.as_deref().map(|c| format!(" '{c}'")).unwrap_or_default(),
        preview = .head.join(", ")
    )]
    LossyConversion {
        /// Name of the failing column in a batch coercion, if any.
        column: Option<String>,
        target: SemanticType,
        /// Preview of the first few cells of the offending column.
        head: Vec<String>,
    },

    /// A generic-typed column was asked to convert to a concrete type.
    #[error("cannot coerce generic column values to {target}; coerce through a concrete type first")]
    GenericCoercion { target: SemanticType },

    /// A table's column set does not match the expected schema.
    #[error("table columns do not match expected {context}")]
    SchemaMismatch {
        /// Pre-rendered description of the missing/extra column names.
        context: String,
    },

    /// An appended `(video_id, timestamp)` pair already exists.
    #[error("duplicate row (video_id: '{video_id}', timestamp: {timestamp})")]
    DuplicateKey {
        video_id: String,
        timestamp: String,
    },

    /// A scalar is outside its permitted domain.
    #[error("`{field}` must be {constraint} (received: {value})")]
    RangeViolation {
        field: String,
        constraint: String,
        value: String,
    },

    /// Classification exhausted every candidate semantic type. Indicates an
    /// internal invariant violation, not a user error.
    #[error("could not classify column storage (cells: [{preview}])", preview = .head.join(", "))]
    UnclassifiableColumn { head: Vec<String> },

    /// A required column contains missing values.
    #[error("column '{column}' cannot contain missing values")]
    MissingValues { column: String },

    /// A column name was inserted twice into the same table.
    #[error("duplicate column name: '{name}'")]
    DuplicateColumn { name: String },

    /// A column's length disagrees with the rest of the table.
    #[error("column '{name}' has {actual} rows, expected {expected}")]
    ColumnLength {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Record save/load error.
    #[error("Persistence error: {0}")]
    Persistence(String),
}

/// Result type alias for tubetrack operations.
pub type Result<T> = std::result::Result<T, TubeTrackError>;
