//! The closed set of semantic types used for classification and coercion.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Semantic type of a column, independent of its physical storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    /// Whole numbers.
    Integer,
    /// Floating-point numbers.
    Float,
    /// Complex numbers.
    Complex,
    /// Text values.
    String,
    /// Boolean values.
    Boolean,
    /// Timezone-aware points in time.
    DateTime,
    /// Time intervals.
    Duration,
    /// Opaque/unclassified storage, including all-missing columns.
    Generic,
}

impl SemanticType {
    /// Returns true if this type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            SemanticType::Integer | SemanticType::Float | SemanticType::Complex
        )
    }

    /// Returns true if this type is temporal.
    pub fn is_temporal(&self) -> bool {
        matches!(self, SemanticType::DateTime | SemanticType::Duration)
    }

    /// Classification priority order: the narrowest lossless type wins.
    pub(crate) const CANDIDATES: [SemanticType; 8] = [
        SemanticType::Integer,
        SemanticType::Float,
        SemanticType::Complex,
        SemanticType::String,
        SemanticType::Boolean,
        SemanticType::DateTime,
        SemanticType::Duration,
        SemanticType::Generic,
    ];
}

impl Default for SemanticType {
    fn default() -> Self {
        SemanticType::Generic
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SemanticType::Integer => "integer",
            SemanticType::Float => "float",
            SemanticType::Complex => "complex",
            SemanticType::String => "string",
            SemanticType::Boolean => "boolean",
            SemanticType::DateTime => "datetime",
            SemanticType::Duration => "duration",
            SemanticType::Generic => "generic",
        };
        write!(f, "{name}")
    }
}
