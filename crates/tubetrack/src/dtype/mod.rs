//! Semantic type classification and lossless-or-rejecting coercion.

mod classify;
mod coerce;
mod convert;
mod parse;
mod types;

pub use classify::{classify, classify_table, columns_of_type, is_type};
pub use coerce::{coerce, coerce_table};
pub use parse::{
    parse_bool, parse_complex, parse_datetime, parse_duration, TextParser, TextParserConfig,
};
pub(crate) use parse::{duration_from_secs, total_seconds};
pub use types::SemanticType;

use indexmap::IndexMap;

use crate::error::Result;
use crate::frame::Table;

/// Stateless façade applying classification and coercion across all columns
/// of a table.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeEngine;

impl TypeEngine {
    /// Create a new engine.
    pub fn new() -> Self {
        Self
    }

    /// Classify every column, in column order.
    pub fn infer(&self, table: &Table) -> Result<IndexMap<String, SemanticType>> {
        classify_table(table)
    }

    /// Schema-conformance check: every named column's classified type must
    /// equal the declared type. An all-missing column conforms to any
    /// declared type (there are no values to contradict it), so this answers
    /// "would coercion succeed", not "is already this type".
    pub fn matches(&self, table: &Table, expected: &IndexMap<String, SemanticType>) -> Result<bool> {
        for (name, declared) in expected {
            let Some(column) = table.column(name) else {
                return Ok(false);
            };
            if column.all_null() {
                continue;
            }
            if classify(column)? != *declared {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Canonicalization pass: infer each column's type, then rewrite its
    /// storage into the narrowest matching concrete representation.
    pub fn normalize(&self, table: &Table) -> Result<Table> {
        let mut result = Table::new();
        for (name, column) in table.iter() {
            result.insert(name.clone(), coerce::canonicalize(column)?)?;
        }
        Ok(result)
    }
}
