//! Column classification into the closed semantic-type set.
//!
//! Classification is an ordered list of predicates evaluated top-down with
//! short-circuit; the narrowest lossless type wins. Missing markers never
//! participate in a type test.

use indexmap::IndexMap;

use crate::error::{Result, TubeTrackError};
use crate::frame::{Cell, CellKind, Column, Storage, Table};

use super::parse::parse_datetime;
use super::types::SemanticType;

/// Classify a column as exactly one semantic type.
///
/// Exhausting every candidate indicates malformed storage and fails fast
/// with `UnclassifiableColumn`; well-formed columns always match one.
pub fn classify(column: &Column) -> Result<SemanticType> {
    for candidate in SemanticType::CANDIDATES {
        if is_type(column, candidate) {
            return Ok(candidate);
        }
    }
    Err(TubeTrackError::UnclassifiableColumn {
        head: column.head(),
    })
}

/// Membership test: does this column classify as `candidate`?
///
/// Implemented directly as a predicate rather than through `classify`. The
/// generic predicate answers false for mixed-storage columns whose values all
/// parse as datetimes; those belong to the datetime type.
pub fn is_type(column: &Column, candidate: SemanticType) -> bool {
    match candidate {
        SemanticType::Integer => all_numeric(column) && all_real(column) && all_whole(column),
        SemanticType::Float => all_numeric(column) && all_real(column) && !all_whole(column),
        SemanticType::Complex => all_numeric(column) && !all_real(column),
        SemanticType::String => column.storage() == Storage::Uniform(CellKind::Str),
        SemanticType::Boolean => column.storage() == Storage::Uniform(CellKind::Bool),
        SemanticType::DateTime => match column.storage() {
            Storage::Uniform(CellKind::DateTime) => true,
            Storage::Mixed => datetime_reclassifiable(column),
            _ => false,
        },
        SemanticType::Duration => column.storage() == Storage::Uniform(CellKind::Duration),
        SemanticType::Generic => match column.storage() {
            Storage::Empty => true,
            Storage::Mixed => !all_numeric(column) && !datetime_reclassifiable(column),
            Storage::Uniform(_) => false,
        },
    }
}

/// Batch form: classify every column, in column order.
pub fn classify_table(table: &Table) -> Result<IndexMap<String, SemanticType>> {
    let mut types = IndexMap::new();
    for (name, column) in table.iter() {
        types.insert(name.clone(), classify(column)?);
    }
    Ok(types)
}

/// Batch membership form: names of the columns matching `candidate`, in
/// column order.
pub fn columns_of_type(table: &Table, candidate: SemanticType) -> Vec<&str> {
    table
        .iter()
        .filter(|(_, column)| is_type(column, candidate))
        .map(|(name, _)| name.as_str())
        .collect()
}

/// True if the column has values and every one of them is numeric.
fn all_numeric(column: &Column) -> bool {
    let mut any = false;
    for cell in column.non_null() {
        if cell.as_complex().is_none() {
            return false;
        }
        any = true;
    }
    any
}

/// True if every numeric value has a zero imaginary part.
fn all_real(column: &Column) -> bool {
    column
        .non_null()
        .filter_map(|c| c.as_complex())
        .all(|c| c.im == 0.0)
}

/// True if every numeric value is real and integral.
fn all_whole(column: &Column) -> bool {
    column
        .non_null()
        .filter_map(|c| c.as_complex())
        .all(|c| c.im == 0.0 && c.re.fract() == 0.0)
}

/// True for mixed-storage columns whose every value is a datetime or a
/// datetime-parseable string.
fn datetime_reclassifiable(column: &Column) -> bool {
    column.non_null().all(|cell| match cell {
        Cell::DateTime(_) => true,
        Cell::Str(s) => parse_datetime(s).is_some(),
        _ => false,
    })
}
