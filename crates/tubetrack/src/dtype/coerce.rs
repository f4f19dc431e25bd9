//! Lossless-or-rejecting type coercion over columns and tables.

use indexmap::IndexMap;

use crate::error::{Result, TubeTrackError};
use crate::frame::{Cell, Column, Table};

use super::classify::classify;
use super::convert::convert;
use super::parse::{parse_datetime, parse_duration};
use super::types::SemanticType;

/// Coerce a column to the target semantic type.
///
/// The input is never mutated; the result is always a fresh column with
/// missing markers propagated unchanged. A single element that cannot be
/// converted losslessly fails the whole call with no partial result.
pub fn coerce(column: &Column, target: SemanticType) -> Result<Column> {
    // Reinterpreting storage as opaque always succeeds.
    if target == SemanticType::Generic {
        return Ok(column.clone());
    }
    // Nothing to convert: only missing markers.
    if column.all_null() {
        return Ok(column.clone());
    }

    let source = classify(column)?;
    if source == target {
        return Ok(column.clone());
    }
    // Textual temporal data goes through the flexible parsers for
    // locale/format tolerance, not the per-element table.
    if source == SemanticType::String && target.is_temporal() {
        return coerce_text_temporal(column, target);
    }
    if source == SemanticType::Generic {
        return Err(TubeTrackError::GenericCoercion { target });
    }

    let mut cells = Vec::with_capacity(column.len());
    for cell in column.iter() {
        match convert(source, cell, target) {
            Ok(converted) => cells.push(converted),
            Err(_) => return Err(lossy(column, target)),
        }
    }
    Ok(Column::from(cells))
}

/// Batch form: coerce each named column independently. Result columns follow
/// the order of the type map; the first failing column aborts the batch.
pub fn coerce_table(table: &Table, types: &IndexMap<String, SemanticType>) -> Result<Table> {
    let mut result = Table::new();
    for (name, &target) in types {
        let Some(column) = table.column(name) else {
            return Err(TubeTrackError::SchemaMismatch {
                context: format!("(missing columns: {{'{name}'}})"),
            });
        };
        let coerced = match coerce(column, target) {
            Ok(coerced) => coerced,
            Err(TubeTrackError::LossyConversion { target, head, .. }) => {
                return Err(TubeTrackError::LossyConversion {
                    column: Some(name.clone()),
                    target,
                    head,
                });
            }
            Err(other) => return Err(other),
        };
        result.insert(name.clone(), coerced)?;
    }
    Ok(result)
}

/// Rewrite a column into the canonical physical storage of its own
/// classified type (whole floats become ints, parseable text in mixed
/// datetime columns becomes datetime cells, and so on).
pub(crate) fn canonicalize(column: &Column) -> Result<Column> {
    let source = classify(column)?;
    if source == SemanticType::Generic {
        return Ok(column.clone());
    }
    let mut cells = Vec::with_capacity(column.len());
    for cell in column.iter() {
        match convert(source, cell, source) {
            Ok(converted) => cells.push(converted),
            Err(_) => return Err(lossy(column, source)),
        }
    }
    Ok(Column::from(cells))
}

fn coerce_text_temporal(column: &Column, target: SemanticType) -> Result<Column> {
    let mut cells = Vec::with_capacity(column.len());
    for cell in column.iter() {
        let converted = match cell {
            cell if cell.is_null() => Some(Cell::Null),
            Cell::Str(s) if target == SemanticType::DateTime => {
                parse_datetime(s).map(Cell::DateTime)
            }
            Cell::Str(s) => parse_duration(s).map(Cell::Duration),
            _ => None,
        };
        match converted {
            Some(converted) => cells.push(converted),
            None => return Err(lossy(column, target)),
        }
    }
    Ok(Column::from(cells))
}

fn lossy(column: &Column, target: SemanticType) -> TubeTrackError {
    TubeTrackError::LossyConversion {
        column: None,
        target,
        head: column.head(),
    }
}
