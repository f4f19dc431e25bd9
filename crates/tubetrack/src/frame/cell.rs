//! Single tabular values and their physical storage kinds.

use std::fmt;

use chrono::{DateTime, Duration as TimeDelta, FixedOffset};
use num_complex::Complex64;

/// One cell of a column: a typed value or the missing-value marker.
#[derive(Debug, Clone)]
pub enum Cell {
    /// Missing value.
    Null,
    /// Whole number.
    Int(i64),
    /// Floating-point number. A NaN payload counts as missing.
    Float(f64),
    /// Complex number.
    Complex(Complex64),
    /// Text value.
    Str(String),
    /// Boolean value.
    Bool(bool),
    /// Timezone-aware point in time.
    DateTime(DateTime<FixedOffset>),
    /// Time interval.
    Duration(TimeDelta),
}

/// Physical storage kind of a non-missing cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    Int,
    Float,
    Complex,
    Str,
    Bool,
    DateTime,
    Duration,
}

impl Cell {
    /// Returns true if this cell is a missing-value marker.
    ///
    /// Float NaN follows the missing-marker convention of float-backed
    /// storage and is treated as missing everywhere.
    pub fn is_null(&self) -> bool {
        match self {
            Cell::Null => true,
            Cell::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// The storage kind of this cell, or None for missing values.
    pub fn kind(&self) -> Option<CellKind> {
        if self.is_null() {
            return None;
        }
        Some(match self {
            Cell::Int(_) => CellKind::Int,
            Cell::Float(_) => CellKind::Float,
            Cell::Complex(_) => CellKind::Complex,
            Cell::Str(_) => CellKind::Str,
            Cell::Bool(_) => CellKind::Bool,
            Cell::DateTime(_) => CellKind::DateTime,
            Cell::Duration(_) => CellKind::Duration,
            Cell::Null => unreachable!(),
        })
    }

    /// Numeric value of this cell, if it is numeric.
    pub fn as_complex(&self) -> Option<Complex64> {
        match self {
            Cell::Int(i) => Some(Complex64::new(*i as f64, 0.0)),
            Cell::Float(f) if !f.is_nan() => Some(Complex64::new(*f, 0.0)),
            Cell::Complex(c) => Some(*c),
            _ => None,
        }
    }

    /// Rendering used in error-message previews: strings are quoted, missing
    /// values print as NA.
    pub fn preview(&self) -> String {
        match self {
            Cell::Str(s) => format!("'{s}'"),
            other if other.is_null() => "NA".to_string(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Cell {
    /// Canonical textual form, as produced by coercion to the string type.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => write!(f, "NA"),
            Cell::Int(i) => write!(f, "{i}"),
            // {:?} keeps the decimal point on whole floats
            Cell::Float(v) => write!(f, "{v:?}"),
            Cell::Complex(c) => write!(f, "{c}"),
            Cell::Str(s) => write!(f, "{s}"),
            Cell::Bool(b) => write!(f, "{b}"),
            Cell::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
            Cell::Duration(td) => write!(f, "{}", format_duration(*td)),
        }
    }
}

impl PartialEq for Cell {
    /// Value equality. Numeric variants compare by value across storage
    /// kinds, so `Int(1) == Float(1.0) == Complex(1+0i)`. Missing markers
    /// compare equal to each other regardless of representation.
    fn eq(&self, other: &Self) -> bool {
        if self.is_null() || other.is_null() {
            return self.is_null() && other.is_null();
        }
        if let (Some(a), Some(b)) = (self.as_complex(), other.as_complex()) {
            return a == b;
        }
        match (self, other) {
            (Cell::Str(a), Cell::Str(b)) => a == b,
            (Cell::Bool(a), Cell::Bool(b)) => a == b,
            (Cell::DateTime(a), Cell::DateTime(b)) => a == b,
            (Cell::Duration(a), Cell::Duration(b)) => a == b,
            _ => false,
        }
    }
}

/// Format a time interval as `[Nd ]HH:MM:SS[.ffffff]`.
///
/// The output is accepted back by the duration text parser.
pub(crate) fn format_duration(td: TimeDelta) -> String {
    let neg = td < TimeDelta::zero();
    let td = if neg { -td } else { td };

    let total_secs = td.num_seconds();
    let micros = (td - TimeDelta::seconds(total_secs))
        .num_microseconds()
        .unwrap_or(0);
    let days = total_secs / 86_400;
    let hours = (total_secs % 86_400) / 3_600;
    let minutes = (total_secs % 3_600) / 60;
    let seconds = total_secs % 60;

    let mut out = String::new();
    if neg {
        out.push('-');
    }
    if days > 0 {
        out.push_str(&format!("{days}d "));
    }
    out.push_str(&format!("{hours:02}:{minutes:02}:{seconds:02}"));
    if micros > 0 {
        out.push_str(&format!(".{micros:06}"));
    }
    out
}
