//! The fixed conversion table between semantic types.
//!
//! Every (source, target) pair over the seven concrete semantic types maps to
//! a pure per-element conversion. Each conversion either produces a value in
//! the target representation or signals that information would be lost;
//! nothing is ever silently truncated.

use chrono::{DateTime, Duration as TimeDelta, FixedOffset};
use num_complex::Complex64;

use crate::frame::{format_duration, Cell};

use super::parse::{
    datetime_from_unix, duration_from_secs, parse_bool, parse_complex, parse_datetime,
    parse_duration, total_seconds, unix_seconds,
};
use super::types::SemanticType;

/// Marker for a conversion that cannot preserve the value exactly.
pub(crate) struct Lossy;

pub(crate) type ConversionResult = Result<Cell, Lossy>;

/// Convert one cell from its classified source type to the target type.
///
/// Missing markers pass through untouched. The cell's physical storage may be
/// wider than `source` (a classified-integer column can hold whole floats);
/// the value is first canonicalized to `source`, then converted.
pub(crate) fn convert(source: SemanticType, cell: &Cell, target: SemanticType) -> ConversionResult {
    if cell.is_null() {
        return Ok(Cell::Null);
    }
    match source {
        SemanticType::Integer => from_integer(int_value(cell)?, target),
        SemanticType::Float => from_float(float_value(cell)?, target),
        SemanticType::Complex => from_complex(complex_value(cell)?, target),
        SemanticType::String => from_string(str_value(cell)?, target),
        SemanticType::Boolean => from_boolean(bool_value(cell)?, target),
        SemanticType::DateTime => from_datetime(datetime_value(cell)?, target),
        SemanticType::Duration => from_duration(duration_value(cell)?, target),
        // Generic sources are rejected before per-element dispatch.
        SemanticType::Generic => Err(Lossy),
    }
}

// Canonicalizing extractors. Classification guarantees these succeed for
// well-formed columns; a mismatch surfaces as a lossy failure.

fn int_value(cell: &Cell) -> Result<i64, Lossy> {
    let c = cell.as_complex().ok_or(Lossy)?;
    if c.im == 0.0 && c.re.fract() == 0.0 && in_i64_range(c.re) {
        Ok(c.re as i64)
    } else {
        Err(Lossy)
    }
}

fn float_value(cell: &Cell) -> Result<f64, Lossy> {
    let c = cell.as_complex().ok_or(Lossy)?;
    if c.im == 0.0 { Ok(c.re) } else { Err(Lossy) }
}

fn complex_value(cell: &Cell) -> Result<Complex64, Lossy> {
    cell.as_complex().ok_or(Lossy)
}

fn str_value(cell: &Cell) -> Result<&str, Lossy> {
    match cell {
        Cell::Str(s) => Ok(s),
        _ => Err(Lossy),
    }
}

fn bool_value(cell: &Cell) -> Result<bool, Lossy> {
    match cell {
        Cell::Bool(b) => Ok(*b),
        _ => Err(Lossy),
    }
}

fn datetime_value(cell: &Cell) -> Result<DateTime<FixedOffset>, Lossy> {
    match cell {
        Cell::DateTime(dt) => Ok(*dt),
        // Mixed-storage columns reclassified as datetime hold parseable text.
        Cell::Str(s) => parse_datetime(s).ok_or(Lossy),
        _ => Err(Lossy),
    }
}

fn duration_value(cell: &Cell) -> Result<TimeDelta, Lossy> {
    match cell {
        Cell::Duration(td) => Ok(*td),
        _ => Err(Lossy),
    }
}

fn in_i64_range(value: f64) -> bool {
    value >= i64::MIN as f64 && value <= i64::MAX as f64
}

// Per-source conversion rows.

fn from_integer(i: i64, target: SemanticType) -> ConversionResult {
    match target {
        SemanticType::Integer | SemanticType::Generic => Ok(Cell::Int(i)),
        SemanticType::Float => Ok(Cell::Float(i as f64)),
        SemanticType::Complex => Ok(Cell::Complex(Complex64::new(i as f64, 0.0))),
        SemanticType::String => Ok(Cell::Str(i.to_string())),
        SemanticType::Boolean => match i {
            0 => Ok(Cell::Bool(false)),
            1 => Ok(Cell::Bool(true)),
            _ => Err(Lossy),
        },
        SemanticType::DateTime => DateTime::from_timestamp(i, 0)
            .map(|dt| Cell::DateTime(dt.fixed_offset()))
            .ok_or(Lossy),
        SemanticType::Duration => TimeDelta::try_seconds(i).map(Cell::Duration).ok_or(Lossy),
    }
}

fn from_float(f: f64, target: SemanticType) -> ConversionResult {
    match target {
        SemanticType::Integer => {
            if f.fract() == 0.0 && in_i64_range(f) {
                Ok(Cell::Int(f as i64))
            } else {
                Err(Lossy)
            }
        }
        SemanticType::Float | SemanticType::Generic => Ok(Cell::Float(f)),
        SemanticType::Complex => Ok(Cell::Complex(Complex64::new(f, 0.0))),
        SemanticType::String => Ok(Cell::Str(format!("{f:?}"))),
        SemanticType::Boolean => {
            if f == 0.0 {
                Ok(Cell::Bool(false))
            } else if f == 1.0 {
                Ok(Cell::Bool(true))
            } else {
                Err(Lossy)
            }
        }
        SemanticType::DateTime => datetime_from_unix(f).map(Cell::DateTime).ok_or(Lossy),
        SemanticType::Duration => duration_from_secs(f).map(Cell::Duration).ok_or(Lossy),
    }
}

fn from_complex(c: Complex64, target: SemanticType) -> ConversionResult {
    match target {
        SemanticType::Integer => {
            if c.im == 0.0 && c.re.fract() == 0.0 && in_i64_range(c.re) {
                Ok(Cell::Int(c.re as i64))
            } else {
                Err(Lossy)
            }
        }
        SemanticType::Float => {
            if c.im == 0.0 {
                Ok(Cell::Float(c.re))
            } else {
                Err(Lossy)
            }
        }
        SemanticType::Complex | SemanticType::Generic => Ok(Cell::Complex(c)),
        SemanticType::String => Ok(Cell::Str(c.to_string())),
        SemanticType::Boolean => {
            if c.im != 0.0 {
                Err(Lossy)
            } else if c.re == 0.0 {
                Ok(Cell::Bool(false))
            } else if c.re == 1.0 {
                Ok(Cell::Bool(true))
            } else {
                Err(Lossy)
            }
        }
        SemanticType::DateTime => {
            if c.im == 0.0 {
                datetime_from_unix(c.re).map(Cell::DateTime).ok_or(Lossy)
            } else {
                Err(Lossy)
            }
        }
        SemanticType::Duration => {
            if c.im == 0.0 {
                duration_from_secs(c.re).map(Cell::Duration).ok_or(Lossy)
            } else {
                Err(Lossy)
            }
        }
    }
}

fn from_string(s: &str, target: SemanticType) -> ConversionResult {
    let trimmed = s.trim();
    match target {
        SemanticType::Integer => trimmed.parse().map(Cell::Int).map_err(|_| Lossy),
        SemanticType::Float => trimmed.parse().map(Cell::Float).map_err(|_| Lossy),
        SemanticType::Complex => parse_complex(trimmed).map(Cell::Complex).ok_or(Lossy),
        SemanticType::String | SemanticType::Generic => Ok(Cell::Str(s.to_string())),
        SemanticType::Boolean => parse_bool(trimmed).map(Cell::Bool).ok_or(Lossy),
        SemanticType::DateTime => parse_datetime(trimmed).map(Cell::DateTime).ok_or(Lossy),
        SemanticType::Duration => parse_duration(trimmed).map(Cell::Duration).ok_or(Lossy),
    }
}

fn from_boolean(b: bool, target: SemanticType) -> ConversionResult {
    match target {
        SemanticType::Integer => Ok(Cell::Int(b as i64)),
        SemanticType::Float => Ok(Cell::Float(b as i64 as f64)),
        SemanticType::Complex => Ok(Cell::Complex(Complex64::new(b as i64 as f64, 0.0))),
        SemanticType::String => Ok(Cell::Str(b.to_string())),
        SemanticType::Boolean | SemanticType::Generic => Ok(Cell::Bool(b)),
        SemanticType::DateTime => DateTime::from_timestamp(b as i64, 0)
            .map(|dt| Cell::DateTime(dt.fixed_offset()))
            .ok_or(Lossy),
        SemanticType::Duration => Ok(Cell::Duration(TimeDelta::seconds(b as i64))),
    }
}

fn from_datetime(dt: DateTime<FixedOffset>, target: SemanticType) -> ConversionResult {
    match target {
        SemanticType::Integer => {
            if dt.timestamp_subsec_nanos() == 0 {
                Ok(Cell::Int(dt.timestamp()))
            } else {
                Err(Lossy)
            }
        }
        SemanticType::Float => Ok(Cell::Float(unix_seconds(&dt))),
        SemanticType::Complex => Ok(Cell::Complex(Complex64::new(unix_seconds(&dt), 0.0))),
        SemanticType::String => Ok(Cell::Str(dt.to_rfc3339())),
        SemanticType::Boolean => {
            // Lossless only for the Unix timestamps that are exactly a
            // boolean: 0 and 1.
            match unix_seconds(&dt) {
                ts if ts == 0.0 => Ok(Cell::Bool(false)),
                ts if ts == 1.0 => Ok(Cell::Bool(true)),
                _ => Err(Lossy),
            }
        }
        SemanticType::DateTime | SemanticType::Generic => Ok(Cell::DateTime(dt)),
        SemanticType::Duration => duration_from_secs(unix_seconds(&dt))
            .map(Cell::Duration)
            .ok_or(Lossy),
    }
}

fn from_duration(td: TimeDelta, target: SemanticType) -> ConversionResult {
    let secs = total_seconds(&td);
    match target {
        SemanticType::Integer => {
            if td == TimeDelta::seconds(td.num_seconds()) {
                Ok(Cell::Int(td.num_seconds()))
            } else {
                Err(Lossy)
            }
        }
        SemanticType::Float => Ok(Cell::Float(secs)),
        SemanticType::Complex => Ok(Cell::Complex(Complex64::new(secs, 0.0))),
        SemanticType::String => Ok(Cell::Str(format_duration(td))),
        SemanticType::Boolean => {
            if secs == 0.0 {
                Ok(Cell::Bool(false))
            } else if secs == 1.0 {
                Ok(Cell::Bool(true))
            } else {
                Err(Lossy)
            }
        }
        SemanticType::DateTime => datetime_from_unix(secs).map(Cell::DateTime).ok_or(Lossy),
        SemanticType::Duration | SemanticType::Generic => Ok(Cell::Duration(td)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conv(source: SemanticType, cell: Cell, target: SemanticType) -> Option<Cell> {
        convert(source, &cell, target).ok()
    }

    #[test]
    fn test_null_passes_through_every_pair() {
        for source in SemanticType::CANDIDATES {
            for target in SemanticType::CANDIDATES {
                if source == SemanticType::Generic {
                    continue;
                }
                let result = convert(source, &Cell::Null, target);
                assert_eq!(result.ok(), Some(Cell::Null));
            }
        }
    }

    #[test]
    fn test_integer_row() {
        use SemanticType::*;
        assert_eq!(conv(Integer, Cell::Int(2), Float), Some(Cell::Float(2.0)));
        assert_eq!(
            conv(Integer, Cell::Int(2), Complex),
            Some(Cell::Complex(Complex64::new(2.0, 0.0)))
        );
        assert_eq!(
            conv(Integer, Cell::Int(-3), String),
            Some(Cell::Str("-3".into()))
        );
        assert_eq!(conv(Integer, Cell::Int(1), Boolean), Some(Cell::Bool(true)));
        assert!(convert(Integer, &Cell::Int(2), Boolean).is_err());
        assert_eq!(
            conv(Integer, Cell::Int(60), Duration),
            Some(Cell::Duration(TimeDelta::seconds(60)))
        );
        let dt = conv(Integer, Cell::Int(0), DateTime).unwrap();
        assert_eq!(dt.to_string(), "1970-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_integer_row_accepts_whole_float_storage() {
        // A classified-integer column may physically hold whole floats.
        assert_eq!(
            conv(SemanticType::Integer, Cell::Float(4.0), SemanticType::String),
            Some(Cell::Str("4".into()))
        );
    }

    #[test]
    fn test_float_row() {
        use SemanticType::*;
        assert_eq!(conv(Float, Cell::Float(2.0), Integer), Some(Cell::Int(2)));
        assert!(convert(Float, &Cell::Float(2.5), Integer).is_err());
        assert_eq!(
            conv(Float, Cell::Float(1.5), String),
            Some(Cell::Str("1.5".into()))
        );
        assert_eq!(
            conv(Float, Cell::Float(1.0), String),
            Some(Cell::Str("1.0".into()))
        );
        assert_eq!(conv(Float, Cell::Float(0.0), Boolean), Some(Cell::Bool(false)));
        assert!(convert(Float, &Cell::Float(0.5), Boolean).is_err());
        assert_eq!(
            conv(Float, Cell::Float(1.5), Duration),
            Some(Cell::Duration(TimeDelta::milliseconds(1_500)))
        );
    }

    #[test]
    fn test_complex_row() {
        use SemanticType::*;
        let real_whole = Cell::Complex(Complex64::new(3.0, 0.0));
        let real_frac = Cell::Complex(Complex64::new(3.5, 0.0));
        let imaginary = Cell::Complex(Complex64::new(1.0, 1.0));

        assert_eq!(conv(Complex, real_whole.clone(), Integer), Some(Cell::Int(3)));
        assert!(convert(Complex, &real_frac, Integer).is_err());
        assert_eq!(conv(Complex, real_frac.clone(), Float), Some(Cell::Float(3.5)));
        assert!(convert(Complex, &imaginary, Float).is_err());
        assert!(convert(Complex, &imaginary, DateTime).is_err());
        assert!(convert(Complex, &imaginary, Duration).is_err());
        assert_eq!(
            conv(Complex, imaginary, String),
            Some(Cell::Str("1+1i".into()))
        );
    }

    #[test]
    fn test_string_row() {
        use SemanticType::*;
        assert_eq!(conv(String, Cell::Str(" 42 ".into()), Integer), Some(Cell::Int(42)));
        assert!(convert(String, &Cell::Str("4.5".into()), Integer).is_err());
        assert_eq!(conv(String, Cell::Str("4.5".into()), Float), Some(Cell::Float(4.5)));
        assert_eq!(
            conv(String, Cell::Str("(1+2j)".into()), Complex),
            Some(Cell::Complex(Complex64::new(1.0, 2.0)))
        );
        assert_eq!(conv(String, Cell::Str("True".into()), Boolean), Some(Cell::Bool(true)));
        assert_eq!(conv(String, Cell::Str("f".into()), Boolean), Some(Cell::Bool(false)));
        assert!(convert(String, &Cell::Str("yes".into()), Boolean).is_err());
        assert!(convert(String, &Cell::Str("abc".into()), Integer).is_err());
    }

    #[test]
    fn test_boolean_row() {
        use SemanticType::*;
        assert_eq!(conv(Boolean, Cell::Bool(true), Integer), Some(Cell::Int(1)));
        assert_eq!(conv(Boolean, Cell::Bool(false), Float), Some(Cell::Float(0.0)));
        assert_eq!(
            conv(Boolean, Cell::Bool(true), String),
            Some(Cell::Str("true".into()))
        );
        assert_eq!(
            conv(Boolean, Cell::Bool(true), Duration),
            Some(Cell::Duration(TimeDelta::seconds(1)))
        );
    }

    #[test]
    fn test_datetime_row() {
        use SemanticType::*;
        let whole = Cell::DateTime(datetime_from_unix(10.0).unwrap());
        let fractional = Cell::DateTime(datetime_from_unix(10.5).unwrap());
        let epoch = Cell::DateTime(datetime_from_unix(0.0).unwrap());

        assert_eq!(conv(DateTime, whole.clone(), Integer), Some(Cell::Int(10)));
        assert!(convert(DateTime, &fractional, Integer).is_err());
        assert_eq!(conv(DateTime, fractional.clone(), Float), Some(Cell::Float(10.5)));
        assert_eq!(conv(DateTime, epoch, Boolean), Some(Cell::Bool(false)));
        assert!(convert(DateTime, &whole, Boolean).is_err());
        assert_eq!(
            conv(DateTime, fractional, Duration),
            Some(Cell::Duration(TimeDelta::milliseconds(10_500)))
        );
    }

    #[test]
    fn test_duration_row() {
        use SemanticType::*;
        let whole = Cell::Duration(TimeDelta::seconds(10));
        let fractional = Cell::Duration(TimeDelta::milliseconds(10_500));
        let unit = Cell::Duration(TimeDelta::seconds(1));

        assert_eq!(conv(Duration, whole.clone(), Integer), Some(Cell::Int(10)));
        assert!(convert(Duration, &fractional, Integer).is_err());
        assert_eq!(conv(Duration, fractional, Float), Some(Cell::Float(10.5)));
        assert_eq!(conv(Duration, unit, Boolean), Some(Cell::Bool(true)));
        assert!(convert(Duration, &whole, Boolean).is_err());
        assert_eq!(
            conv(Duration, whole, String),
            Some(Cell::Str("00:00:10".into()))
        );
    }
}
