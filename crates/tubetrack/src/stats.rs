//! Append-only store for per-video view/rating observations.
//!
//! A `StatsStore` is a schema-fixed table of `(video_id, timestamp, views,
//! rating, likes, dislikes)` rows. Every mutation leaves the store in a
//! consistent state: rows are validated before insertion, coerced to the
//! expected column types, and kept sorted by `(video_id, timestamp)`.

use std::collections::BTreeSet;
use std::path::Path;

use chrono::{DateTime, FixedOffset, Utc};
use indexmap::IndexMap;

use crate::dtype::{classify, coerce_table, parse_datetime, SemanticType};
use crate::error::{Result, TubeTrackError};
use crate::frame::{Cell, Column, Table};
use crate::validate;

/// Expected shape of one store column.
struct ColumnSpec {
    name: &'static str,
    /// Canonical semantic type the column is coerced to.
    dtype: SemanticType,
    /// Accept any numeric classification before coercion.
    numeric: bool,
    /// Missing values allowed.
    optional: bool,
}

const SCHEMA: [ColumnSpec; 6] = [
    ColumnSpec {
        name: "video_id",
        dtype: SemanticType::String,
        numeric: false,
        optional: false,
    },
    ColumnSpec {
        name: "timestamp",
        dtype: SemanticType::DateTime,
        numeric: false,
        optional: false,
    },
    ColumnSpec {
        name: "views",
        dtype: SemanticType::Integer,
        numeric: false,
        optional: false,
    },
    ColumnSpec {
        name: "rating",
        dtype: SemanticType::Float,
        numeric: true,
        optional: true,
    },
    ColumnSpec {
        name: "likes",
        dtype: SemanticType::Integer,
        numeric: false,
        optional: true,
    },
    ColumnSpec {
        name: "dislikes",
        dtype: SemanticType::Integer,
        numeric: false,
        optional: true,
    },
];

/// One observation row, keyed externally by video id.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsRow {
    pub timestamp: DateTime<FixedOffset>,
    pub views: i64,
    pub rating: Option<f64>,
    pub likes: Option<i64>,
    pub dislikes: Option<i64>,
}

/// Schema-constrained, append-only observation table.
#[derive(Debug, Clone)]
pub struct StatsStore {
    data: Table,
}

impl StatsStore {
    /// Create an empty store with correctly typed (empty) columns.
    pub fn new() -> Self {
        let data = Table::from_columns(SCHEMA.iter().map(|spec| (spec.name, Column::new())))
            .expect("store schema has unique column names");
        Self { data }
    }

    /// Build a store from a table.
    ///
    /// The column set must match the six expected names exactly; each
    /// column's classified type and missing-value policy are checked, then
    /// the table is coerced to canonical types and sorted. Either everything
    /// succeeds or no store is produced.
    pub fn from_table(table: Table) -> Result<Self> {
        let expected: BTreeSet<&str> = SCHEMA.iter().map(|spec| spec.name).collect();
        let actual: BTreeSet<&str> = table.column_names().into_iter().collect();
        let missing: Vec<&str> = expected.difference(&actual).copied().collect();
        let extra: Vec<&str> = actual.difference(&expected).copied().collect();
        if !missing.is_empty() || !extra.is_empty() {
            let context = if !missing.is_empty() && !extra.is_empty() {
                format!(
                    "(missing columns: {}, extra columns: {})",
                    render_names(&missing),
                    render_names(&extra)
                )
            } else if !missing.is_empty() {
                format!("(missing columns: {})", render_names(&missing))
            } else {
                format!("(extra columns: {})", render_names(&extra))
            };
            return Err(TubeTrackError::SchemaMismatch { context });
        }

        for spec in &SCHEMA {
            let column = table
                .column(spec.name)
                .ok_or_else(|| TubeTrackError::SchemaMismatch {
                    context: format!("(missing columns: {{'{}'}})", spec.name),
                })?;
            if !column.all_null() {
                let actual_type = classify(column)?;
                let conforms = if spec.numeric {
                    actual_type.is_numeric()
                } else {
                    actual_type == spec.dtype
                };
                if !conforms {
                    return Err(TubeTrackError::TypeMismatch {
                        column: spec.name.to_string(),
                        expected: if spec.numeric {
                            "numeric".to_string()
                        } else {
                            spec.dtype.to_string()
                        },
                        actual: actual_type,
                    });
                }
            }
            if !spec.optional && column.null_count() > 0 {
                return Err(TubeTrackError::MissingValues {
                    column: spec.name.to_string(),
                });
            }
        }

        let mut types = IndexMap::new();
        for spec in &SCHEMA {
            types.insert(spec.name.to_string(), spec.dtype);
        }
        let data = coerce_table(&table, &types)?;
        let mut store = Self { data };
        store.sort_rows()?;
        Ok(store)
    }

    /// Number of observation rows.
    pub fn len(&self) -> usize {
        self.data.row_count()
    }

    /// Returns true if the store holds no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The backing table, sorted by `(video_id, timestamp)`.
    pub fn table(&self) -> &Table {
        &self.data
    }

    /// Validate and append one observation.
    ///
    /// When `rating` is absent but both `likes` and `dislikes` are present,
    /// the rating is derived as `5 * likes / (likes + dislikes)`. The call
    /// either fully succeeds or leaves the store exactly as it was.
    pub fn append(
        &mut self,
        video_id: &str,
        timestamp: DateTime<Utc>,
        views: i64,
        rating: Option<f64>,
        likes: Option<i64>,
        dislikes: Option<i64>,
    ) -> Result<()> {
        validate::video_id(video_id)?;
        validate::not_future("timestamp", &timestamp)?;
        validate::non_negative_count("views", views)?;
        if let Some(rating) = rating {
            validate::rating_in_range(rating)?;
        }
        if let Some(likes) = likes {
            validate::non_negative_count("likes", likes)?;
        }
        if let Some(dislikes) = dislikes {
            validate::non_negative_count("dislikes", dislikes)?;
        }

        let timestamp = timestamp.fixed_offset();
        if self.contains_key(video_id, &timestamp) {
            return Err(TubeTrackError::DuplicateKey {
                video_id: video_id.to_string(),
                timestamp: timestamp.to_rfc3339(),
            });
        }

        let rating = match (rating, likes, dislikes) {
            (Some(rating), _, _) => Some(rating),
            // Both vote counts known: derive the five-star rating exactly.
            (None, Some(likes), Some(dislikes)) if likes + dislikes > 0 => {
                Some(5.0 * likes as f64 / (likes + dislikes) as f64)
            }
            _ => None,
        };

        let row = [
            ("video_id", Cell::Str(video_id.to_string())),
            ("timestamp", Cell::DateTime(timestamp)),
            ("views", Cell::Int(views)),
            ("rating", rating.map_or(Cell::Null, Cell::Float)),
            ("likes", likes.map_or(Cell::Null, Cell::Int)),
            ("dislikes", dislikes.map_or(Cell::Null, Cell::Int)),
        ];
        for (name, cell) in row {
            if let Some(column) = self.data.column_mut(name) {
                column.push(cell);
            }
        }
        self.sort_rows()
    }

    /// Serialize rows to a CSV file.
    ///
    /// With no `video_ids`, all rows are written; otherwise only rows for the
    /// given ids, each of which must already exist in the store.
    pub fn export(&self, path: impl AsRef<Path>, video_ids: &[&str]) -> Result<()> {
        for id in video_ids {
            validate::video_id(id)?;
            if !self.contains_id(id) {
                return Err(TubeTrackError::RangeViolation {
                    field: "video_id".to_string(),
                    constraint: "an id already present in the store".to_string(),
                    value: format!("'{id}'"),
                });
            }
        }

        let path = path.as_ref();
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(SCHEMA.iter().map(|spec| spec.name))?;
        for index in 0..self.len() {
            let Some((id, row)) = self.row(index) else {
                continue;
            };
            if !video_ids.is_empty() && !video_ids.contains(&id.as_str()) {
                continue;
            }
            writer.write_record([
                id,
                row.timestamp.to_rfc3339(),
                row.views.to_string(),
                row.rating.map(|r| r.to_string()).unwrap_or_default(),
                row.likes.map(|v| v.to_string()).unwrap_or_default(),
                row.dislikes.map(|v| v.to_string()).unwrap_or_default(),
            ])?;
        }
        writer.flush().map_err(|e| TubeTrackError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(())
    }

    /// Read a CSV file written by `export` and construct a new store.
    pub fn import(path: impl AsRef<Path>) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path.as_ref())?;
        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut columns: Vec<Column> = headers.iter().map(|_| Column::new()).collect();
        for record in reader.records() {
            let record = record?;
            for (index, field) in record.iter().enumerate() {
                if let Some(column) = columns.get_mut(index) {
                    column.push(parse_field(&headers[index], field));
                }
            }
        }
        let table = Table::from_columns(headers.into_iter().zip(columns))?;
        Self::from_table(table)
    }

    /// For each distinct video id, the row with the maximum timestamp, in
    /// order of first appearance.
    pub fn most_recent(&self) -> IndexMap<String, StatsRow> {
        let mut latest = IndexMap::new();
        // Rows are sorted ascending within each id, so the last one wins.
        for index in 0..self.len() {
            if let Some((id, row)) = self.row(index) {
                latest.insert(id, row);
            }
        }
        latest
    }

    fn row(&self, index: usize) -> Option<(String, StatsRow)> {
        let id = cell_str(self.data.column("video_id")?.get(index)?)?.to_string();
        let timestamp = cell_datetime(self.data.column("timestamp")?.get(index)?)?;
        let views = cell_i64(self.data.column("views")?.get(index)?)?;
        let rating = self.data.column("rating")?.get(index).and_then(cell_f64);
        let likes = self.data.column("likes")?.get(index).and_then(cell_i64);
        let dislikes = self.data.column("dislikes")?.get(index).and_then(cell_i64);
        Some((
            id,
            StatsRow {
                timestamp,
                views,
                rating,
                likes,
                dislikes,
            },
        ))
    }

    fn contains_id(&self, video_id: &str) -> bool {
        self.data
            .column("video_id")
            .is_some_and(|column| column.iter().any(|cell| cell_str(cell) == Some(video_id)))
    }

    fn contains_key(&self, video_id: &str, timestamp: &DateTime<FixedOffset>) -> bool {
        let (Some(ids), Some(stamps)) = (
            self.data.column("video_id"),
            self.data.column("timestamp"),
        ) else {
            return false;
        };
        (0..self.len()).any(|index| {
            ids.get(index).and_then(cell_str) == Some(video_id)
                && stamps.get(index).and_then(cell_datetime).as_ref() == Some(timestamp)
        })
    }

    /// Re-sort rows by `(video_id, timestamp)`, ascending.
    fn sort_rows(&mut self) -> Result<()> {
        let row_count = self.data.row_count();
        let keys: Vec<(String, DateTime<FixedOffset>)> = {
            let ids = self.data.column("video_id");
            let stamps = self.data.column("timestamp");
            (0..row_count)
                .map(|index| {
                    let id = ids
                        .and_then(|c| c.get(index))
                        .and_then(cell_str)
                        .unwrap_or_default()
                        .to_string();
                    let timestamp = stamps
                        .and_then(|c| c.get(index))
                        .and_then(cell_datetime)
                        .unwrap_or_else(|| DateTime::<Utc>::UNIX_EPOCH.fixed_offset());
                    (id, timestamp)
                })
                .collect()
        };
        let mut order: Vec<usize> = (0..row_count).collect();
        order.sort_by(|&a, &b| keys[a].cmp(&keys[b]));
        if order.iter().enumerate().all(|(position, &index)| position == index) {
            return Ok(());
        }

        let mut sorted = Table::new();
        for (name, column) in self.data.iter() {
            let cells: Vec<Cell> = order
                .iter()
                .filter_map(|&index| column.get(index).cloned())
                .collect();
            sorted.insert(name.clone(), Column::from(cells))?;
        }
        self.data = sorted;
        Ok(())
    }
}

impl Default for StatsStore {
    fn default() -> Self {
        Self::new()
    }
}

fn render_names(names: &[&str]) -> String {
    let quoted: Vec<String> = names.iter().map(|name| format!("'{name}'")).collect();
    format!("{{{}}}", quoted.join(", "))
}

fn parse_field(name: &str, raw: &str) -> Cell {
    if raw.trim().is_empty() {
        return Cell::Null;
    }
    match name {
        "timestamp" => parse_datetime(raw)
            .map(Cell::DateTime)
            .unwrap_or_else(|| Cell::Str(raw.to_string())),
        "views" | "likes" | "dislikes" => raw
            .trim()
            .parse()
            .map(Cell::Int)
            .unwrap_or_else(|_| Cell::Str(raw.to_string())),
        "rating" => raw
            .trim()
            .parse()
            .map(Cell::Float)
            .unwrap_or_else(|_| Cell::Str(raw.to_string())),
        _ => Cell::Str(raw.to_string()),
    }
}

fn cell_str(cell: &Cell) -> Option<&str> {
    match cell {
        Cell::Str(s) => Some(s),
        _ => None,
    }
}

fn cell_i64(cell: &Cell) -> Option<i64> {
    let c = cell.as_complex()?;
    if c.im == 0.0 && c.re.fract() == 0.0 {
        Some(c.re as i64)
    } else {
        None
    }
}

fn cell_f64(cell: &Cell) -> Option<f64> {
    let c = cell.as_complex()?;
    if c.im == 0.0 { Some(c.re) } else { None }
}

fn cell_datetime(cell: &Cell) -> Option<DateTime<FixedOffset>> {
    match cell {
        Cell::DateTime(dt) => Some(*dt),
        Cell::Str(s) => parse_datetime(s),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 6, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_store() {
        let store = StatsStore::new();
        assert!(store.is_empty());
        assert_eq!(
            store.table().column_names(),
            vec!["video_id", "timestamp", "views", "rating", "likes", "dislikes"]
        );
    }

    #[test]
    fn test_append_sorts_by_id_then_timestamp() {
        let mut store = StatsStore::new();
        store
            .append("BBBBBBBBBBB", at(1, 0), 5, None, None, None)
            .unwrap();
        store
            .append("AAAAAAAAAAA", at(2, 0), 10, None, None, None)
            .unwrap();
        store
            .append("AAAAAAAAAAA", at(1, 0), 8, None, None, None)
            .unwrap();

        let ids: Vec<_> = store
            .table()
            .column("video_id")
            .unwrap()
            .iter()
            .map(|c| c.to_string())
            .collect();
        assert_eq!(ids, vec!["AAAAAAAAAAA", "AAAAAAAAAAA", "BBBBBBBBBBB"]);

        let views: Vec<_> = store
            .table()
            .column("views")
            .unwrap()
            .iter()
            .map(|c| c.to_string())
            .collect();
        assert_eq!(views, vec!["8", "10", "5"]);
    }

    #[test]
    fn test_append_validation() {
        let mut store = StatsStore::new();
        assert!(store
            .append("short", at(1, 0), 1, None, None, None)
            .is_err());
        assert!(store
            .append("AAAAAAAAAAA", Utc::now() + chrono::Duration::hours(1), 1, None, None, None)
            .is_err());
        assert!(store
            .append("AAAAAAAAAAA", at(1, 0), -1, None, None, None)
            .is_err());
        assert!(store
            .append("AAAAAAAAAAA", at(1, 0), 1, Some(5.5), None, None)
            .is_err());
        assert!(store
            .append("AAAAAAAAAAA", at(1, 0), 1, None, Some(-1), None)
            .is_err());
        // Nothing was appended by the failing calls.
        assert!(store.is_empty());
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let mut store = StatsStore::new();
        store
            .append("dQw4w9WgXcQ", at(1, 0), 100, None, None, None)
            .unwrap();
        let err = store
            .append("dQw4w9WgXcQ", at(1, 0), 200, None, None, None)
            .unwrap_err();
        assert!(matches!(err, TubeTrackError::DuplicateKey { .. }));
        assert_eq!(store.len(), 1);

        // Same id with a different timestamp is fine.
        store
            .append("dQw4w9WgXcQ", at(1, 1), 200, None, None, None)
            .unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_rating_derived_from_votes() {
        let mut store = StatsStore::new();
        store
            .append("11charID000", at(1, 0), 100, None, Some(34), Some(6))
            .unwrap();
        let recent = store.most_recent();
        assert_eq!(recent["11charID000"].rating, Some(4.25));
        assert_eq!(recent["11charID000"].likes, Some(34));

        // No votes at all: the rating stays absent.
        store
            .append("11charID000", at(2, 0), 100, None, Some(0), Some(0))
            .unwrap();
        assert_eq!(store.most_recent()["11charID000"].rating, None);
    }

    #[test]
    fn test_most_recent_picks_max_timestamp() {
        let mut store = StatsStore::new();
        store
            .append("AAAAAAAAAAA", at(1, 0), 10, None, None, None)
            .unwrap();
        store
            .append("AAAAAAAAAAA", at(3, 0), 30, None, None, None)
            .unwrap();
        store
            .append("AAAAAAAAAAA", at(2, 0), 20, None, None, None)
            .unwrap();
        store
            .append("BBBBBBBBBBB", at(1, 0), 5, None, None, None)
            .unwrap();

        let recent = store.most_recent();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent["AAAAAAAAAAA"].views, 30);
        assert_eq!(recent["BBBBBBBBBBB"].views, 5);
    }

    #[test]
    fn test_from_table_schema_mismatch_names_both_sets() {
        let table = Table::from_columns([
            ("video_id", Column::from(vec![Cell::Str("AAAAAAAAAAA".into())])),
            ("timestamp", Column::from(vec![Cell::DateTime(at(1, 0).fixed_offset())])),
            ("views", Column::from(vec![Cell::Int(1)])),
            ("rating", Column::from(vec![Cell::Null])),
            ("likes", Column::from(vec![Cell::Null])),
            ("foo", Column::from(vec![Cell::Null])),
        ])
        .unwrap();

        let err = StatsStore::from_table(table).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("{'dislikes'}"), "message: {message}");
        assert!(message.contains("{'foo'}"), "message: {message}");
    }

    #[test]
    fn test_from_table_type_and_missing_checks() {
        let bad_views = Table::from_columns([
            ("video_id", Column::from(vec![Cell::Str("AAAAAAAAAAA".into())])),
            ("timestamp", Column::from(vec![Cell::DateTime(at(1, 0).fixed_offset())])),
            ("views", Column::from(vec![Cell::Str("many".into())])),
            ("rating", Column::from(vec![Cell::Null])),
            ("likes", Column::from(vec![Cell::Null])),
            ("dislikes", Column::from(vec![Cell::Null])),
        ])
        .unwrap();
        let err = StatsStore::from_table(bad_views).unwrap_err();
        assert!(matches!(err, TubeTrackError::TypeMismatch { .. }));
        assert!(err.to_string().contains("'views'"));

        let missing_required = Table::from_columns([
            ("video_id", Column::from(vec![Cell::Str("AAAAAAAAAAA".into())])),
            ("timestamp", Column::from(vec![Cell::Null])),
            ("views", Column::from(vec![Cell::Int(1)])),
            ("rating", Column::from(vec![Cell::Null])),
            ("likes", Column::from(vec![Cell::Null])),
            ("dislikes", Column::from(vec![Cell::Null])),
        ])
        .unwrap();
        let err = StatsStore::from_table(missing_required).unwrap_err();
        assert!(matches!(err, TubeTrackError::MissingValues { .. }));
    }

    #[test]
    fn test_from_table_coerces_and_sorts() {
        // Whole-float views and integer ratings are legal loose inputs.
        let table = Table::from_columns([
            ("video_id", Column::from(vec![
                Cell::Str("BBBBBBBBBBB".into()),
                Cell::Str("AAAAAAAAAAA".into()),
            ])),
            ("timestamp", Column::from(vec![
                Cell::DateTime(at(1, 0).fixed_offset()),
                Cell::DateTime(at(2, 0).fixed_offset()),
            ])),
            ("views", Column::from(vec![Cell::Float(10.0), Cell::Float(20.0)])),
            ("rating", Column::from(vec![Cell::Int(4), Cell::Null])),
            ("likes", Column::from(vec![Cell::Null, Cell::Int(3)])),
            ("dislikes", Column::from(vec![Cell::Null, Cell::Null])),
        ])
        .unwrap();

        let store = StatsStore::from_table(table).unwrap();
        let recent = store.most_recent();
        // Sorted: AAAAAAAAAAA first.
        assert_eq!(
            recent.keys().collect::<Vec<_>>(),
            vec!["AAAAAAAAAAA", "BBBBBBBBBBB"]
        );
        assert_eq!(recent["BBBBBBBBBBB"].views, 10);
        assert_eq!(recent["BBBBBBBBBBB"].rating, Some(4.0));
    }
}
