//! Tables: ordered collections of equal-length, uniquely-named columns.

use indexmap::IndexMap;

use crate::error::{Result, TubeTrackError};

use super::column::Column;

/// An ordered mapping of column name to column, all sharing one row count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: IndexMap<String, Column>,
}

impl Table {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            columns: IndexMap::new(),
        }
    }

    /// Build a table from `(name, column)` pairs, preserving order.
    pub fn from_columns(
        pairs: impl IntoIterator<Item = (impl Into<String>, Column)>,
    ) -> Result<Self> {
        let mut table = Self::new();
        for (name, column) in pairs {
            table.insert(name, column)?;
        }
        Ok(table)
    }

    /// Insert a column. Fails on duplicate names or row-count disagreement.
    pub fn insert(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        let name = name.into();
        if self.columns.contains_key(&name) {
            return Err(TubeTrackError::DuplicateColumn { name });
        }
        if let Some(expected) = self.columns.values().next().map(Column::len) {
            if column.len() != expected {
                return Err(TubeTrackError::ColumnLength {
                    name,
                    expected,
                    actual: column.len(),
                });
            }
        }
        self.columns.insert(name, column);
        Ok(())
    }

    /// Get a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// Get a mutable column by name. The caller is responsible for keeping
    /// row counts aligned across columns.
    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.get_mut(name)
    }

    /// Returns true if a column with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Column names in insertion order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.keys().map(String::as_str).collect()
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows shared by every column.
    pub fn row_count(&self) -> usize {
        self.columns.values().next().map_or(0, Column::len)
    }

    /// Iterate over `(name, column)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Column)> {
        self.columns.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Cell;

    #[test]
    fn test_insert_and_lookup() {
        let mut table = Table::new();
        table
            .insert("a", Column::from(vec![Cell::Int(1), Cell::Int(2)]))
            .unwrap();
        table
            .insert("b", Column::from(vec![Cell::Null, Cell::Str("x".into())]))
            .unwrap();

        assert_eq!(table.column_names(), vec!["a", "b"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column("a").unwrap().len(), 2);
        assert!(table.column("c").is_none());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut table = Table::new();
        table.insert("a", Column::from(vec![Cell::Int(1)])).unwrap();
        let err = table
            .insert("a", Column::from(vec![Cell::Int(2)]))
            .unwrap_err();
        assert!(matches!(err, TubeTrackError::DuplicateColumn { .. }));
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let mut table = Table::new();
        table.insert("a", Column::from(vec![Cell::Int(1)])).unwrap();
        let err = table
            .insert("b", Column::from(vec![Cell::Int(1), Cell::Int(2)]))
            .unwrap_err();
        assert!(matches!(
            err,
            TubeTrackError::ColumnLength {
                expected: 1,
                actual: 2,
                ..
            }
        ));
    }
}
