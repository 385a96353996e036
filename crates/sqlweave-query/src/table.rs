//! Table DDL descriptions.

use sqlweave_reflect::FieldIndex;
use std::sync::Arc;

/// `CREATE TABLE` from a record's field index.
#[derive(Debug, Clone)]
pub struct TableSpec {
    pub database: String,
    pub table: String,
    pub index: Arc<FieldIndex>,
    /// Key column; detected from tags when unset.
    pub primary_key: Option<String>,
}

impl TableSpec {
    pub fn new(database: impl Into<String>, table: impl Into<String>, index: Arc<FieldIndex>) -> Self {
        Self {
            database: database.into(),
            table: table.into(),
            index,
            primary_key: None,
        }
    }

    pub fn primary_key(mut self, column: impl Into<String>) -> Self {
        self.primary_key = Some(column.into());
        self
    }
}

/// `ALTER TABLE` bringing an existing table in line with a record.
#[derive(Debug, Clone)]
pub struct AlterTableSpec {
    pub table: TableSpec,
    /// Whether the live table already has a primary key.
    pub has_primary_key: bool,
    /// Column names of the live table.
    pub columns: Vec<String>,
    /// Index names of the live table.
    pub indexes: Vec<String>,
    /// Drop live columns the record no longer has.
    pub unsafe_drop: bool,
}

impl AlterTableSpec {
    pub fn new(table: TableSpec, columns: Vec<String>) -> Self {
        Self {
            table,
            has_primary_key: false,
            columns,
            indexes: Vec::new(),
            unsafe_drop: false,
        }
    }

    pub fn has_primary_key(mut self, has: bool) -> Self {
        self.has_primary_key = has;
        self
    }

    pub fn indexes(mut self, indexes: Vec<String>) -> Self {
        self.indexes = indexes;
        self
    }

    pub fn unsafe_drop(mut self, enabled: bool) -> Self {
        self.unsafe_drop = enabled;
        self
    }
}
