//! SQL dialects.
//!
//! A [`Dialect`] renders statement descriptions into a [`Statement`]. Dialects
//! are registered by driver name in a [`DialectRegistry`] that the caller
//! constructs and owns.

pub mod mysql;

pub use mysql::{MySql, MySqlOptions};

use crate::actions::{DeleteActions, FindActions, InsertSpec, LockMode, UpdateActions};
use crate::error::QueryResult;
use crate::index::IndexSpec;
use crate::statement::{format_arg, Placeholder, Statement};
use crate::table::{AlterTableSpec, TableSpec};
use sqlweave_codec::SqlCodec;
use sqlweave_reflect::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Statement rendering for one SQL flavour.
pub trait Dialect: Send + Sync {
    /// Driver name this dialect serves
    fn name(&self) -> &'static str;

    fn placeholder(&self) -> Placeholder;

    /// Quote an identifier.
    fn quote(&self, ident: &str) -> String;

    /// Qualified table name; the database part is dropped when empty.
    fn table_name(&self, database: &str, table: &str) -> String {
        if database.is_empty() {
            self.quote(table)
        } else {
            format!("{}.{}", self.quote(database), self.quote(table))
        }
    }

    /// Literal form of a value, for debug output.
    fn format(&self, value: &Value) -> String {
        format_arg(value)
    }

    /// A fresh statement with this dialect's placeholder style.
    fn statement(&self) -> Statement {
        Statement::new(self.placeholder())
    }

    fn get_version(&self, stmt: &mut Statement);
    fn get_databases(&self, stmt: &mut Statement);
    fn use_database(&self, stmt: &mut Statement, database: &str);
    fn create_database(&self, stmt: &mut Statement, database: &str, check_exists: bool);
    fn drop_database(&self, stmt: &mut Statement, database: &str, check_exists: bool);

    fn has_table(&self, stmt: &mut Statement, database: &str, table: &str);
    fn has_primary_key(&self, stmt: &mut Statement, database: &str, table: &str);
    fn get_columns(&self, stmt: &mut Statement, database: &str, table: &str);
    fn rename_table(&self, stmt: &mut Statement, database: &str, old: &str, new: &str);
    fn rename_column(&self, stmt: &mut Statement, database: &str, table: &str, old: &str, new: &str);
    fn drop_column(&self, stmt: &mut Statement, database: &str, table: &str, column: &str);
    fn drop_table(&self, stmt: &mut Statement, database: &str, table: &str, check_exists: bool);
    fn truncate_table(&self, stmt: &mut Statement, database: &str, table: &str);

    fn get_indexes(&self, stmt: &mut Statement, database: &str, table: &str);
    fn has_index_by_name(&self, stmt: &mut Statement, database: &str, table: &str, name: &str);
    fn has_index(&self, stmt: &mut Statement, database: &str, table: &str, index: &IndexSpec) {
        self.has_index_by_name(stmt, database, table, &index.name());
    }
    fn create_indexes(
        &self,
        stmt: &mut Statement,
        database: &str,
        table: &str,
        indexes: &[IndexSpec],
    ) -> QueryResult<()>;
    fn drop_indexes(
        &self,
        stmt: &mut Statement,
        database: &str,
        table: &str,
        names: &[String],
    ) -> QueryResult<()>;

    fn create_table(&self, stmt: &mut Statement, spec: &TableSpec) -> QueryResult<()>;
    fn alter_table(&self, stmt: &mut Statement, spec: &AlterTableSpec) -> QueryResult<()>;

    fn insert_into(&self, stmt: &mut Statement, codec: &SqlCodec, spec: &InsertSpec)
        -> QueryResult<()>;
    fn select(&self, stmt: &mut Statement, find: &FindActions, lock: LockMode) -> QueryResult<()>;
    fn update(&self, stmt: &mut Statement, update: &UpdateActions) -> QueryResult<()>;
    fn delete(&self, stmt: &mut Statement, delete: &DeleteActions) -> QueryResult<()>;

    /// `REPLACE INTO table (columns) SELECT ...`
    fn replace_into(
        &self,
        stmt: &mut Statement,
        database: &str,
        table: &str,
        columns: &[String],
        query: &FindActions,
    ) -> QueryResult<()>;
}

/// Dialects keyed by driver name.
///
/// Lookup trims and lower-cases the driver name.
#[derive(Default)]
pub struct DialectRegistry {
    dialects: HashMap<String, Arc<dyn Dialect>>,
}

fn normalize(driver: &str) -> String {
    driver.trim().to_lowercase()
}

impl DialectRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in MySQL dialect under `mysql`
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("mysql", Arc::new(MySql::default()));
        registry
    }

    /// Register a dialect, replacing any previous one for the driver
    pub fn register(&mut self, driver: &str, dialect: Arc<dyn Dialect>) {
        let driver = normalize(driver);
        debug!(driver = %driver, dialect = dialect.name(), "Registered dialect");
        self.dialects.insert(driver, dialect);
    }

    pub fn get(&self, driver: &str) -> Option<Arc<dyn Dialect>> {
        self.dialects.get(&normalize(driver)).cloned()
    }

    /// Registered driver names, sorted
    pub fn drivers(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.dialects.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("mysql" ; "lower")]
    #[test_case("MySQL" ; "mixed case")]
    #[test_case("  MYSQL \n" ; "padded")]
    fn test_lookup_is_case_insensitive(driver: &str) {
        let registry = DialectRegistry::with_defaults();
        let dialect = registry.get(driver).unwrap();
        assert_eq!(dialect.name(), "mysql");
    }

    #[test]
    fn test_unknown_driver() {
        let registry = DialectRegistry::with_defaults();
        assert!(registry.get("postgres").is_none());
        assert_eq!(registry.drivers(), vec!["mysql"]);
    }
}
