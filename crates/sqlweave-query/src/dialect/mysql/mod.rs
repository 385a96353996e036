//! MySQL dialect.
//!
//! Identifiers are quoted with backticks and arguments bind to `?`. Every
//! top-level statement ends with `;`.

mod builder;
mod index;
mod insert;
mod schema;

use crate::actions::{DeleteActions, FindActions, InsertSpec, LockMode, UpdateActions};
use crate::dialect::Dialect;
use crate::error::QueryResult;
use crate::index::IndexSpec;
use crate::statement::{Placeholder, Statement};
use crate::table::{AlterTableSpec, TableSpec};
use sqlweave_codec::SqlCodec;
use sqlweave_config::DialectConfig;
use sqlweave_reflect::Value;

/// Column defaults applied by the schema builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MySqlOptions {
    /// `VARCHAR` length of string columns without a `size` tag
    pub string_size: u32,
    pub charset: String,
    pub collate: String,
    /// Whether index columns may carry `DESC`
    pub supports_desc_index: bool,
}

impl Default for MySqlOptions {
    fn default() -> Self {
        Self::from(&DialectConfig::default())
    }
}

impl From<&DialectConfig> for MySqlOptions {
    fn from(config: &DialectConfig) -> Self {
        Self {
            string_size: config.string_size,
            charset: config.charset.clone(),
            collate: config.collate.clone(),
            supports_desc_index: config.supports_desc_index,
        }
    }
}

/// The MySQL dialect.
#[derive(Debug, Clone, Default)]
pub struct MySql {
    options: MySqlOptions,
}

impl MySql {
    pub fn new(options: MySqlOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &MySqlOptions {
        &self.options
    }

    /// `... WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?` against an
    /// information-schema view.
    fn information_schema(&self, stmt: &mut Statement, head: &str, database: &str, table: &str) {
        stmt.write_str(head);
        stmt.write_str(" WHERE TABLE_SCHEMA = ");
        stmt.push_arg(Value::from(database));
        stmt.write_str(" AND TABLE_NAME = ");
        stmt.push_arg(Value::from(table));
    }
}

impl Dialect for MySql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn placeholder(&self) -> Placeholder {
        Placeholder::Question
    }

    fn quote(&self, ident: &str) -> String {
        format!("`{}`", ident.replace('`', "``"))
    }

    fn get_version(&self, stmt: &mut Statement) {
        stmt.write_str("SELECT VERSION();");
    }

    fn get_databases(&self, stmt: &mut Statement) {
        stmt.write_str("SHOW DATABASES;");
    }

    fn use_database(&self, stmt: &mut Statement, database: &str) {
        stmt.write_str("USE ");
        stmt.write_str(&self.quote(database));
        stmt.write_char(';');
    }

    fn create_database(&self, stmt: &mut Statement, database: &str, check_exists: bool) {
        stmt.write_str("CREATE DATABASE ");
        if check_exists {
            stmt.write_str("IF NOT EXISTS ");
        }
        stmt.write_str(&self.quote(database));
        stmt.write_char(';');
    }

    fn drop_database(&self, stmt: &mut Statement, database: &str, check_exists: bool) {
        stmt.write_str("DROP DATABASE ");
        if check_exists {
            stmt.write_str("IF EXISTS ");
        }
        stmt.write_str(&self.quote(database));
        stmt.write_char(';');
    }

    fn has_table(&self, stmt: &mut Statement, database: &str, table: &str) {
        self.information_schema(
            stmt,
            "SELECT COUNT(*) FROM INFORMATION_SCHEMA.TABLES",
            database,
            table,
        );
        stmt.write_char(';');
    }

    fn has_primary_key(&self, stmt: &mut Statement, database: &str, table: &str) {
        self.information_schema(
            stmt,
            "SELECT COUNT(*) FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS",
            database,
            table,
        );
        stmt.write_str(" AND CONSTRAINT_TYPE = 'PRIMARY KEY';");
    }

    fn get_columns(&self, stmt: &mut Statement, database: &str, table: &str) {
        self.information_schema(
            stmt,
            "SELECT ORDINAL_POSITION, COLUMN_NAME, COLUMN_TYPE, COLUMN_DEFAULT, IS_NULLABLE, \
             DATA_TYPE, CHARACTER_SET_NAME, COLLATION_NAME, EXTRA \
             FROM INFORMATION_SCHEMA.COLUMNS",
            database,
            table,
        );
        stmt.write_str(" ORDER BY ORDINAL_POSITION;");
    }

    fn rename_table(&self, stmt: &mut Statement, database: &str, old: &str, new: &str) {
        stmt.write_str("RENAME TABLE ");
        stmt.write_str(&self.table_name(database, old));
        stmt.write_str(" TO ");
        stmt.write_str(&self.table_name(database, new));
        stmt.write_char(';');
    }

    fn rename_column(&self, stmt: &mut Statement, database: &str, table: &str, old: &str, new: &str) {
        stmt.write_str("ALTER TABLE ");
        stmt.write_str(&self.table_name(database, table));
        stmt.write_str(" RENAME COLUMN ");
        stmt.write_str(&self.quote(old));
        stmt.write_str(" TO ");
        stmt.write_str(&self.quote(new));
        stmt.write_char(';');
    }

    fn drop_column(&self, stmt: &mut Statement, database: &str, table: &str, column: &str) {
        stmt.write_str("ALTER TABLE ");
        stmt.write_str(&self.table_name(database, table));
        stmt.write_str(" DROP COLUMN ");
        stmt.write_str(&self.quote(column));
        stmt.write_char(';');
    }

    fn drop_table(&self, stmt: &mut Statement, database: &str, table: &str, check_exists: bool) {
        stmt.write_str("DROP TABLE ");
        if check_exists {
            stmt.write_str("IF EXISTS ");
        }
        stmt.write_str(&self.table_name(database, table));
        stmt.write_char(';');
    }

    fn truncate_table(&self, stmt: &mut Statement, database: &str, table: &str) {
        stmt.write_str("TRUNCATE TABLE ");
        stmt.write_str(&self.table_name(database, table));
        stmt.write_char(';');
    }

    fn get_indexes(&self, stmt: &mut Statement, database: &str, table: &str) {
        self.information_schema(
            stmt,
            "SELECT DISTINCT INDEX_NAME, INDEX_TYPE, IS_VISIBLE FROM INFORMATION_SCHEMA.STATISTICS",
            database,
            table,
        );
        stmt.write_char(';');
    }

    fn has_index_by_name(&self, stmt: &mut Statement, database: &str, table: &str, name: &str) {
        self.information_schema(
            stmt,
            "SELECT COUNT(*) FROM INFORMATION_SCHEMA.STATISTICS",
            database,
            table,
        );
        stmt.write_str(" AND INDEX_NAME = ");
        stmt.push_arg(Value::from(name));
        stmt.write_char(';');
    }

    fn create_indexes(
        &self,
        stmt: &mut Statement,
        database: &str,
        table: &str,
        indexes: &[IndexSpec],
    ) -> QueryResult<()> {
        self.build_create_indexes(stmt, database, table, indexes)
    }

    fn drop_indexes(
        &self,
        stmt: &mut Statement,
        database: &str,
        table: &str,
        names: &[String],
    ) -> QueryResult<()> {
        self.build_drop_indexes(stmt, database, table, names)
    }

    fn create_table(&self, stmt: &mut Statement, spec: &TableSpec) -> QueryResult<()> {
        self.build_create_table(stmt, spec)
    }

    fn alter_table(&self, stmt: &mut Statement, spec: &AlterTableSpec) -> QueryResult<()> {
        self.build_alter_table(stmt, spec)
    }

    fn insert_into(
        &self,
        stmt: &mut Statement,
        codec: &SqlCodec,
        spec: &InsertSpec,
    ) -> QueryResult<()> {
        self.build_insert(stmt, codec, spec)
    }

    fn select(&self, stmt: &mut Statement, find: &FindActions, lock: LockMode) -> QueryResult<()> {
        self.build_select(stmt, find, lock)
    }

    fn update(&self, stmt: &mut Statement, update: &UpdateActions) -> QueryResult<()> {
        self.build_update(stmt, update)
    }

    fn delete(&self, stmt: &mut Statement, delete: &DeleteActions) -> QueryResult<()> {
        self.build_delete(stmt, delete)
    }

    fn replace_into(
        &self,
        stmt: &mut Statement,
        database: &str,
        table: &str,
        columns: &[String],
        query: &FindActions,
    ) -> QueryResult<()> {
        stmt.write_str("REPLACE INTO ");
        stmt.write_str(&self.table_name(database, table));
        if !columns.is_empty() {
            stmt.write_str(" (");
            for (i, col) in columns.iter().enumerate() {
                if i > 0 {
                    stmt.write_char(',');
                }
                stmt.write_str(&self.quote(col));
            }
            stmt.write_char(')');
        }
        stmt.write_char(' ');
        self.build_find(stmt, query)?;
        stmt.write_char(';');
        Ok(())
    }
}
