//! Compile entry points.
//!
//! Each function renders one statement description through a [`Dialect`] and
//! returns the finished SQL text with its positional arguments.

use crate::actions::{DeleteActions, FindActions, InsertSpec, LockMode, UpdateActions};
use crate::dialect::Dialect;
use crate::error::QueryResult;
use crate::index::IndexSpec;
use crate::statement::{Statement, StatementPool};
use crate::table::{AlterTableSpec, TableSpec};
use sqlweave_codec::SqlCodec;
use sqlweave_reflect::Value;
use tracing::debug;

/// SQL text and the arguments bound to its placeholders, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedStatement {
    pub sql: String,
    pub args: Vec<Value>,
}

impl From<Statement> for RenderedStatement {
    fn from(stmt: Statement) -> Self {
        let (sql, args) = stmt.into_parts();
        Self { sql, args }
    }
}

fn render(
    dialect: &dyn Dialect,
    kind: &'static str,
    f: impl FnOnce(&mut Statement) -> QueryResult<()>,
) -> QueryResult<RenderedStatement> {
    let mut stmt = dialect.statement();
    f(&mut stmt)?;
    debug!(dialect = dialect.name(), kind, sql = %stmt.sql(), args = stmt.args().len(), "Compiled statement");
    Ok(stmt.into())
}

/// Render through a pooled statement, returning it to the pool afterwards.
///
/// The pooled buffer keeps its allocation; the result owns copies.
pub fn render_pooled(
    pool: &StatementPool,
    f: impl FnOnce(&mut Statement) -> QueryResult<()>,
) -> QueryResult<RenderedStatement> {
    let mut stmt = pool.acquire();
    let result = f(&mut stmt).map(|()| RenderedStatement {
        sql: stmt.sql().to_string(),
        args: stmt.args().to_vec(),
    });
    pool.release(stmt);
    result
}

pub fn compile_select(
    dialect: &dyn Dialect,
    find: &FindActions,
    lock: LockMode,
) -> QueryResult<RenderedStatement> {
    render(dialect, "select", |stmt| dialect.select(stmt, find, lock))
}

pub fn compile_insert(
    dialect: &dyn Dialect,
    codec: &SqlCodec,
    spec: &InsertSpec,
) -> QueryResult<RenderedStatement> {
    render(dialect, "insert", |stmt| dialect.insert_into(stmt, codec, spec))
}

pub fn compile_update(dialect: &dyn Dialect, update: &UpdateActions) -> QueryResult<RenderedStatement> {
    render(dialect, "update", |stmt| dialect.update(stmt, update))
}

pub fn compile_delete(dialect: &dyn Dialect, delete: &DeleteActions) -> QueryResult<RenderedStatement> {
    render(dialect, "delete", |stmt| dialect.delete(stmt, delete))
}

pub fn compile_create_index(
    dialect: &dyn Dialect,
    database: &str,
    table: &str,
    indexes: &[IndexSpec],
) -> QueryResult<RenderedStatement> {
    render(dialect, "create_index", |stmt| {
        dialect.create_indexes(stmt, database, table, indexes)
    })
}

pub fn compile_drop_index(
    dialect: &dyn Dialect,
    database: &str,
    table: &str,
    names: &[String],
) -> QueryResult<RenderedStatement> {
    render(dialect, "drop_index", |stmt| {
        dialect.drop_indexes(stmt, database, table, names)
    })
}

pub fn compile_create_table(dialect: &dyn Dialect, spec: &TableSpec) -> QueryResult<RenderedStatement> {
    render(dialect, "create_table", |stmt| dialect.create_table(stmt, spec))
}

pub fn compile_alter_table(
    dialect: &dyn Dialect,
    spec: &AlterTableSpec,
) -> QueryResult<RenderedStatement> {
    render(dialect, "alter_table", |stmt| dialect.alter_table(stmt, spec))
}
