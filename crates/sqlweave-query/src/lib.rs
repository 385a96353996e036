//! Statement compilation for sqlweave
//!
//! This crate turns dialect-neutral statement descriptions into parameterized
//! SQL text plus an ordered argument list:
//!
//! - **Expressions** ([`expr`]): immutable AST nodes built by free-function
//!   constructors (`equal`, `in_`, `and`, `or`, `asc`, spatial predicates, ...)
//! - **Actions** ([`actions`]): select, update, delete and insert descriptions
//! - **Dialects** ([`dialect`]): the [`Dialect`] trait, the MySQL dialect and
//!   a [`DialectRegistry`] keyed by driver name
//! - **Compile** ([`compile`]): `compile_select`, `compile_insert`, ... returning
//!   a [`RenderedStatement`]
//!
//! Values never appear in SQL text; every literal becomes a placeholder bound
//! to the next argument.
//!
//! ## Usage
//!
//! ```rust
//! use sqlweave_query::expr::{desc, equal, gt};
//! use sqlweave_query::{compile_select, FindActions, LockMode, MySql};
//! use sqlweave_reflect::Value;
//!
//! let find = FindActions::new()
//!     .from("shop", "Users")
//!     .filter([equal("Active", true), gt("Age", 18)])
//!     .order_by([desc("CreatedAt")])
//!     .limit(10);
//!
//! let out = compile_select(&MySql::default(), &find, LockMode::None)?;
//! assert_eq!(
//!     out.sql,
//!     "SELECT * FROM `shop`.`Users` WHERE (`Active` = ? AND `Age` > ?) ORDER BY `CreatedAt` DESC LIMIT 10;"
//! );
//! assert_eq!(out.args, vec![Value::Bool(true), Value::Int(18)]);
//! # Ok::<(), sqlweave_query::QueryError>(())
//! ```

pub mod actions;
pub mod compile;
pub mod dialect;
pub mod error;
pub mod expr;
pub mod index;
pub mod statement;
pub mod table;

// Re-exports
pub use actions::{
    DeleteActions, FindActions, InsertMode, InsertSpec, Join, JoinKind, LockMode, UpdateActions,
};
pub use compile::{
    compile_alter_table, compile_create_index, compile_create_table, compile_delete,
    compile_drop_index, compile_insert, compile_select, compile_update, render_pooled,
    RenderedStatement,
};
pub use dialect::{Dialect, DialectRegistry, MySql, MySqlOptions};
pub use error::{QueryError, QueryResult};
pub use expr::Expr;
pub use index::{Direction, IndexColumn, IndexKind, IndexSpec};
pub use statement::{Placeholder, Statement, StatementPool};
pub use table::{AlterTableSpec, TableSpec};
