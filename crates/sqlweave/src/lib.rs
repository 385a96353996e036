//! # sqlweave
//!
//! Maps typed records to relational rows and to JSON, and compiles
//! dialect-neutral query descriptions into parameterized SQL.
//!
//! The [`Engine`] is the composition root. It is built once from an
//! [`EngineConfig`] and owns:
//!
//! - the [`Mapper`] that caches one field index per record type
//! - the JSON and SQL value codecs
//! - the dialect selected by `dialect.driver`
//!
//! The underlying crates are re-exported as [`config`], [`reflect`],
//! [`codec`] and [`query`].
//!
//! ## Quick Start
//!
//! ```rust
//! use sqlweave::query::expr::equal;
//! use sqlweave::{Engine, EngineConfig, FindActions, LockMode, Value};
//!
//! let engine = Engine::new(EngineConfig::default())?;
//! let find = FindActions::new()
//!     .from("shop", "Users")
//!     .filter([equal("Name", "abc")]);
//!
//! let out = engine.select(&find, LockMode::ForUpdate)?;
//! assert_eq!(
//!     out.sql,
//!     "SELECT * FROM `shop`.`Users` WHERE `Name` = ? LIMIT 100 FOR UPDATE;"
//! );
//! assert_eq!(out.args, vec![Value::from("abc")]);
//! # Ok::<(), sqlweave::EngineError>(())
//! ```

mod engine;
mod error;

pub use sqlweave_codec as codec;
pub use sqlweave_config as config;
pub use sqlweave_query as query;
pub use sqlweave_reflect as reflect;

// Re-exports
pub use engine::Engine;
pub use error::{EngineError, EngineResult};
pub use sqlweave_codec::{CodecError, JsonCodec, SqlCodec};
pub use sqlweave_config::{ConfigError, EngineConfig};
pub use sqlweave_query::{
    AlterTableSpec, DeleteActions, Dialect, DialectRegistry, FindActions, IndexSpec, InsertMode,
    InsertSpec, LockMode, QueryError, RenderedStatement, TableSpec, UpdateActions,
};
pub use sqlweave_reflect::{FieldDef, Mapper, Record, Type, Value};
