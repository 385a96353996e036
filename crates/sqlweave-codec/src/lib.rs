//! Codecs for sqlweave records
//!
//! This crate resolves encode/decode routines per concrete type and uses them
//! for two wire forms:
//!
//! - **JSON** ([`jsonb`]): a streaming reader and writer with no intermediate
//!   document tree, used for container-typed columns and generated columns
//! - **SQL values** ([`sql`]): field values to driver arguments, and driver
//!   rows back into record values
//!
//! Both are built on the same two-level [`Registry`]: an exact-type table
//! consulted first, then a per-kind fallback.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use sqlweave_codec::JsonCodec;
//! use sqlweave_reflect::{Mapper, Type, Value};
//!
//! let person = Type::structure("Person")
//!     .field("Name", Type::string())
//!     .field("Age", Type::int())
//!     .build();
//!
//! let codec = JsonCodec::new(Arc::new(Mapper::default()));
//! let value = codec.decode_value(br#"{"Name":"abc","Age":30}"#, &person)?;
//! assert_eq!(value, Value::Struct(vec![Value::from("abc"), Value::Int(30)]));
//! assert_eq!(codec.encode(&person, &value)?, br#"{"Name":"abc","Age":30}"#.to_vec());
//! # Ok::<(), sqlweave_codec::CodecError>(())
//! ```

pub mod error;
pub mod jsonb;
pub mod registry;
pub mod sql;

// Re-exports
pub use error::{CodecError, CodecResult};
pub use jsonb::{JsonCodec, JsonCodecBuilder, Reader, Writer};
pub use registry::{Registry, RegistryBuilder};
pub use sql::{SqlCodec, SqlCodecBuilder};
