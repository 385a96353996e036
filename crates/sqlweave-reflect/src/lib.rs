//! Runtime type model and field indexer for sqlweave
//!
//! Rust has no runtime reflection, so records describe themselves with a
//! [`Type`] and carry their data as a [`Value`]. On top of that model this
//! crate provides:
//!
//! - **Tag parsing**: `name,opt,key:value` struct tags ([`StructTag`])
//! - **Field Indexer**: a breadth-first walk producing an ordered, addressable
//!   field tree ([`build_field_index`], [`FieldIndex`])
//! - **Mapper**: a process-wide, lock-protected cache of field indexes
//! - **Record**: the adapter trait that binds Rust structs to the model
//!
//! ## Usage
//!
//! ```rust
//! use sqlweave_reflect::{FieldDef, Mapper, Type};
//!
//! let user = Type::structure("User")
//!     .field_def(FieldDef::new("ID", Type::int64()).tag("sqlike", "$Key"))
//!     .field("Name", Type::string())
//!     .build();
//!
//! let mapper = Mapper::default();
//! let index = mapper.codec_by_type(&user);
//! let names: Vec<&str> = index.name_fields().map(|f| f.path()).collect();
//! assert_eq!(names, vec!["$Key", "Name"]);
//! ```

pub mod error;
pub mod field;
pub mod kind;
pub mod mapper;
pub mod record;
pub mod tag;
pub mod types;
pub mod value;

// Re-exports
pub use error::{ReflectError, ReflectResult};
pub use field::{build_field_index, Classifier, FieldIndex, StructField};
pub use kind::Kind;
pub use mapper::Mapper;
pub use record::{list_from_value, FieldReader, FromValue, Record};
pub use tag::{StructTag, SKIP_NAME};
pub use types::{FieldDef, StructBuilder, Type, BYTES_TYPE, RAW_JSON_TYPE, TIME_TYPE};
pub use value::{zero_time, Value};
