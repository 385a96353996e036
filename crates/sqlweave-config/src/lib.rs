//! # sqlweave configuration
//!
//! Type-safe configuration for the query and codec engine. A single
//! [`EngineConfig`] carries everything the engine needs at startup:
//!
//! - which struct tag namespace the field indexer reads (`mapping`)
//! - dialect defaults used when rendering DDL and statements (`dialect`)
//! - JSON codec compatibility switches (`json`)
//!
//! ## Quick Start
//!
//! ```rust
//! use sqlweave_config::EngineConfig;
//!
//! let config = EngineConfig::from_json_str(r#"{"mapping": {"tag_name": "db"}}"#)?;
//! assert_eq!(config.mapping.tag_name, "db");
//! assert_eq!(config.dialect.driver, "mysql");
//! # Ok::<(), sqlweave_config::ConfigError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod error;
mod loader;

pub use config::*;
pub use error::{ConfigError, ConfigResult};
