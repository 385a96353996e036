//! Typed record adapter.
//!
//! Rust structs opt in by implementing [`Record`]: they describe their
//! [`Type`] once and convert to and from the positional [`Value::Struct`]
//! form that every codec works on.
//!
//! ```rust
//! use sqlweave_reflect::{FieldReader, Record, ReflectResult, Type, Value};
//!
//! struct User {
//!     name: String,
//!     age: i64,
//! }
//!
//! impl Record for User {
//!     fn record_type() -> Type {
//!         Type::structure("User")
//!             .field("Name", Type::string())
//!             .field("Age", Type::int64())
//!             .build()
//!     }
//!
//!     fn to_value(&self) -> Value {
//!         Value::Struct(vec![self.name.clone().into(), self.age.into()])
//!     }
//!
//!     fn from_value(value: Value) -> ReflectResult<Self> {
//!         let mut fields = FieldReader::new(value)?;
//!         Ok(Self {
//!             name: fields.next()?,
//!             age: fields.next()?,
//!         })
//!     }
//! }
//! ```

use crate::error::{ReflectError, ReflectResult};
use crate::types::Type;
use crate::value::Value;
use chrono::{DateTime, FixedOffset};
use std::collections::BTreeMap;

/// A Rust type with a runtime [`Type`] description.
pub trait Record: Sized {
    fn record_type() -> Type;

    fn to_value(&self) -> Value;

    fn from_value(value: Value) -> ReflectResult<Self>;
}

/// Conversion out of a dynamic value.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> ReflectResult<Self>;
}

fn mismatch<T>(expected: &'static str, found: &Value) -> ReflectResult<T> {
    Err(ReflectError::Mismatch {
        expected,
        found: found.type_name(),
    })
}

macro_rules! impl_from_value_int {
    ($($t:ty),*) => {
        $(impl FromValue for $t {
            fn from_value(value: Value) -> ReflectResult<Self> {
                let wide: i128 = match value {
                    Value::Int(v) => v as i128,
                    Value::Uint(v) => v as i128,
                    other => return mismatch(stringify!($t), &other),
                };
                <$t>::try_from(wide).map_err(|_| ReflectError::OutOfRange {
                    value: wide.to_string(),
                    target: stringify!($t),
                })
            }
        })*
    };
}

impl_from_value_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl FromValue for f64 {
    fn from_value(value: Value) -> ReflectResult<Self> {
        value.as_f64().map_or_else(|| mismatch("f64", &value), Ok)
    }
}

impl FromValue for f32 {
    fn from_value(value: Value) -> ReflectResult<Self> {
        value
            .as_f64()
            .map(|v| v as f32)
            .map_or_else(|| mismatch("f32", &value), Ok)
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> ReflectResult<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            other => mismatch("bool", &other),
        }
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> ReflectResult<Self> {
        match value {
            Value::String(s) => Ok(s),
            other => mismatch("string", &other),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value) -> ReflectResult<Self> {
        match value {
            Value::Bytes(b) => Ok(b),
            Value::Null => Ok(Vec::new()),
            other => mismatch("bytes", &other),
        }
    }
}

impl FromValue for DateTime<FixedOffset> {
    fn from_value(value: Value) -> ReflectResult<Self> {
        match value {
            Value::Time(t) => Ok(t),
            other => mismatch("time", &other),
        }
    }
}

impl FromValue for BTreeMap<String, Value> {
    fn from_value(value: Value) -> ReflectResult<Self> {
        match value {
            Value::Map(m) => Ok(m),
            Value::Null => Ok(BTreeMap::new()),
            other => mismatch("map", &other),
        }
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> ReflectResult<Self> {
        Ok(value)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> ReflectResult<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

/// Convert a list value element by element.
pub fn list_from_value<T: FromValue>(value: Value) -> ReflectResult<Vec<T>> {
    match value {
        Value::List(items) => items.into_iter().map(T::from_value).collect(),
        Value::Null => Ok(Vec::new()),
        other => mismatch("list", &other),
    }
}

/// Sequential reader over the slots of a struct value.
pub struct FieldReader {
    slots: std::vec::IntoIter<Value>,
    position: usize,
}

impl FieldReader {
    pub fn new(value: Value) -> ReflectResult<Self> {
        match value {
            Value::Struct(slots) => Ok(Self {
                slots: slots.into_iter(),
                position: 0,
            }),
            other => mismatch("struct", &other),
        }
    }

    /// Convert the next slot.
    #[allow(clippy::should_implement_trait)]
    pub fn next<T: FromValue>(&mut self) -> ReflectResult<T> {
        let value = self
            .slots
            .next()
            .ok_or(ReflectError::MissingField(self.position))?;
        self.position += 1;
        T::from_value(value)
    }

    /// Convert the next slot with a custom function (nested records, lists).
    pub fn next_with<T>(&mut self, f: impl FnOnce(Value) -> ReflectResult<T>) -> ReflectResult<T> {
        let value = self
            .slots
            .next()
            .ok_or(ReflectError::MissingField(self.position))?;
        self.position += 1;
        f(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_range_checks() {
        assert_eq!(i8::from_value(Value::Int(-5)), Ok(-5));
        assert!(matches!(
            u8::from_value(Value::Int(300)),
            Err(ReflectError::OutOfRange { target: "u8", .. })
        ));
        assert!(u32::from_value(Value::Int(-1)).is_err());
    }

    #[test]
    fn test_option_from_null() {
        assert_eq!(Option::<String>::from_value(Value::Null), Ok(None));
        assert_eq!(
            Option::<i64>::from_value(Value::Int(3)),
            Ok(Some(3))
        );
    }

    #[test]
    fn test_field_reader_reports_missing_slot() {
        let mut reader = FieldReader::new(Value::Struct(vec![Value::Bool(true)])).unwrap();

        assert_eq!(reader.next::<bool>(), Ok(true));
        assert_eq!(reader.next::<bool>(), Err(ReflectError::MissingField(1)));
    }

    #[test]
    fn test_list_from_value() {
        let list = Value::List(vec![Value::from("a"), Value::from("b")]);
        assert_eq!(
            list_from_value::<String>(list),
            Ok(vec!["a".to_string(), "b".to_string()])
        );
    }
}
