//! Dynamic values.

use crate::kind::Kind;
use crate::types::Type;
use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Seconds from the Unix epoch to 0001-01-01T00:00:00Z.
const ZERO_TIME_UNIX: i64 = -62_135_596_800;

/// The zero timestamp, 0001-01-01T00:00:00Z.
pub fn zero_time() -> DateTime<FixedOffset> {
    DateTime::<Utc>::from_timestamp(ZERO_TIME_UNIX, 0)
        .unwrap_or_default()
        .fixed_offset()
}

/// Runtime representation of a record or any part of it.
///
/// Struct values are positional: slot `i` holds declared field `i`. A
/// pointer-typed slot holds either `Null` or the pointee directly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    Time(DateTime<FixedOffset>),
    List(Vec<Value>),
    Struct(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short variant name, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Uint(_) => "uint",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Time(_) => "time",
            Value::List(_) => "list",
            Value::Struct(_) => "struct",
            Value::Map(_) => "map",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Uint(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Uint(v) => Some(*v),
            Value::Int(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            Value::Uint(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Uint(_) | Value::Float(_))
    }

    /// Follow a field-index path through nested struct values.
    ///
    /// Returns `None` when the path crosses an absent pointer; callers fall
    /// back to the field's zero template in that case.
    pub fn field_by_index(&self, index: &[usize]) -> Option<&Value> {
        let mut cur = self;
        for &i in index {
            match cur {
                Value::Struct(slots) => cur = slots.get(i)?,
                _ => return None,
            }
        }
        Some(cur)
    }

    /// Mutable counterpart of [`field_by_index`](Self::field_by_index).
    ///
    /// Absent pointer-to-struct slots along the path are replaced by a zero
    /// struct so the destination always exists.
    pub fn field_by_index_mut(&mut self, ty: &Type, index: &[usize]) -> Option<&mut Value> {
        let mut cur = self;
        let mut ty = ty.clone();
        for &i in index {
            let st = ty.deref();
            if st.kind() != Kind::Struct {
                return None;
            }
            if cur.is_null() {
                *cur = st.zero();
            }
            let field = st.field(i)?;
            match cur {
                Value::Struct(slots) => cur = slots.get_mut(i)?,
                _ => return None,
            }
            ty = field.ty().clone();
        }
        Some(cur)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Int(v as i64)
            }
        })*
    };
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Uint(v as u64)
            }
        })*
    };
}

impl_from_signed!(i8, i16, i32, i64, isize);
impl_from_unsigned!(u8, u16, u32, u64, usize);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(v: DateTime<FixedOffset>) -> Self {
        Value::Time(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Time(v.fixed_offset())
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(v: BTreeMap<String, Value>) -> Self {
        Value::Map(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nested() -> Type {
        let inner = Type::structure("Inner").field("B", Type::int()).build();
        Type::structure("Outer")
            .field("A", Type::pointer(inner))
            .field("C", Type::string())
            .build()
    }

    #[test]
    fn test_zero_time_is_year_one() {
        assert_eq!(zero_time().to_rfc3339(), "0001-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_field_by_index_through_absent_pointer() {
        let ty = nested();
        let v = ty.zero();

        assert_eq!(v.field_by_index(&[1]), Some(&Value::String(String::new())));
        assert_eq!(v.field_by_index(&[0, 0]), None);
    }

    #[test]
    fn test_field_by_index_mut_allocates() {
        let ty = nested();
        let mut v = ty.zero();

        *v.field_by_index_mut(&ty, &[0, 0]).unwrap() = Value::Int(7);

        assert_eq!(
            v,
            Value::Struct(vec![
                Value::Struct(vec![Value::Int(7)]),
                Value::String(String::new()),
            ])
        );
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::String("x".into()));
    }
}
