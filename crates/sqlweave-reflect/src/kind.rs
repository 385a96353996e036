//! Type categories.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The category of a [`Type`](crate::Type).
///
/// Codecs fall back to a kind-level routine when no routine is registered for
/// the exact type, so every type maps to exactly one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Kind {
    Bool,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
    String,
    Struct,
    Array,
    Slice,
    Map,
    Pointer,
    Interface,
}

impl Kind {
    /// Every kind, in declaration order.
    pub const ALL: [Kind; 20] = [
        Kind::Bool,
        Kind::Int,
        Kind::Int8,
        Kind::Int16,
        Kind::Int32,
        Kind::Int64,
        Kind::Uint,
        Kind::Uint8,
        Kind::Uint16,
        Kind::Uint32,
        Kind::Uint64,
        Kind::Float32,
        Kind::Float64,
        Kind::String,
        Kind::Struct,
        Kind::Array,
        Kind::Slice,
        Kind::Map,
        Kind::Pointer,
        Kind::Interface,
    ];

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            Kind::Int | Kind::Int8 | Kind::Int16 | Kind::Int32 | Kind::Int64
        )
    }

    pub fn is_unsigned(self) -> bool {
        matches!(
            self,
            Kind::Uint | Kind::Uint8 | Kind::Uint16 | Kind::Uint32 | Kind::Uint64
        )
    }

    pub fn is_float(self) -> bool {
        matches!(self, Kind::Float32 | Kind::Float64)
    }

    /// Bit width of numeric kinds, `None` otherwise.
    ///
    /// The platform-sized `Int`/`Uint` kinds are treated as 64 bits.
    pub fn bits(self) -> Option<u32> {
        match self {
            Kind::Int8 | Kind::Uint8 => Some(8),
            Kind::Int16 | Kind::Uint16 => Some(16),
            Kind::Int32 | Kind::Uint32 | Kind::Float32 => Some(32),
            Kind::Int | Kind::Int64 | Kind::Uint | Kind::Uint64 | Kind::Float64 => Some(64),
            _ => None,
        }
    }

    /// Whether a zero value of this kind is "absent" rather than a concrete value.
    pub fn is_nullable(self) -> bool {
        matches!(
            self,
            Kind::Pointer | Kind::Slice | Kind::Map | Kind::Interface
        )
    }

    /// Signed range check for a value headed into this kind.
    pub fn overflows_int(self, v: i64) -> bool {
        match self.bits() {
            Some(bits) if self.is_signed() && bits < 64 => {
                let min = -(1i64 << (bits - 1));
                let max = (1i64 << (bits - 1)) - 1;
                v < min || v > max
            }
            _ => false,
        }
    }

    /// Unsigned range check for a value headed into this kind.
    pub fn overflows_uint(self, v: u64) -> bool {
        match self.bits() {
            Some(bits) if self.is_unsigned() && bits < 64 => v > (1u64 << bits) - 1,
            _ => false,
        }
    }

    /// Float range check; only `Float32` can overflow.
    pub fn overflows_float(self, v: f64) -> bool {
        self == Kind::Float32 && v.is_finite() && (v as f32).is_infinite()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Int8 => "int8",
            Kind::Int16 => "int16",
            Kind::Int32 => "int32",
            Kind::Int64 => "int64",
            Kind::Uint => "uint",
            Kind::Uint8 => "uint8",
            Kind::Uint16 => "uint16",
            Kind::Uint32 => "uint32",
            Kind::Uint64 => "uint64",
            Kind::Float32 => "float32",
            Kind::Float64 => "float64",
            Kind::String => "string",
            Kind::Struct => "struct",
            Kind::Array => "array",
            Kind::Slice => "slice",
            Kind::Map => "map",
            Kind::Pointer => "ptr",
            Kind::Interface => "interface",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Kind::Int8, 127, false)]
    #[test_case(Kind::Int8, 128, true)]
    #[test_case(Kind::Int8, -128, false)]
    #[test_case(Kind::Int8, -129, true)]
    #[test_case(Kind::Int16, 40_000, true)]
    #[test_case(Kind::Int32, i64::from(i32::MAX), false)]
    #[test_case(Kind::Int64, i64::MAX, false)]
    fn test_overflows_int(kind: Kind, v: i64, expected: bool) {
        assert_eq!(kind.overflows_int(v), expected);
    }

    #[test_case(Kind::Uint8, 255, false)]
    #[test_case(Kind::Uint8, 256, true)]
    #[test_case(Kind::Uint16, 65_536, true)]
    #[test_case(Kind::Uint64, u64::MAX, false)]
    fn test_overflows_uint(kind: Kind, v: u64, expected: bool) {
        assert_eq!(kind.overflows_uint(v), expected);
    }

    #[test]
    fn test_float32_overflow() {
        assert!(Kind::Float32.overflows_float(1e39));
        assert!(!Kind::Float32.overflows_float(1e38));
        assert!(!Kind::Float64.overflows_float(1e300));
    }
}
