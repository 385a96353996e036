use super::SqlCodec;
use crate::error::{CodecError, CodecResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use sqlweave_reflect::{zero_time, Kind, Type, Value};
use std::borrow::Cow;

/// Text form of a column the driver returned as string or bytes.
fn text(v: &Value) -> Option<Cow<'_, str>> {
    match v {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Bytes(b) => Some(String::from_utf8_lossy(b)),
        _ => None,
    }
}

fn parse_integer(ty: &Type, s: &str) -> CodecResult<i128> {
    s.trim()
        .parse::<i128>()
        .map_err(|_| CodecError::mismatch(ty, format!("text {:?}", s)))
}

pub(super) fn decode_bytes(_: &SqlCodec, ty: &Type, raw: Value) -> CodecResult<Value> {
    match raw {
        Value::Null | Value::Bytes(_) => Ok(raw),
        Value::String(s) => Ok(Value::Bytes(s.into_bytes())),
        other => Err(CodecError::mismatch(ty, other.type_name())),
    }
}

pub(super) fn decode_time(_: &SqlCodec, ty: &Type, raw: Value) -> CodecResult<Value> {
    match raw {
        Value::Null => return Ok(Value::Time(zero_time())),
        Value::Time(t) => return Ok(Value::Time(t)),
        _ => {}
    }
    let s = text(&raw).ok_or_else(|| CodecError::mismatch(ty, raw.type_name()))?;
    let s = s.trim();

    if let Ok(t) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Ok(Value::Time(t.and_utc().fixed_offset()));
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(Value::Time(d.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc().fixed_offset()));
    }
    Ok(Value::Time(DateTime::parse_from_rfc3339(s)?))
}

pub(super) fn decode_raw_json(_: &SqlCodec, ty: &Type, raw: Value) -> CodecResult<Value> {
    match raw {
        Value::Null => Ok(Value::Null),
        Value::Bytes(b) => Ok(Value::Bytes(crate::jsonb::compact(&b))),
        Value::String(s) => Ok(Value::Bytes(crate::jsonb::compact(s.as_bytes()))),
        other => Err(CodecError::mismatch(ty, other.type_name())),
    }
}

/// Containers stored as JSON text.
pub(super) fn decode_json(codec: &SqlCodec, ty: &Type, raw: Value) -> CodecResult<Value> {
    let bytes = match raw {
        Value::Null => return Ok(ty.zero()),
        Value::Bytes(b) => b,
        Value::String(s) => s.into_bytes(),
        other => return Err(CodecError::mismatch(ty, other.type_name())),
    };
    if bytes.is_empty() {
        return Ok(ty.zero());
    }
    codec.json().decode_value(&bytes, ty)
}

pub(super) fn decode_string(_: &SqlCodec, ty: &Type, raw: Value) -> CodecResult<Value> {
    match raw {
        Value::Null => Ok(Value::String(String::new())),
        Value::String(_) => Ok(raw),
        Value::Bytes(b) => Ok(Value::String(String::from_utf8_lossy(&b).into_owned())),
        Value::Int(n) => Ok(Value::String(n.to_string())),
        Value::Uint(n) => Ok(Value::String(n.to_string())),
        Value::Float(f) => Ok(Value::String(f.to_string())),
        other => Err(CodecError::mismatch(ty, other.type_name())),
    }
}

pub(super) fn decode_bool(_: &SqlCodec, ty: &Type, raw: Value) -> CodecResult<Value> {
    match &raw {
        Value::Null => Ok(Value::Bool(false)),
        Value::Bool(b) => Ok(Value::Bool(*b)),
        Value::Int(n) => Ok(Value::Bool(*n != 0)),
        Value::Uint(n) => Ok(Value::Bool(*n != 0)),
        other => match text(other).as_deref().map(str::trim) {
            Some("1") | Some("true") | Some("TRUE") => Ok(Value::Bool(true)),
            Some("0") | Some("false") | Some("FALSE") | Some("") => Ok(Value::Bool(false)),
            _ => Err(CodecError::mismatch(ty, other.type_name())),
        },
    }
}

fn wide_integer(ty: &Type, raw: &Value) -> CodecResult<Option<i128>> {
    match raw {
        Value::Null => Ok(None),
        Value::Int(n) => Ok(Some(*n as i128)),
        Value::Uint(n) => Ok(Some(*n as i128)),
        Value::Bool(b) => Ok(Some(*b as i128)),
        other => match text(other) {
            Some(s) => parse_integer(ty, &s).map(Some),
            None => Err(CodecError::mismatch(ty, other.type_name())),
        },
    }
}

pub(super) fn decode_int(_: &SqlCodec, ty: &Type, raw: Value) -> CodecResult<Value> {
    let Some(n) = wide_integer(ty, &raw)? else {
        return Ok(Value::Int(0));
    };
    let overflow = || CodecError::Overflow {
        value: n.to_string(),
        target: ty.id().to_string(),
    };
    let n = i64::try_from(n).map_err(|_| overflow())?;
    if ty.kind().overflows_int(n) {
        return Err(overflow());
    }
    Ok(Value::Int(n))
}

pub(super) fn decode_uint(_: &SqlCodec, ty: &Type, raw: Value) -> CodecResult<Value> {
    let Some(n) = wide_integer(ty, &raw)? else {
        return Ok(Value::Uint(0));
    };
    if n < 0 {
        return Err(CodecError::InvalidSign {
            value: n.to_string(),
            target: ty.id().to_string(),
        });
    }
    let overflow = || CodecError::Overflow {
        value: n.to_string(),
        target: ty.id().to_string(),
    };
    let n = u64::try_from(n).map_err(|_| overflow())?;
    if ty.kind().overflows_uint(n) {
        return Err(overflow());
    }
    Ok(Value::Uint(n))
}

pub(super) fn decode_float(_: &SqlCodec, ty: &Type, raw: Value) -> CodecResult<Value> {
    let f = match &raw {
        Value::Null => 0.0,
        Value::Float(f) => *f,
        Value::Int(n) => *n as f64,
        Value::Uint(n) => *n as f64,
        other => {
            let s = text(other).ok_or_else(|| CodecError::mismatch(ty, other.type_name()))?;
            let s = s.trim();
            let f = s
                .parse::<f64>()
                .map_err(|_| CodecError::mismatch(ty, format!("text {:?}", s)))?;
            // A numeric literal past the f64 range, as opposed to "inf".
            if f.is_infinite() && s.bytes().any(|b| b.is_ascii_digit()) {
                return Err(CodecError::Overflow {
                    value: s.to_string(),
                    target: ty.id().to_string(),
                });
            }
            f
        }
    };
    if ty.kind().overflows_float(f) {
        return Err(CodecError::Overflow {
            value: f.to_string(),
            target: ty.id().to_string(),
        });
    }
    Ok(match ty.kind() {
        Kind::Float32 => Value::Float(f as f32 as f64),
        _ => Value::Float(f),
    })
}

pub(super) fn decode_pointer(codec: &SqlCodec, ty: &Type, raw: Value) -> CodecResult<Value> {
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let elem = ty
        .elem()
        .ok_or_else(|| CodecError::UnsupportedType(ty.id().to_string()))?;
    codec.decode_column(elem, raw)
}

pub(super) fn decode_interface(_: &SqlCodec, _: &Type, raw: Value) -> CodecResult<Value> {
    Ok(match raw {
        Value::Bytes(b) => match String::from_utf8(b) {
            Ok(s) => Value::String(s),
            Err(e) => Value::Bytes(e.into_bytes()),
        },
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jsonb::JsonCodec;
    use sqlweave_reflect::Mapper;
    use std::sync::Arc;
    use test_case::test_case;

    fn codec() -> SqlCodec {
        SqlCodec::new(Arc::new(JsonCodec::new(Arc::new(Mapper::default()))))
    }

    #[test_case(Value::Bytes(b"2021-06-07 08:09:10.250000".to_vec()) ; "datetime text")]
    #[test_case(Value::from("2021-06-07T08:09:10.25Z") ; "rfc3339")]
    fn test_decode_time_text(raw: Value) {
        let value = codec().decode_column(&Type::time(), raw).unwrap();
        match value {
            Value::Time(t) => {
                assert_eq!(t.timestamp_subsec_millis(), 250);
                assert_eq!(t.to_rfc3339(), "2021-06-07T08:09:10.250+00:00");
            }
            other => panic!("expected time, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_date_only() {
        let value = codec()
            .decode_column(&Type::time(), Value::from("2021-06-07"))
            .unwrap();
        assert!(matches!(value, Value::Time(t) if t.to_rfc3339() == "2021-06-07T00:00:00+00:00"));
    }

    #[test_case(Type::int8(), Value::Int(300) ; "int8 from int")]
    #[test_case(Type::uint8(), Value::from("256") ; "uint8 from text")]
    #[test_case(Type::int64(), Value::Uint(u64::MAX) ; "int64 from max uint")]
    #[test_case(Type::float64(), Value::from("1e400") ; "float64 from text")]
    #[test_case(Type::float64(), Value::Bytes(b"-1e400".to_vec()) ; "float64 from negative bytes")]
    #[test_case(Type::float32(), Value::from("3.5e38") ; "float32 from text")]
    fn test_decode_overflow(ty: Type, raw: Value) {
        assert!(matches!(
            codec().decode_column(&ty, raw),
            Err(CodecError::Overflow { .. })
        ));
    }

    #[test]
    fn test_decode_negative_unsigned() {
        assert!(matches!(
            codec().decode_column(&Type::uint32(), Value::Int(-1)),
            Err(CodecError::InvalidSign { .. })
        ));
    }

    #[test]
    fn test_decode_bool_forms() {
        let codec = codec();
        assert_eq!(codec.decode_column(&Type::bool(), Value::Int(1)).unwrap(), Value::Bool(true));
        assert_eq!(
            codec
                .decode_column(&Type::bool(), Value::Bytes(b"0".to_vec()))
                .unwrap(),
            Value::Bool(false)
        );
        assert!(codec.decode_column(&Type::bool(), Value::from("maybe")).is_err());
    }

    #[test]
    fn test_decode_pointer_and_null() {
        let codec = codec();
        let ty = Type::pointer(Type::int());
        assert_eq!(codec.decode_column(&ty, Value::Null).unwrap(), Value::Null);
        assert_eq!(
            codec.decode_column(&ty, Value::from("12")).unwrap(),
            Value::Int(12)
        );
    }
}
