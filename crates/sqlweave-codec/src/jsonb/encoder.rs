use super::{compact, JsonCodec, Writer};
use crate::error::{CodecError, CodecResult};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, FixedOffset, Timelike, Utc};
use sqlweave_reflect::{zero_time, Kind, Type, Value};

/// RFC 3339 in UTC with nanoseconds, trailing zeros trimmed.
pub(crate) fn format_time(t: &DateTime<FixedOffset>) -> String {
    let utc = t.with_timezone(&Utc);
    let mut out = utc.format("%Y-%m-%dT%H:%M:%S").to_string();
    let nanos = utc.nanosecond() % 1_000_000_000;
    if nanos > 0 {
        let frac = format!("{:09}", nanos);
        out.push('.');
        out.push_str(frac.trim_end_matches('0'));
    }
    out.push('Z');
    out
}

/// Scientific notation with the shortest round-tripping mantissa.
///
/// In legacy mode every non-positive value renders as `0`.
pub(crate) fn format_float(ty: &Type, v: f64, legacy: bool) -> CodecResult<String> {
    if !v.is_finite() {
        return Err(CodecError::mismatch(ty, v.to_string()));
    }
    if v == 0.0 || (legacy && v < 0.0) {
        return Ok("0".to_string());
    }
    Ok(match ty.kind() {
        Kind::Float32 => format!("{:E}", v as f32),
        _ => format!("{:E}", v),
    })
}

pub(super) fn encode_bytes(_: &JsonCodec, w: &mut Writer, ty: &Type, v: &Value) -> CodecResult<()> {
    match v {
        Value::Null => w.write_null(),
        Value::Bytes(b) => {
            w.write_byte(b'"');
            w.write_str(&STANDARD.encode(b));
            w.write_byte(b'"');
        }
        other => return Err(CodecError::mismatch(ty, other.type_name())),
    }
    Ok(())
}

pub(super) fn encode_raw_json(
    _: &JsonCodec,
    w: &mut Writer,
    ty: &Type,
    v: &Value,
) -> CodecResult<()> {
    let raw = match v {
        Value::Null => {
            w.write_null();
            return Ok(());
        }
        Value::Bytes(b) => b.as_slice(),
        Value::String(s) => s.as_bytes(),
        other => return Err(CodecError::mismatch(ty, other.type_name())),
    };
    let compacted = compact(raw);
    if compacted.is_empty() {
        w.write_bytes(b"{}");
    } else {
        w.write_bytes(&compacted);
    }
    Ok(())
}

pub(super) fn encode_time(_: &JsonCodec, w: &mut Writer, ty: &Type, v: &Value) -> CodecResult<()> {
    let text = match v {
        Value::Time(t) => format_time(t),
        Value::Null => format_time(&zero_time()),
        other => return Err(CodecError::mismatch(ty, other.type_name())),
    };
    w.write_byte(b'"');
    w.write_str(&text);
    w.write_byte(b'"');
    Ok(())
}

pub(super) fn encode_string(_: &JsonCodec, w: &mut Writer, ty: &Type, v: &Value) -> CodecResult<()> {
    match v {
        Value::String(s) => w.write_quoted(s),
        other => return Err(CodecError::mismatch(ty, other.type_name())),
    }
    Ok(())
}

pub(super) fn encode_bool(_: &JsonCodec, w: &mut Writer, ty: &Type, v: &Value) -> CodecResult<()> {
    match v {
        Value::Bool(b) => w.write_str(if *b { "true" } else { "false" }),
        other => return Err(CodecError::mismatch(ty, other.type_name())),
    }
    Ok(())
}

pub(super) fn encode_int(_: &JsonCodec, w: &mut Writer, ty: &Type, v: &Value) -> CodecResult<()> {
    let n = v
        .as_i64()
        .ok_or_else(|| CodecError::mismatch(ty, v.type_name()))?;
    w.write_str(&n.to_string());
    Ok(())
}

pub(super) fn encode_uint(_: &JsonCodec, w: &mut Writer, ty: &Type, v: &Value) -> CodecResult<()> {
    let n = v
        .as_u64()
        .ok_or_else(|| CodecError::mismatch(ty, v.type_name()))?;
    w.write_str(&n.to_string());
    Ok(())
}

pub(super) fn encode_float(
    codec: &JsonCodec,
    w: &mut Writer,
    ty: &Type,
    v: &Value,
) -> CodecResult<()> {
    let f = v
        .as_f64()
        .ok_or_else(|| CodecError::mismatch(ty, v.type_name()))?;
    w.write_str(&format_float(ty, f, codec.is_legacy_float())?);
    Ok(())
}

pub(super) fn encode_pointer(
    codec: &JsonCodec,
    w: &mut Writer,
    ty: &Type,
    v: &Value,
) -> CodecResult<()> {
    if v.is_null() {
        w.write_null();
        return Ok(());
    }
    let elem = ty
        .elem()
        .ok_or_else(|| CodecError::UnsupportedType(ty.id().to_string()))?;
    codec.encode_to(w, elem, v)
}

pub(super) fn encode_struct(
    codec: &JsonCodec,
    w: &mut Writer,
    ty: &Type,
    v: &Value,
) -> CodecResult<()> {
    let zero;
    let value = match v {
        Value::Struct(_) => v,
        Value::Null => {
            zero = ty.zero();
            &zero
        }
        other => return Err(CodecError::mismatch(ty, other.type_name())),
    };

    let index = codec.mapper().codec_by_type(ty);
    w.write_byte(b'{');
    for (i, field) in index.name_fields().enumerate() {
        if i > 0 {
            w.write_byte(b',');
        }
        w.write_quoted(field.path());
        w.write_byte(b':');
        let fv = value
            .field_by_index(field.index())
            .unwrap_or_else(|| field.zero());
        codec.encode_to(w, field.ty(), fv)?;
    }
    w.write_byte(b'}');
    Ok(())
}

pub(super) fn encode_array(
    codec: &JsonCodec,
    w: &mut Writer,
    ty: &Type,
    v: &Value,
) -> CodecResult<()> {
    let elem = ty
        .elem()
        .ok_or_else(|| CodecError::UnsupportedType(ty.id().to_string()))?;

    match v {
        Value::Null if ty.kind() == Kind::Slice => {
            w.write_null();
            Ok(())
        }
        Value::Null => encode_array(codec, w, ty, &ty.zero()),
        Value::List(items) => {
            let encoder = codec.registry().lookup_encoder(elem)?;
            w.write_byte(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    w.write_byte(b',');
                }
                encoder(codec, w, elem, item)?;
            }
            w.write_byte(b']');
            Ok(())
        }
        Value::Bytes(bytes) => {
            w.write_byte(b'[');
            for (i, b) in bytes.iter().enumerate() {
                if i > 0 {
                    w.write_byte(b',');
                }
                w.write_str(&b.to_string());
            }
            w.write_byte(b']');
            Ok(())
        }
        other => Err(CodecError::mismatch(ty, other.type_name())),
    }
}

pub(super) fn encode_map(codec: &JsonCodec, w: &mut Writer, ty: &Type, v: &Value) -> CodecResult<()> {
    let entries = match v {
        Value::Null => {
            w.write_null();
            return Ok(());
        }
        Value::Map(entries) => entries,
        other => return Err(CodecError::mismatch(ty, other.type_name())),
    };
    let elem = ty
        .elem()
        .ok_or_else(|| CodecError::UnsupportedType(ty.id().to_string()))?;
    let encoder = codec.registry().lookup_encoder(elem)?;

    w.write_byte(b'{');
    for (i, (key, item)) in entries.iter().enumerate() {
        if i > 0 {
            w.write_byte(b',');
        }
        w.write_quoted(key);
        w.write_byte(b':');
        encoder(codec, w, elem, item)?;
    }
    w.write_byte(b'}');
    Ok(())
}

pub(super) fn encode_interface(
    codec: &JsonCodec,
    w: &mut Writer,
    _: &Type,
    v: &Value,
) -> CodecResult<()> {
    encode_dynamic(codec, w, v)
}

/// Encode a value by its own shape, without a declared type.
fn encode_dynamic(codec: &JsonCodec, w: &mut Writer, v: &Value) -> CodecResult<()> {
    match v {
        Value::Null => w.write_null(),
        Value::Bool(b) => w.write_str(if *b { "true" } else { "false" }),
        Value::Int(n) => w.write_str(&n.to_string()),
        Value::Uint(n) => w.write_str(&n.to_string()),
        Value::Float(f) => {
            w.write_str(&format_float(&Type::float64(), *f, codec.is_legacy_float())?)
        }
        Value::String(s) => w.write_quoted(s),
        Value::Bytes(b) => {
            w.write_byte(b'"');
            w.write_str(&STANDARD.encode(b));
            w.write_byte(b'"');
        }
        Value::Time(t) => {
            w.write_byte(b'"');
            w.write_str(&format_time(t));
            w.write_byte(b'"');
        }
        Value::List(items) | Value::Struct(items) => {
            w.write_byte(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    w.write_byte(b',');
                }
                encode_dynamic(codec, w, item)?;
            }
            w.write_byte(b']');
        }
        Value::Map(entries) => {
            w.write_byte(b'{');
            for (i, (key, item)) in entries.iter().enumerate() {
                if i > 0 {
                    w.write_byte(b',');
                }
                w.write_quoted(key);
                w.write_byte(b':');
                encode_dynamic(codec, w, item)?;
            }
            w.write_byte(b'}');
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sqlweave_reflect::Mapper;
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use test_case::test_case;

    fn encode(ty: &Type, v: Value) -> String {
        let codec = JsonCodec::new(Arc::new(Mapper::default()));
        String::from_utf8(codec.encode(ty, &v).unwrap()).unwrap()
    }

    #[test_case(0.0 => "0" ; "zero")]
    #[test_case(-0.0 => "0" ; "negative zero")]
    #[test_case(1.5 => "1.5E0" ; "positive")]
    #[test_case(-0.0025 => "-2.5E-3" ; "negative")]
    #[test_case(100.0 => "1E2" ; "integral")]
    fn test_float_format(v: f64) -> String {
        format_float(&Type::float64(), v, false).unwrap()
    }

    #[test]
    fn test_legacy_float_clamps_non_positive() {
        assert_eq!(format_float(&Type::float64(), -2.5, true).unwrap(), "0");
        assert_eq!(format_float(&Type::float64(), 2.5, true).unwrap(), "2.5E0");
    }

    #[test]
    fn test_float32_uses_single_precision_digits() {
        assert_eq!(
            format_float(&Type::float32(), 0.1f32 as f64, false).unwrap(),
            "1E-1"
        );
    }

    #[test]
    fn test_non_finite_float_is_rejected() {
        assert!(format_float(&Type::float64(), f64::NAN, false).is_err());
    }

    #[test]
    fn test_time_is_utc_with_trimmed_nanos() {
        let offset = FixedOffset::east_opt(8 * 3600).unwrap();
        let t = offset
            .with_ymd_and_hms(2020, 1, 2, 11, 4, 5)
            .unwrap()
            .with_nanosecond(120_000_000)
            .unwrap();

        assert_eq!(format_time(&t), "2020-01-02T03:04:05.12Z");
        assert_eq!(
            format_time(&zero_time()),
            "0001-01-01T00:00:00Z"
        );
    }

    #[test]
    fn test_bytes_and_raw_json() {
        assert_eq!(encode(&Type::bytes(), Value::Bytes(b"hi".to_vec())), r#""aGk=""#);
        assert_eq!(encode(&Type::bytes(), Value::Null), "null");
        assert_eq!(
            encode(&Type::raw_json(), Value::Bytes(br#"{ "a" : [1, 2] }"#.to_vec())),
            r#"{"a":[1,2]}"#
        );
        assert_eq!(encode(&Type::raw_json(), Value::Bytes(Vec::new())), "{}");
        assert_eq!(encode(&Type::raw_json(), Value::Null), "null");
    }

    #[test]
    fn test_slice_null_but_array_zero() {
        assert_eq!(encode(&Type::slice(Type::int()), Value::Null), "null");
        assert_eq!(encode(&Type::array(Type::int(), 2), Value::Null), "[0,0]");
        assert_eq!(
            encode(
                &Type::slice(Type::string()),
                Value::List(vec!["a".into(), "b\"".into()])
            ),
            r#"["a","b\""]"#
        );
    }

    #[test]
    fn test_struct_with_embedded_and_pointer() {
        let audit = Type::structure("Audit").field("By", Type::string()).build();
        let inner = Type::structure("Inner").field("B", Type::int()).build();
        let ty = Type::structure("Outer")
            .embed(audit)
            .field("P", Type::pointer(inner))
            .field("Ok", Type::bool())
            .build();

        assert_eq!(encode(&ty, ty.zero()), r#"{"By":"","P":null,"Ok":false}"#);
        assert_eq!(
            encode(
                &ty,
                Value::Struct(vec![
                    Value::Struct(vec!["x".into()]),
                    Value::Struct(vec![Value::Int(2)]),
                    Value::Bool(true),
                ])
            ),
            r#"{"By":"x","P":{"B":2},"Ok":true}"#
        );
    }

    #[test]
    fn test_interface_encodes_dynamic_shape() {
        let mut map = BTreeMap::new();
        map.insert("z".to_string(), Value::Int(1));
        map.insert("a".to_string(), Value::List(vec![Value::Null, Value::Bool(true)]));

        assert_eq!(encode(&Type::interface(), Value::Map(map)), r#"{"a":[null,true],"z":1}"#);
        assert_eq!(encode(&Type::interface(), Value::Null), "null");
    }

    #[test]
    fn test_mismatched_value_is_reported() {
        let codec = JsonCodec::new(Arc::new(Mapper::default()));
        assert!(matches!(
            codec.encode(&Type::int(), &Value::from("x")),
            Err(CodecError::ValueMismatch { .. })
        ));
    }
}
