use super::{JsonCodec, JsonType, Reader};
use crate::error::{CodecError, CodecResult};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::DateTime;
use sqlweave_reflect::{zero_time, FieldIndex, Kind, Type, Value};
use std::collections::BTreeMap;

pub(super) fn decode_bytes(
    _: &JsonCodec,
    r: &mut Reader<'_>,
    _: &Type,
    dest: &mut Value,
) -> CodecResult<()> {
    if r.read_null()? {
        *dest = Value::Null;
        return Ok(());
    }
    let text = r.read_string()?;
    let bytes = if text.is_empty() {
        Vec::new()
    } else {
        STANDARD.decode(text)?
    };
    *dest = Value::Bytes(bytes);
    Ok(())
}

pub(super) fn decode_time(
    _: &JsonCodec,
    r: &mut Reader<'_>,
    _: &Type,
    dest: &mut Value,
) -> CodecResult<()> {
    if r.read_null()? {
        *dest = Value::Time(zero_time());
        return Ok(());
    }
    let text = r.read_string()?;
    *dest = Value::Time(DateTime::parse_from_rfc3339(&text)?);
    Ok(())
}

pub(super) fn decode_raw_json(
    _: &JsonCodec,
    r: &mut Reader<'_>,
    _: &Type,
    dest: &mut Value,
) -> CodecResult<()> {
    *dest = Value::Bytes(r.read_bytes()?);
    Ok(())
}

pub(super) fn decode_string(
    _: &JsonCodec,
    r: &mut Reader<'_>,
    _: &Type,
    dest: &mut Value,
) -> CodecResult<()> {
    *dest = Value::String(r.read_string()?);
    Ok(())
}

pub(super) fn decode_bool(
    _: &JsonCodec,
    r: &mut Reader<'_>,
    _: &Type,
    dest: &mut Value,
) -> CodecResult<()> {
    *dest = Value::Bool(r.read_boolean()?);
    Ok(())
}

pub(super) fn decode_int(
    _: &JsonCodec,
    r: &mut Reader<'_>,
    ty: &Type,
    dest: &mut Value,
) -> CodecResult<()> {
    let n = r.read_integer()?;
    let overflow = || CodecError::Overflow {
        value: n.to_string(),
        target: ty.id().to_string(),
    };
    let n = i64::try_from(n).map_err(|_| overflow())?;
    if ty.kind().overflows_int(n) {
        return Err(overflow());
    }
    *dest = Value::Int(n);
    Ok(())
}

pub(super) fn decode_uint(
    _: &JsonCodec,
    r: &mut Reader<'_>,
    ty: &Type,
    dest: &mut Value,
) -> CodecResult<()> {
    let n = r.read_integer()?;
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
    *dest = Value::Uint(n);
    Ok(())
}

pub(super) fn decode_float(
    _: &JsonCodec,
    r: &mut Reader<'_>,
    ty: &Type,
    dest: &mut Value,
) -> CodecResult<()> {
    let overflow = |value: &str| CodecError::Overflow {
        value: value.to_string(),
        target: ty.id().to_string(),
    };
    let (span, f) = r.read_float_literal().map_err(|e| match e {
        CodecError::Overflow { value, .. } => overflow(&value),
        other => other,
    })?;
    if ty.kind().overflows_float(f) {
        return Err(overflow(span));
    }
    *dest = match ty.kind() {
        Kind::Float32 => Value::Float(f as f32 as f64),
        _ => Value::Float(f),
    };
    Ok(())
}

pub(super) fn decode_struct(
    codec: &JsonCodec,
    r: &mut Reader<'_>,
    ty: &Type,
    dest: &mut Value,
) -> CodecResult<()> {
    if r.read_null()? {
        *dest = ty.zero();
        return Ok(());
    }
    if !matches!(dest, Value::Struct(_)) {
        *dest = ty.zero();
    }
    let index = codec.mapper().codec_by_type(ty);
    decode_members(codec, r, ty, &index, dest, "")
}

/// Bind object members to fields by external name. Unknown keys holding an
/// object are descended as a dotted prefix; other unknown keys are skipped.
fn decode_members(
    codec: &JsonCodec,
    r: &mut Reader<'_>,
    ty: &Type,
    index: &FieldIndex,
    dest: &mut Value,
    prefix: &str,
) -> CodecResult<()> {
    r.read_object(|it, key| {
        let path = if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", prefix, key)
        };

        if let Some(field) = index.lookup_by_name(&path) {
            let slot = dest
                .field_by_index_mut(ty, field.index())
                .ok_or_else(|| CodecError::mismatch(ty, format!("no slot for {}", path)))?;
            return codec.decode_from(it, field.ty(), slot);
        }
        if it.peek_type() == JsonType::Object {
            return decode_members(codec, it, ty, index, dest, &path);
        }
        it.skip()
    })
}

pub(super) fn decode_array(
    codec: &JsonCodec,
    r: &mut Reader<'_>,
    ty: &Type,
    dest: &mut Value,
) -> CodecResult<()> {
    if r.read_null()? {
        *dest = ty.zero();
        return Ok(());
    }
    let elem = ty
        .elem()
        .ok_or_else(|| CodecError::UnsupportedType(ty.id().to_string()))?;
    let decoder = codec.registry().lookup_decoder(elem)?;

    let mut items = Vec::new();
    r.read_array(|it| {
        let mut item = elem.zero();
        decoder(codec, it, elem, &mut item)?;
        items.push(item);
        Ok(())
    })?;

    if ty.kind() == Kind::Array {
        items.truncate(ty.len());
        while items.len() < ty.len() {
            items.push(elem.zero());
        }
    }
    *dest = Value::List(items);
    Ok(())
}

pub(super) fn decode_map(
    codec: &JsonCodec,
    r: &mut Reader<'_>,
    ty: &Type,
    dest: &mut Value,
) -> CodecResult<()> {
    if r.read_null()? {
        *dest = Value::Null;
        return Ok(());
    }
    let key_kind = ty.key().map(Type::kind);
    if key_kind != Some(Kind::String) {
        return Err(CodecError::UnsupportedType(ty.id().to_string()));
    }
    let elem = ty
        .elem()
        .ok_or_else(|| CodecError::UnsupportedType(ty.id().to_string()))?;
    let decoder = codec.registry().lookup_decoder(elem)?;

    let mut entries = BTreeMap::new();
    r.read_object(|it, key| {
        let mut item = elem.zero();
        decoder(codec, it, elem, &mut item)?;
        entries.insert(key.to_string(), item);
        Ok(())
    })?;
    *dest = Value::Map(entries);
    Ok(())
}

pub(super) fn decode_pointer(
    codec: &JsonCodec,
    r: &mut Reader<'_>,
    ty: &Type,
    dest: &mut Value,
) -> CodecResult<()> {
    if r.read_null()? {
        *dest = Value::Null;
        return Ok(());
    }
    let elem = ty
        .elem()
        .ok_or_else(|| CodecError::UnsupportedType(ty.id().to_string()))?;
    if dest.is_null() {
        *dest = elem.zero();
    }
    codec.decode_from(r, elem, dest)
}

pub(super) fn decode_interface(
    _: &JsonCodec,
    r: &mut Reader<'_>,
    _: &Type,
    dest: &mut Value,
) -> CodecResult<()> {
    *dest = r.read_value()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlweave_reflect::Mapper;
    use std::sync::Arc;
    use test_case::test_case;

    fn decode(ty: &Type, input: &str) -> CodecResult<Value> {
        JsonCodec::new(Arc::new(Mapper::default())).decode_value(input.as_bytes(), ty)
    }

    #[test_case(Type::int8(), "300" ; "int8")]
    #[test_case(Type::uint8(), "256" ; "uint8")]
    #[test_case(Type::int16(), "-40000" ; "int16")]
    #[test_case(Type::int64(), "9223372036854775808" ; "int64")]
    #[test_case(Type::uint64(), "18446744073709551616" ; "uint64")]
    #[test_case(Type::float32(), "1e39" ; "float32")]
    #[test_case(Type::float64(), "1e400" ; "float64")]
    #[test_case(Type::float64(), "-1e400" ; "negative float64")]
    #[test_case(Type::float32(), "1e400" ; "float32 beyond f64")]
    fn test_overflow(ty: Type, input: &str) {
        assert!(matches!(decode(&ty, input), Err(CodecError::Overflow { .. })));
    }

    #[test]
    fn test_float64_overflow_names_the_literal() {
        assert!(matches!(
            decode(&Type::float64(), "-1e400"),
            Err(CodecError::Overflow { value, target }) if value == "-1e400" && target == "float64"
        ));
    }

    #[test]
    fn test_malformed_literals() {
        assert!(matches!(
            decode(&Type::int(), "01"),
            Err(CodecError::MalformedInput { .. })
        ));
        assert!(matches!(
            decode(&Type::string(), r#""\u+041""#),
            Err(CodecError::MalformedInput { .. })
        ));
    }

    #[test_case(Type::uint(), "-1" ; "uint")]
    #[test_case(Type::uint16(), "-300" ; "uint16")]
    fn test_invalid_sign(ty: Type, input: &str) {
        assert!(matches!(decode(&ty, input), Err(CodecError::InvalidSign { .. })));
    }

    #[test]
    fn test_bool_rejects_other_tokens() {
        assert!(matches!(
            decode(&Type::bool(), "1"),
            Err(CodecError::MalformedInput { .. })
        ));
        assert_eq!(decode(&Type::bool(), " false ").unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_bytes_null_and_empty() {
        assert_eq!(decode(&Type::bytes(), "null").unwrap(), Value::Null);
        assert_eq!(decode(&Type::bytes(), r#""""#).unwrap(), Value::Bytes(Vec::new()));
        assert_eq!(decode(&Type::bytes(), r#""aGk=""#).unwrap(), Value::Bytes(b"hi".to_vec()));
        assert!(matches!(
            decode(&Type::bytes(), r#""***""#),
            Err(CodecError::Base64(_))
        ));
    }

    #[test]
    fn test_time_null_is_zero_and_offsets_parse() {
        assert_eq!(decode(&Type::time(), "null").unwrap(), Value::Time(zero_time()));

        let value = decode(&Type::time(), r#""2020-01-02T03:04:05.5+08:00""#).unwrap();
        match value {
            Value::Time(t) => assert_eq!(t.timestamp_subsec_millis(), 500),
            other => panic!("expected time, got {:?}", other),
        }
    }

    #[test]
    fn test_raw_json_captures_compacted_token() {
        let ty = Type::structure("Doc")
            .field("Raw", Type::raw_json())
            .field("N", Type::int())
            .build();

        let value = decode(&ty, r#"{"Raw": { "a" : "x y" }, "N": 1}"#).unwrap();
        assert_eq!(
            value,
            Value::Struct(vec![Value::Bytes(br#"{"a":"x y"}"#.to_vec()), Value::Int(1)])
        );
    }

    #[test]
    fn test_null_zeroes_struct_and_slice() {
        let ty = Type::structure("S").field("A", Type::int()).build();
        assert_eq!(decode(&ty, "null").unwrap(), Value::Struct(vec![Value::Int(0)]));
        assert_eq!(decode(&Type::slice(Type::int()), "null").unwrap(), Value::Null);
    }

    #[test]
    fn test_fixed_array_is_padded_and_truncated() {
        let ty = Type::array(Type::int(), 2);
        assert_eq!(
            decode(&ty, "[1]").unwrap(),
            Value::List(vec![Value::Int(1), Value::Int(0)])
        );
        assert_eq!(
            decode(&ty, "[1,2,3]").unwrap(),
            Value::List(vec![Value::Int(1), Value::Int(2)])
        );
    }

    #[test]
    fn test_pointer_allocates_struct() {
        let inner = Type::structure("Inner").field("B", Type::int()).build();
        let ty = Type::structure("Outer")
            .field("P", Type::pointer(inner))
            .build();

        assert_eq!(
            decode(&ty, r#"{"P":{"B":4}}"#).unwrap(),
            Value::Struct(vec![Value::Struct(vec![Value::Int(4)])])
        );
        assert_eq!(
            decode(&ty, r#"{"P":null}"#).unwrap(),
            Value::Struct(vec![Value::Null])
        );
    }

    #[test]
    fn test_map_requires_string_keys() {
        assert!(matches!(
            decode(&Type::map(Type::int(), Type::int()), "{}"),
            Err(CodecError::UnsupportedType(_))
        ));
    }
}
