use super::SqlCodec;
use crate::error::{CodecError, CodecResult};
use chrono::{DateTime, FixedOffset, Utc};
use sqlweave_reflect::{zero_time, Kind, Type, Value};

/// Driver datetime text, `YYYY-MM-DD HH:MM:SS.ffffff` in UTC.
pub fn format_datetime(t: &DateTime<FixedOffset>) -> String {
    t.with_timezone(&Utc)
        .format("%Y-%m-%d %H:%M:%S%.6f")
        .to_string()
}

pub(super) fn encode_bytes(_: &SqlCodec, ty: &Type, v: &Value) -> CodecResult<Value> {
    match v {
        Value::Null | Value::Bytes(_) => Ok(v.clone()),
        Value::String(s) => Ok(Value::Bytes(s.clone().into_bytes())),
        other => Err(CodecError::mismatch(ty, other.type_name())),
    }
}

pub(super) fn encode_time(_: &SqlCodec, ty: &Type, v: &Value) -> CodecResult<Value> {
    match v {
        Value::Time(t) => Ok(Value::String(format_datetime(t))),
        Value::Null => Ok(Value::String(format_datetime(&zero_time()))),
        other => Err(CodecError::mismatch(ty, other.type_name())),
    }
}

/// Containers and raw JSON are stored as JSON text.
pub(super) fn encode_json(codec: &SqlCodec, ty: &Type, v: &Value) -> CodecResult<Value> {
    if v.is_null() && ty.is_nullable() {
        return Ok(Value::Null);
    }
    let bytes = codec.json().encode(ty, v)?;
    String::from_utf8(bytes)
        .map(Value::String)
        .map_err(|_| CodecError::mismatch(ty, "non utf-8 json"))
}

pub(super) fn encode_string(_: &SqlCodec, ty: &Type, v: &Value) -> CodecResult<Value> {
    match v {
        Value::String(_) => Ok(v.clone()),
        other => Err(CodecError::mismatch(ty, other.type_name())),
    }
}

pub(super) fn encode_bool(_: &SqlCodec, ty: &Type, v: &Value) -> CodecResult<Value> {
    match v {
        Value::Bool(_) => Ok(v.clone()),
        other => Err(CodecError::mismatch(ty, other.type_name())),
    }
}

pub(super) fn encode_int(_: &SqlCodec, ty: &Type, v: &Value) -> CodecResult<Value> {
    v.as_i64()
        .map(Value::Int)
        .ok_or_else(|| CodecError::mismatch(ty, v.type_name()))
}

pub(super) fn encode_uint(_: &SqlCodec, ty: &Type, v: &Value) -> CodecResult<Value> {
    v.as_u64()
        .map(Value::Uint)
        .ok_or_else(|| CodecError::mismatch(ty, v.type_name()))
}

pub(super) fn encode_float(_: &SqlCodec, ty: &Type, v: &Value) -> CodecResult<Value> {
    let f = v
        .as_f64()
        .ok_or_else(|| CodecError::mismatch(ty, v.type_name()))?;
    Ok(match ty.kind() {
        Kind::Float32 => Value::Float(f as f32 as f64),
        _ => Value::Float(f),
    })
}

pub(super) fn encode_pointer(codec: &SqlCodec, ty: &Type, v: &Value) -> CodecResult<Value> {
    if v.is_null() {
        return Ok(Value::Null);
    }
    let elem = ty
        .elem()
        .ok_or_else(|| CodecError::UnsupportedType(ty.id().to_string()))?;
    codec.encode_arg(elem, v)
}

pub(super) fn encode_interface(codec: &SqlCodec, ty: &Type, v: &Value) -> CodecResult<Value> {
    match v {
        Value::Time(t) => Ok(Value::String(format_datetime(t))),
        Value::List(_) | Value::Struct(_) | Value::Map(_) => encode_json(codec, ty, v),
        _ => Ok(v.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_datetime_text_has_microseconds() {
        let t = Utc
            .with_ymd_and_hms(2021, 6, 7, 8, 9, 10)
            .unwrap()
            .fixed_offset();
        assert_eq!(format_datetime(&t), "2021-06-07 08:09:10.000000");
    }

    #[test]
    fn test_datetime_text_is_utc() {
        let offset = FixedOffset::west_opt(5 * 3600).unwrap();
        let t = offset.with_ymd_and_hms(2021, 6, 7, 22, 0, 0).unwrap();
        assert_eq!(format_datetime(&t), "2021-06-08 03:00:00.000000");
    }
}
