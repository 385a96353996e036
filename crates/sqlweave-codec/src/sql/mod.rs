//! SQL value codec and row adapter.
//!
//! Encoders turn a typed field value into a driver argument; decoders bind a
//! raw driver column back into the field's value. Container-typed fields
//! (structs, slices, maps) are stored as JSON text through [`JsonCodec`].

mod decoder;
mod encoder;

pub use encoder::format_datetime;

use crate::error::{CodecError, CodecResult};
use crate::jsonb::JsonCodec;
use crate::registry::{Registry, RegistryBuilder};
use sqlweave_reflect::{Kind, Mapper, Type, Value};
use std::sync::Arc;
use tracing::trace;

/// Field value to driver argument.
pub type SqlEncodeFn = Arc<dyn Fn(&SqlCodec, &Type, &Value) -> CodecResult<Value> + Send + Sync>;

/// Driver column to field value.
pub type SqlDecodeFn = Arc<dyn Fn(&SqlCodec, &Type, Value) -> CodecResult<Value> + Send + Sync>;

/// Registration tables for the SQL codec.
pub type SqlRegistryBuilder = RegistryBuilder<SqlEncodeFn, SqlDecodeFn>;

fn enc(
    f: impl Fn(&SqlCodec, &Type, &Value) -> CodecResult<Value> + Send + Sync + 'static,
) -> SqlEncodeFn {
    Arc::new(f)
}

fn dec(f: impl Fn(&SqlCodec, &Type, Value) -> CodecResult<Value> + Send + Sync + 'static) -> SqlDecodeFn {
    Arc::new(f)
}

/// Register the default driver encoders and decoders.
pub fn register_defaults(builder: &mut SqlRegistryBuilder) {
    builder
        .register_type(
            &Type::bytes(),
            enc(encoder::encode_bytes),
            dec(decoder::decode_bytes),
        )
        .register_type(
            &Type::time(),
            enc(encoder::encode_time),
            dec(decoder::decode_time),
        )
        .register_type(
            &Type::raw_json(),
            enc(encoder::encode_json),
            dec(decoder::decode_raw_json),
        )
        .register_kind(
            Kind::String,
            enc(encoder::encode_string),
            dec(decoder::decode_string),
        )
        .register_kind(
            Kind::Bool,
            enc(encoder::encode_bool),
            dec(decoder::decode_bool),
        );

    let (int_enc, int_dec) = (enc(encoder::encode_int), dec(decoder::decode_int));
    let (uint_enc, uint_dec) = (enc(encoder::encode_uint), dec(decoder::decode_uint));
    let (float_enc, float_dec) = (enc(encoder::encode_float), dec(decoder::decode_float));
    let (json_enc, json_dec) = (enc(encoder::encode_json), dec(decoder::decode_json));

    for kind in Kind::ALL {
        if kind.is_signed() {
            builder.register_kind(kind, Arc::clone(&int_enc), Arc::clone(&int_dec));
        } else if kind.is_unsigned() {
            builder.register_kind(kind, Arc::clone(&uint_enc), Arc::clone(&uint_dec));
        } else if kind.is_float() {
            builder.register_kind(kind, Arc::clone(&float_enc), Arc::clone(&float_dec));
        }
    }

    for kind in [Kind::Struct, Kind::Array, Kind::Slice, Kind::Map] {
        builder.register_kind(kind, Arc::clone(&json_enc), Arc::clone(&json_dec));
    }

    builder
        .register_kind(
            Kind::Pointer,
            enc(encoder::encode_pointer),
            dec(decoder::decode_pointer),
        )
        .register_kind(
            Kind::Interface,
            enc(encoder::encode_interface),
            dec(decoder::decode_interface),
        );
}

/// Builder for [`SqlCodec`].
pub struct SqlCodecBuilder {
    registry: SqlRegistryBuilder,
    json: Arc<JsonCodec>,
}

impl SqlCodecBuilder {
    pub fn registry_mut(&mut self) -> &mut SqlRegistryBuilder {
        &mut self.registry
    }

    pub fn build(self) -> SqlCodec {
        SqlCodec {
            registry: self.registry.build(),
            json: self.json,
        }
    }
}

/// Converts between field values and driver values.
pub struct SqlCodec {
    registry: Registry<SqlEncodeFn, SqlDecodeFn>,
    json: Arc<JsonCodec>,
}

impl SqlCodec {
    pub fn new(json: Arc<JsonCodec>) -> Self {
        Self::builder(json).build()
    }

    pub fn builder(json: Arc<JsonCodec>) -> SqlCodecBuilder {
        let mut registry = RegistryBuilder::new();
        register_defaults(&mut registry);
        SqlCodecBuilder { registry, json }
    }

    pub fn json(&self) -> &Arc<JsonCodec> {
        &self.json
    }

    pub fn mapper(&self) -> &Arc<Mapper> {
        self.json.mapper()
    }

    /// Convert a field value into a driver argument.
    pub fn encode_arg(&self, ty: &Type, value: &Value) -> CodecResult<Value> {
        let encoder = self.registry.lookup_encoder(ty)?;
        encoder(self, ty, value)
    }

    /// Convert a raw driver column into a field value.
    pub fn decode_column(&self, ty: &Type, raw: Value) -> CodecResult<Value> {
        let decoder = self.registry.lookup_decoder(ty)?;
        decoder(self, ty, raw)
    }

    /// Bind a driver row to a struct value by column name.
    ///
    /// Columns that name no field are ignored.
    pub fn decode_row<S: AsRef<str>>(
        &self,
        ty: &Type,
        columns: &[S],
        row: Vec<Value>,
    ) -> CodecResult<Value> {
        if columns.len() != row.len() {
            return Err(CodecError::mismatch(
                ty,
                format!("{} columns for {} values", columns.len(), row.len()),
            ));
        }

        let index = self.mapper().codec_by_type(ty);
        let mut dest = ty.deref().zero();
        for (column, raw) in columns.iter().zip(row) {
            let column = column.as_ref();
            let Some(field) = index.lookup_by_name(column) else {
                trace!(column, type_id = %ty.id(), "Ignoring unmapped column");
                continue;
            };
            let decoded = self.decode_column(field.ty(), raw)?;
            let slot = dest
                .field_by_index_mut(ty, field.index())
                .ok_or_else(|| CodecError::mismatch(ty, format!("no slot for {}", column)))?;
            *slot = decoded;
        }
        Ok(dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlweave_reflect::FieldDef;

    fn codec() -> SqlCodec {
        SqlCodec::new(Arc::new(JsonCodec::new(Arc::new(Mapper::default()))))
    }

    fn user() -> Type {
        let address = Type::structure("Address").field("City", Type::string()).build();
        Type::structure("User")
            .field_def(FieldDef::new("ID", Type::uint64()).tag("sqlike", "$Key"))
            .field("Name", Type::string())
            .field("Active", Type::bool())
            .field("Address", address)
            .field("Tags", Type::slice(Type::string()))
            .build()
    }

    #[test]
    fn test_decode_row_binds_by_column_name() {
        let row = vec![
            Value::Bytes(b"42".to_vec()),
            Value::Bytes(b"Ada".to_vec()),
            Value::Int(1),
            Value::Bytes(br#"{"City":"Oslo"}"#.to_vec()),
            Value::Null,
            Value::from("ignored"),
        ];
        let columns = ["$Key", "Name", "Active", "Address", "Tags", "Unknown"];

        let value = codec().decode_row(&user(), &columns, row).unwrap();
        assert_eq!(
            value,
            Value::Struct(vec![
                Value::Uint(42),
                Value::from("Ada"),
                Value::Bool(true),
                Value::Struct(vec![Value::from("Oslo")]),
                Value::Null,
            ])
        );
    }

    #[test]
    fn test_decode_row_length_mismatch() {
        assert!(matches!(
            codec().decode_row(&user(), &["Name"], Vec::new()),
            Err(CodecError::ValueMismatch { .. })
        ));
    }

    #[test]
    fn test_encode_container_as_json_text() {
        let codec = codec();
        let tags = Type::slice(Type::string());

        assert_eq!(
            codec
                .encode_arg(&tags, &Value::List(vec!["a".into()]))
                .unwrap(),
            Value::from(r#"["a"]"#)
        );
        assert_eq!(codec.encode_arg(&tags, &Value::Null).unwrap(), Value::Null);
    }
}
