//! JSON wire codec.
//!
//! [`JsonCodec`] owns a frozen registry of per-type routines and the shared
//! [`Mapper`]. Encoding and decoding walk the value alongside its [`Type`],
//! resolving the routine for every nested type through the registry, so a
//! type-level override applies wherever that type appears.

mod decoder;
mod encoder;
mod reader;
mod writer;

pub use reader::{compact, JsonType, Reader};
pub use writer::Writer;

use crate::error::{CodecError, CodecResult};
use crate::registry::{Registry, RegistryBuilder};
use sqlweave_reflect::{Kind, Mapper, Record, Type, Value};
use std::sync::Arc;
use tracing::debug;

/// Encoding routine for one type or kind.
pub type JsonEncodeFn =
    Arc<dyn Fn(&JsonCodec, &mut Writer, &Type, &Value) -> CodecResult<()> + Send + Sync>;

/// Decoding routine for one type or kind.
pub type JsonDecodeFn =
    Arc<dyn Fn(&JsonCodec, &mut Reader<'_>, &Type, &mut Value) -> CodecResult<()> + Send + Sync>;

/// Registration tables for the JSON codec.
pub type JsonRegistryBuilder = RegistryBuilder<JsonEncodeFn, JsonDecodeFn>;

fn enc(
    f: impl Fn(&JsonCodec, &mut Writer, &Type, &Value) -> CodecResult<()> + Send + Sync + 'static,
) -> JsonEncodeFn {
    Arc::new(f)
}

fn dec(
    f: impl Fn(&JsonCodec, &mut Reader<'_>, &Type, &mut Value) -> CodecResult<()>
        + Send
        + Sync
        + 'static,
) -> JsonDecodeFn {
    Arc::new(f)
}

/// Register the default encoders and decoders.
pub fn register_defaults(builder: &mut JsonRegistryBuilder) {
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
            enc(encoder::encode_raw_json),
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
    let (array_enc, array_dec) = (enc(encoder::encode_array), dec(decoder::decode_array));

    for kind in Kind::ALL {
        if kind.is_signed() {
            builder.register_kind(kind, Arc::clone(&int_enc), Arc::clone(&int_dec));
        } else if kind.is_unsigned() {
            builder.register_kind(kind, Arc::clone(&uint_enc), Arc::clone(&uint_dec));
        } else if kind.is_float() {
            builder.register_kind(kind, Arc::clone(&float_enc), Arc::clone(&float_dec));
        }
    }

    builder
        .register_kind(
            Kind::Array,
            Arc::clone(&array_enc),
            Arc::clone(&array_dec),
        )
        .register_kind(Kind::Slice, array_enc, array_dec)
        .register_kind(
            Kind::Struct,
            enc(encoder::encode_struct),
            dec(decoder::decode_struct),
        )
        .register_kind(
            Kind::Pointer,
            enc(encoder::encode_pointer),
            dec(decoder::decode_pointer),
        )
        .register_kind(Kind::Map, enc(encoder::encode_map), dec(decoder::decode_map))
        .register_kind(
            Kind::Interface,
            enc(encoder::encode_interface),
            dec(decoder::decode_interface),
        );
}

/// Builder for [`JsonCodec`].
pub struct JsonCodecBuilder {
    registry: JsonRegistryBuilder,
    mapper: Arc<Mapper>,
    legacy_float: bool,
}

impl JsonCodecBuilder {
    /// Render non-positive floats as `0`, as older payloads expect.
    pub fn legacy_float(mut self, enabled: bool) -> Self {
        self.legacy_float = enabled;
        self
    }

    /// Registration tables, pre-populated with the defaults.
    pub fn registry_mut(&mut self) -> &mut JsonRegistryBuilder {
        &mut self.registry
    }

    pub fn build(self) -> JsonCodec {
        debug!(
            tag_name = %self.mapper.tag_name(),
            legacy_float = self.legacy_float,
            "Built JSON codec"
        );
        JsonCodec {
            registry: self.registry.build(),
            mapper: self.mapper,
            legacy_float: self.legacy_float,
        }
    }
}

/// Streaming JSON encoder/decoder over typed values.
pub struct JsonCodec {
    registry: Registry<JsonEncodeFn, JsonDecodeFn>,
    mapper: Arc<Mapper>,
    legacy_float: bool,
}

impl JsonCodec {
    /// Codec with the default routines.
    pub fn new(mapper: Arc<Mapper>) -> Self {
        Self::builder(mapper).build()
    }

    pub fn builder(mapper: Arc<Mapper>) -> JsonCodecBuilder {
        let mut registry = RegistryBuilder::new();
        register_defaults(&mut registry);
        JsonCodecBuilder {
            registry,
            mapper,
            legacy_float: false,
        }
    }

    pub fn mapper(&self) -> &Arc<Mapper> {
        &self.mapper
    }

    pub fn registry(&self) -> &Registry<JsonEncodeFn, JsonDecodeFn> {
        &self.registry
    }

    pub fn is_legacy_float(&self) -> bool {
        self.legacy_float
    }

    /// Encode `value` of type `ty` into a fresh buffer.
    pub fn encode(&self, ty: &Type, value: &Value) -> CodecResult<Vec<u8>> {
        let mut w = Writer::with_capacity(64);
        self.encode_to(&mut w, ty, value)?;
        Ok(w.into_inner())
    }

    /// Encode into an existing writer, dispatching through the registry.
    pub fn encode_to(&self, w: &mut Writer, ty: &Type, value: &Value) -> CodecResult<()> {
        let encoder = self.registry.lookup_encoder(ty)?;
        encoder(self, w, ty, value)
    }

    /// Decode a complete payload into `dest`.
    pub fn decode(&self, buf: &[u8], ty: &Type, dest: &mut Value) -> CodecResult<()> {
        let mut r = Reader::new(buf);
        self.decode_from(&mut r, ty, dest)?;
        if !r.is_eof() {
            return Err(CodecError::malformed(r.position(), "trailing data after value"));
        }
        Ok(())
    }

    /// Decode the next value from a reader, dispatching through the registry.
    pub fn decode_from(&self, r: &mut Reader<'_>, ty: &Type, dest: &mut Value) -> CodecResult<()> {
        let decoder = self.registry.lookup_decoder(ty)?;
        decoder(self, r, ty, dest)
    }

    /// Decode a payload into a fresh zero value of `ty`.
    pub fn decode_value(&self, buf: &[u8], ty: &Type) -> CodecResult<Value> {
        let mut value = ty.zero();
        self.decode(buf, ty, &mut value)?;
        Ok(value)
    }

    pub fn marshal<R: Record>(&self, record: &R) -> CodecResult<Vec<u8>> {
        self.encode(&R::record_type(), &record.to_value())
    }

    pub fn unmarshal<R: Record>(&self, buf: &[u8]) -> CodecResult<R> {
        let value = self.decode_value(buf, &R::record_type())?;
        Ok(R::from_value(value)?)
    }
}
