//! Two-level codec registry.
//!
//! Routines are registered against an exact type identity or against a
//! [`Kind`]. Lookup tries the exact type first and falls back to the kind, so
//! well-known types (bytes, timestamps, raw JSON, user named types) override
//! the kind-level defaults without touching them.
//!
//! Registration happens on a [`RegistryBuilder`]; [`RegistryBuilder::build`]
//! freezes the tables into an immutable [`Registry`] that is shared by `Arc`.

use crate::error::{CodecError, CodecResult};
use sqlweave_reflect::{Kind, Type};
use std::collections::HashMap;
use tracing::trace;

/// Mutable registration tables.
pub struct RegistryBuilder<E, D> {
    type_encoders: HashMap<String, E>,
    type_decoders: HashMap<String, D>,
    kind_encoders: HashMap<Kind, E>,
    kind_decoders: HashMap<Kind, D>,
}

impl<E, D> RegistryBuilder<E, D> {
    pub fn new() -> Self {
        Self {
            type_encoders: HashMap::new(),
            type_decoders: HashMap::new(),
            kind_encoders: HashMap::new(),
            kind_decoders: HashMap::new(),
        }
    }

    /// Register an encoder/decoder pair for one exact type.
    pub fn register_type(&mut self, ty: &Type, encoder: E, decoder: D) -> &mut Self {
        self.set_type_encoder(ty, encoder);
        self.set_type_decoder(ty, decoder)
    }

    /// Register an encoder/decoder pair for a whole kind.
    pub fn register_kind(&mut self, kind: Kind, encoder: E, decoder: D) -> &mut Self {
        self.set_kind_encoder(kind, encoder);
        self.set_kind_decoder(kind, decoder)
    }

    pub fn set_type_encoder(&mut self, ty: &Type, encoder: E) -> &mut Self {
        self.type_encoders.insert(ty.id().to_string(), encoder);
        self
    }

    pub fn set_type_decoder(&mut self, ty: &Type, decoder: D) -> &mut Self {
        self.type_decoders.insert(ty.id().to_string(), decoder);
        self
    }

    pub fn set_kind_encoder(&mut self, kind: Kind, encoder: E) -> &mut Self {
        self.kind_encoders.insert(kind, encoder);
        self
    }

    pub fn set_kind_decoder(&mut self, kind: Kind, decoder: D) -> &mut Self {
        self.kind_decoders.insert(kind, decoder);
        self
    }

    /// Freeze the tables.
    pub fn build(self) -> Registry<E, D> {
        Registry {
            type_encoders: self.type_encoders,
            type_decoders: self.type_decoders,
            kind_encoders: self.kind_encoders,
            kind_decoders: self.kind_decoders,
        }
    }
}

impl<E, D> Default for RegistryBuilder<E, D> {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable lookup tables.
pub struct Registry<E, D> {
    type_encoders: HashMap<String, E>,
    type_decoders: HashMap<String, D>,
    kind_encoders: HashMap<Kind, E>,
    kind_decoders: HashMap<Kind, D>,
}

impl<E, D> Registry<E, D> {
    pub fn lookup_encoder(&self, ty: &Type) -> CodecResult<&E> {
        lookup(&self.type_encoders, &self.kind_encoders, ty)
    }

    pub fn lookup_decoder(&self, ty: &Type) -> CodecResult<&D> {
        lookup(&self.type_decoders, &self.kind_decoders, ty)
    }
}

fn lookup<'a, F>(
    by_type: &'a HashMap<String, F>,
    by_kind: &'a HashMap<Kind, F>,
    ty: &Type,
) -> CodecResult<&'a F> {
    if let Some(f) = by_type.get(ty.id()) {
        return Ok(f);
    }
    trace!(type_id = %ty.id(), kind = %ty.kind(), "Falling back to kind codec");
    by_kind
        .get(&ty.kind())
        .ok_or_else(|| CodecError::UnsupportedType(ty.id().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Registry<&'static str, &'static str> {
        let mut builder = RegistryBuilder::new();
        builder
            .register_kind(Kind::Slice, "enc-slice", "dec-slice")
            .register_kind(Kind::String, "enc-string", "dec-string")
            .register_type(&Type::bytes(), "enc-bytes", "dec-bytes");
        builder.set_type_encoder(&Type::named("Status", Type::string()), "enc-status");
        builder.build()
    }

    #[test]
    fn test_exact_type_shadows_kind() {
        let registry = registry();

        assert_eq!(*registry.lookup_encoder(&Type::bytes()).unwrap(), "enc-bytes");
        assert_eq!(
            *registry.lookup_encoder(&Type::slice(Type::string())).unwrap(),
            "enc-slice"
        );
    }

    #[test]
    fn test_one_sided_registration() {
        let registry = registry();
        let status = Type::named("Status", Type::string());

        assert_eq!(*registry.lookup_encoder(&status).unwrap(), "enc-status");
        assert_eq!(*registry.lookup_decoder(&status).unwrap(), "dec-string");
    }

    #[test]
    fn test_missing_kind_is_an_error() {
        let registry = registry();
        let err = registry.lookup_decoder(&Type::bool()).unwrap_err();

        assert!(matches!(err, CodecError::UnsupportedType(id) if id == "bool"));
    }
}
