//! Runtime type descriptors.
//!
//! A [`Type`] is the explicit stand-in for reflection: records describe their
//! shape once, and every codec and the field indexer work from that
//! description. Types are immutable and cheap to clone.

use crate::kind::Kind;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Identity of the byte-sequence type.
pub const BYTES_TYPE: &str = "[]uint8";
/// Identity of the timestamp type.
pub const TIME_TYPE: &str = "time.Time";
/// Identity of the raw JSON type.
pub const RAW_JSON_TYPE: &str = "json.RawMessage";

/// Immutable type descriptor with a stable identity string.
#[derive(Clone)]
pub struct Type(Arc<TypeInner>);

struct TypeInner {
    id: String,
    named: bool,
    kind: Kind,
    elem: Option<Type>,
    key: Option<Type>,
    len: usize,
    fields: Vec<FieldDef>,
}

/// A declared struct field.
#[derive(Clone, Debug)]
pub struct FieldDef {
    name: String,
    ty: Type,
    tags: Vec<(String, String)>,
    embedded: bool,
    exported: bool,
}

impl Type {
    fn from_inner(inner: TypeInner) -> Self {
        Self(Arc::new(inner))
    }

    fn primitive(kind: Kind) -> Self {
        Self::from_inner(TypeInner {
            id: kind.as_str().to_string(),
            named: false,
            kind,
            elem: None,
            key: None,
            len: 0,
            fields: Vec::new(),
        })
    }

    pub fn bool() -> Self {
        Self::primitive(Kind::Bool)
    }

    pub fn int() -> Self {
        Self::primitive(Kind::Int)
    }

    pub fn int8() -> Self {
        Self::primitive(Kind::Int8)
    }

    pub fn int16() -> Self {
        Self::primitive(Kind::Int16)
    }

    pub fn int32() -> Self {
        Self::primitive(Kind::Int32)
    }

    pub fn int64() -> Self {
        Self::primitive(Kind::Int64)
    }

    pub fn uint() -> Self {
        Self::primitive(Kind::Uint)
    }

    pub fn uint8() -> Self {
        Self::primitive(Kind::Uint8)
    }

    pub fn uint16() -> Self {
        Self::primitive(Kind::Uint16)
    }

    pub fn uint32() -> Self {
        Self::primitive(Kind::Uint32)
    }

    pub fn uint64() -> Self {
        Self::primitive(Kind::Uint64)
    }

    pub fn float32() -> Self {
        Self::primitive(Kind::Float32)
    }

    pub fn float64() -> Self {
        Self::primitive(Kind::Float64)
    }

    pub fn string() -> Self {
        Self::primitive(Kind::String)
    }

    /// The empty interface; holds any dynamic value.
    pub fn interface() -> Self {
        Self::from_inner(TypeInner {
            id: "interface {}".to_string(),
            named: false,
            kind: Kind::Interface,
            elem: None,
            key: None,
            len: 0,
            fields: Vec::new(),
        })
    }

    pub fn slice(elem: Type) -> Self {
        Self::from_inner(TypeInner {
            id: format!("[]{}", elem.id()),
            named: false,
            kind: Kind::Slice,
            elem: Some(elem),
            key: None,
            len: 0,
            fields: Vec::new(),
        })
    }

    pub fn array(elem: Type, len: usize) -> Self {
        Self::from_inner(TypeInner {
            id: format!("[{}]{}", len, elem.id()),
            named: false,
            kind: Kind::Array,
            elem: Some(elem),
            key: None,
            len,
            fields: Vec::new(),
        })
    }

    pub fn pointer(elem: Type) -> Self {
        Self::from_inner(TypeInner {
            id: format!("*{}", elem.id()),
            named: false,
            kind: Kind::Pointer,
            elem: Some(elem),
            key: None,
            len: 0,
            fields: Vec::new(),
        })
    }

    pub fn map(key: Type, elem: Type) -> Self {
        Self::from_inner(TypeInner {
            id: format!("map[{}]{}", key.id(), elem.id()),
            named: false,
            kind: Kind::Map,
            elem: Some(elem),
            key: Some(key),
            len: 0,
            fields: Vec::new(),
        })
    }

    /// Byte sequence (`[]uint8`).
    pub fn bytes() -> Self {
        Self::slice(Self::uint8())
    }

    /// Timestamp. A struct kind with no visible fields, so the indexer treats
    /// it as a leaf and codecs handle it through a type-level override.
    pub fn time() -> Self {
        Self::from_inner(TypeInner {
            id: TIME_TYPE.to_string(),
            named: true,
            kind: Kind::Struct,
            elem: None,
            key: None,
            len: 0,
            fields: Vec::new(),
        })
    }

    /// Raw, pre-encoded JSON bytes.
    pub fn raw_json() -> Self {
        Self::named(RAW_JSON_TYPE, Self::bytes())
    }

    /// A distinct named type sharing the structure of `underlying`.
    ///
    /// Named types get their own identity, so codecs can be registered for
    /// them without touching the kind-level defaults.
    pub fn named(name: impl Into<String>, underlying: Type) -> Self {
        Self::from_inner(TypeInner {
            id: name.into(),
            named: true,
            kind: underlying.kind(),
            elem: underlying.0.elem.clone(),
            key: underlying.0.key.clone(),
            len: underlying.0.len,
            fields: underlying.0.fields.clone(),
        })
    }

    /// Start describing a named struct type.
    pub fn structure(name: impl Into<String>) -> StructBuilder {
        StructBuilder {
            name: Some(name.into()),
            fields: Vec::new(),
        }
    }

    /// Start describing an anonymous struct type.
    pub fn anonymous_struct() -> StructBuilder {
        StructBuilder {
            name: None,
            fields: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.0.id
    }

    pub fn is_named(&self) -> bool {
        self.0.named
    }

    pub fn kind(&self) -> Kind {
        self.0.kind
    }

    /// Element type of pointers, slices, arrays and maps.
    pub fn elem(&self) -> Option<&Type> {
        self.0.elem.as_ref()
    }

    /// Key type of maps.
    pub fn key(&self) -> Option<&Type> {
        self.0.key.as_ref()
    }

    /// Array length; zero for every other kind.
    pub fn len(&self) -> usize {
        self.0.len
    }

    pub fn is_empty(&self) -> bool {
        self.0.len == 0
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.0.fields
    }

    pub fn field(&self, i: usize) -> Option<&FieldDef> {
        self.0.fields.get(i)
    }

    /// Strip every pointer level.
    pub fn deref(&self) -> Type {
        let mut t = self.clone();
        while t.kind() == Kind::Pointer {
            match t.elem() {
                Some(elem) => t = elem.clone(),
                None => break,
            }
        }
        t
    }

    /// Slice or array of `uint8`.
    pub fn is_bytes(&self) -> bool {
        matches!(self.kind(), Kind::Slice)
            && self.elem().map(|e| e.kind() == Kind::Uint8).unwrap_or(false)
    }

    pub fn is_time(&self) -> bool {
        self.id() == TIME_TYPE
    }

    pub fn is_raw_json(&self) -> bool {
        self.id() == RAW_JSON_TYPE
    }

    /// Whether the zero value of this type is absent (`Value::Null`).
    pub fn is_nullable(&self) -> bool {
        self.kind().is_nullable()
    }

    /// The zero value of this type.
    pub fn zero(&self) -> Value {
        match self.kind() {
            Kind::Bool => Value::Bool(false),
            k if k.is_signed() => Value::Int(0),
            k if k.is_unsigned() => Value::Uint(0),
            k if k.is_float() => Value::Float(0.0),
            Kind::String => Value::String(String::new()),
            Kind::Struct if self.is_time() => Value::Time(crate::value::zero_time()),
            Kind::Struct => Value::Struct(self.fields().iter().map(|f| f.ty().zero()).collect()),
            Kind::Array => match self.elem() {
                Some(elem) => Value::List((0..self.len()).map(|_| elem.zero()).collect()),
                None => Value::List(Vec::new()),
            },
            _ => Value::Null,
        }
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0.id == other.0.id
    }
}

impl Eq for Type {}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type({})", self.id())
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FieldDef {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            tags: Vec::new(),
            embedded: false,
            exported: true,
        }
    }

    /// Attach a raw tag string under a namespace, e.g. `("sqlike", "name,size:40")`.
    pub fn tag(mut self, namespace: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push((namespace.into(), value.into()));
        self
    }

    /// Mark as an anonymous (embedded) field.
    pub fn embedded(mut self) -> Self {
        self.embedded = true;
        self
    }

    /// Mark as not visible to the mapper.
    pub fn unexported(mut self) -> Self {
        self.exported = false;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }

    /// Raw tag string for a namespace.
    pub fn lookup_tag(&self, namespace: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(ns, _)| ns == namespace)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_embedded(&self) -> bool {
        self.embedded
    }

    pub fn is_exported(&self) -> bool {
        self.exported
    }
}

/// Builder returned by [`Type::structure`].
pub struct StructBuilder {
    name: Option<String>,
    fields: Vec<FieldDef>,
}

impl StructBuilder {
    /// Add a plain field.
    pub fn field(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.fields.push(FieldDef::new(name, ty));
        self
    }

    /// Add a fully described field.
    pub fn field_def(mut self, def: FieldDef) -> Self {
        self.fields.push(def);
        self
    }

    /// Embed another struct; the field takes the embedded type's identity as its name.
    pub fn embed(mut self, ty: Type) -> Self {
        let name = ty
            .deref()
            .id()
            .rsplit('.')
            .next()
            .unwrap_or_default()
            .to_string();
        self.fields.push(FieldDef::new(name, ty).embedded());
        self
    }

    pub fn build(self) -> Type {
        let (id, named) = match self.name {
            Some(name) => (name, true),
            None => {
                let body = self
                    .fields
                    .iter()
                    .map(|f| format!("{} {}", f.name, f.ty.id()))
                    .collect::<Vec<_>>()
                    .join("; ");
                (format!("struct {{ {} }}", body), false)
            }
        };
        Type::from_inner(TypeInner {
            id,
            named,
            kind: Kind::Struct,
            elem: None,
            key: None,
            len: 0,
            fields: self.fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identities() {
        assert_eq!(Type::bytes().id(), BYTES_TYPE);
        assert_eq!(Type::pointer(Type::int()).id(), "*int");
        assert_eq!(Type::array(Type::string(), 3).id(), "[3]string");
        assert_eq!(
            Type::map(Type::string(), Type::int()).id(),
            "map[string]int"
        );
        assert_eq!(Type::raw_json().kind(), Kind::Slice);
        assert!(Type::raw_json().is_bytes());
    }

    #[test]
    fn test_named_keeps_kind() {
        let status = Type::named("Status", Type::string());

        assert_eq!(status.kind(), Kind::String);
        assert_eq!(status.id(), "Status");
        assert_ne!(status, Type::string());
    }

    #[test]
    fn test_anonymous_struct_identity_is_structural() {
        let a = Type::anonymous_struct().field("A", Type::int()).build();
        let b = Type::anonymous_struct().field("A", Type::int()).build();

        assert_eq!(a, b);
        assert_eq!(a.id(), "struct { A int }");
    }

    #[test]
    fn test_zero_values() {
        let ty = Type::structure("User")
            .field("Name", Type::string())
            .field("Age", Type::int())
            .field("Tags", Type::slice(Type::string()))
            .field("Parent", Type::pointer(Type::string()))
            .field("At", Type::time())
            .build();

        assert_eq!(
            ty.zero(),
            Value::Struct(vec![
                Value::String(String::new()),
                Value::Int(0),
                Value::Null,
                Value::Null,
                Value::Time(crate::value::zero_time()),
            ])
        );
    }

    #[test]
    fn test_deref_strips_pointers() {
        let ty = Type::pointer(Type::pointer(Type::int()));
        assert_eq!(ty.deref().kind(), Kind::Int);
    }

    #[test]
    fn test_embed_uses_last_path_segment() {
        let inner = Type::structure("models.Audit").build();
        let ty = Type::structure("Outer").embed(inner).build();

        assert_eq!(ty.fields()[0].name(), "Audit");
        assert!(ty.fields()[0].is_embedded());
    }
}
