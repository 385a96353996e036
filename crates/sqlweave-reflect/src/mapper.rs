//! Process-wide field index cache.

use crate::field::{build_field_index, Classifier, FieldIndex, StructField};
use crate::types::Type;
use crate::value::Value;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Builds each type's [`FieldIndex`] once and hands out shared references.
///
/// Lookups take a read lock; only a cache miss takes the write lock. Two
/// threads racing on the same miss build identical indexes and the first
/// insert wins.
pub struct Mapper {
    tag_name: String,
    classifier: Option<Arc<Classifier>>,
    cache: RwLock<HashMap<String, Arc<FieldIndex>>>,
}

impl Mapper {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            classifier: None,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Install a classifier that marks framework leaf types terminal.
    pub fn with_classifier(
        mut self,
        classifier: impl Fn(&StructField) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.classifier = Some(Arc::new(classifier));
        self
    }

    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    /// Field index of `ty` (pointers are dereferenced first).
    pub fn codec_by_type(&self, ty: &Type) -> Arc<FieldIndex> {
        let ty = ty.deref();
        if let Some(index) = self.cache.read().get(ty.id()) {
            return Arc::clone(index);
        }

        let built = Arc::new(build_field_index(
            &ty,
            &self.tag_name,
            self.classifier.as_deref(),
        ));
        debug!(type_id = %ty.id(), fields = built.len(), "Indexed struct type");

        let mut cache = self.cache.write();
        Arc::clone(cache.entry(ty.id().to_string()).or_insert(built))
    }

    /// Number of cached types.
    pub fn cached(&self) -> usize {
        self.cache.read().len()
    }

    /// Read a field by external name. Absent pointers along the way yield
    /// the field's zero template.
    pub fn field_by_name(&self, ty: &Type, value: &Value, name: &str) -> Option<Value> {
        let index = self.codec_by_type(ty);
        let field = index.lookup_by_name(name)?;
        Some(
            value
                .field_by_index(field.index())
                .cloned()
                .unwrap_or_else(|| field.zero().clone()),
        )
    }

    /// Mutable access to a field by external name, allocating absent
    /// pointer structs on the way down.
    pub fn field_by_name_mut<'v>(
        &self,
        ty: &Type,
        value: &'v mut Value,
        name: &str,
    ) -> Option<(Type, &'v mut Value)> {
        let index = self.codec_by_type(ty);
        let field = index.lookup_by_name(name)?;
        let field_ty = field.ty().clone();
        let slot = value.field_by_index_mut(&ty.deref(), field.index())?;
        Some((field_ty, slot))
    }
}

impl Default for Mapper {
    fn default() -> Self {
        Self::new("sqlike")
    }
}
