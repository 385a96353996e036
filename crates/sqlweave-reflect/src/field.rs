//! Field indexer.
//!
//! Walks a struct [`Type`] once, breadth-first, and produces a [`FieldIndex`]:
//! an arena-backed tree of [`StructField`] nodes plus lookup tables by
//! identifier and by external name, and the ordered list of fields that bind
//! to columns / wire keys.
//!
//! ```text
//! Outer { Name string; Audit (embedded) { CreatedAt time }; Addr { City string } }
//!
//!   id   index  path          name_fields?
//!   0    [0]    Name          yes
//!   1    [1]    Audit         no  (embedded)
//!   1.0  [1,0]  CreatedAt     yes (flattened into Outer)
//!   2    [2]    Addr          yes
//!   2.0  [2,0]  Addr.City     no  (subsumed by Addr)
//! ```

use crate::kind::Kind;
use crate::tag::StructTag;
use crate::types::Type;
use crate::value::Value;
use std::collections::{HashMap, VecDeque};

/// Per-field classifier. Returning `true` marks the field terminal: it is
/// indexed but the walk does not descend into it.
pub type Classifier = dyn Fn(&StructField) -> bool + Send + Sync;

/// One node of the field tree.
#[derive(Debug, Clone)]
pub struct StructField {
    id: String,
    index: Vec<usize>,
    name: String,
    path: String,
    nullable: bool,
    zero: Value,
    tag: StructTag,
    embedded: bool,
    ty: Type,
    parent: Option<usize>,
    children: Vec<usize>,
}

impl StructField {
    /// Dotted positional identifier, e.g. `"2.0"`. Empty for the root.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Field-index path from the root type.
    pub fn index(&self) -> &[usize] {
        &self.index
    }

    /// Declared name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolved external name.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn zero(&self) -> &Value {
        &self.zero
    }

    pub fn tag(&self) -> &StructTag {
        &self.tag
    }

    pub fn is_embedded(&self) -> bool {
        self.embedded
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// The indexed field tree of one struct type.
#[derive(Debug, Clone)]
pub struct FieldIndex {
    ty: Type,
    nodes: Vec<StructField>,
    fields: Vec<usize>,
    name_fields: Vec<usize>,
    indexes: HashMap<String, usize>,
    names: HashMap<String, usize>,
}

impl FieldIndex {
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    /// The synthetic root node.
    pub fn root(&self) -> &StructField {
        &self.nodes[0]
    }

    /// Every indexed field, ordered by index path.
    pub fn fields(&self) -> impl Iterator<Item = &StructField> + '_ {
        self.fields.iter().map(move |&slot| &self.nodes[slot])
    }

    /// Fields that bind to columns / wire keys, in deterministic order.
    pub fn name_fields(&self) -> impl Iterator<Item = &StructField> + '_ {
        self.name_fields.iter().map(move |&slot| &self.nodes[slot])
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn lookup_by_id(&self, id: &str) -> Option<&StructField> {
        self.indexes.get(id).map(|&slot| &self.nodes[slot])
    }

    pub fn lookup_by_name(&self, path: &str) -> Option<&StructField> {
        self.names.get(path).map(|&slot| &self.nodes[slot])
    }

    pub fn parent(&self, field: &StructField) -> Option<&StructField> {
        field.parent.map(|slot| &self.nodes[slot])
    }

    pub fn children<'a>(
        &'a self,
        field: &'a StructField,
    ) -> impl Iterator<Item = &'a StructField> + 'a {
        field.children.iter().map(move |&slot| &self.nodes[slot])
    }

    /// Walk the tree by declared field positions.
    pub fn get_by_traversal(&self, index: &[usize]) -> Option<&StructField> {
        if index.is_empty() {
            return None;
        }
        let mut node = self.root();
        for &i in index {
            node = self
                .children(node)
                .find(|child| child.index.last() == Some(&i))?;
        }
        Some(node)
    }

    /// Whether a non-embedded struct between the root and `field` owns it.
    fn is_subsumed(&self, field: &StructField) -> bool {
        let mut parent = field.parent;
        while let Some(slot) = parent {
            let node = &self.nodes[slot];
            if node.is_root() {
                return false;
            }
            if !node.embedded {
                return true;
            }
            parent = node.parent;
        }
        false
    }
}

struct Pending {
    ty: Type,
    parent: usize,
    prefix: String,
}

/// Build the field index of a struct type.
///
/// `tag_name` selects the tag namespace to read. Non-struct types produce an
/// index with only the root node.
pub fn build_field_index(
    ty: &Type,
    tag_name: &str,
    classifier: Option<&Classifier>,
) -> FieldIndex {
    let root_ty = ty.deref();
    let mut nodes = vec![StructField {
        id: String::new(),
        index: Vec::new(),
        name: String::new(),
        path: String::new(),
        nullable: false,
        zero: root_ty.zero(),
        tag: StructTag::default(),
        embedded: false,
        ty: root_ty.clone(),
        parent: None,
        children: Vec::new(),
    }];
    let mut fields = Vec::new();
    let mut queue = VecDeque::new();
    if root_ty.kind() == Kind::Struct {
        queue.push_back(Pending {
            ty: root_ty,
            parent: 0,
            prefix: String::new(),
        });
    }

    while let Some(pending) = queue.pop_front() {
        let parent_id = nodes[pending.parent].id.clone();
        let parent_index = nodes[pending.parent].index.clone();
        let parent_nullable = nodes[pending.parent].nullable;

        for (i, def) in pending.ty.fields().iter().enumerate() {
            if !def.is_exported() && !def.is_embedded() {
                continue;
            }

            let tag = StructTag::parse(def.lookup_tag(tag_name).unwrap_or_default());
            if tag.is_skip() {
                continue;
            }

            let segment = if tag.name().is_empty() {
                def.name()
            } else {
                tag.name()
            };
            let path = if pending.prefix.is_empty() {
                segment.to_string()
            } else {
                format!("{}.{}", pending.prefix, segment)
            };
            let id = if parent_id.is_empty() {
                i.to_string()
            } else {
                format!("{}.{}", parent_id, i)
            };
            let mut index = parent_index.clone();
            index.push(i);

            let field_ty = def.ty().deref();
            let embedded = def.is_embedded() && field_ty.kind() == Kind::Struct;
            let has_tag_name = !tag.name().is_empty();

            let slot = nodes.len();
            nodes.push(StructField {
                id,
                index,
                name: def.name().to_string(),
                path,
                nullable: parent_nullable || def.ty().is_nullable(),
                zero: def.ty().zero(),
                tag,
                embedded,
                ty: def.ty().clone(),
                parent: Some(pending.parent),
                children: Vec::new(),
            });
            nodes[pending.parent].children.push(slot);
            fields.push(slot);

            if let Some(classify) = classifier {
                if classify(&nodes[slot]) {
                    continue;
                }
            }

            if field_ty.kind() == Kind::Struct && !field_ty.fields().is_empty() {
                let prefix = if embedded && !has_tag_name {
                    pending.prefix.clone()
                } else {
                    nodes[slot].path.clone()
                };
                queue.push_back(Pending {
                    ty: field_ty,
                    parent: slot,
                    prefix,
                });
            }
        }
    }

    fields.sort_by(|&a, &b| nodes[a].index.cmp(&nodes[b].index));

    let mut index = FieldIndex {
        ty: ty.clone(),
        nodes,
        fields,
        name_fields: Vec::new(),
        indexes: HashMap::new(),
        names: HashMap::new(),
    };

    for &slot in &index.fields {
        let node = &index.nodes[slot];
        index.indexes.insert(node.id.clone(), slot);
        if node.embedded || node.name.is_empty() {
            continue;
        }
        // A shallower field shadows a deeper one with the same external name.
        let shadowed = index
            .names
            .get(&node.path)
            .map(|&existing| index.nodes[existing].index.len() <= node.index.len())
            .unwrap_or(false);
        if !shadowed {
            index.names.insert(node.path.clone(), slot);
        }
    }

    let name_fields: Vec<usize> = index
        .fields
        .iter()
        .copied()
        .filter(|&slot| {
            let node = &index.nodes[slot];
            !node.embedded
                && index.names.get(&node.path) == Some(&slot)
                && !index.is_subsumed(node)
        })
        .collect();
    index.name_fields = name_fields;

    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldDef;

    const TAG: &str = "sqlike";

    fn audit() -> Type {
        Type::structure("Audit")
            .field("CreatedAt", Type::time())
            .field("UpdatedAt", Type::time())
            .build()
    }

    fn address() -> Type {
        Type::structure("Address")
            .field("City", Type::string())
            .field_def(FieldDef::new("Zip", Type::string()).tag(TAG, "postcode"))
            .build()
    }

    fn user() -> Type {
        Type::structure("User")
            .field_def(FieldDef::new("ID", Type::int64()).tag(TAG, "$Key"))
            .field("Name", Type::string())
            .embed(audit())
            .field("Addr", address())
            .field("Manager", Type::pointer(address()))
            .field_def(FieldDef::new("secret", Type::string()).unexported())
            .field_def(FieldDef::new("Ignored", Type::string()).tag(TAG, "-"))
            .build()
    }

    fn paths(index: &FieldIndex) -> Vec<&str> {
        index.name_fields().map(|f| f.path()).collect()
    }

    #[test]
    fn test_name_fields_order_and_flattening() {
        let index = build_field_index(&user(), TAG, None);

        assert_eq!(
            paths(&index),
            vec!["$Key", "Name", "CreatedAt", "UpdatedAt", "Addr", "Manager"]
        );
    }

    #[test]
    fn test_nested_paths_and_tag_names() {
        let index = build_field_index(&user(), TAG, None);

        let city = index.lookup_by_name("Addr.City").unwrap();
        assert_eq!(city.id(), "3.0");
        assert_eq!(city.index(), &[3, 0]);

        let zip = index.lookup_by_name("Addr.postcode").unwrap();
        assert_eq!(zip.name(), "Zip");

        assert!(index.lookup_by_name("Addr.Zip").is_none());
        assert!(index.lookup_by_name("Audit").is_none());
        assert!(index.lookup_by_name("Ignored").is_none());
        assert!(index.lookup_by_name("secret").is_none());
    }

    #[test]
    fn test_every_node_is_addressable_by_id() {
        let index = build_field_index(&user(), TAG, None);

        for field in index.fields() {
            let found = index.lookup_by_id(field.id()).unwrap();
            assert_eq!(found.index(), field.index());
        }
        assert!(index.lookup_by_id("2").unwrap().is_embedded());
    }

    #[test]
    fn test_nullability_is_inherited() {
        let index = build_field_index(&user(), TAG, None);

        assert!(!index.lookup_by_name("Addr.City").unwrap().is_nullable());
        assert!(index.lookup_by_name("Manager").unwrap().is_nullable());
        assert!(index.lookup_by_name("Manager.City").unwrap().is_nullable());
    }

    #[test]
    fn test_fields_sorted_depth_first() {
        let index = build_field_index(&user(), TAG, None);
        let ids: Vec<&str> = index.fields().map(|f| f.id()).collect();

        assert_eq!(
            ids,
            vec!["0", "1", "2", "2.0", "2.1", "3", "3.0", "3.1", "4", "4.0", "4.1"]
        );
    }

    #[test]
    fn test_embedded_with_tag_name_keeps_segment() {
        let ty = Type::structure("Wrapper")
            .field_def(FieldDef::new("Audit", audit()).embedded().tag(TAG, "audit"))
            .build();
        let index = build_field_index(&ty, TAG, None);

        assert!(index.lookup_by_name("audit.CreatedAt").is_some());
        assert!(index.lookup_by_name("CreatedAt").is_none());
    }

    #[test]
    fn test_classifier_stops_recursion() {
        let stop_at_address = |f: &StructField| f.ty().deref().id() == "Address";
        let index = build_field_index(&user(), TAG, Some(&stop_at_address));

        assert!(index.lookup_by_name("Addr").is_some());
        assert!(index.lookup_by_name("Addr.City").is_none());
    }

    #[test]
    fn test_shallow_field_shadows_embedded() {
        let base = Type::structure("Base").field("Name", Type::string()).build();
        let ty = Type::structure("Derived")
            .embed(base)
            .field("Name", Type::string())
            .build();
        let index = build_field_index(&ty, TAG, None);

        assert_eq!(index.lookup_by_name("Name").unwrap().index(), &[1]);
        assert_eq!(paths(&index), vec!["Name"]);
    }

    #[test]
    fn test_parent_and_children_links() {
        let index = build_field_index(&user(), TAG, None);

        let addr = index.lookup_by_name("Addr").unwrap();
        let children: Vec<&str> = index.children(addr).map(|f| f.path()).collect();
        assert_eq!(children, vec!["Addr.City", "Addr.postcode"]);
        for child in index.children(addr) {
            assert_eq!(index.parent(child).unwrap().id(), addr.id());
        }

        assert!(index.parent(addr).unwrap().is_root());
        assert!(index.parent(index.root()).is_none());
    }

    #[test]
    fn test_get_by_traversal() {
        let ty = Type::structure("T")
            .field_def(FieldDef::new("hidden", Type::int()).unexported())
            .field("Addr", address())
            .build();
        let index = build_field_index(&ty, TAG, None);

        assert_eq!(index.get_by_traversal(&[1, 1]).unwrap().name(), "Zip");
        assert!(index.get_by_traversal(&[0]).is_none());
        assert!(index.get_by_traversal(&[]).is_none());
    }

    #[test]
    fn test_non_struct_type_has_only_root() {
        let index = build_field_index(&Type::int(), TAG, None);

        assert!(index.is_empty());
        assert!(index.root().is_root());
    }
}
