use proptest::prelude::*;
use sqlweave_reflect::*;

#[derive(Debug, Clone)]
enum Shape {
    Leaf(u8),
    Nested(Vec<(u8, bool)>),
    Embedded(Vec<(u8, bool)>),
    Pointer(Vec<(u8, bool)>),
}

fn leaf_type(choice: u8) -> Type {
    match choice % 6 {
        0 => Type::string(),
        1 => Type::int64(),
        2 => Type::bool(),
        3 => Type::float64(),
        4 => Type::bytes(),
        _ => Type::time(),
    }
}

fn inner_struct(name: String, leaves: &[(u8, bool)]) -> Type {
    leaves
        .iter()
        .enumerate()
        .fold(Type::structure(name), |b, (i, &(choice, tagged))| {
            let def = FieldDef::new(format!("F{}", i), leaf_type(choice));
            let def = if tagged {
                def.tag("sqlike", format!("f{}", i))
            } else {
                def
            };
            b.field_def(def)
        })
        .build()
}

fn build_type(shapes: &[Shape]) -> Type {
    let mut builder = Type::structure("Root");
    for (i, shape) in shapes.iter().enumerate() {
        builder = match shape {
            Shape::Leaf(choice) => builder.field(format!("L{}", i), leaf_type(*choice)),
            Shape::Nested(leaves) => {
                builder.field(format!("N{}", i), inner_struct(format!("Nested{}", i), leaves))
            }
            Shape::Embedded(leaves) => builder.embed(inner_struct(format!("Emb{}", i), leaves)),
            Shape::Pointer(leaves) => builder.field(
                format!("P{}", i),
                Type::pointer(inner_struct(format!("Ptr{}", i), leaves)),
            ),
        };
    }
    builder.build()
}

fn shape_strategy() -> impl Strategy<Value = Shape> {
    let leaves = prop::collection::vec((any::<u8>(), any::<bool>()), 0..4);
    prop_oneof![
        any::<u8>().prop_map(Shape::Leaf),
        leaves.clone().prop_map(Shape::Nested),
        leaves.clone().prop_map(Shape::Embedded),
        leaves.prop_map(Shape::Pointer),
    ]
}

fn snapshot(index: &FieldIndex) -> Vec<(String, Vec<usize>, String, bool)> {
    index
        .fields()
        .map(|f| {
            (
                f.id().to_string(),
                f.index().to_vec(),
                f.path().to_string(),
                f.is_nullable(),
            )
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_build_field_index_is_idempotent(
        shapes in prop::collection::vec(shape_strategy(), 0..6)
    ) {
        let ty = build_type(&shapes);
        let first = build_field_index(&ty, "sqlike", None);
        let second = build_field_index(&ty, "sqlike", None);

        prop_assert_eq!(snapshot(&first), snapshot(&second));
        let a: Vec<&str> = first.name_fields().map(|f| f.path()).collect();
        let b: Vec<&str> = second.name_fields().map(|f| f.path()).collect();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn prop_every_field_resolves_by_id(
        shapes in prop::collection::vec(shape_strategy(), 0..6)
    ) {
        let index = build_field_index(&build_type(&shapes), "sqlike", None);

        for field in index.fields() {
            let found = index.lookup_by_id(field.id());
            prop_assert!(found.is_some(), "missing id {}", field.id());
        }
    }

    #[test]
    fn prop_fields_are_sorted_by_index_path(
        shapes in prop::collection::vec(shape_strategy(), 0..6)
    ) {
        let index = build_field_index(&build_type(&shapes), "sqlike", None);
        let paths: Vec<Vec<usize>> = index.fields().map(|f| f.index().to_vec()).collect();
        let mut sorted = paths.clone();
        sorted.sort();

        prop_assert_eq!(paths, sorted);
    }

    #[test]
    fn prop_name_fields_resolve_by_name(
        shapes in prop::collection::vec(shape_strategy(), 0..6)
    ) {
        let index = build_field_index(&build_type(&shapes), "sqlike", None);

        for field in index.name_fields() {
            let found = index.lookup_by_name(field.path());
            prop_assert!(found.is_some());
            prop_assert_eq!(found.map(|f| f.id()), Some(field.id()));
        }
    }
}
