//! Column definitions for `CREATE TABLE` / `ALTER TABLE`.
//!
//! Tag options read from each field:
//!
//! | option | effect |
//! |--------|--------|
//! | `size:N` | `VARCHAR(N)` |
//! | `char:N` | `CHAR(N)` |
//! | `longtext` | `TEXT` |
//! | `enum:A\|B` | `ENUM('A','B')` |
//! | `charset:X`, `collate:X` | override the dialect defaults |
//! | `unsigned` | `UNSIGNED` on float columns |
//! | `default:X` | `DEFAULT X` |
//! | `auto_increment` | `AUTO_INCREMENT` |
//! | `comment:X` | `COMMENT 'X'` |
//! | `primary_key` | primary key column |
//! | `unique_index[:name]` | unique index on the column |
//! | `virtual_column[:name]`, `generated_column[:name]`, `stored_column[:name]` | generated column extracted from the enclosing JSON column |

use super::MySql;
use crate::dialect::Dialect;
use crate::error::{QueryError, QueryResult};
use crate::index::{IndexColumn, IndexKind, IndexSpec};
use crate::statement::{quote_literal, Statement};
use crate::table::{AlterTableSpec, TableSpec};
use sqlweave_reflect::{FieldIndex, Kind, StructField, StructTag};
use std::collections::HashSet;
use tracing::warn;

/// Column name plus everything after it in the definition.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct ColumnDef {
    pub name: String,
    pub definition: String,
}

/// Source of a generated column.
struct Generated<'a> {
    column: &'a str,
    json_path: String,
    stored: bool,
}

const GENERATED_OPTIONS: [(&str, bool); 3] = [
    ("virtual_column", false),
    ("generated_column", false),
    ("stored_column", true),
];

fn generated_option(tag: &StructTag) -> Option<(&str, bool)> {
    GENERATED_OPTIONS
        .iter()
        .find(|(opt, _)| tag.has(opt))
        .map(|&(opt, stored)| (tag.get(opt), stored))
}

/// `$.a.b`, quoting segments that are not plain identifiers.
fn json_path(relative: &str) -> String {
    let mut out = String::from("$");
    for segment in relative.split('.') {
        out.push('.');
        if !segment.is_empty() && segment.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            out.push_str(segment);
        } else {
            out.push('"');
            out.push_str(&segment.replace('"', "\\\""));
            out.push('"');
        }
    }
    out
}

fn parse_size(field: &StructField, option: &str, fallback: u32) -> u32 {
    let raw = field.tag().get(option);
    match raw.parse::<u32>() {
        Ok(n) if n > 0 => n,
        _ => {
            warn!(field = field.path(), option, value = raw, "Ignoring unparsable size option");
            fallback
        }
    }
}

/// Column of the primary key: explicit, then a `primary_key` tag, then `$Key`.
pub(super) fn primary_key(index: &FieldIndex, explicit: Option<&str>) -> Option<String> {
    if let Some(pk) = explicit.filter(|pk| !pk.is_empty()) {
        return Some(pk.to_string());
    }
    index
        .name_fields()
        .find(|f| f.tag().has("primary_key"))
        .or_else(|| index.lookup_by_name("$Key"))
        .map(|f| f.path().to_string())
}

impl MySql {
    fn string_type(&self, field: &StructField) -> String {
        let tag = field.tag();
        let base = if let Some(values) = tag.lookup("enum") {
            let members: Vec<String> = values
                .split('|')
                .map(|v| quote_literal(v.trim()))
                .collect();
            format!("ENUM({})", members.join(","))
        } else if tag.has("char") {
            format!("CHAR({})", parse_size(field, "char", self.options.string_size))
        } else if tag.has("longtext") {
            "TEXT".to_string()
        } else if tag.has("size") {
            format!("VARCHAR({})", parse_size(field, "size", self.options.string_size))
        } else {
            format!("VARCHAR({})", self.options.string_size)
        };

        let charset = tag
            .lookup("charset")
            .filter(|c| !c.is_empty())
            .unwrap_or(&self.options.charset);
        let collate = tag
            .lookup("collate")
            .filter(|c| !c.is_empty())
            .unwrap_or(&self.options.collate);
        format!("{} CHARACTER SET {} COLLATE {}", base, charset, collate)
    }

    pub(super) fn column_type(&self, field: &StructField) -> QueryResult<String> {
        let ty = field.ty().deref();
        if ty.is_time() {
            return Ok("DATETIME(6)".to_string());
        }
        if ty.is_raw_json() {
            return Ok("JSON".to_string());
        }
        if ty.is_bytes() {
            return Ok("LONGBLOB".to_string());
        }

        let unsigned = |base: &str| format!("{} UNSIGNED", base);
        let column = match ty.kind() {
            Kind::Bool => "TINYINT(1)".to_string(),
            Kind::Int8 => "TINYINT".to_string(),
            Kind::Int16 => "SMALLINT".to_string(),
            Kind::Int32 => "INT".to_string(),
            Kind::Int | Kind::Int64 => "BIGINT".to_string(),
            Kind::Uint8 => unsigned("TINYINT"),
            Kind::Uint16 => unsigned("SMALLINT"),
            Kind::Uint32 => unsigned("INT"),
            Kind::Uint | Kind::Uint64 => unsigned("BIGINT"),
            Kind::Float32 | Kind::Float64 => {
                let base = if ty.kind() == Kind::Float32 { "REAL" } else { "DOUBLE" };
                if field.tag().has("unsigned") {
                    unsigned(base)
                } else {
                    base.to_string()
                }
            }
            Kind::String => self.string_type(field),
            Kind::Struct | Kind::Array | Kind::Slice | Kind::Map => "JSON".to_string(),
            Kind::Pointer | Kind::Interface => {
                return Err(QueryError::unsupported(format!(
                    "{} field {} has no column type",
                    ty.kind().as_str(),
                    field.path()
                )))
            }
        };
        Ok(column)
    }

    fn column_definition(
        &self,
        field: &StructField,
        generated: Option<&Generated<'_>>,
    ) -> QueryResult<String> {
        let tag = field.tag();
        let mut def = self.column_type(field)?;

        if let Some(g) = generated {
            def.push_str(&format!(
                " AS (JSON_UNQUOTE(JSON_EXTRACT({}, {}))) {}",
                self.quote(g.column),
                quote_literal(&g.json_path),
                if g.stored { "STORED" } else { "VIRTUAL" }
            ));
        }

        if generated.is_some() || field.is_nullable() {
            def.push_str(" NULL");
        } else {
            def.push_str(" NOT NULL");
        }

        if generated.is_none() {
            if let Some(value) = tag.lookup("default") {
                def.push_str(" DEFAULT ");
                if field.ty().deref().kind() == Kind::String {
                    def.push_str(&quote_literal(value));
                } else {
                    def.push_str(value);
                }
            }
            if tag.has("auto_increment") {
                def.push_str(" AUTO_INCREMENT");
            }
        }

        if let Some(comment) = tag.lookup("comment").filter(|c| !c.is_empty()) {
            def.push_str(" COMMENT ");
            def.push_str(&quote_literal(comment));
        }
        Ok(def)
    }

    /// Column definitions in field order, generated columns last.
    pub(super) fn columns(&self, index: &FieldIndex) -> QueryResult<Vec<ColumnDef>> {
        let mut columns = Vec::new();
        let mut roots = HashSet::new();
        for field in index.name_fields() {
            roots.insert(field.id());
            columns.push(ColumnDef {
                name: field.path().to_string(),
                definition: self.column_definition(field, None)?,
            });
        }

        for field in index.fields() {
            if roots.contains(field.id()) {
                continue;
            }
            let Some((name, stored)) = generated_option(field.tag()) else {
                continue;
            };

            let mut owner = index.parent(field);
            while let Some(parent) = owner {
                if parent.is_root() || roots.contains(parent.id()) {
                    break;
                }
                owner = index.parent(parent);
            }
            let Some(owner) = owner.filter(|p| !p.is_root()) else {
                warn!(field = field.path(), "Generated column outside a JSON column");
                continue;
            };

            let relative = field
                .path()
                .strip_prefix(owner.path())
                .and_then(|p| p.strip_prefix('.'))
                .unwrap_or(field.name());
            let generated = Generated {
                column: owner.path(),
                json_path: json_path(relative),
                stored,
            };
            columns.push(ColumnDef {
                name: if name.is_empty() {
                    field.path().to_string()
                } else {
                    name.to_string()
                },
                definition: self.column_definition(field, Some(&generated))?,
            });
        }
        Ok(columns)
    }

    /// Unique indexes declared with `unique_index`.
    fn unique_indexes(&self, index: &FieldIndex) -> Vec<IndexSpec> {
        index
            .name_fields()
            .filter(|f| f.tag().has("unique_index"))
            .map(|f| {
                let idx = IndexSpec::new(IndexKind::Unique, [IndexColumn::asc(f.path())]);
                match f.tag().get("unique_index") {
                    "" => idx,
                    name => idx.named(name),
                }
            })
            .collect()
    }

    fn write_unique_index(&self, stmt: &mut Statement, idx: &IndexSpec) {
        stmt.write_str("UNIQUE INDEX ");
        stmt.write_str(&self.quote(&idx.name()));
        stmt.write_str(" (");
        for (i, col) in idx.columns.iter().enumerate() {
            if i > 0 {
                stmt.write_char(',');
            }
            stmt.write_str(&self.quote(&col.name));
        }
        stmt.write_char(')');
    }

    pub(super) fn build_create_table(&self, stmt: &mut Statement, spec: &TableSpec) -> QueryResult<()> {
        let columns = self.columns(&spec.index)?;
        if columns.is_empty() {
            return Err(QueryError::invalid(format!("table {} has no columns", spec.table)));
        }

        stmt.write_str("CREATE TABLE ");
        stmt.write_str(&self.table_name(&spec.database, &spec.table));
        stmt.write_str(" (");
        for (i, col) in columns.iter().enumerate() {
            if i > 0 {
                stmt.write_char(',');
            }
            stmt.write_str(&self.quote(&col.name));
            stmt.write_char(' ');
            stmt.write_str(&col.definition);
        }
        if let Some(pk) = primary_key(&spec.index, spec.primary_key.as_deref()) {
            stmt.write_str(",PRIMARY KEY (");
            stmt.write_str(&self.quote(&pk));
            stmt.write_char(')');
        }
        for idx in self.unique_indexes(&spec.index) {
            stmt.write_char(',');
            self.write_unique_index(stmt, &idx);
        }
        stmt.write_str(") ENGINE=INNODB;");
        Ok(())
    }

    pub(super) fn build_alter_table(
        &self,
        stmt: &mut Statement,
        spec: &AlterTableSpec,
    ) -> QueryResult<()> {
        let table = &spec.table;
        let columns = self.columns(&table.index)?;
        if columns.is_empty() {
            return Err(QueryError::invalid(format!("table {} has no columns", table.table)));
        }
        let existing: HashSet<&str> = spec.columns.iter().map(String::as_str).collect();

        stmt.write_str("ALTER TABLE ");
        stmt.write_str(&self.table_name(&table.database, &table.table));
        stmt.write_char(' ');
        for (i, col) in columns.iter().enumerate() {
            if i > 0 {
                stmt.write_char(',');
            }
            stmt.write_str(if existing.contains(col.name.as_str()) {
                "MODIFY "
            } else {
                "ADD "
            });
            stmt.write_str(&self.quote(&col.name));
            stmt.write_char(' ');
            stmt.write_str(&col.definition);
            match i {
                0 => stmt.write_str(" FIRST"),
                _ => {
                    stmt.write_str(" AFTER ");
                    stmt.write_str(&self.quote(&columns[i - 1].name));
                }
            }
        }

        if !spec.has_primary_key {
            if let Some(pk) = primary_key(&table.index, table.primary_key.as_deref()) {
                stmt.write_str(",ADD PRIMARY KEY (");
                stmt.write_str(&self.quote(&pk));
                stmt.write_char(')');
            }
        }

        for idx in self.unique_indexes(&table.index) {
            if spec.indexes.iter().any(|name| *name == idx.name()) {
                continue;
            }
            stmt.write_str(",ADD ");
            self.write_unique_index(stmt, &idx);
        }

        if spec.unsafe_drop {
            let wanted: HashSet<&str> = columns.iter().map(|c| c.name.as_str()).collect();
            for name in &spec.columns {
                if !wanted.contains(name.as_str()) {
                    stmt.write_str(",DROP COLUMN ");
                    stmt.write_str(&self.quote(name));
                }
            }
        }
        stmt.write_char(';');
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlweave_reflect::{build_field_index, FieldDef, Type};
    use std::sync::Arc;
    use test_case::test_case;

    fn column_of(def: FieldDef) -> String {
        let ty = Type::structure("T").field_def(def).build();
        let index = build_field_index(&ty, "sqlike", None);
        let columns = MySql::default().columns(&index).unwrap();
        columns[0].definition.clone()
    }

    #[test_case(Type::bool(), "TINYINT(1) NOT NULL")]
    #[test_case(Type::int8(), "TINYINT NOT NULL")]
    #[test_case(Type::int16(), "SMALLINT NOT NULL")]
    #[test_case(Type::int32(), "INT NOT NULL")]
    #[test_case(Type::int(), "BIGINT NOT NULL")]
    #[test_case(Type::uint16(), "SMALLINT UNSIGNED NOT NULL")]
    #[test_case(Type::uint64(), "BIGINT UNSIGNED NOT NULL")]
    #[test_case(Type::float32(), "REAL NOT NULL")]
    #[test_case(Type::float64(), "DOUBLE NOT NULL")]
    #[test_case(Type::time(), "DATETIME(6) NOT NULL")]
    #[test_case(Type::bytes(), "LONGBLOB NULL")]
    #[test_case(Type::raw_json(), "JSON NULL")]
    #[test_case(Type::map(Type::string(), Type::int()), "JSON NULL")]
    #[test_case(Type::pointer(Type::int()), "BIGINT NULL")]
    fn test_column_types(ty: Type, expected: &str) {
        assert_eq!(column_of(FieldDef::new("F", ty)), expected);
    }

    #[test_case("", "VARCHAR(191) CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci NOT NULL")]
    #[test_case(",size:40", "VARCHAR(40) CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci NOT NULL")]
    #[test_case(",size:abc", "VARCHAR(191) CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci NOT NULL")]
    #[test_case(",char:36,charset:latin1,collate:latin1_bin", "CHAR(36) CHARACTER SET latin1 COLLATE latin1_bin NOT NULL")]
    #[test_case(",longtext", "TEXT CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci NOT NULL")]
    #[test_case(",enum:SUCCESS|FAILED", "ENUM('SUCCESS','FAILED') CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci NOT NULL")]
    fn test_string_columns(tag: &str, expected: &str) {
        assert_eq!(
            column_of(FieldDef::new("S", Type::string()).tag("sqlike", tag)),
            expected
        );
    }

    #[test]
    fn test_modifiers() {
        let def = column_of(
            FieldDef::new("N", Type::uint()).tag("sqlike", ",auto_increment,default:1,comment:row id"),
        );
        assert_eq!(
            def,
            "BIGINT UNSIGNED NOT NULL DEFAULT 1 AUTO_INCREMENT COMMENT 'row id'"
        );

        let def = column_of(FieldDef::new("F", Type::float64()).tag("sqlike", ",unsigned"));
        assert_eq!(def, "DOUBLE UNSIGNED NOT NULL");
    }

    #[test]
    fn test_interface_has_no_column_type() {
        let ty = Type::structure("T").field("Any", Type::interface()).build();
        let index = build_field_index(&ty, "sqlike", None);
        assert!(matches!(
            MySql::default().columns(&index),
            Err(QueryError::UnsupportedOperand(_))
        ));
    }

    fn generated_struct() -> Type {
        let nested = Type::structure("Nested")
            .field_def(FieldDef::new("VirtualStr", Type::string()).tag("sqlike", ",virtual_column:VirtualColumn"))
            .field_def(FieldDef::new("StoredStr", Type::string()).tag("sqlike", ",stored_column"))
            .build();
        Type::structure("GeneratedStruct")
            .field_def(FieldDef::new("ID", Type::string()).tag("sqlike", "$Key,char:36"))
            .field_def(FieldDef::new("Email", Type::string()).tag("sqlike", ",unique_index"))
            .field("Struct", nested)
            .build()
    }

    #[test]
    fn test_create_table_with_generated_columns() {
        let index = Arc::new(build_field_index(&generated_struct(), "sqlike", None));
        let ms = MySql::default();
        let mut stmt = ms.statement();
        ms.build_create_table(&mut stmt, &TableSpec::new("db", "GeneratedStruct", index))
            .unwrap();

        let cs = "CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci";
        assert_eq!(
            stmt.sql(),
            format!(
                "CREATE TABLE `db`.`GeneratedStruct` (\
                 `$Key` CHAR(36) {cs} NOT NULL,\
                 `Email` VARCHAR(191) {cs} NOT NULL,\
                 `Struct` JSON NOT NULL,\
                 `VirtualColumn` VARCHAR(191) {cs} AS (JSON_UNQUOTE(JSON_EXTRACT(`Struct`, '$.VirtualStr'))) VIRTUAL NULL,\
                 `Struct.StoredStr` VARCHAR(191) {cs} AS (JSON_UNQUOTE(JSON_EXTRACT(`Struct`, '$.StoredStr'))) STORED NULL,\
                 PRIMARY KEY (`$Key`),\
                 UNIQUE INDEX `UX_Email_ASC` (`Email`)) ENGINE=INNODB;"
            )
        );
    }

    #[test]
    fn test_alter_table_adds_modifies_and_drops() {
        let ty = Type::structure("T")
            .field_def(FieldDef::new("ID", Type::int()).tag("sqlike", "$Key"))
            .field("Age", Type::int32())
            .build();
        let index = Arc::new(build_field_index(&ty, "sqlike", None));
        let spec = AlterTableSpec::new(
            TableSpec::new("db", "T", index),
            vec!["$Key".to_string(), "Legacy".to_string()],
        )
        .unsafe_drop(true);

        let ms = MySql::default();
        let mut stmt = ms.statement();
        ms.build_alter_table(&mut stmt, &spec).unwrap();
        assert_eq!(
            stmt.sql(),
            "ALTER TABLE `db`.`T` MODIFY `$Key` BIGINT NOT NULL FIRST,\
             ADD `Age` INT NOT NULL AFTER `$Key`,\
             ADD PRIMARY KEY (`$Key`),\
             DROP COLUMN `Legacy`;"
        );
    }

    #[test]
    fn test_json_path_quotes_odd_segments() {
        assert_eq!(json_path("a.b_c"), "$.a.b_c");
        assert_eq!(json_path("a.b c"), "$.a.\"b c\"");
    }
}
