use super::schema::primary_key;
use super::MySql;
use crate::actions::{InsertMode, InsertSpec};
use crate::dialect::Dialect;
use crate::error::{QueryError, QueryResult};
use crate::statement::Statement;
use sqlweave_codec::SqlCodec;
use sqlweave_reflect::{StructField, Value};
use tracing::trace;

static NULL: Value = Value::Null;

fn field_value<'a>(record: &'a Value, field: &'a StructField) -> &'a Value {
    match record.field_by_index(field.index()) {
        Some(v) => v,
        None if field.is_nullable() => &NULL,
        None => field.zero(),
    }
}

impl MySql {
    pub(super) fn build_insert(
        &self,
        stmt: &mut Statement,
        codec: &SqlCodec,
        spec: &InsertSpec,
    ) -> QueryResult<()> {
        if spec.records.is_empty() {
            return Err(QueryError::invalid(format!("no records to insert into {}", spec.table)));
        }

        let index = codec.mapper().codec_by_type(&spec.ty);
        let fields: Vec<&StructField> = index
            .name_fields()
            .filter(|f| !spec.omit_fields.iter().any(|o| o == f.path()))
            .collect();
        if fields.is_empty() {
            return Err(QueryError::invalid(format!("no columns to insert into {}", spec.table)));
        }
        trace!(table = %spec.table, columns = fields.len(), records = spec.records.len(), "Building insert");

        stmt.write_str(match spec.mode {
            InsertMode::Ignore => "INSERT IGNORE INTO ",
            InsertMode::Insert | InsertMode::Upsert => "INSERT INTO ",
        });
        stmt.write_str(&self.table_name(&spec.database, &spec.table));
        stmt.write_str(" (");
        for (i, f) in fields.iter().enumerate() {
            if i > 0 {
                stmt.write_char(',');
            }
            stmt.write_str(&self.quote(f.path()));
        }
        stmt.write_str(") VALUES ");

        for (i, record) in spec.records.iter().enumerate() {
            if i > 0 {
                stmt.write_char(',');
            }
            stmt.write_char('(');
            for (j, f) in fields.iter().enumerate() {
                if j > 0 {
                    stmt.write_char(',');
                }
                let arg = codec.encode_arg(f.ty(), field_value(record, f))?;
                stmt.push_arg(arg);
            }
            stmt.write_char(')');
        }

        if spec.mode == InsertMode::Upsert {
            let pk = primary_key(&index, spec.primary_key.as_deref());
            let updates: Vec<&str> = fields
                .iter()
                .map(|f| f.path())
                .filter(|name| pk.as_deref() != Some(*name))
                .collect();
            if !updates.is_empty() {
                stmt.write_str(" ON DUPLICATE KEY UPDATE ");
                for (i, name) in updates.iter().enumerate() {
                    if i > 0 {
                        stmt.write_char(',');
                    }
                    let col = self.quote(name);
                    stmt.write_str(&format!("{}=VALUES({})", col, col));
                }
            }
        }
        stmt.write_char(';');
        Ok(())
    }
}
