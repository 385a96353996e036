use super::MySql;
use crate::dialect::Dialect;
use crate::error::{QueryError, QueryResult};
use crate::index::{Direction, IndexKind, IndexSpec};
use crate::statement::{quote_literal, Statement};

fn index_keyword(kind: IndexKind) -> &'static str {
    match kind {
        IndexKind::Index => "INDEX",
        IndexKind::Unique => "UNIQUE INDEX",
        IndexKind::FullText => "FULLTEXT INDEX",
        IndexKind::Spatial => "SPATIAL INDEX",
        IndexKind::Primary => "PRIMARY KEY",
    }
}

impl MySql {
    pub(super) fn build_create_indexes(
        &self,
        stmt: &mut Statement,
        database: &str,
        table: &str,
        indexes: &[IndexSpec],
    ) -> QueryResult<()> {
        if indexes.is_empty() {
            return Err(QueryError::invalid("no index to create"));
        }

        stmt.write_str("ALTER TABLE ");
        stmt.write_str(&self.table_name(database, table));
        for (i, idx) in indexes.iter().enumerate() {
            if idx.columns.is_empty() {
                return Err(QueryError::invalid(format!("index {} has no columns", idx.name())));
            }
            if i > 0 {
                stmt.write_char(',');
            }
            stmt.write_str(" ADD ");
            stmt.write_str(index_keyword(idx.kind));
            if idx.kind != IndexKind::Primary {
                stmt.write_char(' ');
                stmt.write_str(&self.quote(&idx.name()));
            }
            stmt.write_str(" (");
            for (j, col) in idx.columns.iter().enumerate() {
                if j > 0 {
                    stmt.write_char(',');
                }
                stmt.write_str(&self.quote(&col.name));
                if self.options.supports_desc_index && col.direction == Direction::Descending {
                    stmt.write_str(" DESC");
                }
            }
            stmt.write_char(')');
            if let Some(comment) = idx.comment.as_deref().filter(|c| !c.is_empty()) {
                stmt.write_str(" COMMENT ");
                stmt.write_str(&quote_literal(comment));
            }
        }
        stmt.write_char(';');
        Ok(())
    }

    pub(super) fn build_drop_indexes(
        &self,
        stmt: &mut Statement,
        database: &str,
        table: &str,
        names: &[String],
    ) -> QueryResult<()> {
        if names.is_empty() {
            return Err(QueryError::invalid("no index to drop"));
        }

        stmt.write_str("ALTER TABLE ");
        stmt.write_str(&self.table_name(database, table));
        for (i, name) in names.iter().enumerate() {
            if i > 0 {
                stmt.write_char(',');
            }
            stmt.write_str(" DROP INDEX ");
            stmt.write_str(&self.quote(name));
        }
        stmt.write_char(';');
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::MySqlOptions;
    use crate::index::IndexColumn;

    fn indexes() -> Vec<IndexSpec> {
        vec![
            IndexSpec::new(
                IndexKind::Index,
                [IndexColumn::asc("SID"), IndexColumn::desc("Bool")],
            ),
            IndexSpec::new(IndexKind::Unique, [IndexColumn::asc("Email")])
                .named("test_idx")
                .comment("one per user"),
        ]
    }

    #[test]
    fn test_create_indexes() {
        let ms = MySql::default();
        let mut stmt = ms.statement();
        ms.build_create_indexes(&mut stmt, "db", "A", &indexes()).unwrap();
        assert_eq!(
            stmt.sql(),
            "ALTER TABLE `db`.`A` ADD INDEX `IX_SID_ASC-IX_Bool_DESC` (`SID`,`Bool` DESC), \
             ADD UNIQUE INDEX `test_idx` (`Email`) COMMENT 'one per user';"
        );
    }

    #[test]
    fn test_desc_dropped_without_support() {
        let ms = MySql::new(MySqlOptions {
            supports_desc_index: false,
            ..MySqlOptions::default()
        });
        let mut stmt = ms.statement();
        ms.build_create_indexes(&mut stmt, "db", "A", &indexes()[..1]).unwrap();
        assert_eq!(
            stmt.sql(),
            "ALTER TABLE `db`.`A` ADD INDEX `IX_SID_ASC-IX_Bool_DESC` (`SID`,`Bool`);"
        );
    }

    #[test]
    fn test_drop_indexes() {
        let ms = MySql::default();
        let mut stmt = ms.statement();
        ms.build_drop_indexes(&mut stmt, "db", "A", &["a".to_string(), "b".to_string()])
            .unwrap();
        assert_eq!(
            stmt.sql(),
            "ALTER TABLE `db`.`A` DROP INDEX `a`, DROP INDEX `b`;"
        );
    }

    #[test]
    fn test_empty_index_list_is_invalid() {
        let ms = MySql::default();
        let mut stmt = ms.statement();
        assert!(ms.build_create_indexes(&mut stmt, "db", "A", &[]).is_err());
        assert!(ms.build_drop_indexes(&mut stmt, "db", "A", &[]).is_err());
    }
}
