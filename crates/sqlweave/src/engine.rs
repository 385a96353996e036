//! Engine composition root
//!
//! Builds the mapper, codecs and dialect from an [`EngineConfig`] once, then
//! hands out shared references. Every operation is a synchronous transform;
//! executing the compiled statements is left to the caller's driver.

use crate::error::{EngineError, EngineResult};
use sqlweave_codec::{JsonCodec, SqlCodec};
use sqlweave_config::EngineConfig;
use sqlweave_query::{
    compile_alter_table, compile_create_index, compile_create_table, compile_delete,
    compile_drop_index, compile_insert, compile_update, render_pooled, AlterTableSpec,
    DeleteActions, Dialect, DialectRegistry, FindActions, IndexSpec, InsertSpec, LockMode, MySql,
    MySqlOptions, RenderedStatement, StatementPool, TableSpec, UpdateActions,
};
use sqlweave_reflect::{FieldIndex, Mapper, Record, StructField, Type, Value};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Leaf types the indexer never descends into.
fn is_terminal(field: &StructField) -> bool {
    let ty = field.ty().deref();
    ty.is_time() || ty.is_raw_json()
}

/// Mapper, codecs and the configured dialect.
pub struct Engine {
    config: EngineConfig,
    mapper: Arc<Mapper>,
    json: Arc<JsonCodec>,
    sql: Arc<SqlCodec>,
    dialects: DialectRegistry,
    dialect: Arc<dyn Dialect>,
    pool: StatementPool,
}

impl Engine {
    /// Build an engine with the built-in dialects
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        let mut dialects = DialectRegistry::new();
        dialects.register(
            "mysql",
            Arc::new(MySql::new(MySqlOptions::from(&config.dialect))),
        );
        Self::with_dialects(config, dialects)
    }

    /// Load the configuration file at `path` and build an engine from it
    pub fn load(path: impl AsRef<Path>) -> EngineResult<Self> {
        Self::new(EngineConfig::load(path)?)
    }

    /// Build an engine that picks its dialect from `dialects`
    pub fn with_dialects(config: EngineConfig, dialects: DialectRegistry) -> EngineResult<Self> {
        config.validate()?;

        let dialect = dialects
            .get(&config.dialect.driver)
            .ok_or_else(|| EngineError::UnknownDriver(config.dialect.driver.clone()))?;

        let mapper = Arc::new(Mapper::new(config.mapping.tag_name.as_str()).with_classifier(is_terminal));
        let json = Arc::new(
            JsonCodec::builder(Arc::clone(&mapper))
                .legacy_float(config.json.legacy_float)
                .build(),
        );
        let sql = Arc::new(SqlCodec::new(Arc::clone(&json)));
        let pool = StatementPool::new(dialect.placeholder());

        info!(
            driver = %config.dialect.driver,
            dialect = dialect.name(),
            tag_name = %config.mapping.tag_name,
            "Engine initialized"
        );

        Ok(Self {
            config,
            mapper,
            json,
            sql,
            dialects,
            dialect,
            pool,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn mapper(&self) -> &Arc<Mapper> {
        &self.mapper
    }

    pub fn json(&self) -> &Arc<JsonCodec> {
        &self.json
    }

    pub fn sql(&self) -> &Arc<SqlCodec> {
        &self.sql
    }

    pub fn dialect(&self) -> &Arc<dyn Dialect> {
        &self.dialect
    }

    pub fn dialects(&self) -> &DialectRegistry {
        &self.dialects
    }

    /// Field index of `ty`, cached by the mapper
    pub fn index_of(&self, ty: &Type) -> Arc<FieldIndex> {
        self.mapper.codec_by_type(ty)
    }

    /// Compile a select, applying the configured default limit when none is set
    pub fn select(&self, find: &FindActions, lock: LockMode) -> EngineResult<RenderedStatement> {
        let find = find.clone().with_default_limit(self.config.dialect.default_limit);
        let out = render_pooled(&self.pool, |stmt| self.dialect.select(stmt, &find, lock))?;
        debug!(sql = %out.sql, args = out.args.len(), "Compiled select");
        Ok(out)
    }

    pub fn insert(&self, spec: &InsertSpec) -> EngineResult<RenderedStatement> {
        Ok(compile_insert(self.dialect.as_ref(), &self.sql, spec)?)
    }

    /// Insert typed records into `table`
    pub fn insert_records<R: Record>(
        &self,
        database: &str,
        table: &str,
        records: &[R],
    ) -> EngineResult<RenderedStatement> {
        let values = records.iter().map(R::to_value).collect();
        self.insert(&InsertSpec::new(database, table, R::record_type(), values))
    }

    pub fn update(&self, update: &UpdateActions) -> EngineResult<RenderedStatement> {
        Ok(compile_update(self.dialect.as_ref(), update)?)
    }

    pub fn delete(&self, delete: &DeleteActions) -> EngineResult<RenderedStatement> {
        Ok(compile_delete(self.dialect.as_ref(), delete)?)
    }

    /// `CREATE TABLE` for records of type `ty`
    pub fn create_table(&self, database: &str, table: &str, ty: &Type) -> EngineResult<RenderedStatement> {
        let spec = TableSpec::new(database, table, self.index_of(ty));
        Ok(compile_create_table(self.dialect.as_ref(), &spec)?)
    }

    pub fn alter_table(&self, spec: &AlterTableSpec) -> EngineResult<RenderedStatement> {
        Ok(compile_alter_table(self.dialect.as_ref(), spec)?)
    }

    pub fn create_indexes(
        &self,
        database: &str,
        table: &str,
        indexes: &[IndexSpec],
    ) -> EngineResult<RenderedStatement> {
        Ok(compile_create_index(self.dialect.as_ref(), database, table, indexes)?)
    }

    pub fn drop_indexes(
        &self,
        database: &str,
        table: &str,
        names: &[String],
    ) -> EngineResult<RenderedStatement> {
        Ok(compile_drop_index(self.dialect.as_ref(), database, table, names)?)
    }

    /// Encode a record as JSON
    pub fn to_json<R: Record>(&self, record: &R) -> EngineResult<Vec<u8>> {
        Ok(self.json.marshal(record)?)
    }

    /// Decode a record from JSON
    pub fn from_json<R: Record>(&self, buf: &[u8]) -> EngineResult<R> {
        Ok(self.json.unmarshal(buf)?)
    }

    /// Bind a driver row to a record by column name
    pub fn decode_row<R: Record, S: AsRef<str>>(
        &self,
        columns: &[S],
        row: Vec<Value>,
    ) -> EngineResult<R> {
        let value = self.sql.decode_row(&R::record_type(), columns, row)?;
        Ok(R::from_value(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlweave_query::expr::equal;
    use tracing_test::traced_test;

    #[test]
    fn test_unknown_driver() {
        let mut config = EngineConfig::default();
        config.dialect.driver = "postgres".to_string();
        assert!(matches!(
            Engine::new(config),
            Err(EngineError::UnknownDriver(driver)) if driver == "postgres"
        ));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = EngineConfig::default();
        config.mapping.tag_name = " ".to_string();
        assert!(matches!(Engine::new(config), Err(EngineError::Config(_))));
    }

    #[test]
    #[traced_test]
    fn test_logs_engine_lifecycle() {
        let engine = Engine::new(EngineConfig::default()).unwrap();
        engine
            .select(&FindActions::new().from("db", "Users"), LockMode::None)
            .unwrap();
        assert!(logs_contain("Engine initialized"));
        assert!(logs_contain("Compiled select"));
    }

    #[test]
    fn test_select_applies_default_limit() {
        let engine = Engine::new(EngineConfig::default()).unwrap();
        let find = FindActions::new().from("db", "Users").filter([equal("Age", 1)]);
        let out = engine.select(&find, LockMode::None).unwrap();
        assert_eq!(out.sql, "SELECT * FROM `db`.`Users` WHERE `Age` = ? LIMIT 100;");

        let out = engine.select(&find.limit(5), LockMode::None).unwrap();
        assert!(out.sql.ends_with("LIMIT 5;"));
    }

    #[test]
    fn test_dialect_options_follow_config() {
        let mut config = EngineConfig::default();
        config.dialect.string_size = 64;
        let engine = Engine::new(config).unwrap();
        let ty = Type::structure("T").field("S", Type::string()).build();
        let out = engine.create_table("db", "T", &ty).unwrap();
        assert!(out.sql.contains("`S` VARCHAR(64)"));
    }
}
