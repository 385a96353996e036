//! Statement descriptions handed to a dialect.
//!
//! Builders take `self` by value and return it, so a description reads as a
//! chain:
//!
//! ```rust
//! use sqlweave_query::actions::FindActions;
//! use sqlweave_query::expr::{between, desc, equal};
//!
//! let find = FindActions::new()
//!     .from("sqlike", "Users")
//!     .columns(["$Key", "Name"])
//!     .filter([equal("Active", true), between("Age", 18, 30)])
//!     .order_by([desc("CreatedAt")])
//!     .limit(10);
//! assert_eq!(find.count, 10);
//! ```

use crate::expr::{and, Column, Expr};
use sqlweave_reflect::{FieldIndex, Type, Value};
use std::sync::Arc;

/// Row locking appended to a select.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LockMode {
    #[default]
    None,
    /// `FOR UPDATE`
    ForUpdate,
    /// `LOCK IN SHARE MODE`
    ForRead,
}

/// Join flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Cross,
}

impl JoinKind {
    pub fn as_str(self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
            JoinKind::Cross => "CROSS JOIN",
        }
    }
}

/// `<kind> JOIN db.table [AS alias] [ON cond]`
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub kind: JoinKind,
    pub database: String,
    pub table: String,
    pub alias: Option<String>,
    pub on: Option<Expr>,
}

/// A `SELECT`.
#[derive(Debug, Clone, Default)]
pub struct FindActions {
    pub database: String,
    pub table: String,
    pub distinct: bool,
    pub projections: Vec<Expr>,
    pub joins: Vec<Join>,
    pub conditions: Option<Expr>,
    pub group_by: Vec<Expr>,
    pub having: Option<Expr>,
    pub sorts: Vec<Expr>,
    pub skip: u64,
    /// Row limit; zero means none.
    pub count: u64,
    /// Field index unqualified columns are checked against.
    pub schema: Option<Arc<FieldIndex>>,
}

impl FindActions {
    pub fn new() -> Self {
        Self::default()
    }

    /// A find limited to one row.
    pub fn one() -> Self {
        Self::new().limit(1)
    }

    pub fn from(mut self, database: impl Into<String>, table: impl Into<String>) -> Self {
        self.database = database.into();
        self.table = table.into();
        self
    }

    pub fn select(mut self, exprs: impl IntoIterator<Item = Expr>) -> Self {
        self.projections = exprs.into_iter().collect();
        self
    }

    /// Project plain columns by name.
    pub fn columns<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.projections = names
            .into_iter()
            .map(|n| Expr::Column(Column::new(n)))
            .collect();
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }

    /// `WHERE`, with the conditions joined by `AND`.
    pub fn filter(mut self, conds: impl IntoIterator<Item = Expr>) -> Self {
        self.conditions = non_empty(and(conds));
        self
    }

    pub fn group_by(mut self, exprs: impl IntoIterator<Item = Expr>) -> Self {
        self.group_by = exprs.into_iter().collect();
        self
    }

    /// `HAVING`, with the conditions joined by `AND`.
    pub fn having(mut self, conds: impl IntoIterator<Item = Expr>) -> Self {
        self.having = non_empty(and(conds));
        self
    }

    pub fn order_by(mut self, sorts: impl IntoIterator<Item = Expr>) -> Self {
        self.sorts = sorts.into_iter().collect();
        self
    }

    pub fn offset(mut self, skip: u64) -> Self {
        self.skip = skip;
        self
    }

    pub fn limit(mut self, count: u64) -> Self {
        self.count = count;
        self
    }

    pub fn schema(mut self, index: Arc<FieldIndex>) -> Self {
        self.schema = Some(index);
        self
    }

    /// Apply `limit` when no limit was set.
    pub fn with_default_limit(mut self, limit: u64) -> Self {
        if self.count == 0 {
            self.count = limit;
        }
        self
    }
}

/// Schemas compare by identity.
impl PartialEq for FindActions {
    fn eq(&self, other: &Self) -> bool {
        let same_schema = match (&self.schema, &other.schema) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        same_schema
            && self.database == other.database
            && self.table == other.table
            && self.distinct == other.distinct
            && self.projections == other.projections
            && self.joins == other.joins
            && self.conditions == other.conditions
            && self.group_by == other.group_by
            && self.having == other.having
            && self.sorts == other.sorts
            && self.skip == other.skip
            && self.count == other.count
    }
}

/// An `UPDATE`.
#[derive(Debug, Clone, Default)]
pub struct UpdateActions {
    pub database: String,
    pub table: String,
    pub conditions: Option<Expr>,
    /// Column and new value; a [`Math`](crate::expr::Math) value updates in place.
    pub values: Vec<(Column, Expr)>,
    pub sorts: Vec<Expr>,
    pub count: u64,
    pub schema: Option<Arc<FieldIndex>>,
}

impl UpdateActions {
    pub fn new() -> Self {
        Self::default()
    }

    /// An update limited to one row.
    pub fn one() -> Self {
        Self::new().limit(1)
    }

    pub fn table(mut self, database: impl Into<String>, table: impl Into<String>) -> Self {
        self.database = database.into();
        self.table = table.into();
        self
    }

    pub fn filter(mut self, conds: impl IntoIterator<Item = Expr>) -> Self {
        self.conditions = non_empty(and(conds));
        self
    }

    pub fn set(mut self, field: impl Into<String>, value: impl Into<Expr>) -> Self {
        self.values.push((Column::new(field), value.into()));
        self
    }

    pub fn order_by(mut self, sorts: impl IntoIterator<Item = Expr>) -> Self {
        self.sorts = sorts.into_iter().collect();
        self
    }

    pub fn limit(mut self, count: u64) -> Self {
        self.count = count;
        self
    }

    pub fn schema(mut self, index: Arc<FieldIndex>) -> Self {
        self.schema = Some(index);
        self
    }
}

/// A `DELETE`.
#[derive(Debug, Clone, Default)]
pub struct DeleteActions {
    pub database: String,
    pub table: String,
    pub conditions: Option<Expr>,
    pub sorts: Vec<Expr>,
    pub count: u64,
    pub schema: Option<Arc<FieldIndex>>,
}

impl DeleteActions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn one() -> Self {
        Self::new().limit(1)
    }

    pub fn from(mut self, database: impl Into<String>, table: impl Into<String>) -> Self {
        self.database = database.into();
        self.table = table.into();
        self
    }

    pub fn filter(mut self, conds: impl IntoIterator<Item = Expr>) -> Self {
        self.conditions = non_empty(and(conds));
        self
    }

    pub fn order_by(mut self, sorts: impl IntoIterator<Item = Expr>) -> Self {
        self.sorts = sorts.into_iter().collect();
        self
    }

    pub fn limit(mut self, count: u64) -> Self {
        self.count = count;
        self
    }

    pub fn schema(mut self, index: Arc<FieldIndex>) -> Self {
        self.schema = Some(index);
        self
    }
}

/// Conflict handling of an insert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InsertMode {
    #[default]
    Insert,
    /// `INSERT IGNORE`
    Ignore,
    /// `ON DUPLICATE KEY UPDATE` every non-key column
    Upsert,
}

/// Records of one type inserted into one table.
#[derive(Debug, Clone)]
pub struct InsertSpec {
    pub database: String,
    pub table: String,
    pub ty: Type,
    pub records: Vec<Value>,
    pub mode: InsertMode,
    /// Columns left out of the statement.
    pub omit_fields: Vec<String>,
    /// Key column excluded from upsert assignments; detected when unset.
    pub primary_key: Option<String>,
}

impl InsertSpec {
    pub fn new(
        database: impl Into<String>,
        table: impl Into<String>,
        ty: Type,
        records: Vec<Value>,
    ) -> Self {
        Self {
            database: database.into(),
            table: table.into(),
            ty,
            records,
            mode: InsertMode::default(),
            omit_fields: Vec::new(),
            primary_key: None,
        }
    }

    pub fn mode(mut self, mode: InsertMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn omit<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.omit_fields.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn primary_key(mut self, column: impl Into<String>) -> Self {
        self.primary_key = Some(column.into());
        self
    }
}

fn non_empty(expr: Expr) -> Option<Expr> {
    match &expr {
        Expr::Group(g) if g.is_empty() => None,
        _ => Some(expr),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::equal;

    #[test]
    fn test_empty_filter_clears_conditions() {
        let find = FindActions::new().filter(Vec::new());
        assert!(find.conditions.is_none());
    }

    #[test]
    fn test_default_limit_only_when_unset() {
        assert_eq!(FindActions::new().with_default_limit(100).count, 100);
        assert_eq!(FindActions::one().with_default_limit(100).count, 1);
    }

    #[test]
    fn test_single_filter_is_kept_as_is() {
        let find = FindActions::new().filter([equal("A", 1)]);
        assert_eq!(find.conditions, Some(equal("A", 1)));
    }
}
