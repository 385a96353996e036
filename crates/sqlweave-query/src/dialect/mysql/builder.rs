use super::MySql;
use crate::actions::{DeleteActions, FindActions, Join, LockMode, UpdateActions};
use crate::dialect::Dialect;
use crate::error::{QueryError, QueryResult};
use crate::expr::{Column, Condition, Expr, Func, Group, GroupItem, Math, MathOp, Operator, Order};
use crate::statement::Statement;
use sqlweave_codec::sql::format_datetime;
use sqlweave_reflect::{FieldIndex, Value};

/// `LIMIT` MySQL requires before a bare `OFFSET`.
const UNBOUNDED_LIMIT: u64 = u64::MAX;

/// Schema unqualified columns resolve against.
#[derive(Clone, Copy)]
pub(super) struct Scope<'a> {
    schema: Option<&'a FieldIndex>,
}

impl<'a> Scope<'a> {
    pub(super) fn new(schema: Option<&'a FieldIndex>) -> Self {
        Self { schema }
    }
}

impl MySql {
    pub(super) fn build_column(
        &self,
        stmt: &mut Statement,
        scope: Scope<'_>,
        col: &Column,
    ) -> QueryResult<()> {
        match &col.table {
            Some(table) => {
                stmt.write_str(&self.quote(table));
                stmt.write_char('.');
            }
            None => {
                if let Some(schema) = scope.schema {
                    if schema.lookup_by_name(&col.name).is_none() {
                        return Err(QueryError::UnknownField(col.name.clone()));
                    }
                }
            }
        }
        stmt.write_str(&self.quote(&col.name));
        Ok(())
    }

    fn build_value(&self, stmt: &mut Statement, value: &Value) -> QueryResult<()> {
        match value {
            Value::Time(t) => stmt.push_arg(Value::String(format_datetime(t))),
            Value::List(_) | Value::Struct(_) | Value::Map(_) => {
                return Err(QueryError::unsupported(format!(
                    "{} value outside IN",
                    value.type_name()
                )))
            }
            other => stmt.push_arg(other.clone()),
        }
        Ok(())
    }

    pub(super) fn build_expr(
        &self,
        stmt: &mut Statement,
        scope: Scope<'_>,
        expr: &Expr,
    ) -> QueryResult<()> {
        match expr {
            Expr::Column(col) => self.build_column(stmt, scope, col),
            Expr::Value(v) => self.build_value(stmt, v),
            Expr::Condition(c) => self.build_condition(stmt, scope, c),
            Expr::Group(g) => self.build_group(stmt, scope, g),
            Expr::Raw(sql) => {
                stmt.write_str(sql);
                Ok(())
            }
            Expr::Math(m) => self.build_math(stmt, scope, m),
            Expr::Func(f) => self.build_func(stmt, scope, f),
            Expr::As(inner, alias) => {
                self.build_expr(stmt, scope, inner)?;
                stmt.write_str(" AS ");
                stmt.write_str(&self.quote(alias));
                Ok(())
            }
            Expr::Sort(sort) => {
                self.build_expr(stmt, scope, &sort.expr)?;
                if sort.order == Order::Descending {
                    stmt.write_str(" DESC");
                }
                Ok(())
            }
            Expr::FieldOrder(col, values) => {
                if values.is_empty() {
                    return Err(QueryError::invalid(format!(
                        "FIELD ordering on {} has no values",
                        col.name
                    )));
                }
                stmt.write_str("FIELD(");
                self.build_column(stmt, scope, col)?;
                for v in values {
                    stmt.write_char(',');
                    self.build_value(stmt, v)?;
                }
                stmt.write_char(')');
                Ok(())
            }
            Expr::SubQuery(query) => {
                stmt.write_char('(');
                self.build_find(stmt, query)?;
                stmt.write_char(')');
                Ok(())
            }
            Expr::Exists { query, negate } => {
                stmt.write_str(if *negate { "NOT EXISTS (" } else { "EXISTS (" });
                self.build_find(stmt, query)?;
                stmt.write_char(')');
                Ok(())
            }
        }
    }

    fn build_group(&self, stmt: &mut Statement, scope: Scope<'_>, group: &Group) -> QueryResult<()> {
        if group.is_empty() {
            return Err(QueryError::invalid("empty condition group"));
        }
        for item in &group.0 {
            match item {
                GroupItem::Open => stmt.write_char('('),
                GroupItem::Close => stmt.write_char(')'),
                GroupItem::And => stmt.write_str(" AND "),
                GroupItem::Or => stmt.write_str(" OR "),
                GroupItem::Expr(e) => self.build_expr(stmt, scope, e)?,
            }
        }
        Ok(())
    }

    fn build_condition(
        &self,
        stmt: &mut Statement,
        scope: Scope<'_>,
        c: &Condition,
    ) -> QueryResult<()> {
        if c.operands.len() < c.operator.arity() {
            return Err(QueryError::invalid(format!(
                "{:?} expects {} operand(s), got {}",
                c.operator,
                c.operator.arity(),
                c.operands.len()
            )));
        }
        self.build_expr(stmt, scope, &c.field)?;

        let is_null = |e: &Expr| matches!(e, Expr::Value(Value::Null));
        let op = match c.operator {
            Operator::Equal if is_null(&c.operands[0]) => {
                stmt.write_str(" IS NULL");
                return Ok(());
            }
            Operator::NotEqual if is_null(&c.operands[0]) => {
                stmt.write_str(" IS NOT NULL");
                return Ok(());
            }
            Operator::IsNull => {
                stmt.write_str(" IS NULL");
                return Ok(());
            }
            Operator::NotNull => {
                stmt.write_str(" IS NOT NULL");
                return Ok(());
            }
            Operator::In | Operator::NotIn => {
                stmt.write_str(if c.operator == Operator::In {
                    " IN "
                } else {
                    " NOT IN "
                });
                return self.build_in_operand(stmt, scope, &c.operands[0]);
            }
            Operator::Between | Operator::NotBetween => {
                stmt.write_str(if c.operator == Operator::Between {
                    " BETWEEN "
                } else {
                    " NOT BETWEEN "
                });
                self.build_expr(stmt, scope, &c.operands[0])?;
                stmt.write_str(" AND ");
                return self.build_expr(stmt, scope, &c.operands[1]);
            }
            Operator::Equal => " = ",
            Operator::NotEqual => " <> ",
            Operator::Like => " LIKE ",
            Operator::NotLike => " NOT LIKE ",
            Operator::GreaterThan => " > ",
            Operator::GreaterEqual => " >= ",
            Operator::LowerThan => " < ",
            Operator::LowerEqual => " <= ",
        };
        stmt.write_str(op);
        self.build_expr(stmt, scope, &c.operands[0])
    }

    fn build_in_operand(
        &self,
        stmt: &mut Statement,
        scope: Scope<'_>,
        operand: &Expr,
    ) -> QueryResult<()> {
        match operand {
            Expr::Value(Value::List(items)) => {
                if items.is_empty() {
                    return Err(QueryError::invalid("IN requires at least one value"));
                }
                stmt.write_char('(');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        stmt.write_char(',');
                    }
                    self.build_value(stmt, item)?;
                }
                stmt.write_char(')');
                Ok(())
            }
            Expr::SubQuery(_) => self.build_expr(stmt, scope, operand),
            other => {
                stmt.write_char('(');
                self.build_expr(stmt, scope, other)?;
                stmt.write_char(')');
                Ok(())
            }
        }
    }

    fn build_math(&self, stmt: &mut Statement, scope: Scope<'_>, m: &Math) -> QueryResult<()> {
        if !m.value.is_numeric() {
            return Err(QueryError::unsupported(format!(
                "{} operand for arithmetic on {}",
                m.value.type_name(),
                m.column.name
            )));
        }
        self.build_column(stmt, scope, &m.column)?;
        stmt.write_str(match m.op {
            MathOp::Add => " + ",
            MathOp::Sub => " - ",
        });
        stmt.push_arg(m.value.clone());
        Ok(())
    }

    fn build_func(&self, stmt: &mut Statement, scope: Scope<'_>, f: &Func) -> QueryResult<()> {
        if f.name.is_spatial() {
            for arg in &f.args {
                check_spatial_arg(f, arg)?;
            }
        }
        stmt.write_str(f.name.as_str());
        stmt.write_char('(');
        for (i, arg) in f.args.iter().enumerate() {
            if i > 0 {
                stmt.write_char(',');
            }
            self.build_expr(stmt, scope, arg)?;
        }
        stmt.write_char(')');
        Ok(())
    }

    fn build_list(&self, stmt: &mut Statement, scope: Scope<'_>, exprs: &[Expr]) -> QueryResult<()> {
        for (i, e) in exprs.iter().enumerate() {
            if i > 0 {
                stmt.write_char(',');
            }
            self.build_expr(stmt, scope, e)?;
        }
        Ok(())
    }

    fn build_join(&self, stmt: &mut Statement, scope: Scope<'_>, join: &Join) -> QueryResult<()> {
        stmt.write_char(' ');
        stmt.write_str(join.kind.as_str());
        stmt.write_char(' ');
        stmt.write_str(&self.table_name(&join.database, &join.table));
        if let Some(alias) = &join.alias {
            stmt.write_str(" AS ");
            stmt.write_str(&self.quote(alias));
        }
        if let Some(on) = &join.on {
            stmt.write_str(" ON ");
            self.build_expr(stmt, scope, on)?;
        }
        Ok(())
    }

    fn build_where(
        &self,
        stmt: &mut Statement,
        scope: Scope<'_>,
        conditions: Option<&Expr>,
    ) -> QueryResult<()> {
        if let Some(cond) = conditions {
            stmt.write_str(" WHERE ");
            self.build_expr(stmt, scope, cond)?;
        }
        Ok(())
    }

    fn build_order_by(&self, stmt: &mut Statement, scope: Scope<'_>, sorts: &[Expr]) -> QueryResult<()> {
        if !sorts.is_empty() {
            stmt.write_str(" ORDER BY ");
            self.build_list(stmt, scope, sorts)?;
        }
        Ok(())
    }

    fn build_limit(&self, stmt: &mut Statement, count: u64, skip: u64) {
        if count > 0 {
            stmt.write_str(&format!(" LIMIT {}", count));
        } else if skip > 0 {
            stmt.write_str(&format!(" LIMIT {}", UNBOUNDED_LIMIT));
        }
        if skip > 0 {
            stmt.write_str(&format!(" OFFSET {}", skip));
        }
    }

    /// The select body, without lock clause or terminator.
    pub(super) fn build_find(&self, stmt: &mut Statement, find: &FindActions) -> QueryResult<()> {
        if find.table.is_empty() {
            return Err(QueryError::invalid("select without a table"));
        }
        let scope = Scope::new(find.schema.as_deref());

        stmt.write_str("SELECT ");
        if find.distinct {
            stmt.write_str("DISTINCT ");
        }
        if find.projections.is_empty() {
            stmt.write_char('*');
        } else {
            self.build_list(stmt, scope, &find.projections)?;
        }
        stmt.write_str(" FROM ");
        stmt.write_str(&self.table_name(&find.database, &find.table));

        for join in &find.joins {
            self.build_join(stmt, scope, join)?;
        }
        self.build_where(stmt, scope, find.conditions.as_ref())?;
        if !find.group_by.is_empty() {
            stmt.write_str(" GROUP BY ");
            self.build_list(stmt, scope, &find.group_by)?;
        }
        if let Some(having) = &find.having {
            stmt.write_str(" HAVING ");
            self.build_expr(stmt, scope, having)?;
        }
        self.build_order_by(stmt, scope, &find.sorts)?;
        self.build_limit(stmt, find.count, find.skip);
        Ok(())
    }

    pub(super) fn build_select(
        &self,
        stmt: &mut Statement,
        find: &FindActions,
        lock: LockMode,
    ) -> QueryResult<()> {
        self.build_find(stmt, find)?;
        match lock {
            LockMode::ForUpdate => stmt.write_str(" FOR UPDATE"),
            LockMode::ForRead => stmt.write_str(" LOCK IN SHARE MODE"),
            LockMode::None => {}
        }
        stmt.write_char(';');
        Ok(())
    }

    pub(super) fn build_update(&self, stmt: &mut Statement, update: &UpdateActions) -> QueryResult<()> {
        if update.table.is_empty() {
            return Err(QueryError::invalid("update without a table"));
        }
        if update.values.is_empty() {
            return Err(QueryError::invalid("update without values"));
        }
        let scope = Scope::new(update.schema.as_deref());

        stmt.write_str("UPDATE ");
        stmt.write_str(&self.table_name(&update.database, &update.table));
        stmt.write_str(" SET ");
        for (i, (col, value)) in update.values.iter().enumerate() {
            if i > 0 {
                stmt.write_char(',');
            }
            self.build_column(stmt, scope, col)?;
            stmt.write_str(" = ");
            self.build_expr(stmt, scope, value)?;
        }
        self.build_where(stmt, scope, update.conditions.as_ref())?;
        self.build_order_by(stmt, scope, &update.sorts)?;
        self.build_limit(stmt, update.count, 0);
        stmt.write_char(';');
        Ok(())
    }

    pub(super) fn build_delete(&self, stmt: &mut Statement, delete: &DeleteActions) -> QueryResult<()> {
        if delete.table.is_empty() {
            return Err(QueryError::invalid("delete without a table"));
        }
        let scope = Scope::new(delete.schema.as_deref());

        stmt.write_str("DELETE FROM ");
        stmt.write_str(&self.table_name(&delete.database, &delete.table));
        self.build_where(stmt, scope, delete.conditions.as_ref())?;
        self.build_order_by(stmt, scope, &delete.sorts)?;
        self.build_limit(stmt, delete.count, 0);
        stmt.write_char(';');
        Ok(())
    }
}

/// Spatial functions take columns, geometry text, numbers, or other spatial calls.
fn check_spatial_arg(f: &Func, arg: &Expr) -> QueryResult<()> {
    let ok = match arg {
        Expr::Column(_) => true,
        Expr::Func(inner) => inner.name.is_spatial(),
        Expr::Value(Value::String(_) | Value::Int(_) | Value::Uint(_) | Value::Float(_)) => true,
        _ => false,
    };
    if ok {
        Ok(())
    } else {
        Err(QueryError::unsupported(format!(
            "{} argument for {}",
            describe(arg),
            f.name.as_str()
        )))
    }
}

fn describe(e: &Expr) -> &'static str {
    match e {
        Expr::Column(_) => "column",
        Expr::Value(v) => v.type_name(),
        Expr::Condition(_) => "condition",
        Expr::Group(_) => "group",
        Expr::Raw(_) => "raw",
        Expr::Math(_) => "math",
        Expr::Func(_) => "function",
        Expr::As(..) => "alias",
        Expr::Sort(_) => "sort",
        Expr::FieldOrder(..) => "field ordering",
        Expr::SubQuery(_) => "subquery",
        Expr::Exists { .. } => "exists",
    }
}
