use super::{Column, Expr, Func, FuncName, Math, MathOp};
use sqlweave_reflect::Value;

/// Verbatim SQL fragment.
pub fn raw(sql: impl Into<String>) -> Expr {
    Expr::Raw(sql.into())
}

pub fn column(name: impl Into<String>) -> Expr {
    Expr::Column(Column::new(name))
}

/// `table`.`name`
pub fn column_of(table: impl Into<String>, name: impl Into<String>) -> Expr {
    Expr::Column(Column::qualified(table, name))
}

/// Literal bound as an argument.
pub fn value(v: impl Into<Value>) -> Expr {
    Expr::Value(v.into())
}

/// `expr AS alias`
pub fn as_(expr: impl Into<Expr>, alias: impl Into<String>) -> Expr {
    Expr::As(Box::new(expr.into()), alias.into())
}

fn aggregate(name: FuncName, field: &str) -> Func {
    let arg = match field {
        "*" => Expr::Raw("*".to_string()),
        _ => Expr::Column(Column::new(field)),
    };
    Func {
        name,
        args: vec![arg],
    }
}

/// `COUNT(field)`; `"*"` counts rows.
pub fn count(field: &str) -> Func {
    aggregate(FuncName::Count, field)
}

pub fn sum(field: &str) -> Func {
    aggregate(FuncName::Sum, field)
}

pub fn avg(field: &str) -> Func {
    aggregate(FuncName::Avg, field)
}

pub fn max(field: &str) -> Func {
    aggregate(FuncName::Max, field)
}

pub fn min(field: &str) -> Func {
    aggregate(FuncName::Min, field)
}

/// `field + n`
pub fn increment(field: &str, n: u64) -> Math {
    Math {
        column: Column::new(field),
        op: MathOp::Add,
        value: Value::Uint(n),
    }
}

/// `field - n`
pub fn decrement(field: &str, n: u64) -> Math {
    Math {
        column: Column::new(field),
        op: MathOp::Sub,
        value: Value::Uint(n),
    }
}

/// Arithmetic with an arbitrary operand; non-numeric operands fail to render.
pub fn math(field: &str, op: MathOp, operand: impl Into<Value>) -> Math {
    Math {
        column: Column::new(field),
        op,
        value: operand.into(),
    }
}
