use super::{Column, Expr, Order, Sort};
use sqlweave_reflect::Value;

fn sort(field: impl Into<SortKey>, order: Order) -> Expr {
    Expr::Sort(Sort {
        expr: Box::new(field.into().0),
        order,
    })
}

/// Sort target: a column name or any expression.
pub struct SortKey(Expr);

impl From<&str> for SortKey {
    fn from(name: &str) -> Self {
        SortKey(Expr::Column(Column::new(name)))
    }
}

impl From<String> for SortKey {
    fn from(name: String) -> Self {
        SortKey(Expr::Column(Column::new(name)))
    }
}

impl From<Expr> for SortKey {
    fn from(expr: Expr) -> Self {
        SortKey(expr)
    }
}

pub fn asc(field: impl Into<SortKey>) -> Expr {
    sort(field, Order::Ascending)
}

pub fn desc(field: impl Into<SortKey>) -> Expr {
    sort(field, Order::Descending)
}

/// `ORDER BY FIELD(field, values...)`.
///
/// An empty value list fails at compile time.
pub fn field<T: Into<Value>>(name: &str, values: impl IntoIterator<Item = T>) -> Expr {
    Expr::FieldOrder(
        Column::new(name),
        values.into_iter().map(Into::into).collect(),
    )
}
