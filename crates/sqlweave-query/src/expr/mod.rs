//! Expression AST.
//!
//! Nodes are plain data: constructors never validate and never fail. A
//! dialect checks operands when it renders them, so an unsupported operand
//! surfaces as [`QueryError::UnsupportedOperand`](crate::QueryError) at
//! compile time.
//!
//! Grouping follows two rules:
//!
//! - combining one expression yields that expression unchanged
//! - combining more wraps the group in parentheses with a connector between
//!   every adjacent pair; [`or`] also parenthesizes each member

mod condition;
mod function;
mod order;
mod spatial;

pub use condition::*;
pub use function::*;
pub use order::*;
pub use spatial::*;

use crate::actions::FindActions;
use sqlweave_reflect::Value;

/// A column reference, optionally qualified by table.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub table: Option<String>,
    pub name: String,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            table: None,
            name: name.into(),
        }
    }

    pub fn qualified(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            name: name.into(),
        }
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equal,
    NotEqual,
    IsNull,
    NotNull,
    In,
    NotIn,
    Like,
    NotLike,
    GreaterThan,
    GreaterEqual,
    LowerThan,
    LowerEqual,
    Between,
    NotBetween,
}

impl Operator {
    /// Number of operands the operator consumes.
    pub fn arity(self) -> usize {
        match self {
            Operator::IsNull | Operator::NotNull => 0,
            Operator::Between | Operator::NotBetween => 2,
            _ => 1,
        }
    }
}

/// `field <op> operands`.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: Box<Expr>,
    pub operator: Operator,
    pub operands: Vec<Expr>,
}

/// One slot of a [`Group`].
#[derive(Debug, Clone, PartialEq)]
pub enum GroupItem {
    Open,
    Close,
    And,
    Or,
    Expr(Expr),
}

/// Sub-expressions with explicit connectors and parentheses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group(pub Vec<GroupItem>);

impl Group {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Arithmetic applied to a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathOp {
    Add,
    Sub,
}

/// `column + value` / `column - value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Math {
    pub column: Column,
    pub op: MathOp,
    pub value: Value,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Ascending,
    Descending,
}

/// `expr [DESC]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Sort {
    pub expr: Box<Expr>,
    pub order: Order,
}

/// Function names the dialect knows how to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuncName {
    Count,
    Sum,
    Avg,
    Max,
    Min,
    StGeomFromText,
    StAsText,
    StIsValid,
    StDistance,
    StEquals,
    StIntersects,
    StWithin,
}

impl FuncName {
    pub fn as_str(self) -> &'static str {
        match self {
            FuncName::Count => "COUNT",
            FuncName::Sum => "SUM",
            FuncName::Avg => "AVG",
            FuncName::Max => "MAX",
            FuncName::Min => "MIN",
            FuncName::StGeomFromText => "ST_GeomFromText",
            FuncName::StAsText => "ST_AsText",
            FuncName::StIsValid => "ST_IsValid",
            FuncName::StDistance => "ST_Distance",
            FuncName::StEquals => "ST_Equals",
            FuncName::StIntersects => "ST_Intersects",
            FuncName::StWithin => "ST_Within",
        }
    }

    pub fn is_spatial(self) -> bool {
        !matches!(
            self,
            FuncName::Count | FuncName::Sum | FuncName::Avg | FuncName::Max | FuncName::Min
        )
    }
}

/// A function call.
#[derive(Debug, Clone, PartialEq)]
pub struct Func {
    pub name: FuncName,
    pub args: Vec<Expr>,
}

/// Any renderable expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Column(Column),
    Value(Value),
    Condition(Condition),
    Group(Group),
    Raw(String),
    Math(Math),
    Func(Func),
    As(Box<Expr>, String),
    Sort(Sort),
    /// `FIELD(column, values...)` ordering
    FieldOrder(Column, Vec<Value>),
    SubQuery(Box<FindActions>),
    Exists { query: Box<FindActions>, negate: bool },
}

impl From<Value> for Expr {
    fn from(v: Value) -> Self {
        Expr::Value(v)
    }
}

impl From<Column> for Expr {
    fn from(c: Column) -> Self {
        Expr::Column(c)
    }
}

impl From<Condition> for Expr {
    fn from(c: Condition) -> Self {
        Expr::Condition(c)
    }
}

impl From<Group> for Expr {
    fn from(g: Group) -> Self {
        Expr::Group(g)
    }
}

impl From<Math> for Expr {
    fn from(m: Math) -> Self {
        Expr::Math(m)
    }
}

impl From<Func> for Expr {
    fn from(f: Func) -> Self {
        Expr::Func(f)
    }
}

impl From<Sort> for Expr {
    fn from(s: Sort) -> Self {
        Expr::Sort(s)
    }
}

impl From<FindActions> for Expr {
    fn from(f: FindActions) -> Self {
        Expr::SubQuery(Box::new(f))
    }
}

macro_rules! value_operand {
    ($($t:ty),*) => {
        $(impl From<$t> for Expr {
            fn from(v: $t) -> Self {
                Expr::Value(Value::from(v))
            }
        })*
    };
}

value_operand!(bool, i8, i16, i32, i64, u8, u16, u32, u64, f32, f64, &str, String);

impl<T: Into<Value>> From<Vec<T>> for Expr {
    fn from(items: Vec<T>) -> Self {
        Expr::Value(Value::List(items.into_iter().map(Into::into).collect()))
    }
}

impl<T: Into<Value>> From<Option<T>> for Expr {
    fn from(v: Option<T>) -> Self {
        Expr::Value(v.map(Into::into).unwrap_or(Value::Null))
    }
}
