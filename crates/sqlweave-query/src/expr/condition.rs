use super::{Column, Condition, Expr, Group, GroupItem, Operator};
use crate::actions::FindActions;

fn cond(field: &str, operator: Operator, operands: Vec<Expr>) -> Expr {
    Expr::Condition(Condition {
        field: Box::new(Expr::Column(Column::new(field))),
        operator,
        operands,
    })
}

/// `field = value`; a null value renders `IS NULL`.
pub fn equal(field: &str, value: impl Into<Expr>) -> Expr {
    cond(field, Operator::Equal, vec![value.into()])
}

/// `field <> value`; a null value renders `IS NOT NULL`.
pub fn not_equal(field: &str, value: impl Into<Expr>) -> Expr {
    cond(field, Operator::NotEqual, vec![value.into()])
}

pub fn is_null(field: &str) -> Expr {
    cond(field, Operator::IsNull, Vec::new())
}

pub fn not_null(field: &str) -> Expr {
    cond(field, Operator::NotNull, Vec::new())
}

/// `field IN (...)` over a list value or a subquery.
pub fn in_(field: &str, values: impl Into<Expr>) -> Expr {
    cond(field, Operator::In, vec![values.into()])
}

pub fn not_in(field: &str, values: impl Into<Expr>) -> Expr {
    cond(field, Operator::NotIn, vec![values.into()])
}

pub fn like(field: &str, pattern: impl Into<Expr>) -> Expr {
    cond(field, Operator::Like, vec![pattern.into()])
}

pub fn not_like(field: &str, pattern: impl Into<Expr>) -> Expr {
    cond(field, Operator::NotLike, vec![pattern.into()])
}

pub fn gt(field: &str, value: impl Into<Expr>) -> Expr {
    cond(field, Operator::GreaterThan, vec![value.into()])
}

pub fn ge(field: &str, value: impl Into<Expr>) -> Expr {
    cond(field, Operator::GreaterEqual, vec![value.into()])
}

pub fn lt(field: &str, value: impl Into<Expr>) -> Expr {
    cond(field, Operator::LowerThan, vec![value.into()])
}

pub fn le(field: &str, value: impl Into<Expr>) -> Expr {
    cond(field, Operator::LowerEqual, vec![value.into()])
}

pub fn between(field: &str, from: impl Into<Expr>, to: impl Into<Expr>) -> Expr {
    cond(field, Operator::Between, vec![from.into(), to.into()])
}

pub fn not_between(field: &str, from: impl Into<Expr>, to: impl Into<Expr>) -> Expr {
    cond(field, Operator::NotBetween, vec![from.into(), to.into()])
}

/// Condition with an arbitrary left-hand side, e.g. a function call.
pub fn compare(lhs: impl Into<Expr>, operator: Operator, operands: Vec<Expr>) -> Expr {
    Expr::Condition(Condition {
        field: Box::new(lhs.into()),
        operator,
        operands,
    })
}

pub fn exists(query: FindActions) -> Expr {
    Expr::Exists {
        query: Box::new(query),
        negate: false,
    }
}

pub fn not_exists(query: FindActions) -> Expr {
    Expr::Exists {
        query: Box::new(query),
        negate: true,
    }
}

/// Group members, minus empty groups.
fn members(conds: impl IntoIterator<Item = Expr>) -> Vec<Expr> {
    conds
        .into_iter()
        .filter(|c| !matches!(c, Expr::Group(g) if g.is_empty()))
        .collect()
}

/// Join conditions with `AND`.
pub fn and(conds: impl IntoIterator<Item = Expr>) -> Expr {
    let mut conds = members(conds);
    if conds.len() == 1 {
        return conds.remove(0);
    }
    if conds.is_empty() {
        return Expr::Group(Group::default());
    }

    let mut items = Vec::with_capacity(conds.len() * 2 + 1);
    items.push(GroupItem::Open);
    for (i, c) in conds.into_iter().enumerate() {
        if i > 0 {
            items.push(GroupItem::And);
        }
        items.push(GroupItem::Expr(c));
    }
    items.push(GroupItem::Close);
    Expr::Group(Group(items))
}

/// Join conditions with `OR`, parenthesizing each member.
pub fn or(conds: impl IntoIterator<Item = Expr>) -> Expr {
    let mut conds = members(conds);
    if conds.len() == 1 {
        return conds.remove(0);
    }
    if conds.is_empty() {
        return Expr::Group(Group::default());
    }

    let mut items = Vec::with_capacity(conds.len() * 4 + 1);
    items.push(GroupItem::Open);
    for (i, c) in conds.into_iter().enumerate() {
        if i > 0 {
            items.push(GroupItem::Or);
        }
        items.push(GroupItem::Open);
        items.push(GroupItem::Expr(c));
        items.push(GroupItem::Close);
    }
    items.push(GroupItem::Close);
    Expr::Group(Group(items))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlweave_reflect::Value;

    #[test]
    fn test_single_member_is_unwrapped() {
        let c = equal("Age", 30);
        assert_eq!(and([c.clone()]), c);
        assert_eq!(or([c.clone()]), c);
    }

    #[test]
    fn test_and_interleaves_connectors() {
        let Expr::Group(Group(items)) = and([is_null("A"), is_null("B"), is_null("C")]) else {
            panic!("expected group");
        };
        assert_eq!(items.len(), 7);
        assert_eq!(items[0], GroupItem::Open);
        assert_eq!(items[2], GroupItem::And);
        assert_eq!(items[4], GroupItem::And);
        assert_eq!(items[6], GroupItem::Close);
    }

    #[test]
    fn test_empty_groups_are_dropped() {
        let a = equal("A", 1);
        assert_eq!(and([a.clone(), or(Vec::new())]), a);
        assert_eq!(or([and(Vec::new()), a.clone()]), a);
        assert_eq!(and([or(Vec::new()), and(Vec::new())]), Expr::Group(Group::default()));

        let Expr::Group(Group(items)) = and([is_null("A"), or(Vec::new()), is_null("B")]) else {
            panic!("expected group");
        };
        assert_eq!(items.len(), 5);
    }

    #[test]
    fn test_equal_keeps_operand() {
        let Expr::Condition(c) = equal("Name", "abc") else {
            panic!("expected condition");
        };
        assert_eq!(c.operator, Operator::Equal);
        assert_eq!(c.operands, vec![Expr::Value(Value::from("abc"))]);
    }
}
