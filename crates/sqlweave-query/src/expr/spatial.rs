//! Spatial function constructors.
//!
//! A string argument names a column. Geometry literals are passed as
//! [`Wkt`] and bound as arguments; outside `ST_GeomFromText` they are wrapped
//! in `ST_GeomFromText(?)` so every argument is a geometry.

use super::{Column, Expr, Func, FuncName};
use sqlweave_reflect::Value;

/// Well-known-text geometry literal, e.g. `POINT(1 2)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Wkt(pub String);

impl Wkt {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }
}

/// Argument of a spatial function.
#[derive(Debug, Clone, PartialEq)]
pub enum SpatialArg {
    Column(Column),
    Geometry(Wkt),
    Func(Func),
    Other(Expr),
}

impl From<&str> for SpatialArg {
    fn from(name: &str) -> Self {
        SpatialArg::Column(Column::new(name))
    }
}

impl From<String> for SpatialArg {
    fn from(name: String) -> Self {
        SpatialArg::Column(Column::new(name))
    }
}

impl From<Column> for SpatialArg {
    fn from(c: Column) -> Self {
        SpatialArg::Column(c)
    }
}

impl From<Wkt> for SpatialArg {
    fn from(g: Wkt) -> Self {
        SpatialArg::Geometry(g)
    }
}

impl From<Func> for SpatialArg {
    fn from(f: Func) -> Self {
        SpatialArg::Func(f)
    }
}

impl From<Expr> for SpatialArg {
    fn from(e: Expr) -> Self {
        match e {
            Expr::Column(c) => SpatialArg::Column(c),
            Expr::Func(f) => SpatialArg::Func(f),
            other => SpatialArg::Other(other),
        }
    }
}

/// Geometry-valued argument: literals become `ST_GeomFromText(?)`.
fn geometry(arg: SpatialArg) -> Expr {
    match arg {
        SpatialArg::Column(c) => Expr::Column(c),
        SpatialArg::Geometry(g) => Expr::Func(Func {
            name: FuncName::StGeomFromText,
            args: vec![Expr::Value(Value::String(g.0))],
        }),
        SpatialArg::Func(f) => Expr::Func(f),
        SpatialArg::Other(e) => e,
    }
}

pub fn st_geom_from_text(geom: impl Into<SpatialArg>, srid: Option<u32>) -> Func {
    let mut args = vec![match geom.into() {
        SpatialArg::Geometry(g) => Expr::Value(Value::String(g.0)),
        SpatialArg::Column(c) => Expr::Column(c),
        SpatialArg::Func(f) => Expr::Func(f),
        SpatialArg::Other(e) => e,
    }];
    if let Some(srid) = srid {
        args.push(Expr::Value(Value::Uint(srid as u64)));
    }
    Func {
        name: FuncName::StGeomFromText,
        args,
    }
}

pub fn st_as_text(geom: impl Into<SpatialArg>) -> Func {
    Func {
        name: FuncName::StAsText,
        args: vec![geometry(geom.into())],
    }
}

pub fn st_is_valid(geom: impl Into<SpatialArg>) -> Func {
    Func {
        name: FuncName::StIsValid,
        args: vec![geometry(geom.into())],
    }
}

/// `ST_Distance(g1, g2[, unit])`
pub fn st_distance(
    g1: impl Into<SpatialArg>,
    g2: impl Into<SpatialArg>,
    unit: Option<&str>,
) -> Func {
    let mut args = vec![geometry(g1.into()), geometry(g2.into())];
    if let Some(unit) = unit {
        args.push(Expr::Value(Value::from(unit)));
    }
    Func {
        name: FuncName::StDistance,
        args,
    }
}

fn binary(name: FuncName, g1: SpatialArg, g2: SpatialArg) -> Func {
    Func {
        name,
        args: vec![geometry(g1), geometry(g2)],
    }
}

pub fn st_equals(g1: impl Into<SpatialArg>, g2: impl Into<SpatialArg>) -> Func {
    binary(FuncName::StEquals, g1.into(), g2.into())
}

pub fn st_intersects(g1: impl Into<SpatialArg>, g2: impl Into<SpatialArg>) -> Func {
    binary(FuncName::StIntersects, g1.into(), g2.into())
}

pub fn st_within(g1: impl Into<SpatialArg>, g2: impl Into<SpatialArg>) -> Func {
    binary(FuncName::StWithin, g1.into(), g2.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_is_wrapped_outside_geom_from_text() {
        let f = st_distance("Location", Wkt::new("POINT(1 2)"), None);
        assert_eq!(f.args[0], Expr::Column(Column::new("Location")));
        assert!(matches!(
            &f.args[1],
            Expr::Func(Func { name: FuncName::StGeomFromText, .. })
        ));
    }

    #[test]
    fn test_srid_is_bound() {
        let f = st_geom_from_text(Wkt::new("POINT(1 2)"), Some(4326));
        assert_eq!(
            f.args,
            vec![
                Expr::Value(Value::from("POINT(1 2)")),
                Expr::Value(Value::Uint(4326))
            ]
        );
    }
}
