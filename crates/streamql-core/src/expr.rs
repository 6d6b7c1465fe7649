//! Projection and predicate expressions produced by the query compiler

use crate::schema::NumericKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Aggregate functions that operate on a single numeric field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateFunction {
    Sum,
    Average,
    Min,
    Max,
    Median,
}

impl AggregateFunction {
    /// Name as written in a query.
    pub fn name(self) -> &'static str {
        match self {
            AggregateFunction::Sum => "sum",
            AggregateFunction::Average => "avg",
            AggregateFunction::Min => "min",
            AggregateFunction::Max => "max",
            AggregateFunction::Median => "med",
        }
    }
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed aggregate over one field, e.g. `avg(Value)` on an int field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Aggregate {
    pub function: AggregateFunction,
    pub field: String,
    pub kind: NumericKind,
}

impl Aggregate {
    pub fn new(function: AggregateFunction, field: impl Into<String>, kind: NumericKind) -> Self {
        Self {
            function,
            field: field.into(),
            kind,
        }
    }

    /// Output column name, `max(Level)`.
    pub fn alias(&self) -> String {
        format!("{}({})", self.function, self.field)
    }
}

/// One entry of a query's select list
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Projection {
    /// `*`
    SelectAll,
    /// `count(*)`
    Count,
    /// A raw field reference
    Field { name: String },
    Aggregate(Aggregate),
}

impl Projection {
    pub fn field(name: impl Into<String>) -> Self {
        Projection::Field { name: name.into() }
    }

    pub fn alias(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Projection::SelectAll => write!(f, "*"),
            Projection::Count => write!(f, "count(*)"),
            Projection::Field { name } => write!(f, "{}", name),
            Projection::Aggregate(agg) => write!(f, "{}", agg.alias()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    GreaterThan,
    LessThan,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareOp::GreaterThan => write!(f, ">"),
            CompareOp::LessThan => write!(f, "<"),
        }
    }
}

/// Numeric constant on the right-hand side of a comparison
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Int(i64),
    Float(f64),
}

impl Literal {
    pub fn kind(&self) -> NumericKind {
        match self {
            Literal::Int(_) => NumericKind::Int,
            Literal::Float(_) => NumericKind::Float,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(v) => write!(f, "{}", v),
            // Plain decimal, never exponent form; whole floats keep `.0`
            Literal::Float(v) if v.fract() == 0.0 => write!(f, "{}.0", v),
            Literal::Float(v) => write!(f, "{}", v),
        }
    }
}

/// `field > value` or `field < value`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub field: String,
    pub op: CompareOp,
    pub value: Literal,
}

impl Comparison {
    pub fn new(field: impl Into<String>, op: CompareOp, value: Literal) -> Self {
        Self {
            field: field.into(),
            op,
            value,
        }
    }

    pub fn greater_than(field: impl Into<String>, value: Literal) -> Self {
        Self::new(field, CompareOp::GreaterThan, value)
    }

    pub fn less_than(field: impl Into<String>, value: Literal) -> Self {
        Self::new(field, CompareOp::LessThan, value)
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.op, self.value)
    }
}

/// Boolean filter tree over comparisons
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    Compare(Comparison),
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
}

impl Predicate {
    pub fn and(self, rhs: Predicate) -> Predicate {
        Predicate::And(Box::new(self), Box::new(rhs))
    }

    pub fn or(self, rhs: Predicate) -> Predicate {
        Predicate::Or(Box::new(self), Box::new(rhs))
    }

    /// Leaf comparisons in source order.
    pub fn comparisons(&self) -> Vec<&Comparison> {
        let mut out = Vec::new();
        self.collect_comparisons(&mut out);
        out
    }

    fn collect_comparisons<'a>(&'a self, out: &mut Vec<&'a Comparison>) {
        match self {
            Predicate::Compare(c) => out.push(c),
            Predicate::And(lhs, rhs) | Predicate::Or(lhs, rhs) => {
                lhs.collect_comparisons(out);
                rhs.collect_comparisons(out);
            }
        }
    }
}

impl From<Comparison> for Predicate {
    fn from(comparison: Comparison) -> Self {
        Predicate::Compare(comparison)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Compare(c) => write!(f, "{}", c),
            // Left-associative: only a same-or-looser operator on the right,
            // or an `or` under an `and`, needs a group.
            Predicate::And(lhs, rhs) => {
                fmt_operand(lhs, matches!(**lhs, Predicate::Or(..)), f)?;
                write!(f, " and ")?;
                fmt_operand(rhs, !matches!(**rhs, Predicate::Compare(_)), f)
            }
            Predicate::Or(lhs, rhs) => {
                write!(f, "{} or ", lhs)?;
                fmt_operand(rhs, matches!(**rhs, Predicate::Or(..)), f)
            }
        }
    }
}

fn fmt_operand(p: &Predicate, grouped: bool, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if grouped {
        write!(f, "({})", p)
    } else {
        write!(f, "{}", p)
    }
}
