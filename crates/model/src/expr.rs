//! The expression tree a front-end produces from a predicate body.

use crate::{data_type::DataType, value::Value};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one captured-variable slot of a predicate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Slot(pub u32);

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One operation in the tree representation of a predicate body.
///
/// The set of kinds is closed: front-ends produce exactly these nine, and
/// every consumer matches exhaustively, so adding a kind breaks each match
/// at compile time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Expr {
    /// A literal embedded in the predicate body.
    Literal(Value),
    /// A reference to a captured-variable slot.
    Var(Slot),
    /// A field read, `owner.field`.
    FieldAccess {
        owner: Box<Expr>,
        field: String,
        ty: DataType,
    },
    /// A method call. `receiver` is `None` for static calls; `on` is the
    /// type whose method table translates the call (for record accessors,
    /// the accessed column's type).
    MethodCall {
        on: DataType,
        method: String,
        receiver: Option<Box<Expr>>,
        args: Vec<Expr>,
        ret: DataType,
    },
    /// A constructor invocation.
    Construct { class: String, args: Vec<Expr> },
    /// Boolean negation.
    Not(Box<Expr>),
    /// A binary comparison.
    Compare {
        op: CompareOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Short-circuit conjunction.
    And { left: Box<Expr>, right: Box<Expr> },
    /// Short-circuit disjunction.
    Or { left: Box<Expr>, right: Box<Expr> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl CompareOp {
    pub fn as_sql(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::NotEq => "<>",
            CompareOp::Lt => "<",
            CompareOp::LtEq => "<=",
            CompareOp::Gt => ">",
            CompareOp::GtEq => ">=",
        }
    }
}

impl Expr {
    pub fn literal(value: impl Into<Value>) -> Expr {
        Expr::Literal(value.into())
    }

    pub fn var(slot: u32) -> Expr {
        Expr::Var(Slot(slot))
    }

    pub fn field(owner: Expr, field: impl Into<String>, ty: DataType) -> Expr {
        Expr::FieldAccess {
            owner: Box::new(owner),
            field: field.into(),
            ty,
        }
    }

    pub fn call(
        on: DataType,
        method: impl Into<String>,
        receiver: Expr,
        args: Vec<Expr>,
        ret: DataType,
    ) -> Expr {
        Expr::MethodCall {
            on,
            method: method.into(),
            receiver: Some(Box::new(receiver)),
            args,
            ret,
        }
    }

    pub fn static_call(
        on: DataType,
        method: impl Into<String>,
        args: Vec<Expr>,
        ret: DataType,
    ) -> Expr {
        Expr::MethodCall {
            on,
            method: method.into(),
            receiver: None,
            args,
            ret,
        }
    }

    pub fn construct(class: impl Into<String>, args: Vec<Expr>) -> Expr {
        Expr::Construct {
            class: class.into(),
            args,
        }
    }

    pub fn not(inner: Expr) -> Expr {
        Expr::Not(Box::new(inner))
    }

    pub fn compare(op: CompareOp, left: Expr, right: Expr) -> Expr {
        Expr::Compare {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn and(left: Expr, right: Expr) -> Expr {
        Expr::And {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn or(left: Expr, right: Expr) -> Expr {
        Expr::Or {
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_op_sql() {
        assert_eq!(CompareOp::Eq.as_sql(), "=");
        assert_eq!(CompareOp::NotEq.as_sql(), "<>");
        assert_eq!(CompareOp::GtEq.as_sql(), ">=");
    }

    #[test]
    fn test_expr_round_trips_through_serde() {
        let expr = Expr::compare(
            CompareOp::Gt,
            Expr::call(
                DataType::Int32,
                "age",
                Expr::var(0),
                vec![],
                DataType::Int32,
            ),
            Expr::literal(5),
        );
        let json = serde_json::to_string(&expr).unwrap();
        let back: Expr = serde_json::from_str(&json).unwrap();
        assert_eq!(expr, back);
    }
}
