//! Compilation of boolean-valued nodes into renderable conditions.

pub mod predicate;

use crate::error::{CompileError, Result};
use crate::operand::{self, Operand};
use model::{
    data_type::DataType,
    env::CapturedEnv,
    expr::{CompareOp, Expr},
};
use predicate::StringPredicate;

/// The logical connective of a composite condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Connective {
    And,
    Or,
}

/// A compiled boolean SQL fragment. Every comparison and predicate
/// carries fully resolved operands; no expression-tree structure remains.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Condition {
    Comparison {
        op: CompareOp,
        left: Operand,
        right: Operand,
    },
    Composite {
        op: Connective,
        left: Box<Condition>,
        right: Box<Condition>,
    },
    Negation(Box<Condition>),
    Predicate {
        field: Operand,
        op: StringPredicate,
        args: Vec<Operand>,
        negated: bool,
    },
}

impl Condition {
    /// Renders the condition to SQL text, with column references left as
    /// `$name` placeholders for the assembly layer to substitute.
    pub fn to_sql(&self) -> String {
        match self {
            Condition::Comparison { op, left, right } => {
                format!("( {} {} {} )", left.as_sql(), op.as_sql(), right.as_sql())
            }
            // AND adds no parentheses of its own; OR wraps the pair
            Condition::Composite {
                op: Connective::And,
                left,
                right,
            } => format!("{} AND {}", left.to_sql(), right.to_sql()),
            Condition::Composite {
                op: Connective::Or,
                left,
                right,
            } => format!("({} OR {})", left.to_sql(), right.to_sql()),
            Condition::Negation(inner) => format!("NOT ( {} )", inner.to_sql()),
            Condition::Predicate {
                field,
                op,
                args,
                negated,
            } => {
                let sql = op.render(field, args);
                if *negated { format!("NOT {sql}") } else { sql }
            }
        }
    }
}

/// Compiles the boolean root of a predicate tree into a condition.
pub fn compile(root: &Expr, env: &CapturedEnv) -> Result<Condition> {
    match root {
        Expr::And { left, right } => composite(Connective::And, left, right, env),
        Expr::Or { left, right } => composite(Connective::Or, left, right, env),
        Expr::Compare { op, left, right } => comparison(*op, left, right, env),
        Expr::Not(inner) => negation(inner, env),
        Expr::MethodCall { .. } => predicate_condition(root, env, false),
        Expr::Literal(_) | Expr::Var(_) | Expr::FieldAccess { .. } | Expr::Construct { .. } => {
            Err(CompileError::InvalidPredicateShape(
                "predicate root must produce a boolean".to_string(),
            ))
        }
    }
}

fn composite(
    op: Connective,
    left: &Expr,
    right: &Expr,
    env: &CapturedEnv,
) -> Result<Condition> {
    Ok(Condition::Composite {
        op,
        left: Box::new(compile_branch(left, env)?),
        right: Box::new(compile_branch(right, env)?),
    })
}

/// One side of a short-circuit node: a single predicate-level condition,
/// never a nested composite.
fn compile_branch(expr: &Expr, env: &CapturedEnv) -> Result<Condition> {
    match expr {
        Expr::Compare { op, left, right } => comparison(*op, left, right, env),
        Expr::MethodCall { .. } => predicate_condition(expr, env, false),
        Expr::Not(inner) => match inner.as_ref() {
            Expr::MethodCall { .. } => predicate_condition(inner, env, true),
            Expr::Compare { op, left, right } => Ok(Condition::Negation(Box::new(
                comparison(*op, left, right, env)?,
            ))),
            _ => Err(CompileError::InvalidPredicateShape(
                "negation inside a short-circuit side must wrap a single predicate".to_string(),
            )),
        },
        Expr::And { .. } | Expr::Or { .. } => Err(CompileError::InvalidPredicateShape(
            "short-circuit sides must be single predicates".to_string(),
        )),
        _ => Err(CompileError::InvalidPredicateShape(
            "short-circuit side does not produce a boolean".to_string(),
        )),
    }
}

fn negation(inner: &Expr, env: &CapturedEnv) -> Result<Condition> {
    match inner {
        // a negated method-call predicate is marked, not wrapped
        Expr::MethodCall { .. } => predicate_condition(inner, env, true),
        Expr::Compare { .. } | Expr::And { .. } | Expr::Or { .. } | Expr::Not(_) => {
            Ok(Condition::Negation(Box::new(compile(inner, env)?)))
        }
        _ => Err(CompileError::InvalidPredicateShape(
            "negation over a non-boolean expression".to_string(),
        )),
    }
}

fn comparison(op: CompareOp, left: &Expr, right: &Expr, env: &CapturedEnv) -> Result<Condition> {
    Ok(Condition::Comparison {
        op,
        left: operand::compile(left, env)?,
        right: operand::compile(right, env)?,
    })
}

fn predicate_condition(expr: &Expr, env: &CapturedEnv, negated: bool) -> Result<Condition> {
    let Expr::MethodCall {
        on,
        method,
        receiver,
        args,
        ret,
    } = expr
    else {
        return Err(CompileError::InvalidPredicateShape(
            "expected a method-call predicate".to_string(),
        ));
    };

    if *ret != DataType::Boolean {
        return Err(CompileError::InvalidPredicateShape(format!(
            "'{method}' does not return a boolean"
        )));
    }
    if *on != DataType::String {
        return Err(CompileError::InvalidPredicateShape(format!(
            "unsupported predicate receiver type {}",
            on.sql_name()
        )));
    }
    let Some(receiver) = receiver else {
        return Err(CompileError::InvalidPredicateShape(
            "a static call cannot form a predicate".to_string(),
        ));
    };

    let op = StringPredicate::of(method)
        .ok_or_else(|| CompileError::unsupported_method(on.sql_name(), method.clone()))?;
    let field = operand::compile(receiver, env)?;
    let args = args
        .iter()
        .map(|arg| operand::compile(arg, env))
        .collect::<Result<Vec<_>>>()?;

    if op.takes_value() {
        match args.first() {
            Some(Operand::Literal(_)) => {}
            Some(_) => {
                return Err(CompileError::InvalidPredicateShape(format!(
                    "'{method}' requires a literal argument"
                )));
            }
            None => {
                return Err(CompileError::InvalidPredicateShape(format!(
                    "'{method}' requires an argument"
                )));
            }
        }
    }

    Ok(Condition::Predicate {
        field,
        op,
        args,
        negated,
    })
}
