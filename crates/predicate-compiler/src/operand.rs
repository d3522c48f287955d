//! Classification of value-producing nodes into column references,
//! folded literals, and computed transform chains.

use crate::error::{CompileError, Result};
use crate::eval;
use crate::transform::{Transform, numeric::IntWidth};
use model::{data_type::DataType, env::CapturedEnv, expr::Expr, value::Value};
use tracing::debug;

/// A fully classified operand of a condition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operand {
    /// A table field, rendered as a symbolic `$name` placeholder until
    /// query assembly substitutes the resolved identifier.
    Column(String),
    /// A literal, either written in the predicate body or folded out of a
    /// fully captured call chain.
    Literal(Value),
    /// A transform chain over a column or literal base. Steps apply in
    /// call order, innermost first.
    Computed {
        base: Box<Operand>,
        steps: Vec<TransformStep>,
    },
}

/// One template application within a computed operand.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransformStep {
    pub transform: Transform,
    pub args: Vec<Operand>,
}

impl TransformStep {
    fn apply(&self, receiver: &str) -> String {
        self.transform.apply(receiver, &self.args)
    }
}

impl Operand {
    /// Renders the operand to SQL text, folding the base through every
    /// transform step.
    pub fn as_sql(&self) -> String {
        match self {
            Operand::Column(name) => format!("${name}"),
            Operand::Literal(value) => value.to_string(),
            Operand::Computed { base, steps } => steps
                .iter()
                .fold(base.as_sql(), |acc, step| step.apply(&acc)),
        }
    }

    /// Bare text for templates that supply their own quoting; non-literal
    /// operands fall back to their rendered form.
    pub fn raw_text(&self) -> String {
        match self {
            Operand::Literal(value) => value.raw_text(),
            other => other.as_sql(),
        }
    }

    pub fn as_literal_int(&self) -> Option<i64> {
        match self {
            Operand::Literal(value) => value.as_i64(),
            _ => None,
        }
    }
}

/// Compiles a value-producing node into an operand.
pub fn compile(expr: &Expr, env: &CapturedEnv) -> Result<Operand> {
    if let Some(ty) = root_type(expr, env) {
        if ty != DataType::String && IntWidth::of(ty).is_none() {
            return Err(CompileError::UnsupportedType(ty));
        }
    }
    build(expr, env)
}

/// Declared type at the root of the access chain, when statically known.
fn root_type(expr: &Expr, env: &CapturedEnv) -> Option<DataType> {
    match expr {
        Expr::Literal(value) => Some(value.data_type()),
        Expr::Var(slot) => env.get(*slot).map(Value::data_type),
        Expr::FieldAccess { owner, ty, .. } => match owner.as_ref() {
            Expr::FieldAccess { .. } | Expr::MethodCall { .. } => root_type(owner, env),
            _ => Some(*ty),
        },
        Expr::MethodCall {
            receiver: Some(receiver),
            ret,
            ..
        } => match receiver.as_ref() {
            Expr::FieldAccess { .. } | Expr::MethodCall { .. } => root_type(receiver, env),
            _ => Some(*ret),
        },
        Expr::MethodCall {
            receiver: None,
            args,
            ret,
            ..
        } => match args.first() {
            Some(arg @ (Expr::FieldAccess { .. } | Expr::MethodCall { .. })) => {
                root_type(arg, env)
            }
            _ => Some(*ret),
        },
        Expr::Construct { .. } => None,
        Expr::Not(_) | Expr::Compare { .. } | Expr::And { .. } | Expr::Or { .. } => {
            Some(DataType::Boolean)
        }
    }
}

fn build(expr: &Expr, env: &CapturedEnv) -> Result<Operand> {
    match expr {
        Expr::Literal(value) => Ok(Operand::Literal(value.clone())),
        Expr::Var(_) => eval::resolve(expr, env).map(Operand::Literal),
        // an accessor over an uncaptured variable denotes a column
        Expr::FieldAccess { owner, field, .. } if is_column_root(owner, env) => {
            Ok(Operand::Column(field.clone()))
        }
        Expr::MethodCall {
            method,
            receiver: Some(receiver),
            ..
        } if is_column_root(receiver, env) => {
            Ok(Operand::Column(accessor_to_field_name(method)))
        }
        Expr::MethodCall {
            on,
            method,
            receiver: Some(receiver),
            args,
            ..
        } => match eval::resolve(expr, env) {
            Ok(value) => Ok(Operand::Literal(value)),
            Err(CompileError::UncapturedValue(_)) => {
                debug!(%method, "fold hit a column reference, building a transform chain");
                let base = build(receiver, env)?;
                let step = make_step(*on, method, args, env)?;
                Ok(wrap(base, step))
            }
            Err(other) => Err(other),
        },
        Expr::MethodCall {
            on,
            method,
            receiver: None,
            args,
            ..
        } => match eval::resolve(expr, env) {
            Ok(value) => Ok(Operand::Literal(value)),
            Err(CompileError::UncapturedValue(_)) => {
                // the first argument is the transformed operand, the rest
                // become template arguments
                let (first, rest) = args.split_first().ok_or_else(|| {
                    CompileError::unsupported_method(on.sql_name(), method.clone())
                })?;
                let base = build(first, env)?;
                let step = make_step(*on, method, rest, env)?;
                Ok(wrap(base, step))
            }
            Err(other) => Err(other),
        },
        Expr::FieldAccess { .. } | Expr::Construct { .. } => {
            eval::resolve(expr, env).map(Operand::Literal)
        }
        Expr::Not(_) | Expr::Compare { .. } | Expr::And { .. } | Expr::Or { .. } => {
            Err(CompileError::InvalidPredicateShape(
                "boolean node in operand position".to_string(),
            ))
        }
    }
}

fn is_column_root(node: &Expr, env: &CapturedEnv) -> bool {
    matches!(node, Expr::Var(slot) if !env.contains(*slot))
}

fn wrap(base: Operand, step: TransformStep) -> Operand {
    match base {
        Operand::Computed { base, mut steps } => {
            steps.push(step);
            Operand::Computed { base, steps }
        }
        other => Operand::Computed {
            base: Box::new(other),
            steps: vec![step],
        },
    }
}

fn make_step(on: DataType, method: &str, args: &[Expr], env: &CapturedEnv) -> Result<TransformStep> {
    let transform = Transform::lookup(on, method)?;
    let args = args
        .iter()
        .map(|arg| compile(arg, env))
        .collect::<Result<Vec<_>>>()?;
    transform.check_arity(method, args.len())?;
    Ok(TransformStep { transform, args })
}

/// Normalizes a getter name to its field name: `getX` becomes `x`, any
/// other accessor name is taken verbatim.
pub(crate) fn accessor_to_field_name(method: &str) -> String {
    let lowered = method.strip_prefix("get").and_then(|rest| {
        let mut chars = rest.chars();
        chars
            .next()
            .map(|first| format!("{}{}", first.to_lowercase(), chars.as_str()))
    });
    lowered.unwrap_or_else(|| method.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::{cvar, getter, lit};

    #[test]
    fn test_accessor_normalization() {
        assert_eq!(accessor_to_field_name("getName"), "name");
        assert_eq!(accessor_to_field_name("getFirstName"), "firstName");
        assert_eq!(accessor_to_field_name("name"), "name");
        assert_eq!(accessor_to_field_name("get"), "get");
    }

    #[test]
    fn test_literal_compiles_to_literal() {
        let env = CapturedEnv::new();
        assert_eq!(
            compile(&lit!(5), &env).unwrap(),
            Operand::Literal(Value::Int(5))
        );
    }

    #[test]
    fn test_accessor_on_uncaptured_var_is_a_column() {
        let env = CapturedEnv::new();
        let operand = compile(&getter!(0, "getName", DataType::String), &env).unwrap();
        assert_eq!(operand, Operand::Column("name".into()));
        assert_eq!(operand.as_sql(), "$name");
    }

    #[test]
    fn test_field_access_on_uncaptured_var_is_a_column() {
        let env = CapturedEnv::new();
        let expr = Expr::field(cvar!(0), "age", DataType::Int32);
        let operand = compile(&expr, &env).unwrap();
        assert_eq!(operand, Operand::Column("age".into()));
    }

    #[test]
    fn test_fully_captured_chain_folds_to_literal() {
        let env = CapturedEnv::new().with(1, "Barbara");
        let expr = Expr::call(
            DataType::String,
            "substring",
            cvar!(1),
            vec![lit!(1), lit!(4)],
            DataType::String,
        );
        let operand = compile(&expr, &env).unwrap();
        assert_eq!(operand, Operand::Literal(Value::String("arb".into())));
        assert_eq!(operand.as_sql(), "'arb'");
    }

    #[test]
    fn test_chain_over_column_becomes_computed() {
        let env = CapturedEnv::new();
        let expr = Expr::call(
            DataType::String,
            "toUpperCase",
            Expr::call(
                DataType::String,
                "substring",
                getter!(0, "name", DataType::String),
                vec![lit!(1), lit!(4)],
                DataType::String,
            ),
            vec![],
            DataType::String,
        );
        let operand = compile(&expr, &env).unwrap();
        match &operand {
            Operand::Computed { base, steps } => {
                assert_eq!(**base, Operand::Column("name".into()));
                assert_eq!(steps.len(), 2);
            }
            other => panic!("expected a computed operand, got {other:?}"),
        }
        assert_eq!(operand.as_sql(), "UPPER(SUBSTR($name, 2, 3))");
    }

    #[test]
    fn test_static_call_over_column() {
        let env = CapturedEnv::new();
        let expr = Expr::static_call(
            DataType::Int32,
            "toBinaryString",
            vec![getter!(0, "age", DataType::Int32)],
            DataType::String,
        );
        let operand = compile(&expr, &env).unwrap();
        assert_eq!(operand.as_sql(), "BIN($age)");
    }

    #[test]
    fn test_static_call_merges_into_existing_chain() {
        // Long.toHexString(Math.abs(t.age()))
        let env = CapturedEnv::new();
        let abs = Expr::static_call(
            DataType::Int64,
            "abs",
            vec![getter!(0, "age", DataType::Int64)],
            DataType::Int64,
        );
        let hex = Expr::static_call(
            DataType::Int64,
            "toHexString",
            vec![abs],
            DataType::String,
        );
        let operand = compile(&hex, &env).unwrap();
        match &operand {
            Operand::Computed { base, steps } => {
                assert_eq!(**base, Operand::Column("age".into()));
                assert_eq!(steps.len(), 2);
            }
            other => panic!("expected a computed operand, got {other:?}"),
        }
        assert_eq!(operand.as_sql(), "HEX(ABS($age))");
    }

    #[test]
    fn test_captured_args_fold_inside_a_chain() {
        let env = CapturedEnv::new().with(7, 3i32);
        let expr = Expr::call(
            DataType::String,
            "repeat",
            getter!(0, "sep", DataType::String),
            vec![cvar!(7)],
            DataType::String,
        );
        let operand = compile(&expr, &env).unwrap();
        assert_eq!(operand.as_sql(), "RPAD('', 3, $sep)");
    }

    #[test]
    fn test_boolean_root_is_unsupported() {
        let env = CapturedEnv::new();
        let expr = Expr::compare(model::expr::CompareOp::Eq, lit!(1), lit!(2));
        let err = compile(&expr, &env).unwrap_err();
        assert_eq!(err, CompileError::UnsupportedType(DataType::Boolean));
    }

    #[test]
    fn test_unknown_method_in_chain_is_rejected() {
        let env = CapturedEnv::new();
        let expr = Expr::call(
            DataType::String,
            "reverse",
            getter!(0, "name", DataType::String),
            vec![],
            DataType::String,
        );
        let err = compile(&expr, &env).unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedMethod { .. }));
    }

    #[test]
    fn test_bare_uncaptured_var_propagates_the_signal() {
        let env = CapturedEnv::new();
        let err = compile(&cvar!(0), &env).unwrap_err();
        assert!(matches!(err, CompileError::UncapturedValue(_)));
    }
}
