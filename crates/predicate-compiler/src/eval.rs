//! Constant folding by direct native evaluation.
//!
//! The resolver performs the real operation an expression node denotes,
//! against captured values, for the same closed method set the template
//! tables can translate. Reaching a variable slot that is absent from the
//! environment fails with [`CompileError::UncapturedValue`]; the operand
//! compiler relies on that signal to classify column references, so it is
//! deliberately not an error path here.

use crate::error::{CompileError, Result};
use crate::transform::{
    numeric::{IntTransform, IntWidth},
    string::StringTransform,
};
use model::{data_type::DataType, env::CapturedEnv, expr::Expr, value::Value};

/// Resolves an expression node to the concrete value it denotes.
///
/// Referentially transparent: identical node and environment always yield
/// the identical value.
pub fn resolve(expr: &Expr, env: &CapturedEnv) -> Result<Value> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Var(slot) => env
            .get(*slot)
            .cloned()
            .ok_or(CompileError::UncapturedValue(*slot)),
        Expr::FieldAccess { owner, field, .. } => {
            // the value domain holds no composite values to read from;
            // front-ends capture object fields as leaf values instead
            let owner = resolve(owner, env)?;
            Err(CompileError::unsupported_method(
                owner.data_type().sql_name(),
                field.clone(),
            ))
        }
        Expr::MethodCall {
            on,
            method,
            receiver,
            args,
            ..
        } => {
            let args = args
                .iter()
                .map(|arg| resolve(arg, env))
                .collect::<Result<Vec<_>>>()?;
            match receiver {
                Some(receiver) => {
                    let receiver = resolve(receiver, env)?;
                    invoke(*on, method, Some(&receiver), &args)
                }
                None => invoke(*on, method, None, &args),
            }
        }
        Expr::Construct { class, args } => {
            let args = args
                .iter()
                .map(|arg| resolve(arg, env))
                .collect::<Result<Vec<_>>>()?;
            construct(class, &args)
        }
        Expr::Not(_) | Expr::Compare { .. } | Expr::And { .. } | Expr::Or { .. } => {
            Err(CompileError::InvalidPredicateShape(
                "boolean node in value position".to_string(),
            ))
        }
    }
}

fn invoke(on: DataType, method: &str, receiver: Option<&Value>, args: &[Value]) -> Result<Value> {
    match on {
        DataType::String => {
            let transform = StringTransform::of(method)
                .ok_or_else(|| CompileError::unsupported_method(on.sql_name(), method))?;
            let receiver = receiver.ok_or_else(|| {
                CompileError::unsupported_method(on.sql_name(), method)
            })?;
            transform.eval(receiver, args)
        }
        _ => match IntWidth::of(on) {
            Some(width) => {
                let transform = IntTransform::of(method)
                    .ok_or_else(|| CompileError::unsupported_method(on.sql_name(), method))?;
                // instance calls fold their receiver in as the principal operand
                match receiver {
                    Some(receiver) => {
                        let mut full = Vec::with_capacity(args.len() + 1);
                        full.push(receiver.clone());
                        full.extend_from_slice(args);
                        transform.eval(width, &full)
                    }
                    None => transform.eval(width, args),
                }
            }
            None => Err(CompileError::unsupported_method(on.sql_name(), method)),
        },
    }
}

/// Native construction for the supported wrapper classes.
fn construct(class: &str, args: &[Value]) -> Result<Value> {
    let width = match class {
        "String" => {
            return match args {
                [] => Ok(Value::String(String::new())),
                [Value::String(s)] => Ok(Value::String(s.clone())),
                _ => Err(CompileError::unsupported_method(class, "new")),
            };
        }
        "Byte" => IntWidth::W8,
        "Short" => IntWidth::W16,
        "Integer" => IntWidth::W32,
        "Long" => IntWidth::W64,
        _ => return Err(CompileError::unsupported_method(class, "new")),
    };
    match args {
        [arg] => IntTransform::ValueOf.eval(width, std::slice::from_ref(arg)),
        _ => Err(CompileError::unsupported_method(class, "new")),
    }
}
