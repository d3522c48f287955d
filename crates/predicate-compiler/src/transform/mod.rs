//! Per-type tables mapping method names to SQL templates and to the
//! native evaluations the resolver folds with.

pub mod numeric;
pub mod string;

use crate::error::{CompileError, Result};
use crate::operand::Operand;
use model::data_type::DataType;
use numeric::{IntTransform, IntWidth};
use string::StringTransform;

/// A template-table entry bound to the value family it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transform {
    Str(StringTransform),
    Int(IntTransform, IntWidth),
}

impl Transform {
    /// Looks up the template for a method on the given declaring type.
    pub fn lookup(on: DataType, method: &str) -> Result<Transform> {
        match on {
            DataType::String => StringTransform::of(method)
                .map(Transform::Str)
                .ok_or_else(|| CompileError::unsupported_method(on.sql_name(), method)),
            _ => match IntWidth::of(on) {
                Some(width) => IntTransform::of(method)
                    .map(|t| Transform::Int(t, width))
                    .ok_or_else(|| CompileError::unsupported_method(on.sql_name(), method)),
                None => Err(CompileError::unsupported_method(on.sql_name(), method)),
            },
        }
    }

    /// Validates the number of template arguments at operand-compile time,
    /// so rendering never sees a mismatched step.
    pub fn check_arity(&self, method: &str, count: usize) -> Result<()> {
        let ok = match self {
            Transform::Str(t) => t.arity().contains(&count),
            Transform::Int(t, _) => t.arity() == count,
        };
        if ok {
            Ok(())
        } else {
            Err(CompileError::InvalidPredicateShape(format!(
                "'{method}' does not take {count} arguments"
            )))
        }
    }

    /// Renders the transform applied to the rendered receiver expression.
    pub fn apply(&self, receiver: &str, args: &[Operand]) -> String {
        match self {
            Transform::Str(t) => t.sql(receiver, args),
            Transform::Int(t, width) => t.sql(*width, receiver, args),
        }
    }
}
