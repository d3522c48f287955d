use model::{data_type::DataType, expr::Slot};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompileError {
    /// A variable slot was not found in the captured environment. The
    /// operand compiler catches this to classify column references; on a
    /// well-formed predicate it never reaches the caller.
    #[error("No captured value for slot {0}")]
    UncapturedValue(Slot),

    #[error("Unsupported operand root type: {}", .0.sql_name())]
    UnsupportedType(DataType),

    #[error("No SQL translation for {ty} method '{method}'")]
    UnsupportedMethod { ty: String, method: String },

    #[error("Invalid predicate shape: {0}")]
    InvalidPredicateShape(String),

    #[error("Evaluation of '{method}' failed: {message}")]
    Evaluation { method: String, message: String },
}

pub type Result<T> = std::result::Result<T, CompileError>;

impl CompileError {
    pub(crate) fn unsupported_method(ty: impl Into<String>, method: impl Into<String>) -> Self {
        CompileError::UnsupportedMethod {
            ty: ty.into(),
            method: method.into(),
        }
    }

    pub(crate) fn evaluation(method: impl Into<String>, message: impl Into<String>) -> Self {
        CompileError::Evaluation {
            method: method.into(),
            message: message.into(),
        }
    }
}
