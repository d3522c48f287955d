//! Compiles typed predicate expression trees into boolean SQL fragments.
//!
//! The compiler classifies every value-producing sub-expression as a
//! column reference, a closure-captured literal, or a computed transform
//! chain, folds fully captured chains by executing the real method
//! semantics, and renders the result through per-type SQL template
//! tables. Column references stay symbolic (`$name`) until the assembly
//! layer substitutes resolved identifiers.
//!
//! Compilation is pure and total-or-nothing: a compile either returns the
//! finished condition or fails with a [`CompileError`], never partial
//! output. The captured-value environment is an explicit parameter on
//! every call, so concurrent compiles share no state.

pub mod condition;
pub mod error;
pub mod eval;
pub mod operand;
pub mod transform;

pub use condition::{Condition, Connective};
pub use error::{CompileError, Result};
pub use operand::Operand;

use model::{env::CapturedEnv, expr::Expr};

/// Compiles a predicate tree straight to its SQL text.
pub fn compile_predicate(root: &Expr, env: &CapturedEnv) -> Result<String> {
    condition::compile(root, env).map(|condition| condition.to_sql())
}
