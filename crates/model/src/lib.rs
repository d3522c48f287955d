pub mod data_type;
pub mod env;
pub mod expr;
pub mod macros;
pub mod value;

pub use data_type::DataType;
pub use env::CapturedEnv;
pub use expr::{CompareOp, Expr, Slot};
pub use value::Value;
