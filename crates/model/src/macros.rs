/// Creates a literal expression node.
#[macro_export]
macro_rules! lit {
    ($val:expr) => {
        $crate::expr::Expr::Literal($crate::value::Value::from($val))
    };
}

/// Creates a captured-variable reference.
#[macro_export]
macro_rules! cvar {
    ($slot:expr) => {
        $crate::expr::Expr::Var($crate::expr::Slot($slot))
    };
}

/// Creates a record-accessor call on a variable slot, e.g. the `t.name()`
/// at the root of an access chain.
#[macro_export]
macro_rules! getter {
    ($slot:expr, $name:expr, $ty:expr) => {
        $crate::expr::Expr::MethodCall {
            on: $ty,
            method: $name.to_string(),
            receiver: Some(Box::new($crate::expr::Expr::Var($crate::expr::Slot($slot)))),
            args: vec![],
            ret: $ty,
        }
    };
}
