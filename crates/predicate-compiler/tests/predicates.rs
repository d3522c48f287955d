//! End-to-end predicate scenarios, from expression tree to SQL text.

use model::{
    cvar,
    data_type::DataType,
    env::CapturedEnv,
    expr::{CompareOp, Expr},
    getter, lit,
    value::Value,
};
use predicate_compiler::{CompileError, Operand, compile_predicate, operand};

fn name() -> Expr {
    getter!(0, "name", DataType::String)
}

fn age() -> Expr {
    getter!(0, "age", DataType::Int32)
}

fn str_predicate(method: &str, receiver: Expr, args: Vec<Expr>) -> Expr {
    Expr::call(DataType::String, method, receiver, args, DataType::Boolean)
}

#[test]
fn test_equals_scenario() {
    let env = CapturedEnv::new();
    let sql = compile_predicate(&str_predicate("equals", name(), vec![lit!("Bob")]), &env).unwrap();
    assert_eq!(sql, "$name = 'Bob'");
}

#[test]
fn test_contains_scenario() {
    let env = CapturedEnv::new();
    let sql =
        compile_predicate(&str_predicate("contains", name(), vec![lit!("bo")]), &env).unwrap();
    assert_eq!(sql, "$name LIKE '%bo%'");
}

#[test]
fn test_negated_is_blank_scenario() {
    let env = CapturedEnv::new();
    let expr = Expr::not(str_predicate("isBlank", name(), vec![]));
    assert_eq!(compile_predicate(&expr, &env).unwrap(), "NOT LTRIM($name) = ''");
}

#[test]
fn test_and_scenario() {
    let env = CapturedEnv::new();
    let expr = Expr::and(
        Expr::compare(CompareOp::Gt, age(), lit!(5)),
        Expr::compare(CompareOp::Lt, age(), lit!(10)),
    );
    assert_eq!(
        compile_predicate(&expr, &env).unwrap(),
        "( $age > 5 ) AND ( $age < 10 )"
    );
}

#[test]
fn test_or_scenario() {
    let env = CapturedEnv::new();
    let expr = Expr::or(
        Expr::compare(CompareOp::Gt, age(), lit!(5)),
        Expr::compare(CompareOp::Lt, age(), lit!(0)),
    );
    assert_eq!(
        compile_predicate(&expr, &env).unwrap(),
        "(( $age > 5 ) OR ( $age < 0 ))"
    );
}

#[test]
fn test_matches_scenario() {
    let env = CapturedEnv::new();
    let sql =
        compile_predicate(&str_predicate("matches", name(), vec![lit!("A.*")]), &env).unwrap();
    assert_eq!(sql, "$name SIMILAR TO 'A%'");
}

#[test]
fn test_substring_index_conversion() {
    let env = CapturedEnv::new();
    let chain = Expr::call(
        DataType::String,
        "substring",
        name(),
        vec![lit!(1), lit!(4)],
        DataType::String,
    );
    let operand = operand::compile(&chain, &env).unwrap();
    assert_eq!(operand.as_sql(), "SUBSTR($name, 2, 3)");
}

#[test]
fn test_compilation_is_deterministic() {
    let env = CapturedEnv::new().with(1, "Bob");
    let expr = Expr::and(
        Expr::compare(
            CompareOp::GtEq,
            Expr::call(DataType::String, "length", name(), vec![], DataType::Int32),
            lit!(3),
        ),
        str_predicate("startsWith", name(), vec![cvar!(1)]),
    );
    let first = compile_predicate(&expr, &env).unwrap();
    let second = compile_predicate(&expr, &env).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, "( LENGTH($name) >= 3 ) AND $name LIKE 'Bob%'");
}

#[test]
fn test_fully_captured_chain_folds_to_a_literal_operand() {
    let env = CapturedEnv::new().with(0, "Barbara");
    let chain = Expr::call(
        DataType::String,
        "toUpperCase",
        Expr::call(
            DataType::String,
            "substring",
            cvar!(0),
            vec![lit!(1), lit!(4)],
            DataType::String,
        ),
        vec![],
        DataType::String,
    );
    let operand = operand::compile(&chain, &env).unwrap();
    assert_eq!(operand, Operand::Literal(Value::String("ARB".into())));
}

#[test]
fn test_column_detection_normalizes_getter_names() {
    let env = CapturedEnv::new();
    let operand =
        operand::compile(&getter!(0, "getFirstName", DataType::String), &env).unwrap();
    assert_eq!(operand, Operand::Column("firstName".into()));
}

#[test]
fn test_folded_literal_inside_a_comparison() {
    // t.age() > captured + chain folding on the right-hand side
    let env = CapturedEnv::new().with(2, 4i32);
    let right = Expr::static_call(
        DataType::Int32,
        "max",
        vec![cvar!(2), lit!(7)],
        DataType::Int32,
    );
    let expr = Expr::compare(CompareOp::Gt, age(), right);
    assert_eq!(compile_predicate(&expr, &env).unwrap(), "( $age > 7 )");
}

#[test]
fn test_integer_chain_over_column() {
    let env = CapturedEnv::new();
    let expr = Expr::compare(
        CompareOp::Eq,
        Expr::static_call(
            DataType::Int32,
            "bitCount",
            vec![age()],
            DataType::Int32,
        ),
        lit!(1),
    );
    let sql = compile_predicate(&expr, &env).unwrap();
    assert!(sql.starts_with("( CAST((($age & 1) >> 0) + (($age & 2) >> 1)"));
    assert!(sql.ends_with("AS INTEGER) = 1 )"));
    assert_eq!(sql.matches(">>").count(), 32);
}

#[test]
fn test_environment_is_scoped_per_call() {
    // the same tree compiles to a fold or a column depending only on the
    // environment passed to that call
    let tree = str_predicate("equals", name(), vec![cvar!(1)]);
    let with_bob = CapturedEnv::new().with(1, "Bob");
    let with_eve = CapturedEnv::new().with(1, "Eve");
    assert_eq!(
        compile_predicate(&tree, &with_bob).unwrap(),
        "$name = 'Bob'"
    );
    assert_eq!(
        compile_predicate(&tree, &with_eve).unwrap(),
        "$name = 'Eve'"
    );
}

#[test]
fn test_uncaptured_predicate_argument_fails() {
    let env = CapturedEnv::new();
    let expr = str_predicate("equals", name(), vec![cvar!(9)]);
    let err = compile_predicate(&expr, &env).unwrap_err();
    assert!(matches!(err, CompileError::UncapturedValue(_)));
}
