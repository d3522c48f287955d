use crate::resolve::{NameResolver, PlainNameResolver};
use indexmap::IndexSet;
use lazy_static::lazy_static;
use predicate_compiler::Condition;
use regex::{Captures, Regex};
use tracing::debug;

lazy_static! {
    static ref COLUMN_PLACEHOLDER: Regex = Regex::new(r"\$(\w+)").unwrap();
}

/// Accumulates compiled conditions for one entity and assembles the final
/// query text. Conditions are deduplicated in insertion order and joined
/// with `AND`.
pub struct QueryBuilder {
    entity: String,
    resolver: Box<dyn NameResolver>,
    conditions: IndexSet<Condition>,
}

impl QueryBuilder {
    pub fn new(entity: impl Into<String>) -> Self {
        Self::with_resolver(entity, Box::new(PlainNameResolver))
    }

    pub fn with_resolver(entity: impl Into<String>, resolver: Box<dyn NameResolver>) -> Self {
        Self {
            entity: entity.into(),
            resolver,
            conditions: IndexSet::new(),
        }
    }

    pub fn add_condition(&mut self, condition: Condition) {
        if !self.conditions.insert(condition) {
            debug!(entity = %self.entity, "duplicate condition dropped");
        }
    }

    /// Renders `SELECT * FROM <table>`, with a `WHERE` clause when any
    /// conditions were added.
    pub fn build(&self) -> String {
        let table = self.resolver.table_name(&self.entity);
        match self.where_clause() {
            Some(clause) => format!("SELECT * FROM {table} WHERE {clause}"),
            None => format!("SELECT * FROM {table}"),
        }
    }

    fn where_clause(&self) -> Option<String> {
        if self.conditions.is_empty() {
            return None;
        }
        let joined = self
            .conditions
            .iter()
            .map(|condition| self.substitute_columns(&condition.to_sql()))
            .collect::<Vec<_>>()
            .join(" AND ");
        Some(joined)
    }

    /// Replaces every `$name` placeholder with the resolved column
    /// identifier.
    fn substitute_columns(&self, sql: &str) -> String {
        COLUMN_PLACEHOLDER
            .replace_all(sql, |caps: &Captures| self.resolver.column_name(&caps[1]))
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::value::Value;
    use predicate_compiler::Operand;
    use predicate_compiler::condition::predicate::StringPredicate;

    fn equals(field: &str, value: &str) -> Condition {
        Condition::Predicate {
            field: Operand::Column(field.into()),
            op: StringPredicate::Equals,
            args: vec![Operand::Literal(Value::String(value.into()))],
            negated: false,
        }
    }

    #[test]
    fn test_build_without_conditions() {
        let builder = QueryBuilder::new("UserAccount");
        assert_eq!(builder.build(), "SELECT * FROM user_account");
    }

    #[test]
    fn test_build_substitutes_placeholders() {
        let mut builder = QueryBuilder::new("User");
        builder.add_condition(equals("firstName", "Bob"));
        assert_eq!(
            builder.build(),
            "SELECT * FROM user WHERE first_name = 'Bob'"
        );
    }

    #[test]
    fn test_conditions_join_with_and() {
        let mut builder = QueryBuilder::new("User");
        builder.add_condition(equals("firstName", "Bob"));
        builder.add_condition(equals("lastName", "Doe"));
        assert_eq!(
            builder.build(),
            "SELECT * FROM user WHERE first_name = 'Bob' AND last_name = 'Doe'"
        );
    }

    #[test]
    fn test_duplicates_are_dropped_in_insertion_order() {
        let mut builder = QueryBuilder::new("User");
        builder.add_condition(equals("a", "1"));
        builder.add_condition(equals("b", "2"));
        builder.add_condition(equals("a", "1"));
        assert_eq!(
            builder.build(),
            "SELECT * FROM user WHERE a = '1' AND b = '2'"
        );
    }
}
