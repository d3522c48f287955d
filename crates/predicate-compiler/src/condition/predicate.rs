//! SQL translation of boolean-returning string methods.

use crate::operand::Operand;
use tracing::warn;

/// One translatable string predicate. Templates substitute `!var` with the
/// rendered field operand and `!val` with the raw text of the first
/// argument; the template supplies its own quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringPredicate {
    Equals,
    Contains,
    StartsWith,
    EndsWith,
    Matches,
    Empty,
    Blank,
}

impl StringPredicate {
    pub fn of(method: &str) -> Option<StringPredicate> {
        match method {
            "equals" | "equalsIgnoreCase" => Some(StringPredicate::Equals),
            "contains" => Some(StringPredicate::Contains),
            "startsWith" => Some(StringPredicate::StartsWith),
            "endsWith" => Some(StringPredicate::EndsWith),
            "matches" => Some(StringPredicate::Matches),
            "isBlank" => Some(StringPredicate::Blank),
            "isEmpty" => Some(StringPredicate::Empty),
            _ => None,
        }
    }

    fn template(&self) -> &'static str {
        match self {
            StringPredicate::Equals => "!var = '!val'",
            StringPredicate::Contains => "!var LIKE '%!val%'",
            StringPredicate::StartsWith => "!var LIKE '!val%'",
            StringPredicate::EndsWith => "!var LIKE '%!val'",
            StringPredicate::Matches => "!var SIMILAR TO '!val'",
            StringPredicate::Empty => "!var = ''",
            StringPredicate::Blank => "LTRIM(!var) = ''",
        }
    }

    /// Whether the template consumes an argument value.
    pub fn takes_value(&self) -> bool {
        !matches!(self, StringPredicate::Empty | StringPredicate::Blank)
    }

    /// Post-processes the raw argument text before substitution. For
    /// `matches` this rewrites the regex wildcard `.*` to the SQL wildcard
    /// `%` — a partial translation by design; any other regex construct
    /// passes through untouched.
    fn post_process(&self, value: &str) -> String {
        match self {
            StringPredicate::Matches => {
                let rewritten = value.replace(".*", "%");
                if rewritten
                    .chars()
                    .any(|c| matches!(c, '.' | '*' | '+' | '?' | '[' | ']' | '(' | ')' | '|' | '^' | '$' | '\\'))
                {
                    warn!(
                        pattern = %value,
                        "regex constructs other than '.*' are not translated to SIMILAR TO"
                    );
                }
                rewritten
            }
            _ => value.to_string(),
        }
    }

    /// Renders the predicate over a compiled field operand and arguments.
    pub fn render(&self, field: &Operand, args: &[Operand]) -> String {
        let template = self.template();
        let mut sql = template.replace("!var", &field.as_sql());
        if template.contains("!val") {
            sql = sql.replace("!val", &self.post_process(&args[0].raw_text()));
        }
        sql
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::value::Value;

    fn name_col() -> Operand {
        Operand::Column("name".into())
    }

    #[test]
    fn test_equals_template() {
        let sql = StringPredicate::Equals
            .render(&name_col(), &[Operand::Literal(Value::String("Bob".into()))]);
        assert_eq!(sql, "$name = 'Bob'");
    }

    #[test]
    fn test_like_templates() {
        let arg = [Operand::Literal(Value::String("bo".into()))];
        assert_eq!(
            StringPredicate::Contains.render(&name_col(), &arg),
            "$name LIKE '%bo%'"
        );
        assert_eq!(
            StringPredicate::StartsWith.render(&name_col(), &arg),
            "$name LIKE 'bo%'"
        );
        assert_eq!(
            StringPredicate::EndsWith.render(&name_col(), &arg),
            "$name LIKE '%bo'"
        );
    }

    #[test]
    fn test_matches_rewrites_the_wildcard() {
        let sql = StringPredicate::Matches
            .render(&name_col(), &[Operand::Literal(Value::String("A.*".into()))]);
        assert_eq!(sql, "$name SIMILAR TO 'A%'");
    }

    #[test]
    fn test_zero_argument_templates() {
        assert_eq!(StringPredicate::Empty.render(&name_col(), &[]), "$name = ''");
        assert_eq!(
            StringPredicate::Blank.render(&name_col(), &[]),
            "LTRIM($name) = ''"
        );
    }

    #[test]
    fn test_equals_ignore_case_shares_the_equals_entry() {
        assert_eq!(
            StringPredicate::of("equalsIgnoreCase"),
            Some(StringPredicate::Equals)
        );
    }
}
