//! Resolution of symbolic entity and field names to database identifiers.

use lazy_static::lazy_static;
use regex::Regex;

/// Maps the compiler's symbolic names to dialect-correct identifiers.
pub trait NameResolver: Send + Sync {
    fn table_name(&self, entity: &str) -> String;
    fn column_name(&self, field: &str) -> String;
}

/// Snake-cases camel-case names, the default policy for record types.
#[derive(Debug, Clone, Default)]
pub struct PlainNameResolver;

impl NameResolver for PlainNameResolver {
    fn table_name(&self, entity: &str) -> String {
        to_snake_case(entity)
    }

    fn column_name(&self, field: &str) -> String {
        to_snake_case(field)
    }
}

lazy_static! {
    static ref ACRONYM_BOUNDARY: Regex = Regex::new("([A-Z]+)([A-Z][a-z])").unwrap();
    static ref WORD_BOUNDARY: Regex = Regex::new("([a-z])([A-Z])").unwrap();
}

fn to_snake_case(camel: &str) -> String {
    let spaced = ACRONYM_BOUNDARY.replace_all(camel, "${1}_${2}");
    WORD_BOUNDARY
        .replace_all(&spaced, "${1}_${2}")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_case() {
        let resolver = PlainNameResolver;
        assert_eq!(resolver.column_name("firstName"), "first_name");
        assert_eq!(resolver.column_name("name"), "name");
        assert_eq!(resolver.table_name("UserAccount"), "user_account");
        assert_eq!(resolver.table_name("HTTPServer"), "http_server");
    }
}
