use serde::{Deserialize, Serialize};

/// The scalar types the compiler understands at chain roots and in
/// method dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    String,
    Int8,
    Int16,
    Int32,
    Int64,
    Boolean,
}

impl DataType {
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64
        )
    }

    /// SQL spelling of the type, as used in CAST targets.
    pub fn sql_name(&self) -> &'static str {
        match self {
            DataType::String => "VARCHAR",
            DataType::Int8 => "TINYINT",
            DataType::Int16 => "SMALLINT",
            DataType::Int32 => "INTEGER",
            DataType::Int64 => "BIGINT",
            DataType::Boolean => "BOOLEAN",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_names() {
        assert_eq!(DataType::Int8.sql_name(), "TINYINT");
        assert_eq!(DataType::Int16.sql_name(), "SMALLINT");
        assert_eq!(DataType::Int32.sql_name(), "INTEGER");
        assert_eq!(DataType::Int64.sql_name(), "BIGINT");
        assert_eq!(DataType::String.sql_name(), "VARCHAR");
    }

    #[test]
    fn test_is_integer() {
        assert!(DataType::Int32.is_integer());
        assert!(DataType::Int64.is_integer());
        assert!(!DataType::String.is_integer());
        assert!(!DataType::Boolean.is_integer());
    }
}
