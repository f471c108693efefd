//! Operator and key registries
//!
//! Static tables shared by the parser and the engine:
//! - comparison operators over numbers and strings
//! - aggregate operators (MIN/MAX/AVG/SUM/COUNT)
//! - per-dataset-kind key alias maps

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod aggregate;
mod keys;
mod operators;

pub use aggregate::{count_distinct, AggregateOp};
pub use keys::{DatasetKind, KeyAliasMap};
pub use operators::{NumericOp, Operator, StringOp};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Unknown operator: {0}")]
    UnknownOperator(String),

    #[error("Unknown aggregate: {0}")]
    UnknownAggregate(String),

    #[error("Invalid category: {0}")]
    UnknownCategory(String),

    #[error("Value {0} cannot be represented as a decimal")]
    DecimalOverflow(f64),

    #[error("{0} needs at least one value")]
    EmptyInput(AggregateOp),
}

/// Operand type of a field, literal or operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Number,
    String,
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldType::Number => f.write_str("number"),
            FieldType::String => f.write_str("string"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_lookup() {
        let op = Operator::from_phrase("is not greater than").unwrap();
        assert_eq!(op, Operator::Numeric(NumericOp::NotGreaterThan));
        assert_eq!(op.operand_type(), FieldType::Number);

        let op = Operator::from_phrase("does not begin with").unwrap();
        assert_eq!(op.operand_type(), FieldType::String);
    }

    #[test]
    fn test_key_lookup() {
        let keys = DatasetKind::Rooms.key_map();
        assert_eq!(keys.resolve("Short Name"), Some("shortname"));
        assert_eq!(keys.field_type("seats"), Some(FieldType::Number));
        assert!(keys.resolve("Average").is_none());
    }
}
