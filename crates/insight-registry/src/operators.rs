//! Comparison operators used in filter criteria

use serde::{Deserialize, Serialize};

use crate::{FieldType, RegistryError};

/// Operators comparing a numeric cell against a numeric literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumericOp {
    GreaterThan,
    LessThan,
    EqualTo,
    NotGreaterThan,
    NotLessThan,
    NotEqualTo,
}

impl NumericOp {
    pub const ALL: [NumericOp; 6] = [
        NumericOp::GreaterThan,
        NumericOp::LessThan,
        NumericOp::EqualTo,
        NumericOp::NotGreaterThan,
        NumericOp::NotLessThan,
        NumericOp::NotEqualTo,
    ];

    pub fn phrase(self) -> &'static str {
        match self {
            NumericOp::GreaterThan => "is greater than",
            NumericOp::LessThan => "is less than",
            NumericOp::EqualTo => "is equal to",
            NumericOp::NotGreaterThan => "is not greater than",
            NumericOp::NotLessThan => "is not less than",
            NumericOp::NotEqualTo => "is not equal to",
        }
    }

    pub fn from_phrase(phrase: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.phrase() == phrase)
    }

    pub fn apply(self, cell: f64, literal: f64) -> bool {
        match self {
            NumericOp::GreaterThan => cell > literal,
            NumericOp::LessThan => cell < literal,
            NumericOp::EqualTo => cell == literal,
            NumericOp::NotGreaterThan => cell <= literal,
            NumericOp::NotLessThan => cell >= literal,
            NumericOp::NotEqualTo => cell != literal,
        }
    }
}

/// Operators comparing a string cell against a quoted literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StringOp {
    Is,
    IsNot,
    Includes,
    DoesNotInclude,
    BeginsWith,
    DoesNotBeginWith,
    EndsWith,
    DoesNotEndWith,
}

impl StringOp {
    pub const ALL: [StringOp; 8] = [
        StringOp::Is,
        StringOp::IsNot,
        StringOp::Includes,
        StringOp::DoesNotInclude,
        StringOp::BeginsWith,
        StringOp::DoesNotBeginWith,
        StringOp::EndsWith,
        StringOp::DoesNotEndWith,
    ];

    pub fn phrase(self) -> &'static str {
        match self {
            StringOp::Is => "is",
            StringOp::IsNot => "is not",
            StringOp::Includes => "includes",
            StringOp::DoesNotInclude => "does not include",
            StringOp::BeginsWith => "begins with",
            StringOp::DoesNotBeginWith => "does not begin with",
            StringOp::EndsWith => "ends with",
            StringOp::DoesNotEndWith => "does not end with",
        }
    }

    pub fn from_phrase(phrase: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.phrase() == phrase)
    }

    pub fn apply(self, cell: &str, literal: &str) -> bool {
        match self {
            StringOp::Is => cell == literal,
            StringOp::IsNot => cell != literal,
            StringOp::Includes => cell.contains(literal),
            StringOp::DoesNotInclude => !cell.contains(literal),
            StringOp::BeginsWith => cell.starts_with(literal),
            StringOp::DoesNotBeginWith => !cell.starts_with(literal),
            StringOp::EndsWith => cell.ends_with(literal),
            StringOp::DoesNotEndWith => !cell.ends_with(literal),
        }
    }
}

/// Any filter operator, tagged by the operand type it requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "table", content = "op")]
pub enum Operator {
    Numeric(NumericOp),
    Text(StringOp),
}

impl Operator {
    /// Look up an operator by its sentence phrase. The numeric table wins
    /// when a phrase could belong to both.
    pub fn from_phrase(phrase: &str) -> Result<Self, RegistryError> {
        NumericOp::from_phrase(phrase)
            .map(Operator::Numeric)
            .or_else(|| StringOp::from_phrase(phrase).map(Operator::Text))
            .ok_or_else(|| RegistryError::UnknownOperator(phrase.to_string()))
    }

    pub fn phrase(self) -> &'static str {
        match self {
            Operator::Numeric(op) => op.phrase(),
            Operator::Text(op) => op.phrase(),
        }
    }

    pub fn operand_type(self) -> FieldType {
        match self {
            Operator::Numeric(_) => FieldType::Number,
            Operator::Text(_) => FieldType::String,
        }
    }

    /// Every operator phrase, numeric table first.
    pub fn phrases() -> impl Iterator<Item = &'static str> {
        NumericOp::ALL
            .into_iter()
            .map(NumericOp::phrase)
            .chain(StringOp::ALL.into_iter().map(StringOp::phrase))
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.phrase())
    }
}
