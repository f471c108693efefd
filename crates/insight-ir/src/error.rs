//! Error taxonomy surfaced to callers of the query subsystem

use insight_registry::{AggregateOp, RegistryError};
use thiserror::Error;

pub type QueryResult<T> = Result<T, QueryError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("Syntax error: {0}")]
    Grammar(String),

    #[error("Invalid category: {0}")]
    InvalidCategory(String),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("{op} requires a number field, got {field}")]
    InvalidAggregateField { op: AggregateOp, field: String },

    #[error("Duplicate apply key: {0}")]
    DuplicateName(String),

    #[error("Missing operand: {criteria} criteria joined by {connectives} connectives")]
    MissingOperand { criteria: usize, connectives: usize },

    #[error("Column {0} is neither a group key nor an apply key")]
    InvalidColumns(String),

    #[error("Sort key {0} is not among the displayed columns")]
    InvalidOrderKey(String),

    #[error("Dataset not found: {0}")]
    NotFound(String),
}

impl QueryError {
    pub fn grammar(message: impl Into<String>) -> Self {
        Self::Grammar(message.into())
    }

    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Self::TypeMismatch(message.into())
    }

    pub fn unknown_field(field: impl Into<String>) -> Self {
        Self::UnknownField(field.into())
    }

    /// Stable name of the error kind, independent of the message.
    pub fn kind(&self) -> &'static str {
        match self {
            QueryError::Grammar(_) => "GrammarError",
            QueryError::InvalidCategory(_) => "InvalidCategory",
            QueryError::UnknownField(_) => "UnknownField",
            QueryError::TypeMismatch(_) => "TypeMismatch",
            QueryError::InvalidAggregateField { .. } => "InvalidAggregateField",
            QueryError::DuplicateName(_) => "DuplicateName",
            QueryError::MissingOperand { .. } => "MissingOperand",
            QueryError::InvalidColumns(_) => "InvalidColumns",
            QueryError::InvalidOrderKey(_) => "InvalidOrderKey",
            QueryError::NotFound(_) => "NotFound",
        }
    }
}

impl From<RegistryError> for QueryError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::UnknownOperator(_) | RegistryError::UnknownAggregate(_) => {
                QueryError::Grammar(e.to_string())
            }
            RegistryError::UnknownCategory(kind) => QueryError::InvalidCategory(kind),
            RegistryError::DecimalOverflow(_) | RegistryError::EmptyInput(_) => {
                QueryError::TypeMismatch(e.to_string())
            }
        }
    }
}
