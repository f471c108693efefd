//! Insight query plan
//!
//! The typed representation a sentence is parsed into and the engine
//! consumes. Plans are deterministically serializable so they can be
//! fingerprinted for logging.

use std::collections::BTreeSet;

use insight_registry::{AggregateOp, DatasetKind, KeyAliasMap, Operator};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

mod error;
mod types;

pub use error::{QueryError, QueryResult};
pub use types::{Record, Row, Value};

/// A fully parsed and validated query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPlan {
    pub kind: DatasetKind,
    pub dataset_id: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub criteria: Vec<Criteria>,

    pub display_fields: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub group_fields: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub apply_defs: Vec<ApplyDefinition>,

    #[serde(default)]
    pub order: Order,

    /// `None` when the query is not grouped and any column may be shown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_display_fields: Option<BTreeSet<String>>,
}

impl QueryPlan {
    /// Calculate fingerprint (SHA-256) of the canonical JSON form
    pub fn fingerprint(&self) -> String {
        let json = serde_json::to_string(self).expect("plan should always serialize");
        let mut hasher = Sha256::new();
        hasher.update(json.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    pub fn is_grouped(&self) -> bool {
        !self.group_fields.is_empty()
    }

    pub fn key_map(&self) -> &'static KeyAliasMap {
        self.kind.key_map()
    }
}

/// Boolean connective that follows a criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connective {
    And,
    Or,
}

impl Connective {
    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            "and" => Some(Connective::And),
            "or" => Some(Connective::Or),
            _ => None,
        }
    }

    pub fn combine(self, acc: bool, next: bool) -> bool {
        match self {
            Connective::And => acc && next,
            Connective::Or => acc || next,
        }
    }
}

/// One filter predicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criteria {
    pub field: String,
    pub operator: Operator,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glue: Option<Connective>,
}

impl Criteria {
    /// Apply the predicate to one record. A missing cell, or a cell whose
    /// type differs from the operator's, never matches.
    pub fn evaluate(&self, record: &Record) -> bool {
        match (self.operator, record.get(&self.field), &self.value) {
            (Operator::Numeric(op), Some(Value::Number(cell)), Value::Number(literal)) => {
                op.apply(*cell, *literal)
            }
            (Operator::Text(op), Some(Value::String(cell)), Value::String(literal)) => {
                op.apply(cell, literal)
            }
            _ => false,
        }
    }
}

/// A derived aggregate column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyDefinition {
    pub name: String,
    pub op: AggregateOp,
    pub field: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

impl Direction {
    pub fn from_word(word: &str) -> Option<Self> {
        match word {
            "ascending" => Some(Direction::Ascending),
            "descending" => Some(Direction::Descending),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Order {
    pub direction: Direction,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
}
