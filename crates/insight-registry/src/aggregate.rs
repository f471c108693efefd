//! Aggregate operators applied to grouped buckets

use std::collections::HashSet;
use std::hash::Hash;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::{FieldType, RegistryError};

/// Fractional digits kept by AVG and SUM.
const DECIMAL_PLACES: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AggregateOp {
    Min,
    Max,
    Avg,
    Sum,
    Count,
}

impl AggregateOp {
    pub const ALL: [AggregateOp; 5] = [
        AggregateOp::Min,
        AggregateOp::Max,
        AggregateOp::Avg,
        AggregateOp::Sum,
        AggregateOp::Count,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AggregateOp::Min => "MIN",
            AggregateOp::Max => "MAX",
            AggregateOp::Avg => "AVG",
            AggregateOp::Sum => "SUM",
            AggregateOp::Count => "COUNT",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, RegistryError> {
        Self::ALL
            .into_iter()
            .find(|op| op.name() == name)
            .ok_or_else(|| RegistryError::UnknownAggregate(name.to_string()))
    }

    /// COUNT works on any field; the rest need numbers.
    pub fn accepts(self, field_type: FieldType) -> bool {
        self == AggregateOp::Count || field_type == FieldType::Number
    }

    /// Reduce a bucket of numeric cells.
    pub fn reduce(self, values: &[f64]) -> Result<f64, RegistryError> {
        if values.is_empty() && self != AggregateOp::Count {
            return Err(RegistryError::EmptyInput(self));
        }

        match self {
            AggregateOp::Min => Ok(values.iter().copied().fold(f64::INFINITY, f64::min)),
            AggregateOp::Max => Ok(values.iter().copied().fold(f64::NEG_INFINITY, f64::max)),
            AggregateOp::Sum => round(decimal_sum(values)?),
            AggregateOp::Avg => {
                let sum = decimal_sum(values)?;
                let avg = sum
                    .checked_div(Decimal::from(values.len()))
                    .ok_or(RegistryError::DecimalOverflow(f64::NAN))?;
                round(avg)
            }
            AggregateOp::Count => {
                Ok(count_distinct(values.iter().map(|v| normalized_bits(*v))) as f64)
            }
        }
    }
}

impl std::fmt::Display for AggregateOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Number of distinct items; duplicates collapse.
pub fn count_distinct<T: Eq + Hash>(values: impl IntoIterator<Item = T>) -> usize {
    values.into_iter().collect::<HashSet<_>>().len()
}

// f64 Display is the shortest round-tripping form, so parsing it back keeps
// the literal the record was written with instead of the binary expansion.
fn to_decimal(value: f64) -> Result<Decimal, RegistryError> {
    if !value.is_finite() {
        return Err(RegistryError::DecimalOverflow(value));
    }
    Decimal::from_str(&value.to_string()).map_err(|_| RegistryError::DecimalOverflow(value))
}

fn decimal_sum(values: &[f64]) -> Result<Decimal, RegistryError> {
    values.iter().try_fold(Decimal::ZERO, |acc, v| {
        acc.checked_add(to_decimal(*v)?)
            .ok_or(RegistryError::DecimalOverflow(*v))
    })
}

fn round(value: Decimal) -> Result<f64, RegistryError> {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .ok_or(RegistryError::DecimalOverflow(f64::NAN))
}

fn normalized_bits(value: f64) -> u64 {
    if value == 0.0 {
        0.0f64.to_bits()
    } else {
        value.to_bits()
    }
}
