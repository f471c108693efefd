//! Insight execution engine
//!
//! Applies a parsed `QueryPlan` to an in-memory table of records. Stages
//! run in a fixed order: filter, group, aggregate, project, sort, rename.

use serde::Serialize;
use tracing::{debug, instrument};

use insight_ir::{QueryError, QueryPlan, QueryResult, Record, Row};

mod filter;
mod group;
mod shape;
mod source;

pub use filter::{filter, matches};
pub use group::{aggregate, group, GroupKey};
pub use shape::{project, rename, sort};
pub use source::{DatasetInfo, DatasetSource, MemoryStore, RecordSet};

/// Ordered result rows of one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryOutput {
    pub rows: Vec<Row>,
    pub count: usize,
}

/// Run every stage of `plan` over `records`.
pub fn run_pipeline(plan: &QueryPlan, records: &[Record]) -> QueryResult<QueryOutput> {
    let filtered = filter(&plan.criteria, records);
    debug!(input = records.len(), kept = filtered.len(), "filter");

    let mut rows = if plan.is_grouped() {
        let buckets = group(&plan.group_fields, filtered);
        debug!(groups = buckets.len(), "group");
        let grouped = aggregate(&plan.group_fields, &plan.apply_defs, buckets)?;
        project(&plan.display_fields, &grouped)
    } else {
        project(&plan.display_fields, filtered)
    };

    sort(&mut rows, &plan.order);
    let rows = rename(rows, &plan.dataset_id, plan.key_map());
    let count = rows.len();
    Ok(QueryOutput { rows, count })
}

/// Loads datasets from a source and runs plans against them.
pub struct Executor<S> {
    source: S,
}

impl<S: DatasetSource> Executor<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    #[instrument(skip_all, fields(dataset = %plan.dataset_id))]
    pub fn execute(&self, plan: &QueryPlan) -> QueryResult<QueryOutput> {
        let set = self.source.load(&plan.dataset_id)?;
        execute_set(plan, &set)
    }
}

/// Run `plan` over an already loaded dataset, checking its kind first.
pub fn execute_set(plan: &QueryPlan, set: &RecordSet) -> QueryResult<QueryOutput> {
    if set.kind != plan.kind {
        return Err(QueryError::InvalidCategory(format!(
            "dataset {} holds {}, not {}",
            plan.dataset_id, set.kind, plan.kind
        )));
    }
    run_pipeline(plan, &set.records)
}
