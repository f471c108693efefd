//! Record source boundary and the in-memory dataset store

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use insight_ir::{QueryError, QueryResult, Record};
use insight_registry::DatasetKind;

/// Records of one dataset, as handed to the engine.
#[derive(Debug, Clone)]
pub struct RecordSet {
    pub kind: DatasetKind,
    pub records: Arc<Vec<Record>>,
    pub count: usize,
}

/// Summary of a stored dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetInfo {
    pub id: String,
    pub kind: DatasetKind,
    #[serde(rename = "numRows")]
    pub num_rows: usize,
}

/// Resolves a dataset id to its records.
pub trait DatasetSource {
    fn load(&self, id: &str) -> QueryResult<RecordSet>;
}

impl<S: DatasetSource + ?Sized> DatasetSource for &S {
    fn load(&self, id: &str) -> QueryResult<RecordSet> {
        (**self).load(id)
    }
}

/// Datasets held in memory, keyed by id.
#[derive(Debug, Default)]
pub struct MemoryStore {
    datasets: BTreeMap<String, RecordSet>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.datasets.contains_key(id)
    }

    /// Store a dataset, replacing any previous one with the same id.
    pub fn insert(&mut self, id: impl Into<String>, kind: DatasetKind, records: Vec<Record>) -> DatasetInfo {
        let id = id.into();
        let count = records.len();
        self.datasets.insert(
            id.clone(),
            RecordSet {
                kind,
                records: Arc::new(records),
                count,
            },
        );
        DatasetInfo {
            id,
            kind,
            num_rows: count,
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<DatasetInfo> {
        self.datasets.remove(id).map(|set| DatasetInfo {
            id: id.to_string(),
            kind: set.kind,
            num_rows: set.count,
        })
    }

    /// Every stored dataset, sorted by id.
    pub fn list(&self) -> Vec<DatasetInfo> {
        self.datasets
            .iter()
            .map(|(id, set)| DatasetInfo {
                id: id.clone(),
                kind: set.kind,
                num_rows: set.count,
            })
            .collect()
    }
}

impl DatasetSource for MemoryStore {
    fn load(&self, id: &str) -> QueryResult<RecordSet> {
        self.datasets
            .get(id)
            .cloned()
            .ok_or_else(|| QueryError::NotFound(id.to_string()))
    }
}
