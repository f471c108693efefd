//! Dataset management and query entry point shared by every transport

use std::time::Instant;

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, Level};
use uuid::Uuid;

use insight_engine::{execute_set, DatasetInfo, DatasetSource, MemoryStore};
use insight_ir::{QueryError, Record, Row};
use insight_registry::DatasetKind;

use crate::config::LimitsConfig;

#[derive(Debug, Error)]
pub enum FacadeError {
    #[error("Invalid dataset id: {0:?}")]
    InvalidId(String),

    #[error("Dataset already exists: {0}")]
    AlreadyExists(String),

    #[error("Dataset {0} contains no valid data")]
    NoValidData(String),

    #[error("Dataset has {count} records, limit is {limit}")]
    TooManyRecords { count: usize, limit: usize },

    #[error("Dataset not found: {0}")]
    NotFound(String),

    #[error("Query is {len} bytes, limit is {limit}")]
    SentenceTooLong { len: usize, limit: usize },

    #[error("Query execution aborted: {0}")]
    Aborted(String),

    #[error(transparent)]
    Query(#[from] QueryError),
}

pub struct InsightFacade {
    store: RwLock<MemoryStore>,
    limits: LimitsConfig,
}

impl InsightFacade {
    pub fn new(limits: LimitsConfig) -> Self {
        Self {
            store: RwLock::new(MemoryStore::new()),
            limits,
        }
    }

    /// Register a dataset. Records missing a field of the kind, or holding a
    /// field with the wrong type, are dropped.
    pub async fn add_dataset(
        &self,
        id: &str,
        kind: DatasetKind,
        records: Vec<Record>,
    ) -> Result<DatasetInfo, FacadeError> {
        if !is_valid_id(id) {
            return Err(FacadeError::InvalidId(id.to_string()));
        }
        if records.len() > self.limits.max_dataset_records {
            return Err(FacadeError::TooManyRecords {
                count: records.len(),
                limit: self.limits.max_dataset_records,
            });
        }

        let total = records.len();
        let records: Vec<Record> = records
            .into_iter()
            .filter(|record| conforms(kind, record))
            .collect();
        if records.is_empty() {
            return Err(FacadeError::NoValidData(id.to_string()));
        }

        let mut store = self.store.write().await;
        if store.contains(id) {
            return Err(FacadeError::AlreadyExists(id.to_string()));
        }
        let info = store.insert(id, kind, records);
        info!(
            dataset = %info.id,
            kind = %info.kind,
            rows = info.num_rows,
            dropped = total - info.num_rows,
            "dataset added"
        );
        Ok(info)
    }

    pub async fn remove_dataset(&self, id: &str) -> Result<String, FacadeError> {
        if !is_valid_id(id) {
            return Err(FacadeError::InvalidId(id.to_string()));
        }
        let removed = self.store.write().await.remove(id);
        match removed {
            Some(info) => {
                info!(dataset = %info.id, "dataset removed");
                Ok(info.id)
            }
            None => Err(FacadeError::NotFound(id.to_string())),
        }
    }

    pub async fn list_datasets(&self) -> Vec<DatasetInfo> {
        self.store.read().await.list()
    }

    /// Parse and run one sentence against the stored datasets.
    pub async fn perform_query(&self, sentence: &str) -> Result<Vec<Row>, FacadeError> {
        if sentence.len() > self.limits.max_sentence_bytes {
            return Err(FacadeError::SentenceTooLong {
                len: sentence.len(),
                limit: self.limits.max_sentence_bytes,
            });
        }

        let request_id = Uuid::new_v4();
        let started = Instant::now();

        let plan = match insight_parser::parse(sentence) {
            Ok(plan) => plan,
            Err(e) => {
                crate::log_event!(
                    level: Level::WARN,
                    event: "query_rejected",
                    request_id: request_id,
                    error_kind: e.kind(),
                    error: e.to_string()
                );
                return Err(e.into());
            }
        };
        let fingerprint = plan.fingerprint();

        // The record set shares its rows, so the lock is held only for the lookup.
        let loaded = self.store.read().await.load(&plan.dataset_id);
        let result = match loaded {
            Ok(set) => {
                let task_plan = plan.clone();
                tokio::task::spawn_blocking(move || execute_set(&task_plan, &set))
                    .await
                    .map_err(|e| FacadeError::Aborted(e.to_string()))?
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(output) => {
                crate::log_event!(
                    level: Level::INFO,
                    event: "query_executed",
                    request_id: request_id,
                    fingerprint: fingerprint,
                    dataset: plan.dataset_id,
                    rows: output.count,
                    duration_ms: started.elapsed().as_millis()
                );
                Ok(output.rows)
            }
            Err(e) => {
                crate::log_event!(
                    level: Level::WARN,
                    event: "query_failed",
                    request_id: request_id,
                    fingerprint: fingerprint,
                    error_kind: e.kind(),
                    error: e.to_string()
                );
                Err(e.into())
            }
        }
    }
}

fn is_valid_id(id: &str) -> bool {
    !id.trim().is_empty() && !id.contains('_') && !id.chars().any(char::is_whitespace)
}

fn conforms(kind: DatasetKind, record: &Record) -> bool {
    kind.key_map()
        .fields()
        .all(|(field, ty)| record.get(field).map(|v| v.field_type()) == Some(ty))
}

#[cfg(test)]
mod tests {
    use super::*;
    use insight_ir::Value;
    use pretty_assertions::assert_eq;

    fn facade() -> InsightFacade {
        InsightFacade::new(LimitsConfig::default())
    }

    fn course(dept: &str, avg: f64) -> Record {
        let mut r = Record::new();
        for (field, value) in [("dept", dept), ("id", "110"), ("instructor", "x"), ("title", "t"), ("uuid", "1")] {
            r.insert(field.to_string(), Value::from(value));
        }
        for (field, value) in [("avg", avg), ("pass", 1.0), ("fail", 0.0), ("audit", 0.0), ("year", 2015.0)] {
            r.insert(field.to_string(), Value::from(value));
        }
        r
    }

    #[tokio::test]
    async fn test_add_list_remove() {
        let facade = facade();
        let mut broken = course("math", 60.0);
        broken.insert("avg".to_string(), Value::from("sixty"));

        let info = facade
            .add_dataset("courses", DatasetKind::Courses, vec![course("cpsc", 80.0), broken])
            .await
            .unwrap();
        assert_eq!(info.num_rows, 1);

        let listed = facade.list_datasets().await;
        assert_eq!(listed, vec![info]);

        assert_eq!(facade.remove_dataset("courses").await.unwrap(), "courses");
        assert!(matches!(
            facade.remove_dataset("courses").await,
            Err(FacadeError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_add_rejections() {
        let facade = facade();
        let rows = || vec![course("cpsc", 80.0)];

        for id in ["", "  ", "my_courses", "my courses"] {
            assert!(matches!(
                facade.add_dataset(id, DatasetKind::Courses, rows()).await,
                Err(FacadeError::InvalidId(_))
            ));
        }

        assert!(matches!(
            facade.add_dataset("rooms", DatasetKind::Rooms, rows()).await,
            Err(FacadeError::NoValidData(_))
        ));

        facade.add_dataset("c", DatasetKind::Courses, rows()).await.unwrap();
        assert!(matches!(
            facade.add_dataset("c", DatasetKind::Courses, rows()).await,
            Err(FacadeError::AlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn test_perform_query() {
        let facade = facade();
        facade
            .add_dataset(
                "courses",
                DatasetKind::Courses,
                vec![course("cpsc", 95.0), course("math", 70.0)],
            )
            .await
            .unwrap();

        let rows = facade
            .perform_query("In courses dataset courses, find entries whose Average is greater than 90; show Department.")
            .await
            .unwrap();
        let json = serde_json::to_value(&rows).unwrap();
        assert_eq!(json, serde_json::json!([{ "courses_dept": "cpsc" }]));

        let err = facade
            .perform_query("In courses dataset other, find all entries; show Department.")
            .await
            .unwrap_err();
        assert!(matches!(err, FacadeError::Query(QueryError::NotFound(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_queries_run_alongside_writes() {
        let facade = facade();
        facade
            .add_dataset("courses", DatasetKind::Courses, vec![course("cpsc", 95.0)])
            .await
            .unwrap();

        let sentence = "In courses dataset courses, find all entries; show Department.";
        let (first, added, second) = tokio::join!(
            facade.perform_query(sentence),
            facade.add_dataset("more", DatasetKind::Courses, vec![course("math", 70.0)]),
            facade.perform_query(sentence),
        );
        assert_eq!(first.unwrap().len(), 1);
        assert_eq!(second.unwrap().len(), 1);
        assert_eq!(added.unwrap().num_rows, 1);

        let err = facade
            .perform_query("In rooms dataset more, find all entries; show Seats.")
            .await
            .unwrap_err();
        assert!(matches!(err, FacadeError::Query(QueryError::InvalidCategory(_))));
    }

    #[tokio::test]
    async fn test_sentence_limit() {
        let facade = InsightFacade::new(LimitsConfig {
            max_sentence_bytes: 16,
            ..LimitsConfig::default()
        });
        assert!(matches!(
            facade.perform_query("In courses dataset courses, find all entries; show Title.").await,
            Err(FacadeError::SentenceTooLong { limit: 16, .. })
        ));
    }
}
