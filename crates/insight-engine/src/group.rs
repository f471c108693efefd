//! GROUP and aggregate stages

use std::collections::HashMap;

use insight_ir::{ApplyDefinition, QueryError, QueryResult, Record, Value};
use insight_registry::{count_distinct, AggregateOp};

/// Group-field values of a record, in group-field order.
pub type GroupKey = Vec<Option<Value>>;

/// Bucket records by their group key. Buckets keep the order in which
/// their first record appeared.
pub fn group<'r>(fields: &[String], records: Vec<&'r Record>) -> Vec<(GroupKey, Vec<&'r Record>)> {
    let mut index: HashMap<GroupKey, usize> = HashMap::new();
    let mut buckets: Vec<(GroupKey, Vec<&'r Record>)> = Vec::new();

    for record in records {
        let key: GroupKey = fields.iter().map(|f| record.get(f).cloned()).collect();
        match index.get(&key) {
            Some(&i) => buckets[i].1.push(record),
            None => {
                index.insert(key.clone(), buckets.len());
                buckets.push((key, vec![record]));
            }
        }
    }
    buckets
}

/// One synthetic record per bucket: the group fields plus every apply
/// column.
pub fn aggregate(
    fields: &[String],
    defs: &[ApplyDefinition],
    buckets: Vec<(GroupKey, Vec<&Record>)>,
) -> QueryResult<Vec<Record>> {
    buckets
        .into_iter()
        .map(|(key, bucket)| -> QueryResult<Record> {
            let mut out: Record = fields
                .iter()
                .zip(key)
                .filter_map(|(field, value)| value.map(|v| (field.clone(), v)))
                .collect();
            for def in defs {
                out.insert(def.name.clone(), apply(def, &bucket)?);
            }
            Ok(out)
        })
        .collect()
}

fn apply(def: &ApplyDefinition, bucket: &[&Record]) -> QueryResult<Value> {
    let cells = bucket.iter().filter_map(|r| r.get(&def.field));

    if def.op == AggregateOp::Count {
        return Ok(Value::Number(count_distinct(cells) as f64));
    }

    let numbers = cells
        .map(|cell| match cell {
            Value::Number(n) => Ok(*n),
            Value::String(_) => Err(QueryError::InvalidAggregateField {
                op: def.op,
                field: def.field.clone(),
            }),
        })
        .collect::<QueryResult<Vec<f64>>>()?;

    Ok(Value::Number(def.op.reduce(&numbers)?))
}
