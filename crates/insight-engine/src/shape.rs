//! Projection, ordering and key renaming of result rows

use std::cmp::Ordering;

use insight_ir::{Direction, Order, Record, Row};
use insight_registry::KeyAliasMap;

/// Keep the display fields in display order. Cells a record lacks are left
/// out of its row, and a field named twice yields one cell.
pub fn project<'r>(display: &[String], records: impl IntoIterator<Item = &'r Record>) -> Vec<Row> {
    records
        .into_iter()
        .map(|record| {
            let mut row = Row::new();
            for field in display {
                if row.get(field).is_some() {
                    continue;
                }
                if let Some(value) = record.get(field) {
                    row.push(field.as_str(), value.clone());
                }
            }
            row
        })
        .collect()
}

/// Stable multi-key sort. The direction applies to every key.
pub fn sort(rows: &mut [Row], order: &Order) {
    if order.fields.is_empty() {
        return;
    }

    rows.sort_by(|a, b| {
        let ord = order
            .fields
            .iter()
            .map(|field| match (a.get(field), b.get(field)) {
                (Some(x), Some(y)) => x.cmp_sortable(y),
                _ => Ordering::Equal,
            })
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal);

        match order.direction {
            Direction::Ascending => ord,
            Direction::Descending => ord.reverse(),
        }
    });
}

/// Prefix dataset fields with `<dataset_id>_`. Apply columns keep their
/// names.
pub fn rename(rows: Vec<Row>, dataset_id: &str, keys: &KeyAliasMap) -> Vec<Row> {
    rows.into_iter()
        .map(|row| {
            row.into_cells()
                .into_iter()
                .map(|(key, value)| {
                    if keys.is_field(&key) {
                        (format!("{}_{}", dataset_id, key), value)
                    } else {
                        (key, value)
                    }
                })
                .collect()
        })
        .collect()
}
