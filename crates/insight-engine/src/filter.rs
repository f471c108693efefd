//! WHERE stage

use insight_ir::{Connective, Criteria, Record};

/// Records that satisfy the criteria list, in input order.
pub fn filter<'r>(criteria: &[Criteria], records: &'r [Record]) -> Vec<&'r Record> {
    records.iter().filter(|r| matches(criteria, r)).collect()
}

/// Left fold with no precedence: the glue on criterion `i` joins the
/// accumulated result with criterion `i + 1`.
pub fn matches(criteria: &[Criteria], record: &Record) -> bool {
    let mut iter = criteria.iter();
    let Some(first) = iter.next() else {
        return true;
    };

    let mut acc = first.evaluate(record);
    let mut glue = first.glue;
    for criterion in iter {
        let next = criterion.evaluate(record);
        acc = glue.unwrap_or(Connective::And).combine(acc, next);
        glue = criterion.glue;
    }
    acc
}
