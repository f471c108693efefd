//! Sentence to `QueryPlan`, one clause at a time

use std::collections::BTreeSet;

use pest::iterators::Pair;
use tracing::{debug, trace};

use insight_ir::{ApplyDefinition, Criteria, Direction, Order, QueryError, QueryPlan, QueryResult};
use insight_registry::{AggregateOp, DatasetKind, KeyAliasMap, Operator};

use crate::criteria::{parse_criterion, split_criteria};
use crate::cursor::ClauseCursor;
use crate::grammar::Rule;

/// Words with a fixed meaning in sentences; none may name a dataset.
const KEYWORDS: &[&str] = &[
    "In", "dataset", "grouped", "find", "all", "entries", "whose", "show", "where", "sort",
    "by", "and", "or", "is", "the", "of",
];

/// Parse a query sentence into a validated plan.
pub fn parse(sentence: &str) -> QueryResult<QueryPlan> {
    let mut cursor = ClauseCursor::new(sentence);

    let (kind, dataset_id) = dataset_step(cursor.expect(Rule::dataset_clause, "dataset clause")?)?;
    let keys = kind.key_map();
    debug!(kind = %kind, dataset = %dataset_id, "dataset clause");

    let group_fields = match cursor.accept(Rule::group_clause) {
        Some(pair) => field_list(single_inner(pair)?, keys)?,
        None => Vec::new(),
    };
    trace!(?group_fields, at = cursor.position(), "group clause");

    let criteria = filter_step(cursor.expect(Rule::filter_clause, "filter clause")?, keys)?;
    trace!(criteria = criteria.len(), at = cursor.position(), "filter clause");

    let mut display_fields = field_list(
        single_inner(cursor.expect(Rule::display_clause, "display clause")?)?,
        keys,
    )?;
    dedup_first(&mut display_fields);

    let apply_defs = match cursor.accept(Rule::apply_clause) {
        Some(pair) => apply_step(pair, keys, &group_fields)?,
        None => Vec::new(),
    };

    let order = match cursor.accept(Rule::sort_clause) {
        Some(pair) => sort_step(pair, keys)?,
        None => Order::default(),
    };

    cursor.expect(Rule::end, "'.' at end of sentence")?;

    let allowed_display_fields = if group_fields.is_empty() {
        None
    } else {
        Some(
            group_fields
                .iter()
                .chain(apply_defs.iter().map(|a| &a.name))
                .cloned()
                .collect::<BTreeSet<_>>(),
        )
    };

    let plan = QueryPlan {
        kind,
        dataset_id,
        criteria,
        display_fields,
        group_fields,
        apply_defs,
        order,
        allowed_display_fields,
    };
    validate(&plan)?;

    debug!(fingerprint = %plan.fingerprint(), "parsed sentence");
    Ok(plan)
}

fn dataset_step(pair: Pair<Rule>) -> QueryResult<(DatasetKind, String)> {
    let mut inner = pair.into_inner();
    let (kind, id) = match (inner.next(), inner.next()) {
        (Some(kind), Some(id)) => (kind.as_str(), id.as_str()),
        _ => return Err(QueryError::grammar("malformed dataset clause")),
    };

    let kind: DatasetKind = kind.parse()?;
    if id.contains('_') || is_keyword(id) {
        return Err(QueryError::grammar(format!("invalid dataset id: {}", id)));
    }
    Ok((kind, id.to_string()))
}

fn filter_step(pair: Pair<Rule>, keys: &KeyAliasMap) -> QueryResult<Vec<Criteria>> {
    let body = single_inner(pair)?;
    if body.as_rule() == Rule::find_all {
        return Ok(Vec::new());
    }

    let text = single_inner(body)?.as_str().trim();
    let (segments, connectives) = split_criteria(text)?;
    segments
        .into_iter()
        .enumerate()
        .map(|(i, segment)| parse_criterion(segment, keys, connectives.get(i).copied()))
        .collect()
}

fn apply_step(
    pair: Pair<Rule>,
    keys: &KeyAliasMap,
    group_fields: &[String],
) -> QueryResult<Vec<ApplyDefinition>> {
    let mut defs: Vec<ApplyDefinition> = Vec::new();

    for def in pair.into_inner() {
        let mut inner = def.into_inner();
        let (name, op, source) = match (inner.next(), inner.next(), inner.next()) {
            (Some(n), Some(o), Some(s)) => (n.as_str(), o.as_str(), s.as_str()),
            _ => return Err(QueryError::grammar("malformed apply definition")),
        };

        if !is_valid_identifier(name) || is_keyword(name) {
            return Err(QueryError::unknown_field(name));
        }
        if defs.iter().any(|d| d.name == name)
            || group_fields.iter().any(|g| g == name)
            || keys.resolve(name).is_some()
            || keys.is_field(name)
        {
            return Err(QueryError::DuplicateName(name.to_string()));
        }

        let op = AggregateOp::from_name(op)?;
        let field = keys
            .resolve(source)
            .ok_or_else(|| QueryError::unknown_field(source))?;
        let field_type = keys
            .field_type(field)
            .ok_or_else(|| QueryError::unknown_field(field))?;
        if !op.accepts(field_type) {
            return Err(QueryError::InvalidAggregateField {
                op,
                field: field.to_string(),
            });
        }

        defs.push(ApplyDefinition {
            name: name.to_string(),
            op,
            field: field.to_string(),
        });
    }
    Ok(defs)
}

fn sort_step(pair: Pair<Rule>, keys: &KeyAliasMap) -> QueryResult<Order> {
    let mut inner = pair.into_inner();
    let (direction, fields) = match (inner.next(), inner.next()) {
        (Some(d), Some(f)) => (d, f),
        _ => return Err(QueryError::grammar("malformed sort clause")),
    };
    let direction = Direction::from_word(direction.as_str())
        .ok_or_else(|| QueryError::grammar(format!("unknown direction: {}", direction.as_str())))?;

    Ok(Order {
        direction,
        fields: field_list(fields, keys)?,
    })
}

fn validate(plan: &QueryPlan) -> QueryResult<()> {
    if !plan.apply_defs.is_empty() && !plan.is_grouped() {
        return Err(QueryError::grammar("apply clause requires a group clause"));
    }

    if let Some(allowed) = &plan.allowed_display_fields {
        if let Some(column) = plan.display_fields.iter().find(|f| !allowed.contains(*f)) {
            return Err(QueryError::InvalidColumns(column.clone()));
        }
    }

    if let Some(key) = plan
        .order
        .fields
        .iter()
        .find(|f| !plan.display_fields.contains(f))
    {
        return Err(QueryError::InvalidOrderKey(key.clone()));
    }
    Ok(())
}

/// Resolve each field of a `field_list` through the key map, passing
/// unknown names through when they are usable as column names.
fn field_list(pair: Pair<Rule>, keys: &KeyAliasMap) -> QueryResult<Vec<String>> {
    pair.into_inner()
        .map(|field| resolve_field(field.as_str(), keys))
        .collect()
}

fn resolve_field(name: &str, keys: &KeyAliasMap) -> QueryResult<String> {
    match keys.resolve(name) {
        Some(internal) => Ok(internal.to_string()),
        None if is_valid_identifier(name) && !is_keyword(name) => Ok(name.to_string()),
        None => Err(QueryError::unknown_field(name)),
    }
}

/// Drop repeated names, keeping the first occurrence of each.
fn dedup_first(fields: &mut Vec<String>) {
    let mut seen = BTreeSet::new();
    fields.retain(|field| seen.insert(field.clone()));
}

fn is_valid_identifier(name: &str) -> bool {
    !name.is_empty() && !name.contains('_') && !name.chars().any(char::is_whitespace)
}

fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word) || Operator::phrases().any(|phrase| phrase == word)
}

fn single_inner(pair: Pair<Rule>) -> QueryResult<Pair<Rule>> {
    let rule = pair.as_rule();
    pair.into_inner()
        .next()
        .ok_or_else(|| QueryError::grammar(format!("empty {:?}", rule)))
}
