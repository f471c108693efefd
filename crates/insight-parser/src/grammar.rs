//! Pest-generated parser for query sentences

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use insight_ir::{QueryError, QueryResult};

#[derive(Parser)]
#[grammar = "sentence.pest"]
pub struct QueryParser;

/// Match `rule` against the start of `input` and return the top pair.
pub(crate) fn parse_rule(rule: Rule, input: &str) -> QueryResult<Pair<'_, Rule>> {
    QueryParser::parse(rule, input)
        .map_err(|e| QueryError::grammar(e.variant.message().into_owned()))?
        .next()
        .ok_or_else(|| QueryError::grammar(format!("empty match for {:?}", rule)))
}
