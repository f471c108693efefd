//! Consume-and-advance cursor over an immutable sentence

use pest::iterators::Pair;

use crate::grammar::{parse_rule, Rule};
use insight_ir::{QueryError, QueryResult};

pub(crate) struct ClauseCursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> ClauseCursor<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Parse `rule` at the cursor, advancing past it on success. The cursor
    /// does not move when the rule does not match.
    pub fn accept(&mut self, rule: Rule) -> Option<Pair<'a, Rule>> {
        let input: &'a str = self.input;
        let start = self.skip_whitespace();
        let pair = parse_rule(rule, &input[start..]).ok()?;
        self.pos = start + pair.as_span().end();
        Some(pair)
    }

    /// Like `accept`, but a missing clause is a grammar error.
    pub fn expect(&mut self, rule: Rule, clause: &str) -> QueryResult<Pair<'a, Rule>> {
        self.accept(rule).ok_or_else(|| {
            QueryError::grammar(format!(
                "expected {} at byte {}",
                clause,
                self.skip_whitespace()
            ))
        })
    }

    fn skip_whitespace(&self) -> usize {
        let rest = &self.input[self.pos..];
        self.pos + (rest.len() - rest.trim_start().len())
    }
}
