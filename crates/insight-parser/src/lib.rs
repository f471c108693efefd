//! Insight sentence parser
//!
//! Turns a pseudo-English query sentence into a validated `QueryPlan`.
//! Clauses are matched one by one with pest rules from `sentence.pest`.

mod criteria;
mod cursor;
mod grammar;
mod parser;

pub use criteria::{parse_criterion, split_criteria};
pub use grammar::{QueryParser, Rule};
pub use parser::parse;
