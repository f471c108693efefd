//! Filter body splitting and single-criterion parsing

use insight_ir::{Connective, Criteria, QueryError, QueryResult, Value};
use insight_registry::{KeyAliasMap, Operator};

use crate::grammar::{parse_rule, Rule};

/// Split a filter body into criterion texts and the connectives between
/// them. Connectives are only recognised as whole words outside quotes.
pub fn split_criteria(text: &str) -> QueryResult<(Vec<&str>, Vec<Connective>)> {
    let mut segments = Vec::new();
    let mut connectives = Vec::new();
    let mut segment: Option<(usize, usize)> = None;

    for (start, end) in words(text) {
        match Connective::from_word(&text[start..end]) {
            Some(connective) => {
                if let Some((s, e)) = segment.take() {
                    segments.push(&text[s..e]);
                }
                connectives.push(connective);
            }
            None => {
                segment = Some(match segment {
                    Some((s, _)) => (s, end),
                    None => (start, end),
                });
            }
        }
    }
    if let Some((s, e)) = segment {
        segments.push(&text[s..e]);
    }

    if connectives.len() + 1 != segments.len() {
        return Err(QueryError::MissingOperand {
            criteria: segments.len(),
            connectives: connectives.len(),
        });
    }
    Ok((segments, connectives))
}

// Byte ranges of whitespace-separated words; quoted runs never split.
fn words(text: &str) -> Vec<(usize, usize)> {
    let mut words = Vec::new();
    let mut start = None;
    let mut quoted = false;

    for (i, c) in text.char_indices() {
        if c.is_whitespace() && !quoted {
            if let Some(s) = start.take() {
                words.push((s, i));
            }
            continue;
        }
        if c == '"' {
            quoted = !quoted;
        }
        start.get_or_insert(i);
    }
    if let Some(s) = start {
        words.push((s, text.len()));
    }
    words
}

/// Parse one `<field> <operator> <literal>` criterion against a key map.
pub fn parse_criterion(
    text: &str,
    keys: &KeyAliasMap,
    glue: Option<Connective>,
) -> QueryResult<Criteria> {
    let unparseable = || QueryError::grammar(format!("unparseable criteria: {}", text));

    let pair = parse_rule(Rule::criterion, text.trim()).map_err(|_| unparseable())?;
    let mut inner = pair.into_inner();
    let (field, operator, literal) = match (inner.next(), inner.next(), inner.next()) {
        (Some(f), Some(o), Some(l)) => (f, o, l),
        _ => return Err(unparseable()),
    };

    let field = keys.resolve(field.as_str()).ok_or_else(unparseable)?;
    let operator = Operator::from_phrase(operator.as_str())?;
    let expected = operator.operand_type();

    let literal = literal.into_inner().next().ok_or_else(unparseable)?;
    let value = match literal.as_rule() {
        Rule::number => literal
            .as_str()
            .parse::<f64>()
            .map(Value::Number)
            .map_err(|_| QueryError::grammar("invalid number literal"))?,
        Rule::string => {
            let quoted = literal.as_str();
            Value::String(quoted[1..quoted.len() - 1].to_string())
        }
        _ => {
            return Err(match operator {
                Operator::Numeric(_) => QueryError::grammar("invalid number literal"),
                Operator::Text(_) => QueryError::grammar("invalid string literal"),
            })
        }
    };

    if value.field_type() != expected {
        return Err(QueryError::type_mismatch(format!(
            "{} requires a {} value",
            operator, expected
        )));
    }
    if keys.field_type(field) != Some(expected) {
        return Err(QueryError::type_mismatch(format!(
            "{} requires a {} field",
            operator, expected
        )));
    }

    Ok(Criteria {
        field: field.to_string(),
        operator,
        value,
        glue,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use insight_registry::{DatasetKind, NumericOp, StringOp};

    fn courses() -> &'static KeyAliasMap {
        DatasetKind::Courses.key_map()
    }

    #[test]
    fn test_split_keeps_quoted_connectives() {
        let (segments, connectives) =
            split_criteria("Title is \"rock and roll\" or Average is less than 60").unwrap();
        assert_eq!(segments, vec!["Title is \"rock and roll\"", "Average is less than 60"]);
        assert_eq!(connectives, vec![Connective::Or]);
    }

    #[test]
    fn test_split_missing_operand() {
        let err = split_criteria("Average is greater than 90 and").unwrap_err();
        assert_eq!(
            err,
            QueryError::MissingOperand {
                criteria: 1,
                connectives: 1
            }
        );
        assert!(split_criteria("and or").is_err());
    }

    #[test]
    fn test_numeric_criterion() {
        let c = parse_criterion("Average is not less than 72.5", courses(), Some(Connective::And)).unwrap();
        assert_eq!(c.field, "avg");
        assert_eq!(c.operator, Operator::Numeric(NumericOp::NotLessThan));
        assert_eq!(c.value, Value::Number(72.5));
        assert_eq!(c.glue, Some(Connective::And));

        let c = parse_criterion("Year is equal to -1", courses(), None).unwrap();
        assert_eq!(c.value, Value::Number(-1.0));
    }

    #[test]
    fn test_string_criterion() {
        let c = parse_criterion("Department does not begin with \"cp\"", courses(), None).unwrap();
        assert_eq!(c.field, "dept");
        assert_eq!(c.operator, Operator::Text(StringOp::DoesNotBeginWith));
        assert_eq!(c.value, Value::from("cp"));

        let c = parse_criterion("Title is \"\"", courses(), None).unwrap();
        assert_eq!(c.value, Value::from(""));
    }

    #[test]
    fn test_rejected_literals() {
        for text in ["Department is cpsc", "Department is \"cp*sc\"", "Department includes \"a\"b\""] {
            assert_eq!(
                parse_criterion(text, courses(), None).unwrap_err(),
                QueryError::grammar("invalid string literal"),
                "{}",
                text
            );
        }
        assert_eq!(
            parse_criterion("Average is greater than 9x", courses(), None).unwrap_err(),
            QueryError::grammar("invalid number literal")
        );
    }

    #[test]
    fn test_unparseable() {
        for text in ["Seats is greater than 5", "Average is around 5", "is greater than 5"] {
            let err = parse_criterion(text, courses(), None).unwrap_err();
            assert_eq!(err.kind(), "GrammarError", "{}", text);
        }
    }

    #[test]
    fn test_type_mismatch() {
        let err = parse_criterion("Average is 90", courses(), None).unwrap_err();
        assert_eq!(err, QueryError::type_mismatch("is requires a string value"));

        let err = parse_criterion("Department is greater than 5", courses(), None).unwrap_err();
        assert_eq!(err, QueryError::type_mismatch("is greater than requires a number field"));
    }
}
