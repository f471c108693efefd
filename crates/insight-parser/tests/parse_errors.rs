//! Sentence-level parse outcomes, one error kind at a time

use insight_ir::{Direction, QueryError};
use insight_parser::parse;
use insight_registry::{AggregateOp, DatasetKind, NumericOp, StringOp};
use pretty_assertions::assert_eq;

fn kind_of(sentence: &str) -> &'static str {
    parse(sentence).unwrap_err().kind()
}

#[test]
fn missing_dataset_clause() {
    assert_eq!(kind_of("find all entries; show Average."), "GrammarError");
    assert_eq!(kind_of("In courses, find all entries; show Average."), "GrammarError");
}

#[test]
fn clauses_out_of_order() {
    assert_eq!(
        kind_of("In courses dataset courses, find all entries; sort in ascending order by Average; show Average."),
        "GrammarError"
    );
    assert_eq!(
        kind_of("In courses dataset courses, find all entries; show Average"),
        "GrammarError"
    );
    assert_eq!(
        kind_of("In courses dataset courses, find all entries; show Average. trailing"),
        "GrammarError"
    );
}

#[test]
fn unknown_category() {
    assert_eq!(
        parse("In buildings dataset b, find all entries; show Average.").unwrap_err(),
        QueryError::InvalidCategory("buildings".to_string())
    );
}

#[test]
fn string_operator_on_numeric_field() {
    for op in StringOp::ALL {
        let sentence = format!(
            "In courses dataset courses, find entries whose Average {} \"x\"; show Average.",
            op.phrase()
        );
        assert_eq!(kind_of(&sentence), "TypeMismatch", "{}", sentence);
    }
}

#[test]
fn numeric_operator_on_string_field() {
    for op in NumericOp::ALL {
        let sentence = format!(
            "In rooms dataset rooms, find entries whose Furniture {} 10; show Furniture.",
            op.phrase()
        );
        assert_eq!(kind_of(&sentence), "TypeMismatch", "{}", sentence);
    }
}

#[test]
fn missing_operand() {
    assert_eq!(
        parse("In courses dataset courses, find entries whose Average is greater than 90 and; show Average.")
            .unwrap_err(),
        QueryError::MissingOperand {
            criteria: 1,
            connectives: 1
        }
    );
}

#[test]
fn unknown_display_field() {
    assert_eq!(
        parse("In courses dataset courses, find all entries; show my_field.").unwrap_err(),
        QueryError::UnknownField("my_field".to_string())
    );
}

#[test]
fn operator_words_are_not_columns() {
    assert_eq!(
        parse("In courses dataset courses, find all entries; show includes.").unwrap_err(),
        QueryError::UnknownField("includes".to_string())
    );
    assert_eq!(
        parse("In courses dataset courses, find all entries; show Average; sort in ascending order by includes.")
            .unwrap_err()
            .kind(),
        "UnknownField"
    );
}

#[test]
fn keywords_need_a_word_boundary() {
    for sentence in [
        "Incourses dataset c, find all entries; show Average.",
        "In courses dataset c, findall entries; show Average.",
        "In courses dataset c, find all entries; showAverage.",
        "In courses datasetc, find all entries; show Average.",
        "In courses dataset c, find entries whoseAverage is 90; show Average.",
        "In courses dataset c, find all entries; show Average; sort in ascending order byAverage.",
    ] {
        assert_eq!(kind_of(sentence), "GrammarError", "{}", sentence);
    }
}

#[test]
fn apply_name_rules() {
    let base = "In courses dataset courses grouped by Department, find all entries; show Department";

    assert_eq!(
        parse(&format!("{base}, where bad_name is the AVG of Average.")).unwrap_err(),
        QueryError::UnknownField("bad_name".to_string())
    );
    assert_eq!(
        parse(&format!("{base}, where x is the AVG of Average and x is the MAX of Pass.")).unwrap_err(),
        QueryError::DuplicateName("x".to_string())
    );
    assert_eq!(
        parse(&format!("{base}, where Average is the AVG of Average.")).unwrap_err(),
        QueryError::DuplicateName("Average".to_string())
    );
    assert_eq!(
        parse(&format!("{base}, where dept is the COUNT of Title.")).unwrap_err(),
        QueryError::DuplicateName("dept".to_string())
    );
    assert_eq!(
        parse(&format!("{base}, where x is the AVG of Seats.")).unwrap_err(),
        QueryError::UnknownField("Seats".to_string())
    );
    assert_eq!(
        parse(&format!("{base}, where x is the SUM of Title.")).unwrap_err(),
        QueryError::InvalidAggregateField {
            op: AggregateOp::Sum,
            field: "title".to_string()
        }
    );
}

#[test]
fn count_over_strings_is_allowed() {
    let plan = parse(
        "In courses dataset courses grouped by Department, find all entries; \
         show Department and n, where n is the COUNT of Instructor.",
    )
    .unwrap();
    assert_eq!(plan.apply_defs[0].op, AggregateOp::Count);
    assert_eq!(plan.apply_defs[0].field, "instructor");
}

#[test]
fn apply_without_group() {
    assert_eq!(
        kind_of("In courses dataset courses, find all entries; show n, where n is the MAX of Average."),
        "GrammarError"
    );
}

#[test]
fn display_outside_allowed_columns() {
    let base = "In courses dataset courses grouped by Department, find all entries;";

    assert!(parse(&format!("{base} show Department.")).is_ok());
    assert_eq!(
        parse(&format!("{base} show Department and Average.")).unwrap_err(),
        QueryError::InvalidColumns("avg".to_string())
    );
    assert!(parse(&format!("{base} show Department and top, where top is the MAX of Average.")).is_ok());
}

#[test]
fn sort_key_must_be_displayed() {
    assert_eq!(
        parse("In courses dataset courses, find all entries; show Department; sort in ascending order by Average.")
            .unwrap_err(),
        QueryError::InvalidOrderKey("avg".to_string())
    );
}

#[test]
fn multi_key_sort() {
    let plan = parse(
        "In courses dataset courses, find all entries; show Department and Average; \
         sort in descending order by Department, Average.",
    )
    .unwrap();
    assert_eq!(plan.kind, DatasetKind::Courses);
    assert_eq!(plan.order.direction, Direction::Descending);
    assert_eq!(plan.order.fields, vec!["dept", "avg"]);
}
