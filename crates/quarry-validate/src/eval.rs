//! Rule-tree evaluation against a row's fact map.
//!
//! Comparison operators compare numerically when both sides carry
//! numbers and fall back to string comparison otherwise. `isNull`
//! tests SQL NULL specifically, while `isNil` also covers an absent
//! fact; the string predicates never match an empty or absent fact
//! value.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use quarry_model::{parse_sequence, LeafValue, RuleLeaf, RuleNode, RuleOperator, Value};

/// Evaluates a rule tree against the fact map of one row.
pub(crate) fn evaluate(node: &RuleNode, facts: &BTreeMap<String, Value>) -> bool {
    match node {
        RuleNode::All { all } => all.iter().all(|child| evaluate(child, facts)),
        RuleNode::Any { any } => any.iter().any(|child| evaluate(child, facts)),
        RuleNode::Leaf(leaf) => evaluate_leaf(leaf, facts),
    }
}

fn evaluate_leaf(leaf: &RuleLeaf, facts: &BTreeMap<String, Value>) -> bool {
    let actual = facts.get(&leaf.fact);
    // A fact-reference value reads another fact of the same row.
    let expected = match &leaf.value {
        None => None,
        Some(LeafValue::Literal(value)) => Some(value.clone()),
        Some(LeafValue::FactRef { fact }) => facts.get(fact).cloned(),
    };
    let expected = expected.as_ref();

    match leaf.operator {
        RuleOperator::IsNull => matches!(actual, Some(Value::Null)),
        RuleOperator::IsNotNull => !matches!(actual, Some(Value::Null)),
        RuleOperator::IsNil => actual.is_none_or(Value::is_null),
        RuleOperator::IsNotNil => actual.is_some_and(|v| !v.is_null()),
        RuleOperator::StartsWith => string_predicate(actual, expected, |s, p| s.starts_with(p)),
        RuleOperator::EndsWith => string_predicate(actual, expected, |s, p| s.ends_with(p)),
        RuleOperator::Between => between(actual, expected),
        RuleOperator::In => member_of(actual, expected),
        RuleOperator::NotIn => !member_of(actual, expected),
        RuleOperator::Eq => values_equal(actual, expected),
        RuleOperator::Ne => !values_equal(actual, expected),
        RuleOperator::Gt => compare(actual, expected) == Some(Ordering::Greater),
        RuleOperator::Gte => {
            matches!(compare(actual, expected), Some(Ordering::Greater | Ordering::Equal))
        }
        RuleOperator::Lt => compare(actual, expected) == Some(Ordering::Less),
        RuleOperator::Lte => {
            matches!(compare(actual, expected), Some(Ordering::Less | Ordering::Equal))
        }
    }
}

/// Numeric equality when both sides carry numbers, string equality
/// otherwise. An absent fact equals NULL and nothing else.
fn values_equal(actual: Option<&Value>, expected: Option<&Value>) -> bool {
    let actual = actual.unwrap_or(&Value::Null);
    let expected = expected.unwrap_or(&Value::Null);
    if actual.is_null() || expected.is_null() {
        return actual.is_null() && expected.is_null();
    }
    match (actual.as_number(), expected.as_number()) {
        (Some(a), Some(b)) => a == b,
        _ => actual.to_text() == expected.to_text(),
    }
}

/// NULL and absent values are incomparable, so every inequality on
/// them is false.
fn compare(actual: Option<&Value>, expected: Option<&Value>) -> Option<Ordering> {
    let actual = actual?;
    let expected = expected?;
    if actual.is_null() || expected.is_null() {
        return None;
    }
    match (actual.as_number(), expected.as_number()) {
        (Some(a), Some(b)) => a.partial_cmp(&b),
        _ => Some(actual.to_text().cmp(&expected.to_text())),
    }
}

fn between(actual: Option<&Value>, expected: Option<&Value>) -> bool {
    let range = expected.map(parse_sequence).unwrap_or_default();
    let (Some(low), Some(high)) = (range.first(), range.get(1)) else {
        return false;
    };
    matches!(
        compare(actual, Some(low)),
        Some(Ordering::Greater | Ordering::Equal)
    ) && matches!(
        compare(actual, Some(high)),
        Some(Ordering::Less | Ordering::Equal)
    )
}

fn member_of(actual: Option<&Value>, expected: Option<&Value>) -> bool {
    let Some(expected) = expected else {
        return false;
    };
    parse_sequence(expected)
        .iter()
        .any(|item| values_equal(actual, Some(item)))
}

fn string_predicate(
    actual: Option<&Value>,
    expected: Option<&Value>,
    test: impl Fn(&str, &str) -> bool,
) -> bool {
    let Some(actual) = actual else {
        return false;
    };
    if actual.is_null() {
        return false;
    }
    let subject = actual.to_text();
    if subject.is_empty() {
        return false;
    }
    let pattern = expected.map(Value::to_text).unwrap_or_default();
    test(&subject, &pattern)
}
