//! The validation run over a result set.

use std::collections::BTreeMap;

use quarry_model::{Annotation, FactValue, NamedRule, ResultSet, Value};
use tracing::debug;

use crate::eval::evaluate;

/// Evaluates every named rule against every row of the set, mutating
/// row annotations in place.
///
/// Prior annotations are cleared first, so repeated runs never
/// accumulate markers. For each violated rule whose running count is
/// still below its `limit`, a `Rul` annotation (rule name, message, and
/// the fact values the rule's leaves reference) is attached at the
/// rule's target column; at the limit further violations are dropped
/// silently but still make the overall result `false`. Once every rule
/// has reached its limit, remaining rows are skipped entirely.
///
/// Returns `true` when no row triggered any rule.
pub fn validate(set: &mut ResultSet, rules: &[NamedRule]) -> bool {
    set.clear_annotations();
    if rules.is_empty() {
        return true;
    }
    let mut counts = vec![0_usize; rules.len()];
    let mut clean = true;

    for row in &mut set.rows {
        let exhausted = counts
            .iter()
            .zip(rules)
            .all(|(count, rule)| *count >= rule.error.limit);
        if exhausted {
            debug!("every rule reached its violation limit, stopping early");
            break;
        }

        let facts = row.values.clone();
        for (rule, count) in rules.iter().zip(&mut counts) {
            if !evaluate(&rule.rule, &facts) {
                continue;
            }
            clean = false;
            if *count >= rule.error.limit {
                continue;
            }
            row.annotate(
                &rule.error.column,
                Annotation::Rul {
                    rule: rule.name.clone(),
                    message: message_for(rule),
                    facts: collect_facts(rule, &facts),
                },
            );
            *count += 1;
        }
    }
    clean
}

fn message_for(rule: &NamedRule) -> String {
    rule.error
        .message
        .clone()
        .unwrap_or_else(|| format!("rule '{}' violated", rule.name))
}

/// The fact values referenced transitively by the rule's leaves,
/// including any leaf whose value is itself a fact reference.
fn collect_facts(rule: &NamedRule, facts: &BTreeMap<String, Value>) -> Vec<FactValue> {
    rule.rule
        .facts()
        .into_iter()
        .map(|fact| {
            let value = facts.get(&fact).cloned().unwrap_or(Value::Null);
            FactValue { fact, value }
        })
        .collect()
}
