//! The boolean rule-tree grammar.
//!
//! The same grammar serves two consumers: the conditional clause
//! compiler renders a tree into a parameterized `WHERE` clause, and the
//! rule validation engine evaluates a tree against every row of a
//! result set. On the wire a group is `{"all": [...]}` or
//! `{"any": [...]}` and a leaf is `{"fact": ..., "operator": ...,
//! "value": ...}` — a node is exactly one of the two.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// A node of the rule tree: an AND group, an OR group, or a leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleNode {
    /// Every child must hold.
    All {
        /// Child nodes.
        all: Vec<RuleNode>,
    },
    /// At least one child must hold.
    Any {
        /// Child nodes.
        any: Vec<RuleNode>,
    },
    /// A fact/operator/value condition.
    Leaf(RuleLeaf),
}

impl RuleNode {
    /// Convenience constructor for an AND group.
    #[must_use]
    pub fn all(children: Vec<RuleNode>) -> Self {
        Self::All { all: children }
    }

    /// Convenience constructor for an OR group.
    #[must_use]
    pub fn any(children: Vec<RuleNode>) -> Self {
        Self::Any { any: children }
    }

    /// Convenience constructor for a leaf.
    #[must_use]
    pub fn leaf(fact: impl Into<String>, operator: RuleOperator, value: Option<LeafValue>) -> Self {
        Self::Leaf(RuleLeaf {
            fact: fact.into(),
            operator,
            value,
        })
    }

    /// Fact names referenced transitively by this tree: leaf facts plus
    /// any leaf value that is itself a fact reference.
    #[must_use]
    pub fn facts(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_facts(&mut out);
        out
    }

    fn collect_facts(&self, out: &mut BTreeSet<String>) {
        match self {
            Self::All { all: children } | Self::Any { any: children } => {
                for child in children {
                    child.collect_facts(out);
                }
            }
            Self::Leaf(leaf) => {
                out.insert(leaf.fact.clone());
                if let Some(LeafValue::FactRef { fact }) = &leaf.value {
                    out.insert(fact.clone());
                }
            }
        }
    }
}

/// A leaf condition: `fact operator value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleLeaf {
    /// The fact (column) the condition reads.
    pub fact: String,
    /// The predicate.
    pub operator: RuleOperator,
    /// Right-hand side; absent for `isNull`-style operators.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<LeafValue>,
}

/// A leaf's right-hand side: a literal, or a reference to another fact
/// of the same row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LeafValue {
    /// Reads another fact's value at evaluation time.
    FactRef {
        /// The referenced fact name.
        fact: String,
    },
    /// A literal value.
    Literal(Value),
}

impl LeafValue {
    /// The literal, if this is not a fact reference.
    #[must_use]
    pub fn as_literal(&self) -> Option<&Value> {
        match self {
            Self::Literal(v) => Some(v),
            Self::FactRef { .. } => None,
        }
    }
}

impl From<Value> for LeafValue {
    fn from(v: Value) -> Self {
        Self::Literal(v)
    }
}

/// Leaf predicates, camelCase on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleOperator {
    /// Equal.
    Eq,
    /// Not equal.
    Ne,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// SQL NULL.
    IsNull,
    /// Not SQL NULL.
    IsNotNull,
    /// NULL or absent.
    IsNil,
    /// Neither NULL nor absent.
    IsNotNil,
    /// Within an inclusive range (two-element value).
    Between,
    /// Member of a list.
    In,
    /// Not a member of a list.
    NotIn,
    /// Stringified fact starts with the value.
    StartsWith,
    /// Stringified fact ends with the value.
    EndsWith,
}

/// A named rule: the tree that encodes the *bad* condition plus the
/// error descriptor controlling where and how often it annotates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedRule {
    /// Rule name, recorded on every annotation it produces.
    pub name: String,
    /// The condition tree; evaluating true is a violation.
    pub rule: RuleNode,
    /// Where violations are attached and how many are kept.
    pub error: RuleError,
}

/// Error descriptor of a named rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleError {
    /// Column the violation annotation is attached to.
    pub column: String,
    /// Maximum number of annotations this rule may produce per run.
    pub limit: usize,
    /// Optional message; a default is constructed from the rule name
    /// when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_json_round_trip() {
        let json = r#"{"all":[{"fact":"age","operator":"gt","value":18},{"any":[{"fact":"name","operator":"isNull"},{"fact":"status","operator":"in","value":["a","b"]}]}]}"#;
        let node: RuleNode = serde_json::from_str(json).unwrap();
        match &node {
            RuleNode::All { all } => {
                assert_eq!(all.len(), 2);
                assert!(matches!(&all[0], RuleNode::Leaf(leaf) if leaf.fact == "age"));
                assert!(matches!(&all[1], RuleNode::Any { any } if any.len() == 2));
            }
            other => panic!("expected All, got {other:?}"),
        }
        let back = serde_json::to_string(&node).unwrap();
        assert_eq!(back, json);
    }

    #[test]
    fn test_leaf_value_fact_ref() {
        let json = r#"{"fact":"low","operator":"lte","value":{"fact":"high"}}"#;
        let leaf: RuleLeaf = serde_json::from_str(json).unwrap();
        assert_eq!(
            leaf.value,
            Some(LeafValue::FactRef {
                fact: String::from("high")
            })
        );
    }

    #[test]
    fn test_operator_wire_names() {
        assert_eq!(
            serde_json::to_string(&RuleOperator::IsNotNull).unwrap(),
            r#""isNotNull""#
        );
        assert_eq!(
            serde_json::to_string(&RuleOperator::NotIn).unwrap(),
            r#""notIn""#
        );
        assert_eq!(
            serde_json::to_string(&RuleOperator::StartsWith).unwrap(),
            r#""startsWith""#
        );
    }

    #[test]
    fn test_transitive_facts() {
        let node = RuleNode::all(vec![
            RuleNode::leaf("a", RuleOperator::Gt, Some(Value::Int(1).into())),
            RuleNode::any(vec![RuleNode::leaf(
                "b",
                RuleOperator::Eq,
                Some(LeafValue::FactRef {
                    fact: String::from("c"),
                }),
            )]),
        ]);
        let facts: Vec<String> = node.facts().into_iter().collect();
        assert_eq!(facts, vec!["a", "b", "c"]);
    }
}
