//! Clause compilation chained into bind normalization.
//!
//! The compiler emits named `:valN` placeholders and a bind map; the
//! normalizer then produces whichever final placeholder style the
//! target driver needs. One compiled tree must bind in both styles.

use quarry_model::{ColumnDescriptor, LeafValue, RuleNode, RuleOperator, SemanticType, Value};
use quarry_sql::{compile, to_positioned, to_simple};

fn columns() -> Vec<ColumnDescriptor> {
    vec![
        ColumnDescriptor::new("id", SemanticType::Numeric),
        ColumnDescriptor::new("status", SemanticType::Text),
        ColumnDescriptor::new("created", SemanticType::Date),
    ]
}

fn leaf(fact: &str, operator: RuleOperator, value: Value) -> RuleNode {
    RuleNode::leaf(fact, operator, Some(LeafValue::Literal(value)))
}

#[test]
fn compiled_tree_binds_in_positioned_style() {
    let node = RuleNode::all(vec![
        leaf("status", RuleOperator::Eq, Value::Text(String::from("open"))),
        leaf(
            "id",
            RuleOperator::In,
            Value::Array(vec![Value::Int(1), Value::Int(2)]),
        ),
    ]);
    let compiled = compile(&node, &columns(), 0);
    assert_eq!(compiled.text, "status = :val0\nAND id IN (:val1)");

    let sql = format!("SELECT * FROM orders WHERE {}", compiled.text);
    let n = to_positioned(&sql, &compiled.binds).unwrap();
    assert_eq!(
        n.sql,
        "SELECT * FROM orders WHERE status = $1\nAND id IN ($2,$3)"
    );
    assert_eq!(
        n.binds,
        vec![
            Value::Text(String::from("open")),
            Value::Int(1),
            Value::Int(2)
        ]
    );
}

#[test]
fn compiled_tree_binds_in_simple_style() {
    let node = RuleNode::all(vec![
        leaf("status", RuleOperator::Eq, Value::Text(String::from("open"))),
        leaf(
            "id",
            RuleOperator::In,
            Value::Array(vec![Value::Int(1), Value::Int(2)]),
        ),
    ]);
    let compiled = compile(&node, &columns(), 0);

    let sql = format!("SELECT * FROM orders WHERE {}", compiled.text);
    let n = to_simple(&sql, &compiled.binds).unwrap();
    assert_eq!(
        n.sql,
        "SELECT * FROM orders WHERE status = ?\nAND id IN (?,?)"
    );
    assert_eq!(
        n.binds,
        vec![
            Value::Text(String::from("open")),
            Value::Int(1),
            Value::Int(2)
        ]
    );
}

#[test]
fn empty_in_list_stays_valid_sql() {
    let node = leaf("id", RuleOperator::In, Value::Array(vec![]));
    let compiled = compile(&node, &columns(), 0);
    let n = to_positioned(&compiled.text, &compiled.binds).unwrap();
    assert_eq!(n.sql, "id IN ( null )");
    assert!(n.binds.is_empty());
}

#[test]
fn between_binds_two_sequential_placeholders() {
    let node = leaf(
        "created",
        RuleOperator::Between,
        Value::Text(String::from("2024-01-01,2024-12-31")),
    );
    let compiled = compile(&node, &columns(), 0);
    assert_eq!(compiled.text, "created BETWEEN :val0 AND :val1");

    let n = to_positioned(&compiled.text, &compiled.binds).unwrap();
    assert_eq!(n.sql, "created BETWEEN $1 AND $2");
    assert_eq!(
        n.binds,
        vec![
            Value::Text(String::from("2024-01-01")),
            Value::Text(String::from("2024-12-31"))
        ]
    );
}

#[test]
fn deep_nesting_keeps_placeholder_numbering_sequential() {
    let node = RuleNode::any(vec![
        RuleNode::all(vec![
            leaf("id", RuleOperator::Gte, Value::Int(10)),
            leaf("id", RuleOperator::Lte, Value::Int(20)),
        ]),
        leaf("status", RuleOperator::Ne, Value::Text(String::from("closed"))),
    ]);
    let compiled = compile(&node, &columns(), 0);
    assert_eq!(
        compiled.text,
        "(\n  id >= :val0\n  AND id <= :val1\n)\nOR status != :val2"
    );
    assert_eq!(compiled.binds.len(), 3);
}

#[test]
fn json_wire_tree_compiles() {
    let json = r#"{"all":[{"fact":"status","operator":"eq","value":"open"},{"fact":"id","operator":"gt","value":"5"}]}"#;
    let node: RuleNode = serde_json::from_str(json).unwrap();
    let compiled = compile(&node, &columns(), 0);
    assert_eq!(compiled.text, "status = :val0\nAND id > :val1");
    // "5" coerces to a number through the id column's semantic type.
    assert_eq!(compiled.binds.get("val1"), Some(&Value::Int(5)));
}
