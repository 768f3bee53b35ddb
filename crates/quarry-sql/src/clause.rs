//! Conditional clause compiler.
//!
//! Renders a boolean rule tree into an indented, parenthesized SQL
//! boolean expression using named intermediate placeholders (`:valN`)
//! plus a name→value bind map. The compiler never assigns final
//! placeholder syntax (`?`/`$N`) itself — that is the bind normalizer's
//! job, which lets one compiled tree bind in either style.

use quarry_model::{
    coerce, parse_sequence, BindMap, ColumnDescriptor, LeafValue, RuleLeaf, RuleNode, RuleOperator,
    SemanticType, Value,
};

/// A compiled clause: SQL text with `:valN` placeholders plus the bind
/// map resolving them.
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled {
    /// The boolean expression, ready to follow `WHERE `.
    pub text: String,
    /// Named values for the emitted placeholders.
    pub binds: BindMap,
}

/// Compiles a rule tree against a column list, starting at the given
/// indent level.
///
/// Leaf fact names are looked up in `columns` to decide value coercion;
/// an unknown fact is treated as text-like. Values that fail coercion
/// bind NULL rather than erroring.
#[must_use]
pub fn compile(node: &RuleNode, columns: &[ColumnDescriptor], indent: usize) -> Compiled {
    let mut compiler = Compiler {
        columns,
        binds: BindMap::new(),
        counter: 0,
    };
    let text = compiler.render(node, indent);
    Compiled {
        text,
        binds: compiler.binds,
    }
}

struct Compiler<'a> {
    columns: &'a [ColumnDescriptor],
    binds: BindMap,
    counter: usize,
}

impl Compiler<'_> {
    fn render(&mut self, node: &RuleNode, indent: usize) -> String {
        match node {
            RuleNode::All { all } => self.render_group(all, "AND", indent),
            RuleNode::Any { any } => self.render_group(any, "OR", indent),
            RuleNode::Leaf(leaf) => self.render_leaf(leaf),
        }
    }

    /// Children join on the group's operator at the current indent; a
    /// nested group is parenthesized one level deeper.
    fn render_group(&mut self, children: &[RuleNode], joiner: &str, indent: usize) -> String {
        let pad = "  ".repeat(indent);
        let inner_pad = "  ".repeat(indent + 1);
        let mut parts = Vec::with_capacity(children.len());
        for child in children {
            let part = match child {
                RuleNode::Leaf(leaf) => self.render_leaf(leaf),
                nested => format!(
                    "(\n{inner_pad}{}\n{pad})",
                    self.render(nested, indent + 1)
                ),
            };
            parts.push(part);
        }
        parts.join(&format!("\n{pad}{joiner} "))
    }

    fn render_leaf(&mut self, leaf: &RuleLeaf) -> String {
        let column_type = self.column_type(&leaf.fact);
        match leaf.operator {
            RuleOperator::IsNull | RuleOperator::IsNil => format!("{} IS NULL", leaf.fact),
            RuleOperator::IsNotNull | RuleOperator::IsNotNil => {
                format!("{} IS NOT NULL", leaf.fact)
            }
            RuleOperator::Between => self.render_between(leaf, column_type),
            RuleOperator::In => self.render_in(leaf, column_type, "IN"),
            RuleOperator::NotIn => self.render_in(leaf, column_type, "NOT IN"),
            RuleOperator::StartsWith => self.render_like(leaf, |v| format!("{v}%")),
            RuleOperator::EndsWith => self.render_like(leaf, |v| format!("%{v}")),
            RuleOperator::Eq
            | RuleOperator::Ne
            | RuleOperator::Gt
            | RuleOperator::Gte
            | RuleOperator::Lt
            | RuleOperator::Lte => self.render_comparison(leaf, column_type),
        }
    }

    /// The input value, if not already a two-element sequence, is
    /// JSON/CSV-parsed into one; each end coerces independently, and an
    /// absent value binds both ends NULL.
    fn render_between(&mut self, leaf: &RuleLeaf, column_type: SemanticType) -> String {
        let low_name = self.next_placeholder();
        let high_name = self.next_placeholder();
        let (low, high) = match leaf.value.as_ref().and_then(LeafValue::as_literal) {
            Some(value) => {
                let pair = parse_sequence(value);
                (
                    coerce_or_null(column_type, pair.first()),
                    coerce_or_null(column_type, pair.get(1)),
                )
            }
            None => (Value::Null, Value::Null),
        };
        self.binds.insert(low_name.clone(), low);
        self.binds.insert(high_name.clone(), high);
        format!("{} BETWEEN :{low_name} AND :{high_name}", leaf.fact)
    }

    /// One placeholder bound to an array; the bind normalizer expands it
    /// to one final placeholder per element.
    fn render_in(&mut self, leaf: &RuleLeaf, column_type: SemanticType, op: &str) -> String {
        let name = self.next_placeholder();
        let items: Vec<Value> = leaf
            .value
            .as_ref()
            .and_then(LeafValue::as_literal)
            .map(parse_sequence)
            .unwrap_or_default()
            .iter()
            .map(|item| coerce_or_null(column_type, Some(item)))
            .collect();
        self.binds.insert(name.clone(), Value::Array(items));
        format!("{} {op} (:{name})", leaf.fact)
    }

    /// String predicates render as LIKE with a pattern bind; patterns
    /// are inherently text, so no column coercion applies.
    fn render_like(&mut self, leaf: &RuleLeaf, pattern: impl Fn(&str) -> String) -> String {
        let name = self.next_placeholder();
        let text = leaf
            .value
            .as_ref()
            .and_then(LeafValue::as_literal)
            .map(Value::to_text)
            .unwrap_or_default();
        self.binds
            .insert(name.clone(), Value::Text(pattern(&text)));
        format!("{} LIKE :{name}", leaf.fact)
    }

    fn render_comparison(&mut self, leaf: &RuleLeaf, column_type: SemanticType) -> String {
        let op = sql_operator(leaf.operator);
        // A fact-reference value compares two columns directly.
        if let Some(LeafValue::FactRef { fact }) = &leaf.value {
            return format!("{} {op} {fact}", leaf.fact);
        }
        let name = self.next_placeholder();
        let value = coerce_or_null(
            column_type,
            leaf.value.as_ref().and_then(LeafValue::as_literal),
        );
        self.binds.insert(name.clone(), value);
        format!("{} {op} :{name}", leaf.fact)
    }

    fn next_placeholder(&mut self) -> String {
        let name = format!("val{}", self.counter);
        self.counter += 1;
        name
    }

    fn column_type(&self, fact: &str) -> SemanticType {
        self.columns
            .iter()
            .find(|c| c.name == fact)
            .map_or(SemanticType::Text, |c| c.semantic_type)
    }
}

fn sql_operator(op: RuleOperator) -> &'static str {
    match op {
        RuleOperator::Eq => "=",
        RuleOperator::Ne => "!=",
        RuleOperator::Gt => ">",
        RuleOperator::Gte => ">=",
        RuleOperator::Lt => "<",
        RuleOperator::Lte => "<=",
        // Every other operator renders through its own path.
        _ => "=",
    }
}

fn coerce_or_null(column_type: SemanticType, value: Option<&Value>) -> Value {
    coerce(column_type, value).unwrap_or(Value::Null)
}
