//! Condition trees — boolean guards evaluated against event payloads.
//!
//! Rule authors write conditions as JSON. The raw value is parsed once into
//! a [`Condition`] tree and then interpreted against each payload.
//! Evaluation is total and side-effect free: shapes that are not understood
//! become [`Condition::Malformed`] and never match (fail-closed).
//!
//! Recognised shapes:
//!
//! | JSON                                    | Node                        |
//! |-----------------------------------------|-----------------------------|
//! | `{"all": [..]}`                         | [`Condition::All`]          |
//! | `{"any": [..]}`                         | [`Condition::Any`]          |
//! | `{"not": node}`                         | [`Condition::Not`]          |
//! | `{"field": "a.b", "op": "gt", "value": 3}` | [`Condition::Field`]     |
//! | `{"severity": "high", ..}`              | [`Condition::Shorthand`]    |
//! | `[node, ..]`                            | [`Condition::All`]          |

mod operator;
mod path;

pub use operator::{Operator, UnknownOperator, values_equal};
pub use path::FieldPath;

use serde_json::{Map, Value};

/// A leaf test: resolve `path` in the payload and compare with `value`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPredicate {
    pub path: FieldPath,
    pub op: Operator,
    pub value: Value,
}

impl FieldPredicate {
    #[must_use]
    pub fn new(path: &str, op: Operator, value: Value) -> Self {
        Self {
            path: FieldPath::new(path),
            op,
            value,
        }
    }

    #[must_use]
    pub fn evaluate(&self, payload: &Value) -> bool {
        self.op.apply(self.path.resolve(payload), &self.value)
    }
}

/// Parsed condition tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// True iff every child is true. Empty is true.
    All(Vec<Condition>),
    /// True iff at least one child is true. Empty is false.
    Any(Vec<Condition>),
    /// Logical negation.
    Not(Box<Condition>),
    /// Explicit leaf predicate.
    Field(FieldPredicate),
    /// `{"key": value, ..}` — implicit `all` of per-key equality tests.
    Shorthand(Vec<FieldPredicate>),
    /// Unrecognised shape, with a human-readable reason. Always false.
    Malformed(String),
}

/// Outcome of [`Condition::diagnose`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    Matched,
    NotMatched,
    /// The condition did not match and the tree contains a malformed node.
    Malformed(String),
}

impl Condition {
    /// A condition that always holds (`{}`).
    #[must_use]
    pub fn always() -> Self {
        Self::All(Vec::new())
    }

    /// Parse a raw rule condition.
    ///
    /// `null`, `{}` and `[]` all mean "always true".
    #[must_use]
    pub fn parse(raw: &Value) -> Self {
        match raw {
            Value::Null => Self::always(),
            other => Self::parse_node(other),
        }
    }

    fn parse_node(node: &Value) -> Self {
        match node {
            Value::Object(map) => Self::parse_object(map),
            Value::Array(items) => Self::All(items.iter().map(Self::parse_node).collect()),
            other => Self::Malformed(format!("unexpected {} node", json_kind(other))),
        }
    }

    fn parse_object(map: &Map<String, Value>) -> Self {
        if let Some(children) = map.get("all") {
            return match children {
                Value::Array(items) => Self::All(items.iter().map(Self::parse_node).collect()),
                other => Self::Malformed(format!(
                    "`all` expects an array, got {}",
                    json_kind(other)
                )),
            };
        }
        if let Some(children) = map.get("any") {
            return match children {
                Value::Array(items) => Self::Any(items.iter().map(Self::parse_node).collect()),
                other => Self::Malformed(format!(
                    "`any` expects an array, got {}",
                    json_kind(other)
                )),
            };
        }
        if let Some(child) = map.get("not") {
            return Self::Not(Box::new(Self::parse_node(child)));
        }
        if let Some(field) = map.get("field") {
            let Some(path) = field.as_str() else {
                return Self::Malformed(format!(
                    "`field` expects a string, got {}",
                    json_kind(field)
                ));
            };
            let op = match map.get("op").and_then(Value::as_str).map(str::trim) {
                None | Some("") => Operator::Eq,
                Some(raw) => match raw.parse::<Operator>() {
                    Ok(op) => op,
                    Err(err) => return Self::Malformed(err.to_string()),
                },
            };
            let value = map.get("value").cloned().unwrap_or(Value::Null);
            return Self::Field(FieldPredicate::new(path, op, value));
        }

        Self::Shorthand(
            map.iter()
                .map(|(key, expected)| FieldPredicate::new(key, Operator::Eq, expected.clone()))
                .collect(),
        )
    }

    /// Evaluate against `payload`. A `null` payload behaves as `{}`.
    #[must_use]
    pub fn evaluate(&self, payload: &Value) -> bool {
        if payload.is_null() {
            let empty = Value::Object(Map::new());
            return self.eval_node(&empty);
        }
        self.eval_node(payload)
    }

    fn eval_node(&self, payload: &Value) -> bool {
        match self {
            Self::All(children) => children.iter().all(|c| c.eval_node(payload)),
            Self::Any(children) => children.iter().any(|c| c.eval_node(payload)),
            Self::Not(child) => !child.eval_node(payload),
            Self::Field(predicate) => predicate.evaluate(payload),
            Self::Shorthand(predicates) => predicates.iter().all(|p| p.evaluate(payload)),
            Self::Malformed(_) => false,
        }
    }

    /// Like [`evaluate`](Self::evaluate), but separates "did not match" from
    /// "could not be understood" so callers can log the difference.
    ///
    /// The boolean outcome is unchanged: anything other than
    /// [`Evaluation::Matched`] means the rule does not fire.
    #[must_use]
    pub fn diagnose(&self, payload: &Value) -> Evaluation {
        if self.evaluate(payload) {
            return Evaluation::Matched;
        }
        match self.first_malformed() {
            Some(reason) => Evaluation::Malformed(reason.to_string()),
            None => Evaluation::NotMatched,
        }
    }

    /// Depth-first search for the first malformed node.
    #[must_use]
    pub fn first_malformed(&self) -> Option<&str> {
        match self {
            Self::All(children) | Self::Any(children) => {
                children.iter().find_map(|c| c.first_malformed())
            }
            Self::Not(child) => child.first_malformed(),
            Self::Malformed(reason) => Some(reason.as_str()),
            Self::Field(_) | Self::Shorthand(_) => None,
        }
    }
}

/// Parse and evaluate in one step.
#[must_use]
pub fn evaluate(condition: &Value, payload: &Value) -> bool {
    Condition::parse(condition).evaluate(payload)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
