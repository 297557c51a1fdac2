//! Leaf predicate operators and the value comparisons behind them.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

/// Comparison applied by a field predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    Contains,
    Exists,
    NotExists,
}

/// Returned when an operator name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown operator {0:?}")]
pub struct UnknownOperator(pub String);

impl FromStr for Operator {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "eq" | "=" => Ok(Self::Eq),
            "neq" | "!=" | "<>" => Ok(Self::Neq),
            "gt" => Ok(Self::Gt),
            "gte" | ">=" => Ok(Self::Gte),
            "lt" => Ok(Self::Lt),
            "lte" | "<=" => Ok(Self::Lte),
            "in" => Ok(Self::In),
            "contains" => Ok(Self::Contains),
            "exists" => Ok(Self::Exists),
            "not_exists" => Ok(Self::NotExists),
            _ => Err(UnknownOperator(s.to_string())),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::In => "in",
            Self::Contains => "contains",
            Self::Exists => "exists",
            Self::NotExists => "not_exists",
        })
    }
}

impl Operator {
    /// Apply the operator to the resolved field (`None` when the path did
    /// not resolve) and the expected value from the condition.
    #[must_use]
    pub fn apply(self, actual: Option<&Value>, expected: &Value) -> bool {
        match self {
            Self::Exists => actual.is_some(),
            Self::NotExists => actual.is_none(),
            Self::Eq => actual.is_some_and(|a| values_equal(a, expected)),
            Self::Neq => actual.is_none_or(|a| !values_equal(a, expected)),
            Self::Gt => compare_numbers(actual, expected, |a, b| a > b),
            Self::Gte => compare_numbers(actual, expected, |a, b| a >= b),
            Self::Lt => compare_numbers(actual, expected, |a, b| a < b),
            Self::Lte => compare_numbers(actual, expected, |a, b| a <= b),
            Self::In => match (actual, expected) {
                (Some(a), Value::Array(candidates)) => {
                    candidates.iter().any(|c| values_equal(a, c))
                }
                _ => false,
            },
            Self::Contains => actual.is_some_and(|a| contains(a, expected)),
        }
    }
}

/// Equality with numeric, then string, then structural fallback.
///
/// Numbers compare by their `f64` value at every depth, so `[1]` equals
/// `[1.0]`.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn values_equal(a: &Value, b: &Value) -> bool {
    if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_str(), b.as_str()) {
        return x == y;
    }
    deep_equal(a, b)
}

fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

fn compare_numbers(
    actual: Option<&Value>,
    expected: &Value,
    cmp: impl Fn(f64, f64) -> bool,
) -> bool {
    match (actual.and_then(Value::as_f64), expected.as_f64()) {
        (Some(a), Some(b)) => cmp(a, b),
        _ => false,
    }
}

fn contains(container: &Value, needle: &Value) -> bool {
    match container {
        Value::String(haystack) => needle.as_str().is_some_and(|n| haystack.contains(n)),
        Value::Array(items) => items.iter().any(|item| values_equal(item, needle)),
        Value::Object(map) => needle.as_str().is_some_and(|key| map.contains_key(key)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn should_parse_operator_aliases_case_insensitively() {
        assert_eq!(" EQ ".parse::<Operator>(), Ok(Operator::Eq));
        assert_eq!("<>".parse::<Operator>(), Ok(Operator::Neq));
        assert_eq!(">=".parse::<Operator>(), Ok(Operator::Gte));
        assert_eq!("<=".parse::<Operator>(), Ok(Operator::Lte));
        assert_eq!("Not_Exists".parse::<Operator>(), Ok(Operator::NotExists));
    }

    #[test]
    fn should_reject_unknown_operator() {
        assert!("between".parse::<Operator>().is_err());
    }

    #[test]
    fn should_compare_integers_and_floats_numerically() {
        assert!(values_equal(&json!(3), &json!(3.0)));
        assert!(values_equal(&json!([1, {"a": 2}]), &json!([1.0, {"a": 2.0}])));
    }

    #[test]
    fn should_not_coerce_numeric_strings() {
        assert!(!values_equal(&json!("5"), &json!(5)));
        assert!(!Operator::Gt.apply(Some(&json!("10")), &json!(5)));
    }

    #[test]
    fn should_treat_missing_field_as_not_equal() {
        assert!(!Operator::Eq.apply(None, &json!("x")));
        assert!(Operator::Neq.apply(None, &json!("x")));
    }

    #[test]
    fn should_apply_numeric_ordering() {
        let v = json!(75);
        assert!(Operator::Gt.apply(Some(&v), &json!(70)));
        assert!(Operator::Gte.apply(Some(&v), &json!(75.0)));
        assert!(Operator::Lt.apply(Some(&v), &json!(80)));
        assert!(!Operator::Lte.apply(Some(&v), &json!(74.5)));
    }

    #[test]
    fn should_require_array_for_in() {
        let v = json!("grade_5");
        assert!(Operator::In.apply(Some(&v), &json!(["grade_4", "grade_5"])));
        assert!(!Operator::In.apply(Some(&v), &json!("grade_5")));
        assert!(!Operator::In.apply(None, &json!([null])));
    }

    #[test]
    fn should_support_all_contains_container_shapes() {
        assert!(Operator::Contains.apply(Some(&json!("late arrival")), &json!("late")));
        assert!(Operator::Contains.apply(Some(&json!(["a", 2])), &json!(2.0)));
        assert!(Operator::Contains.apply(Some(&json!({"fees": 1})), &json!("fees")));
        assert!(!Operator::Contains.apply(Some(&json!({"fees": 1})), &json!(1)));
        assert!(!Operator::Contains.apply(Some(&json!(42)), &json!(4)));
    }

    #[test]
    fn should_ignore_expected_value_for_existence_checks() {
        assert!(Operator::Exists.apply(Some(&json!(null)), &json!("ignored")));
        assert!(Operator::NotExists.apply(None, &json!("ignored")));
    }
}
