//! The `(query, variables)` pair a controller reconciles against.

use serde_json::{Map, Value};

/// GraphQL variables: a JSON object keyed by variable name.
pub type Variables = Map<String, Value>;

/// Inputs of one request.
///
/// Equality is structural: two variable maps with the same entries compare
/// equal regardless of insertion order, numbers compare by value (`1` equals
/// `1.0`), while `None` and an empty map do not.
#[derive(Debug, Clone)]
pub struct QueryInputs {
    pub query: String,
    pub variables: Option<Variables>,
}

impl QueryInputs {
    pub fn new(query: impl Into<String>, variables: Option<Variables>) -> Self {
        Self {
            query: query.into(),
            variables,
        }
    }
}

impl PartialEq for QueryInputs {
    fn eq(&self, other: &Self) -> bool {
        self.query == other.query
            && match (&self.variables, &other.variables) {
                (Some(a), Some(b)) => maps_equal(a, b),
                (None, None) => true,
                _ => false,
            }
    }
}

fn maps_equal(a: &Variables, b: &Variables) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .all(|(key, value)| b.get(key).is_some_and(|other| values_equal(value, other)))
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        // Integers stay exact; a float on either side compares as f64.
        (Value::Number(x), Value::Number(y)) if x.is_f64() || y.is_f64() => {
            x.as_f64() == y.as_f64()
        }
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(x), Value::Object(y)) => maps_equal(x, y),
        _ => a == b,
    }
}
