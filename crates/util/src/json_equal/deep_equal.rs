use serde_json::{Number, Value};

/// Performs a structural equality check between two JSON values.
///
/// - Objects are equal when they have the same key set and pairwise equal
///   values; key order does not matter.
/// - Lists are equal when they have the same length and equal values at
///   each position.
/// - Scalars are equal when they have the same type and value. Numbers are
///   compared by value, so `1` and `1.0` are equal.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use fn_msgraph_util::json_equal::deep_equal;
///
/// let a = json!({"id": "test-user-id", "groups": ["a", "b"]});
/// let b = json!({"groups": ["a", "b"], "id": "test-user-id"});
/// let c = json!({"id": "test-user-id", "groups": ["b", "a"]});
///
/// assert!(deep_equal(&a, &b));
/// assert!(!deep_equal(&a, &c));
/// ```
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    first_difference(a, b).is_none()
}

/// Locate the first structural difference between two values.
///
/// Returns `None` when the values are equal, otherwise the location of the
/// first mismatch found, rendered as `.key` / `[index]` steps (the empty
/// string means the values differ at the top).
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use fn_msgraph_util::json_equal::first_difference;
///
/// let observed = json!([{"id": "incorrect-id", "mail": "user@example.com"}]);
/// let computed = json!([{"id": "test-user-id", "mail": "user@example.com"}]);
/// assert_eq!(first_difference(&observed, &computed), Some("[0].id".to_string()));
/// ```
pub fn first_difference(a: &Value, b: &Value) -> Option<String> {
    let mut pending: Vec<(String, &Value, &Value)> = vec![(String::new(), a, b)];

    while let Some((at, a, b)) = pending.pop() {
        match (a, b) {
            (Value::Null, Value::Null) => {}
            (Value::Bool(x), Value::Bool(y)) if x == y => {}
            (Value::String(x), Value::String(y)) if x == y => {}
            (Value::Number(x), Value::Number(y)) if numbers_equal(x, y) => {}
            (Value::Array(xs), Value::Array(ys)) => {
                if xs.len() != ys.len() {
                    return Some(at);
                }
                // Reversed so that lower indices are compared first.
                for (i, (x, y)) in xs.iter().zip(ys).enumerate().rev() {
                    pending.push((format!("{at}[{i}]"), x, y));
                }
            }
            (Value::Object(xs), Value::Object(ys)) => {
                if xs.len() != ys.len() {
                    return Some(at);
                }
                let mut children = Vec::with_capacity(xs.len());
                for (key, x) in xs {
                    match ys.get(key) {
                        Some(y) => children.push((format!("{at}.{key}"), x, y)),
                        None => return Some(format!("{at}.{key}")),
                    }
                }
                pending.extend(children.into_iter().rev());
            }
            _ => return Some(at),
        }
    }
    None
}

fn numbers_equal(x: &Number, y: &Number) -> bool {
    if let (Some(a), Some(b)) = (x.as_i64(), y.as_i64()) {
        return a == b;
    }
    if let (Some(a), Some(b)) = (x.as_u64(), y.as_u64()) {
        return a == b;
    }
    match (x.as_f64(), y.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
