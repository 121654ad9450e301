use serde_json::Value;

/// Check if a value carries data.
///
/// A present scalar carries data; lists and objects carry data when they
/// have at least one element or key. `null` carries none.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use fn_msgraph_util::is_empty::has_data;
///
/// assert!(has_data(&json!([{"id": "existing-user-id"}])));
/// assert!(has_data(&json!("group-id")));
/// assert!(!has_data(&json!([])));
/// assert!(!has_data(&json!({})));
/// assert!(!has_data(&json!(null)));
/// ```
pub fn has_data(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Bool(_) | Value::Number(_) | Value::String(_) => true,
    }
}

/// Check if an optional value carries data; a missing value carries none.
pub fn has_data_opt(value: Option<&Value>) -> bool {
    value.is_some_and(has_data)
}
