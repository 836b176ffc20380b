use pgshape_driver::Value;

/// Render a value as a SQL literal.
///
/// Nulls become `NULL`, booleans `1` or `0` and numbers their numeral. Strings
/// have backslashes doubled and are single quoted with embedded quotes doubled.
/// JSON documents and arrays are serialized and quoted without backslash escaping.
#[must_use]
pub fn sanitize(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(value) => u8::from(*value).to_string(),
        Value::Json(json) => sanitize_json(json),
        Value::Array(_) => {
            let text = serde_json::to_string(value).unwrap_or_else(|_| value.to_string());
            quote(&text)
        }
        value if value.is_numeric() => value.to_string(),
        value => quote(&escape_backslashes(&value.to_string())),
    }
}

fn sanitize_json(json: &serde_json::Value) -> String {
    match json {
        serde_json::Value::Null => "NULL".to_string(),
        serde_json::Value::Bool(value) => u8::from(*value).to_string(),
        serde_json::Value::Number(number) => number.to_string(),
        serde_json::Value::String(text) => quote(&escape_backslashes(text)),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => quote(&json.to_string()),
    }
}

fn escape_backslashes(text: &str) -> String {
    text.replace('\\', "\\\\")
}

fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null() {
        assert_eq!(sanitize(&Value::Null), "NULL");
        assert_eq!(sanitize(&Value::Json(json!(null))), "NULL");
    }

    #[test]
    fn test_bool() {
        assert_eq!(sanitize(&Value::Bool(true)), "1");
        assert_eq!(sanitize(&Value::Bool(false)), "0");
    }

    #[test]
    fn test_numbers() {
        assert_eq!(sanitize(&Value::I32(42)), "42");
        assert_eq!(sanitize(&Value::I64(-7)), "-7");
        assert_eq!(sanitize(&Value::F64(1.5)), "1.5");
        assert_eq!(sanitize(&Value::Json(json!(3))), "3");
    }

    #[test]
    fn test_string() {
        assert_eq!(sanitize(&Value::from("chacho")), "'chacho'");
        assert_eq!(sanitize(&Value::from("' OR 1 = 1;")), "''' OR 1 = 1;'");
        assert_eq!(sanitize(&Value::from(r"a\b")), r"'a\\b'");
        assert_eq!(sanitize(&Value::from(r"\'")), r"'\\'''");
    }

    #[test]
    fn test_json_object() {
        let value = Value::Json(json!({"chACho": "' OR 1 = 1;"}));
        assert_eq!(sanitize(&value), r#"'{"chACho":"'' OR 1 = 1;"}'"#);
    }

    #[test]
    fn test_array() {
        let value = Value::Array(vec![Value::I32(1), Value::I32(2), Value::I32(3)]);
        assert_eq!(sanitize(&value), "'[1,2,3]'");
        assert_eq!(sanitize(&Value::Json(json!([1, 2, 3]))), "'[1,2,3]'");
    }

    #[test]
    fn test_other_values_quoted() {
        assert_eq!(sanitize(&Value::Bytes(vec![1, 2, 3])), "'AQID'");
    }
}
