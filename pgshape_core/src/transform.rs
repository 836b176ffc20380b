use crate::error::{Error, Result};
use pgshape_driver::Value;
use std::fmt;
use std::sync::Arc;

/// A function applied to every output value of a formatted result
pub type TransformFn = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// Names accepted by [`Transform::named`]
pub const BUILTIN_TRANSFORMS: [&str; 7] = ["bool", "json", "lower", "number", "string", "trim", "upper"];

#[derive(Clone)]
pub enum Transform {
    Function(TransformFn),
    Named(String),
}

impl Transform {
    pub fn function<F>(function: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        Transform::Function(Arc::new(function))
    }

    pub fn named<S: Into<String>>(name: S) -> Self {
        Transform::Named(name.into())
    }

    /// Resolve to a callable function.
    ///
    /// # Errors
    /// * [`Error::InvalidTransform`] if a named transform is not one of [`BUILTIN_TRANSFORMS`]
    pub fn resolve(&self) -> Result<TransformFn> {
        match self {
            Transform::Function(function) => Ok(Arc::clone(function)),
            Transform::Named(name) => builtin(name).ok_or_else(|| Error::InvalidTransform {
                name: name.clone(),
                allowed: BUILTIN_TRANSFORMS.iter().map(ToString::to_string).collect(),
            }),
        }
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transform::Function(_) => f.write_str("Function(..)"),
            Transform::Named(name) => f.debug_tuple("Named").field(name).finish(),
        }
    }
}

fn builtin(name: &str) -> Option<TransformFn> {
    let function: TransformFn = match name {
        "bool" => Arc::new(|value: &Value| Value::Bool(!value.is_falsy())),
        "json" => Arc::new(to_json),
        "lower" => Arc::new(|value: &Value| map_string(value, str::to_lowercase)),
        "number" => Arc::new(to_number),
        "string" => Arc::new(|value: &Value| match value {
            Value::Null | Value::String(_) => value.clone(),
            value => Value::String(value.to_string()),
        }),
        "trim" => Arc::new(|value: &Value| map_string(value, |text| text.trim().to_string())),
        "upper" => Arc::new(|value: &Value| map_string(value, str::to_uppercase)),
        _ => return None,
    };
    Some(function)
}

fn map_string(value: &Value, function: impl Fn(&str) -> String) -> Value {
    match value {
        Value::String(text) => Value::String(function(text)),
        value => value.clone(),
    }
}

/// Strings are parsed as JSON documents; anything else is serialized.
fn to_json(value: &Value) -> Value {
    match value {
        Value::String(text) => match serde_json::from_str(text) {
            Ok(json) => Value::Json(json),
            Err(_) => value.clone(),
        },
        Value::Json(_) => value.clone(),
        value => serde_json::to_value(value).map_or_else(|_| value.clone(), Value::Json),
    }
}

/// Integers widen to `I64`; strings that do not hold a number become null.
fn to_number(value: &Value) -> Value {
    if let Some(number) = value.as_i64() {
        return Value::I64(number);
    }
    match value {
        Value::Bool(value) => Value::I64(i64::from(*value)),
        Value::String(text) => {
            let text = text.trim();
            if let Ok(number) = text.parse::<i64>() {
                Value::I64(number)
            } else if let Ok(number) = text.parse::<f64>() {
                Value::F64(number)
            } else {
                Value::Null
            }
        }
        value => value.clone(),
    }
}
