// ABOUTME: Scalar and list values carried by export variables and repeat iterables
// ABOUTME: Renders values the way the .dig format expects them, without quoting

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Export variables in declaration order.
pub type Exports = IndexMap<String, ExportValue>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Str(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExportValue {
    Scalar(Scalar),
    List(Vec<Scalar>),
}

impl Scalar {
    pub fn is_int(&self) -> bool {
        matches!(self, Scalar::Int(_))
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(value) => write!(f, "{}", value),
            Scalar::Str(value) => write!(f, "{}", value),
        }
    }
}

impl fmt::Display for ExportValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportValue::Scalar(value) => write!(f, "{}", value),
            ExportValue::List(values) => write!(f, "{}", render_list(values)),
        }
    }
}

/// Render a literal flow sequence such as `[a, b, 3]`.
pub fn render_list(values: &[Scalar]) -> String {
    let items: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    format!("[{}]", items.join(", "))
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Str(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Str(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Int(value as i64)
    }
}

impl From<Scalar> for ExportValue {
    fn from(value: Scalar) -> Self {
        ExportValue::Scalar(value)
    }
}

impl From<&str> for ExportValue {
    fn from(value: &str) -> Self {
        ExportValue::Scalar(value.into())
    }
}

impl From<String> for ExportValue {
    fn from(value: String) -> Self {
        ExportValue::Scalar(value.into())
    }
}

impl From<i64> for ExportValue {
    fn from(value: i64) -> Self {
        ExportValue::Scalar(value.into())
    }
}

impl From<i32> for ExportValue {
    fn from(value: i32) -> Self {
        ExportValue::Scalar(value.into())
    }
}

impl From<Vec<Scalar>> for ExportValue {
    fn from(values: Vec<Scalar>) -> Self {
        ExportValue::List(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_rendering_is_unquoted() {
        let values = vec![Scalar::from("a"), Scalar::from("b c")];
        assert_eq!(render_list(&values), "[a, b c]");
        assert_eq!(render_list(&[Scalar::Int(1), Scalar::Int(2)]), "[1, 2]");
    }

    #[test]
    fn test_untagged_yaml_values() {
        let value: ExportValue = serde_yaml::from_str("[1, 2]").unwrap();
        assert_eq!(value, ExportValue::List(vec![Scalar::Int(1), Scalar::Int(2)]));

        let value: ExportValue = serde_yaml::from_str("production").unwrap();
        assert_eq!(value.to_string(), "production");
    }
}
