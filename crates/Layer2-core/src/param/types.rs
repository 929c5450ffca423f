//! ParamType - 파라미터의 의미 타입과 변환 규칙

use serde_json::{Number, Value};
use std::fmt;

/// 파라미터 의미 타입
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    /// 문자열
    Unicode,
    /// 정수
    Int,
    /// 실수
    Float,
    /// 참/거짓
    Bool,
    /// 정해진 문자열 값 중 하나
    Enum(Vec<String>),
}

impl ParamType {
    /// 열거형 타입 생성 헬퍼
    pub fn enumeration<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Enum(values.into_iter().map(Into::into).collect())
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Unicode => "unicode",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Enum(_) => "enum",
        }
    }

    /// 스칼라 값 하나를 이 타입으로 변환
    ///
    /// 실패 시 사람이 읽을 수 있는 이유를 반환한다.
    pub fn convert_scalar(&self, value: &Value) -> Result<Value, String> {
        match self {
            Self::Unicode | Self::Enum(_) => match value {
                Value::String(s) => Ok(Value::String(s.clone())),
                Value::Number(n) => Ok(Value::String(n.to_string())),
                Value::Bool(b) => Ok(Value::String(if *b { "True" } else { "False" }.to_string())),
                _ => Err(format!("expected text, got {}", kind_of(value))),
            },
            Self::Int => match value {
                Value::Number(n) if n.is_i64() || n.is_u64() => Ok(Value::Number(n.clone())),
                Value::Number(n) => match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                        Ok(Value::from(f as i64))
                    }
                    _ => Err("must be an integer".to_string()),
                },
                Value::String(s) => s
                    .trim()
                    .parse::<i64>()
                    .map(Value::from)
                    .map_err(|_| "must be an integer".to_string()),
                _ => Err(format!("expected integer, got {}", kind_of(value))),
            },
            Self::Float => match value {
                Value::Number(n) => n
                    .as_f64()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
                    .ok_or_else(|| "must be a decimal number".to_string()),
                Value::String(s) => s
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
                    .ok_or_else(|| "must be a decimal number".to_string()),
                _ => Err(format!("expected decimal number, got {}", kind_of(value))),
            },
            Self::Bool => match value {
                Value::Bool(b) => Ok(Value::Bool(*b)),
                Value::Number(n) => match n.as_i64() {
                    Some(0) => Ok(Value::Bool(false)),
                    Some(1) => Ok(Value::Bool(true)),
                    _ => Err("must be True or False".to_string()),
                },
                Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                    "true" | "yes" | "on" | "1" => Ok(Value::Bool(true)),
                    "false" | "no" | "off" | "0" => Ok(Value::Bool(false)),
                    _ => Err("must be True or False".to_string()),
                },
                _ => Err(format!("expected boolean, got {}", kind_of(value))),
            },
        }
    }
}

impl Default for ParamType {
    fn default() -> Self {
        Self::Unicode
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enum(values) => write!(f, "enum({})", values.join("|")),
            other => f.write_str(other.name()),
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "text",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_int_from_text() {
        assert_eq!(ParamType::Int.convert_scalar(&json!(" 1000  ")), Ok(json!(1000)));
        assert_eq!(ParamType::Int.convert_scalar(&json!(7.0)), Ok(json!(7)));
        assert!(ParamType::Int.convert_scalar(&json!("ten")).is_err());
        assert!(ParamType::Int.convert_scalar(&json!(2.5)).is_err());
    }

    #[test]
    fn test_bool_from_text() {
        assert_eq!(ParamType::Bool.convert_scalar(&json!("Yes")), Ok(json!(true)));
        assert_eq!(ParamType::Bool.convert_scalar(&json!("FALSE")), Ok(json!(false)));
        assert_eq!(ParamType::Bool.convert_scalar(&json!(1)), Ok(json!(true)));
        assert!(ParamType::Bool.convert_scalar(&json!("maybe")).is_err());
    }

    #[test]
    fn test_unicode_and_float() {
        assert_eq!(ParamType::Unicode.convert_scalar(&json!(42)), Ok(json!("42")));
        assert!(ParamType::Unicode.convert_scalar(&json!({"a": 1})).is_err());
        assert_eq!(ParamType::Float.convert_scalar(&json!("2.5")), Ok(json!(2.5)));
    }

    #[test]
    fn test_display() {
        assert_eq!(ParamType::enumeration(["red", "blue"]).to_string(), "enum(red|blue)");
        assert_eq!(ParamType::Int.to_string(), "int");
    }
}
