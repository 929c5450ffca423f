//! EnvValue - 환경 변수 값 (불변 스칼라)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// 환경 변수에 저장되는 스칼라 값
///
/// 문자열로 주어진 값은 [`EnvValue::parse`]로 자동 변환된다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnvValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl EnvValue {
    /// 텍스트 값을 타입이 있는 값으로 변환
    ///
    /// `true`/`True` → Bool, `false`/`False` → Bool, 숫자만 → Int, 나머지 → Str
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed {
            "true" | "True" => return Self::Bool(true),
            "false" | "False" => return Self::Bool(false),
            _ => {}
        }
        if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(n) = trimmed.parse::<i64>() {
                return Self::Int(n);
            }
        }
        Self::Str(trimmed.to_string())
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// 플래그로 해석 (`ParamType::Bool`과 같은 규칙)
    ///
    /// `Bool`, `0`/`1`, `true`/`false`/`yes`/`no`/`on`/`off` (대소문자 무시).
    /// 그 밖의 값은 `None`.
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Int(0) => Some(false),
            Self::Int(1) => Some(true),
            Self::Int(_) => None,
            Self::Str(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Some(true),
                "false" | "no" | "off" | "0" => Some(false),
                _ => None,
            },
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_path(&self) -> Option<&Path> {
        self.as_str().map(Path::new)
    }

    /// JSON 값으로 변환 (명령 결과, 원격 전송용)
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Int(n) => serde_json::Value::from(*n),
            Self::Str(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl fmt::Display for EnvValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Int(n) => write!(f, "{}", n),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<bool> for EnvValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for EnvValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<&str> for EnvValue {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl From<String> for EnvValue {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<PathBuf> for EnvValue {
    fn from(p: PathBuf) -> Self {
        Self::Str(p.to_string_lossy().into_owned())
    }
}

impl From<&Path> for EnvValue {
    fn from(p: &Path) -> Self {
        Self::Str(p.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_autoconverts() {
        assert_eq!(EnvValue::parse("True"), EnvValue::Bool(true));
        assert_eq!(EnvValue::parse("false"), EnvValue::Bool(false));
        assert_eq!(EnvValue::parse(" 42 "), EnvValue::Int(42));
        assert_eq!(EnvValue::parse("-3"), EnvValue::Str("-3".into()));
        assert_eq!(EnvValue::parse(" dummy "), EnvValue::Str("dummy".into()));
    }

    #[test]
    fn test_as_flag() {
        assert_eq!(EnvValue::parse("1").as_flag(), Some(true));
        assert_eq!(EnvValue::parse("0").as_flag(), Some(false));
        assert_eq!(EnvValue::parse("Yes").as_flag(), Some(true));
        assert_eq!(EnvValue::parse("off").as_flag(), Some(false));
        assert_eq!(EnvValue::Int(2).as_flag(), None);
        assert_eq!(EnvValue::parse("maybe").as_flag(), None);
    }

    #[test]
    fn test_serde_untagged() {
        let values = vec![EnvValue::Bool(true), EnvValue::Int(3), EnvValue::Str("EXAMPLE".into())];
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"[true,3,"EXAMPLE"]"#);

        let back: Vec<EnvValue> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, values);
    }

    #[test]
    fn test_display_round_trips_bools() {
        assert_eq!(EnvValue::Bool(true).to_string(), "True");
        assert_eq!(EnvValue::parse(&EnvValue::Bool(false).to_string()), EnvValue::Bool(false));
    }
}
