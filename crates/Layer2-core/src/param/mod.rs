//! Param - 명령 파라미터 선언과 값 처리 파이프라인
//!
//! 하나의 호출은 다음 순서를 반드시 지킨다:
//!
//! ```text
//! merge → normalize → convert → default → validate → (dispatch)
//! ```
//!
//! - `types.rs` - ParamType 변환 규칙
//! - `default.rs` - DefaultFrom, 기본값 의존 그래프
//! - `values.rs` - Params / Call
//! - `set.rs` - ParamSet (명령 하나의 파라미터 전체 + 파이프라인)

mod default;
mod set;
mod types;
mod values;

pub use default::DefaultFrom;
pub use set::ParamSet;
pub use types::ParamType;
pub use values::{Call, Params};

use plexus_foundation::{Error, Named, Result};
use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// 정규화 함수
pub type Normalizer = Arc<dyn Fn(&Value) -> std::result::Result<Value, String> + Send + Sync>;

// ============================================================================
// Param - 파라미터 선언
// ============================================================================

/// 이름 있는 값 하나에 대한 선언
///
/// ```ignore
/// Param::new("nick")
///     .normalize_str(|s| s.to_lowercase())
///     .default_from(DefaultFrom::new(["first", "last"], derive_nick));
/// Param::new("points").kind(ParamType::Int).default(0);
/// ```
#[derive(Clone)]
pub struct Param {
    name: String,
    kind: ParamType,
    doc: String,
    required: bool,
    multivalue: bool,
    default: Option<Value>,
    default_from: Option<DefaultFrom>,
    normalizer: Option<Normalizer>,
    minvalue: Option<f64>,
    maxvalue: Option<f64>,
    minlength: Option<usize>,
    maxlength: Option<usize>,
    pattern: Option<Regex>,
}

impl Param {
    /// 필수 단일값 Unicode 파라미터
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParamType::Unicode,
            doc: String::new(),
            required: true,
            multivalue: false,
            default: None,
            default_from: None,
            normalizer: None,
            minvalue: None,
            maxvalue: None,
            minlength: None,
            maxlength: None,
            pattern: None,
        }
    }

    /// 축약 표기 해석
    ///
    /// | 표기     | required | multivalue |
    /// |----------|----------|------------|
    /// | `name`   | yes      | no         |
    /// | `name?`  | no       | no         |
    /// | `name*`  | no       | yes        |
    /// | `name+`  | yes      | yes        |
    pub fn parse(decl: &str) -> Self {
        let decl = decl.trim();
        let (name, required, multivalue) = match decl.chars().last() {
            Some('?') => (&decl[..decl.len() - 1], false, false),
            Some('*') => (&decl[..decl.len() - 1], false, true),
            Some('+') => (&decl[..decl.len() - 1], true, true),
            _ => (decl, true, false),
        };
        let mut param = Self::new(name);
        param.required = required;
        param.multivalue = multivalue;
        param
    }

    // ========================================================================
    // Builder
    // ========================================================================

    pub fn kind(mut self, kind: ParamType) -> Self {
        self.kind = kind;
        self
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn optional(self) -> Self {
        self.required(false)
    }

    pub fn multivalue(mut self) -> Self {
        self.multivalue = true;
        self
    }

    /// 정적 기본값
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// 파생 기본값
    pub fn default_from(mut self, rule: DefaultFrom) -> Self {
        self.default_from = Some(rule);
        self
    }

    pub fn normalize<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> std::result::Result<Value, String> + Send + Sync + 'static,
    {
        self.normalizer = Some(Arc::new(f));
        self
    }

    /// 문자열 값에만 적용되는 정규화 (다른 타입은 그대로 통과)
    pub fn normalize_str<F>(self, f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.normalize(move |value| match value {
            Value::String(s) => Ok(Value::String(f(s))),
            other => Ok(other.clone()),
        })
    }

    pub fn minvalue(mut self, min: f64) -> Self {
        self.minvalue = Some(min);
        self
    }

    pub fn maxvalue(mut self, max: f64) -> Self {
        self.maxvalue = Some(max);
        self
    }

    pub fn minlength(mut self, min: usize) -> Self {
        self.minlength = Some(min);
        self
    }

    pub fn maxlength(mut self, max: usize) -> Self {
        self.maxlength = Some(max);
        self
    }

    pub fn pattern(mut self, pattern: Regex) -> Self {
        self.pattern = Some(pattern);
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn param_type(&self) -> &ParamType {
        &self.kind
    }

    pub fn doc_text(&self) -> &str {
        &self.doc
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_multivalue(&self) -> bool {
        self.multivalue
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn default_rule(&self) -> Option<&DefaultFrom> {
        self.default_from.as_ref()
    }

    // ========================================================================
    // Pipeline stages (값 하나 단위)
    // ========================================================================

    /// 정규화 (multivalue면 원소별)
    pub fn normalize_value(&self, value: Value) -> Result<Value> {
        let Some(normalizer) = &self.normalizer else {
            return Ok(value);
        };
        let apply = |v: &Value| normalizer(v).map_err(|msg| Error::normalization(&self.name, msg));

        match value {
            Value::Array(items) if self.multivalue => items
                .iter()
                .map(apply)
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            other => apply(&other),
        }
    }

    /// 타입 변환
    ///
    /// 빈 값(null, 빈 문자열, 빈 목록)은 "값 없음"으로 취급해 `None`을 반환한다.
    pub fn convert_value(&self, value: Value) -> Result<Option<Value>> {
        if is_empty(&value) {
            return Ok(None);
        }

        let convert = |v: &Value| {
            self.kind
                .convert_scalar(v)
                .map_err(|msg| Error::conversion(&self.name, v.to_string(), msg))
        };

        if self.multivalue {
            let items = match value {
                Value::Array(items) => items,
                scalar => vec![scalar],
            };
            let converted = items
                .iter()
                .filter(|v| !is_empty(v))
                .map(convert)
                .collect::<Result<Vec<_>>>()?;
            if converted.is_empty() {
                return Ok(None);
            }
            return Ok(Some(Value::Array(converted)));
        }

        if let Value::Array(_) = value {
            return Err(Error::conversion(
                &self.name,
                value.to_string(),
                "only one value is allowed",
            ));
        }
        convert(&value).map(Some)
    }

    /// 기본값 계산 (값이 없는 파라미터에 대해)
    ///
    /// 정적 기본값이 우선이고, 없으면 `default_from`을 사용한다.
    /// 파생된 값은 normalize → convert를 거친다.
    pub fn derive_default(&self, resolved: &Params) -> Result<Option<Value>> {
        if let Some(value) = &self.default {
            return self
                .convert_value(value.clone())
                .map_err(|e| Error::default_resolution(&self.name, e.to_string()));
        }

        let Some(rule) = &self.default_from else {
            return Ok(None);
        };
        let Some(raw) = rule.call(resolved) else {
            return Ok(None);
        };

        self.normalize_value(raw)
            .and_then(|v| self.convert_value(v))
            .map_err(|e| Error::default_resolution(&self.name, e.to_string()))
    }

    /// 제약 조건 검사
    pub fn validate_value(&self, value: Option<&Value>) -> Result<()> {
        let Some(value) = value else {
            if self.required {
                return Err(Error::required(&self.name));
            }
            return Ok(());
        };

        match value {
            Value::Array(items) if self.multivalue => {
                for item in items {
                    self.check_scalar(item)?;
                }
                Ok(())
            }
            Value::Array(_) => Err(Error::validation(&self.name, "only one value is allowed")),
            scalar => self.check_scalar(scalar),
        }
    }

    fn check_scalar(&self, value: &Value) -> Result<()> {
        match &self.kind {
            ParamType::Int | ParamType::Float => {
                let n = value
                    .as_f64()
                    .ok_or_else(|| Error::validation(&self.name, format!("must be {}", self.kind)))?;
                if let Some(min) = self.minvalue {
                    if n < min {
                        return Err(Error::validation(&self.name, format!("must be at least {}", min)));
                    }
                }
                if let Some(max) = self.maxvalue {
                    if n > max {
                        return Err(Error::validation(&self.name, format!("can be at most {}", max)));
                    }
                }
            }
            ParamType::Bool => {
                if !value.is_boolean() {
                    return Err(Error::validation(&self.name, "must be True or False"));
                }
            }
            ParamType::Unicode => {
                let s = value
                    .as_str()
                    .ok_or_else(|| Error::validation(&self.name, "must be text"))?;
                let len = s.chars().count();
                if let Some(min) = self.minlength {
                    if len < min {
                        return Err(Error::validation(
                            &self.name,
                            format!("must be at least {} characters", min),
                        ));
                    }
                }
                if let Some(max) = self.maxlength {
                    if len > max {
                        return Err(Error::validation(
                            &self.name,
                            format!("can be at most {} characters", max),
                        ));
                    }
                }
                if let Some(pattern) = &self.pattern {
                    if !pattern.is_match(s) {
                        return Err(Error::validation(
                            &self.name,
                            format!("must match pattern \"{}\"", pattern.as_str()),
                        ));
                    }
                }
            }
            ParamType::Enum(values) => {
                let s = value
                    .as_str()
                    .ok_or_else(|| Error::validation(&self.name, "must be text"))?;
                if !values.iter().any(|v| v == s) {
                    return Err(Error::validation(
                        &self.name,
                        format!("must be one of {}", values.join(", ")),
                    ));
                }
            }
        }
        Ok(())
    }
}

impl From<&str> for Param {
    fn from(decl: &str) -> Self {
        Self::parse(decl)
    }
}

impl Named for Param {
    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Param('{}'", self.name)?;
        if self.kind != ParamType::Unicode {
            write!(f, ", type={}", self.kind)?;
        }
        if !self.required {
            f.write_str(", required=False")?;
        }
        if self.multivalue {
            f.write_str(", multivalue=True")?;
        }
        if let Some(default) = &self.default {
            write!(f, ", default={}", default)?;
        }
        if let Some(rule) = &self.default_from {
            write!(f, ", default_from={:?}", rule)?;
        }
        f.write_str(")")
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}
