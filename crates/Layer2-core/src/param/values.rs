//! Params / Call - 파라미터 값 컬렉션과 호출 입력

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

// ============================================================================
// Params - 이름 → 값
// ============================================================================

/// 파이프라인 단계 사이에서 주고받는 이름 → 값 매핑
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, Value>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// 빌더 스타일 삽입
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.0.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// 다른 Params의 값을 덮어쓰지 않고 합친다
    pub fn extend_missing(&mut self, other: Params) {
        for (k, v) in other.0 {
            self.0.entry(k).or_insert(v);
        }
    }

    /// JSON 객체로 변환 (원격 전송용)
    pub fn to_json(&self) -> Value {
        Value::Object(self.0.clone().into_iter().collect())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl IntoIterator for Params {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

// ============================================================================
// Call - 한 번의 호출에 주어진 위치/이름 인자
// ============================================================================

/// 명령 호출 입력
///
/// ```ignore
/// let call = Call::new().arg("Jason").option("stuff", "unit tests");
/// api.command("nudge")?.call(call).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Call {
    pub(crate) args: Vec<Value>,
    pub(crate) options: Vec<(String, Value)>,
}

impl Call {
    pub fn new() -> Self {
        Self::default()
    }

    /// 위치 인자 추가
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    /// 이름 인자 추가
    pub fn option(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.push((name.into(), value.into()));
        self
    }

    /// 위치 인자 목록으로 생성
    pub fn from_args<I, V>(args: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            options: Vec::new(),
        }
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn options(&self) -> &[(String, Value)] {
        &self.options
    }
}

impl From<Params> for Call {
    fn from(params: Params) -> Self {
        Self {
            args: Vec::new(),
            options: params.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_params_accessors() {
        let params = Params::new().with("first", "Jason").with("points", 10);
        assert_eq!(params.get_str("first"), Some("Jason"));
        assert_eq!(params.get_i64("points"), Some(10));
        assert_eq!(params.to_json(), json!({"first": "Jason", "points": 10}));
    }

    #[test]
    fn test_extend_missing_keeps_existing() {
        let mut params = Params::new().with("a", 1);
        params.extend_missing(Params::new().with("a", 2).with("b", 3));
        assert_eq!(params.get_i64("a"), Some(1));
        assert_eq!(params.get_i64("b"), Some(3));
    }

    #[test]
    fn test_call_builder() {
        let call = Call::new().arg("Jason").option("stuff", "tests");
        assert_eq!(call.args(), &[json!("Jason")]);
        assert_eq!(call.options()[0].0, "stuff");
    }
}
