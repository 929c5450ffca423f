//! Plugin Proxy - 플러그인 인스턴스의 제한된 공개 표면
//!
//! 호출하는 쪽은 Proxy를 통해서만 플러그인에 접근한다.
//! 인스턴스 자체는 Proxy 안에 private으로 보관된다.

use crate::param::{Call, Param, ParamSet, Params};
use crate::plugin::{Backend, Category, Command, Object};
use crate::registry::{ApiHandle, Invocation};
use crate::textui::TextUi;
use plexus_foundation::{Named, Namespace, Result};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

// ============================================================================
// CommandProxy
// ============================================================================

/// 명령 Proxy
///
/// 노출: 이름, 문서, args/options/params, 단계별 진입점, `call()`
pub struct CommandProxy {
    name: String,
    doc: String,
    params: ParamSet,
    inner: Arc<dyn Command>,
    api: ApiHandle,
}

impl CommandProxy {
    pub(crate) fn new(name: impl Into<String>, inner: Arc<dyn Command>, params: ParamSet, api: ApiHandle) -> Self {
        Self {
            name: name.into(),
            doc: inner.doc().to_string(),
            params,
            inner,
            api,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doc(&self) -> &str {
        &self.doc
    }

    pub fn args(&self) -> &Namespace<Param> {
        self.params.args()
    }

    pub fn options(&self) -> &Namespace<Param> {
        self.params.options()
    }

    /// args 다음 options 순서로 합쳐진 파라미터
    pub fn params(&self) -> &Namespace<Param> {
        self.params.params()
    }

    // ========================================================================
    // 단계별 진입점
    // ========================================================================

    pub fn normalize(&self, values: Params) -> Result<Params> {
        self.params.normalize(values)
    }

    pub fn convert(&self, values: Params) -> Result<Params> {
        self.params.convert(values)
    }

    pub fn get_default(&self, values: &Params) -> Result<Params> {
        self.params.get_default(values)
    }

    // ========================================================================
    // 호출
    // ========================================================================

    /// 파이프라인 실행 후 디스패치
    pub async fn call(&self, call: impl Into<Call>) -> Result<Value> {
        let values = self.process(call.into())?;
        self.dispatch(&values).await
    }

    /// `call()`과 같지만 검증된 파라미터도 함께 반환 (`output_for_cli`용)
    pub async fn call_with_params(&self, call: impl Into<Call>) -> Result<(Params, Value)> {
        let values = self.process(call.into())?;
        let result = self.dispatch(&values).await?;
        Ok((values, result))
    }

    /// merge → normalize → convert → default → validate
    pub fn process(&self, call: Call) -> Result<Params> {
        self.params.process(call)
    }

    /// `in_server`는 여기서 한 번 읽고, 그 값으로 실행 경로가 결정된다.
    async fn dispatch(&self, values: &Params) -> Result<Value> {
        let invocation = Invocation::new(self.api.upgrade()?, &self.name);

        debug!(
            "Command.{}: dispatching to {}",
            self.name,
            if invocation.in_server() { "execute" } else { "forward" }
        );
        self.inner.run(&invocation, values).await
    }

    /// CLI 출력 훅
    pub fn output_for_cli(&self, ui: &mut dyn TextUi, result: &Value, params: &Params) -> Result<()> {
        self.inner.output_for_cli(ui, result, params)
    }
}

impl Named for CommandProxy {
    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for CommandProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CommandProxy(Command.{})", self.name)
    }
}

// ============================================================================
// ObjectProxy
// ============================================================================

/// 객체 Proxy (이름, 문서, params)
pub struct ObjectProxy {
    name: String,
    doc: String,
    params: Namespace<Param>,
    // 인스턴스는 Proxy 수명 동안 유지된다
    _inner: Arc<dyn Object>,
}

impl ObjectProxy {
    pub(crate) fn new(name: impl Into<String>, inner: Arc<dyn Object>) -> Result<Self> {
        let name = name.into();
        let params = Namespace::new(format!("{}.params", name), inner.takes_params(), false)?;
        Ok(Self {
            doc: inner.doc().to_string(),
            name,
            params,
            _inner: inner,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doc(&self) -> &str {
        &self.doc
    }

    pub fn params(&self) -> &Namespace<Param> {
        &self.params
    }
}

impl Named for ObjectProxy {
    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for ObjectProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectProxy(Object.{})", self.name)
    }
}

// ============================================================================
// BackendProxy (Backend / Context)
// ============================================================================

/// 백엔드 Proxy
///
/// 자유 형식 메서드는 `downcast()`로 구체 타입을 얻어 호출한다.
pub struct BackendProxy {
    name: String,
    doc: String,
    category: Category,
    inner: Arc<dyn Backend>,
}

impl BackendProxy {
    pub(crate) fn new(name: impl Into<String>, category: Category, inner: Arc<dyn Backend>) -> Self {
        Self {
            name: name.into(),
            doc: inner.doc().to_string(),
            category,
            inner,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doc(&self) -> &str {
        &self.doc
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// 구체 타입으로 접근 (타입이 다르면 `None`)
    pub fn downcast<T: Backend>(&self) -> Option<&T> {
        self.inner.as_any().downcast_ref::<T>()
    }
}

impl Named for BackendProxy {
    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for BackendProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BackendProxy({}.{})", self.category, self.name)
    }
}
