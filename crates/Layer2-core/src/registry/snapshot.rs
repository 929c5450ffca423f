//! Finalized snapshot - finalize 이후의 불변 상태
//!
//! `ApiRef`는 소유 참조, `ApiHandle`은 플러그인이 들고 있는 비소유 역참조다.

use crate::param::Call;
use crate::plugin::Category;
use crate::proxy::{BackendProxy, CommandProxy, ObjectProxy};
use crate::transport::Transport;
use plexus_foundation::{Env, Error, Named, Namespace, Result};
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, Weak};

// ============================================================================
// Finalized - 카테고리별 Namespace + frozen Env
// ============================================================================

pub(crate) struct Finalized {
    pub(crate) env: Env,
    pub(crate) commands: Namespace<CommandProxy>,
    pub(crate) objects: Namespace<ObjectProxy>,
    pub(crate) methods: Namespace<CommandProxy>,
    pub(crate) properties: Namespace<ObjectProxy>,
    pub(crate) applications: Namespace<CommandProxy>,
    pub(crate) backends: Namespace<BackendProxy>,
    pub(crate) contexts: Namespace<BackendProxy>,
    pub(crate) transport: Option<Arc<dyn Transport>>,
}

impl Finalized {
    /// finalize 실패 시 자리만 채우는 빈 상태 (외부로 나가지 않는다)
    pub(crate) fn placeholder() -> Self {
        Self {
            env: Env::empty(),
            commands: Namespace::empty(Category::Command.as_str()),
            objects: Namespace::empty(Category::Object.as_str()),
            methods: Namespace::empty(Category::Method.as_str()),
            properties: Namespace::empty(Category::Property.as_str()),
            applications: Namespace::empty(Category::Application.as_str()),
            backends: Namespace::empty(Category::Backend.as_str()),
            contexts: Namespace::empty(Category::Context.as_str()),
            transport: None,
        }
    }
}

// ============================================================================
// ApiRef - finalize된 Api
// ============================================================================

/// finalize된 Api에 대한 공유 참조
///
/// 모든 내용이 불변이므로 여러 스레드에서 동시에 읽을 수 있다.
#[derive(Clone)]
pub struct ApiRef(pub(crate) Arc<Finalized>);

impl ApiRef {
    /// frozen 환경
    pub fn env(&self) -> &Env {
        &self.0.env
    }

    pub fn commands(&self) -> &Namespace<CommandProxy> {
        &self.0.commands
    }

    pub fn objects(&self) -> &Namespace<ObjectProxy> {
        &self.0.objects
    }

    pub fn methods(&self) -> &Namespace<CommandProxy> {
        &self.0.methods
    }

    pub fn properties(&self) -> &Namespace<ObjectProxy> {
        &self.0.properties
    }

    pub fn applications(&self) -> &Namespace<CommandProxy> {
        &self.0.applications
    }

    pub fn backends(&self) -> &Namespace<BackendProxy> {
        &self.0.backends
    }

    pub fn contexts(&self) -> &Namespace<BackendProxy> {
        &self.0.contexts
    }

    /// `Command.<name>` (없으면 `AttributeNotFound`)
    pub fn command(&self, name: &str) -> Result<&CommandProxy> {
        lookup(&self.0.commands, Category::Command, name)
    }

    pub fn object(&self, name: &str) -> Result<&ObjectProxy> {
        lookup(&self.0.objects, Category::Object, name)
    }

    pub fn method(&self, name: &str) -> Result<&CommandProxy> {
        lookup(&self.0.methods, Category::Method, name)
    }

    pub fn property(&self, name: &str) -> Result<&ObjectProxy> {
        lookup(&self.0.properties, Category::Property, name)
    }

    pub fn application(&self, name: &str) -> Result<&CommandProxy> {
        lookup(&self.0.applications, Category::Application, name)
    }

    pub fn backend(&self, name: &str) -> Result<&BackendProxy> {
        lookup(&self.0.backends, Category::Backend, name)
    }

    pub fn context(&self, name: &str) -> Result<&BackendProxy> {
        lookup(&self.0.contexts, Category::Context, name)
    }

    /// 카테고리별 (이름 목록) - 사전순
    pub fn plugin_names(&self, category: Category) -> Vec<&str> {
        match category {
            Category::Command => self.0.commands.names().collect(),
            Category::Object => self.0.objects.names().collect(),
            Category::Method => self.0.methods.names().collect(),
            Category::Property => self.0.properties.names().collect(),
            Category::Application => self.0.applications.names().collect(),
            Category::Backend => self.0.backends.names().collect(),
            Category::Context => self.0.contexts.names().collect(),
        }
    }

    /// 설치된 Transport (없으면 `Transport` 에러)
    pub fn transport(&self) -> Result<Arc<dyn Transport>> {
        self.0
            .transport
            .clone()
            .ok_or_else(|| Error::Transport("no transport configured for forward()".to_string()))
    }

    /// `Command.<name>(call)` 단축
    pub async fn call(&self, name: &str, call: impl Into<Call>) -> Result<Value> {
        self.command(name)?.call(call).await
    }
}

impl fmt::Debug for ApiRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("ApiRef");
        for category in Category::ALL {
            out.field(category.as_str(), &self.plugin_names(category).len());
        }
        out.finish()
    }
}

fn lookup<'a, T: Named>(
    namespace: &'a Namespace<T>,
    category: Category,
    name: &str,
) -> Result<&'a T> {
    namespace
        .find(name)
        .ok_or_else(|| Error::attribute_not_found(category.as_str(), name))
}

// ============================================================================
// ApiHandle - 플러그인이 보관하는 역참조
// ============================================================================

/// Api에 대한 비소유 역참조
///
/// finalize 도중(on_load)에는 아직 upgrade할 수 없다.
#[derive(Clone)]
pub struct ApiHandle(pub(crate) Weak<Finalized>);

impl ApiHandle {
    pub fn upgrade(&self) -> Result<ApiRef> {
        self.0
            .upgrade()
            .map(ApiRef)
            .ok_or_else(|| Error::lifecycle("Api is not available (not finalized yet, or dropped)"))
    }

    pub fn is_available(&self) -> bool {
        self.0.strong_count() > 0
    }
}

impl fmt::Debug for ApiHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiHandle(available={})", self.is_available())
    }
}
