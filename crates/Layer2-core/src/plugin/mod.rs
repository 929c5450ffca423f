//! # Plugin System
//!
//! 플러그인 카테고리와 등록 단위
//!
//! ## 개요
//!
//! 플러그인은 닫힌 카테고리 집합 중 하나에 속하고, 카테고리마다 계약(trait)이 정해져 있다:
//!
//! | 카테고리      | 계약      | 설명                                   |
//! |---------------|-----------|----------------------------------------|
//! | `Command`     | `Command` | 파라미터 파이프라인을 거쳐 호출되는 명령 |
//! | `Object`      | `Object`  | 이름/문서/파라미터를 가진 데이터 객체    |
//! | `Method`      | `Command` | 객체에 딸린 명령                         |
//! | `Property`    | `Object`  | 객체의 속성 선언                         |
//! | `Application` | `Command` | 애플리케이션 단위 명령                   |
//! | `Backend`     | `Backend` | 외부 시스템과 상호작용하는 자유 형식     |
//! | `Context`     | `Backend` | Backend와 같은 계약, 별도 Namespace      |
//!
//! ## 생명주기
//!
//! ```text
//! PluginClass (이름 + factory)
//!     │  Api::register()
//!     ▼
//! Api::finalize()
//!     ├─ factory() → 인스턴스 1개
//!     ├─ on_load(LoadContext)   환경 기본값 등록 (first-one-wins)
//!     └─ Proxy로 감싸서 카테고리별 Namespace에 배치
//! ```
//!
//! ## 예시
//!
//! ```ignore
//! let mut api = Api::new();
//! api.register(PluginClass::command("nudge", || Nudge))?;
//! api.register(PluginClass::backend("ldap", Ldap::default))?;
//! let api = api.finalize()?;
//! ```

mod traits;

pub use traits::{Backend, Command, Object};

use crate::registry::ApiHandle;
use plexus_foundation::{Env, EnvValue, Result};
use std::fmt;

// ============================================================================
// Category
// ============================================================================

/// 플러그인 카테고리
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Command,
    Object,
    Method,
    Property,
    Application,
    Backend,
    Context,
}

/// 카테고리가 요구하는 플러그인 계약
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contract {
    Command,
    Object,
    Backend,
}

impl Category {
    /// Namespace 순서
    pub const ALL: [Category; 7] = [
        Category::Command,
        Category::Object,
        Category::Method,
        Category::Property,
        Category::Application,
        Category::Backend,
        Category::Context,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Command => "Command",
            Self::Object => "Object",
            Self::Method => "Method",
            Self::Property => "Property",
            Self::Application => "Application",
            Self::Backend => "Backend",
            Self::Context => "Context",
        }
    }

    pub fn contract(&self) -> Contract {
        match self {
            Self::Command | Self::Method | Self::Application => Contract::Command,
            Self::Object | Self::Property => Contract::Object,
            Self::Backend | Self::Context => Contract::Backend,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// PluginClass - 등록 단위 (인스턴스 템플릿)
// ============================================================================

pub(crate) type CommandFactory = Box<dyn Fn() -> Box<dyn Command> + Send + Sync>;
pub(crate) type ObjectFactory = Box<dyn Fn() -> Box<dyn Object> + Send + Sync>;
pub(crate) type BackendFactory = Box<dyn Fn() -> Box<dyn Backend> + Send + Sync>;

/// 카테고리 계약별 factory
pub(crate) enum Factory {
    Command(CommandFactory),
    Object(ObjectFactory),
    Backend(BackendFactory),
}

/// 등록 가능한 플러그인 클래스
///
/// finalize 시점에 factory가 정확히 한 번 호출된다.
pub struct PluginClass {
    name: String,
    category: Category,
    pub(crate) factory: Factory,
}

impl PluginClass {
    pub fn command<C, F>(name: impl Into<String>, factory: F) -> Self
    where
        C: Command,
        F: Fn() -> C + Send + Sync + 'static,
    {
        Self::command_like(Category::Command, name, factory)
    }

    /// 객체에 딸린 명령 (`Command` 계약)
    pub fn method<C, F>(name: impl Into<String>, factory: F) -> Self
    where
        C: Command,
        F: Fn() -> C + Send + Sync + 'static,
    {
        Self::command_like(Category::Method, name, factory)
    }

    pub fn application<C, F>(name: impl Into<String>, factory: F) -> Self
    where
        C: Command,
        F: Fn() -> C + Send + Sync + 'static,
    {
        Self::command_like(Category::Application, name, factory)
    }

    pub fn object<O, F>(name: impl Into<String>, factory: F) -> Self
    where
        O: Object,
        F: Fn() -> O + Send + Sync + 'static,
    {
        Self::object_like(Category::Object, name, factory)
    }

    /// 객체 속성 선언 (`Object` 계약)
    pub fn property<O, F>(name: impl Into<String>, factory: F) -> Self
    where
        O: Object,
        F: Fn() -> O + Send + Sync + 'static,
    {
        Self::object_like(Category::Property, name, factory)
    }

    pub fn backend<B, F>(name: impl Into<String>, factory: F) -> Self
    where
        B: Backend,
        F: Fn() -> B + Send + Sync + 'static,
    {
        Self::backend_like(Category::Backend, name, factory)
    }

    pub fn context<B, F>(name: impl Into<String>, factory: F) -> Self
    where
        B: Backend,
        F: Fn() -> B + Send + Sync + 'static,
    {
        Self::backend_like(Category::Context, name, factory)
    }

    fn command_like<C, F>(category: Category, name: impl Into<String>, factory: F) -> Self
    where
        C: Command,
        F: Fn() -> C + Send + Sync + 'static,
    {
        debug_assert_eq!(category.contract(), Contract::Command);
        Self {
            name: name.into(),
            category,
            factory: Factory::Command(Box::new(move || Box::new(factory()) as Box<dyn Command>)),
        }
    }

    fn object_like<O, F>(category: Category, name: impl Into<String>, factory: F) -> Self
    where
        O: Object,
        F: Fn() -> O + Send + Sync + 'static,
    {
        debug_assert_eq!(category.contract(), Contract::Object);
        Self {
            name: name.into(),
            category,
            factory: Factory::Object(Box::new(move || Box::new(factory()) as Box<dyn Object>)),
        }
    }

    fn backend_like<B, F>(category: Category, name: impl Into<String>, factory: F) -> Self
    where
        B: Backend,
        F: Fn() -> B + Send + Sync + 'static,
    {
        debug_assert_eq!(category.contract(), Contract::Backend);
        Self {
            name: name.into(),
            category,
            factory: Factory::Backend(Box::new(move || Box::new(factory()) as Box<dyn Backend>)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> Category {
        self.category
    }
}

impl fmt::Debug for PluginClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PluginClass({}.{})", self.category, self.name)
    }
}

// ============================================================================
// LoadContext - on_load에 제공되는 컨텍스트
// ============================================================================

/// finalize 중 플러그인 하나에 제공되는 컨텍스트
pub struct LoadContext<'a> {
    env: &'a mut Env,
    api: ApiHandle,
    name: &'a str,
    category: Category,
}

impl<'a> LoadContext<'a> {
    pub(crate) fn new(env: &'a mut Env, api: ApiHandle, name: &'a str, category: Category) -> Self {
        Self {
            env,
            api,
            name,
            category,
        }
    }

    /// 현재 환경 (아직 freeze 전)
    pub fn env(&self) -> &Env {
        self.env
    }

    /// 환경 기본값 등록 (first-one-wins)
    ///
    /// 이미 설정된 키(외부 override 포함)는 바뀌지 않는다.
    pub fn set_default(&mut self, key: &str, value: impl Into<EnvValue>) -> Result<bool> {
        self.env.set(key, value)
    }

    /// Api 역참조 (finalize 완료 후에만 upgrade 가능)
    pub fn api(&self) -> &ApiHandle {
        &self.api
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub fn category(&self) -> Category {
        self.category
    }
}
