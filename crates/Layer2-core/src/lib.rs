//! plexus-core: Plugin registry and command pipeline
//!
//! Layer2 - 플러그인 생명주기와 명령 호출 파이프라인
//!
//! # 주요 모듈
//!
//! - `param`: 파라미터 선언, merge → normalize → convert → default → validate
//! - `plugin`: 카테고리 (Command / Object / Method / Property / Application / Backend / Context) 와 등록 단위
//! - `registry`: `Api` (register → finalize), `ApiRef`, `Invocation`
//! - `proxy`: 플러그인의 제한된 공개 표면
//! - `transport`: forward 경로 collaborator
//! - `textui`: CLI 출력 collaborator
//! - `builtin`: 내장 명령 (`env`, `plugins`)
//!
//! # 사용 예시
//!
//! ```ignore
//! use plexus_core::{Api, Call, PluginClass};
//!
//! let mut api = Api::new();
//! api.bootstrap([("in_server", true)])?;
//! api.register(PluginClass::command("nudge", || Nudge))?;
//! let api = api.finalize()?;
//!
//! let result = api
//!     .command("nudge")?
//!     .call(Call::new().arg("Jason").option("stuff", "unit tests"))
//!     .await?;
//! ```

pub mod builtin;
pub mod param;
pub mod plugin;
pub mod proxy;
pub mod registry;
pub mod textui;
pub mod transport;

// Re-exports: Param
pub use param::{Call, DefaultFrom, Param, ParamSet, ParamType, Params};

// Re-exports: Plugin
pub use plugin::{Backend, Category, Command, Contract, LoadContext, Object, PluginClass};

// Re-exports: Registry
pub use proxy::{BackendProxy, CommandProxy, ObjectProxy};
pub use registry::{Api, ApiHandle, ApiRef, Invocation};

// Re-exports: Collaborators
pub use textui::{ConsoleUi, TextUi};
pub use transport::Transport;

// Re-exports: Foundation
pub use plexus_foundation::{Env, EnvValue, Error, Named, Namespace, Result, Stage};
