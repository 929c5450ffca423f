//! Plugin traits - 카테고리별 플러그인 인터페이스

use super::LoadContext;
use crate::param::{Param, Params};
use crate::registry::Invocation;
use crate::textui::TextUi;
use async_trait::async_trait;
use plexus_foundation::{Error, Result};
use serde_json::Value;
use std::any::Any;

// ============================================================================
// Command - 호출 가능한 명령
// ============================================================================

/// 명령 플러그인
///
/// 호출은 항상 파라미터 파이프라인을 거친 뒤 `run()`으로 들어온다.
/// 기본 `run()`은 `in_server` 플래그에 따라 `execute()` 또는 `forward()` 중
/// 정확히 하나만 호출한다.
///
/// ```ignore
/// struct Nudge;
///
/// #[async_trait]
/// impl Command for Nudge {
///     fn takes_args(&self) -> Vec<Param> {
///         vec!["programmer".into()]
///     }
///
///     fn takes_options(&self) -> Vec<Param> {
///         vec![Param::new("stuff").default("documentation")]
///     }
///
///     async fn execute(&self, _ctx: &Invocation, params: &Params) -> Result<Value> {
///         let who = params.get_str("programmer").unwrap_or_default();
///         let what = params.get_str("stuff").unwrap_or_default();
///         Ok(json!(format!("{}, go write more {}!", who, what)))
///     }
/// }
/// ```
#[async_trait]
pub trait Command: Send + Sync + 'static {
    /// 문서 문자열
    fn doc(&self) -> &str {
        ""
    }

    /// 위치 인자 (선언 순서대로)
    fn takes_args(&self) -> Vec<Param> {
        Vec::new()
    }

    /// 이름 인자
    fn takes_options(&self) -> Vec<Param> {
        Vec::new()
    }

    /// finalize 중 한 번 호출 (환경 기본값 등록 등)
    fn on_load(&mut self, _ctx: &mut LoadContext<'_>) -> Result<()> {
        Ok(())
    }

    /// 로컬 실행 (`in_server == true`)
    async fn execute(&self, ctx: &Invocation, _params: &Params) -> Result<Value> {
        Err(Error::NotImplemented(ctx.command().to_string()))
    }

    /// 원격 전달 (`in_server == false`)
    async fn forward(&self, ctx: &Invocation, params: &Params) -> Result<Value> {
        let transport = ctx.api().transport()?;
        transport.forward(ctx.command(), params).await
    }

    /// 디스패치
    ///
    /// 절대 전달되면 안 되는 명령은 이 메서드를 재정의한다.
    async fn run(&self, ctx: &Invocation, params: &Params) -> Result<Value> {
        if ctx.in_server() {
            self.execute(ctx, params).await
        } else {
            self.forward(ctx, params).await
        }
    }

    /// CLI 출력
    fn output_for_cli(&self, ui: &mut dyn TextUi, result: &Value, _params: &Params) -> Result<()> {
        match result {
            Value::String(s) => ui.print_plain(s),
            Value::Null => Ok(()),
            other => ui.print_plain(&serde_json::to_string_pretty(other)?),
        }
    }
}

// ============================================================================
// Object - 데이터 객체 선언
// ============================================================================

/// 객체 플러그인 (이름, 문서, 파라미터만 노출)
pub trait Object: Send + Sync + 'static {
    fn doc(&self) -> &str {
        ""
    }

    fn takes_params(&self) -> Vec<Param> {
        Vec::new()
    }

    fn on_load(&mut self, _ctx: &mut LoadContext<'_>) -> Result<()> {
        Ok(())
    }
}

// ============================================================================
// Backend - 자유 형식 플러그인 (Backend / Context 카테고리)
// ============================================================================

/// 백엔드 플러그인
///
/// 공개 메서드는 자유 형식이다. 호출하는 쪽은
/// `BackendProxy::downcast::<T>()`로 구체 타입에 접근한다.
pub trait Backend: Send + Sync + 'static {
    fn doc(&self) -> &str {
        ""
    }

    fn on_load(&mut self, _ctx: &mut LoadContext<'_>) -> Result<()> {
        Ok(())
    }

    /// 타입 캐스팅을 위한 헬퍼 (다운캐스팅 지원)
    fn as_any(&self) -> &dyn Any;
}
