//! Transport - 원격 전달 collaborator
//!
//! `Command::forward()`의 기본 구현이 사용한다.
//! 타임아웃과 취소 정책은 구현체가 결정한다.

use crate::param::Params;
use async_trait::async_trait;
use plexus_foundation::Result;
use serde_json::Value;

/// 명령 호출을 원격 피어로 보내는 인터페이스
#[async_trait]
pub trait Transport: Send + Sync {
    /// 검증이 끝난 파라미터로 원격 호출
    async fn forward(&self, command: &str, params: &Params) -> Result<Value>;
}
