//! Invocation - 한 번의 명령 호출에 대한 실행 컨텍스트

use super::ApiRef;
use plexus_foundation::Env;

/// `Command::run/execute/forward`에 전달되는 호출 컨텍스트
///
/// `in_server`는 생성 시점(검증 직후)에 한 번만 읽는다.
/// 중첩 호출은 각자 새 Invocation을 만든다.
#[derive(Debug, Clone)]
pub struct Invocation {
    api: ApiRef,
    command: String,
    in_server: bool,
}

impl Invocation {
    pub(crate) fn new(api: ApiRef, command: &str) -> Self {
        let in_server = api.env().in_server();
        Self {
            api,
            command: command.to_string(),
            in_server,
        }
    }

    /// 다른 플러그인 접근용
    pub fn api(&self) -> &ApiRef {
        &self.api
    }

    pub fn env(&self) -> &Env {
        self.api.env()
    }

    /// 호출된 명령 이름
    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn in_server(&self) -> bool {
        self.in_server
    }
}
