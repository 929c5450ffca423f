//! Builtin Commands - 내장 명령
//!
//! 두 명령 모두 `run()`을 재정의해서 로컬에서 실행된다.
//! `env --server`만 예외로 클라이언트에서 forward한다.
//!
//! - `env` - 환경 변수 조회
//! - `plugins` - finalize된 플러그인 목록 (카테고리별)

pub mod env;
pub mod plugins;

pub use env::EnvCommand;
pub use plugins::PluginsCommand;

use crate::plugin::PluginClass;
use crate::registry::Api;
use plexus_foundation::Result;

/// 내장 명령 클래스 목록
pub fn all_commands() -> Vec<PluginClass> {
    vec![
        PluginClass::command("env", || EnvCommand),
        PluginClass::command("plugins", || PluginsCommand),
    ]
}

/// 내장 명령을 Api에 등록
pub fn register_all(api: &mut Api) -> Result<()> {
    for class in all_commands() {
        api.register(class)?;
    }
    Ok(())
}
