//! Config - 환경 설정 관리
//!
//! - `env.rs` - Env 저장소 (first-one-wins, freeze)
//! - `value.rs` - EnvValue 스칼라 값
//! - `defaults.rs` - 기본값 및 상수

pub mod defaults;
mod env;
mod value;

pub use defaults::{DEFAULT_CONFIG, IN_SERVER, MODE_PRODUCTION, MODE_UNIT_TEST};
pub use env::{parse_override, Env, EnvStage};
pub use value::EnvValue;
