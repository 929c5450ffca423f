//! # plexus-foundation
//!
//! Foundation layer for plexus:
//! - Error: 에러 분류 (Lifecycle, Pipeline 단계, FrozenState ...)
//! - Config: Env 저장소 (first-one-wins + freeze), 설정 파일 병합
//! - Namespace: 이름 기반 불변 컨테이너
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  plexus-core                                            │
//! │  ├── Registry (register → finalize)                     │
//! │  ├── Proxy (Command / Object / Backend)                 │
//! │  └── Param Pipeline                                     │
//! │                     │                                   │
//! │                     ▼                                   │
//! │  plexus-foundation                                      │
//! │  ├── Env         (OPEN → FROZEN)                        │
//! │  ├── Namespace   (불변, 순서 고정)                        │
//! │  └── Error                                              │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod namespace;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result, Stage};

// ============================================================================
// Config (환경)
// ============================================================================
pub use config::{
    parse_override, Env, EnvStage, EnvValue, DEFAULT_CONFIG, IN_SERVER, MODE_PRODUCTION,
    MODE_UNIT_TEST,
};

// ============================================================================
// Namespace
// ============================================================================
pub use namespace::{Named, Namespace};
