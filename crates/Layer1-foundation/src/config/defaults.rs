//! 기본 환경 설정값

/// 설정 디렉토리 이름 (홈 디렉토리 기준)
pub const DOT_DIR_NAME: &str = ".plexus";

/// 기본 설정 파일명 (`dot_dir` 기준)
pub const DEFAULT_CONFIG_FILE: &str = "default.toml";

/// 설정 파일에서 읽어들이는 섹션
pub const CONFIG_SECTION: &str = "global";

/// 운영 모드
pub const MODE_PRODUCTION: &str = "production";
pub const MODE_UNIT_TEST: &str = "unit_test";

/// 실행 컨텍스트 플래그 (true면 execute, false면 forward)
pub const IN_SERVER: &str = "in_server";

/// `finalize_core` 단계에서 적용되는 기본값 (first-one-wins)
///
/// 값은 텍스트로 주어지고 [`crate::EnvValue::parse`]로 변환된다.
pub const DEFAULT_CONFIG: &[(&str, &str)] = &[
    ("in_server", "False"),
    ("context", "default"),
    ("verbose", "False"),
    ("debug", "False"),
    ("log_level", "info"),
    ("server_uri", "http://localhost:8888/rpc"),
    ("prompt_all", "False"),
];
