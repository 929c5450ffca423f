//! Error types for plexus
//!
//! 모든 에러를 중앙에서 관리
//!
//! 파이프라인 단계 에러는 항상 파라미터 이름을 포함하고, `Error::stage()`로
//! 실패한 단계를 알려준다.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// 파라미터 파이프라인 단계
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Merge,
    Normalize,
    Convert,
    Default,
    Validate,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Merge => "merge",
            Self::Normalize => "normalize",
            Self::Convert => "convert",
            Self::Default => "default",
            Self::Validate => "validate",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// plexus 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Registry 생명주기
    // ========================================================================
    #[error("Lifecycle error: {0}")]
    Lifecycle(String),

    #[error("Duplicate name: {category}.{name} is already registered")]
    DuplicateName { category: String, name: String },

    #[error("{namespace} has no attribute '{name}'")]
    AttributeNotFound { namespace: String, name: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Plugin {category}.{plugin} failed to initialize: {source}")]
    PluginInit {
        category: String,
        plugin: String,
        #[source]
        source: Box<Error>,
    },

    // ========================================================================
    // 파라미터 파이프라인
    // ========================================================================
    #[error("Collision: '{param}' was given both positionally and by name")]
    Collision { param: String },

    #[error("Unknown parameter '{param}' for {command}")]
    UnknownParameter { command: String, param: String },

    #[error("{command} takes at most {max} positional argument(s), got {given}")]
    TooManyArguments {
        command: String,
        max: usize,
        given: usize,
    },

    #[error("Normalization of '{param}' failed: {message}")]
    Normalization { param: String, message: String },

    #[error("Cannot convert '{param}' from {value}: {message}")]
    Conversion {
        param: String,
        value: String,
        message: String,
    },

    #[error("Default for '{param}' could not be resolved: {message}")]
    DefaultResolution { param: String, message: String },

    #[error("'{param}' is required")]
    RequiredParameter { param: String },

    #[error("Invalid '{param}': {message}")]
    Validation { param: String, message: String },

    // ========================================================================
    // 환경 (Env)
    // ========================================================================
    #[error("Cannot set '{key}': environment is frozen")]
    FrozenState { key: String },

    #[error("Configuration error: {0}")]
    Config(String),

    // ========================================================================
    // 실행
    // ========================================================================
    #[error("{0}.execute() is not implemented")]
    NotImplemented(String),

    #[error("Transport error: {0}")]
    Transport(String),

    // ========================================================================
    // 외부 에러 변환
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// 파이프라인 단계 에러라면 해당 단계 반환
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::Collision { .. }
            | Error::UnknownParameter { .. }
            | Error::TooManyArguments { .. } => Some(Stage::Merge),
            Error::Normalization { .. } => Some(Stage::Normalize),
            Error::Conversion { .. } => Some(Stage::Convert),
            Error::DefaultResolution { .. } => Some(Stage::Default),
            Error::RequiredParameter { .. } | Error::Validation { .. } => Some(Stage::Validate),
            _ => None,
        }
    }

    /// 에러가 가리키는 파라미터 이름
    pub fn param(&self) -> Option<&str> {
        match self {
            Error::Collision { param }
            | Error::UnknownParameter { param, .. }
            | Error::Normalization { param, .. }
            | Error::Conversion { param, .. }
            | Error::DefaultResolution { param, .. }
            | Error::RequiredParameter { param }
            | Error::Validation { param, .. } => Some(param),
            _ => None,
        }
    }

    pub fn lifecycle(message: impl Into<String>) -> Self {
        Error::Lifecycle(message.into())
    }

    pub fn duplicate(category: impl Into<String>, name: impl Into<String>) -> Self {
        Error::DuplicateName {
            category: category.into(),
            name: name.into(),
        }
    }

    pub fn attribute_not_found(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Error::AttributeNotFound {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    pub fn plugin_init(category: impl Into<String>, plugin: impl Into<String>, source: Error) -> Self {
        Error::PluginInit {
            category: category.into(),
            plugin: plugin.into(),
            source: Box::new(source),
        }
    }

    pub fn normalization(param: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Normalization {
            param: param.into(),
            message: message.into(),
        }
    }

    pub fn conversion(
        param: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Error::Conversion {
            param: param.into(),
            value: value.into(),
            message: message.into(),
        }
    }

    pub fn default_resolution(param: impl Into<String>, message: impl Into<String>) -> Self {
        Error::DefaultResolution {
            param: param.into(),
            message: message.into(),
        }
    }

    pub fn required(param: impl Into<String>) -> Self {
        Error::RequiredParameter {
            param: param.into(),
        }
    }

    pub fn validation(param: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Validation {
            param: param.into(),
            message: message.into(),
        }
    }

    pub fn frozen(key: impl Into<String>) -> Self {
        Error::FrozenState { key: key.into() }
    }

    /// 사용자에게 그대로 보여줄 수 있는 에러인지 확인
    pub fn is_user_facing(&self) -> bool {
        self.stage().is_some()
            || matches!(
                self,
                Error::AttributeNotFound { .. } | Error::NotFound(_) | Error::Config(_)
            )
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Internal(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Internal(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_tagging() {
        let err = Error::conversion("points", "\"abc\"", "not an integer");
        assert_eq!(err.stage(), Some(Stage::Convert));
        assert_eq!(err.param(), Some("points"));

        let err = Error::required("login");
        assert_eq!(err.stage(), Some(Stage::Validate));
        assert!(err.is_user_facing());

        assert_eq!(Error::lifecycle("finalized").stage(), None);
    }

    #[test]
    fn test_plugin_init_keeps_source() {
        let err = Error::plugin_init("Command", "broken", Error::validation("x", "bad"));
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("Invalid 'x': bad"));
        assert!(err.to_string().contains("Command.broken"));
    }
}
