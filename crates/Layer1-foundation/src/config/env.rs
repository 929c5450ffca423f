//! Env - 환경 변수 저장소
//!
//! first-one-wins 규칙을 따르는 정렬된 key/value 저장소.
//!
//! ```text
//! Env::new()          프로세스 식별 정보 (bin, home, dot_dir, mode ...)
//!   │
//!   ├─ merge()        외부 override (-e key=value, 설정 파일)
//!   ├─ finalize_core  DEFAULT_CONFIG
//!   ├─ set()          플러그인 기본값
//!   ▼
//! freeze()            이후 모든 쓰기는 FrozenState
//! ```

use super::defaults::{
    CONFIG_SECTION, DEFAULT_CONFIG, DOT_DIR_NAME, IN_SERVER, MODE_PRODUCTION,
};
use super::value::EnvValue;
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

/// 저장소 단계
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvStage {
    /// 쓰기 가능 (first-one-wins)
    Open,
    /// 읽기 전용
    Frozen,
}

/// 환경 변수 저장소
#[derive(Debug, Clone)]
pub struct Env {
    values: BTreeMap<String, EnvValue>,
    stage: EnvStage,
    core_finalized: bool,
}

impl Env {
    /// 프로세스 식별 정보가 채워진 저장소 생성
    pub fn new() -> Self {
        let mut env = Self::empty();
        env.bootstrap_identity();
        env
    }

    /// 운영 모드를 지정해서 생성 (식별 정보의 `mode`보다 우선)
    pub fn with_mode(mode: &str) -> Self {
        let mut env = Self::empty();
        env.values
            .insert("mode".to_string(), EnvValue::Str(mode.to_string()));
        env.bootstrap_identity();
        env
    }

    /// 완전히 빈 저장소 생성
    pub fn empty() -> Self {
        Self {
            values: BTreeMap::new(),
            stage: EnvStage::Open,
            core_finalized: false,
        }
    }

    fn bootstrap_identity(&mut self) {
        let mut facts: Vec<(&str, EnvValue)> = Vec::new();

        if let Some(script) = std::env::args().next() {
            facts.push(("script", EnvValue::Str(script)));
        }
        if let Some(bin) = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
        {
            facts.push(("bin", bin.into()));
        }
        if let Some(home) = dirs::home_dir() {
            facts.push(("dot_dir", home.join(DOT_DIR_NAME).into()));
            facts.push(("home", home.into()));
        }
        facts.push(("mode", EnvValue::Str(MODE_PRODUCTION.to_string())));
        facts.push(("plexus", EnvValue::Str(env!("CARGO_PKG_VERSION").to_string())));

        for (key, value) in facts {
            self.values.entry(key.to_string()).or_insert(value);
        }
    }

    // ========================================================================
    // 쓰기
    // ========================================================================

    /// 값 설정 (first-one-wins)
    ///
    /// 새로 저장되면 `true`, 이미 설정된 키라 무시되면 `false`.
    /// freeze 이후에는 `FrozenState` 에러.
    pub fn set(&mut self, key: &str, value: impl Into<EnvValue>) -> Result<bool> {
        if self.stage == EnvStage::Frozen {
            return Err(Error::frozen(key));
        }
        check_key(key)?;

        if self.values.contains_key(key) {
            debug!("env: '{}' already set, keeping first value", key);
            return Ok(false);
        }

        self.values.insert(key.to_string(), value.into());
        Ok(true)
    }

    /// 여러 값을 순서대로 설정, 새로 저장된 개수 반환
    pub fn merge<I, K, V>(&mut self, items: I) -> Result<usize>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<EnvValue>,
    {
        let mut stored = 0;
        for (key, value) in items {
            if self.set(key.as_ref(), value)? {
                stored += 1;
            }
        }
        Ok(stored)
    }

    /// TOML 설정 파일의 `[global]` 섹션 병합
    ///
    /// 파일이 없으면 아무것도 하지 않는다.
    pub fn merge_config_file(&mut self, path: &Path) -> Result<usize> {
        if !path.is_file() {
            debug!("env: config file {} not found, skipping", path.display());
            return Ok(0);
        }

        let content = std::fs::read_to_string(path)?;
        let doc: toml::Table = toml::from_str(&content)?;

        let Some(section) = doc.get(CONFIG_SECTION) else {
            return Ok(0);
        };
        let table = section.as_table().ok_or_else(|| {
            Error::Config(format!("[{}] in {} must be a table", CONFIG_SECTION, path.display()))
        })?;

        let mut items = Vec::with_capacity(table.len());
        for (key, value) in table {
            let value = match value {
                toml::Value::Boolean(b) => EnvValue::Bool(*b),
                toml::Value::Integer(n) => EnvValue::Int(*n),
                toml::Value::String(s) => EnvValue::parse(s),
                other => {
                    return Err(Error::Config(format!(
                        "'{}' in {}: unsupported value type {}",
                        key,
                        path.display(),
                        other.type_str()
                    )))
                }
            };
            items.push((key.clone(), value));
        }

        let stored = self.merge(items)?;
        info!("env: merged {} value(s) from {}", stored, path.display());
        Ok(stored)
    }

    /// `DEFAULT_CONFIG` 적용 (여러 번 호출해도 결과 동일)
    ///
    /// `in_server`가 플래그로 해석되지 않으면 `Config` 에러.
    pub fn finalize_core(&mut self) -> Result<()> {
        if self.core_finalized {
            return Ok(());
        }
        self.merge(DEFAULT_CONFIG.iter().map(|(k, v)| (*k, EnvValue::parse(v))))?;
        if let Some(value) = self.get(IN_SERVER) {
            if value.as_flag().is_none() {
                return Err(Error::Config(format!(
                    "'{}' must be True or False, got '{}'",
                    IN_SERVER, value
                )));
            }
        }
        self.core_finalized = true;
        Ok(())
    }

    /// 읽기 전용으로 전환
    pub fn freeze(&mut self) {
        if self.stage != EnvStage::Frozen {
            info!("env: frozen with {} variable(s)", self.values.len());
        }
        self.stage = EnvStage::Frozen;
    }

    // ========================================================================
    // 읽기
    // ========================================================================

    pub fn stage(&self) -> EnvStage {
        self.stage
    }

    pub fn is_frozen(&self) -> bool {
        self.stage == EnvStage::Frozen
    }

    pub fn is_core_finalized(&self) -> bool {
        self.core_finalized
    }

    pub fn get(&self, key: &str) -> Option<&EnvValue> {
        self.values.get(key)
    }

    /// 값 조회 (없으면 `NotFound`)
    pub fn require(&self, key: &str) -> Result<&EnvValue> {
        self.values
            .get(key)
            .ok_or_else(|| Error::NotFound(format!("env.{}", key)))
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(EnvValue::as_bool)
    }

    /// 플래그로 해석한 값 ([`EnvValue::as_flag`])
    pub fn get_flag(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(EnvValue::as_flag)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(EnvValue::as_str)
    }

    /// 실행 컨텍스트 플래그 (설정되지 않았으면 false)
    pub fn in_server(&self) -> bool {
        self.get_flag(IN_SERVER).unwrap_or(false)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 키 순서(사전순)로 순회
    pub fn iter(&self) -> impl Iterator<Item = (&str, &EnvValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}

/// `key=value` 문자열 파싱 (`-e` 옵션용)
pub fn parse_override(pair: &str) -> Result<(String, EnvValue)> {
    let (key, value) = pair
        .split_once('=')
        .ok_or_else(|| Error::Config(format!("expected key=value, got '{}'", pair)))?;
    let key = key.trim();
    check_key(key)?;
    Ok((key.to_string(), EnvValue::parse(value)))
}

fn check_key(key: &str) -> Result<()> {
    let mut chars = key.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(Error::Config(format!("invalid environment key '{}'", key)))
    }
}
