//! ParamSet - 명령 하나의 파라미터 전체와 처리 파이프라인

use super::default::DependencyGraph;
use super::{Call, Param, Params};
use plexus_foundation::{Error, Namespace, Result};
use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;

/// 명령의 인자(args)와 옵션(options), 그리고 둘을 합친 params
///
/// params 순서는 args 선언 순서 다음 options 선언 순서다.
pub struct ParamSet {
    command: String,
    args: Namespace<Param>,
    options: Namespace<Param>,
    params: Namespace<Param>,
    /// 기본값 계산 순서 (의존 대상이 먼저)
    default_order: Vec<String>,
}

impl ParamSet {
    /// 선언 검사 후 생성
    ///
    /// - args와 options 사이 이름 충돌은 `DuplicateName`
    /// - multivalue 인자는 마지막 위치에만 올 수 있다
    /// - 필수 인자는 선택 인자 뒤에 올 수 없다
    /// - 기본값 의존이 순환하거나 모르는 이름을 가리키면 `DefaultResolution`
    pub fn new(command: impl Into<String>, args: Vec<Param>, options: Vec<Param>) -> Result<Self> {
        let command = command.into();

        let mut seen_optional = false;
        for (i, arg) in args.iter().enumerate() {
            if arg.is_multivalue() && i + 1 != args.len() {
                return Err(Error::Config(format!(
                    "{}: only the last argument can be multivalue, not '{}'",
                    command,
                    arg.name()
                )));
            }
            if arg.is_required() && seen_optional {
                return Err(Error::Config(format!(
                    "{}: required argument '{}' cannot follow an optional one",
                    command,
                    arg.name()
                )));
            }
            seen_optional |= !arg.is_required();
        }

        let params = Namespace::new(
            format!("{}.params", command),
            args.iter().chain(options.iter()).cloned(),
            false,
        )?;
        let args = Namespace::new(format!("{}.args", command), args, false)?;
        let options = Namespace::new(format!("{}.options", command), options, false)?;

        let graph = DependencyGraph::build(params.iter().map(|p| {
            let deps: &[String] = p.default_rule().map(|r| r.keys()).unwrap_or(&[]);
            (p.name(), deps)
        }))?;
        let default_order = graph.order()?;

        Ok(Self {
            command,
            args,
            options,
            params,
            default_order,
        })
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn args(&self) -> &Namespace<Param> {
        &self.args
    }

    pub fn options(&self) -> &Namespace<Param> {
        &self.options
    }

    pub fn params(&self) -> &Namespace<Param> {
        &self.params
    }

    pub fn default_order(&self) -> &[String] {
        &self.default_order
    }

    // ========================================================================
    // Stages
    // ========================================================================

    /// 위치 인자와 이름 인자를 하나의 Params로 합침
    pub fn merge(&self, call: Call) -> Result<Params> {
        let Call { args, options } = call;
        let mut merged = Params::new();

        let max = self.args.len();
        let swallow = self.args.iter().last().is_some_and(Param::is_multivalue);
        if args.len() > max && !swallow {
            return Err(Error::TooManyArguments {
                command: self.command.clone(),
                max,
                given: args.len(),
            });
        }

        let mut values = args.into_iter();
        for (i, arg) in self.args.iter().enumerate() {
            if swallow && i + 1 == max {
                let rest: Vec<Value> = values.by_ref().collect();
                if !rest.is_empty() {
                    merged.insert(arg.name(), Value::Array(rest));
                }
                break;
            }
            match values.next() {
                Some(value) => {
                    merged.insert(arg.name(), value);
                }
                None => break,
            }
        }

        let mut named = HashSet::new();
        for (name, value) in options {
            if !self.params.contains(&name) {
                return Err(Error::UnknownParameter {
                    command: self.command.clone(),
                    param: name,
                });
            }
            if merged.contains(&name) || !named.insert(name.clone()) {
                return Err(Error::Collision { param: name });
            }
            merged.insert(name, value);
        }

        Ok(merged)
    }

    /// 값별 정규화
    pub fn normalize(&self, values: Params) -> Result<Params> {
        values
            .into_iter()
            .map(|(name, value)| {
                let param = self.lookup(&name)?;
                Ok((name, param.normalize_value(value)?))
            })
            .collect()
    }

    /// 타입 변환 (빈 값은 제거되어 "설정 안 됨"이 된다)
    pub fn convert(&self, values: Params) -> Result<Params> {
        let mut converted = Params::new();
        for (name, value) in values {
            let param = self.lookup(&name)?;
            if let Some(value) = param.convert_value(value)? {
                converted.insert(name, value);
            }
        }
        Ok(converted)
    }

    /// 값이 없는 파라미터의 기본값 계산
    ///
    /// 새로 채워진 값만 반환한다. 앞서 계산된 기본값은 뒤의 파생 규칙에서 볼 수 있다.
    pub fn get_default(&self, values: &Params) -> Result<Params> {
        let mut resolved = values.clone();
        let mut defaults = Params::new();

        for name in &self.default_order {
            if resolved.contains(name) {
                continue;
            }
            let param = self.lookup(name)?;
            if let Some(value) = param.derive_default(&resolved)? {
                resolved.insert(name.as_str(), value.clone());
                defaults.insert(name.as_str(), value);
            }
        }

        Ok(defaults)
    }

    /// 선언 순서대로 제약 검사
    pub fn validate(&self, values: &Params) -> Result<()> {
        for param in &self.params {
            param.validate_value(values.get(param.name()))?;
        }
        Ok(())
    }

    /// merge → normalize → convert → default → validate
    pub fn process(&self, call: Call) -> Result<Params> {
        let merged = self.merge(call)?;
        let normalized = self.normalize(merged)?;
        let mut values = self.convert(normalized)?;
        let defaults = self.get_default(&values)?;
        values.extend_missing(defaults);
        self.validate(&values)?;

        debug!("{}: {} parameter value(s) ready", self.command, values.len());
        Ok(values)
    }

    fn lookup(&self, name: &str) -> Result<&Param> {
        self.params.find(name).ok_or_else(|| Error::UnknownParameter {
            command: self.command.clone(),
            param: name.to_string(),
        })
    }
}

impl std::fmt::Debug for ParamSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParamSet")
            .field("command", &self.command)
            .field("args", &self.args.names().collect::<Vec<_>>())
            .field("options", &self.options.names().collect::<Vec<_>>())
            .finish()
    }
}
