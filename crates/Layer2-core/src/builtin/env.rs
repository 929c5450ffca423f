//! `env` - 환경 변수 조회

use crate::param::{Param, ParamType, Params};
use crate::plugin::Command;
use crate::registry::Invocation;
use crate::textui::TextUi;
use async_trait::async_trait;
use plexus_foundation::Result;
use serde_json::{Map, Value};

/// 환경 변수를 `key → value` 객체로 반환
///
/// 위치 인자로 변수 이름을 주면 해당 변수만 반환한다.
/// 클라이언트에서 `server` 옵션을 주면 서버의 환경을 대신 가져온다.
pub struct EnvCommand;

#[async_trait]
impl Command for EnvCommand {
    fn doc(&self) -> &str {
        "Show environment variables"
    }

    fn takes_args(&self) -> Vec<Param> {
        vec![Param::parse("variables*").doc("Variable names to show (default: all)")]
    }

    fn takes_options(&self) -> Vec<Param> {
        vec![Param::new("server")
            .kind(ParamType::Bool)
            .default(false)
            .doc("Show the server's environment")]
    }

    async fn execute(&self, ctx: &Invocation, params: &Params) -> Result<Value> {
        let wanted: Vec<&str> = match params.get("variables") {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        };

        let variables: Map<String, Value> = ctx
            .env()
            .iter()
            .filter(|(key, _)| wanted.is_empty() || wanted.contains(key))
            .map(|(key, value)| (key.to_string(), value.to_json()))
            .collect();

        Ok(Value::Object(variables))
    }

    async fn run(&self, ctx: &Invocation, params: &Params) -> Result<Value> {
        if params.get_bool("server") == Some(true) && !ctx.in_server() {
            return self.forward(ctx, params).await;
        }
        self.execute(ctx, params).await
    }

    fn output_for_cli(&self, ui: &mut dyn TextUi, result: &Value, _params: &Params) -> Result<()> {
        let rows: Vec<(String, Value)> = result
            .as_object()
            .map(|vars| vars.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();

        ui.print_keyval(&rows)?;
        let format = if rows.len() == 1 { "{count} variable" } else { "{count} variables" };
        ui.print_count(rows.len(), format)
    }
}
