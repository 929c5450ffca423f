//! `plugins` - finalize된 플러그인 목록

use crate::param::Params;
use crate::plugin::{Category, Command};
use crate::registry::Invocation;
use crate::textui::TextUi;
use async_trait::async_trait;
use plexus_foundation::Result;
use serde_json::{Map, Value};

/// 카테고리 → 플러그인 이름 목록 (Namespace 순서)
pub struct PluginsCommand;

#[async_trait]
impl Command for PluginsCommand {
    fn doc(&self) -> &str {
        "Show all loaded plugins"
    }

    async fn execute(&self, ctx: &Invocation, _params: &Params) -> Result<Value> {
        let api = ctx.api();
        let mut plugins = Map::new();
        for category in Category::ALL {
            let names = api
                .plugin_names(category)
                .into_iter()
                .map(|name| Value::String(name.to_string()))
                .collect();
            plugins.insert(category.as_str().to_string(), Value::Array(names));
        }
        Ok(Value::Object(plugins))
    }

    async fn run(&self, ctx: &Invocation, params: &Params) -> Result<Value> {
        self.execute(ctx, params).await
    }

    fn output_for_cli(&self, ui: &mut dyn TextUi, result: &Value, _params: &Params) -> Result<()> {
        let mut total = 0;
        for category in Category::ALL {
            let Some(names) = result.get(category.as_str()).and_then(Value::as_array) else {
                continue;
            };
            if names.is_empty() {
                continue;
            }
            ui.print_plain(&format!("{}:", category))?;
            for name in names.iter().filter_map(Value::as_str) {
                ui.print_plain(&format!("  {}", name))?;
            }
            total += names.len();
        }
        let format = if total == 1 { "{count} plugin loaded" } else { "{count} plugins loaded" };
        ui.print_count(total, format)
    }
}
