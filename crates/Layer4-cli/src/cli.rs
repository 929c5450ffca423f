//! Command invocation from the command line

use anyhow::{anyhow, Context};
use plexus_core::{ApiRef, Call, ConsoleUi};
use serde_json::Value;
use tracing::debug;

/// `key=value` 형태의 명령 옵션 파싱
pub fn parse_option(pair: &str) -> anyhow::Result<(String, Value)> {
    let (key, value) = pair
        .split_once('=')
        .ok_or_else(|| anyhow!("expected key=value, got '{}'", pair))?;
    Ok((key.trim().to_string(), Value::String(value.to_string())))
}

/// 명령행 인자들로 Call 구성
pub fn build_call(args: &[String], options: &[(String, Value)]) -> Call {
    let mut call = Call::from_args(args.iter().cloned());
    for (key, value) in options {
        call = call.option(key.clone(), value.clone());
    }
    call
}

/// 명령 실행 후 결과를 콘솔에 출력
pub async fn run_command(api: &ApiRef, name: &str, call: Call) -> anyhow::Result<()> {
    let command = api.command(name)?;
    debug!("Running {:?}", command);

    let (params, result) = command
        .call_with_params(call)
        .await
        .with_context(|| format!("{} failed", name))?;

    let mut ui = ConsoleUi::stdout();
    command.output_for_cli(&mut ui, &result, &params)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_option() {
        let (k, v) = parse_option("stuff=unit tests").unwrap();
        assert_eq!(k, "stuff");
        assert_eq!(v, Value::String("unit tests".into()));
        assert!(parse_option("stuff").is_err());
    }

    #[test]
    fn test_build_call() {
        let call = build_call(
            &["Jason".to_string()],
            &[("stuff".to_string(), Value::String("docs".into()))],
        );
        assert_eq!(call.args(), [Value::String("Jason".into())]);
        assert_eq!(call.options().len(), 1);
    }
}
