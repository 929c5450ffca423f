//! 디스패치 통합 테스트 - execute / forward 선택, 중첩 호출, Transport
//!
//! `cargo test -p plexus-core --test dispatch_test`

use async_trait::async_trait;
use plexus_core::{
    builtin, Api, ApiRef, Call, Command, Error, Invocation, Param, Params, PluginClass, Result,
    Transport,
};
use plexus_foundation::{parse_override, MODE_UNIT_TEST};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

fn py_bool(b: bool) -> &'static str {
    if b {
        "True"
    } else {
        "False"
    }
}

#[derive(Default)]
struct Counters {
    execute: AtomicUsize,
    forward: AtomicUsize,
}

struct MyCommand {
    counters: Arc<Counters>,
}

#[async_trait]
impl Command for MyCommand {
    fn doc(&self) -> &str {
        "My example command plugin."
    }

    async fn execute(&self, ctx: &Invocation, _params: &Params) -> Result<Value> {
        self.counters.execute.fetch_add(1, Ordering::SeqCst);
        Ok(json!(format!("in_server={}; execute() was called.", py_bool(ctx.in_server()))))
    }

    async fn forward(&self, ctx: &Invocation, _params: &Params) -> Result<Value> {
        self.counters.forward.fetch_add(1, Ordering::SeqCst);
        Ok(json!(format!("in_server={}; forward() was called.", py_bool(ctx.in_server()))))
    }
}

fn api_with_my_command(in_server: bool, counters: Arc<Counters>) -> ApiRef {
    let mut api = Api::with_mode(MODE_UNIT_TEST);
    api.bootstrap([("in_server", in_server)]).unwrap();
    api.register(PluginClass::command("my_command", move || MyCommand {
        counters: Arc::clone(&counters),
    }))
    .unwrap();
    api.finalize().unwrap()
}

#[tokio::test]
async fn test_in_server_dispatches_to_execute() {
    let counters = Arc::new(Counters::default());
    let api = api_with_my_command(true, Arc::clone(&counters));

    let result = api.call("my_command", Call::new()).await.unwrap();
    assert_eq!(result, json!("in_server=True; execute() was called."));
    assert_eq!(counters.execute.load(Ordering::SeqCst), 1);
    assert_eq!(counters.forward.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_client_dispatches_to_forward() {
    let counters = Arc::new(Counters::default());
    let api = api_with_my_command(false, Arc::clone(&counters));

    let result = api.call("my_command", Call::new()).await.unwrap();
    assert_eq!(result, json!("in_server=False; forward() was called."));
    assert_eq!(counters.execute.load(Ordering::SeqCst), 0);
    assert_eq!(counters.forward.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_in_server_defaults_to_false() {
    let counters = Arc::new(Counters::default());
    let mut api = Api::with_mode(MODE_UNIT_TEST);
    let moved = Arc::clone(&counters);
    api.register(PluginClass::command("my_command", move || MyCommand {
        counters: Arc::clone(&moved),
    }))
    .unwrap();
    let api = api.finalize().unwrap();

    let result = api.call("my_command", Call::new()).await.unwrap();
    assert_eq!(result, json!("in_server=False; forward() was called."));
}

#[tokio::test]
async fn test_in_server_from_override_text() {
    for (raw, expected) in [
        ("True", "in_server=True; execute() was called."),
        ("1", "in_server=True; execute() was called."),
        ("yes", "in_server=True; execute() was called."),
        ("0", "in_server=False; forward() was called."),
    ] {
        let counters = Arc::new(Counters::default());
        let moved = Arc::clone(&counters);
        let mut api = Api::with_mode(MODE_UNIT_TEST);
        api.bootstrap([parse_override(&format!("in_server={}", raw)).unwrap()])
            .unwrap();
        api.register(PluginClass::command("my_command", move || MyCommand {
            counters: Arc::clone(&moved),
        }))
        .unwrap();
        let api = api.finalize().unwrap();

        let result = api.call("my_command", Call::new()).await.unwrap();
        assert_eq!(result, json!(expected), "in_server={}", raw);
    }
}

#[test]
fn test_in_server_rejects_unknown_text() {
    let mut api = Api::with_mode(MODE_UNIT_TEST);
    api.bootstrap([parse_override("in_server=maybe").unwrap()])
        .unwrap();

    let err = api.finalize().unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(!api.is_finalized());
}

// ============================================================================
// 중첩 호출
// ============================================================================

struct MetaCommand;

#[async_trait]
impl Command for MetaCommand {
    async fn execute(&self, ctx: &Invocation, _params: &Params) -> Result<Value> {
        let first = ctx.api().call("command_1", Call::new()).await?;
        let second = ctx.api().call("command_2", Call::new()).await?;
        Ok(json!(format!(
            "{}; {}.",
            first.as_str().unwrap_or_default(),
            second.as_str().unwrap_or_default()
        )))
    }
}

struct Echo(&'static str);

#[async_trait]
impl Command for Echo {
    async fn execute(&self, _ctx: &Invocation, _params: &Params) -> Result<Value> {
        Ok(json!(self.0))
    }
}

struct NeedsName;

#[async_trait]
impl Command for NeedsName {
    fn takes_args(&self) -> Vec<Param> {
        vec!["name".into()]
    }

    async fn execute(&self, _ctx: &Invocation, params: &Params) -> Result<Value> {
        Ok(json!(params.get_str("name")))
    }
}

struct CallsWithoutName;

#[async_trait]
impl Command for CallsWithoutName {
    async fn execute(&self, ctx: &Invocation, _params: &Params) -> Result<Value> {
        ctx.api().call("needs_name", Call::new()).await
    }
}

fn server_api() -> Api {
    let mut api = Api::with_mode(MODE_UNIT_TEST);
    api.bootstrap([("in_server", true)]).unwrap();
    api
}

#[tokio::test]
async fn test_meta_command_calls_other_commands() {
    let mut api = server_api();
    api.register(PluginClass::command("meta_command", || MetaCommand)).unwrap();
    api.register(PluginClass::command("command_1", || Echo("command_1.execute() called")))
        .unwrap();
    api.register(PluginClass::command("command_2", || Echo("command_2.execute() called")))
        .unwrap();
    let api = api.finalize().unwrap();

    let result = api.call("meta_command", Call::new()).await.unwrap();
    assert_eq!(
        result,
        json!("command_1.execute() called; command_2.execute() called.")
    );
}

#[tokio::test]
async fn test_nested_errors_propagate_unchanged() {
    let mut api = server_api();
    api.register(PluginClass::command("needs_name", || NeedsName)).unwrap();
    api.register(PluginClass::command("outer", || CallsWithoutName)).unwrap();
    let api = api.finalize().unwrap();

    let err = api.call("outer", Call::new()).await.unwrap_err();
    assert!(matches!(err, Error::RequiredParameter { ref param } if param == "name"));
}

#[tokio::test]
async fn test_unknown_command() {
    let api = server_api().finalize().unwrap();
    let err = api.call("nope", Call::new()).await.unwrap_err();
    assert!(matches!(err, Error::AttributeNotFound { ref namespace, ref name } if namespace == "Command" && name == "nope"));
}

#[tokio::test]
async fn test_execute_not_implemented() {
    struct Bare;
    impl Command for Bare {}

    let mut api = server_api();
    api.register(PluginClass::command("bare", || Bare)).unwrap();
    let api = api.finalize().unwrap();

    let err = api.call("bare", Call::new()).await.unwrap_err();
    assert!(matches!(err, Error::NotImplemented(ref name) if name == "bare"));
}

// ============================================================================
// Transport
// ============================================================================

#[derive(Default)]
struct RecordingTransport {
    calls: Mutex<Vec<(String, Params)>>,
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn forward(&self, command: &str, params: &Params) -> Result<Value> {
        self.calls.lock().await.push((command.to_string(), params.clone()));
        Ok(json!({ "forwarded": command }))
    }
}

#[tokio::test]
async fn test_default_forward_uses_transport() {
    let transport = Arc::new(RecordingTransport::default());
    let mut api = Api::with_mode(MODE_UNIT_TEST);
    api.set_transport(transport.clone()).unwrap();
    api.register(PluginClass::command("needs_name", || NeedsName)).unwrap();
    let api = api.finalize().unwrap();

    let result = api
        .call("needs_name", Call::new().arg("jderose"))
        .await
        .unwrap();
    assert_eq!(result, json!({ "forwarded": "needs_name" }));

    let calls = transport.calls.lock().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1.get_str("name"), Some("jderose"));
}

/// 파라미터를 JSON 문자열로 직렬화해서 주고받는 Transport
struct WireTransport {
    server_env: Value,
    received: Mutex<Vec<(String, Params)>>,
}

#[async_trait]
impl Transport for WireTransport {
    async fn forward(&self, command: &str, params: &Params) -> Result<Value> {
        let wire = serde_json::to_string(params)?;
        let decoded: Params = serde_json::from_str(&wire)?;
        self.received.lock().await.push((command.to_string(), decoded));
        Ok(self.server_env.clone())
    }
}

fn env_client(transport: Arc<WireTransport>, in_server: bool) -> ApiRef {
    let mut api = Api::with_mode(MODE_UNIT_TEST);
    api.bootstrap([("in_server", in_server)]).unwrap();
    api.set_transport(transport).unwrap();
    builtin::register_all(&mut api).unwrap();
    api.finalize().unwrap()
}

#[tokio::test]
async fn test_env_server_option_forwards() {
    let transport = Arc::new(WireTransport {
        server_env: json!({ "in_server": true, "mode": "production" }),
        received: Mutex::new(Vec::new()),
    });
    let api = env_client(Arc::clone(&transport), false);

    let result = api
        .call("env", Call::from_args(["mode"]).option("server", "True"))
        .await
        .unwrap();
    assert_eq!(result, json!({ "in_server": true, "mode": "production" }));

    let received = transport.received.lock().await;
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].0, "env");
    assert_eq!(
        received[0].1,
        Params::new().with("server", true).with("variables", json!(["mode"]))
    );
}

#[tokio::test]
async fn test_env_without_server_option_stays_local() {
    let transport = Arc::new(WireTransport {
        server_env: json!({}),
        received: Mutex::new(Vec::new()),
    });

    let api = env_client(Arc::clone(&transport), false);
    let result = api.call("env", Call::from_args(["mode"])).await.unwrap();
    assert_eq!(result, json!({ "mode": MODE_UNIT_TEST }));

    // 서버에서는 server 옵션이 있어도 로컬 실행
    let api = env_client(Arc::clone(&transport), true);
    let result = api
        .call("env", Call::from_args(["mode"]).option("server", true))
        .await
        .unwrap();
    assert_eq!(result, json!({ "mode": MODE_UNIT_TEST }));

    assert!(transport.received.lock().await.is_empty());
}

#[tokio::test]
async fn test_forward_without_transport() {
    let mut api = Api::with_mode(MODE_UNIT_TEST);
    api.register(PluginClass::command("needs_name", || NeedsName)).unwrap();
    let api = api.finalize().unwrap();

    let err = api
        .call("needs_name", Call::new().arg("jderose"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
}

// ============================================================================
// 동시 호출
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_invocations() {
    let mut api = server_api();
    api.register(PluginClass::command("needs_name", || NeedsName)).unwrap();
    let api = api.finalize().unwrap();

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let api = api.clone();
            tokio::spawn(async move {
                api.call("needs_name", Call::new().arg(format!("user{}", i)))
                    .await
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let result = handle.await.unwrap().unwrap();
        assert_eq!(result, json!(format!("user{}", i)));
    }
}
