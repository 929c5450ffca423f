//! # Registry
//!
//! 플러그인 등록과 한 번뿐인 finalize
//!
//! ## 상태
//!
//! ```text
//! OPEN ──────────── finalize() ──────────▶ FINALIZED
//!  │ register()                              │ command()/backend()/...
//!  │ bootstrap()                             │ env (frozen)
//!  │ set_transport()                         │
//!  └ 이미 finalize됨 → Lifecycle             └ register/finalize → Lifecycle
//! ```
//!
//! ## finalize 순서
//!
//! 1. Env 사본에 `finalize_core()` (DEFAULT_CONFIG)
//! 2. 등록 순서대로 인스턴스 생성 → `on_load()` (기본값 등록) → Proxy
//! 3. Env freeze
//! 4. 카테고리별 Namespace (사전순, `Category::ALL`의 7개 모두)
//! 5. 모두 성공했을 때만 FINALIZED로 전환
//!
//! 플러그인 하나라도 실패하면 `PluginInit`을 반환하고 Api는 OPEN 상태 그대로 남는다.

mod invocation;
mod snapshot;

pub use invocation::Invocation;
pub use snapshot::{ApiHandle, ApiRef};

use crate::param::ParamSet;
use crate::plugin::{Category, Factory, LoadContext, PluginClass};
use crate::proxy::{BackendProxy, CommandProxy, ObjectProxy};
use crate::transport::Transport;
use plexus_foundation::config::defaults::DEFAULT_CONFIG_FILE;
use plexus_foundation::{Env, EnvValue, Error, Named, Namespace, Result, MODE_UNIT_TEST};
use snapshot::Finalized;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

/// 플러그인 레지스트리
///
/// ```ignore
/// let mut api = Api::new();
/// api.bootstrap([("in_server", true)])?;
/// api.register(PluginClass::command("my_command", || MyCommand))?;
/// let api = api.finalize()?;
/// let result = api.command("my_command")?.call(Call::new()).await?;
/// ```
pub struct Api {
    env: Env,
    classes: Vec<PluginClass>,
    names: HashSet<(Category, String)>,
    transport: Option<Arc<dyn Transport>>,
    finalized: Option<ApiRef>,
}

impl Api {
    /// 프로세스 식별 정보가 채워진 Env로 생성
    pub fn new() -> Self {
        Self::with_env(Env::new())
    }

    pub fn with_env(env: Env) -> Self {
        Self {
            env,
            classes: Vec::new(),
            names: HashSet::new(),
            transport: None,
            finalized: None,
        }
    }

    /// 운영 모드 지정 (`unit_test` 모드는 설정 파일을 읽지 않는다)
    pub fn with_mode(mode: &str) -> Self {
        Self::with_env(Env::with_mode(mode))
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    /// finalize 이후에는 frozen Env이므로 모든 쓰기가 `FrozenState`
    pub fn env_mut(&mut self) -> &mut Env {
        &mut self.env
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized.is_some()
    }

    // ========================================================================
    // OPEN 단계
    // ========================================================================

    /// 플러그인 클래스 등록
    pub fn register(&mut self, class: PluginClass) -> Result<()> {
        self.ensure_open("register")?;

        let key = (class.category(), class.name().to_string());
        if self.names.contains(&key) {
            return Err(Error::duplicate(class.category().as_str(), class.name()));
        }

        info!("Registered plugin class: {}.{}", class.category(), class.name());
        self.names.insert(key);
        self.classes.push(class);
        Ok(())
    }

    /// 등록된 클래스 (등록 순서)
    pub fn classes(&self) -> impl Iterator<Item = &PluginClass> {
        self.classes.iter()
    }

    /// 외부 설정 병합
    ///
    /// `overrides`를 먼저 병합하고, `unit_test` 모드가 아니면 `conf` 파일
    /// (기본: `<dot_dir>/default.toml`)을 이어서 병합한다. 모두 first-one-wins.
    pub fn bootstrap<I, K, V>(&mut self, overrides: I) -> Result<usize>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<EnvValue>,
    {
        self.ensure_open("bootstrap")?;

        let mut stored = self.env.merge(overrides)?;
        if self.env.get_str("mode") == Some(MODE_UNIT_TEST) {
            return Ok(stored);
        }

        if !self.env.contains("conf") {
            if let Some(dot_dir) = self.env.get("dot_dir").and_then(EnvValue::as_path) {
                let conf = dot_dir.join(DEFAULT_CONFIG_FILE);
                self.env.set("conf", conf)?;
            }
        }
        if let Some(conf) = self
            .env
            .get("conf")
            .and_then(EnvValue::as_path)
            .map(|p| p.to_path_buf())
        {
            stored += self.env.merge_config_file(&conf)?;
        }
        Ok(stored)
    }

    /// 원격 전달용 Transport 설치
    pub fn set_transport(&mut self, transport: Arc<dyn Transport>) -> Result<()> {
        self.ensure_open("set_transport")?;
        self.transport = Some(transport);
        Ok(())
    }

    // ========================================================================
    // finalize
    // ========================================================================

    /// 모든 플러그인 인스턴스화 및 Namespace 구성 (한 번만 가능)
    pub fn finalize(&mut self) -> Result<ApiRef> {
        self.ensure_open("finalize")?;

        let mut env = self.env.clone();
        env.finalize_core()?;

        let classes = &self.classes;
        let transport = self.transport.clone();
        let mut failure = None;

        let finalized = Arc::new_cyclic(|weak| {
            let handle = ApiHandle(weak.clone());
            match build(classes, env, transport, handle) {
                Ok(finalized) => finalized,
                Err(e) => {
                    failure = Some(e);
                    Finalized::placeholder()
                }
            }
        });

        if let Some(e) = failure {
            return Err(e);
        }

        let api = ApiRef(finalized);
        self.env = api.env().clone();
        self.finalized = Some(api.clone());

        info!(
            "Api finalized: {}",
            Category::ALL
                .iter()
                .map(|c| format!("{} {}", api.plugin_names(*c).len(), c))
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(api)
    }

    /// finalize된 Api (아직이면 `Lifecycle`)
    pub fn api_ref(&self) -> Result<ApiRef> {
        self.finalized
            .clone()
            .ok_or_else(|| Error::lifecycle("Api is not finalized"))
    }

    fn ensure_open(&self, operation: &str) -> Result<()> {
        if self.finalized.is_some() {
            return Err(Error::lifecycle(format!(
                "{}() called after finalize()",
                operation
            )));
        }
        Ok(())
    }
}

impl Default for Api {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Api {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Api")
            .field("classes", &self.classes)
            .field("finalized", &self.is_finalized())
            .finish()
    }
}

/// 인스턴스 생성 + on_load + Proxy 구성
fn build(
    classes: &[PluginClass],
    mut env: Env,
    transport: Option<Arc<dyn Transport>>,
    handle: ApiHandle,
) -> Result<Finalized> {
    let mut commands: BTreeMap<Category, Vec<CommandProxy>> = BTreeMap::new();
    let mut objects: BTreeMap<Category, Vec<ObjectProxy>> = BTreeMap::new();
    let mut backends: BTreeMap<Category, Vec<BackendProxy>> = BTreeMap::new();

    for class in classes {
        let name = class.name();
        let category = class.category();
        let wrap = |e: Error| Error::plugin_init(category.as_str(), name, e);
        let mut ctx = LoadContext::new(&mut env, handle.clone(), name, category);

        match &class.factory {
            Factory::Command(make) => {
                let mut command = make();
                command.on_load(&mut ctx).map_err(wrap)?;
                let params = ParamSet::new(name, command.takes_args(), command.takes_options())
                    .map_err(wrap)?;
                let proxy = CommandProxy::new(name, Arc::from(command), params, handle.clone());
                commands.entry(category).or_default().push(proxy);
            }
            Factory::Object(make) => {
                let mut object = make();
                object.on_load(&mut ctx).map_err(wrap)?;
                let proxy = ObjectProxy::new(name, Arc::from(object)).map_err(wrap)?;
                objects.entry(category).or_default().push(proxy);
            }
            Factory::Backend(make) => {
                let mut backend = make();
                backend.on_load(&mut ctx).map_err(wrap)?;
                let proxy = BackendProxy::new(name, category, Arc::from(backend));
                backends.entry(category).or_default().push(proxy);
            }
        }
        debug!("Loaded {}.{}", category, name);
    }

    env.freeze();

    Ok(Finalized {
        env,
        commands: namespace(&mut commands, Category::Command)?,
        objects: namespace(&mut objects, Category::Object)?,
        methods: namespace(&mut commands, Category::Method)?,
        properties: namespace(&mut objects, Category::Property)?,
        applications: namespace(&mut commands, Category::Application)?,
        backends: namespace(&mut backends, Category::Backend)?,
        contexts: namespace(&mut backends, Category::Context)?,
        transport,
    })
}

/// 카테고리 하나의 Proxy들로 사전순 Namespace 구성
fn namespace<T: Named>(
    buckets: &mut BTreeMap<Category, Vec<T>>,
    category: Category,
) -> Result<Namespace<T>> {
    let members = buckets.remove(&category).unwrap_or_default();
    Namespace::new(category.as_str(), members, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::Param;
    use crate::plugin::{Backend, Command};
    use std::any::Any;

    struct Noop;
    impl Command for Noop {}

    struct NeedsColor;
    impl Command for NeedsColor {
        fn on_load(&mut self, ctx: &mut LoadContext<'_>) -> Result<()> {
            ctx.set_default("color", "blue")?;
            Ok(())
        }
    }

    struct Broken;
    impl Command for Broken {
        fn takes_args(&self) -> Vec<Param> {
            vec![Param::parse("items*"), Param::new("last")]
        }
    }

    #[derive(Default)]
    struct Ldap;
    impl Ldap {
        fn do_stuff(&self) -> &'static str {
            "Stuff got done."
        }
    }
    impl Backend for Ldap {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn test_api() -> Api {
        Api::with_mode(MODE_UNIT_TEST)
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut api = test_api();
        api.register(PluginClass::command("noop", || Noop)).unwrap();
        let err = api.register(PluginClass::command("noop", || Noop)).unwrap_err();
        assert!(matches!(err, Error::DuplicateName { ref category, ref name } if category == "Command" && name == "noop"));

        // 다른 카테고리면 같은 이름 허용
        api.register(PluginClass::backend("noop", Ldap::default)).unwrap();
    }

    #[test]
    fn test_lifecycle_errors() {
        let mut api = test_api();
        assert!(matches!(api.api_ref(), Err(Error::Lifecycle(_))));

        api.finalize().unwrap();
        assert!(api.is_finalized());
        assert!(matches!(api.finalize(), Err(Error::Lifecycle(_))));
        assert!(matches!(
            api.register(PluginClass::command("noop", || Noop)),
            Err(Error::Lifecycle(_))
        ));
        assert!(matches!(api.bootstrap([("a", 1i64)]), Err(Error::Lifecycle(_))));
    }

    #[test]
    fn test_env_frozen_after_finalize() {
        let mut api = test_api();
        api.finalize().unwrap();
        assert!(api.env().is_frozen());
        assert!(matches!(
            api.env_mut().set("anything", true),
            Err(Error::FrozenState { .. })
        ));
    }

    #[test]
    fn test_plugin_defaults_never_override_bootstrap() {
        let mut api = test_api();
        api.bootstrap([("color", "red")]).unwrap();
        api.register(PluginClass::command("needs_color", || NeedsColor)).unwrap();
        let api = api.finalize().unwrap();
        assert_eq!(api.env().get_str("color"), Some("red"));

        let mut fresh = test_api();
        fresh.register(PluginClass::command("needs_color", || NeedsColor)).unwrap();
        let fresh = fresh.finalize().unwrap();
        assert_eq!(fresh.env().get_str("color"), Some("blue"));
    }

    #[test]
    fn test_failed_finalize_leaves_api_open() {
        let mut api = test_api();
        api.register(PluginClass::command("noop", || Noop)).unwrap();
        api.register(PluginClass::command("broken", || Broken)).unwrap();

        let err = api.finalize().unwrap_err();
        assert!(matches!(err, Error::PluginInit { ref plugin, .. } if plugin == "broken"));
        assert!(!api.is_finalized());
        assert!(!api.env().is_frozen());
        assert!(api.register(PluginClass::command("other", || Noop)).is_ok());
    }

    #[test]
    fn test_lookup_and_downcast() {
        let mut api = test_api();
        api.register(PluginClass::backend("ldap", Ldap::default)).unwrap();
        let api = api.finalize().unwrap();

        let ldap = api.backend("ldap").unwrap();
        assert_eq!(ldap.downcast::<Ldap>().map(Ldap::do_stuff), Some("Stuff got done."));
        assert!(matches!(
            api.backend("missing"),
            Err(Error::AttributeNotFound { ref namespace, .. }) if namespace == "Backend"
        ));
        assert!(api.context("ldap").is_err());
    }

    struct Echo(&'static str);
    #[async_trait::async_trait]
    impl Command for Echo {
        async fn execute(&self, _ctx: &Invocation, _params: &crate::param::Params) -> Result<serde_json::Value> {
            Ok(serde_json::json!(self.0))
        }
    }

    struct Login;
    impl crate::plugin::Object for Login {
        fn takes_params(&self) -> Vec<Param> {
            vec!["login".into()]
        }
    }

    #[test]
    fn test_command_like_and_object_like_categories() {
        let mut api = test_api();
        api.bootstrap([("in_server", true)]).unwrap();
        api.register(PluginClass::command("user_add", || Echo("command"))).unwrap();
        api.register(PluginClass::method("user_add", || Echo("method"))).unwrap();
        api.register(PluginClass::application("admin", || Echo("application"))).unwrap();
        api.register(PluginClass::property("user_login", || Login)).unwrap();
        assert!(matches!(
            api.register(PluginClass::method("user_add", || Noop)),
            Err(Error::DuplicateName { ref category, .. }) if category == "Method"
        ));
        let api = api.finalize().unwrap();

        let method = api.method("user_add").unwrap();
        assert_eq!(
            tokio_test::block_on(method.call(crate::param::Call::new())).unwrap(),
            serde_json::json!("method")
        );
        assert_eq!(
            tokio_test::block_on(api.call("user_add", crate::param::Call::new())).unwrap(),
            serde_json::json!("command")
        );
        assert_eq!(api.plugin_names(Category::Application), ["admin"]);
        assert_eq!(
            api.property("user_login").unwrap().params().names().collect::<Vec<_>>(),
            ["login"]
        );
        assert!(api.objects().is_empty());
        assert!(matches!(
            api.method("admin"),
            Err(Error::AttributeNotFound { ref namespace, .. }) if namespace == "Method"
        ));
    }

    #[test]
    fn test_transport_missing() {
        let mut api = test_api();
        let api = api.finalize().unwrap();
        assert!(matches!(api.transport(), Err(Error::Transport(_))));
    }
}
