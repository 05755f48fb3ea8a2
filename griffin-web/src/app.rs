//! 应用组装
//!
//! 通过声明式的 [`Module`] 和 [`ControllerDefinition`] 描述服务与路由，
//! [`WebApplication`] 负责构建容器、注册路由并生成 [`Dispatcher`]。
//!
//! ```rust,ignore
//! let users = ControllerDefinition::new(
//!     ServiceDescriptor::new("usersController", |deps| {
//!         Ok(UsersController::new(deps.get::<UserService>("userService")?))
//!     })
//!     .depends_on(["userService"]),
//!     "/users",
//! )
//! .get("/:id", "getUser", vec![ParameterBinding::path("id")], handler_fn(UsersController::get_user));
//!
//! let dispatcher = WebApplication::new()
//!     .module(Module::new().provider(user_service).controller(users))
//!     .global_interceptor(ResponseInterceptor)
//!     .build()?;
//! ```

use axum::http::Method;
use griffin_core::{Container, Environment, ServiceDescriptor};
use griffin_validator::Validator;
use std::sync::Arc;

use crate::binder::ParameterBinder;
use crate::dispatcher::Dispatcher;
use crate::error::ConfigurationError;
use crate::filter::{ExceptionFilter, HttpExceptionFilter};
use crate::interceptor::{Interceptor, InterceptorChain};
use crate::route::{join_paths, Handler, ParameterBinding};
use crate::router::RouteRegistry;
use crate::server::{ServerProperties, WebServer};

/// Environment 在容器中的服务名
pub const ENVIRONMENT_SERVICE: &str = "environment";

/// 控制器上的一条路由
pub struct RouteDefinition {
    pub method: Method,
    pub path: String,
    pub handler_name: String,
    pub bindings: Vec<ParameterBinding>,
    pub handler: Arc<dyn Handler>,
}

/// 控制器定义：容器中的控制器服务 + 基础路径 + 路由表
pub struct ControllerDefinition {
    name: String,
    descriptor: Option<ServiceDescriptor>,
    base_path: String,
    routes: Vec<RouteDefinition>,
}

impl ControllerDefinition {
    /// 控制器服务随定义一起注册
    pub fn new(descriptor: ServiceDescriptor, base_path: impl Into<String>) -> Self {
        Self {
            name: descriptor.name.clone(),
            descriptor: Some(descriptor),
            base_path: base_path.into(),
            routes: Vec::new(),
        }
    }

    /// 引用已经作为 provider 注册的服务
    pub fn for_service(name: impl Into<String>, base_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            descriptor: None,
            base_path: base_path.into(),
            routes: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn routes(&self) -> &[RouteDefinition] {
        &self.routes
    }

    pub fn route(
        mut self,
        method: Method,
        path: impl Into<String>,
        handler_name: impl Into<String>,
        bindings: Vec<ParameterBinding>,
        handler: Arc<dyn Handler>,
    ) -> Self {
        self.routes.push(RouteDefinition {
            method,
            path: path.into(),
            handler_name: handler_name.into(),
            bindings,
            handler,
        });
        self
    }

    pub fn get(
        self,
        path: impl Into<String>,
        handler_name: impl Into<String>,
        bindings: Vec<ParameterBinding>,
        handler: Arc<dyn Handler>,
    ) -> Self {
        self.route(Method::GET, path, handler_name, bindings, handler)
    }

    pub fn post(
        self,
        path: impl Into<String>,
        handler_name: impl Into<String>,
        bindings: Vec<ParameterBinding>,
        handler: Arc<dyn Handler>,
    ) -> Self {
        self.route(Method::POST, path, handler_name, bindings, handler)
    }

    pub fn put(
        self,
        path: impl Into<String>,
        handler_name: impl Into<String>,
        bindings: Vec<ParameterBinding>,
        handler: Arc<dyn Handler>,
    ) -> Self {
        self.route(Method::PUT, path, handler_name, bindings, handler)
    }

    pub fn delete(
        self,
        path: impl Into<String>,
        handler_name: impl Into<String>,
        bindings: Vec<ParameterBinding>,
        handler: Arc<dyn Handler>,
    ) -> Self {
        self.route(Method::DELETE, path, handler_name, bindings, handler)
    }
}

/// 模块：一组服务与控制器，可以导入其它模块
#[derive(Default)]
pub struct Module {
    providers: Vec<ServiceDescriptor>,
    controllers: Vec<ControllerDefinition>,
}

impl Module {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn provider(mut self, descriptor: ServiceDescriptor) -> Self {
        self.providers.push(descriptor);
        self
    }

    pub fn controller(mut self, controller: ControllerDefinition) -> Self {
        self.controllers.push(controller);
        self
    }

    /// 合并另一个模块的服务与控制器
    pub fn import(mut self, other: Module) -> Self {
        self.providers.extend(other.providers);
        self.controllers.extend(other.controllers);
        self
    }
}

/// Web 应用构建器
pub struct WebApplication {
    environment: Option<Arc<Environment>>,
    module: Module,
    interceptors: InterceptorChain,
    filter: Option<Arc<dyn ExceptionFilter>>,
    validator: Validator,
}

impl Default for WebApplication {
    fn default() -> Self {
        Self::new()
    }
}

impl WebApplication {
    pub fn new() -> Self {
        Self {
            environment: None,
            module: Module::new(),
            interceptors: InterceptorChain::new(),
            filter: None,
            validator: Validator::new(),
        }
    }

    /// Environment 同时以 `environment` 为名注册到容器
    pub fn environment(mut self, environment: Arc<Environment>) -> Self {
        self.environment = Some(environment);
        self
    }

    pub fn module(mut self, module: Module) -> Self {
        self.module = self.module.import(module);
        self
    }

    /// 全局拦截器，按调用顺序由外到内包裹处理器
    pub fn global_interceptor<I: Interceptor + 'static>(mut self, interceptor: I) -> Self {
        self.interceptors.register(interceptor);
        self
    }

    /// 设置唯一的全局异常过滤器，缺省为 [`HttpExceptionFilter`]
    pub fn global_filter<F: ExceptionFilter + 'static>(mut self, filter: F) -> Self {
        self.filter = Some(Arc::new(filter));
        self
    }

    pub fn validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    /// 构建容器与路由表
    ///
    /// 任何配置错误（循环依赖、缺失依赖、重复路由、非法 Schema 等）都会终止启动。
    pub fn build(self) -> Result<Dispatcher, ConfigurationError> {
        let Module {
            providers,
            controllers,
        } = self.module;

        let mut container = Container::new();
        if let Some(environment) = &self.environment {
            container.register(ServiceDescriptor::instance(
                ENVIRONMENT_SERVICE,
                Arc::clone(environment),
            ))?;
        }
        for provider in providers {
            container.register(provider)?;
        }

        let mut routes = Vec::new();
        for controller in controllers {
            let ControllerDefinition {
                name,
                descriptor,
                base_path,
                routes: definitions,
            } = controller;
            if let Some(descriptor) = descriptor {
                container.register(descriptor)?;
            }
            routes.push((name, base_path, definitions));
        }

        container.build()?;
        tracing::info!(
            services = container.service_names().len(),
            "Container built, construction order: {:?}",
            container.construction_order()
        );

        let mut registry = RouteRegistry::with_validator(self.validator.clone());
        for (controller, base_path, definitions) in routes {
            if !container.contains(&controller) {
                return Err(ConfigurationError::UnknownController(controller));
            }
            for definition in definitions {
                let template = join_paths(&base_path, &definition.path);
                let entry = registry.register_route(
                    definition.method,
                    &template,
                    controller.clone(),
                    definition.handler_name,
                    definition.bindings,
                    definition.handler,
                )?;
                tracing::info!(
                    "Mapped {{{}, {}}} -> {}.{}",
                    entry.template,
                    entry.method,
                    entry.controller,
                    entry.handler_name
                );
            }
        }

        tracing::info!(
            routes = registry.len(),
            interceptors = ?self.interceptors.names(),
            "Request pipeline ready"
        );

        let filter = self
            .filter
            .unwrap_or_else(|| Arc::new(HttpExceptionFilter) as Arc<dyn ExceptionFilter>);

        Ok(Dispatcher::new(
            Arc::new(container),
            registry,
            ParameterBinder::new(Arc::new(self.validator)),
            self.interceptors,
            filter,
        ))
    }

    /// 构建并启动 HTTP 服务器，服务器配置取自 Environment
    pub async fn run(self) -> anyhow::Result<()> {
        let properties = self
            .environment
            .as_deref()
            .map(ServerProperties::from_environment)
            .unwrap_or_default();

        let dispatcher = Arc::new(self.build()?);
        WebServer::new(properties, dispatcher).run().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::Args;
    use crate::error::{HttpException, WebError, WebResult};
    use crate::filter::ErrorResponse;
    use crate::interceptor::{ExecutionContext, Next, ResponseInterceptor};
    use crate::request::{Request, RequestContext};
    use crate::route::{handler_fn, ResponseEntity};
    use async_trait::async_trait;
    use axum::http::{header, StatusCode};
    use griffin_core::ContainerError;
    use griffin_validator::Schema;
    use parking_lot::RwLock;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    #[derive(Default)]
    struct UserStore {
        users: RwLock<Vec<Value>>,
    }

    struct UsersController {
        store: Arc<UserStore>,
    }

    impl UsersController {
        async fn get_user(self: Arc<Self>, args: Args) -> WebResult<ResponseEntity> {
            let id = args.path(0)?;
            let users = self.store.users.read();
            users
                .iter()
                .find(|u| u["id"] == id)
                .cloned()
                .map(ResponseEntity::ok)
                .ok_or_else(|| {
                    HttpException::not_found(format!("User with id {} not found", id)).into()
                })
        }

        async fn create_user(self: Arc<Self>, args: Args) -> WebResult<ResponseEntity> {
            let mut user = args.body_value(0)?.clone();
            let mut users = self.store.users.write();
            user["id"] = json!((users.len() + 1).to_string());
            users.push(user.clone());
            Ok(ResponseEntity::created(user))
        }
    }

    fn users_module() -> Module {
        let store = ServiceDescriptor::new("userStore", |_| Ok(UserStore::default()));
        let controller = ControllerDefinition::new(
            ServiceDescriptor::new("usersController", |deps| {
                Ok(UsersController {
                    store: deps.get::<UserStore>("userStore")?,
                })
            })
            .depends_on(["userStore"]),
            "/api/users",
        )
        .get(
            "/:id",
            "getUser",
            vec![ParameterBinding::path("id")],
            handler_fn(UsersController::get_user),
        )
        .post(
            "/",
            "createUser",
            vec![ParameterBinding::body(
                Schema::object()
                    .field("username", Schema::string().length(3, 20).pattern("^[a-zA-Z0-9_]+$"))
                    .field("role", Schema::enumeration(["admin", "user", "guest"])),
            )],
            handler_fn(UsersController::create_user),
        )
        .get(
            "/:id/crash",
            "crash",
            vec![],
            handler_fn(|_: Arc<UsersController>, _: Args| async move {
                if true {
                    panic!("boom");
                }
                Ok(ResponseEntity::no_content())
            }),
        );

        Module::new().provider(store).controller(controller)
    }

    async fn dispatch(dispatcher: &Dispatcher, request: Request) -> (StatusCode, Value) {
        let response = dispatcher.dispatch(request).await;
        (response.status_code(), response.body().cloned().unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_end_to_end_create_and_fetch() {
        let dispatcher = WebApplication::new().module(users_module()).build().unwrap();

        let (status, body) = dispatch(
            &dispatcher,
            Request::post("/api/users")
                .with_json(&json!({"username": "john_doe1", "role": "user"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, json!({"username": "john_doe1", "role": "user", "id": "1"}));

        let (status, body) = dispatch(&dispatcher, Request::get("/api/users/1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "john_doe1");
    }

    #[tokio::test]
    async fn test_validation_failure_never_reaches_handler() {
        let dispatcher = WebApplication::new().module(users_module()).build().unwrap();

        let (status, body) = dispatch(
            &dispatcher,
            Request::post("/api/users").with_json(&json!({"username": "jo", "role": "admin"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["field"], "username");
        assert_eq!(body["path"], "/api/users");

        let store = dispatcher.container().resolve::<UserStore>().unwrap();
        assert!(store.users.read().is_empty());
    }

    #[tokio::test]
    async fn test_not_found_and_domain_errors() {
        let dispatcher = WebApplication::new().module(users_module()).build().unwrap();

        let (status, body) = dispatch(&dispatcher, Request::get("/api/users/abc/extra")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["statusCode"], 404);
        assert_eq!(body["path"], "/api/users/abc/extra");

        let (status, body) = dispatch(&dispatcher, Request::get("/api/users/123")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "User with id 123 not found");
        assert_eq!(body["error"], "Http Exception");
        assert_eq!(body["path"], "/api/users/123");
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_malformed_body_and_panics() {
        let dispatcher = WebApplication::new().module(users_module()).build().unwrap();

        let (status, body) =
            dispatch(&dispatcher, Request::post("/api/users").with_body("{oops")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Bad Request");

        let (status, body) = dispatch(&dispatcher, Request::get("/api/users/1/crash")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal server error");
    }

    #[tokio::test]
    async fn test_controller_is_singleton() {
        let dispatcher = WebApplication::new().module(users_module()).build().unwrap();
        let a = dispatcher.container().resolve::<UsersController>().unwrap();
        let b = dispatcher.container().resolve_named::<UsersController>("usersController").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&a.store, &dispatcher.container().resolve::<UserStore>().unwrap()));
    }

    #[tokio::test]
    async fn test_response_interceptor_envelope() {
        let dispatcher = WebApplication::new()
            .module(users_module())
            .global_interceptor(ResponseInterceptor)
            .build()
            .unwrap();

        dispatch(
            &dispatcher,
            Request::post("/api/users").with_json(&json!({"username": "ann_1", "role": "guest"})),
        )
        .await;
        let (status, body) = dispatch(&dispatcher, Request::get("/api/users/1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["username"], "ann_1");

        let (status, body) = dispatch(&dispatcher, Request::get("/api/users/9")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.get("success").is_none());
    }

    struct FailingFilter;

    #[async_trait]
    impl ExceptionFilter for FailingFilter {
        fn name(&self) -> &str {
            "FailingFilter"
        }

        async fn catch(
            &self,
            _error: &WebError,
            _request: &RequestContext,
        ) -> anyhow::Result<ErrorResponse> {
            Err(anyhow::anyhow!("filter is broken"))
        }
    }

    struct PanickingFilter;

    #[async_trait]
    impl ExceptionFilter for PanickingFilter {
        fn name(&self) -> &str {
            "PanickingFilter"
        }

        async fn catch(
            &self,
            _error: &WebError,
            _request: &RequestContext,
        ) -> anyhow::Result<ErrorResponse> {
            panic!("filter exploded")
        }
    }

    #[tokio::test]
    async fn test_failing_filter_yields_fatal_response() {
        for dispatcher in [
            WebApplication::new()
                .module(users_module())
                .global_filter(FailingFilter)
                .build()
                .unwrap(),
            WebApplication::new()
                .module(users_module())
                .global_filter(PanickingFilter)
                .build()
                .unwrap(),
        ] {
            let response = dispatcher.dispatch(Request::get("/missing")).await;
            assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(response.headers().get(header::CONNECTION).unwrap(), "close");
            assert_eq!(response.body().unwrap()["statusCode"], 500);
        }
    }

    struct Translate;

    #[async_trait]
    impl Interceptor for Translate {
        fn name(&self) -> &str {
            "Translate"
        }

        async fn intercept(
            &self,
            ctx: &mut ExecutionContext,
            next: Next<'_>,
        ) -> WebResult<ResponseEntity> {
            match next.run(ctx).await {
                Err(WebError::Http(e)) if e.status == StatusCode::NOT_FOUND => {
                    Ok(ResponseEntity::ok(json!({"fallback": true})))
                }
                other => other,
            }
        }
    }

    #[tokio::test]
    async fn test_interceptor_can_translate_errors() {
        let dispatcher = WebApplication::new()
            .module(users_module())
            .global_interceptor(Translate)
            .build()
            .unwrap();

        let (status, body) = dispatch(&dispatcher, Request::get("/api/users/404")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"fallback": true}));
    }

    struct Cached;

    #[async_trait]
    impl Interceptor for Cached {
        fn name(&self) -> &str {
            "Cached"
        }

        async fn intercept(
            &self,
            _ctx: &mut ExecutionContext,
            _next: Next<'_>,
        ) -> WebResult<ResponseEntity> {
            Ok(ResponseEntity::ok(json!({"cached": true})))
        }
    }

    type Journal = Arc<parking_lot::Mutex<Vec<&'static str>>>;

    struct Recording {
        journal: Journal,
    }

    #[async_trait]
    impl Interceptor for Recording {
        fn name(&self) -> &str {
            "Recording"
        }

        async fn intercept(
            &self,
            ctx: &mut ExecutionContext,
            next: Next<'_>,
        ) -> WebResult<ResponseEntity> {
            self.journal.lock().push("before");
            let result = next.run(ctx).await;
            self.journal.lock().push("after");
            result
        }
    }

    #[tokio::test]
    async fn test_binding_failures_bypass_interceptors() {
        let dispatcher = WebApplication::new()
            .module(users_module())
            .global_interceptor(Cached)
            .build()
            .unwrap();

        let (status, body) =
            dispatch(&dispatcher, Request::post("/api/users").with_body("{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Bad Request");

        let (status, body) = dispatch(
            &dispatcher,
            Request::post("/api/users").with_json(&json!({"username": "x", "role": "root"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"].as_array().unwrap().len(), 2);

        let journal: Journal = Arc::default();
        let dispatcher = WebApplication::new()
            .module(users_module())
            .global_interceptor(Recording {
                journal: Arc::clone(&journal),
            })
            .build()
            .unwrap();

        let (status, _) = dispatch(
            &dispatcher,
            Request::post("/api/users").with_json(&json!({"username": "jo"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(journal.lock().is_empty());

        let (status, _) = dispatch(
            &dispatcher,
            Request::post("/api/users").with_json(&json!({"username": "joe", "role": "user"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(*journal.lock(), vec!["before", "after"]);
    }

    #[derive(Default)]
    struct Gate {
        open: tokio::sync::Notify,
    }

    #[tokio::test]
    async fn test_dropped_dispatch_never_runs_after_phase() {
        let gated = ControllerDefinition::new(
            ServiceDescriptor::new("gate", |_| Ok(Gate::default())),
            "/slow",
        )
        .get(
            "/",
            "wait",
            vec![],
            handler_fn(|gate: Arc<Gate>, _: Args| async move {
                gate.open.notified().await;
                Ok(ResponseEntity::ok(json!({"done": true})))
            }),
        );

        let journal: Journal = Arc::default();
        let dispatcher = WebApplication::new()
            .module(Module::new().controller(gated))
            .global_interceptor(Recording {
                journal: Arc::clone(&journal),
            })
            .build()
            .unwrap();

        let outcome = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            dispatcher.dispatch(Request::get("/slow")),
        )
        .await;
        assert!(outcome.is_err());

        dispatcher.container().resolve::<Gate>().unwrap().open.notify_waiters();
        tokio::task::yield_now().await;
        assert_eq!(*journal.lock(), vec!["before"]);
    }

    #[test]
    fn test_configuration_errors_abort_build() {
        let empty = || {
            handler_fn(|_: Arc<()>, _| async { Ok(ResponseEntity::no_content()) })
        };
        let duplicate = Module::new().controller(
            ControllerDefinition::new(ServiceDescriptor::new("c", |_| Ok(())), "/a")
                .get("/:id", "one", vec![], empty())
                .get("/:key", "two", vec![], empty()),
        );
        assert!(matches!(
            WebApplication::new().module(duplicate).build(),
            Err(ConfigurationError::DuplicateRoute { .. })
        ));

        let unknown =
            Module::new().controller(ControllerDefinition::for_service("ghost", "/ghost"));
        assert!(matches!(
            WebApplication::new().module(unknown).build(),
            Err(ConfigurationError::UnknownController(ref name)) if name == "ghost"
        ));

        let cyclic = Module::new()
            .provider(ServiceDescriptor::new("a", |_| Ok(1u8)).depends_on(["b"]))
            .provider(ServiceDescriptor::new("b", |_| Ok(2u16)).depends_on(["a"]));
        assert!(matches!(
            WebApplication::new().module(cyclic).build(),
            Err(ConfigurationError::Container(ContainerError::CyclicDependency { .. }))
        ));
    }

    #[test]
    fn test_environment_is_injectable() {
        let env = Arc::new(Environment::new());
        let dispatcher = WebApplication::new().environment(Arc::clone(&env)).build().unwrap();
        let resolved = dispatcher
            .container()
            .resolve_named::<Environment>(ENVIRONMENT_SERVICE)
            .unwrap();
        assert!(Arc::ptr_eq(&env, &resolved));
    }

    #[tokio::test]
    async fn test_served_through_axum() {
        let dispatcher = Arc::new(WebApplication::new().module(users_module()).build().unwrap());
        let router = WebServer::new(ServerProperties::default(), dispatcher).router();

        let request = axum::http::Request::builder()
            .method(Method::POST)
            .uri("/api/users")
            .header(header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(r#"{"username":"axum_user","role":"admin"}"#))
            .unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let request = axum::http::Request::builder()
            .uri("/nowhere?x=1")
            .body(axum::body::Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["path"], "/nowhere");
    }
}
