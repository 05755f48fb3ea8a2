//! 拦截器链
//!
//! 拦截器按注册顺序嵌套包裹处理器：每个拦截器拿到 [`ExecutionContext`] 和 [`Next`]，
//! 可以在调用前检查请求、调用后替换结果、不调用 `next` 直接短路，或转换错误。
//!
//! ```rust,ignore
//! struct Timing;
//!
//! #[async_trait]
//! impl Interceptor for Timing {
//!     fn name(&self) -> &str {
//!         "Timing"
//!     }
//!
//!     async fn intercept(&self, ctx: &mut ExecutionContext, next: Next<'_>) -> WebResult<ResponseEntity> {
//!         let start = Instant::now();
//!         let result = next.run(ctx).await;
//!         tracing::info!(elapsed = ?start.elapsed(), "done");
//!         result
//!     }
//! }
//! ```

use async_trait::async_trait;
use axum::http::StatusCode;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::WebResult;
use crate::request::RequestContext;
use crate::route::{ResponseEntity, RouteEntry};

/// 单次调用的执行上下文
#[derive(Debug)]
pub struct ExecutionContext {
    request: Arc<RequestContext>,
    controller: String,
    handler: String,
    route: String,
    attributes: HashMap<String, Value>,
}

impl ExecutionContext {
    pub fn new(request: Arc<RequestContext>, route: &RouteEntry) -> Self {
        Self {
            request,
            controller: route.controller.clone(),
            handler: route.handler_name.clone(),
            route: route.template.to_string(),
            attributes: HashMap::new(),
        }
    }

    pub fn request(&self) -> &Arc<RequestContext> {
        &self.request
    }

    pub fn controller_name(&self) -> &str {
        &self.controller
    }

    pub fn handler_name(&self) -> &str {
        &self.handler
    }

    /// 匹配到的路由模板
    pub fn route(&self) -> &str {
        &self.route
    }

    /// 拦截器之间传递数据
    pub fn set_attribute(&mut self, key: impl Into<String>, value: Value) {
        self.attributes.insert(key.into(), value);
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }
}

/// 链的终点，通常是对已绑定参数的处理器调用
#[async_trait]
pub trait Endpoint: Send + Sync {
    async fn call(&self, ctx: &mut ExecutionContext) -> WebResult<ResponseEntity>;
}

/// 拦截器
///
/// 实例在请求间共享，不应保存请求级的可变状态。
#[async_trait]
pub trait Interceptor: Send + Sync {
    fn name(&self) -> &str;

    /// 生效路径，支持 `/**`、`/prefix/**`、单个 `*` 和精确匹配
    fn path_patterns(&self) -> Vec<&str> {
        vec!["/**"]
    }

    /// 排除路径
    fn exclude_patterns(&self) -> Vec<&str> {
        vec![]
    }

    async fn intercept(
        &self,
        ctx: &mut ExecutionContext,
        next: Next<'_>,
    ) -> WebResult<ResponseEntity>;
}

/// 调用链中剩余的部分，只能运行一次
pub struct Next<'a> {
    interceptors: &'a [Arc<dyn Interceptor>],
    endpoint: &'a dyn Endpoint,
}

impl<'a> Next<'a> {
    pub fn new(interceptors: &'a [Arc<dyn Interceptor>], endpoint: &'a dyn Endpoint) -> Self {
        Self {
            interceptors,
            endpoint,
        }
    }

    pub async fn run(self, ctx: &mut ExecutionContext) -> WebResult<ResponseEntity> {
        match self.interceptors.split_first() {
            Some((current, rest)) => {
                tracing::trace!(interceptor = current.name(), "Entering interceptor");
                current.intercept(ctx, Next::new(rest, self.endpoint)).await
            }
            None => self.endpoint.call(ctx).await,
        }
    }
}

#[derive(Debug, Clone)]
struct PathMatcher {
    patterns: Vec<String>,
}

impl PathMatcher {
    fn new(patterns: Vec<&str>) -> Self {
        Self {
            patterns: patterns.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn matches(&self, path: &str) -> bool {
        self.patterns.iter().any(|pattern| match_pattern(pattern, path))
    }
}

fn match_pattern(pattern: &str, path: &str) -> bool {
    if pattern == "/**" {
        return true;
    }

    if let Some(prefix) = pattern.strip_suffix("/**") {
        return path == prefix || path.starts_with(&format!("{}/", prefix));
    }

    if let Some((prefix, suffix)) = pattern.split_once('*') {
        if !suffix.contains('*') {
            return path.len() >= prefix.len() + suffix.len()
                && path.starts_with(prefix)
                && path.ends_with(suffix);
        }
    }

    pattern == path
}

struct ScopedInterceptor {
    interceptor: Arc<dyn Interceptor>,
    include: PathMatcher,
    exclude: PathMatcher,
}

impl ScopedInterceptor {
    fn new(interceptor: Arc<dyn Interceptor>) -> Self {
        let include = PathMatcher::new(interceptor.path_patterns());
        let exclude = PathMatcher::new(interceptor.exclude_patterns());
        Self {
            interceptor,
            include,
            exclude,
        }
    }

    fn applies_to(&self, path: &str) -> bool {
        self.include.matches(path) && !self.exclude.matches(path)
    }
}

/// 拦截器链，按注册顺序执行
#[derive(Default)]
pub struct InterceptorChain {
    interceptors: Vec<ScopedInterceptor>,
}

impl InterceptorChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<I: Interceptor + 'static>(&mut self, interceptor: I) {
        self.register_arc(Arc::new(interceptor));
    }

    pub fn register_arc(&mut self, interceptor: Arc<dyn Interceptor>) {
        tracing::debug!(interceptor = interceptor.name(), "Registered interceptor");
        self.interceptors.push(ScopedInterceptor::new(interceptor));
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.interceptors.iter().map(|s| s.interceptor.name()).collect()
    }

    /// 对给定路径生效的拦截器
    pub fn applicable(&self, path: &str) -> Vec<Arc<dyn Interceptor>> {
        self.interceptors
            .iter()
            .filter(|s| s.applies_to(path))
            .map(|s| Arc::clone(&s.interceptor))
            .collect()
    }

    pub async fn execute(
        &self,
        ctx: &mut ExecutionContext,
        endpoint: &dyn Endpoint,
    ) -> WebResult<ResponseEntity> {
        let applicable = self.applicable(ctx.request().path());
        Next::new(&applicable, endpoint).run(ctx).await
    }
}

/// 请求日志拦截器
#[derive(Debug, Clone, Default)]
pub struct LoggingInterceptor;

#[async_trait]
impl Interceptor for LoggingInterceptor {
    fn name(&self) -> &str {
        "LoggingInterceptor"
    }

    async fn intercept(
        &self,
        ctx: &mut ExecutionContext,
        next: Next<'_>,
    ) -> WebResult<ResponseEntity> {
        let method = ctx.request().method().clone();
        let path = ctx.request().path().to_string();
        tracing::info!(%method, %path, handler = ctx.handler_name(), "Request started");

        let result = next.run(ctx).await;
        let elapsed = ctx.request().elapsed();

        match &result {
            Ok(response) => tracing::info!(
                %method,
                %path,
                status = response.status_code().as_u16(),
                elapsed_ms = elapsed.as_millis() as u64,
                "Request completed"
            ),
            Err(error) => tracing::warn!(
                %method,
                %path,
                error = %error,
                elapsed_ms = elapsed.as_millis() as u64,
                "Request failed"
            ),
        }
        result
    }
}

/// 响应包装拦截器
///
/// 成功的响应体被包装为 `{success, data, timestamp, duration}`，
/// 状态码与响应头不变，错误原样向外传递。204 响应不带响应体，保持原样。
#[derive(Debug, Clone, Default)]
pub struct ResponseInterceptor;

#[async_trait]
impl Interceptor for ResponseInterceptor {
    fn name(&self) -> &str {
        "ResponseInterceptor"
    }

    async fn intercept(
        &self,
        ctx: &mut ExecutionContext,
        next: Next<'_>,
    ) -> WebResult<ResponseEntity> {
        let started = std::time::Instant::now();
        let response = next.run(ctx).await?;
        if response.status_code() == StatusCode::NO_CONTENT {
            return Ok(response);
        }
        let duration = started.elapsed().as_millis();

        let timestamp =
            chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        Ok(response.map_body(|data| {
            json!({
                "success": true,
                "data": data.unwrap_or(Value::Null),
                "timestamp": timestamp,
                "duration": format!("{}ms", duration),
            })
        }))
    }
}
