//! 路由定义：路径模板、参数绑定、处理器与响应实体

use axum::{
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use futures_util::future::{BoxFuture, FutureExt};
use griffin_core::SharedInstance;
use griffin_validator::Schema;
use serde::Serialize;
use serde_json::Value;
use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::binder::Args;
use crate::error::{ConfigurationError, WebError, WebResult};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// 路径模板，例如 `/api/users/:id`
///
/// 规范化规则：保证以 `/` 开头，去掉重复和结尾的 `/`。
/// 参数名不影响结构，`/u/:id` 与 `/u/:uid` 视为同一模板。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    normalized: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    pub fn parse(template: &str) -> Result<Self, ConfigurationError> {
        let invalid = |reason: &str| ConfigurationError::InvalidTemplate {
            template: template.to_string(),
            reason: reason.to_string(),
        };

        let mut seen = HashSet::new();
        let mut segments = Vec::new();
        for raw in split_path(template) {
            match raw.strip_prefix(':') {
                Some("") => return Err(invalid("empty parameter name")),
                Some(name) => {
                    if !seen.insert(name) {
                        return Err(invalid(&format!("repeated parameter name '{}'", name)));
                    }
                    segments.push(Segment::Param(name.to_string()));
                }
                None => segments.push(Segment::Literal(raw.to_string())),
            }
        }

        let normalized = format!(
            "/{}",
            segments
                .iter()
                .map(|s| match s {
                    Segment::Literal(l) => l.clone(),
                    Segment::Param(p) => format!(":{}", p),
                })
                .collect::<Vec<_>>()
                .join("/")
        );

        Ok(Self { normalized, segments })
    }

    pub fn as_str(&self) -> &str {
        &self.normalized
    }

    /// 结构键，参数段统一为 `:`
    pub fn structural_key(&self) -> String {
        let parts: Vec<&str> = self
            .segments
            .iter()
            .map(|s| match s {
                Segment::Literal(l) => l.as_str(),
                Segment::Param(_) => ":",
            })
            .collect();
        format!("/{}", parts.join("/"))
    }

    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(p) => Some(p.as_str()),
            Segment::Literal(_) => None,
        })
    }

    pub fn has_param(&self, name: &str) -> bool {
        self.param_names().any(|p| p == name)
    }

    /// 按段匹配，成功时返回绑定的路径参数
    pub fn matches(&self, segments: &[&str]) -> Option<HashMap<String, String>> {
        if segments.len() != self.segments.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (pattern, actual) in self.segments.iter().zip(segments) {
            match pattern {
                Segment::Literal(l) if l.as_str() == *actual => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => {
                    params.insert(name.clone(), (*actual).to_string());
                }
            }
        }
        Some(params)
    }

    /// 各段是否为参数；按字典序比较时，第一个不同位置上为字面量的模板更靠前
    pub(crate) fn specificity(&self) -> Vec<bool> {
        self.segments
            .iter()
            .map(|s| matches!(s, Segment::Param(_)))
            .collect()
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.normalized)
    }
}

pub(crate) fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// 拼接控制器基础路径与方法路径
pub fn join_paths(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// 参数来源
#[derive(Debug, Clone)]
pub enum ParameterBinding {
    /// 路径参数，原样传递匹配到的字符串
    PathParam(String),
    /// 查询参数，可能缺省
    Query(String),
    /// JSON 请求体，可选 Schema 校验
    Body(Option<Schema>),
    /// 共享的请求上下文
    RequestContext,
}

impl ParameterBinding {
    pub fn path(name: impl Into<String>) -> Self {
        ParameterBinding::PathParam(name.into())
    }

    pub fn query(name: impl Into<String>) -> Self {
        ParameterBinding::Query(name.into())
    }

    pub fn body(schema: impl Into<Schema>) -> Self {
        ParameterBinding::Body(Some(schema.into()))
    }

    /// 不做校验的请求体
    pub fn raw_body() -> Self {
        ParameterBinding::Body(None)
    }

    pub fn context() -> Self {
        ParameterBinding::RequestContext
    }
}

/// HTTP 响应实体
///
/// 处理器、拦截器和异常过滤器的统一输出，最终由传输层转换为 HTTP 响应。
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEntity {
    status: StatusCode,
    headers: HeaderMap,
    body: Option<Value>,
}

impl ResponseEntity {
    pub fn new(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Some(body),
        }
    }

    pub fn ok(body: Value) -> Self {
        Self::new(StatusCode::OK, body)
    }

    pub fn created(body: Value) -> Self {
        Self::new(StatusCode::CREATED, body)
    }

    pub fn no_content() -> Self {
        Self {
            status: StatusCode::NO_CONTENT,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// 序列化任意可序列化的值
    pub fn json<T: Serialize>(status: StatusCode, body: &T) -> WebResult<Self> {
        let value = serde_json::to_value(body).map_err(|e| WebError::Internal(e.into()))?;
        Ok(Self::new(status, value))
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// 替换响应体，保留状态码与响应头
    pub fn map_body<F>(mut self, f: F) -> Self
    where
        F: FnOnce(Option<Value>) -> Value,
    {
        self.body = Some(f(self.body.take()));
        self
    }
}

impl IntoResponse for ResponseEntity {
    fn into_response(self) -> Response {
        let mut response = match self.body {
            Some(body) => (self.status, Json(body)).into_response(),
            None => self.status.into_response(),
        };

        let headers = response.headers_mut();
        for (name, value) in self.headers {
            if let Some(name) = name {
                headers.insert(name, value);
            }
        }

        response
    }
}

/// 路由处理器
pub trait Handler: Send + Sync {
    fn call(
        &self,
        controller: SharedInstance,
        args: Args,
    ) -> BoxFuture<'static, WebResult<ResponseEntity>>;
}

struct FnHandler<C, F> {
    f: F,
    _controller: PhantomData<fn() -> C>,
}

impl<C, F, Fut> Handler for FnHandler<C, F>
where
    C: Any + Send + Sync,
    F: Fn(Arc<C>, Args) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = WebResult<ResponseEntity>> + Send + 'static,
{
    fn call(
        &self,
        controller: SharedInstance,
        args: Args,
    ) -> BoxFuture<'static, WebResult<ResponseEntity>> {
        match controller.downcast::<C>() {
            Ok(controller) => (self.f)(controller, args).boxed(),
            Err(_) => {
                let error = anyhow::anyhow!(
                    "Controller instance is not of type {}",
                    std::any::type_name::<C>()
                );
                async move { Err(WebError::Internal(error)) }.boxed()
            }
        }
    }
}

/// 由异步函数构造处理器，控制器实例按类型 `C` 取出
///
/// ```rust,ignore
/// handler_fn(|controller: Arc<AppController>, args: Args| async move {
///     let id = args.path(0)?;
///     controller.get_user(id)
/// })
/// ```
pub fn handler_fn<C, F, Fut>(f: F) -> Arc<dyn Handler>
where
    C: Any + Send + Sync,
    F: Fn(Arc<C>, Args) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = WebResult<ResponseEntity>> + Send + 'static,
{
    Arc::new(FnHandler {
        f,
        _controller: PhantomData,
    })
}

/// 注册后的路由
pub struct RouteEntry {
    pub method: Method,
    pub template: PathTemplate,
    /// 控制器在容器中的名称
    pub controller: String,
    pub handler_name: String,
    pub bindings: Vec<ParameterBinding>,
    pub handler: Arc<dyn Handler>,
}

impl fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEntry")
            .field("method", &self.method)
            .field("template", &self.template.as_str())
            .field("controller", &self.controller)
            .field("handler_name", &self.handler_name)
            .field("bindings", &self.bindings)
            .finish()
    }
}
