//! 请求分发
//!
//! 路由解析 -> 取控制器 -> 参数绑定 -> 拦截器链 -> 处理器。
//! 任何一步失败都交给异常过滤器；分发器是错误转换为响应的唯一边界。

use async_trait::async_trait;
use axum::http::{header, HeaderValue, StatusCode};
use futures_util::FutureExt;
use griffin_core::{Container, SharedInstance};
use serde_json::json;
use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::Instrument;

use crate::binder::{Args, ParameterBinder};
use crate::error::{WebError, WebResult};
use crate::filter::ExceptionFilter;
use crate::interceptor::{Endpoint, ExecutionContext, InterceptorChain};
use crate::request::{Request, RequestContext};
use crate::route::{ResponseEntity, RouteEntry};
use crate::router::RouteRegistry;

/// 链的最内层：参数已绑定完成，只负责调用处理器
struct HandlerEndpoint<'a> {
    entry: &'a RouteEntry,
    controller: SharedInstance,
    args: Args,
}

#[async_trait]
impl Endpoint for HandlerEndpoint<'_> {
    async fn call(&self, _ctx: &mut ExecutionContext) -> WebResult<ResponseEntity> {
        self.entry
            .handler
            .call(Arc::clone(&self.controller), self.args.clone())
            .await
    }
}

/// 请求分发器
///
/// 启动后只读，通过 `Arc` 在所有请求任务间共享。
pub struct Dispatcher {
    container: Arc<Container>,
    registry: RouteRegistry,
    binder: ParameterBinder,
    interceptors: InterceptorChain,
    filter: Arc<dyn ExceptionFilter>,
}

impl Dispatcher {
    pub fn new(
        container: Arc<Container>,
        registry: RouteRegistry,
        binder: ParameterBinder,
        interceptors: InterceptorChain,
        filter: Arc<dyn ExceptionFilter>,
    ) -> Self {
        Self {
            container,
            registry,
            binder,
            interceptors,
            filter,
        }
    }

    pub fn container(&self) -> &Arc<Container> {
        &self.container
    }

    pub fn registry(&self) -> &RouteRegistry {
        &self.registry
    }

    pub fn interceptors(&self) -> &InterceptorChain {
        &self.interceptors
    }

    /// 处理一个请求，总是返回响应
    pub async fn dispatch(&self, request: Request) -> ResponseEntity {
        let mut ctx = RequestContext::new(request, HashMap::new());
        let span = tracing::info_span!(
            "request",
            request_id = %ctx.request_id(),
            method = %ctx.method(),
            path = %ctx.path(),
        );

        async move {
            let resolved = self
                .registry
                .resolve(ctx.method(), ctx.path())
                .map(|matched| (matched.entry, matched.params));

            match resolved {
                Ok((entry, params)) => {
                    ctx.set_params(params);
                    let ctx = Arc::new(ctx);
                    match self.process(entry, &ctx).await {
                        Ok(response) => response,
                        Err(error) => self.handle_error(error, &ctx).await,
                    }
                }
                Err(error) => self.handle_error(error, &ctx).await,
            }
        }
        .instrument(span)
        .await
    }

    async fn process(
        &self,
        entry: &RouteEntry,
        ctx: &Arc<RequestContext>,
    ) -> WebResult<ResponseEntity> {
        tracing::debug!(
            controller = %entry.controller,
            handler = %entry.handler_name,
            route = %entry.template,
            "Route matched"
        );

        let controller = self
            .container
            .resolve_any(&entry.controller)
            .map_err(|e| WebError::Internal(e.into()))?;

        // 绑定失败直接进入异常分发，拦截器不会看到这个请求
        let args = self.binder.bind(entry, ctx)?;

        let endpoint = HandlerEndpoint {
            entry,
            controller,
            args,
        };
        let mut exec = ExecutionContext::new(Arc::clone(ctx), entry);

        match AssertUnwindSafe(self.interceptors.execute(&mut exec, &endpoint))
            .catch_unwind()
            .await
        {
            Ok(result) => result,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!(
                    handler = %entry.handler_name,
                    panic = %message,
                    "Handler panicked"
                );
                Err(WebError::Internal(anyhow::anyhow!(
                    "Handler panicked: {}",
                    message
                )))
            }
        }
    }

    async fn handle_error(&self, error: WebError, ctx: &RequestContext) -> ResponseEntity {
        match AssertUnwindSafe(self.filter.catch(&error, ctx)).catch_unwind().await {
            Ok(Ok(response)) => match response.into_entity() {
                Ok(entity) => entity,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize error response");
                    fatal_response()
                }
            },
            Ok(Err(e)) => {
                tracing::error!(
                    filter = self.filter.name(),
                    original = %error,
                    error = ?e,
                    "Exception filter failed"
                );
                fatal_response()
            }
            Err(panic) => {
                tracing::error!(
                    filter = self.filter.name(),
                    original = %error,
                    panic = %panic_message(panic.as_ref()),
                    "Exception filter panicked"
                );
                fatal_response()
            }
        }
    }
}

/// 过滤器失效时的固定响应
fn fatal_response() -> ResponseEntity {
    ResponseEntity::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({
            "statusCode": 500,
            "message": "Internal server error",
            "error": "Internal Server Error",
        }),
    )
    .header(header::CONNECTION, HeaderValue::from_static("close"))
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic".to_string()
    }
}
