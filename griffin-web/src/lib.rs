//! # Griffin Web
//!
//! 请求处理管线：路由解析、参数绑定与校验、拦截器链、统一异常过滤。
//! 传输层基于 Axum，所有请求经由 [`Dispatcher`] 处理。
//!
//! ## 核心特性
//!
//! - **显式路由表** - 路由在启动时注册，重复路由直接报错
//! - **参数绑定** - 路径参数、查询参数、带 Schema 校验的请求体
//! - **拦截器** - 洋葱模型，可短路、可改写响应与错误
//! - **异常过滤器** - 所有错误统一转换为 JSON 错误响应

pub mod app;
pub mod binder;
pub mod dispatcher;
pub mod error;
pub mod filter;
pub mod interceptor;
pub mod request;
pub mod route;
pub mod router;
pub mod server;

pub use app::{ControllerDefinition, Module, RouteDefinition, WebApplication};
pub use binder::{Arg, Args, ParameterBinder};
pub use dispatcher::Dispatcher;
pub use error::{ConfigurationError, HttpException, WebError, WebResult};
pub use filter::{ErrorResponse, ExceptionFilter, HttpExceptionFilter};
pub use interceptor::{
    Endpoint, ExecutionContext, Interceptor, InterceptorChain, LoggingInterceptor, Next,
    ResponseInterceptor,
};
pub use request::{Request, RequestContext};
pub use route::{handler_fn, Handler, ParameterBinding, PathTemplate, ResponseEntity, RouteEntry};
pub use router::{RouteMatch, RouteRegistry};
pub use server::{ServerProperties, WebServer};

pub mod prelude {
    //! 预导入模块

    pub use crate::app::*;
    pub use crate::binder::{Args, ParameterBinder};
    pub use crate::dispatcher::Dispatcher;
    pub use crate::error::*;
    pub use crate::filter::*;
    pub use crate::interceptor::*;
    pub use crate::request::*;
    pub use crate::route::{handler_fn, ParameterBinding, ResponseEntity};
    pub use crate::server::*;

    pub use async_trait::async_trait;
    pub use axum::http::{Method, StatusCode};
    pub use griffin_validator::{Schema, SchemaExt, Validator};
    pub use serde_json::{json, Value};
}
