//! Web 服务器
//!
//! 基于 Axum 的传输层：负责监听端口、CORS 和 HTTP 追踪，
//! 所有请求通过 fallback 交给 [`Dispatcher`]。

use anyhow::Context as _;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, Uri},
    response::{IntoResponse, Response},
    Router,
};
use griffin_core::Environment;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::dispatcher::Dispatcher;
use crate::request::Request;

pub const SERVER_HOST: &str = "server.host";
pub const SERVER_PORT: &str = "server.port";
pub const SERVER_ENABLE_CORS: &str = "server.enable-cors";
pub const SERVER_ENABLE_REQUEST_LOGGING: &str = "server.enable-request-logging";

/// Web 服务器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerProperties {
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
    /// HTTP 层追踪（tower-http TraceLayer）
    pub enable_request_logging: bool,
}

impl Default for ServerProperties {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3002,
            enable_cors: true,
            enable_request_logging: true,
        }
    }
}

impl ServerProperties {
    /// 从 Environment 加载配置
    pub fn from_environment(env: &Environment) -> Self {
        let defaults = Self::default();
        Self {
            host: env.get_string_or(SERVER_HOST, &defaults.host),
            port: env
                .get_i64(SERVER_PORT)
                .and_then(|p| u16::try_from(p).ok())
                .unwrap_or(defaults.port),
            enable_cors: env.get_bool_or(SERVER_ENABLE_CORS, defaults.enable_cors),
            enable_request_logging: env
                .get_bool_or(SERVER_ENABLE_REQUEST_LOGGING, defaults.enable_request_logging),
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Griffin Web 服务器
pub struct WebServer {
    config: ServerProperties,
    dispatcher: Arc<Dispatcher>,
}

impl WebServer {
    pub fn new(config: ServerProperties, dispatcher: Arc<Dispatcher>) -> Self {
        Self { config, dispatcher }
    }

    pub fn config(&self) -> &ServerProperties {
        &self.config
    }

    /// 构建 Axum 路由：只有一个 fallback，路由由 Dispatcher 自己解析
    pub fn router(&self) -> Router {
        let mut router = Router::new()
            .fallback(handle)
            .with_state(Arc::clone(&self.dispatcher));

        if self.config.enable_request_logging {
            router = router.layer(TraceLayer::new_for_http());
        }
        if self.config.enable_cors {
            router = router.layer(CorsLayer::permissive());
        }
        router
    }

    /// 启动服务器，收到 Ctrl+C 后优雅退出
    pub async fn run(self) -> anyhow::Result<()> {
        let addr = self.config.address();
        let app = self.router();

        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind to {}", addr))?;

        tracing::info!("Server listening on http://{}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("Server error")?;

        tracing::info!("Server stopped");
        Ok(())
    }
}

async fn handle(
    State(dispatcher): State<Arc<Dispatcher>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = Request::from_parts(method, &uri, headers, body);
    dispatcher.dispatch(request).await.into_response()
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
