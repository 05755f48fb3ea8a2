//! 异常过滤器
//!
//! 请求处理中的所有错误都汇集到唯一的过滤器，由它决定状态码和响应体。

use async_trait::async_trait;
use axum::http::StatusCode;
use griffin_validator::FieldError;
use serde::Serialize;
use tracing::Level;

use crate::error::WebError;
use crate::request::RequestContext;
use crate::route::ResponseEntity;

/// 统一的错误响应体
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub status_code: u16,
    pub timestamp: String,
    pub path: String,
    pub message: String,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl ErrorResponse {
    pub fn new(
        status: StatusCode,
        error: impl Into<String>,
        message: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            status_code: status.as_u16(),
            timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            path: path.into(),
            message: message.into(),
            error: error.into(),
            errors: None,
        }
    }

    pub fn with_errors(mut self, errors: Vec<FieldError>) -> Self {
        self.errors = Some(errors);
        self
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn into_entity(self) -> Result<ResponseEntity, serde_json::Error> {
        let status = self.status();
        Ok(ResponseEntity::new(status, serde_json::to_value(self)?))
    }
}

/// 异常过滤器
///
/// 过滤器自身失败（返回错误或 panic）时，分发器直接返回固定的 500 响应，不会重试。
#[async_trait]
pub trait ExceptionFilter: Send + Sync {
    fn name(&self) -> &str;

    async fn catch(
        &self,
        error: &WebError,
        request: &RequestContext,
    ) -> anyhow::Result<ErrorResponse>;
}

/// 默认异常过滤器
///
/// - 校验失败：400，附带 `errors`
/// - 请求体格式错误：400
/// - 路由不存在：404
/// - `HttpException`：声明的状态码，`error` 缺省为 `Http Exception`
/// - 其它：500，只返回通用消息，细节写入日志
#[derive(Debug, Clone, Default)]
pub struct HttpExceptionFilter;

#[async_trait]
impl ExceptionFilter for HttpExceptionFilter {
    fn name(&self) -> &str {
        "HttpExceptionFilter"
    }

    async fn catch(
        &self,
        error: &WebError,
        request: &RequestContext,
    ) -> anyhow::Result<ErrorResponse> {
        let path = request.path();
        let status = error.status_code();

        let response = match error {
            WebError::NotFound { .. } => {
                ErrorResponse::new(status, "Not Found", error.to_string(), path)
            }
            WebError::MalformedBody { message } => ErrorResponse::new(
                status,
                "Bad Request",
                format!("Malformed request body: {}", message),
                path,
            ),
            WebError::Validation(errors) => {
                ErrorResponse::new(status, "Bad Request", "Validation failed", path)
                    .with_errors(errors.errors().to_vec())
            }
            WebError::Http(exception) => ErrorResponse::new(
                status,
                exception.error.as_deref().unwrap_or("Http Exception"),
                exception.message.clone(),
                path,
            ),
            WebError::Internal(source) => {
                tracing::error!(
                    request_id = request.request_id(),
                    path,
                    error = ?source,
                    "Unhandled error"
                );
                ErrorResponse::new(
                    status,
                    "Internal Server Error",
                    "Internal server error",
                    path,
                )
            }
        };

        match summary_level(error) {
            Some(Level::ERROR) => tracing::error!(
                status = status.as_u16(),
                path,
                message = %response.message,
                "HTTP exception"
            ),
            Some(_) => tracing::warn!(
                status = status.as_u16(),
                path,
                message = %response.message,
                "HTTP exception"
            ),
            None => {}
        }

        Ok(response)
    }
}

/// 响应摘要的日志级别；未分类错误已单独记录，不再输出摘要
fn summary_level(error: &WebError) -> Option<Level> {
    match error {
        WebError::Internal(_) => None,
        other if other.status_code().is_server_error() => Some(Level::ERROR),
        _ => Some(Level::WARN),
    }
}
