//! Web 层错误类型
//!
//! 两类错误：
//! - [`ConfigurationError`]：应用组装阶段的错误，直接终止启动
//! - [`WebError`]：请求处理阶段的错误，统一交给异常过滤器转换为响应

use griffin_core::ContainerError;
use griffin_validator::{SchemaError, ValidationErrors};
use http::StatusCode;
use thiserror::Error;

/// 请求处理阶段的错误
#[derive(Error, Debug)]
pub enum WebError {
    /// 没有匹配的路由 - 404
    #[error("Cannot {method} {path}")]
    NotFound { method: String, path: String },

    /// 请求体不是合法 JSON，或无法转换为目标类型 - 400
    #[error("Malformed request body: {message}")]
    MalformedBody { message: String },

    /// 参数校验失败 - 400
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// 业务代码抛出的带状态码异常
    #[error(transparent)]
    Http(#[from] HttpException),

    /// 未分类错误 - 500，细节只写日志
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl WebError {
    pub fn not_found(method: impl Into<String>, path: impl Into<String>) -> Self {
        WebError::NotFound {
            method: method.into(),
            path: path.into(),
        }
    }

    pub fn malformed_body(message: impl Into<String>) -> Self {
        WebError::MalformedBody {
            message: message.into(),
        }
    }

    /// 错误对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebError::NotFound { .. } => StatusCode::NOT_FOUND,
            WebError::MalformedBody { .. } => StatusCode::BAD_REQUEST,
            WebError::Validation(_) => StatusCode::BAD_REQUEST,
            WebError::Http(e) => e.status,
            WebError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// 业务异常，携带声明的状态码
///
/// ```rust,ignore
/// return Err(HttpException::not_found(format!("User with id {} not found", id)).into());
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct HttpException {
    pub status: StatusCode,
    pub message: String,
    /// 响应体中的 `error` 字段，缺省为 `Http Exception`
    pub error: Option<String>,
}

impl HttpException {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            error: None,
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }
}

pub type WebResult<T> = Result<T, WebError>;

/// 应用组装阶段的错误
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error("Duplicate route: {method} {template}")]
    DuplicateRoute { method: String, template: String },

    #[error("Invalid route template '{template}': {reason}")]
    InvalidTemplate { template: String, reason: String },

    #[error("Invalid schema for {method} {template}: {source}")]
    InvalidSchema {
        method: String,
        template: String,
        #[source]
        source: SchemaError,
    },

    #[error("Controller '{0}' is not registered in the container")]
    UnknownController(String),

    #[error("Route {method} {template} binds unknown path parameter '{param}'")]
    UnknownPathParam {
        method: String,
        template: String,
        param: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use griffin_validator::{Constraint, FieldError};

    #[test]
    fn test_status_codes() {
        assert_eq!(WebError::not_found("GET", "/x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(WebError::malformed_body("eof").status_code(), StatusCode::BAD_REQUEST);

        let validation = ValidationErrors::from(vec![FieldError::new(
            "a",
            Constraint::Required,
            "a is required",
        )]);
        assert_eq!(WebError::from(validation).status_code(), StatusCode::BAD_REQUEST);

        let http: WebError = HttpException::new(StatusCode::IM_A_TEAPOT, "teapot").into();
        assert_eq!(http.status_code(), StatusCode::IM_A_TEAPOT);

        let internal: WebError = anyhow::anyhow!("boom").into();
        assert_eq!(internal.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_not_found_message() {
        let error = WebError::not_found("GET", "/api/users/abc/extra");
        assert_eq!(error.to_string(), "Cannot GET /api/users/abc/extra");
    }
}
