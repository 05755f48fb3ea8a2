//! 请求与请求上下文
//!
//! [`Request`] 是传输层无关的入站请求；[`RequestContext`] 是单次请求的共享句柄，
//! 在响应发送后释放。

use axum::extract::Query;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use http::{HeaderMap, HeaderName, HeaderValue, Method, Uri};
use std::collections::HashMap;
use std::time::Instant;

/// 入站请求
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub query: HashMap<String, String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Request {
    /// 由方法和 `path?query` 构造请求
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.parse::<Uri>() {
            Ok(uri) => (uri.path().to_string(), parse_query(&uri)),
            Err(_) => (target.to_string(), HashMap::new()),
        };

        Self {
            method,
            path,
            query,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// 由已经解析好的各部分构造
    pub fn from_parts(method: Method, uri: &Uri, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            method,
            path: uri.path().to_string(),
            query: parse_query(uri),
            headers,
            body,
        }
    }

    pub fn get(target: &str) -> Self {
        Self::new(Method::GET, target)
    }

    pub fn post(target: &str) -> Self {
        Self::new(Method::POST, target)
    }

    pub fn put(target: &str) -> Self {
        Self::new(Method::PUT, target)
    }

    pub fn delete(target: &str) -> Self {
        Self::new(Method::DELETE, target)
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_json(self, value: &serde_json::Value) -> Self {
        self.with_header(http::header::CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .with_body(value.to_string())
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

fn parse_query(uri: &Uri) -> HashMap<String, String> {
    Query::<HashMap<String, String>>::try_from_uri(uri)
        .map(|Query(query)| query)
        .unwrap_or_default()
}

/// 单次请求的上下文
///
/// 通过 `Arc` 在拦截器和处理器之间共享，不可变。
#[derive(Debug)]
pub struct RequestContext {
    request_id: String,
    request: Request,
    params: HashMap<String, String>,
    received_at: DateTime<Utc>,
    started: Instant,
}

impl RequestContext {
    pub fn new(request: Request, params: HashMap<String, String>) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            request,
            params,
            received_at: Utc::now(),
            started: Instant::now(),
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn method(&self) -> &Method {
        &self.request.method
    }

    pub fn path(&self) -> &str {
        &self.request.path
    }

    pub fn body(&self) -> &Bytes {
        &self.request.body
    }

    pub fn query(&self, key: &str) -> Option<&str> {
        self.request.query.get(key).map(String::as_str)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.request.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// 路由匹配得到的路径参数
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    pub(crate) fn set_params(&mut self, params: HashMap<String, String>) {
        self.params = params;
    }

    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.started.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_parses_target() {
        let request = Request::get("/api/custom/search?q=rust&page=2");
        assert_eq!(request.path, "/api/custom/search");
        assert_eq!(request.query.get("q").map(String::as_str), Some("rust"));
        assert_eq!(request.query.get("page").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_query_is_percent_decoded() {
        let request = Request::get("/search?q=hello%20world");
        assert_eq!(request.query.get("q").map(String::as_str), Some("hello world"));
    }

    #[test]
    fn test_context_accessors() {
        let request = Request::post("/users/7?verbose=true")
            .with_json(&serde_json::json!({"name": "x"}))
            .with_header(HeaderName::from_static("x-trace"), HeaderValue::from_static("abc"));
        let mut params = HashMap::new();
        params.insert("id".to_string(), "7".to_string());

        let ctx = RequestContext::new(request, params);
        assert_eq!(ctx.param("id"), Some("7"));
        assert_eq!(ctx.query("verbose"), Some("true"));
        assert_eq!(ctx.header("x-trace"), Some("abc"));
        assert_eq!(ctx.header("content-type"), Some("application/json"));
        assert_eq!(ctx.method(), Method::POST);
        assert_eq!(ctx.request_id().len(), 36);
    }
}
