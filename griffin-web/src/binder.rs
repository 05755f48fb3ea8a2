//! 参数绑定
//!
//! 按路由声明的 [`ParameterBinding`] 顺序构造处理器参数。
//! 请求体只解析一次；所有 body 绑定都会被校验，错误汇总后一次性返回。

use bytes::Bytes;
use griffin_validator::{ValidationErrors, Validator};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{HttpException, WebError, WebResult};
use crate::request::RequestContext;
use crate::route::{ParameterBinding, RouteEntry};

/// 已绑定的单个参数
#[derive(Debug, Clone)]
pub enum Arg {
    Path(String),
    Query(Option<String>),
    Body(Value),
    Context(Arc<RequestContext>),
}

/// 处理器参数列表，顺序与路由声明的绑定一致
#[derive(Debug, Clone, Default)]
pub struct Args {
    values: Vec<Arg>,
}

impl Args {
    pub fn new(values: Vec<Arg>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Arg> {
        self.values.get(index)
    }

    pub fn path(&self, index: usize) -> WebResult<&str> {
        match self.values.get(index) {
            Some(Arg::Path(value)) => Ok(value),
            other => Err(mismatch(index, "path parameter", other)),
        }
    }

    /// 路径参数转换为目标类型，失败时返回 400
    pub fn path_as<T: FromStr>(&self, index: usize) -> WebResult<T> {
        let raw = self.path(index)?;
        raw.parse::<T>().map_err(|_| {
            HttpException::bad_request(format!("Invalid path parameter: {}", raw)).into()
        })
    }

    pub fn query(&self, index: usize) -> WebResult<Option<&str>> {
        match self.values.get(index) {
            Some(Arg::Query(value)) => Ok(value.as_deref()),
            other => Err(mismatch(index, "query parameter", other)),
        }
    }

    pub fn body_value(&self, index: usize) -> WebResult<&Value> {
        match self.values.get(index) {
            Some(Arg::Body(value)) => Ok(value),
            other => Err(mismatch(index, "request body", other)),
        }
    }

    /// 反序列化为 DTO，结构不符时返回 `MalformedBody`
    pub fn body<T: DeserializeOwned>(&self, index: usize) -> WebResult<T> {
        let value = self.body_value(index)?;
        T::deserialize(value).map_err(|e| WebError::malformed_body(e.to_string()))
    }

    pub fn context(&self, index: usize) -> WebResult<Arc<RequestContext>> {
        match self.values.get(index) {
            Some(Arg::Context(ctx)) => Ok(Arc::clone(ctx)),
            other => Err(mismatch(index, "request context", other)),
        }
    }
}

fn mismatch(index: usize, expected: &str, actual: Option<&Arg>) -> WebError {
    let actual = match actual {
        Some(Arg::Path(_)) => "path parameter",
        Some(Arg::Query(_)) => "query parameter",
        Some(Arg::Body(_)) => "request body",
        Some(Arg::Context(_)) => "request context",
        None => "nothing",
    };
    WebError::Internal(anyhow::anyhow!(
        "Argument {} is a {}, expected a {}",
        index,
        actual,
        expected
    ))
}

/// 参数绑定器
#[derive(Debug, Clone, Default)]
pub struct ParameterBinder {
    validator: Arc<Validator>,
}

impl ParameterBinder {
    pub fn new(validator: Arc<Validator>) -> Self {
        Self { validator }
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    pub fn bind(&self, route: &RouteEntry, ctx: &Arc<RequestContext>) -> WebResult<Args> {
        let mut body: Option<Value> = None;
        let mut errors = ValidationErrors::new();
        let mut values = Vec::with_capacity(route.bindings.len());

        for binding in &route.bindings {
            let arg = match binding {
                ParameterBinding::PathParam(name) => {
                    let value = ctx.param(name).ok_or_else(|| {
                        WebError::Internal(anyhow::anyhow!(
                            "Path parameter '{}' was not matched",
                            name
                        ))
                    })?;
                    Arg::Path(value.to_string())
                }
                ParameterBinding::Query(name) => Arg::Query(ctx.query(name).map(str::to_string)),
                ParameterBinding::RequestContext => Arg::Context(Arc::clone(ctx)),
                ParameterBinding::Body(schema) => {
                    let raw = match &body {
                        Some(value) => value.clone(),
                        None => {
                            let parsed = parse_body(ctx.body())?;
                            body = Some(parsed.clone());
                            parsed
                        }
                    };
                    match schema {
                        None => Arg::Body(raw),
                        Some(schema) => match self.validator.validate(schema, &raw) {
                            Ok(validated) => Arg::Body(validated),
                            Err(e) => {
                                errors.merge(e);
                                Arg::Body(raw)
                            }
                        },
                    }
                }
            };
            values.push(arg);
        }

        if !errors.is_empty() {
            tracing::debug!(
                handler = %route.handler_name,
                error_count = errors.len(),
                "Request body validation failed"
            );
            return Err(WebError::Validation(errors));
        }

        Ok(Args::new(values))
    }
}

/// 空请求体视为 `null`
fn parse_body(bytes: &Bytes) -> WebResult<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(bytes).map_err(|e| WebError::malformed_body(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Request;
    use crate::route::{handler_fn, PathTemplate, ResponseEntity};
    use axum::http::Method;
    use griffin_validator::{Constraint, Schema};
    use serde::Deserialize;
    use serde_json::json;
    use std::collections::HashMap;

    struct Dummy;

    fn route(template: &str, bindings: Vec<ParameterBinding>) -> RouteEntry {
        RouteEntry {
            method: Method::POST,
            template: PathTemplate::parse(template).unwrap(),
            controller: "dummy".to_string(),
            handler_name: "handle".to_string(),
            bindings,
            handler: handler_fn(|_: Arc<Dummy>, _: Args| async {
                Ok(ResponseEntity::no_content())
            }),
        }
    }

    fn context(request: Request, params: &[(&str, &str)]) -> Arc<RequestContext> {
        let params: HashMap<String, String> = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Arc::new(RequestContext::new(request, params))
    }

    fn user_schema() -> Schema {
        Schema::object()
            .field("name", Schema::string().length(2, 50))
            .field("email", Schema::string().format("email"))
            .field("age", Schema::number().range(0.0, 120.0))
            .into()
    }

    #[test]
    fn test_binds_in_declared_order() {
        let route = route(
            "/users/:id",
            vec![
                ParameterBinding::context(),
                ParameterBinding::path("id"),
                ParameterBinding::query("verbose"),
                ParameterBinding::query("missing"),
                ParameterBinding::body(user_schema()),
            ],
        );
        let request = Request::post("/users/7?verbose=1")
            .with_json(&json!({"name": "Ann", "email": "ann@example.com", "age": 30}));
        let ctx = context(request, &[("id", "7")]);

        let args = ParameterBinder::default().bind(&route, &ctx).unwrap();
        assert_eq!(args.len(), 5);
        assert_eq!(args.context(0).unwrap().request_id(), ctx.request_id());
        assert_eq!(args.path(1).unwrap(), "7");
        assert_eq!(args.path_as::<u32>(1).unwrap(), 7);
        assert_eq!(args.query(2).unwrap(), Some("1"));
        assert_eq!(args.query(3).unwrap(), None);
        assert_eq!(args.body_value(4).unwrap()["name"], "Ann");

        #[derive(Deserialize)]
        struct User {
            name: String,
            age: u8,
        }
        let user: User = args.body(4).unwrap();
        assert_eq!(user.name, "Ann");
        assert_eq!(user.age, 30);

        assert!(matches!(args.path(0), Err(WebError::Internal(_))));
    }

    #[test]
    fn test_missing_required_field_blocks_handler() {
        let route = route("/users", vec![ParameterBinding::body(user_schema())]);
        let ctx = context(
            Request::post("/users").with_json(&json!({"name": "Ann", "age": 30})),
            &[],
        );

        let error = ParameterBinder::default().bind(&route, &ctx).unwrap_err();
        let WebError::Validation(errors) = error else {
            panic!("expected validation error");
        };
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors()[0].field, "email");
        assert_eq!(errors.errors()[0].constraint, Constraint::Required);
    }

    #[test]
    fn test_reports_every_violation() {
        let route = route("/users", vec![ParameterBinding::body(user_schema())]);
        let ctx = context(
            Request::post("/users").with_json(&json!({"name": "A", "email": "nope", "age": 300})),
            &[],
        );

        let error = ParameterBinder::default().bind(&route, &ctx).unwrap_err();
        let WebError::Validation(errors) = error else {
            panic!("expected validation error");
        };
        assert!(errors.len() >= 3);
        assert!(errors.has_field("name"));
        assert!(errors.has_field("email"));
        assert!(errors.has_field("age"));
    }

    #[test]
    fn test_aggregates_errors_across_body_bindings() {
        let route = route(
            "/pair",
            vec![
                ParameterBinding::body(Schema::object().field("a", Schema::string())),
                ParameterBinding::body(Schema::object().field("b", Schema::number())),
            ],
        );
        let ctx = context(Request::post("/pair").with_json(&json!({})), &[]);

        let error = ParameterBinder::default().bind(&route, &ctx).unwrap_err();
        let WebError::Validation(errors) = error else {
            panic!("expected validation error");
        };
        assert!(errors.has_field("a"));
        assert!(errors.has_field("b"));
    }

    #[test]
    fn test_malformed_and_empty_bodies() {
        let schema_route = route("/users", vec![ParameterBinding::body(user_schema())]);
        let ctx = context(Request::post("/users").with_body("{not json"), &[]);
        assert!(matches!(
            ParameterBinder::default().bind(&schema_route, &ctx),
            Err(WebError::MalformedBody { .. })
        ));

        let raw_route = route("/echo", vec![ParameterBinding::raw_body()]);
        let ctx = context(Request::post("/echo"), &[]);
        let args = ParameterBinder::default().bind(&raw_route, &ctx).unwrap();
        assert_eq!(args.body_value(0).unwrap(), &Value::Null);

        let ctx = context(Request::post("/users"), &[]);
        let error = ParameterBinder::default()
            .bind(&schema_route, &ctx)
            .unwrap_err();
        let WebError::Validation(errors) = error else {
            panic!("expected validation error");
        };
        assert_eq!(errors.errors()[0].constraint, Constraint::Type);
    }

    #[test]
    fn test_body_shape_mismatch_is_malformed() {
        let route = route("/echo", vec![ParameterBinding::raw_body()]);
        let ctx = context(Request::post("/echo").with_json(&json!({"age": "old"})), &[]);
        let args = ParameterBinder::default().bind(&route, &ctx).unwrap();

        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Age {
            age: u32,
        }
        assert!(matches!(args.body::<Age>(0), Err(WebError::MalformedBody { .. })));
        assert!(matches!(args.path_as::<u32>(0), Err(WebError::Internal(_))));
    }
}
