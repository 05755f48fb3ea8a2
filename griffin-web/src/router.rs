//! 路由注册表
//!
//! 启动阶段注册，之后只读，可在请求间无锁共享。

use axum::http::Method;
use griffin_validator::Validator;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::error::{ConfigurationError, WebError, WebResult};
use crate::route::{split_path, Handler, ParameterBinding, PathTemplate, RouteEntry};

/// 路由匹配结果
#[derive(Debug)]
pub struct RouteMatch<'r> {
    pub entry: &'r RouteEntry,
    pub params: HashMap<String, String>,
}

/// 路由注册表
#[derive(Debug, Default)]
pub struct RouteRegistry {
    routes: Vec<RouteEntry>,
    keys: HashSet<(Method, String)>,
    validator: Validator,
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用指定的校验器检查 body Schema（例如注册了自定义格式）
    pub fn with_validator(validator: Validator) -> Self {
        Self {
            validator,
            ..Self::default()
        }
    }

    /// 注册路由
    ///
    /// 模板非法、Schema 非法、绑定了模板中不存在的路径参数，
    /// 或 (method, 规范化模板) 已存在时返回错误，注册表保持不变。
    pub fn register_route(
        &mut self,
        method: Method,
        template: &str,
        controller: impl Into<String>,
        handler_name: impl Into<String>,
        bindings: Vec<ParameterBinding>,
        handler: Arc<dyn Handler>,
    ) -> Result<&RouteEntry, ConfigurationError> {
        let template = PathTemplate::parse(template)?;

        for binding in &bindings {
            match binding {
                ParameterBinding::PathParam(name) if !template.has_param(name) => {
                    return Err(ConfigurationError::UnknownPathParam {
                        method: method.to_string(),
                        template: template.to_string(),
                        param: name.clone(),
                    });
                }
                ParameterBinding::Body(Some(schema)) => {
                    self.validator
                        .check_schema(schema)
                        .map_err(|source| ConfigurationError::InvalidSchema {
                            method: method.to_string(),
                            template: template.to_string(),
                            source,
                        })?;
                }
                _ => {}
            }
        }

        let key = (method.clone(), template.structural_key());
        if self.keys.contains(&key) {
            return Err(ConfigurationError::DuplicateRoute {
                method: method.to_string(),
                template: template.to_string(),
            });
        }

        self.keys.insert(key);
        self.routes.push(RouteEntry {
            method,
            template,
            controller: controller.into(),
            handler_name: handler_name.into(),
            bindings,
            handler,
        });

        let entry = &self.routes[self.routes.len() - 1];
        tracing::debug!(
            method = %entry.method,
            path = %entry.template,
            controller = %entry.controller,
            handler = %entry.handler_name,
            "Mapped route"
        );
        Ok(entry)
    }

    /// 解析请求路径
    ///
    /// 多个模板同时匹配时，在第一个不同位置上为字面量的模板胜出。
    pub fn resolve(&self, method: &Method, path: &str) -> WebResult<RouteMatch<'_>> {
        let segments = split_path(path);

        let mut best: Option<(Vec<bool>, RouteMatch<'_>)> = None;
        for entry in self.routes.iter().filter(|r| r.method == *method) {
            let Some(params) = entry.template.matches(&segments) else {
                continue;
            };
            let rank = entry.template.specificity();
            let better = match &best {
                Some((best_rank, _)) => rank < *best_rank,
                None => true,
            };
            if better {
                best = Some((rank, RouteMatch { entry, params }));
            }
        }

        best.map(|(_, matched)| matched)
            .ok_or_else(|| WebError::not_found(method.as_str(), path))
    }

    pub fn routes(&self) -> &[RouteEntry] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::Args;
    use crate::route::{handler_fn, ResponseEntity};
    use griffin_validator::Schema;
    use serde_json::json;

    struct Dummy;

    fn handler(tag: &'static str) -> Arc<dyn Handler> {
        handler_fn(move |_: Arc<Dummy>, _: Args| async move { Ok(ResponseEntity::ok(json!(tag))) })
    }

    fn register(
        registry: &mut RouteRegistry,
        method: Method,
        template: &str,
        name: &'static str,
    ) -> Result<(), ConfigurationError> {
        registry
            .register_route(method, template, "dummy", name, Vec::new(), handler(name))
            .map(|_| ())
    }

    #[test]
    fn test_resolve_binds_params() {
        let mut registry = RouteRegistry::new();
        registry
            .register_route(
                Method::GET,
                "/api/users/:id",
                "dummy",
                "getUser",
                vec![ParameterBinding::path("id")],
                handler("getUser"),
            )
            .unwrap();

        let matched = registry.resolve(&Method::GET, "/api/users/42").unwrap();
        assert_eq!(matched.entry.handler_name, "getUser");
        assert_eq!(matched.params.get("id").map(String::as_str), Some("42"));

        let trailing = registry.resolve(&Method::GET, "/api/users/42/").unwrap();
        assert_eq!(trailing.params.get("id").map(String::as_str), Some("42"));
    }

    #[test]
    fn test_unmatched_path_is_not_found() {
        let mut registry = RouteRegistry::new();
        register(&mut registry, Method::GET, "/api/users/:id", "getUser").unwrap();

        let error = registry.resolve(&Method::GET, "/api/users/abc/extra").unwrap_err();
        assert!(matches!(
            error,
            WebError::NotFound { ref path, .. } if path == "/api/users/abc/extra"
        ));

        assert!(registry.resolve(&Method::POST, "/api/users/1").is_err());
    }

    #[test]
    fn test_duplicate_route_leaves_registry_unchanged() {
        let mut registry = RouteRegistry::new();
        register(&mut registry, Method::GET, "/u/:id", "first").unwrap();

        let error = register(&mut registry, Method::GET, "/u/:uid/", "second").unwrap_err();
        assert!(matches!(error, ConfigurationError::DuplicateRoute { .. }));
        assert_eq!(registry.len(), 1);

        let matched = registry.resolve(&Method::GET, "/u/7").unwrap();
        assert_eq!(matched.entry.handler_name, "first");
        assert_eq!(matched.params.get("id").map(String::as_str), Some("7"));

        register(&mut registry, Method::POST, "/u/:id", "update").unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_literal_beats_param() {
        let mut registry = RouteRegistry::new();
        register(&mut registry, Method::GET, "/users/:id", "byId").unwrap();
        register(&mut registry, Method::GET, "/users/me", "me").unwrap();
        register(&mut registry, Method::GET, "/:section/me", "sectionMe").unwrap();

        assert_eq!(registry.resolve(&Method::GET, "/users/me").unwrap().entry.handler_name, "me");
        assert_eq!(registry.resolve(&Method::GET, "/users/9").unwrap().entry.handler_name, "byId");
        assert_eq!(
            registry.resolve(&Method::GET, "/groups/me").unwrap().entry.handler_name,
            "sectionMe"
        );
    }

    #[test]
    fn test_rejects_invalid_definitions() {
        let mut registry = RouteRegistry::new();

        let error = registry
            .register_route(
                Method::GET,
                "/users/:id",
                "dummy",
                "get",
                vec![ParameterBinding::path("uid")],
                handler("get"),
            )
            .unwrap_err();
        assert!(matches!(error, ConfigurationError::UnknownPathParam { .. }));

        let error = registry
            .register_route(
                Method::POST,
                "/users",
                "dummy",
                "create",
                vec![ParameterBinding::body(Schema::string().pattern("(unclosed"))],
                handler("create"),
            )
            .unwrap_err();
        assert!(matches!(error, ConfigurationError::InvalidSchema { .. }));

        assert!(registry.is_empty());
    }
}
