//! 统一的错误处理类型
//!
//! 容器相关的错误使用 [`ContainerError`] 表示，应用启动阶段（配置、日志）
//! 的错误使用 [`ApplicationError`] 表示。两者都是结构化错误，
//! 调用方可以按变体进行匹配，而不是解析错误字符串。

use thiserror::Error;

/// 依赖注入容器错误
#[derive(Debug, Error)]
pub enum ContainerError {
    /// 同名服务重复注册
    #[error("Service '{0}' is already registered")]
    DuplicateService(String),

    /// 依赖图中存在环
    #[error("Cyclic dependency detected: {}", .cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },

    /// 依赖的服务从未注册
    #[error("Service '{service}' depends on '{missing}' which is not registered")]
    UnresolvedDependency { service: String, missing: String },

    /// 构造函数请求了未在依赖列表中声明的服务
    #[error("Service '{service}' requested undeclared dependency '{dependency}'")]
    UndeclaredDependency { service: String, dependency: String },

    /// 在 build() 之前调用了 resolve()
    #[error("Container has not been built yet; call build() before resolving '{0}'")]
    NotBuilt(String),

    /// 重复调用 build()
    #[error("Container has already been built")]
    AlreadyBuilt,

    /// 服务不存在
    #[error("Service not found: {0}")]
    ServiceNotFound(String),

    /// 同一类型注册了多个服务，无法按类型解析
    #[error("Type '{type_name}' is ambiguous, candidates: {}", .candidates.join(", "))]
    AmbiguousType {
        type_name: String,
        candidates: Vec<String>,
    },

    /// 类型不匹配
    #[error("Type mismatch for service '{name}': expected {expected}")]
    TypeMismatch { name: String, expected: String },

    /// 构造函数执行失败
    #[error("Failed to create service '{name}': {source}")]
    CreationFailed {
        name: String,
        #[source]
        source: anyhow::Error,
    },
}

pub type ContainerResult<T> = std::result::Result<T, ContainerError>;

/// 应用启动错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInitFailed(String),

    #[error("Failed to load configuration: {0}")]
    ConfigurationLoadFailed(String),

    #[error(transparent)]
    Container(#[from] ContainerError),
}

pub type ApplicationResult<T> = std::result::Result<T, ApplicationError>;
