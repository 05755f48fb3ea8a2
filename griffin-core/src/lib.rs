// griffin-core: 显式依赖图驱动的单例容器
//
// 提供：
// - 声明式服务注册（ServiceDescriptor）
// - 拓扑排序构建，循环依赖与缺失依赖在启动时即报错
// - 分层配置（TOML / 环境变量 / 内存）
// - 基于 tracing 的日志初始化

pub mod app;
pub mod config;
pub mod container;
pub mod dependency;
pub mod descriptor;
pub mod error;
pub mod logging;

pub use app::GriffinApplication;
pub use config::{
    ConfigValue, Environment, EnvironmentPropertySource, MapPropertySource, PropertySource,
    TomlPropertySource,
};
pub use container::Container;
pub use descriptor::{Injector, ServiceDescriptor, SharedInstance};
pub use error::{ApplicationError, ApplicationResult, ContainerError, ContainerResult};
pub use logging::{LogFormat, LogLevel, LoggingConfig};

/// Prelude 模块，包含常用的类型
pub mod prelude {
    pub use crate::app::GriffinApplication;
    pub use crate::config::{ConfigValue, Environment, MapPropertySource, PropertySource};
    pub use crate::container::Container;
    pub use crate::descriptor::{Injector, ServiceDescriptor};
    pub use crate::error::{ApplicationError, ApplicationResult, ContainerError, ContainerResult};
    pub use crate::logging::{LogFormat, LogLevel, LoggingConfig};
    pub use anyhow::{anyhow, Context};
}
