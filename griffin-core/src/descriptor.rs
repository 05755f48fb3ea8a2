use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{ContainerError, ContainerResult};

/// 容器中共享的单例实例
pub type SharedInstance = Arc<dyn Any + Send + Sync>;

/// 服务构造函数
///
/// 构造函数只能通过 [`Injector`] 拿到已声明的依赖
pub type ServiceConstructor =
    Box<dyn Fn(&Injector<'_>) -> anyhow::Result<SharedInstance> + Send + Sync>;

/// 服务描述符 - 描述如何创建一个单例服务
///
/// 描述符在应用组装阶段注册一次，由容器在 `build()` 时按拓扑顺序实例化。
///
/// # 示例
///
/// ```rust,ignore
/// let repo = ServiceDescriptor::new("userRepository", |_| Ok(UserRepository::default()));
/// let service = ServiceDescriptor::new("userService", |deps| {
///     Ok(UserService::new(deps.get::<UserRepository>("userRepository")?))
/// })
/// .depends_on(["userRepository"]);
/// ```
pub struct ServiceDescriptor {
    /// 服务名称（容器内唯一）
    pub name: String,

    /// 构造依赖列表（有序，去重）
    pub dependencies: Vec<String>,

    type_id: TypeId,
    type_name: &'static str,
    constructor: ServiceConstructor,
}

impl ServiceDescriptor {
    /// 使用构造函数创建描述符
    pub fn new<T, F>(name: impl Into<String>, constructor: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&Injector<'_>) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            dependencies: Vec::new(),
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            constructor: Box::new(move |injector| {
                let instance = constructor(injector)?;
                Ok(Arc::new(instance) as SharedInstance)
            }),
        }
    }

    /// 注册一个已经构造好的实例（例如 Environment、配置对象）
    pub fn instance<T>(name: impl Into<String>, value: Arc<T>) -> Self
    where
        T: Any + Send + Sync,
    {
        Self {
            name: name.into(),
            dependencies: Vec::new(),
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            constructor: Box::new(move |_| Ok(Arc::clone(&value) as SharedInstance)),
        }
    }

    /// 声明依赖
    pub fn depends_on<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for dependency in dependencies {
            let dependency = dependency.into();
            if !self.dependencies.contains(&dependency) {
                self.dependencies.push(dependency);
            }
        }
        self
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub(crate) fn construct(&self, injector: &Injector<'_>) -> ContainerResult<SharedInstance> {
        (self.constructor)(injector).map_err(|e| match e.downcast::<ContainerError>() {
            Ok(container_error) => container_error,
            Err(source) => ContainerError::CreationFailed {
                name: self.name.clone(),
                source,
            },
        })
    }
}

impl fmt::Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDescriptor")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("dependencies", &self.dependencies)
            .finish()
    }
}

/// 构造期注入器
///
/// 只暴露正在构造的服务所声明的依赖，且这些依赖此时一定已经构造完成。
pub struct Injector<'a> {
    service: &'a str,
    declared: &'a [String],
    instances: &'a HashMap<String, SharedInstance>,
}

impl<'a> Injector<'a> {
    pub(crate) fn new(
        service: &'a str,
        declared: &'a [String],
        instances: &'a HashMap<String, SharedInstance>,
    ) -> Self {
        Self {
            service,
            declared,
            instances,
        }
    }

    /// 正在构造的服务名称
    pub fn service_name(&self) -> &str {
        self.service
    }

    /// 获取一个已声明的依赖
    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> ContainerResult<Arc<T>> {
        if !self.declared.iter().any(|d| d == name) {
            return Err(ContainerError::UndeclaredDependency {
                service: self.service.to_string(),
                dependency: name.to_string(),
            });
        }

        let instance = self
            .instances
            .get(name)
            .cloned()
            .ok_or_else(|| ContainerError::ServiceNotFound(name.to_string()))?;

        instance
            .downcast::<T>()
            .map_err(|_| ContainerError::TypeMismatch {
                name: name.to_string(),
                expected: std::any::type_name::<T>().to_string(),
            })
    }
}
