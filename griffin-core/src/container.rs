use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use crate::dependency::DependencyGraph;
use crate::descriptor::{Injector, ServiceDescriptor, SharedInstance};
use crate::error::{ContainerError, ContainerResult};

/// 依赖注入容器
///
/// 容器分两个阶段使用：
/// 1. 组装阶段 - 通过 [`Container::register`] 注册所有服务描述符
/// 2. 构建阶段 - [`Container::build`] 按拓扑顺序构造全部单例，之后只读
///
/// 构建完成后容器通常被包装进 `Arc` 在所有请求之间共享。
/// 单例实例本身如果持有可变状态，需要自行保证内部同步。
#[derive(Default)]
pub struct Container {
    /// 服务描述符（保持注册顺序）
    descriptors: Vec<ServiceDescriptor>,

    /// 名称到描述符下标的映射
    index: HashMap<String, usize>,

    /// 类型到名称的映射（同一类型可能注册多个名称）
    type_to_names: HashMap<TypeId, Vec<String>>,

    /// 单例缓存
    singletons: HashMap<String, SharedInstance>,

    /// 构造顺序（build 之后有效）
    construction_order: Vec<String>,

    built: bool,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册服务描述符
    pub fn register(&mut self, descriptor: ServiceDescriptor) -> ContainerResult<()> {
        if self.built {
            return Err(ContainerError::AlreadyBuilt);
        }

        let name = descriptor.name.clone();
        if self.index.contains_key(&name) {
            tracing::warn!("Service '{}' already exists, registration failed", name);
            return Err(ContainerError::DuplicateService(name));
        }

        tracing::trace!(
            "Registering service: name='{}', type='{}', dependencies={:?}",
            name,
            descriptor.type_name(),
            descriptor.dependencies
        );

        self.type_to_names
            .entry(descriptor.type_id())
            .or_default()
            .push(name.clone());
        self.index.insert(name, self.descriptors.len());
        self.descriptors.push(descriptor);
        Ok(())
    }

    /// 构建容器：校验依赖图并按拓扑顺序构造所有单例
    ///
    /// 任何一个构造函数失败都会丢弃已经构造的实例，容器保持未构建状态。
    pub fn build(&mut self) -> ContainerResult<()> {
        if self.built {
            return Err(ContainerError::AlreadyBuilt);
        }

        let graph = DependencyGraph::new(
            self.descriptors
                .iter()
                .map(|d| (d.name.as_str(), d.dependencies.as_slice())),
        )?;
        let order = graph.topological_order().map_err(|e| {
            tracing::error!("Dependency validation failed: {}", e);
            e
        })?;

        let mut singletons: HashMap<String, SharedInstance> = HashMap::new();
        let mut construction_order = Vec::with_capacity(order.len());

        for idx in order {
            let descriptor = &self.descriptors[idx];
            tracing::debug!("Creating shared instance of singleton service '{}'", descriptor.name);

            let injector = Injector::new(&descriptor.name, &descriptor.dependencies, &singletons);
            let instance = descriptor.construct(&injector).map_err(|e| {
                tracing::error!("Failed to create service '{}': {}", descriptor.name, e);
                e
            })?;

            singletons.insert(descriptor.name.clone(), instance);
            construction_order.push(descriptor.name.clone());
        }

        tracing::info!("Container built with {} singleton service(s)", singletons.len());

        self.singletons = singletons;
        self.construction_order = construction_order;
        self.built = true;
        Ok(())
    }

    pub fn is_built(&self) -> bool {
        self.built
    }

    /// 按名称获取单例（类型擦除）
    pub fn resolve_any(&self, name: &str) -> ContainerResult<SharedInstance> {
        if !self.built {
            tracing::error!("resolve('{}') called before the container was built", name);
            return Err(ContainerError::NotBuilt(name.to_string()));
        }

        self.singletons.get(name).cloned().ok_or_else(|| {
            tracing::debug!("Service '{}' not found in container", name);
            ContainerError::ServiceNotFound(name.to_string())
        })
    }

    /// 按名称获取单例
    pub fn resolve_named<T: Any + Send + Sync>(&self, name: &str) -> ContainerResult<Arc<T>> {
        self.resolve_any(name)?
            .downcast::<T>()
            .map_err(|_| ContainerError::TypeMismatch {
                name: name.to_string(),
                expected: std::any::type_name::<T>().to_string(),
            })
    }

    /// 按类型获取单例
    ///
    /// 同一类型注册了多个名称时返回 [`ContainerError::AmbiguousType`]。
    pub fn resolve<T: Any + Send + Sync>(&self) -> ContainerResult<Arc<T>> {
        let type_name = std::any::type_name::<T>();
        let names = self
            .type_to_names
            .get(&TypeId::of::<T>())
            .ok_or_else(|| ContainerError::ServiceNotFound(type_name.to_string()))?;

        match names.as_slice() {
            [name] => self.resolve_named::<T>(name),
            _ => Err(ContainerError::AmbiguousType {
                type_name: type_name.to_string(),
                candidates: names.clone(),
            }),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// 所有已注册服务名称（注册顺序）
    pub fn service_names(&self) -> Vec<&str> {
        self.descriptors.iter().map(|d| d.name.as_str()).collect()
    }

    /// 实际的构造顺序（build 之前为空）
    pub fn construction_order(&self) -> &[String] {
        &self.construction_order
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("descriptors", &self.descriptors)
            .field("built", &self.built)
            .finish()
    }
}
