use std::path::Path;
use std::sync::Arc;

use crate::config::{Environment, EnvironmentPropertySource, TomlPropertySource};
use crate::error::ApplicationResult;
use crate::logging::LoggingConfig;

/// 应用启动引导
///
/// 负责加载配置、初始化日志并打印 banner。容器与 Web 管道的组装
/// 由上层（例如 `griffin-web` 的 `WebApplication`）完成。
pub struct GriffinApplication {
    name: String,
    config_files: Vec<String>,
    env_prefix: String,
    profiles: Vec<String>,
    show_banner: bool,
    logging_config: Option<LoggingConfig>,
}

impl GriffinApplication {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config_files: vec!["application.toml".to_string()],
            env_prefix: "APP_".to_string(),
            profiles: Vec::new(),
            show_banner: true,
            logging_config: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config_file(mut self, path: impl Into<String>) -> Self {
        self.config_files = vec![path.into()];
        self
    }

    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn profiles(mut self, profiles: Vec<String>) -> Self {
        self.profiles = profiles;
        self
    }

    pub fn banner(mut self, show: bool) -> Self {
        self.show_banner = show;
        self
    }

    /// 不设置时从 Environment 的 `logging.*` 键和环境变量读取
    pub fn logging(mut self, config: LoggingConfig) -> Self {
        self.logging_config = Some(config);
        self
    }

    /// 加载配置并初始化日志
    pub fn bootstrap(self) -> ApplicationResult<Arc<Environment>> {
        let environment = Arc::new(self.load_environment()?);

        let logging = self
            .logging_config
            .clone()
            .unwrap_or_else(|| LoggingConfig::from_environment(&environment));
        logging.init()?;

        if self.show_banner {
            self.print_banner();
        }

        tracing::info!("Starting {} application", self.name);
        let profiles = environment.active_profiles();
        if profiles.is_empty() {
            tracing::info!("No active profiles set, using default configuration");
        } else {
            tracing::info!("Active profiles: {:?}", profiles);
        }

        Ok(environment)
    }

    /// 配置加载顺序（优先级从低到高）：
    /// `application.toml` -> `application-{profile}.toml` -> 环境变量
    pub fn load_environment(&self) -> ApplicationResult<Environment> {
        let environment = Environment::new();

        let mut profiles = self.profiles.clone();
        if profiles.is_empty() {
            if let Ok(value) = std::env::var(format!("{}PROFILES_ACTIVE", self.env_prefix)) {
                profiles = value
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
            }
        }

        for base in &self.config_files {
            Self::try_load(&environment, base, 0)?;
        }
        for (index, profile) in profiles.iter().enumerate() {
            for base in &self.config_files {
                let path = profile_config_path(base, profile);
                Self::try_load(&environment, &path, 10 + index as i32)?;
            }
        }

        environment.add_property_source(Box::new(EnvironmentPropertySource::new(&self.env_prefix)));
        environment.set_active_profiles(profiles);
        Ok(environment)
    }

    fn try_load(environment: &Environment, path: &str, priority: i32) -> ApplicationResult<()> {
        if !Path::new(path).exists() {
            return Ok(());
        }
        let source = TomlPropertySource::from_file(path)?.with_priority(priority);
        environment.add_property_source(Box::new(source));
        Ok(())
    }

    fn print_banner(&self) {
        println!();
        println!(r"   ____      _  __  __ _       ");
        println!(r"  / ___|_ __(_)/ _|/ _(_)_ __  ");
        println!(r" | |  _| '__| | |_| |_| | '_ \ ");
        println!(r" | |_| | |  | |  _|  _| | | | |");
        println!(r"  \____|_|  |_|_| |_| |_|_| |_|");
        println!();
        println!("  :: Griffin ::        (v{})", env!("CARGO_PKG_VERSION"));
        println!();
    }
}

/// `application.toml` -> `application-dev.toml`
fn profile_config_path(base: &str, profile: &str) -> String {
    match base.rfind('.') {
        Some(dot) => {
            let (name, ext) = base.split_at(dot);
            format!("{}-{}{}", name, profile, ext)
        }
        None => format!("{}-{}", base, profile),
    }
}
