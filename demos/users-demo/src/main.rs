//! Griffin 示例应用
//!
//! 运行：`cargo run -p users-demo`，然后访问 http://localhost:3002/api

mod controller;
mod dto;
mod module;
mod service;

use griffin_core::GriffinApplication;
use griffin_web::prelude::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let environment = GriffinApplication::new("users-demo")
        .config_file("demos/users-demo/application.toml")
        .bootstrap()?;

    WebApplication::new()
        .environment(environment)
        .module(module::app_module())
        .global_interceptor(LoggingInterceptor)
        .global_interceptor(ResponseInterceptor)
        .global_filter(HttpExceptionFilter)
        .run()
        .await
}
