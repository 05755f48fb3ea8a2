use griffin_core::ServiceDescriptor;
use griffin_web::Module;

use crate::controller::{AppController, CustomValidationController, UsersController};
use crate::service::{AppService, CustomValidationService, UserService};

pub fn custom_validation_module() -> Module {
    Module::new()
        .provider(ServiceDescriptor::new("customValidationService", |_| {
            Ok(CustomValidationService)
        }))
        .controller(CustomValidationController::definition())
}

/// 根模块
pub fn app_module() -> Module {
    Module::new()
        .provider(ServiceDescriptor::new("appService", |_| Ok(AppService::new())))
        .provider(ServiceDescriptor::new("userService", |_| Ok(UserService::new())))
        .controller(AppController::definition())
        .controller(UsersController::definition())
        .import(custom_validation_module())
}
