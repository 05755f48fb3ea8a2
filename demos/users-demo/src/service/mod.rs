pub mod app_service;
pub mod custom_validation_service;
pub mod user_service;

pub use app_service::{AppService, Contact};
pub use custom_validation_service::CustomValidationService;
pub use user_service::{User, UserService};
