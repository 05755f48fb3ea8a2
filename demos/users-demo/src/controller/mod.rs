pub mod app_controller;
pub mod custom_validation_controller;
pub mod users_controller;

pub use app_controller::AppController;
pub use custom_validation_controller::CustomValidationController;
pub use users_controller::UsersController;
