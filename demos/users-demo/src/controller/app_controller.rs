use griffin_core::ServiceDescriptor;
use griffin_web::prelude::*;
use std::sync::Arc;

use crate::dto::CreateContactDto;
use crate::service::AppService;

/// `/api` 控制器
pub struct AppController {
    app_service: Arc<AppService>,
}

impl AppController {
    pub fn definition() -> ControllerDefinition {
        let descriptor = ServiceDescriptor::new("appController", |deps| {
            Ok(AppController {
                app_service: deps.get::<AppService>("appService")?,
            })
        })
        .depends_on(["appService"]);

        ControllerDefinition::new(descriptor, "/api")
            .get("/", "getHello", vec![], handler_fn(Self::get_hello))
            .get("/users", "getUsers", vec![], handler_fn(Self::get_users))
            .get(
                "/users/:id",
                "getUser",
                vec![ParameterBinding::path("id")],
                handler_fn(Self::get_user),
            )
            .post(
                "/users",
                "createUser",
                vec![ParameterBinding::body(CreateContactDto::schema())],
                handler_fn(Self::create_user),
            )
            .get("/error", "throwError", vec![], handler_fn(Self::throw_error))
    }

    async fn get_hello(self: Arc<Self>, _args: Args) -> WebResult<ResponseEntity> {
        Ok(ResponseEntity::ok(json!({ "message": self.app_service.hello() })))
    }

    async fn get_users(self: Arc<Self>, _args: Args) -> WebResult<ResponseEntity> {
        ResponseEntity::json(StatusCode::OK, &self.app_service.list())
    }

    async fn get_user(self: Arc<Self>, args: Args) -> WebResult<ResponseEntity> {
        let id = args.path(0)?;
        match self.app_service.find(id) {
            Some(contact) => ResponseEntity::json(StatusCode::OK, &contact),
            None => Err(HttpException::not_found(format!("User with id {} not found", id)).into()),
        }
    }

    async fn create_user(self: Arc<Self>, args: Args) -> WebResult<ResponseEntity> {
        let dto: CreateContactDto = args.body(0)?;
        ResponseEntity::json(StatusCode::CREATED, &self.app_service.create(dto))
    }

    async fn throw_error(self: Arc<Self>, _args: Args) -> WebResult<ResponseEntity> {
        Err(anyhow::anyhow!("This is a test error").into())
    }
}
