use griffin_core::ServiceDescriptor;
use griffin_web::prelude::*;
use std::sync::Arc;

use crate::dto::{CreateUserDto, UpdateUserDto};
use crate::service::UserService;

/// `/users` 控制器，响应体自带 `{success, data, message}`
pub struct UsersController {
    user_service: Arc<UserService>,
}

impl UsersController {
    pub fn definition() -> ControllerDefinition {
        let descriptor = ServiceDescriptor::new("usersController", |deps| {
            Ok(UsersController {
                user_service: deps.get::<UserService>("userService")?,
            })
        })
        .depends_on(["userService"]);

        ControllerDefinition::new(descriptor, "/users")
            .get("/", "getAllUsers", vec![], handler_fn(Self::get_all_users))
            .get(
                "/:id",
                "getUser",
                vec![ParameterBinding::context()],
                handler_fn(Self::get_user),
            )
            .post(
                "/",
                "createUser",
                vec![ParameterBinding::body(CreateUserDto::schema())],
                handler_fn(Self::create_user),
            )
            .post(
                "/:id",
                "updateUser",
                vec![
                    ParameterBinding::path("id"),
                    ParameterBinding::body(UpdateUserDto::schema()),
                ],
                handler_fn(Self::update_user),
            )
            .delete(
                "/:id",
                "removeUser",
                vec![ParameterBinding::path("id")],
                handler_fn(Self::remove_user),
            )
    }

    async fn get_all_users(self: Arc<Self>, _args: Args) -> WebResult<ResponseEntity> {
        Ok(ResponseEntity::ok(json!({
            "success": true,
            "data": self.user_service.find_all(),
            "message": "Users retrieved successfully",
        })))
    }

    /// 非数字 id 与不存在的用户一样返回 404
    async fn get_user(self: Arc<Self>, args: Args) -> WebResult<ResponseEntity> {
        let ctx = args.context(0)?;
        let user = ctx
            .param("id")
            .and_then(|id| id.parse::<u32>().ok())
            .and_then(|id| self.user_service.find_one(id));

        Ok(match user {
            Some(user) => ResponseEntity::ok(json!({
                "success": true,
                "data": user,
                "message": "User retrieved successfully",
            })),
            None => ResponseEntity::new(
                StatusCode::NOT_FOUND,
                json!({
                    "success": false,
                    "message": "User not found",
                }),
            ),
        })
    }

    async fn create_user(self: Arc<Self>, args: Args) -> WebResult<ResponseEntity> {
        let dto: CreateUserDto = args.body(0)?;
        Ok(ResponseEntity::ok(json!({
            "success": true,
            "data": self.user_service.create(dto),
            "message": "User created successfully",
        })))
    }

    async fn update_user(self: Arc<Self>, args: Args) -> WebResult<ResponseEntity> {
        let id: u32 = args.path_as(0)?;
        let dto: UpdateUserDto = args.body(1)?;
        let user = self.user_service.update(id, dto)?;
        Ok(ResponseEntity::ok(json!({
            "success": true,
            "data": user,
            "message": "User updated successfully",
        })))
    }

    async fn remove_user(self: Arc<Self>, args: Args) -> WebResult<ResponseEntity> {
        let id: u32 = args.path_as(0)?;
        let user = self
            .user_service
            .remove(id)
            .map_err(|_| HttpException::not_found(format!("User with id {} not found", id)))?;
        Ok(ResponseEntity::ok(json!({
            "success": true,
            "data": user,
            "message": "User removed successfully",
        })))
    }
}
