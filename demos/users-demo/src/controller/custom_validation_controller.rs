use griffin_core::ServiceDescriptor;
use griffin_web::prelude::*;
use std::sync::Arc;

use crate::dto::{CustomValidationDto, SearchQueryDto};
use crate::service::CustomValidationService;

/// `/api/custom` 控制器，演示 Schema 校验
pub struct CustomValidationController {
    service: Arc<CustomValidationService>,
}

impl CustomValidationController {
    pub fn definition() -> ControllerDefinition {
        let descriptor = ServiceDescriptor::new("customValidationController", |deps| {
            Ok(CustomValidationController {
                service: deps.get::<CustomValidationService>("customValidationService")?,
            })
        })
        .depends_on(["customValidationService"]);

        ControllerDefinition::new(descriptor, "/api/custom")
            .get("/", "getInfo", vec![], handler_fn(Self::get_info))
            .post(
                "/validate",
                "validateCustomData",
                vec![ParameterBinding::body(CustomValidationDto::schema())],
                handler_fn(Self::validate_custom_data),
            )
            .post(
                "/search",
                "searchWithValidation",
                vec![ParameterBinding::body(SearchQueryDto::schema())],
                handler_fn(Self::search_with_validation),
            )
            .get("/examples", "getValidationExamples", vec![], handler_fn(Self::get_examples))
    }

    async fn get_info(self: Arc<Self>, _args: Args) -> WebResult<ResponseEntity> {
        Ok(ResponseEntity::ok(json!({
            "success": true,
            "message": "Griffin 自定义验证功能示例",
            "features": [
                "Schema 构建器",
                "自定义错误消息",
                "联合类型验证",
                "嵌套对象验证",
                "中国手机号验证",
                "UUID 验证",
                "地理坐标验证",
                "默认值填充",
            ],
            "endpoints": {
                "POST /api/custom/validate": "测试自定义验证",
                "POST /api/custom/search": "测试搜索参数验证",
                "GET /api/custom/examples": "获取验证示例",
            },
        })))
    }

    async fn validate_custom_data(self: Arc<Self>, args: Args) -> WebResult<ResponseEntity> {
        let data: CustomValidationDto = args.body(0)?;
        let result = self.service.process_custom_data(&data);

        let phone_number = match &data.phone_number {
            Some(phone) => format!("手机号 \"{}\" 通过中国手机号验证", phone),
            None => "未提供手机号".to_string(),
        };
        let location = match &data.location {
            Some(loc) => format!("坐标 ({}, {}) 验证通过", loc.lat, loc.lng),
            None => "未提供坐标".to_string(),
        };
        let emails = match &data.emails {
            Some(emails) => format!("邮箱列表包含 {} 个地址", emails.len()),
            None => "未提供邮箱".to_string(),
        };

        Ok(ResponseEntity::ok(json!({
            "success": true,
            "message": "自定义验证通过！",
            "result": result,
            "validationInfo": {
                "username": format!("用户名 \"{}\" 通过正则验证", data.username),
                "role": format!("角色 \"{}\" 通过联合类型验证", data.role),
                "userId": format!("UUID \"{}\" 格式验证通过", data.user_id),
                "phoneNumber": phone_number,
                "location": location,
                "emails": emails,
            },
        })))
    }

    async fn search_with_validation(self: Arc<Self>, args: Args) -> WebResult<ResponseEntity> {
        let query: SearchQueryDto = args.body(0)?;
        let result = self.service.process_search(&query);

        let pagination = match &query.pagination {
            Some(pagination) => json!(pagination),
            None => json!("使用默认分页"),
        };

        Ok(ResponseEntity::ok(json!({
            "success": true,
            "message": "搜索参数验证通过！",
            "result": result,
            "validationInfo": {
                "query": query.q.as_deref().unwrap_or("无搜索关键词"),
                "pagination": pagination,
            },
        })))
    }

    async fn get_examples(self: Arc<Self>, _args: Args) -> WebResult<ResponseEntity> {
        Ok(ResponseEntity::ok(json!({
            "success": true,
            "message": "自定义验证示例",
            "examples": {
                "customValidation": {
                    "description": "POST /api/custom/validate",
                    "validExample": {
                        "username": "john_doe123",
                        "role": "user",
                        "userId": "123e4567-e89b-12d3-a456-426614174000",
                        "phoneNumber": "13812345678",
                        "location": {"lat": 39.9042, "lng": 116.4074},
                        "emails": ["john@example.com", "john.doe@company.com"],
                    },
                    "invalidExample": {
                        "username": "a",
                        "role": "invalid_role",
                        "userId": "not-a-uuid",
                        "phoneNumber": "123456",
                        "location": {"lat": 200, "lng": 200},
                        "emails": ["invalid-email", "another@invalid"],
                    },
                },
                "searchValidation": {
                    "description": "POST /api/custom/search",
                    "validExample": {
                        "q": "Rust",
                        "pagination": {
                            "page": 1,
                            "limit": 10,
                            "sort": "createdAt",
                            "order": "desc"
                        },
                    },
                    "invalidExample": {
                        "q": 123,
                        "pagination": {"page": 0, "limit": 1000, "order": "invalid"},
                    },
                },
            },
            "schemaFeatures": {
                "basicTypes": [
                    "Schema::string()",
                    "Schema::number()",
                    "Schema::boolean()",
                    "Schema::array()"
                ],
                "advancedTypes": [
                    "Schema::union()",
                    "Schema::object()",
                    "Schema::enumeration()",
                    ".optional()"
                ],
                "formats": ["email", "date", "date-time", "uri", "uuid", "cn-phone"],
                "constraints": ["正则表达式验证", "长度限制", "数值范围", "枚举值", "默认值"],
            },
        })))
    }
}
