use griffin_validator::{Schema, SchemaExt};
use serde::{Deserialize, Serialize};

// ==================== 用户 ====================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserDto {
    pub name: String,
    pub email: String,
    pub age: u32,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl CreateUserDto {
    pub fn schema() -> Schema {
        Schema::object()
            .field(
                "name",
                Schema::string().length(2, 50).message("用户名长度必须在2-50字符之间"),
            )
            .field("email", Schema::string().format("email").message("请输入有效的邮箱地址"))
            .field("age", age_schema())
            .field(
                "password",
                Schema::string().length(8, 100).message("密码长度必须在8-100字符之间"),
            )
            .optional_field("bio", Schema::string().message("个人简介必须是字符串"))
            .into()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUserDto {
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<u32>,
    pub bio: Option<String>,
}

impl UpdateUserDto {
    pub fn schema() -> Schema {
        Schema::object()
            .optional_field(
                "name",
                Schema::string().length(2, 50).message("用户名长度必须在2-50字符之间"),
            )
            .optional_field("email", Schema::string().format("email").message("请输入有效的邮箱地址"))
            .optional_field("age", age_schema())
            .optional_field("bio", Schema::string().message("个人简介必须是字符串"))
            .into()
    }
}

fn age_schema() -> Schema {
    Schema::integer().range(0.0, 120.0).message("年龄必须是0-120之间的整数")
}

/// `POST /api/users` 的请求体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateContactDto {
    pub name: String,
    pub email: String,
}

impl CreateContactDto {
    pub fn schema() -> Schema {
        Schema::object()
            .field("name", Schema::string().min_length(1))
            .field("email", Schema::string().format("email"))
            .into()
    }
}

// ==================== 自定义校验 ====================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomValidationDto {
    pub username: String,
    pub role: String,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emails: Option<Vec<String>>,
}

impl CustomValidationDto {
    pub fn schema() -> Schema {
        Schema::object()
            .field(
                "username",
                Schema::string()
                    .length(3, 20)
                    .pattern("^[a-zA-Z0-9_]+$")
                    .message("用户名必须是3-20位字母、数字或下划线"),
            )
            .field(
                "role",
                Schema::union([
                    Schema::literal("admin"),
                    Schema::literal("user"),
                    Schema::literal("guest"),
                ])
                .message("角色必须是 admin、user 或 guest"),
            )
            .field("userId", Schema::string().format("uuid").message("必须是有效的 UUID"))
            .optional_field(
                "phoneNumber",
                Schema::string().format("cn-phone").message("必须是有效的中国手机号"),
            )
            .optional_field(
                "location",
                Schema::object()
                    .field("lat", Schema::number().range(-90.0, 90.0))
                    .field("lng", Schema::number().range(-180.0, 180.0))
                    .message("坐标必须在有效范围内"),
            )
            .optional_field(
                "emails",
                Schema::array(Schema::string().format("email"))
                    .max_items(3)
                    .message("最多可以有3个有效的邮箱地址"),
            )
            .into()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQueryDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    /// 字符串、字符串数组或 null
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

impl SearchQueryDto {
    pub fn schema() -> Schema {
        Schema::object()
            .optional_field("q", Schema::string().message("搜索关键词必须是字符串"))
            .optional_field(
                "pagination",
                Schema::object()
                    .field("page", Schema::integer().minimum(1.0).with_default(1))
                    .field("limit", Schema::integer().range(1.0, 100.0).with_default(10))
                    .optional_field("sort", Schema::string())
                    .optional_field("order", Schema::enumeration(["asc", "desc"]))
                    .message("分页参数格式错误"),
            )
            .optional_field(
                "tags",
                Schema::union([
                    Schema::from(Schema::array(Schema::string())),
                    Schema::from(Schema::string()),
                    Schema::null(),
                ])
                .message("标签可以是字符串、字符串数组或空值"),
            )
            .optional_field(
                "score",
                Schema::number().range(0.0, 100.0).message("评分必须在 0-100 之间"),
            )
            .optional_field(
                "startDate",
                Schema::string().format("date").message("开始日期格式必须是 YYYY-MM-DD"),
            )
            .optional_field(
                "endDate",
                Schema::string().format("date").message("结束日期格式必须是 YYYY-MM-DD"),
            )
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use griffin_validator::Validator;
    use serde_json::json;

    #[test]
    fn test_dto_schemas_are_well_formed() {
        let validator = Validator::new();
        for schema in [
            CreateUserDto::schema(),
            UpdateUserDto::schema(),
            CreateContactDto::schema(),
            CustomValidationDto::schema(),
            SearchQueryDto::schema(),
        ] {
            validator.check_schema(&schema).unwrap();
        }
    }

    #[test]
    fn test_custom_validation_invalid_example() {
        let input = json!({
            "username": "a",
            "role": "invalid_role",
            "userId": "not-a-uuid",
            "phoneNumber": "123456",
            "location": {"lat": 200, "lng": 200},
            "emails": ["invalid-email", "another@invalid"]
        });

        let errors = Validator::new()
            .validate(&CustomValidationDto::schema(), &input)
            .unwrap_err();

        assert_eq!(errors.for_field("username").next().unwrap().message, "用户名必须是3-20位字母、数字或下划线");
        assert_eq!(errors.for_field("role").next().unwrap().message, "角色必须是 admin、user 或 guest");
        assert_eq!(errors.for_field("userId").next().unwrap().message, "必须是有效的 UUID");
        assert!(errors.has_field("phoneNumber"));
        assert!(errors.has_field("location.lat"));
        assert!(errors.has_field("location.lng"));
        assert!(errors.has_field("emails[0]"));
    }

    #[test]
    fn test_search_query_fills_pagination_defaults() {
        let input = json!({"q": "rust", "pagination": {"sort": "createdAt"}});
        let output = Validator::new()
            .validate(&SearchQueryDto::schema(), &input)
            .unwrap();

        let query: SearchQueryDto = serde_json::from_value(output).unwrap();
        let pagination = query.pagination.unwrap();
        assert_eq!(pagination.page, 1);
        assert_eq!(pagination.limit, 10);
        assert_eq!(pagination.sort.as_deref(), Some("createdAt"));
    }

    #[test]
    fn test_search_query_tags_accept_null() {
        let validator = Validator::new();
        let schema = SearchQueryDto::schema();
        assert!(validator.validate(&schema, &json!({"tags": null})).is_ok());
        assert!(validator.validate(&schema, &json!({"tags": ["a", "b"]})).is_ok());
        assert!(validator.validate(&schema, &json!({"tags": 5})).is_err());
    }
}
