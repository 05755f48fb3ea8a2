use once_cell::sync::Lazy;
use serde_json::{Map, Value};
use std::collections::HashSet;

use crate::error::{Constraint, FieldError, SchemaError, ValidationErrors, ValidationResult};
use crate::format::{FormatChecker, FormatRegistry};
use crate::schema::{ArraySchema, NumberSchema, ObjectSchema, Schema, StringSchema};

static DEFAULT_VALIDATOR: Lazy<Validator> = Lazy::new(Validator::new);

/// 使用默认格式注册表和 `BestMatch` 策略校验
pub fn validate(schema: &Schema, value: &Value) -> ValidationResult<Value> {
    DEFAULT_VALIDATOR.validate(schema, value)
}

/// 联合类型全部失败时报告哪些错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnionReporting {
    /// 结构匹配度最高的分支，并列时取先声明的
    #[default]
    BestMatch,
    FirstAlternative,
    /// 所有分支的错误依次拼接
    AllAlternatives,
}

/// 校验引擎
///
/// 无内部可变状态，构建后可在多个请求间共享。
#[derive(Debug, Clone, Default)]
pub struct Validator {
    formats: FormatRegistry,
    union_reporting: UnionReporting,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_formats(mut self, formats: FormatRegistry) -> Self {
        self.formats = formats;
        self
    }

    pub fn with_union_reporting(mut self, reporting: UnionReporting) -> Self {
        self.union_reporting = reporting;
        self
    }

    pub fn register_format(
        mut self,
        name: impl Into<String>,
        checker: impl FormatChecker + 'static,
    ) -> Self {
        self.formats.register(name, checker);
        self
    }

    pub fn formats(&self) -> &FormatRegistry {
        &self.formats
    }

    pub fn union_reporting(&self) -> UnionReporting {
        self.union_reporting
    }

    /// 校验输入值
    ///
    /// 收集全部违规后一次性返回；成功时返回原值，
    /// 仅在缺省的可选字段声明了默认值时填入默认值。
    pub fn validate(&self, schema: &Schema, value: &Value) -> ValidationResult<Value> {
        let mut errors = Vec::new();
        let output = self.walk(schema, value, "", &mut errors);

        if errors.is_empty() {
            Ok(output)
        } else {
            tracing::trace!(error_count = errors.len(), "Validation failed");
            Err(ValidationErrors::from(errors))
        }
    }

    /// 检查 Schema 定义本身：正则可编译、格式已注册、上下界合理、默认值合法
    pub fn check_schema(&self, schema: &Schema) -> Result<(), SchemaError> {
        self.check_at(schema, "")
    }

    fn walk(
        &self,
        schema: &Schema,
        value: &Value,
        path: &str,
        errors: &mut Vec<FieldError>,
    ) -> Value {
        match schema {
            Schema::Any => {}
            Schema::Null => {
                if !value.is_null() {
                    errors.push(type_error(path, "null", value));
                }
            }
            Schema::Boolean => {
                if !value.is_boolean() {
                    errors.push(type_error(path, "boolean", value));
                }
            }
            Schema::String(string) => self.walk_string(string, value, path, errors),
            Schema::Number(number) => walk_number(number, value, path, errors),
            Schema::Literal(expected) => {
                if value != expected {
                    errors.push(FieldError::new(
                        path,
                        Constraint::Literal,
                        format!("{} must be {}", label(path), render(expected)),
                    ));
                }
            }
            Schema::Enum(allowed) => {
                if !allowed.contains(value) {
                    let choices = allowed.iter().map(render).collect::<Vec<_>>().join(", ");
                    errors.push(FieldError::new(
                        path,
                        Constraint::Enum,
                        format!(
                            "{} must be one of [{}], but was {}",
                            label(path),
                            choices,
                            render(value)
                        ),
                    ));
                }
            }
            Schema::Object(object) => return self.walk_object(object, value, path, errors),
            Schema::Array(array) => return self.walk_array(array, value, path, errors),
            Schema::Union(alternatives) => {
                return self.walk_union(alternatives, value, path, errors)
            }
            Schema::Optional(optional) => return self.walk(&optional.inner, value, path, errors),
            Schema::Message(inner, message) => {
                let mut inner_errors = Vec::new();
                let output = self.walk(inner, value, path, &mut inner_errors);
                errors.extend(inner_errors.into_iter().map(|mut e| {
                    e.message = message.clone();
                    e
                }));
                return output;
            }
        }
        value.clone()
    }

    fn walk_string(
        &self,
        schema: &StringSchema,
        value: &Value,
        path: &str,
        errors: &mut Vec<FieldError>,
    ) {
        let Some(s) = value.as_str() else {
            errors.push(type_error(path, "string", value));
            return;
        };
        let field = label(path);
        let len = s.chars().count();

        if let Some(min) = schema.min_length {
            if len < min {
                errors.push(FieldError::new(
                    path,
                    Constraint::MinLength,
                    format!("{} length must be at least {}, but was {}", field, min, len),
                ));
            }
        }
        if let Some(max) = schema.max_length {
            if len > max {
                errors.push(FieldError::new(
                    path,
                    Constraint::MaxLength,
                    format!("{} length must be at most {}, but was {}", field, max, len),
                ));
            }
        }

        if let Some(rule) = &schema.pattern {
            let matched = rule.regex().map(|re| re.is_match(s)).unwrap_or(false);
            if !matched {
                errors.push(FieldError::new(
                    path,
                    Constraint::Pattern,
                    format!("{} must match pattern: {}", field, rule.source()),
                ));
            }
        }

        if let Some(format) = &schema.format {
            let valid = self.formats.get(format).map(|c| c.check(s)).unwrap_or(false);
            if !valid {
                let message = match format.as_str() {
                    "email" => format!("{} must be a valid email address", field),
                    other => format!("{} must be a valid {}", field, other),
                };
                errors.push(FieldError::new(path, Constraint::Format, message));
            }
        }
    }

    fn walk_object(
        &self,
        schema: &ObjectSchema,
        value: &Value,
        path: &str,
        errors: &mut Vec<FieldError>,
    ) -> Value {
        let Some(input) = value.as_object() else {
            errors.push(type_error(path, "object", value));
            return value.clone();
        };

        let mut output: Map<String, Value> = input.clone();

        for (name, field_schema) in &schema.fields {
            let field_path = child(path, name);
            match input.get(name) {
                Some(field_value) => {
                    let validated = self.walk(field_schema, field_value, &field_path, errors);
                    output.insert(name.clone(), validated);
                }
                None => match field_schema.as_optional() {
                    Some(optional) => {
                        if let Some(default) = &optional.default {
                            output.insert(name.clone(), default.clone());
                        }
                    }
                    None => {
                        let message = field_schema
                            .custom_message()
                            .map(str::to_string)
                            .unwrap_or_else(|| format!("{} is required", name));
                        errors.push(FieldError::new(field_path, Constraint::Required, message));
                    }
                },
            }
        }

        if schema.deny_unknown_fields {
            for key in input.keys() {
                if schema.get(key).is_none() {
                    errors.push(FieldError::new(
                        child(path, key),
                        Constraint::UnknownField,
                        format!("{} is not allowed", key),
                    ));
                }
            }
        }

        Value::Object(output)
    }

    fn walk_array(
        &self,
        schema: &ArraySchema,
        value: &Value,
        path: &str,
        errors: &mut Vec<FieldError>,
    ) -> Value {
        let Some(items) = value.as_array() else {
            errors.push(type_error(path, "array", value));
            return value.clone();
        };
        let field = label(path);

        if let Some(min) = schema.min_items {
            if items.len() < min {
                errors.push(FieldError::new(
                    path,
                    Constraint::MinItems,
                    format!("{} size must be at least {}, but was {}", field, min, items.len()),
                ));
            }
        }
        if let Some(max) = schema.max_items {
            if items.len() > max {
                errors.push(FieldError::new(
                    path,
                    Constraint::MaxItems,
                    format!("{} size must be at most {}, but was {}", field, max, items.len()),
                ));
            }
        }

        let output = items
            .iter()
            .enumerate()
            .map(|(i, item)| self.walk(&schema.items, item, &format!("{}[{}]", path, i), errors))
            .collect();
        Value::Array(output)
    }

    fn walk_union(
        &self,
        alternatives: &[Schema],
        value: &Value,
        path: &str,
        errors: &mut Vec<FieldError>,
    ) -> Value {
        if alternatives.is_empty() {
            errors.push(FieldError::new(
                path,
                Constraint::Type,
                format!("{} cannot match a union without alternatives", label(path)),
            ));
            return value.clone();
        }

        let mut failures: Vec<Vec<FieldError>> = Vec::with_capacity(alternatives.len());
        for alternative in alternatives {
            let mut attempt = Vec::new();
            let output = self.walk(alternative, value, path, &mut attempt);
            if attempt.is_empty() {
                return output;
            }
            failures.push(attempt);
        }

        match self.union_reporting {
            UnionReporting::FirstAlternative => errors.append(&mut failures[0]),
            UnionReporting::AllAlternatives => failures.into_iter().for_each(|f| errors.extend(f)),
            UnionReporting::BestMatch => {
                let mut best = 0;
                let mut best_score = match_score(&alternatives[0], value);
                for (i, alternative) in alternatives.iter().enumerate().skip(1) {
                    let score = match_score(alternative, value);
                    if score > best_score {
                        best = i;
                        best_score = score;
                    }
                }
                errors.append(&mut failures[best]);
            }
        }
        value.clone()
    }

    fn check_at(&self, schema: &Schema, path: &str) -> Result<(), SchemaError> {
        match schema {
            Schema::Any | Schema::Null | Schema::Boolean | Schema::Literal(_) => Ok(()),
            Schema::Enum(values) => {
                if values.is_empty() {
                    return Err(SchemaError::NoAlternatives(label(path)));
                }
                Ok(())
            }
            Schema::String(string) => {
                if let Some(rule) = &string.pattern {
                    if let Err(e) = rule.regex() {
                        return Err(SchemaError::InvalidPattern {
                            path: label(path),
                            pattern: rule.source().to_string(),
                            reason: e.to_string(),
                        });
                    }
                }
                if let Some(format) = &string.format {
                    if !self.formats.contains(format) {
                        return Err(SchemaError::UnknownFormat {
                            path: label(path),
                            format: format.clone(),
                        });
                    }
                }
                check_bounds(path, string.min_length, string.max_length, "minLength", "maxLength")
            }
            Schema::Number(number) => {
                check_bounds(path, number.minimum, number.maximum, "minimum", "maximum")?;
                check_bounds(
                    path,
                    number.exclusive_minimum,
                    number.exclusive_maximum,
                    "exclusiveMinimum",
                    "exclusiveMaximum",
                )
            }
            Schema::Object(object) => {
                let mut seen = HashSet::new();
                for (name, field_schema) in &object.fields {
                    let field_path = child(path, name);
                    if !seen.insert(name.as_str()) {
                        return Err(SchemaError::DuplicateField(field_path));
                    }
                    self.check_at(field_schema, &field_path)?;
                }
                Ok(())
            }
            Schema::Array(array) => {
                check_bounds(path, array.min_items, array.max_items, "minItems", "maxItems")?;
                self.check_at(&array.items, &format!("{}[]", path))
            }
            Schema::Union(alternatives) => {
                if alternatives.is_empty() {
                    return Err(SchemaError::NoAlternatives(label(path)));
                }
                alternatives.iter().try_for_each(|a| self.check_at(a, path))
            }
            Schema::Optional(optional) => {
                self.check_at(&optional.inner, path)?;
                if let Some(default) = &optional.default {
                    if let Err(errors) = self.validate(&optional.inner, default) {
                        return Err(SchemaError::InvalidDefault {
                            path: label(path),
                            reason: errors.to_string(),
                        });
                    }
                }
                Ok(())
            }
            Schema::Message(inner, _) => self.check_at(inner, path),
        }
    }
}

fn walk_number(schema: &NumberSchema, value: &Value, path: &str, errors: &mut Vec<FieldError>) {
    let Some(n) = value.as_f64() else {
        let expected = if schema.integer { "integer" } else { "number" };
        errors.push(type_error(path, expected, value));
        return;
    };
    let field = label(path);

    // 只接受 JSON 整数字面量
    if schema.integer && !(value.is_i64() || value.is_u64()) {
        errors.push(FieldError::new(
            path,
            Constraint::Integer,
            format!("{} must be an integer, but was {}", field, value),
        ));
    }
    if let Some(min) = schema.minimum {
        if n < min {
            errors.push(FieldError::new(
                path,
                Constraint::Minimum,
                format!("{} must be at least {}, but was {}", field, min, value),
            ));
        }
    }
    if let Some(max) = schema.maximum {
        if n > max {
            errors.push(FieldError::new(
                path,
                Constraint::Maximum,
                format!("{} must be at most {}, but was {}", field, max, value),
            ));
        }
    }
    if let Some(min) = schema.exclusive_minimum {
        if n <= min {
            errors.push(FieldError::new(
                path,
                Constraint::ExclusiveMinimum,
                format!("{} must be greater than {}, but was {}", field, min, value),
            ));
        }
    }
    if let Some(max) = schema.exclusive_maximum {
        if n >= max {
            errors.push(FieldError::new(
                path,
                Constraint::ExclusiveMaximum,
                format!("{} must be less than {}, but was {}", field, max, value),
            ));
        }
    }
}

/// 值与 Schema 的结构匹配度：类型吻合计 1 分，对象与数组累加已出现子项的得分
fn match_score(schema: &Schema, value: &Value) -> usize {
    match (schema, value) {
        (Schema::Any, _) => 1,
        (Schema::Null, Value::Null) => 1,
        (Schema::Boolean, Value::Bool(_)) => 1,
        (Schema::String(_), Value::String(_)) => 1,
        (Schema::Number(_), Value::Number(_)) => 1,
        (Schema::Literal(expected), _) => {
            if expected == value {
                2
            } else if same_kind(expected, value) {
                1
            } else {
                0
            }
        }
        (Schema::Enum(allowed), _) => {
            if allowed.contains(value) {
                2
            } else if allowed.iter().any(|a| same_kind(a, value)) {
                1
            } else {
                0
            }
        }
        (Schema::Object(object), Value::Object(map)) => {
            1 + object
                .fields
                .iter()
                .filter_map(|(name, s)| map.get(name).map(|v| match_score(s, v)))
                .sum::<usize>()
        }
        (Schema::Array(array), Value::Array(items)) => {
            1 + items.iter().map(|item| match_score(&array.items, item)).sum::<usize>()
        }
        (Schema::Union(alternatives), _) => alternatives
            .iter()
            .map(|a| match_score(a, value))
            .max()
            .unwrap_or(0),
        (Schema::Optional(optional), _) => match_score(&optional.inner, value),
        (Schema::Message(inner, _), _) => match_score(inner, value),
        _ => 0,
    }
}

fn same_kind(a: &Value, b: &Value) -> bool {
    std::mem::discriminant(a) == std::mem::discriminant(b)
}

fn check_bounds<T: PartialOrd + std::fmt::Display>(
    path: &str,
    min: Option<T>,
    max: Option<T>,
    min_name: &str,
    max_name: &str,
) -> Result<(), SchemaError> {
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(SchemaError::InvalidBounds {
                path: label(path),
                detail: format!("{} {} is greater than {} {}", min_name, min, max_name, max),
            });
        }
    }
    Ok(())
}

fn type_error(path: &str, expected: &str, actual: &Value) -> FieldError {
    FieldError::new(
        path,
        Constraint::Type,
        format!(
            "{} must be {} {}, but was {}",
            label(path),
            article(expected),
            expected,
            kind(actual)
        ),
    )
}

fn article(word: &str) -> &'static str {
    match word.chars().next() {
        Some('a' | 'e' | 'i' | 'o' | 'u') => "an",
        _ => "a",
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn child(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

fn label(path: &str) -> String {
    if path.is_empty() {
        "value".to_string()
    } else {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaExt;
    use serde_json::json;

    fn user_schema() -> Schema {
        Schema::object()
            .field("username", Schema::string().length(3, 20).pattern("^[a-zA-Z0-9_]+$"))
            .field("role", Schema::enumeration(["admin", "user", "guest"]))
            .into()
    }

    #[test]
    fn test_short_username_is_rejected() {
        let result = validate(&user_schema(), &json!({"username": "jo", "role": "admin"}));

        let errors = result.unwrap_err();
        assert_eq!(errors.len(), 1);
        let error = &errors.errors()[0];
        assert_eq!(error.field, "username");
        assert_eq!(error.constraint, Constraint::MinLength);
        assert_eq!(error.message, "username length must be at least 3, but was 2");
    }

    #[test]
    fn test_valid_input_is_echoed_unchanged() {
        let input = json!({"username": "john_doe1", "role": "user", "extra": true});
        let output = validate(&user_schema(), &input).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn test_collects_all_violations() {
        let schema: Schema = Schema::object()
            .field("username", Schema::string().length(3, 20).pattern("^[a-zA-Z0-9_]+$"))
            .field("email", Schema::string().format("email"))
            .field("age", Schema::integer().range(0.0, 150.0))
            .field("role", Schema::enumeration(["admin", "user", "guest"]))
            .into();

        let errors = validate(
            &schema,
            &json!({"username": "j!", "email": "nope", "age": 200, "role": "root"}),
        )
        .unwrap_err();

        assert!(errors.len() >= 4);
        assert!(errors.has_field("username"));
        assert!(errors.has_field("email"));
        assert!(errors.has_field("age"));
        assert!(errors.has_field("role"));
        assert_eq!(errors.for_field("username").count(), 2);
    }

    #[test]
    fn test_missing_required_field() {
        let errors = validate(&user_schema(), &json!({"username": "john"})).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors()[0].field, "role");
        assert_eq!(errors.errors()[0].constraint, Constraint::Required);
        assert_eq!(errors.errors()[0].message, "role is required");
    }

    #[test]
    fn test_optional_field_and_default() {
        let schema: Schema = Schema::object()
            .field("name", Schema::string())
            .optional_field("bio", Schema::string().max_length(5))
            .field("page", Schema::integer().minimum(1.0).with_default(1))
            .into();

        let output = validate(&schema, &json!({"name": "a"})).unwrap();
        assert_eq!(output, json!({"name": "a", "page": 1}));

        let output = validate(&schema, &json!({"name": "a", "page": 3})).unwrap();
        assert_eq!(output, json!({"name": "a", "page": 3}));

        let errors = validate(&schema, &json!({"name": "a", "bio": "too long"})).unwrap_err();
        assert!(errors.has_field("bio"));
    }

    #[test]
    fn test_null_is_not_absent() {
        let schema: Schema = Schema::object().optional_field("bio", Schema::string()).into();
        let errors = validate(&schema, &json!({"bio": null})).unwrap_err();
        assert_eq!(errors.errors()[0].constraint, Constraint::Type);
        assert_eq!(errors.errors()[0].message, "bio must be a string, but was null");
    }

    #[test]
    fn test_no_implicit_coercion() {
        let schema: Schema = Schema::object().field("age", Schema::integer()).into();
        let errors = validate(&schema, &json!({"age": "42"})).unwrap_err();
        assert_eq!(errors.errors()[0].constraint, Constraint::Type);
    }

    #[test]
    fn test_length_counts_characters() {
        let schema: Schema = Schema::string().length(2, 2).into();
        assert!(validate(&schema, &json!("张三")).is_ok());
    }

    #[test]
    fn test_numeric_bounds() {
        let inclusive: Schema = Schema::number().range(0.0, 10.0).into();
        assert!(validate(&inclusive, &json!(0)).is_ok());
        assert!(validate(&inclusive, &json!(10)).is_ok());
        assert!(validate(&inclusive, &json!(10.5)).is_err());

        let exclusive: Schema = Schema::number().exclusive_minimum(0.0).into();
        let errors = validate(&exclusive, &json!(0)).unwrap_err();
        assert_eq!(errors.errors()[0].constraint, Constraint::ExclusiveMinimum);

        let integer: Schema = Schema::integer().into();
        assert!(validate(&integer, &json!(2.5)).is_err());
        assert!(validate(&integer, &json!(28)).is_ok());
        assert!(validate(&integer, &json!(-3)).is_ok());

        let errors = validate(&integer, &json!(28.0)).unwrap_err();
        assert_eq!(errors.errors()[0].constraint, Constraint::Integer);
    }

    #[test]
    fn test_nested_paths() {
        let schema: Schema = Schema::object()
            .field(
                "location",
                Schema::object().field("lat", Schema::number().range(-90.0, 90.0)),
            )
            .field("emails", Schema::array(Schema::string().format("email")).min_items(1))
            .into();

        let errors = validate(
            &schema,
            &json!({"location": {"lat": 91}, "emails": ["a@b.com", "bad"]}),
        )
        .unwrap_err();

        assert!(errors.has_field("location.lat"));
        assert!(errors.has_field("emails[1]"));
        assert!(!errors.has_field("emails[0]"));
    }

    #[test]
    fn test_deny_unknown_fields() {
        let schema: Schema = Schema::object()
            .field("name", Schema::string())
            .deny_unknown_fields()
            .into();

        let errors = validate(&schema, &json!({"name": "a", "admin": true})).unwrap_err();
        assert_eq!(errors.errors()[0].field, "admin");
        assert_eq!(errors.errors()[0].constraint, Constraint::UnknownField);
    }

    #[test]
    fn test_custom_message_replaces_generated() {
        let schema: Schema = Schema::object()
            .field(
                "phone",
                Schema::string().format("cn-phone").message("请输入正确的手机号"),
            )
            .field("code", Schema::string().message("验证码不能为空"))
            .into();

        let errors = validate(&schema, &json!({"phone": "123"})).unwrap_err();
        assert_eq!(errors.for_field("phone").next().unwrap().message, "请输入正确的手机号");
        assert_eq!(errors.for_field("code").next().unwrap().message, "验证码不能为空");
    }

    fn shape_union() -> Schema {
        Schema::union([
            Schema::object()
                .field("kind", Schema::literal("circle"))
                .field("radius", Schema::number().exclusive_minimum(0.0)),
            Schema::object()
                .field("kind", Schema::literal("rect"))
                .field("width", Schema::number())
                .field("height", Schema::number()),
        ])
    }

    #[test]
    fn test_union_accepts_any_alternative() {
        let value = json!({"kind": "rect", "width": 1, "height": 2});
        assert_eq!(validate(&shape_union(), &value).unwrap(), value);
    }

    #[test]
    fn test_union_reports_best_match() {
        let errors = validate(
            &shape_union(),
            &json!({"kind": "rect", "width": 1, "height": "tall"}),
        )
        .unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors()[0].field, "height");
    }

    #[test]
    fn test_union_tie_prefers_first_declared() {
        let schema = Schema::union([
            Schema::string().min_length(5),
            Schema::string().max_length(1),
        ]);
        let errors = validate(&schema, &json!("abc")).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors()[0].constraint, Constraint::MinLength);
    }

    #[test]
    fn test_union_reporting_strategies() {
        let value = json!({"kind": "rect", "width": 1, "height": "tall"});

        let first = Validator::new().with_union_reporting(UnionReporting::FirstAlternative);
        let errors = first.validate(&shape_union(), &value).unwrap_err();
        assert!(errors.has_field("kind"));
        assert!(errors.has_field("radius"));

        let all = Validator::new().with_union_reporting(UnionReporting::AllAlternatives);
        let errors = all.validate(&shape_union(), &value).unwrap_err();
        assert!(errors.has_field("radius"));
        assert!(errors.has_field("height"));
    }

    #[test]
    fn test_custom_format_registration() {
        let validator = Validator::new().register_format("even-digits", |s: &str| {
            !s.is_empty() && s.len() % 2 == 0 && s.chars().all(|c| c.is_ascii_digit())
        });
        let schema: Schema = Schema::string().format("even-digits").into();

        assert!(validator.validate(&schema, &json!("1234")).is_ok());
        let errors = validator.validate(&schema, &json!("123")).unwrap_err();
        assert_eq!(errors.errors()[0].message, "value must be a valid even-digits");

        assert!(validate(&schema, &json!("1234")).is_err());
    }

    #[test]
    fn test_check_schema() {
        let validator = Validator::new();

        assert!(validator.check_schema(&user_schema()).is_ok());

        let bad_pattern: Schema = Schema::object()
            .field("a", Schema::string().pattern("([a-z"))
            .into();
        assert!(matches!(
            validator.check_schema(&bad_pattern),
            Err(SchemaError::InvalidPattern { ref path, .. }) if path == "a"
        ));

        let unknown: Schema = Schema::string().format("zip-code").into();
        assert!(matches!(validator.check_schema(&unknown), Err(SchemaError::UnknownFormat { .. })));

        let bounds: Schema = Schema::string().length(5, 2).into();
        assert!(matches!(validator.check_schema(&bounds), Err(SchemaError::InvalidBounds { .. })));

        let duplicate: Schema = Schema::object()
            .field("a", Schema::string())
            .field("a", Schema::number())
            .into();
        assert_eq!(
            validator.check_schema(&duplicate),
            Err(SchemaError::DuplicateField("a".to_string()))
        );

        assert!(matches!(
            validator.check_schema(&Schema::union(Vec::<Schema>::new())),
            Err(SchemaError::NoAlternatives(_))
        ));

        let bad_default: Schema = Schema::object()
            .field("page", Schema::integer().minimum(1.0).with_default(0))
            .into();
        assert!(matches!(
            validator.check_schema(&bad_default),
            Err(SchemaError::InvalidDefault { .. })
        ));
    }
}
