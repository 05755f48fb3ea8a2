use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// 失败的约束类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Constraint {
    Required,
    Type,
    MinLength,
    MaxLength,
    Pattern,
    Format,
    Minimum,
    Maximum,
    ExclusiveMinimum,
    ExclusiveMaximum,
    Integer,
    MinItems,
    MaxItems,
    Enum,
    Literal,
    UnknownField,
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Constraint::Required => "required",
            Constraint::Type => "type",
            Constraint::MinLength => "minLength",
            Constraint::MaxLength => "maxLength",
            Constraint::Pattern => "pattern",
            Constraint::Format => "format",
            Constraint::Minimum => "minimum",
            Constraint::Maximum => "maximum",
            Constraint::ExclusiveMinimum => "exclusiveMinimum",
            Constraint::ExclusiveMaximum => "exclusiveMaximum",
            Constraint::Integer => "integer",
            Constraint::MinItems => "minItems",
            Constraint::MaxItems => "maxItems",
            Constraint::Enum => "enum",
            Constraint::Literal => "literal",
            Constraint::UnknownField => "unknownField",
        };
        f.write_str(name)
    }
}

/// 单个字段的验证错误
///
/// `field` 使用点号和下标表示路径，例如 `location.lat`、`emails[1]`；
/// 根值的路径为空字符串。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
    pub constraint: Constraint,
}

impl FieldError {
    pub fn new(
        field: impl Into<String>,
        constraint: Constraint,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            constraint,
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.field.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

/// 一次验证收集到的全部错误
#[derive(Debug, Clone, Default, PartialEq, Error)]
#[error("Validation failed: {}", join_errors(.errors))]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        self.errors.extend(other.errors);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }

    /// 是否包含指定路径的错误
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// 指定路径上的全部错误
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a FieldError> + 'a {
        self.errors.iter().filter(move |e| e.field == field)
    }
}

impl From<Vec<FieldError>> for ValidationErrors {
    fn from(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }
}

/// Schema 定义本身的错误，在路由注册阶段暴露
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("Invalid pattern '{pattern}' at '{path}': {reason}")]
    InvalidPattern {
        path: String,
        pattern: String,
        reason: String,
    },

    #[error("Unknown format '{format}' at '{path}'")]
    UnknownFormat { path: String, format: String },

    #[error("Invalid bounds at '{path}': {detail}")]
    InvalidBounds { path: String, detail: String },

    #[error("Duplicate field '{0}'")]
    DuplicateField(String),

    #[error("Schema at '{0}' declares no alternatives")]
    NoAlternatives(String),

    #[error("Default value at '{path}' does not satisfy its schema: {reason}")]
    InvalidDefault { path: String, reason: String },
}

pub type ValidationResult<T> = Result<T, ValidationErrors>;
