//! Schema 数据模型
//!
//! Schema 是纯数据：构建之后不可变，可以在线程间自由共享。
//! 构建器 API 只负责拼装数据，所有检查都在 [`Validator`](crate::Validator) 中完成。
//!
//! ```rust,ignore
//! let schema = Schema::object()
//!     .field("username", Schema::string().length(3, 20).pattern("^[a-zA-Z0-9_]+$"))
//!     .field("role", Schema::enumeration(["admin", "user", "guest"]))
//!     .optional_field("bio", Schema::string());
//! ```

use regex::Regex;
use serde_json::Value;
use std::fmt;

/// 可组合的 Schema
#[derive(Debug, Clone)]
pub enum Schema {
    /// 接受任意值
    Any,
    Null,
    Boolean,
    String(StringSchema),
    Number(NumberSchema),
    /// 必须与给定字面量完全相等
    Literal(Value),
    /// 必须等于其中一个字面量
    Enum(Vec<Value>),
    Object(ObjectSchema),
    Array(ArraySchema),
    /// 任一分支通过即可
    Union(Vec<Schema>),
    /// 作为对象字段时允许缺省
    Optional(OptionalSchema),
    /// 使用自定义消息替换内部产生的错误消息
    Message(Box<Schema>, String),
}

impl Schema {
    pub fn any() -> Schema {
        Schema::Any
    }

    pub fn null() -> Schema {
        Schema::Null
    }

    pub fn boolean() -> Schema {
        Schema::Boolean
    }

    pub fn string() -> StringSchema {
        StringSchema::default()
    }

    pub fn number() -> NumberSchema {
        NumberSchema::default()
    }

    pub fn integer() -> NumberSchema {
        NumberSchema {
            integer: true,
            ..NumberSchema::default()
        }
    }

    pub fn literal(value: impl Into<Value>) -> Schema {
        Schema::Literal(value.into())
    }

    pub fn enumeration<I, V>(values: I) -> Schema
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Schema::Enum(values.into_iter().map(Into::into).collect())
    }

    pub fn object() -> ObjectSchema {
        ObjectSchema::default()
    }

    pub fn array(items: impl Into<Schema>) -> ArraySchema {
        ArraySchema {
            items: Box::new(items.into()),
            min_items: None,
            max_items: None,
        }
    }

    pub fn union<I, S>(alternatives: I) -> Schema
    where
        I: IntoIterator<Item = S>,
        S: Into<Schema>,
    {
        Schema::Union(alternatives.into_iter().map(Into::into).collect())
    }

    /// 找到可选包装（穿过自定义消息包装）
    pub(crate) fn as_optional(&self) -> Option<&OptionalSchema> {
        match self {
            Schema::Optional(optional) => Some(optional),
            Schema::Message(inner, _) => inner.as_optional(),
            _ => None,
        }
    }

    /// 最外层的自定义消息
    pub(crate) fn custom_message(&self) -> Option<&str> {
        match self {
            Schema::Message(_, message) => Some(message),
            Schema::Optional(optional) => optional.inner.custom_message(),
            _ => None,
        }
    }
}

/// Schema 构建扩展方法，对所有可转换为 [`Schema`] 的构建器生效
pub trait SchemaExt: Into<Schema> + Sized {
    /// 标记为可选字段
    fn optional(self) -> Schema {
        Schema::Optional(OptionalSchema {
            inner: Box::new(self.into()),
            default: None,
        })
    }

    /// 可选字段，缺省时填入默认值
    fn with_default(self, default: impl Into<Value>) -> Schema {
        Schema::Optional(OptionalSchema {
            inner: Box::new(self.into()),
            default: Some(default.into()),
        })
    }

    /// 自定义错误消息
    fn message(self, message: impl Into<String>) -> Schema {
        Schema::Message(Box::new(self.into()), message.into())
    }
}

impl<T: Into<Schema>> SchemaExt for T {}

/// 正则约束
///
/// 编译失败不会 panic，而是保留错误，在 `Validator::check_schema` 时报告。
#[derive(Clone)]
pub struct PatternRule {
    source: String,
    compiled: Result<Regex, regex::Error>,
}

impl PatternRule {
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let compiled = Regex::new(&source);
        Self { source, compiled }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn regex(&self) -> Result<&Regex, &regex::Error> {
        self.compiled.as_ref()
    }
}

impl fmt::Debug for PatternRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternRule")
            .field("source", &self.source)
            .field("valid", &self.compiled.is_ok())
            .finish()
    }
}

/// 字符串 Schema，长度按 Unicode 字符计算
#[derive(Debug, Clone, Default)]
pub struct StringSchema {
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<PatternRule>,
    pub format: Option<String>,
}

impl StringSchema {
    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn length(self, min: usize, max: usize) -> Self {
        self.min_length(min).max_length(max)
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(PatternRule::new(pattern));
        self
    }

    /// 格式标签，例如 `email`、`uuid`、`date`
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }
}

impl From<StringSchema> for Schema {
    fn from(schema: StringSchema) -> Self {
        Schema::String(schema)
    }
}

/// 数值 Schema，`minimum`/`maximum` 为闭区间
#[derive(Debug, Clone, Default)]
pub struct NumberSchema {
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub exclusive_minimum: Option<f64>,
    pub exclusive_maximum: Option<f64>,
    pub integer: bool,
}

impl NumberSchema {
    pub fn minimum(mut self, min: f64) -> Self {
        self.minimum = Some(min);
        self
    }

    pub fn maximum(mut self, max: f64) -> Self {
        self.maximum = Some(max);
        self
    }

    pub fn range(self, min: f64, max: f64) -> Self {
        self.minimum(min).maximum(max)
    }

    pub fn exclusive_minimum(mut self, min: f64) -> Self {
        self.exclusive_minimum = Some(min);
        self
    }

    pub fn exclusive_maximum(mut self, max: f64) -> Self {
        self.exclusive_maximum = Some(max);
        self
    }
}

impl From<NumberSchema> for Schema {
    fn from(schema: NumberSchema) -> Self {
        Schema::Number(schema)
    }
}

/// 对象 Schema，字段按声明顺序校验
#[derive(Debug, Clone, Default)]
pub struct ObjectSchema {
    pub fields: Vec<(String, Schema)>,
    pub deny_unknown_fields: bool,
}

impl ObjectSchema {
    pub fn field(mut self, name: impl Into<String>, schema: impl Into<Schema>) -> Self {
        self.fields.push((name.into(), schema.into()));
        self
    }

    pub fn optional_field(self, name: impl Into<String>, schema: impl Into<Schema>) -> Self {
        let schema: Schema = schema.into();
        let schema = match schema {
            Schema::Optional(_) => schema,
            other => other.optional(),
        };
        self.field(name, schema)
    }

    pub fn deny_unknown_fields(mut self) -> Self {
        self.deny_unknown_fields = true;
        self
    }

    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }
}

impl From<ObjectSchema> for Schema {
    fn from(schema: ObjectSchema) -> Self {
        Schema::Object(schema)
    }
}

/// 数组 Schema
#[derive(Debug, Clone)]
pub struct ArraySchema {
    pub items: Box<Schema>,
    pub min_items: Option<usize>,
    pub max_items: Option<usize>,
}

impl ArraySchema {
    pub fn min_items(mut self, min: usize) -> Self {
        self.min_items = Some(min);
        self
    }

    pub fn max_items(mut self, max: usize) -> Self {
        self.max_items = Some(max);
        self
    }
}

impl From<ArraySchema> for Schema {
    fn from(schema: ArraySchema) -> Self {
        Schema::Array(schema)
    }
}

/// 可选包装
#[derive(Debug, Clone)]
pub struct OptionalSchema {
    pub inner: Box<Schema>,
    pub default: Option<Value>,
}
