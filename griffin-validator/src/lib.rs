//! Griffin Validator - 基于 Schema 的请求数据校验
//!
//! Schema 描述请求体或参数的结构，校验一次收集全部违规，
//! 字符串格式通过可插拔的 [`FormatRegistry`] 扩展。

pub mod error;
pub mod format;
pub mod schema;
pub mod validator;

pub use error::{Constraint, FieldError, SchemaError, ValidationErrors, ValidationResult};
pub use format::{FormatChecker, FormatRegistry};
pub use schema::{
    ArraySchema, NumberSchema, ObjectSchema, OptionalSchema, PatternRule, Schema, SchemaExt,
    StringSchema,
};
pub use validator::{validate, UnionReporting, Validator};
