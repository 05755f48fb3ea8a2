//! 字符串格式校验
//!
//! 格式以名称注册到 [`FormatRegistry`]，Schema 通过 `format("email")` 引用。
//! 新格式只需注册，不需要修改校验引擎。

use chrono::{DateTime, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email regex is valid")
});

static URI_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*://[^\s/?#]+[^\s]*$").expect("uri regex is valid")
});

static CN_PHONE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^1[3-9]\d{9}$").expect("phone regex is valid"));

/// 格式检查器
pub trait FormatChecker: Send + Sync {
    fn check(&self, value: &str) -> bool;
}

impl<F> FormatChecker for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn check(&self, value: &str) -> bool {
        self(value)
    }
}

/// 格式注册表
#[derive(Clone)]
pub struct FormatRegistry {
    checkers: HashMap<String, Arc<dyn FormatChecker>>,
}

impl FormatRegistry {
    /// 空注册表
    pub fn new() -> Self {
        Self {
            checkers: HashMap::new(),
        }
    }

    /// 内置格式：`email`、`uuid`、`date`、`date-time`、`uri`、`cn-phone`
    pub fn with_defaults() -> Self {
        Self::new()
            .with("email", |s: &str| EMAIL_REGEX.is_match(s))
            .with("uuid", |s: &str| {
                s.len() == 36 && uuid::Uuid::try_parse(s).is_ok()
            })
            .with("date", |s: &str| {
                NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
            })
            .with("date-time", |s: &str| DateTime::parse_from_rfc3339(s).is_ok())
            .with("uri", |s: &str| URI_REGEX.is_match(s))
            .with("cn-phone", |s: &str| CN_PHONE_REGEX.is_match(s))
    }

    /// 注册或覆盖一个格式
    pub fn register(&mut self, name: impl Into<String>, checker: impl FormatChecker + 'static) {
        self.checkers.insert(name.into(), Arc::new(checker));
    }

    pub fn with(mut self, name: impl Into<String>, checker: impl FormatChecker + 'static) -> Self {
        self.register(name, checker);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn FormatChecker>> {
        self.checkers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.checkers.contains_key(name)
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.checkers.keys().collect();
        names.sort();
        f.debug_struct("FormatRegistry").field("formats", &names).finish()
    }
}
