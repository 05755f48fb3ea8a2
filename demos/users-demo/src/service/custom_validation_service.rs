use serde_json::{json, Value};

use crate::dto::{CustomValidationDto, SearchQueryDto};

/// 校验通过后的模拟处理
#[derive(Debug, Default)]
pub struct CustomValidationService;

impl CustomValidationService {
    pub fn process_custom_data(&self, data: &CustomValidationDto) -> Value {
        let mut processed = json!(data);
        processed["processedAt"] = json!(now());
        processed["validation"] = json!("Schema 自定义验证通过");

        json!({
            "processed": true,
            "data": processed,
        })
    }

    pub fn process_search(&self, query: &SearchQueryDto) -> Value {
        json!({
            "results": [
                {"id": 1, "title": "搜索结果 1", "relevance": 0.95},
                {"id": 2, "title": "搜索结果 2", "relevance": 0.87},
            ],
            "query": query,
            "total": 2,
            "searchedAt": now(),
        })
    }
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
