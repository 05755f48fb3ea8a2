use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::dto::CreateContactDto;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Contact {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// `/api` 下的示例服务
pub struct AppService {
    contacts: RwLock<Vec<Contact>>,
}

impl Default for AppService {
    fn default() -> Self {
        Self::new()
    }
}

impl AppService {
    pub fn new() -> Self {
        Self {
            contacts: RwLock::new(vec![
                Contact {
                    id: "1".to_string(),
                    name: "John Doe".to_string(),
                    email: "john@example.com".to_string(),
                },
                Contact {
                    id: "2".to_string(),
                    name: "Jane Smith".to_string(),
                    email: "jane@example.com".to_string(),
                },
            ]),
        }
    }

    pub fn hello(&self) -> &'static str {
        "Hello from Griffin!"
    }

    pub fn list(&self) -> Vec<Contact> {
        self.contacts.read().clone()
    }

    pub fn find(&self, id: &str) -> Option<Contact> {
        self.contacts.read().iter().find(|c| c.id == id).cloned()
    }

    /// id 取当前毫秒时间戳
    pub fn create(&self, dto: CreateContactDto) -> Contact {
        let contact = Contact {
            id: chrono::Utc::now().timestamp_millis().to_string(),
            name: dto.name,
            email: dto.email,
        };
        self.contacts.write().push(contact.clone());
        tracing::debug!(id = %contact.id, "Contact created");
        contact
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_find() {
        let service = AppService::new();
        assert_eq!(service.list().len(), 2);
        assert!(service.find("123").is_none());

        let created = service.create(CreateContactDto {
            name: "Alice".into(),
            email: "alice@example.com".into(),
        });
        assert_eq!(service.find(&created.id), Some(created));
        assert_eq!(service.list().len(), 3);
    }
}
