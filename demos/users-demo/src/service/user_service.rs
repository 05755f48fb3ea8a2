use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::dto::{CreateUserDto, UpdateUserDto};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: u32,
    pub name: String,
    pub email: String,
    pub age: u32,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl User {
    fn seed(id: u32, name: &str, email: &str, age: u32) -> Self {
        Self {
            id,
            name: name.to_string(),
            email: email.to_string(),
            age,
            password: None,
            bio: None,
        }
    }
}

/// 内存用户仓库
///
/// 读写都经过同一把 `RwLock`，id 的分配和插入在一次写锁内完成。
/// id 单调递增，删除后不会复用。
pub struct UserService {
    store: RwLock<UserStore>,
}

struct UserStore {
    users: Vec<User>,
    next_id: u32,
}

impl Default for UserService {
    fn default() -> Self {
        Self::new()
    }
}

impl UserService {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(UserStore {
                users: vec![
                    User::seed(1, "John Doe", "john@example.com", 30),
                    User::seed(2, "Jane Smith", "jane@example.com", 25),
                ],
                next_id: 3,
            }),
        }
    }

    pub fn find_all(&self) -> Vec<User> {
        self.store.read().users.clone()
    }

    pub fn find_one(&self, id: u32) -> Option<User> {
        self.store.read().users.iter().find(|u| u.id == id).cloned()
    }

    /// 返回值不含密码
    pub fn create(&self, dto: CreateUserDto) -> User {
        let mut store = self.store.write();
        let id = store.next_id;
        store.next_id += 1;
        let user = User {
            id,
            name: dto.name,
            email: dto.email,
            age: dto.age,
            password: Some(dto.password),
            bio: dto.bio,
        };
        store.users.push(user.clone());
        tracing::info!(id = user.id, "User created");

        User { password: None, ..user }
    }

    pub fn update(&self, id: u32, dto: UpdateUserDto) -> anyhow::Result<User> {
        let mut store = self.store.write();
        let user = store
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| anyhow::anyhow!("User not found"))?;

        if let Some(name) = dto.name {
            user.name = name;
        }
        if let Some(email) = dto.email {
            user.email = email;
        }
        if let Some(age) = dto.age {
            user.age = age;
        }
        if let Some(bio) = dto.bio {
            user.bio = Some(bio);
        }
        Ok(user.clone())
    }

    pub fn remove(&self, id: u32) -> anyhow::Result<User> {
        let mut store = self.store.write();
        let index = store
            .users
            .iter()
            .position(|u| u.id == id)
            .ok_or_else(|| anyhow::anyhow!("User not found"))?;
        Ok(store.users.remove(index))
    }
}
