//! Demo records loaded by [`MemoryStore::seeded`](super::MemoryStore::seeded).

use chrono::Utc;

use crate::model::{Role, User, UserStatus};

pub fn users() -> Vec<User> {
    let now = Utc::now();
    vec![
        User {
            id: "1".to_string(),
            name: "John Doe".to_string(),
            email: "john@vrvsecurity.com".to_string(),
            role: "Admin".to_string(),
            status: UserStatus::Active,
            created_at: now,
        },
        User {
            id: "2".to_string(),
            name: "Jane Smith".to_string(),
            email: "jane@vrvsecurity.com".to_string(),
            role: "Manager".to_string(),
            status: UserStatus::Active,
            created_at: now,
        },
    ]
}

pub fn roles() -> Vec<Role> {
    vec![
        Role {
            id: "1".to_string(),
            name: "Admin".to_string(),
            description: "Full system access".to_string(),
            permissions: [
                "user_view",
                "user_create",
                "user_edit",
                "user_delete",
                "role_view",
                "role_create",
                "role_edit",
                "role_delete",
            ]
            .iter()
            .map(|p| p.to_string())
            .collect(),
        },
        Role {
            id: "2".to_string(),
            name: "Manager".to_string(),
            description: "Limited access".to_string(),
            permissions: ["user_view", "user_create", "role_view"]
                .iter()
                .map(|p| p.to_string())
                .collect(),
        },
    ]
}
