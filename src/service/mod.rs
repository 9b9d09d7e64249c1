//! Service façades between the view layer and whatever holds the data.
//!
//! The backend traits are the seam where a networked implementation would
//! replace [`MemoryStore`]. The façades only forward calls; on failure they log
//! which entity and operation failed and hand back the same error.
//!
mod roles;
mod users;

pub use roles::RoleService;
pub use users::UserService;

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;
use crate::model::{NewRole, NewUser, Role, RolePatch, User, UserPatch};
use crate::store::MemoryStore;

#[async_trait]
pub trait UserBackend: Send + Sync {
    async fn list_users(&self) -> Result<Vec<User>>;
    async fn create_user(&self, data: NewUser) -> Result<User>;
    async fn update_user(&self, id: &str, patch: UserPatch) -> Result<User>;
    async fn delete_user(&self, id: &str) -> Result<()>;
}

#[async_trait]
pub trait RoleBackend: Send + Sync {
    async fn list_roles(&self) -> Result<Vec<Role>>;
    async fn create_role(&self, data: NewRole) -> Result<Role>;
    async fn update_role(&self, id: &str, patch: RolePatch) -> Result<Role>;
    async fn delete_role(&self, id: &str) -> Result<()>;
}

#[async_trait]
impl UserBackend for MemoryStore {
    async fn list_users(&self) -> Result<Vec<User>> {
        Ok(MemoryStore::list_users(self))
    }

    async fn create_user(&self, data: NewUser) -> Result<User> {
        Ok(MemoryStore::create_user(self, data))
    }

    async fn update_user(&self, id: &str, patch: UserPatch) -> Result<User> {
        MemoryStore::update_user(self, id, patch)
    }

    async fn delete_user(&self, id: &str) -> Result<()> {
        MemoryStore::delete_user(self, id)
    }
}

#[async_trait]
impl RoleBackend for MemoryStore {
    async fn list_roles(&self) -> Result<Vec<Role>> {
        Ok(MemoryStore::list_roles(self))
    }

    async fn create_role(&self, data: NewRole) -> Result<Role> {
        Ok(MemoryStore::create_role(self, data))
    }

    async fn update_role(&self, id: &str, patch: RolePatch) -> Result<Role> {
        MemoryStore::update_role(self, id, patch)
    }

    async fn delete_role(&self, id: &str) -> Result<()> {
        MemoryStore::delete_role(self, id)
    }
}

/// Both façades, as handed to the view layer at startup.
#[derive(Clone)]
pub struct Services {
    pub users: UserService,
    pub roles: RoleService,
}

impl Services {
    pub fn new(users: UserService, roles: RoleService) -> Self {
        Self { users, roles }
    }

    /// Façades over a single in-memory store.
    pub fn in_memory(store: Arc<MemoryStore>) -> Self {
        Self {
            users: UserService::new(store.clone()),
            roles: RoleService::new(store),
        }
    }

    /// Load users and roles together. The two reads are independent.
    pub async fn fetch_all(&self) -> Result<(Vec<User>, Vec<Role>)> {
        tokio::try_join!(self.users.get_all(), self.roles.get_all())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fetch_all_reads_both_collections() {
        let services = Services::in_memory(Arc::new(MemoryStore::seeded()));
        let (users, roles) = services.fetch_all().await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(roles.len(), 2);
    }

    #[tokio::test]
    async fn services_share_one_store() {
        let store = Arc::new(MemoryStore::new());
        let services = Services::in_memory(store.clone());
        services
            .roles
            .create(NewRole {
                name: "Viewer".into(),
                description: String::new(),
                permissions: vec!["dashboard_view".into()],
            })
            .await
            .unwrap();
        assert_eq!(store.list_roles().len(), 1);
        assert!(store.list_users().is_empty());
    }
}
