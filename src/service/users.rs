use std::sync::Arc;
use tracing::error;

use super::UserBackend;
use crate::error::Result;
use crate::model::{NewUser, User, UserPatch};

#[derive(Clone)]
pub struct UserService {
    backend: Arc<dyn UserBackend>,
}

impl UserService {
    pub fn new(backend: Arc<dyn UserBackend>) -> Self {
        Self { backend }
    }

    pub async fn get_all(&self) -> Result<Vec<User>> {
        self.backend
            .list_users()
            .await
            .inspect_err(|e| error!(entity = "user", op = "get_all", error = %e, "Error fetching users"))
    }

    pub async fn create(&self, data: NewUser) -> Result<User> {
        self.backend
            .create_user(data)
            .await
            .inspect_err(|e| error!(entity = "user", op = "create", error = %e, "Error creating user"))
    }

    pub async fn update(&self, id: &str, patch: UserPatch) -> Result<User> {
        self.backend
            .update_user(id, patch)
            .await
            .inspect_err(|e| error!(entity = "user", op = "update", id, error = %e, "Error updating user"))
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.backend
            .delete_user(id)
            .await
            .inspect_err(|e| error!(entity = "user", op = "delete", id, error = %e, "Error deleting user"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{EntityKind, RbacError};
    use crate::model::UserStatus;
    use crate::store::MemoryStore;

    fn service() -> UserService {
        UserService::new(Arc::new(MemoryStore::seeded()))
    }

    #[tokio::test]
    async fn create_then_update_keeps_created_at() {
        let svc = service();
        let created = svc
            .create(NewUser {
                name: "Alice Liddell".into(),
                email: "alice@example.com".into(),
                role: "Manager".into(),
                status: UserStatus::Inactive,
            })
            .await
            .unwrap();
        let updated = svc
            .update(
                &created.id,
                UserPatch {
                    name: Some("Alice L.".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Alice L.");
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.status, UserStatus::Inactive);
        assert_eq!(svc.get_all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn not_found_passes_through_unchanged() {
        let svc = service();
        let err = svc.delete("missing").await.unwrap_err();
        assert_eq!(err, RbacError::not_found(EntityKind::User, "missing"));
        let err = svc.update("missing", UserPatch::default()).await.unwrap_err();
        assert_eq!(err.to_string(), "User not found");
        assert_eq!(svc.get_all().await.unwrap().len(), 2);
    }
}
