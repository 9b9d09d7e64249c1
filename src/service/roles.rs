use std::sync::Arc;
use tracing::error;

use super::RoleBackend;
use crate::error::Result;
use crate::model::{NewRole, Role, RolePatch};

#[derive(Clone)]
pub struct RoleService {
    backend: Arc<dyn RoleBackend>,
}

impl RoleService {
    pub fn new(backend: Arc<dyn RoleBackend>) -> Self {
        Self { backend }
    }

    pub async fn get_all(&self) -> Result<Vec<Role>> {
        self.backend
            .list_roles()
            .await
            .inspect_err(|e| error!(entity = "role", op = "get_all", error = %e, "Error fetching roles"))
    }

    pub async fn create(&self, data: NewRole) -> Result<Role> {
        self.backend
            .create_role(data)
            .await
            .inspect_err(|e| error!(entity = "role", op = "create", error = %e, "Error creating role"))
    }

    pub async fn update(&self, id: &str, patch: RolePatch) -> Result<Role> {
        self.backend
            .update_role(id, patch)
            .await
            .inspect_err(|e| error!(entity = "role", op = "update", id, error = %e, "Error updating role"))
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.backend
            .delete_role(id)
            .await
            .inspect_err(|e| error!(entity = "role", op = "delete", id, error = %e, "Error deleting role"))
    }
}
