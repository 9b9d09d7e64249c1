//! In-memory entity store: the single source of truth for users and roles.
//!
//! Each collection sits behind its own mutex. Operations never span both
//! collections and never suspend, so the locks are never contended.
//!
pub mod seed;

use chrono::Utc;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;
use uuid::Uuid;

use crate::error::{EntityKind, RbacError, Result};
use crate::model::{NewRole, NewUser, Role, RolePatch, User, UserPatch};

#[derive(Debug, Default)]
pub struct MemoryStore {
    users: Mutex<Vec<User>>,
    roles: Mutex<Vec<Role>>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding the two demo users and two demo roles.
    pub fn seeded() -> Self {
        Self::with_data(seed::users(), seed::roles())
    }

    pub fn with_data(users: Vec<User>, roles: Vec<Role>) -> Self {
        Self {
            users: Mutex::new(users),
            roles: Mutex::new(roles),
        }
    }

    pub fn list_users(&self) -> Vec<User> {
        lock(&self.users).clone()
    }

    pub fn create_user(&self, data: NewUser) -> User {
        let user = User {
            id: new_id(),
            name: data.name,
            email: data.email,
            role: data.role,
            status: data.status,
            created_at: Utc::now(),
        };
        lock(&self.users).push(user.clone());
        debug!(id = %user.id, name = %user.name, "user created");
        user
    }

    pub fn update_user(&self, id: &str, patch: UserPatch) -> Result<User> {
        let mut users = lock(&self.users);
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| RbacError::not_found(EntityKind::User, id))?;
        patch.apply_to(user);
        debug!(id, "user updated");
        Ok(user.clone())
    }

    pub fn delete_user(&self, id: &str) -> Result<()> {
        let mut users = lock(&self.users);
        let idx = users
            .iter()
            .position(|u| u.id == id)
            .ok_or_else(|| RbacError::not_found(EntityKind::User, id))?;
        users.remove(idx);
        debug!(id, "user deleted");
        Ok(())
    }

    pub fn list_roles(&self) -> Vec<Role> {
        lock(&self.roles).clone()
    }

    pub fn create_role(&self, data: NewRole) -> Role {
        let role = Role {
            id: new_id(),
            name: data.name,
            description: data.description,
            permissions: data.permissions,
        };
        lock(&self.roles).push(role.clone());
        debug!(id = %role.id, name = %role.name, "role created");
        role
    }

    pub fn update_role(&self, id: &str, patch: RolePatch) -> Result<Role> {
        let mut roles = lock(&self.roles);
        let role = roles
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| RbacError::not_found(EntityKind::Role, id))?;
        patch.apply_to(role);
        debug!(id, "role updated");
        Ok(role.clone())
    }

    pub fn delete_role(&self, id: &str) -> Result<()> {
        let mut roles = lock(&self.roles);
        let idx = roles
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| RbacError::not_found(EntityKind::Role, id))?;
        roles.remove(idx);
        debug!(id, "role deleted");
        Ok(())
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

// A panic while holding the guard cannot leave a half-written record behind,
// so a poisoned lock still guards consistent data.
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UserStatus;

    fn new_user(name: &str, role: &str) -> NewUser {
        NewUser {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            role: role.to_string(),
            status: UserStatus::Active,
        }
    }

    #[test]
    fn seeded_store_has_demo_data() {
        let store = MemoryStore::seeded();
        let users = store.list_users();
        let roles = store.list_roles();
        assert_eq!(users.len(), 2);
        assert_eq!(roles.len(), 2);
        assert_eq!(users[0].name, "John Doe");
        assert_eq!(users[1].role, "Manager");
        assert_eq!(roles[0].permissions.len(), 8);
        assert_eq!(roles[1].permissions, vec!["user_view", "user_create", "role_view"]);
    }

    #[test]
    fn create_assigns_fresh_unique_ids() {
        let store = MemoryStore::seeded();
        let existing: Vec<String> = store.list_users().into_iter().map(|u| u.id).collect();
        let a = store.create_user(new_user("Alice", "Admin"));
        let b = store.create_user(new_user("Bob", "Admin"));
        assert!(!a.id.is_empty());
        assert_ne!(a.id, b.id);
        assert!(!existing.contains(&a.id));
        assert!(!existing.contains(&b.id));
        assert_eq!(store.list_users().len(), 4);

        let r = store.create_role(NewRole {
            name: "Auditor".into(),
            ..Default::default()
        });
        assert!(store.list_roles().iter().filter(|x| x.id == r.id).count() == 1);
    }

    #[test]
    fn update_preserves_created_at_and_absent_fields() {
        let store = MemoryStore::new();
        let u = store.create_user(new_user("Alice", "Admin"));
        let updated = store
            .update_user(
                &u.id,
                UserPatch {
                    role: Some("Manager".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.role, "Manager");
        assert_eq!(updated.name, u.name);
        assert_eq!(updated.email, u.email);
        assert_eq!(updated.status, u.status);
        assert_eq!(updated.created_at, u.created_at);
        assert_eq!(store.list_users()[0], updated);
    }

    #[test]
    fn missing_id_is_not_found_and_leaves_collection_unchanged() {
        let store = MemoryStore::seeded();
        let users_before = store.list_users();
        let roles_before = store.list_roles();

        let err = store.update_user("nope", UserPatch::default()).unwrap_err();
        assert_eq!(err, RbacError::not_found(EntityKind::User, "nope"));
        assert!(store.delete_user("nope").unwrap_err().is_not_found());
        assert!(store.update_role("nope", RolePatch::default()).unwrap_err().is_not_found());
        assert!(store.delete_role("nope").unwrap_err().is_not_found());

        assert_eq!(store.list_users(), users_before);
        assert_eq!(store.list_roles(), roles_before);
    }

    #[test]
    fn delete_removes_only_the_target() {
        let store = MemoryStore::seeded();
        store.delete_user("1").unwrap();
        let users = store.list_users();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id, "2");
        store.delete_role("2").unwrap();
        assert_eq!(store.list_roles().len(), 1);
        // deleting a role leaves users that reference it by name alone
        assert_eq!(store.list_users()[0].role, "Manager");
    }

    #[test]
    fn snapshots_are_independent_of_the_store() {
        let store = MemoryStore::seeded();
        let mut snap = store.list_users();
        snap.clear();
        let mut roles = store.list_roles();
        roles[0].permissions.push("dashboard_view".into());
        assert_eq!(store.list_users().len(), 2);
        assert_eq!(store.list_roles()[0].permissions.len(), 8);
    }
}
