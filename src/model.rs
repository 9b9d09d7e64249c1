//! Entity records held by the store and the inputs used to create and patch them.
//!
//! `User.role` names a [`Role`] by its `name`, not its `id`. Nothing keeps the two
//! in sync: renaming or deleting a role leaves users pointing at the old name.

use chrono::{DateTime, Utc};
use std::fmt::{Display, Formatter};

/// Account status shown in the users table and used by the status filter.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
}

impl UserStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Some(UserStatus::Active),
            "inactive" => Some(UserStatus::Inactive),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            UserStatus::Active => UserStatus::Inactive,
            UserStatus::Inactive => UserStatus::Active,
        }
    }
}

impl Display for UserStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Role {
    pub id: String,
    pub name: String,
    pub description: String,
    pub permissions: Vec<String>,
}

/// Fields supplied when creating a user; the store assigns `id` and `created_at`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: String,
    pub status: UserStatus,
}

/// Fields supplied when creating a role; the store assigns `id`.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct NewRole {
    pub name: String,
    pub description: String,
    pub permissions: Vec<String>,
}

/// Partial user update. `None` keeps the stored value.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub status: Option<UserStatus>,
}

impl UserPatch {
    /// Shallow-merge this patch over `user`.
    pub fn apply_to(self, user: &mut User) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(status) = self.status {
            user.status = status;
        }
    }
}

impl From<NewUser> for UserPatch {
    fn from(u: NewUser) -> Self {
        Self {
            name: Some(u.name),
            email: Some(u.email),
            role: Some(u.role),
            status: Some(u.status),
        }
    }
}

/// Partial role update. `None` keeps the stored value.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct RolePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub permissions: Option<Vec<String>>,
}

impl RolePatch {
    /// Shallow-merge this patch over `role`. A supplied permission list replaces the old one.
    pub fn apply_to(self, role: &mut Role) {
        if let Some(name) = self.name {
            role.name = name;
        }
        if let Some(description) = self.description {
            role.description = description;
        }
        if let Some(permissions) = self.permissions {
            role.permissions = permissions;
        }
    }
}

impl From<NewRole> for RolePatch {
    fn from(r: NewRole) -> Self {
        Self {
            name: Some(r.name),
            description: Some(r.description),
            permissions: Some(r.permissions),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: "u1".into(),
            name: "John Doe".into(),
            email: "john@vrvsecurity.com".into(),
            role: "Admin".into(),
            status: UserStatus::Active,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn user_patch_only_touches_supplied_fields() {
        let mut u = sample_user();
        let before = u.clone();
        UserPatch {
            status: Some(UserStatus::Inactive),
            ..Default::default()
        }
        .apply_to(&mut u);
        assert_eq!(u.status, UserStatus::Inactive);
        assert_eq!(u.name, before.name);
        assert_eq!(u.email, before.email);
        assert_eq!(u.role, before.role);
        assert_eq!(u.created_at, before.created_at);
        assert_eq!(u.id, before.id);
    }

    #[test]
    fn role_patch_replaces_permission_list() {
        let mut r = Role {
            id: "r1".into(),
            name: "Ops".into(),
            description: "on call".into(),
            permissions: vec!["user_view".into()],
        };
        RolePatch {
            permissions: Some(vec!["role_view".into(), "role_view".into()]),
            ..Default::default()
        }
        .apply_to(&mut r);
        assert_eq!(r.permissions, vec!["role_view", "role_view"]);
        assert_eq!(r.description, "on call");
    }

    #[test]
    fn status_parse_and_toggle() {
        assert_eq!(UserStatus::parse(" Active "), Some(UserStatus::Active));
        assert_eq!(UserStatus::parse("inactive"), Some(UserStatus::Inactive));
        assert_eq!(UserStatus::parse("gone"), None);
        assert_eq!(UserStatus::Active.toggled(), UserStatus::Inactive);
    }
}
