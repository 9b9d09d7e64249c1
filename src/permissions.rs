//! Permission vocabulary and the categories used to filter the roles list.
//!
//! Categories only drive filtering and the role form layout. Nothing here
//! grants or denies anything.

use std::fmt::{Display, Formatter};

use crate::model::Role;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PermissionCategory {
    User,
    Role,
    Dashboard,
}

impl PermissionCategory {
    pub const ALL: [PermissionCategory; 3] = [
        PermissionCategory::User,
        PermissionCategory::Role,
        PermissionCategory::Dashboard,
    ];

    /// Permission names belonging to this category.
    pub fn permissions(self) -> &'static [&'static str] {
        match self {
            PermissionCategory::User => &["user_view", "user_create", "user_edit", "user_delete"],
            PermissionCategory::Role => &["role_view", "role_create", "role_edit", "role_delete"],
            PermissionCategory::Dashboard => &["dashboard_view", "dashboard_analytics"],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PermissionCategory::User => "USER",
            PermissionCategory::Role => "ROLE",
            PermissionCategory::Dashboard => "DASHBOARD",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USER" => Some(PermissionCategory::User),
            "ROLE" => Some(PermissionCategory::Role),
            "DASHBOARD" => Some(PermissionCategory::Dashboard),
            _ => None,
        }
    }

    /// True when at least one of `permissions` is in this category.
    pub fn overlaps<S: AsRef<str>>(self, permissions: &[S]) -> bool {
        let table = self.permissions();
        permissions
            .iter()
            .any(|p| table.iter().any(|known| *known == p.as_ref()))
    }
}

impl Display for PermissionCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category filter for the roles list; `All` disables it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(PermissionCategory),
}

impl CategoryFilter {
    /// Filter choices in menu order.
    pub fn options() -> Vec<CategoryFilter> {
        std::iter::once(CategoryFilter::All)
            .chain(PermissionCategory::ALL.into_iter().map(CategoryFilter::Only))
            .collect()
    }

    pub fn matches(self, role: &Role) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => c.overlaps(role.permissions.as_slice()),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CategoryFilter::All => "All",
            CategoryFilter::Only(c) => c.as_str(),
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Some(CategoryFilter::All);
        }
        PermissionCategory::parse(s).map(CategoryFilter::Only)
    }
}

/// Every permission the role form offers, grouped by category order.
pub fn vocabulary() -> Vec<&'static str> {
    PermissionCategory::ALL
        .iter()
        .flat_map(|c| c.permissions().iter().copied())
        .collect()
}

/// Human label for a permission name: `user_view` becomes `user view`.
pub fn display_name(permission: &str) -> String {
    permission.replace('_', " ")
}
