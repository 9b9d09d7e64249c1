use crate::app::{ActiveTab, AppState};
use crate::model::{Role, User, UserStatus};
use crate::permissions::CategoryFilter;

/// Case-insensitive substring match of `term` against `name`. An empty term matches everything.
pub fn name_matches(name: &str, term: &str) -> bool {
    term.is_empty() || name.to_lowercase().contains(&term.to_lowercase())
}

/// Users list filter. `None` on `role`/`status` means "All".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserQuery {
    pub text: String,
    pub role: Option<String>,
    pub status: Option<UserStatus>,
}

impl UserQuery {
    pub fn matches(&self, user: &User) -> bool {
        name_matches(&user.name, &self.text)
            && self.role.as_deref().is_none_or(|r| user.role == r)
            && self.status.is_none_or(|s| user.status == s)
    }
}

/// Roles list filter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoleQuery {
    pub text: String,
    pub category: CategoryFilter,
}

impl RoleQuery {
    pub fn matches(&self, role: &Role) -> bool {
        name_matches(&role.name, &self.text) && self.category.matches(role)
    }
}

pub fn filter_users(users: &[User], query: &UserQuery) -> Vec<User> {
    users.iter().filter(|u| query.matches(u)).cloned().collect()
}

pub fn filter_roles(roles: &[Role], query: &RoleQuery) -> Vec<Role> {
    roles.iter().filter(|r| query.matches(r)).cloned().collect()
}

/// Choices for the users role filter, `None` ("All") excluded: role names in
/// store order, then names only found on users so orphaned assignments stay reachable.
pub fn role_filter_options(roles: &[Role], users: &[User]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(roles.len());
    for name in roles.iter().map(|r| &r.name).chain(users.iter().map(|u| &u.role)) {
        if !name.is_empty() && !out.contains(name) {
            out.push(name.clone());
        }
    }
    out
}

/// Recompute the visible users/roles from the full snapshots, the active filters,
/// and the search query. The query only narrows the list of the active tab.
pub fn apply_filters_and_search(app: &mut AppState) {
    let term = app.search_query.trim().to_string();
    let user_query = UserQuery {
        text: if app.active_tab == ActiveTab::Users { term.clone() } else { String::new() },
        role: app.filters.user_role.clone(),
        status: app.filters.user_status,
    };
    let role_query = RoleQuery {
        text: if app.active_tab == ActiveTab::Roles { term } else { String::new() },
        category: app.filters.role_category,
    };
    app.users = filter_users(&app.users_all, &user_query);
    app.roles = filter_roles(&app.roles_all, &role_query);
    app.selected_user_index = app.selected_user_index.min(app.users.len().saturating_sub(1));
    app.selected_role_index = app.selected_role_index.min(app.roles.len().saturating_sub(1));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::PermissionCategory;
    use chrono::Utc;

    fn mk_user(name: &str, role: &str, status: UserStatus) -> User {
        User {
            id: name.to_lowercase(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            role: role.to_string(),
            status,
            created_at: Utc::now(),
        }
    }

    fn mk_role(name: &str, perms: &[&str]) -> Role {
        Role {
            id: name.to_lowercase(),
            name: name.to_string(),
            description: String::new(),
            permissions: perms.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn text_filter_is_case_insensitive() {
        let users = vec![
            mk_user("John Doe", "Admin", UserStatus::Active),
            mk_user("Jane Smith", "Manager", UserStatus::Active),
        ];
        let q = UserQuery {
            text: "jo".into(),
            ..Default::default()
        };
        let out = filter_users(&users, &q);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "John Doe");
        assert!(name_matches("Jane Smith", "SMITH"));
        assert!(name_matches("anything", ""));
    }

    #[test]
    fn user_filters_combine_with_and() {
        let users = vec![
            mk_user("John Doe", "Admin", UserStatus::Active),
            mk_user("Johanna Berg", "Admin", UserStatus::Inactive),
            mk_user("Jon Snow", "Manager", UserStatus::Active),
        ];
        let q = UserQuery {
            text: "jo".into(),
            role: Some("Admin".into()),
            status: Some(UserStatus::Inactive),
        };
        let out = filter_users(&users, &q);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "Johanna Berg");

        // role equality is exact
        let q = UserQuery {
            role: Some("admin".into()),
            ..Default::default()
        };
        assert!(filter_users(&users, &q).is_empty());
    }

    #[test]
    fn role_filters_text_and_category() {
        let roles = vec![
            mk_role("Admin", &["user_view", "role_create"]),
            mk_role("Analyst", &["dashboard_view"]),
            mk_role("Empty", &[]),
        ];
        let q = RoleQuery {
            text: "a".into(),
            category: CategoryFilter::Only(PermissionCategory::Dashboard),
        };
        let out = filter_roles(&roles, &q);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "Analyst");

        let q = RoleQuery::default();
        assert_eq!(filter_roles(&roles, &q).len(), 3);
    }

    #[test]
    fn role_options_include_orphans_once() {
        let roles = vec![mk_role("Admin", &[]), mk_role("Manager", &[])];
        let users = vec![
            mk_user("A", "Admin", UserStatus::Active),
            mk_user("G", "Ghost", UserStatus::Active),
            mk_user("H", "Ghost", UserStatus::Active),
        ];
        assert_eq!(role_filter_options(&roles, &users), vec!["Admin", "Manager", "Ghost"]);
    }
}
