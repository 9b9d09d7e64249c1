//! Aggregates shown on the dashboard tab.
//!
//! All functions are pure and work on snapshots already fetched from the services.
//!
use chrono::{DateTime, Local, Utc};

use crate::model::{Role, User};

/// Number of users assigned to one role.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoleCount {
    pub role: String,
    pub count: usize,
}

/// One line of the recent activity feed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActivityEntry {
    pub action: &'static str,
    pub details: String,
    pub at: DateTime<Utc>,
}

impl ActivityEntry {
    /// Timestamp in the operator's local time zone.
    pub fn time(&self) -> String {
        self.at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// Headline numbers for the dashboard cards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_users: usize,
    pub active_roles: usize,
    /// Sum of every role's permission list length, duplicates included.
    pub permissions: usize,
}

pub const RECENT_ACTIVITY_LIMIT: usize = 3;

/// Users per role, in role order. Matching is exact on the role name; users naming
/// no existing role are not counted anywhere.
pub fn role_distribution(roles: &[Role], users: &[User]) -> Vec<RoleCount> {
    roles
        .iter()
        .map(|role| RoleCount {
            role: role.name.clone(),
            count: users.iter().filter(|u| u.role == role.name).count(),
        })
        .collect()
}

/// The newest users first, at most [`RECENT_ACTIVITY_LIMIT`]. Equal timestamps keep store order.
pub fn recent_activity(users: &[User]) -> Vec<ActivityEntry> {
    let mut sorted: Vec<&User> = users.iter().collect();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted
        .into_iter()
        .take(RECENT_ACTIVITY_LIMIT)
        .map(|u| ActivityEntry {
            action: "User Added",
            details: format!("{} ({})", u.name, u.role),
            at: u.created_at,
        })
        .collect()
}

pub fn summarize(roles: &[Role], users: &[User]) -> DashboardStats {
    DashboardStats {
        total_users: users.len(),
        active_roles: roles.len(),
        permissions: roles.iter().map(|r| r.permissions.len()).sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UserStatus;
    use chrono::{Duration, TimeZone};

    fn role(name: &str, perms: usize) -> Role {
        Role {
            id: name.into(),
            name: name.into(),
            description: String::new(),
            permissions: (0..perms).map(|i| format!("p{i}")).collect(),
        }
    }

    fn user(name: &str, role: &str, at: DateTime<Utc>) -> User {
        User {
            id: name.into(),
            name: name.into(),
            email: String::new(),
            role: role.into(),
            status: UserStatus::Active,
            created_at: at,
        }
    }

    #[test]
    fn distribution_skips_unknown_roles() {
        let now = Utc::now();
        let roles = vec![role("Admin", 0), role("Manager", 0)];
        let users = vec![
            user("a", "Admin", now),
            user("b", "Admin", now),
            user("c", "Manager", now),
            user("d", "Ghost", now),
        ];
        let dist = role_distribution(&roles, &users);
        assert_eq!(
            dist,
            vec![
                RoleCount { role: "Admin".into(), count: 2 },
                RoleCount { role: "Manager".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn distribution_is_case_sensitive() {
        let roles = vec![role("Admin", 0)];
        let users = vec![user("a", "admin", Utc::now())];
        assert_eq!(role_distribution(&roles, &users)[0].count, 0);
    }

    #[test]
    fn recent_activity_newest_first_capped_at_three() {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let users = vec![
            user("oldest", "Admin", base),
            user("newest", "Manager", base + Duration::hours(3)),
            user("middle", "Admin", base + Duration::hours(1)),
            user("second", "Admin", base + Duration::hours(2)),
        ];
        let feed = recent_activity(&users);
        assert_eq!(feed.len(), 3);
        assert_eq!(feed[0].details, "newest (Manager)");
        assert_eq!(feed[1].details, "second (Admin)");
        assert_eq!(feed[2].details, "middle (Admin)");
        assert!(feed.windows(2).all(|w| w[0].at > w[1].at));
        assert_eq!(feed[0].action, "User Added");
        assert!(!feed[0].time().is_empty());
    }

    #[test]
    fn recent_activity_ties_keep_input_order() {
        let at = Utc::now();
        let users = vec![user("first", "A", at), user("second", "A", at)];
        let feed = recent_activity(&users);
        assert_eq!(feed[0].details, "first (A)");
        assert_eq!(feed[1].details, "second (A)");
        assert!(recent_activity(&[]).is_empty());
    }

    #[test]
    fn summary_counts_permission_grants() {
        let roles = vec![role("Admin", 8), role("Manager", 3)];
        let users = vec![user("a", "Admin", Utc::now())];
        let s = summarize(&roles, &users);
        assert_eq!(s.total_users, 1);
        assert_eq!(s.active_roles, 2);
        assert_eq!(s.permissions, 11);
    }
}
