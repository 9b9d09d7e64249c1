//! Filters configuration: parse/write `filter.conf` and apply to AppState.
//!
//! The file holds the filters the users and roles lists start with:
//!
//! ```text
//! user_role = All          # or a role name, e.g. Admin
//! user_status = All        # All|active|inactive
//! role_category = All      # All|USER|ROLE|DASHBOARD
//! ```

use std::path::Path;
use tracing::warn;

use super::{AppState, ListFilters, parse_kv_lines};
use crate::model::UserStatus;
use crate::permissions::CategoryFilter;

/// Filter settings that can be loaded from or saved to a configuration file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FiltersConfig {
    pub filters: ListFilters,
}

impl FiltersConfig {
    /// Extract the current filter state from an [`AppState`].
    pub fn from_app(app: &AppState) -> Self {
        Self {
            filters: app.filters.clone(),
        }
    }

    /// Save the filters currently active in `app` to `path`.
    pub fn save_from_app(app: &AppState, path: &Path) -> std::io::Result<()> {
        Self::from_app(app).write_file(path)
    }

    /// Load filters from `path`, or write the all-off defaults there if it does not exist.
    pub fn load_or_init(path: &Path) -> Self {
        if path.exists() {
            return Self::from_file(path).unwrap_or_default();
        }
        let cfg = Self::default();
        if let Err(e) = cfg.write_file(path) {
            warn!(path = %path.display(), error = %e, "could not write default filters");
        }
        cfg
    }

    /// Load filters from a configuration file. Unknown keys and unparsable values are skipped.
    ///
    /// # Returns
    ///
    /// `Some(config)` if the file exists and is readable; `None` otherwise.
    pub fn from_file(path: &Path) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        let mut cfg = Self::default();
        for (lhs, rhs) in parse_kv_lines(&contents) {
            let all = rhs.eq_ignore_ascii_case("all") || rhs.eq_ignore_ascii_case("none");
            match lhs {
                "user_role" => {
                    cfg.filters.user_role = if all { None } else { Some(rhs.to_string()) };
                }
                "user_status" => {
                    if all {
                        cfg.filters.user_status = None;
                    } else if let Some(s) = UserStatus::parse(rhs) {
                        cfg.filters.user_status = Some(s);
                    }
                }
                "role_category" => {
                    if let Some(c) = CategoryFilter::parse(rhs) {
                        cfg.filters.role_category = c;
                    }
                }
                _ => {}
            }
        }
        Some(cfg)
    }

    /// Write the filter state to `path` in `key = value` format.
    pub fn write_file(&self, path: &Path) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let f = &self.filters;
        let mut buf = String::new();
        buf.push_str("# rbac-dashboard filters\n");
        buf.push_str("# user_role: All or a role name\n");
        let _ = writeln!(&mut buf, "user_role = {}", f.user_role.as_deref().unwrap_or("All"));
        buf.push_str("# user_status: All|active|inactive\n");
        let _ = writeln!(
            &mut buf,
            "user_status = {}",
            f.user_status.map(UserStatus::as_str).unwrap_or("All")
        );
        buf.push_str("# role_category: All|USER|ROLE|DASHBOARD\n");
        let _ = writeln!(&mut buf, "role_category = {}", f.role_category.label());
        std::fs::write(path, buf)
    }

    /// Apply the filters to an [`AppState`]. The visible lists are not recomputed here.
    pub fn apply_to(&self, app: &mut AppState) {
        app.filters = self.filters.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permissions::PermissionCategory;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn tmp_path(tag: &str) -> std::path::PathBuf {
        let n = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
        std::env::temp_dir().join(format!("rbacd_{tag}_{}_{n}.conf", std::process::id()))
    }

    #[test]
    fn filters_roundtrip() {
        let path = tmp_path("filters");
        let cfg = FiltersConfig {
            filters: ListFilters {
                user_role: Some("Manager".into()),
                user_status: Some(UserStatus::Inactive),
                role_category: CategoryFilter::Only(PermissionCategory::Dashboard),
            },
        };
        cfg.write_file(&path).unwrap();
        let back = FiltersConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(back, cfg);
    }

    #[test]
    fn all_values_and_garbage_fall_back_to_defaults() {
        let path = tmp_path("filters_all");
        std::fs::write(&path, "user_role = All\nuser_status = sleeping\nrole_category = nope\nextra = 1\n").unwrap();
        let cfg = FiltersConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(cfg, FiltersConfig::default());
    }

    #[test]
    fn load_or_init_writes_defaults() {
        let path = tmp_path("filters_init");
        let _ = std::fs::remove_file(&path);
        let cfg = FiltersConfig::load_or_init(&path);
        assert!(path.exists());
        std::fs::remove_file(&path).ok();
        assert_eq!(cfg, FiltersConfig::default());
    }
}
