//! Application state types and entry glue.
//!
//! Defines enums and structs that model the TUI state, as well as helpers
//! to construct defaults and to run the application loop (re-exported as `run`).
//!
pub mod filterconf;
pub mod forms;
pub mod keymap;
pub mod update;

use ratatui::style::Color;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::warn;

use crate::model::{Role, User, UserStatus};
use crate::permissions::CategoryFilter;
use crate::service::Services;
use crate::stats::{self, DashboardStats};
use forms::{RoleForm, UserForm};
use keymap::Keymap;

/// Top-level active tab in the UI.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ActiveTab {
    Dashboard,
    Users,
    Roles,
}

impl ActiveTab {
    pub const ALL: [ActiveTab; 3] = [ActiveTab::Dashboard, ActiveTab::Users, ActiveTab::Roles];

    pub fn next(self) -> Self {
        match self {
            ActiveTab::Dashboard => ActiveTab::Users,
            ActiveTab::Users => ActiveTab::Roles,
            ActiveTab::Roles => ActiveTab::Dashboard,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            ActiveTab::Dashboard => ActiveTab::Roles,
            ActiveTab::Users => ActiveTab::Dashboard,
            ActiveTab::Roles => ActiveTab::Users,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ActiveTab::Dashboard => "Dashboard",
            ActiveTab::Users => "Users",
            ActiveTab::Roles => "Roles",
        }
    }
}

/// Current input mode for key handling.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    Modal,
}

/// Color palette for theming the TUI.
#[derive(Clone, Copy, Debug)]
pub struct Theme {
    pub text: Color,
    pub muted: Color,
    pub title: Color,
    pub border: Color,
    pub header_bg: Color,
    pub header_fg: Color,
    pub status_bg: Color,
    pub status_fg: Color,
    pub highlight_fg: Color,
    pub highlight_bg: Color,
    pub accent: Color,
    pub success: Color,
    pub error: Color,
}

const THEME_KEYS: [&str; 13] = [
    "text",
    "muted",
    "title",
    "border",
    "header_bg",
    "header_fg",
    "status_bg",
    "status_fg",
    "highlight_fg",
    "highlight_bg",
    "accent",
    "success",
    "error",
];

impl Theme {
    /// Plain dark theme using named terminal colors.
    pub fn dark() -> Self {
        Self {
            text: Color::Gray,
            muted: Color::DarkGray,
            title: Color::Cyan,
            border: Color::Gray,
            header_bg: Color::Black,
            header_fg: Color::Cyan,
            status_bg: Color::DarkGray,
            status_fg: Color::Black,
            highlight_fg: Color::Yellow,
            highlight_bg: Color::Reset,
            accent: Color::Magenta,
            success: Color::Green,
            error: Color::Red,
        }
    }

    /// Catppuccin Mocha theme defaults.
    pub fn mocha() -> Self {
        // Palette reference: https://github.com/catppuccin/catppuccin
        Self {
            text: Color::Rgb(0xcd, 0xd6, 0xf4),         // text
            muted: Color::Rgb(0x7f, 0x84, 0x9c),        // overlay1
            title: Color::Rgb(0xcb, 0xa6, 0xf7),        // mauve
            border: Color::Rgb(0x58, 0x5b, 0x70),       // surface2
            header_bg: Color::Rgb(0x31, 0x32, 0x44),    // surface0
            header_fg: Color::Rgb(0xb4, 0xbe, 0xfe),    // lavender
            status_bg: Color::Rgb(0x45, 0x47, 0x5a),    // surface1
            status_fg: Color::Rgb(0xcd, 0xd6, 0xf4),    // text
            highlight_fg: Color::Rgb(0xf9, 0xe2, 0xaf), // yellow
            highlight_bg: Color::Rgb(0x45, 0x47, 0x5a), // surface1
            accent: Color::Rgb(0x89, 0xb4, 0xfa),       // blue
            success: Color::Rgb(0xa6, 0xe3, 0xa1),      // green
            error: Color::Rgb(0xf3, 0x8b, 0xa8),        // red
        }
    }

    fn slot(&mut self, key: &str) -> Option<&mut Color> {
        Some(match key {
            "text" => &mut self.text,
            "muted" => &mut self.muted,
            "title" => &mut self.title,
            "border" => &mut self.border,
            "header_bg" => &mut self.header_bg,
            "header_fg" => &mut self.header_fg,
            "status_bg" => &mut self.status_bg,
            "status_fg" => &mut self.status_fg,
            "highlight_fg" => &mut self.highlight_fg,
            "highlight_bg" => &mut self.highlight_bg,
            "accent" => &mut self.accent,
            "success" => &mut self.success,
            "error" => &mut self.error,
            _ => return None,
        })
    }

    /// Load theme from a `key = value` file. Unknown or missing keys fall back to `mocha`.
    pub fn from_file(path: &Path) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        let mut theme = Self::mocha();
        for (key, val) in parse_kv_lines(&contents) {
            if let (Some(color), Some(slot)) = (parse_color(val), theme.slot(key)) {
                *slot = color;
            }
        }
        Some(theme)
    }

    /// Persist the theme in `key = value` format.
    pub fn write_file(&self, path: &Path) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# rbac-dashboard theme\n");
        buf.push_str("# Colors: #RRGGBB, RRGGBB or 'reset'\n\n");
        let mut copy = *self;
        for key in THEME_KEYS {
            if let Some(c) = copy.slot(key) {
                let _ = writeln!(&mut buf, "{} = {}", key, color_to_str(*c));
            }
        }
        std::fs::write(path, buf)
    }

    /// Load the theme file, writing the default one first if it does not exist.
    pub fn load_or_init(path: &Path) -> Self {
        if path.exists() {
            return Self::from_file(path).unwrap_or_else(Self::mocha);
        }
        let t = Self::mocha();
        if let Err(e) = t.write_file(path) {
            warn!(path = %path.display(), error = %e, "could not write default theme");
        }
        t
    }
}

/// Parse a color from hex ("#RRGGBB" or "RRGGBB") or "reset".
fn parse_color(s: &str) -> Option<Color> {
    let lower = s.trim().to_ascii_lowercase();
    if lower == "reset" {
        return Some(Color::Reset);
    }
    let hex = lower.strip_prefix('#').unwrap_or(lower.as_str());
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
}

fn color_to_str(c: Color) -> String {
    let (r, g, b) = match c {
        Color::Rgb(r, g, b) => (r, g, b),
        Color::Reset => return "reset".to_string(),
        Color::Black => (0x00, 0x00, 0x00),
        Color::Red => (0xff, 0x00, 0x00),
        Color::Green => (0x00, 0xff, 0x00),
        Color::Yellow => (0xff, 0xff, 0x00),
        Color::Blue => (0x00, 0x00, 0xff),
        Color::Magenta => (0xff, 0x00, 0xff),
        Color::Cyan => (0x00, 0xff, 0xff),
        Color::Gray => (0xb3, 0xb3, 0xb3),
        Color::DarkGray => (0x4d, 0x4d, 0x4d),
        Color::LightRed => (0xff, 0x66, 0x66),
        Color::LightGreen => (0x66, 0xff, 0x66),
        Color::LightYellow => (0xff, 0xff, 0x66),
        Color::LightBlue => (0x66, 0x66, 0xff),
        Color::LightMagenta => (0xff, 0x66, 0xff),
        Color::LightCyan => (0x66, 0xff, 0xff),
        Color::White => (0xff, 0xff, 0xff),
        Color::Indexed(_) => return "reset".to_string(),
    };
    format!("#{:02X}{:02X}{:02X}", r, g, b)
}

/// Split `key = value` lines, skipping blanks, comments and lines missing either side.
pub(crate) fn parse_kv_lines(contents: &str) -> impl Iterator<Item = (&str, &str)> {
    contents.lines().filter_map(|raw| {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        let (lhs, rhs) = line.split_once('=')?;
        let (lhs, rhs) = (lhs.trim(), rhs.trim());
        if lhs.is_empty() || rhs.is_empty() { None } else { Some((lhs, rhs)) }
    })
}

/// Default directory for `theme.conf`, `keybinds.conf` and `filter.conf`.
pub fn default_config_dir() -> PathBuf {
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(xdg).join("rbac-dashboard");
    }
    if let Some(home) = std::env::var_os("HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(home).join(".config").join("rbac-dashboard");
    }
    PathBuf::from(".")
}

/// Filters applied on top of the search query. `None` means "All".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListFilters {
    pub user_role: Option<String>,
    pub user_status: Option<UserStatus>,
    pub role_category: CategoryFilter,
}

/// Which record a delete confirmation refers to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeleteTarget {
    User { id: String, name: String },
    Role { id: String, name: String },
}

/// Which list a filter menu entry changes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FilterField {
    UserRole,
    UserStatus,
    RoleCategory,
}

impl FilterField {
    pub fn title(self) -> &'static str {
        match self {
            FilterField::UserRole => "Filter by role",
            FilterField::UserStatus => "Filter by status",
            FilterField::RoleCategory => "Filter by permission category",
        }
    }

    /// The filter shown after pressing Left/Right in the menu; the roles list has only one.
    pub fn other(self) -> Self {
        match self {
            FilterField::UserRole => FilterField::UserStatus,
            FilterField::UserStatus => FilterField::UserRole,
            FilterField::RoleCategory => FilterField::RoleCategory,
        }
    }
}

/// Entries of the Enter menu for a row of the given tab.
pub fn action_items(tab: ActiveTab) -> &'static [&'static str] {
    match tab {
        ActiveTab::Users => &["Edit", "Toggle status", "Delete"],
        ActiveTab::Roles => &["Edit", "Delete"],
        ActiveTab::Dashboard => &[],
    }
}

/// Modal dialog states.
#[derive(Clone, Debug)]
pub enum ModalState {
    Actions {
        selected: usize,
    },
    FilterMenu {
        field: FilterField,
        selected: usize,
    },
    UserForm(UserForm),
    RoleForm(RoleForm),
    DeleteConfirm {
        target: DeleteTarget,
        selected: usize,
    },
    Info {
        message: String,
    },
    Help {
        scroll: u16,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Transient message shown in the status bar after an operation.
#[derive(Clone, Debug)]
pub struct Notification {
    pub kind: NoticeKind,
    pub message: String,
    pub raised_at: Instant,
}

pub const NOTIFICATION_TTL: Duration = Duration::from_secs(4);

impl Notification {
    pub fn is_expired(&self) -> bool {
        self.raised_at.elapsed() >= NOTIFICATION_TTL
    }
}

/// Store mutations issued by the forms and confirmations.
#[derive(Clone, Debug)]
pub enum Mutation {
    CreateUser(crate::model::NewUser),
    UpdateUser {
        id: String,
        patch: crate::model::UserPatch,
    },
    DeleteUser {
        id: String,
    },
    CreateRole(crate::model::NewRole),
    UpdateRole {
        id: String,
        patch: crate::model::RolePatch,
    },
    DeleteRole {
        id: String,
    },
}

pub struct AppState {
    pub started_at: Instant,
    pub services: Services,
    pub users_all: Vec<User>,
    pub users: Vec<User>,
    pub roles_all: Vec<Role>,
    pub roles: Vec<Role>,
    pub active_tab: ActiveTab,
    pub selected_user_index: usize,
    pub selected_role_index: usize,
    pub rows_per_page: usize,
    pub input_mode: InputMode,
    pub search_query: String,
    pub filters: ListFilters,
    pub theme: Theme,
    pub keymap: Keymap,
    pub modal: Option<ModalState>,
    pub notification: Option<Notification>,
    pub show_keybinds: bool,
    /// Login of the person running the dashboard, shown in the header.
    pub operator: String,
    /// Where `filter.conf` is rewritten when a filter changes; `None` keeps filters in memory only.
    pub config_dir: Option<PathBuf>,
}

impl AppState {
    /// State with default theme, keys and filters. Lists stay empty until [`refresh`](Self::refresh).
    pub fn new(services: Services) -> Self {
        Self {
            started_at: Instant::now(),
            services,
            users_all: Vec::new(),
            users: Vec::new(),
            roles_all: Vec::new(),
            roles: Vec::new(),
            active_tab: ActiveTab::Dashboard,
            selected_user_index: 0,
            selected_role_index: 0,
            rows_per_page: 10,
            input_mode: InputMode::Normal,
            search_query: String::new(),
            filters: ListFilters::default(),
            theme: Theme::mocha(),
            keymap: Keymap::default(),
            modal: None,
            notification: None,
            show_keybinds: false,
            operator: users::get_current_username()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "unknown".to_string()),
            config_dir: None,
        }
    }

    /// State whose theme, keys and filters come from files under `config_dir`.
    pub fn with_config(services: Services, config_dir: &Path) -> Self {
        if let Err(e) = std::fs::create_dir_all(config_dir) {
            warn!(dir = %config_dir.display(), error = %e, "could not create config dir");
        }
        let mut app = Self::new(services);
        app.theme = Theme::load_or_init(&config_dir.join("theme.conf"));
        app.keymap = Keymap::load_or_init(&config_dir.join("keybinds.conf"));
        filterconf::FiltersConfig::load_or_init(&config_dir.join("filter.conf")).apply_to(&mut app);
        app.config_dir = Some(config_dir.to_path_buf());
        app
    }

    /// Reload both collections from the services and recompute the visible lists.
    /// On failure the previous snapshots stay in place.
    pub async fn refresh(&mut self) -> crate::error::Result<()> {
        let (users, roles) = self.services.fetch_all().await?;
        self.users_all = users;
        self.roles_all = roles;
        crate::search::apply_filters_and_search(self);
        Ok(())
    }

    pub fn selected_user(&self) -> Option<&User> {
        self.users.get(self.selected_user_index)
    }

    pub fn selected_role(&self) -> Option<&Role> {
        self.roles.get(self.selected_role_index)
    }

    /// Role names offered by the users role filter and the user form.
    pub fn role_options(&self) -> Vec<String> {
        crate::search::role_filter_options(&self.roles_all, &self.users_all)
    }

    /// Menu labels for one filter, "All" first.
    pub fn filter_labels(&self, field: FilterField) -> Vec<String> {
        let all = std::iter::once("All".to_string());
        match field {
            FilterField::UserRole => all.chain(self.role_options()).collect(),
            FilterField::UserStatus => all
                .chain([UserStatus::Active, UserStatus::Inactive].map(|s| s.as_str().to_string()))
                .collect(),
            FilterField::RoleCategory => CategoryFilter::options()
                .into_iter()
                .map(|c| c.label().to_string())
                .collect(),
        }
    }

    /// Position of the active value of `field` in [`filter_labels`](Self::filter_labels).
    pub fn filter_index(&self, field: FilterField) -> usize {
        let labels = self.filter_labels(field);
        let current = match field {
            FilterField::UserRole => self.filters.user_role.clone(),
            FilterField::UserStatus => self.filters.user_status.map(|s| s.as_str().to_string()),
            FilterField::RoleCategory => Some(self.filters.role_category.label().to_string()),
        };
        current
            .and_then(|c| labels.iter().position(|l| *l == c))
            .unwrap_or(0)
    }

    /// Set `field` to the value at `index` of its labels. Out-of-range resets to "All".
    pub fn set_filter(&mut self, field: FilterField, index: usize) {
        let label = self.filter_labels(field).into_iter().nth(index).filter(|_| index > 0);
        match field {
            FilterField::UserRole => self.filters.user_role = label,
            FilterField::UserStatus => {
                self.filters.user_status = label.as_deref().and_then(UserStatus::parse);
            }
            FilterField::RoleCategory => {
                self.filters.role_category = label
                    .as_deref()
                    .and_then(CategoryFilter::parse)
                    .unwrap_or_default();
            }
        }
    }

    pub fn stats(&self) -> DashboardStats {
        stats::summarize(&self.roles_all, &self.users_all)
    }

    pub fn notify(&mut self, kind: NoticeKind, message: impl Into<String>) {
        self.notification = Some(Notification {
            kind,
            message: message.into(),
            raised_at: Instant::now(),
        });
    }

    /// Drop the notification once it has been visible long enough.
    pub fn expire_notification(&mut self) {
        if self.notification.as_ref().is_some_and(Notification::is_expired) {
            self.notification = None;
        }
    }
}

/// Re-export the application event loop entry function.
pub use update::run_app as run;
