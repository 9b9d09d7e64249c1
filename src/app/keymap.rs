//! Keybinding configuration: parse `keybinds.conf`, provide defaults, and map keys to actions.
//!
//! Bindings are `(KeyModifiers, KeyCode) -> KeyAction`. Several keys may share one
//! action (`j` and Down both move down). The file only overrides; anything it
//! does not mention keeps its default binding.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

use super::parse_kv_lines;

/// Semantic keyboard actions that can be bound to key combinations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// Exit the application.
    Quit,
    /// Open the filter menu of the current list.
    OpenFilterMenu,
    /// Display the help/keybindings reference.
    OpenHelp,
    /// Start typing a search term for the current list.
    StartSearch,
    /// Open the create form for the current tab (user or role).
    NewEntity,
    /// Open the edit form for the selected row.
    EditSelection,
    /// Ask to delete the selected row.
    DeleteSelection,
    /// Flip the selected user between active and inactive.
    ToggleStatus,
    NextTab,
    PrevTab,
    GoDashboard,
    GoUsers,
    GoRoles,
    /// Reload both collections from the services.
    Refresh,
    /// Toggle the keybindings panel on the right.
    ToggleKeybindsPane,
    /// Open the action menu for the selected row.
    EnterAction,
    MoveUp,
    MoveDown,
    PageUp,
    PageDown,
    /// Swallow the key.
    Ignore,
}

const ACTION_NAMES: [(KeyAction, &str); 21] = [
    (KeyAction::Quit, "Quit"),
    (KeyAction::OpenFilterMenu, "OpenFilterMenu"),
    (KeyAction::OpenHelp, "OpenHelp"),
    (KeyAction::StartSearch, "StartSearch"),
    (KeyAction::NewEntity, "NewEntity"),
    (KeyAction::EditSelection, "EditSelection"),
    (KeyAction::DeleteSelection, "DeleteSelection"),
    (KeyAction::ToggleStatus, "ToggleStatus"),
    (KeyAction::NextTab, "NextTab"),
    (KeyAction::PrevTab, "PrevTab"),
    (KeyAction::GoDashboard, "GoDashboard"),
    (KeyAction::GoUsers, "GoUsers"),
    (KeyAction::GoRoles, "GoRoles"),
    (KeyAction::Refresh, "Refresh"),
    (KeyAction::ToggleKeybindsPane, "ToggleKeybindsPane"),
    (KeyAction::EnterAction, "EnterAction"),
    (KeyAction::MoveUp, "MoveUp"),
    (KeyAction::MoveDown, "MoveDown"),
    (KeyAction::PageUp, "PageUp"),
    (KeyAction::PageDown, "PageDown"),
    (KeyAction::Ignore, "Ignore"),
];

/// Manages keybinding configuration and key-to-action resolution.
#[derive(Clone, Debug)]
pub struct Keymap {
    bindings: HashMap<(KeyModifiers, KeyCode), KeyAction>,
}

impl Keymap {
    /// Create a keymap with default keybindings: arrows and hjkl for navigation,
    /// single letters for commands, Tab/BackTab and 1-3 for tabs.
    pub fn new_defaults() -> Self {
        use KeyCode::*;
        use KeyModifiers as M;
        let mut bindings = HashMap::new();
        bindings.insert((M::NONE, Char('q')), KeyAction::Quit);
        bindings.insert((M::NONE, Esc), KeyAction::Ignore);
        bindings.insert((M::NONE, Char('f')), KeyAction::OpenFilterMenu);
        bindings.insert((M::NONE, Char('/')), KeyAction::StartSearch);
        bindings.insert((M::NONE, Char('n')), KeyAction::NewEntity);
        bindings.insert((M::NONE, Char('e')), KeyAction::EditSelection);
        bindings.insert((M::NONE, Char('d')), KeyAction::DeleteSelection);
        bindings.insert((M::NONE, Delete), KeyAction::DeleteSelection);
        bindings.insert((M::NONE, Char('s')), KeyAction::ToggleStatus);
        bindings.insert((M::NONE, Char('r')), KeyAction::Refresh);
        bindings.insert((M::NONE, Char('?')), KeyAction::OpenHelp);
        bindings.insert((M::NONE, Tab), KeyAction::NextTab);
        // Shift+Tab arrives as BackTab, with or without SHIFT depending on the terminal
        bindings.insert((M::NONE, BackTab), KeyAction::PrevTab);
        bindings.insert((M::SHIFT, BackTab), KeyAction::PrevTab);
        bindings.insert((M::NONE, Char('1')), KeyAction::GoDashboard);
        bindings.insert((M::NONE, Char('2')), KeyAction::GoUsers);
        bindings.insert((M::NONE, Char('3')), KeyAction::GoRoles);
        bindings.insert((M::NONE, Enter), KeyAction::EnterAction);
        bindings.insert((M::NONE, Up), KeyAction::MoveUp);
        bindings.insert((M::NONE, Down), KeyAction::MoveDown);
        bindings.insert((M::NONE, Char('k')), KeyAction::MoveUp);
        bindings.insert((M::NONE, Char('j')), KeyAction::MoveDown);
        bindings.insert((M::NONE, Left), KeyAction::PageUp);
        bindings.insert((M::NONE, Right), KeyAction::PageDown);
        bindings.insert((M::NONE, Char('h')), KeyAction::PageUp);
        bindings.insert((M::NONE, Char('l')), KeyAction::PageDown);
        bindings.insert((M::NONE, PageUp), KeyAction::PageUp);
        bindings.insert((M::NONE, PageDown), KeyAction::PageDown);
        bindings.insert((M::NONE, Char('K')), KeyAction::ToggleKeybindsPane);
        bindings.insert((M::SHIFT, Char('K')), KeyAction::ToggleKeybindsPane);
        Self { bindings }
    }

    /// Load `path`, or write the defaults there when the file does not exist yet.
    pub fn load_or_init(path: &Path) -> Self {
        if path.exists() {
            return Self::from_file(path).unwrap_or_default();
        }
        let km = Self::default();
        if let Err(e) = km.write_file(path) {
            warn!(path = %path.display(), error = %e, "could not write default keybinds");
        }
        km
    }

    /// Load a keymap from `<Action> = <KeySpec>` lines, on top of the defaults.
    /// The reversed `<KeySpec> = <Action>` form is accepted too.
    ///
    /// # Returns
    ///
    /// `Some(keymap)` if the file exists and is readable; `None` otherwise.
    pub fn from_file(path: &Path) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        let mut map = Self::default();
        for (lhs, rhs) in parse_kv_lines(&contents) {
            if let (Some(action), Some(key)) = (parse_action(lhs), parse_key(rhs)) {
                map.bindings.insert(key, action);
            } else if let (Some(key), Some(action)) = (parse_key(lhs), parse_action(rhs)) {
                map.bindings.insert(key, action);
            }
        }
        Some(map)
    }

    /// Write the default binding table, with a short format reference, to `path`.
    pub fn write_file(&self, path: &Path) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# rbac-dashboard keybindings\n");
        buf.push_str("# Format: <Action> = <KeySpec>\n");
        buf.push_str("# KeySpec examples: q, Ctrl+q, Enter, Esc, Tab, BackTab, Up, Down, Left, Right, PageUp, PageDown, Delete, /\n");
        let _ = writeln!(
            &mut buf,
            "# Actions: {}\n",
            ACTION_NAMES.iter().map(|(_, n)| *n).collect::<Vec<_>>().join(", ")
        );

        let mut entries: Vec<(String, &str)> = self
            .bindings
            .iter()
            .map(|((m, c), a)| (Self::format_key(*m, *c), format_action(*a)))
            .collect();
        entries.sort_by(|a, b| a.1.cmp(b.1).then_with(|| a.0.cmp(&b.0)));
        entries.dedup();
        for (key, action) in entries {
            let _ = writeln!(&mut buf, "{} = {}", action, key);
        }
        std::fs::write(path, buf)
    }

    /// Resolve a key event to its action, if bound.
    pub fn resolve(&self, key: &KeyEvent) -> Option<KeyAction> {
        self.bindings.get(&(key.modifiers, key.code)).copied()
    }

    /// Snapshot of all bindings as ((modifiers, code), action) pairs.
    pub fn all_bindings(&self) -> Vec<((KeyModifiers, KeyCode), KeyAction)> {
        self.bindings.iter().map(|(k, v)| (*k, *v)).collect()
    }

    /// Format a key as a spec like `Ctrl+q` or `BackTab`.
    pub fn format_key(mods: KeyModifiers, code: KeyCode) -> String {
        let base = match code {
            KeyCode::Char(c) => c.to_string(),
            other => NAMED_KEYS
                .iter()
                .find(|(_, k)| *k == other)
                .map(|(name, _)| name.to_string())
                .unwrap_or_else(|| format!("{other:?}")),
        };
        if mods.contains(KeyModifiers::CONTROL) {
            format!("Ctrl+{base}")
        } else {
            base
        }
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::new_defaults()
    }
}

/// Non-character keys by their config-file name.
const NAMED_KEYS: [(&str, KeyCode); 11] = [
    ("Enter", KeyCode::Enter),
    ("Delete", KeyCode::Delete),
    ("Esc", KeyCode::Esc),
    ("Tab", KeyCode::Tab),
    ("BackTab", KeyCode::BackTab),
    ("Up", KeyCode::Up),
    ("Down", KeyCode::Down),
    ("Left", KeyCode::Left),
    ("Right", KeyCode::Right),
    ("PageUp", KeyCode::PageUp),
    ("PageDown", KeyCode::PageDown),
];

fn parse_key(spec: &str) -> Option<(KeyModifiers, KeyCode)> {
    let trimmed = spec.trim();
    let (mods, name) = trimmed
        .strip_prefix("Ctrl+")
        .map_or((KeyModifiers::NONE, trimmed), |rest| (KeyModifiers::CONTROL, rest));
    let name = if name == "Escape" { "Esc" } else { name };
    if let Some((_, code)) = NAMED_KEYS.iter().find(|(n, _)| *n == name) {
        return Some((mods, *code));
    }
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some((mods, KeyCode::Char(c))),
        _ => None,
    }
}

fn parse_action(s: &str) -> Option<KeyAction> {
    let s = s.trim();
    ACTION_NAMES.iter().find(|(_, n)| *n == s).map(|(a, _)| *a)
}

pub fn format_action(a: KeyAction) -> &'static str {
    ACTION_NAMES
        .iter()
        .find(|(x, _)| *x == a)
        .map(|(_, n)| *n)
        .unwrap_or("Ignore")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEvent;

    #[test]
    fn defaults_resolve_vim_and_arrows() {
        let km = Keymap::default();
        let k = KeyEvent::new(KeyCode::Char('j'), KeyModifiers::NONE);
        assert_eq!(km.resolve(&k), Some(KeyAction::MoveDown));
        let k = KeyEvent::new(KeyCode::Down, KeyModifiers::NONE);
        assert_eq!(km.resolve(&k), Some(KeyAction::MoveDown));
        let k = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE);
        assert_eq!(km.resolve(&k), None);
    }

    #[test]
    fn parse_key_specs() {
        assert_eq!(parse_key("Ctrl+q"), Some((KeyModifiers::CONTROL, KeyCode::Char('q'))));
        assert_eq!(parse_key("PageDown"), Some((KeyModifiers::NONE, KeyCode::PageDown)));
        assert_eq!(parse_key("/"), Some((KeyModifiers::NONE, KeyCode::Char('/'))));
        assert_eq!(parse_key("qq"), None);
    }

    #[test]
    fn every_action_has_a_name() {
        for (a, n) in ACTION_NAMES {
            assert_eq!(format_action(a), n);
            assert_eq!(parse_action(n), Some(a));
        }
    }

    #[test]
    fn file_overrides_accept_both_orders() {
        let n = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = std::env::temp_dir().join(format!("rbacd_keys_{}_{n}.conf", std::process::id()));
        std::fs::write(&path, "Quit = Ctrl+x\nz = Refresh\nBogus = y\n").unwrap();
        let km = Keymap::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        let ctrl_x = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL);
        assert_eq!(km.resolve(&ctrl_x), Some(KeyAction::Quit));
        let z = KeyEvent::new(KeyCode::Char('z'), KeyModifiers::NONE);
        assert_eq!(km.resolve(&z), Some(KeyAction::Refresh));
        // defaults survive
        let q = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        assert_eq!(km.resolve(&q), Some(KeyAction::Quit));
    }
}
