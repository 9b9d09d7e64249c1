// Integration tests for rbac-dashboard

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rbac_dashboard::app::update::{Flow, handle_key};
use rbac_dashboard::app::{ActiveTab, AppState, InputMode, ModalState, NoticeKind};
use rbac_dashboard::service::Services;
use rbac_dashboard::store::MemoryStore;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(tag: &str) -> PathBuf {
    let nonce = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    let dir = std::env::temp_dir().join(format!("rbacd_{tag}_{}_{nonce}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

async fn press(app: &mut AppState, code: KeyCode) -> Flow {
    handle_key(app, KeyEvent::new(code, KeyModifiers::NONE)).await
}

async fn type_str(app: &mut AppState, s: &str) {
    for c in s.chars() {
        press(app, KeyCode::Char(c)).await;
    }
}

// 1) Theme config roundtrip and init
#[test]
fn theme_roundtrip_and_init() {
    use rbac_dashboard::app::Theme;

    let dir = temp_dir("theme");
    let path = dir.join("theme.conf");

    let t = Theme::dark();
    t.write_file(&path).expect("write theme");
    let t2 = Theme::from_file(&path).expect("read theme");
    assert_eq!(format!("{:?}", t.text), format!("{:?}", t2.text));
    assert_eq!(format!("{:?}", t.highlight_bg), format!("{:?}", t2.highlight_bg));
    assert_eq!(format!("{:?}", t.error), format!("{:?}", t2.error));

    // load_or_init creates file if missing
    let p2 = dir.join("theme_init.conf");
    let _created = Theme::load_or_init(&p2);
    assert!(p2.exists());

    let _ = std::fs::remove_dir_all(&dir);
}

// 2) Keybinds file written on first start and overrides honored on the next
#[test]
fn keymap_init_and_override() {
    use rbac_dashboard::app::keymap::{KeyAction, Keymap};

    let dir = temp_dir("keys");
    let path = dir.join("keybinds.conf");
    let _ = Keymap::load_or_init(&path);
    let written = std::fs::read_to_string(&path).expect("read keybinds");
    assert!(written.contains("Quit = q"));

    std::fs::write(&path, format!("{written}\nRefresh = Ctrl+r\n")).unwrap();
    let km = Keymap::load_or_init(&path);
    let ctrl_r = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL);
    assert_eq!(km.resolve(&ctrl_r), Some(KeyAction::Refresh));

    let _ = std::fs::remove_dir_all(&dir);
}

// 3) Filter choice is persisted and picked up by the next session
#[tokio::test]
async fn filter_menu_choice_survives_restart() {
    let dir = temp_dir("filters");
    let store = Arc::new(MemoryStore::seeded());

    let mut app = AppState::with_config(Services::in_memory(store.clone()), &dir);
    app.refresh().await.unwrap();
    assert!(dir.join("theme.conf").exists());
    assert!(dir.join("keybinds.conf").exists());
    press(&mut app, KeyCode::Char('2')).await;
    press(&mut app, KeyCode::Char('f')).await;
    // switch from the role filter to the status filter, pick "inactive"
    press(&mut app, KeyCode::Right).await;
    press(&mut app, KeyCode::Down).await;
    press(&mut app, KeyCode::Down).await;
    press(&mut app, KeyCode::Enter).await;
    assert!(app.users.is_empty());

    let saved = std::fs::read_to_string(dir.join("filter.conf")).unwrap();
    assert!(saved.contains("user_status = inactive"));

    let mut next = AppState::with_config(Services::in_memory(store), &dir);
    next.refresh().await.unwrap();
    assert_eq!(next.filters.user_status.map(|s| s.as_str()), Some("inactive"));
    assert!(next.users.is_empty());

    let _ = std::fs::remove_dir_all(&dir);
}

// 4) Create a role, assign a new user to it, rename the role: the user keeps the old name
#[tokio::test]
async fn role_rename_orphans_users() {
    let mut app = AppState::new(Services::in_memory(Arc::new(MemoryStore::seeded())));
    app.refresh().await.unwrap();

    // Roles tab, create "Support" with the first permission checked
    press(&mut app, KeyCode::Char('3')).await;
    press(&mut app, KeyCode::Char('n')).await;
    type_str(&mut app, "Support").await;
    press(&mut app, KeyCode::Tab).await;
    type_str(&mut app, "Helpdesk").await;
    press(&mut app, KeyCode::Tab).await;
    press(&mut app, KeyCode::Char(' ')).await;
    press(&mut app, KeyCode::Enter).await;
    assert_eq!(app.roles_all.len(), 3);
    assert_eq!(app.notification.as_ref().unwrap().message, "Role created successfully");

    // Users tab, create "Sam" in role Support (third option)
    press(&mut app, KeyCode::Char('2')).await;
    press(&mut app, KeyCode::Char('n')).await;
    type_str(&mut app, "Sam").await;
    press(&mut app, KeyCode::Tab).await;
    type_str(&mut app, "sam@example.com").await;
    press(&mut app, KeyCode::Tab).await;
    press(&mut app, KeyCode::Left).await;
    press(&mut app, KeyCode::Enter).await;
    let sam = app.users_all.iter().find(|u| u.name == "Sam").cloned().unwrap();
    assert_eq!(sam.role, "Support");

    // Rename the role through the edit form
    press(&mut app, KeyCode::Char('3')).await;
    app.selected_role_index = app.roles.iter().position(|r| r.name == "Support").unwrap();
    press(&mut app, KeyCode::Char('e')).await;
    for _ in 0.."Support".len() {
        press(&mut app, KeyCode::Backspace).await;
    }
    type_str(&mut app, "Helpdesk").await;
    press(&mut app, KeyCode::Enter).await;
    assert!(app.roles_all.iter().any(|r| r.name == "Helpdesk"));

    let sam_after = app.users_all.iter().find(|u| u.id == sam.id).unwrap();
    assert_eq!(sam_after.role, "Support");
    assert!(app.role_options().contains(&"Support".to_string()));
}

// 5) Search is scoped to the tab it was typed in
#[tokio::test]
async fn search_is_cleared_on_tab_switch() {
    let mut app = AppState::new(Services::in_memory(Arc::new(MemoryStore::seeded())));
    app.refresh().await.unwrap();
    press(&mut app, KeyCode::Char('3')).await;
    press(&mut app, KeyCode::Char('/')).await;
    type_str(&mut app, "man").await;
    press(&mut app, KeyCode::Enter).await;
    assert_eq!(app.input_mode, InputMode::Normal);
    assert_eq!(app.roles.len(), 1);
    assert_eq!(app.users.len(), 2);

    press(&mut app, KeyCode::Tab).await;
    assert_eq!(app.active_tab, ActiveTab::Dashboard);
    assert!(app.search_query.is_empty());
    assert_eq!(app.roles.len(), 2);
}

// 6) Actions menu delete on the users tab, then quit
#[tokio::test]
async fn actions_menu_delete_then_quit() {
    let mut app = AppState::new(Services::in_memory(Arc::new(MemoryStore::seeded())));
    app.refresh().await.unwrap();
    press(&mut app, KeyCode::Char('2')).await;
    press(&mut app, KeyCode::Down).await;
    press(&mut app, KeyCode::Enter).await;
    assert!(matches!(app.modal, Some(ModalState::Actions { .. })));
    press(&mut app, KeyCode::Down).await;
    press(&mut app, KeyCode::Down).await;
    press(&mut app, KeyCode::Enter).await;
    assert!(matches!(app.modal, Some(ModalState::DeleteConfirm { .. })));
    press(&mut app, KeyCode::Char('y')).await;
    assert_eq!(app.users_all.len(), 1);
    assert_eq!(app.users_all[0].name, "John Doe");
    let n = app.notification.as_ref().unwrap();
    assert_eq!(n.kind, NoticeKind::Success);
    assert_eq!(n.message, "User deleted successfully");
    assert_eq!(press(&mut app, KeyCode::Char('q')).await, Flow::Quit);
}
