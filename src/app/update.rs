//! Event loop and key handling.
//!
//! Key handlers are `async` because confirmed forms and deletions go straight
//! to the services; with the in-memory backend those calls never suspend.

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::time::Duration;
use tracing::{debug, warn};

use super::filterconf::FiltersConfig;
use super::forms::{FormOutcome, RoleForm, UserForm};
use super::keymap::KeyAction;
use super::{
    ActiveTab, AppState, DeleteTarget, FilterField, InputMode, ModalState, Mutation, NoticeKind,
    action_items,
};
use crate::error::EntityKind;
use crate::model::UserPatch;
use crate::search::apply_filters_and_search;
use crate::ui;

/// Whether the loop keeps going after a key.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    mut app: AppState,
) -> Result<()> {
    loop {
        app.expire_notification();
        terminal.draw(|f| {
            ui::render(f, &mut app);
        })?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && handle_key(&mut app, key).await == Flow::Quit {
                    break;
                }
            }
        }
    }
    debug!(uptime_ms = app.started_at.elapsed().as_millis() as u64, "leaving event loop");
    Ok(())
}

/// Route one key press according to the current input mode.
pub async fn handle_key(app: &mut AppState, key: KeyEvent) -> Flow {
    match app.input_mode {
        InputMode::Normal => match app.keymap.resolve(&key) {
            Some(action) => handle_action(app, action).await,
            None => Flow::Continue,
        },
        InputMode::Search => {
            handle_search_key(app, key.code);
            Flow::Continue
        }
        InputMode::Modal => {
            handle_modal_key(app, key.code).await;
            Flow::Continue
        }
    }
}

async fn handle_action(app: &mut AppState, action: KeyAction) -> Flow {
    let tab = app.active_tab;
    let on_list = tab != ActiveTab::Dashboard;
    match action {
        KeyAction::Quit => return Flow::Quit,
        KeyAction::Ignore => {}
        KeyAction::NextTab => switch_tab(app, tab.next()),
        KeyAction::PrevTab => switch_tab(app, tab.prev()),
        KeyAction::GoDashboard => switch_tab(app, ActiveTab::Dashboard),
        KeyAction::GoUsers => switch_tab(app, ActiveTab::Users),
        KeyAction::GoRoles => switch_tab(app, ActiveTab::Roles),
        KeyAction::StartSearch if on_list => {
            app.search_query.clear();
            apply_filters_and_search(app);
            app.input_mode = InputMode::Search;
        }
        KeyAction::OpenFilterMenu if on_list => {
            let field = match tab {
                ActiveTab::Roles => FilterField::RoleCategory,
                _ => FilterField::UserRole,
            };
            let selected = app.filter_index(field);
            open_modal(app, ModalState::FilterMenu { field, selected });
        }
        KeyAction::OpenHelp => open_modal(app, ModalState::Help { scroll: 0 }),
        KeyAction::NewEntity => match tab {
            ActiveTab::Users => {
                let form = UserForm::create(app.role_options());
                open_modal(app, ModalState::UserForm(form));
            }
            ActiveTab::Roles => open_modal(app, ModalState::RoleForm(RoleForm::create())),
            ActiveTab::Dashboard => open_modal(
                app,
                ModalState::Info {
                    message: "Switch to the Users or Roles tab to create records.".to_string(),
                },
            ),
        },
        KeyAction::EditSelection | KeyAction::DeleteSelection if on_list => {
            let modal = if action == KeyAction::EditSelection {
                edit_modal(app)
            } else {
                delete_modal(app)
            };
            let modal = modal.unwrap_or_else(|| ModalState::Info {
                message: format!("No {} selected.", if tab == ActiveTab::Users { "user" } else { "role" }),
            });
            open_modal(app, modal);
        }
        KeyAction::ToggleStatus if tab == ActiveTab::Users => toggle_status(app).await,
        KeyAction::Refresh => {
            if app.refresh().await.is_err() {
                app.notify(NoticeKind::Error, "Unable to fetch users");
            }
        }
        KeyAction::ToggleKeybindsPane => app.show_keybinds = !app.show_keybinds,
        KeyAction::EnterAction if on_list && has_selection(app) => {
            open_modal(app, ModalState::Actions { selected: 0 });
        }
        KeyAction::MoveUp => move_selection(app, true, 1),
        KeyAction::MoveDown => move_selection(app, false, 1),
        KeyAction::PageUp => {
            let rpp = app.rows_per_page.max(1);
            move_selection(app, true, rpp);
        }
        KeyAction::PageDown => {
            let rpp = app.rows_per_page.max(1);
            move_selection(app, false, rpp);
        }
        _ => {}
    }
    Flow::Continue
}

fn switch_tab(app: &mut AppState, tab: ActiveTab) {
    if app.active_tab == tab {
        return;
    }
    app.active_tab = tab;
    // the query belongs to the list it was typed in
    app.search_query.clear();
    apply_filters_and_search(app);
}

fn has_selection(app: &AppState) -> bool {
    match app.active_tab {
        ActiveTab::Users => app.selected_user().is_some(),
        ActiveTab::Roles => app.selected_role().is_some(),
        ActiveTab::Dashboard => false,
    }
}

fn move_selection(app: &mut AppState, up: bool, by: usize) {
    let (index, len) = match app.active_tab {
        ActiveTab::Users => (&mut app.selected_user_index, app.users.len()),
        ActiveTab::Roles => (&mut app.selected_role_index, app.roles.len()),
        ActiveTab::Dashboard => return,
    };
    *index = if len == 0 {
        0
    } else if up {
        index.saturating_sub(by)
    } else {
        index.saturating_add(by).min(len - 1)
    };
}

fn handle_search_key(app: &mut AppState, code: KeyCode) {
    match code {
        KeyCode::Enter => app.input_mode = InputMode::Normal,
        KeyCode::Esc => {
            app.search_query.clear();
            apply_filters_and_search(app);
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Backspace => {
            app.search_query.pop();
            apply_filters_and_search(app);
        }
        KeyCode::Char(c) => {
            app.search_query.push(c);
            apply_filters_and_search(app);
        }
        _ => {}
    }
}

fn open_modal(app: &mut AppState, modal: ModalState) {
    app.modal = Some(modal);
    app.input_mode = InputMode::Modal;
}

fn close_modal(app: &mut AppState) {
    app.modal = None;
    app.input_mode = InputMode::Normal;
}

fn set_modal(app: &mut AppState, next: Option<ModalState>) {
    match next {
        Some(m) => open_modal(app, m),
        None => close_modal(app),
    }
}

fn edit_modal(app: &AppState) -> Option<ModalState> {
    match app.active_tab {
        ActiveTab::Users => app
            .selected_user()
            .map(|u| ModalState::UserForm(UserForm::edit(u, app.role_options()))),
        ActiveTab::Roles => app.selected_role().map(|r| ModalState::RoleForm(RoleForm::edit(r))),
        ActiveTab::Dashboard => None,
    }
}

fn delete_modal(app: &AppState) -> Option<ModalState> {
    let target = match app.active_tab {
        ActiveTab::Users => app.selected_user().map(|u| DeleteTarget::User {
            id: u.id.clone(),
            name: u.name.clone(),
        }),
        ActiveTab::Roles => app.selected_role().map(|r| DeleteTarget::Role {
            id: r.id.clone(),
            name: r.name.clone(),
        }),
        ActiveTab::Dashboard => None,
    }?;
    // "No" is preselected
    Some(ModalState::DeleteConfirm { target, selected: 1 })
}

async fn toggle_status(app: &mut AppState) {
    let Some(user) = app.selected_user() else {
        return;
    };
    let mutation = Mutation::UpdateUser {
        id: user.id.clone(),
        patch: UserPatch {
            status: Some(user.status.toggled()),
            ..UserPatch::default()
        },
    };
    perform(app, mutation).await;
}

async fn handle_modal_key(app: &mut AppState, code: KeyCode) {
    let Some(modal) = app.modal.take() else {
        close_modal(app);
        return;
    };
    let next = match modal {
        ModalState::Actions { selected } => actions_key(app, selected, code).await,
        ModalState::FilterMenu { field, selected } => filter_key(app, field, selected, code),
        ModalState::UserForm(mut form) => match form.handle_key(code) {
            FormOutcome::Continue => Some(ModalState::UserForm(form)),
            FormOutcome::Cancel => None,
            FormOutcome::Submit => match form.submit() {
                Ok(m) => {
                    if perform(app, m).await {
                        None
                    } else {
                        Some(ModalState::UserForm(form))
                    }
                }
                Err(msg) => {
                    form.error = Some(msg);
                    Some(ModalState::UserForm(form))
                }
            },
        },
        ModalState::RoleForm(mut form) => match form.handle_key(code) {
            FormOutcome::Continue => Some(ModalState::RoleForm(form)),
            FormOutcome::Cancel => None,
            FormOutcome::Submit => match form.submit() {
                Ok(m) => {
                    if perform(app, m).await {
                        None
                    } else {
                        Some(ModalState::RoleForm(form))
                    }
                }
                Err(msg) => {
                    form.error = Some(msg);
                    Some(ModalState::RoleForm(form))
                }
            },
        },
        ModalState::DeleteConfirm { target, selected } => match code {
            KeyCode::Esc | KeyCode::Char('n') => None,
            KeyCode::Left | KeyCode::Right | KeyCode::Up | KeyCode::Down | KeyCode::Tab => {
                Some(ModalState::DeleteConfirm { target, selected: 1 - selected.min(1) })
            }
            KeyCode::Char('y') => {
                confirm_delete(app, target).await;
                None
            }
            KeyCode::Enter => {
                if selected == 0 {
                    confirm_delete(app, target).await;
                }
                None
            }
            _ => Some(ModalState::DeleteConfirm { target, selected }),
        },
        ModalState::Info { message } => match code {
            KeyCode::Esc | KeyCode::Enter => None,
            _ => Some(ModalState::Info { message }),
        },
        ModalState::Help { scroll } => match code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('?') | KeyCode::Char('q') => None,
            KeyCode::Up | KeyCode::Char('k') => Some(ModalState::Help { scroll: scroll.saturating_sub(1) }),
            KeyCode::Down | KeyCode::Char('j') => Some(ModalState::Help { scroll: scroll.saturating_add(1) }),
            KeyCode::PageUp => Some(ModalState::Help { scroll: scroll.saturating_sub(10) }),
            KeyCode::PageDown => Some(ModalState::Help { scroll: scroll.saturating_add(10) }),
            _ => Some(ModalState::Help { scroll }),
        },
    };
    set_modal(app, next);
}

async fn actions_key(app: &mut AppState, selected: usize, code: KeyCode) -> Option<ModalState> {
    let items = action_items(app.active_tab);
    match code {
        KeyCode::Esc => None,
        KeyCode::Up | KeyCode::Char('k') => Some(ModalState::Actions { selected: selected.saturating_sub(1) }),
        KeyCode::Down | KeyCode::Char('j') => Some(ModalState::Actions {
            selected: (selected + 1).min(items.len().saturating_sub(1)),
        }),
        KeyCode::Enter => match items.get(selected).copied() {
            Some("Edit") => edit_modal(app),
            Some("Delete") => delete_modal(app),
            Some("Toggle status") => {
                toggle_status(app).await;
                None
            }
            _ => None,
        },
        _ => Some(ModalState::Actions { selected }),
    }
}

fn filter_key(app: &mut AppState, field: FilterField, selected: usize, code: KeyCode) -> Option<ModalState> {
    let count = app.filter_labels(field).len();
    match code {
        KeyCode::Esc => None,
        KeyCode::Up | KeyCode::Char('k') => Some(ModalState::FilterMenu { field, selected: selected.saturating_sub(1) }),
        KeyCode::Down | KeyCode::Char('j') => Some(ModalState::FilterMenu {
            field,
            selected: (selected + 1).min(count.saturating_sub(1)),
        }),
        KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::Char('h') | KeyCode::Char('l') => {
            let field = field.other();
            Some(ModalState::FilterMenu { field, selected: app.filter_index(field) })
        }
        KeyCode::Enter => {
            app.set_filter(field, selected);
            apply_filters_and_search(app);
            if let Some(dir) = app.config_dir.clone() {
                if let Err(e) = FiltersConfig::save_from_app(app, &dir.join("filter.conf")) {
                    warn!(error = %e, "could not save filters");
                }
            }
            None
        }
        _ => Some(ModalState::FilterMenu { field, selected }),
    }
}

async fn confirm_delete(app: &mut AppState, target: DeleteTarget) {
    let mutation = match target {
        DeleteTarget::User { id, .. } => Mutation::DeleteUser { id },
        DeleteTarget::Role { id, .. } => Mutation::DeleteRole { id },
    };
    perform(app, mutation).await;
}

fn describe(mutation: &Mutation) -> (EntityKind, &'static str, &'static str) {
    match mutation {
        Mutation::CreateUser(_) => (EntityKind::User, "create", "created"),
        Mutation::UpdateUser { .. } => (EntityKind::User, "update", "updated"),
        Mutation::DeleteUser { .. } => (EntityKind::User, "delete", "deleted"),
        Mutation::CreateRole(_) => (EntityKind::Role, "create", "created"),
        Mutation::UpdateRole { .. } => (EntityKind::Role, "update", "updated"),
        Mutation::DeleteRole { .. } => (EntityKind::Role, "delete", "deleted"),
    }
}

/// Send a mutation to the services and report the outcome as a notification.
///
/// On success both lists are reloaded from the services. On failure nothing
/// displayed changes. Returns whether the mutation went through.
pub async fn perform(app: &mut AppState, mutation: Mutation) -> bool {
    let (entity, verb, done) = describe(&mutation);
    let users = &app.services.users;
    let roles = &app.services.roles;
    let result = match mutation {
        Mutation::CreateUser(data) => users.create(data).await.map(drop),
        Mutation::UpdateUser { id, patch } => users.update(&id, patch).await.map(drop),
        Mutation::DeleteUser { id } => users.delete(&id).await,
        Mutation::CreateRole(data) => roles.create(data).await.map(drop),
        Mutation::UpdateRole { id, patch } => roles.update(&id, patch).await.map(drop),
        Mutation::DeleteRole { id } => roles.delete(&id).await,
    };
    match result {
        Ok(()) => {
            app.notify(NoticeKind::Success, format!("{entity} {done} successfully"));
            if app.refresh().await.is_err() {
                app.notify(NoticeKind::Error, "Unable to fetch users");
            }
            true
        }
        Err(_) => {
            app.notify(NoticeKind::Error, format!("Failed to {verb} {}", entity.as_str()));
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UserStatus;
    use crate::service::Services;
    use crate::store::MemoryStore;
    use crossterm::event::KeyModifiers;
    use std::sync::Arc;

    async fn seeded_app() -> AppState {
        let mut app = AppState::new(Services::in_memory(Arc::new(MemoryStore::seeded())));
        app.refresh().await.unwrap();
        app
    }

    async fn press(app: &mut AppState, code: KeyCode) -> Flow {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE)).await
    }

    async fn type_str(app: &mut AppState, s: &str) {
        for c in s.chars() {
            press(app, KeyCode::Char(c)).await;
        }
    }

    #[tokio::test]
    async fn quit_and_tab_switching() {
        let mut app = seeded_app().await;
        assert_eq!(press(&mut app, KeyCode::Tab).await, Flow::Continue);
        assert_eq!(app.active_tab, ActiveTab::Users);
        press(&mut app, KeyCode::Char('3')).await;
        assert_eq!(app.active_tab, ActiveTab::Roles);
        assert_eq!(press(&mut app, KeyCode::Char('q')).await, Flow::Quit);
    }

    #[tokio::test]
    async fn search_filters_live_and_clears_on_escape() {
        let mut app = seeded_app().await;
        press(&mut app, KeyCode::Char('2')).await;
        press(&mut app, KeyCode::Char('/')).await;
        assert_eq!(app.input_mode, InputMode::Search);
        type_str(&mut app, "JANE").await;
        assert_eq!(app.users.len(), 1);
        assert_eq!(app.users[0].name, "Jane Smith");
        press(&mut app, KeyCode::Esc).await;
        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(app.search_query.is_empty());
        assert_eq!(app.users.len(), 2);
    }

    #[tokio::test]
    async fn create_user_through_form() {
        let mut app = seeded_app().await;
        press(&mut app, KeyCode::Char('2')).await;
        press(&mut app, KeyCode::Char('n')).await;
        assert!(matches!(app.modal, Some(ModalState::UserForm(_))));
        type_str(&mut app, "Alice").await;
        press(&mut app, KeyCode::Tab).await;
        type_str(&mut app, "alice@example.com").await;
        press(&mut app, KeyCode::Tab).await;
        press(&mut app, KeyCode::Right).await;
        press(&mut app, KeyCode::Enter).await;
        assert!(app.modal.is_none());
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.users_all.len(), 3);
        let n = app.notification.as_ref().unwrap();
        assert_eq!(n.kind, NoticeKind::Success);
        assert_eq!(n.message, "User created successfully");
    }

    #[tokio::test]
    async fn invalid_form_stays_open_with_message() {
        let mut app = seeded_app().await;
        press(&mut app, KeyCode::Char('2')).await;
        press(&mut app, KeyCode::Char('n')).await;
        type_str(&mut app, "A").await;
        press(&mut app, KeyCode::Enter).await;
        match &app.modal {
            Some(ModalState::UserForm(f)) => assert!(f.error.as_deref().unwrap().starts_with("Name must")),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(app.users_all.len(), 2);
    }

    #[tokio::test]
    async fn delete_needs_confirmation() {
        let mut app = seeded_app().await;
        press(&mut app, KeyCode::Char('3')).await;
        press(&mut app, KeyCode::Char('d')).await;
        // Enter on the preselected "No" cancels
        press(&mut app, KeyCode::Enter).await;
        assert_eq!(app.roles_all.len(), 2);
        press(&mut app, KeyCode::Char('d')).await;
        press(&mut app, KeyCode::Left).await;
        press(&mut app, KeyCode::Enter).await;
        assert_eq!(app.roles_all.len(), 1);
        assert_eq!(app.notification.as_ref().unwrap().message, "Role deleted successfully");
    }

    #[tokio::test]
    async fn failed_mutation_notifies_and_keeps_state() {
        let mut app = seeded_app().await;
        let before = app.users_all.clone();
        let ok = perform(&mut app, Mutation::DeleteUser { id: "missing".into() }).await;
        assert!(!ok);
        assert_eq!(app.users_all, before);
        let n = app.notification.as_ref().unwrap();
        assert_eq!(n.kind, NoticeKind::Error);
        assert_eq!(n.message, "Failed to delete user");
    }

    #[tokio::test]
    async fn toggle_status_flips_selected_user() {
        let mut app = seeded_app().await;
        press(&mut app, KeyCode::Char('2')).await;
        press(&mut app, KeyCode::Char('s')).await;
        assert_eq!(app.users_all[0].status, UserStatus::Inactive);
        assert_eq!(app.notification.as_ref().unwrap().message, "User updated successfully");
    }

    #[tokio::test]
    async fn filter_menu_applies_choice() {
        let mut app = seeded_app().await;
        press(&mut app, KeyCode::Char('2')).await;
        press(&mut app, KeyCode::Char('f')).await;
        press(&mut app, KeyCode::Down).await;
        press(&mut app, KeyCode::Enter).await;
        assert_eq!(app.filters.user_role.as_deref(), Some("Admin"));
        assert_eq!(app.users.len(), 1);
        assert!(app.modal.is_none());
    }

    #[tokio::test]
    async fn empty_list_explains_instead_of_editing() {
        let mut app = AppState::new(Services::in_memory(Arc::new(MemoryStore::new())));
        app.refresh().await.unwrap();
        press(&mut app, KeyCode::Char('3')).await;
        press(&mut app, KeyCode::Char('e')).await;
        match &app.modal {
            Some(ModalState::Info { message }) => assert_eq!(message, "No role selected."),
            other => panic!("unexpected {other:?}"),
        }
        press(&mut app, KeyCode::Enter).await;
        assert!(app.modal.is_none());
    }

    #[test]
    fn selection_moves_within_bounds() {
        let mut app = AppState::new(Services::in_memory(Arc::new(MemoryStore::new())));
        app.active_tab = ActiveTab::Users;
        move_selection(&mut app, false, 5);
        assert_eq!(app.selected_user_index, 0);
    }
}
