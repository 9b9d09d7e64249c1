//! Shared UI components (status bar, keybindings panel, modal helpers).
//!
//! Contains small building blocks reused by the dashboard, users and roles screens.
//!
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use std::collections::{BTreeMap, BTreeSet};

use crate::app::keymap::{KeyAction, Keymap};
use crate::app::{
    ActiveTab, AppState, DeleteTarget, FilterField, InputMode, ModalState, NoticeKind, action_items,
};
use crate::permissions::CategoryFilter;

/// Bordered block with the theme's border color.
pub fn panel<'a>(title: &'a str, app: &AppState) -> Block<'a> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border))
}

/// First and one-past-last row of the page holding `selected`.
pub fn page_window(selected: usize, rows_per_page: usize, len: usize) -> (usize, usize) {
    let rpp = rows_per_page.max(1);
    let start = ((selected / rpp) * rpp).min(len);
    (start, (start + rpp).min(len))
}

/// Menu lines with a `▶` marker on the selected entry.
pub fn menu_text<S: AsRef<str>>(options: &[S], selected: usize) -> String {
    let mut text = String::new();
    for (idx, label) in options.iter().enumerate() {
        let marker = if idx == selected { "▶" } else { " " };
        text.push_str(&format!("{} {}\n", marker, label.as_ref()));
    }
    text
}

/// Render the bottom status bar: mode, visible counts, active filters, and the notification.
pub fn render_status_bar(f: &mut Frame, area: Rect, app: &AppState) {
    let mode = match app.input_mode {
        InputMode::Normal => "NORMAL",
        InputMode::Search => "SEARCH",
        InputMode::Modal => "MODAL",
    };
    let mut chips = Vec::new();
    if let Some(role) = &app.filters.user_role {
        chips.push(format!("role={role}"));
    }
    if let Some(status) = app.filters.user_status {
        chips.push(format!("status={status}"));
    }
    if app.filters.role_category != CategoryFilter::All {
        chips.push(format!("category={}", app.filters.role_category.label()));
    }
    let chips_str = if chips.is_empty() {
        String::new()
    } else {
        format!("  filters:[{}]", chips.join(","))
    };
    let mut spans = vec![Span::raw(format!(
        "mode: {mode}  users:{}/{}  roles:{}/{}{}",
        app.users.len(),
        app.users_all.len(),
        app.roles.len(),
        app.roles_all.len(),
        chips_str
    ))];
    if let Some(n) = &app.notification {
        let color = match n.kind {
            NoticeKind::Success => app.theme.success,
            NoticeKind::Error => app.theme.error,
        };
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            n.message.clone(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
    }
    let p = Paragraph::new(Line::from(spans)).style(
        Style::default()
            .fg(app.theme.status_fg)
            .bg(app.theme.status_bg),
    );
    f.render_widget(p, area);
}

fn action_label(action: KeyAction) -> Option<(&'static str, &'static str)> {
    let general = "General:";
    let nav = "Navigation:";
    Some(match action {
        KeyAction::Quit => (general, "Quit"),
        KeyAction::OpenFilterMenu => (general, "Filter menu"),
        KeyAction::OpenHelp => (general, "Help"),
        KeyAction::StartSearch => (general, "Search"),
        KeyAction::NewEntity => (general, "New user / role"),
        KeyAction::EditSelection => (general, "Edit"),
        KeyAction::DeleteSelection => (general, "Delete"),
        KeyAction::ToggleStatus => (general, "Toggle user status"),
        KeyAction::Refresh => (general, "Refresh"),
        KeyAction::ToggleKeybindsPane => (general, "Toggle this pane"),
        KeyAction::EnterAction => (general, "Actions"),
        KeyAction::NextTab => (nav, "Next tab"),
        KeyAction::PrevTab => (nav, "Previous tab"),
        KeyAction::GoDashboard => (nav, "Dashboard"),
        KeyAction::GoUsers => (nav, "Users"),
        KeyAction::GoRoles => (nav, "Roles"),
        KeyAction::MoveUp => (nav, "Move up"),
        KeyAction::MoveDown => (nav, "Move down"),
        KeyAction::PageUp => (nav, "Page up"),
        KeyAction::PageDown => (nav, "Page down"),
        KeyAction::Ignore => return None,
    })
}

/// Render the right-side keybinds viewer, grouped by section.
pub fn render_keybinds_panel(f: &mut Frame, area: Rect, app: &AppState) {
    let block = panel("Keybindings", app);
    let inner = block.inner(area);

    let mut sections: BTreeMap<&'static str, BTreeMap<&'static str, BTreeSet<String>>> = BTreeMap::new();
    for ((mods, code), action) in app.keymap.all_bindings() {
        let Some((section, label)) = action_label(action) else {
            continue;
        };
        let key = match code {
            KeyCode::BackTab => "Shift+Tab".to_string(),
            KeyCode::Char(c) if mods.contains(KeyModifiers::SHIFT) && c.is_ascii_uppercase() => {
                format!("Shift+{}", c.to_ascii_lowercase())
            }
            _ => Keymap::format_key(mods, code),
        };
        sections.entry(section).or_default().entry(label).or_default().insert(key);
    }

    let label_w = sections
        .values()
        .flat_map(|m| m.keys())
        .map(|k| k.chars().count())
        .max()
        .unwrap_or(0)
        .min((inner.width as usize).saturating_sub(12));

    let mut lines: Vec<Line> = Vec::new();
    for (section, entries) in &sections {
        if !lines.is_empty() {
            lines.push(Line::raw(""));
        }
        lines.push(Line::from(Span::styled(*section, Style::default().add_modifier(Modifier::BOLD))));
        for (label, keys) in entries {
            let lbl: String = label.chars().take(label_w).collect();
            let joined = keys.iter().cloned().collect::<Vec<_>>().join(", ");
            lines.push(Line::from(vec![
                Span::raw(format!("  {:>width$} │ ", lbl, width = label_w)),
                Span::styled(joined, Style::default().add_modifier(Modifier::ITALIC)),
            ]));
        }
    }

    let p = Paragraph::new(lines).wrap(Wrap { trim: false });
    f.render_widget(block, area);
    f.render_widget(p, inner);
}

/// Compute a rectangle centered within `area` with a maximum size.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Render a generic informational modal dialog.
pub fn render_info_modal(f: &mut Frame, area: Rect, app: &AppState, message: &str) {
    let max_w = area.width.saturating_sub(6).max(30);
    let min_w = 40u16.min(max_w);
    let approx_lines = (message.len() as u16 / (min_w.saturating_sub(4).max(10))).max(1);
    let max_h = area.height.saturating_sub(6).max(5);
    let height = (approx_lines + 4).min(max_h).max(5);
    let rect = centered_rect(min_w, height, area);
    let p = Paragraph::new(message.to_string())
        .wrap(Wrap { trim: false })
        .block(panel("Info", app));
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

/// Render the row actions menu for the active tab.
pub fn render_actions_modal(f: &mut Frame, area: Rect, app: &AppState, selected: usize) {
    let items = action_items(app.active_tab);
    let rect = centered_rect(30, items.len() as u16 + 2, area);
    let p = Paragraph::new(menu_text(items, selected)).block(panel("Actions", app));
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

/// Render a delete confirmation with Yes/No buttons.
pub fn render_delete_modal(f: &mut Frame, area: Rect, app: &AppState, target: &DeleteTarget, selected: usize) {
    let rect = centered_rect(50, 7, area);
    let (kind, name) = match target {
        DeleteTarget::User { name, .. } => ("user", name),
        DeleteTarget::Role { name, .. } => ("role", name),
    };
    let yes = if selected == 0 { "[Yes]" } else { " Yes " };
    let no = if selected == 1 { "[No]" } else { " No  " };
    let body = format!("Delete {kind} '{name}'?\n\n  {yes}    {no}");
    let p = Paragraph::new(body)
        .wrap(Wrap { trim: false })
        .block(panel("Confirm delete", app));
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

/// Render the filter menu for one field, marking the active value.
pub fn render_filter_modal(f: &mut Frame, area: Rect, app: &AppState, field: FilterField, selected: usize) {
    let labels = app.filter_labels(field);
    let active = app.filter_index(field);
    let width = 48u16.min(area.width.saturating_sub(4)).max(32);
    let height = (labels.len() as u16 + 4).min(area.height.saturating_sub(2)).max(6);
    let rect = centered_rect(width, height, area);
    let mut text = String::new();
    for (idx, label) in labels.iter().enumerate() {
        let marker = if idx == selected { "▶" } else { " " };
        let radio = if idx == active { "(•)" } else { "( )" };
        text.push_str(&format!("{marker} {radio} {label}\n"));
    }
    if field != FilterField::RoleCategory {
        text.push_str("\n←/→ switch between role and status");
    }
    let p = Paragraph::new(text).block(panel(field.title(), app));
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

/// Render the help modal with usage information and key tips.
pub fn render_help_modal(f: &mut Frame, area: Rect, app: &AppState, scroll: u16) {
    let width = 80u16.min(area.width.saturating_sub(4)).max(60);
    let height = 22u16.min(area.height.saturating_sub(4)).max(14);
    let rect = centered_rect(width, height, area);

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let italic = Style::default().add_modifier(Modifier::ITALIC);
    let tip = |label: &'static str, keys: &'static str| {
        Line::from(vec![Span::raw(label), Span::styled(keys, italic)])
    };
    let lines: Vec<Line> = vec![
        Line::from(Span::styled("Help", bold)),
        Line::raw(""),
        tip("Switch tab: ", "Tab / Shift+Tab / 1 2 3"),
        tip("Navigation: ", "Arrow keys / h j k l / PageUp PageDown"),
        tip("Search current list: ", "/ (filters as you type, Enter keeps, Esc clears)"),
        tip("Filter menu: ", "f"),
        tip("Reload data: ", "r"),
        tip("Keybindings panel: ", "Shift+K"),
        tip("Quit: ", "q"),
        Line::raw(""),
        Line::from(Span::styled("Users and Roles tabs", bold)),
        tip("Actions for selected row: ", "Enter"),
        tip("Create: ", "n"),
        tip("Edit: ", "e"),
        tip("Delete: ", "d / Delete"),
        tip("Toggle user active/inactive: ", "s"),
        Line::raw(""),
        Line::from(Span::styled("Forms", bold)),
        tip("Next / previous field: ", "Tab / Shift+Tab"),
        tip("Cycle role, toggle status or permission: ", "Space / Left / Right"),
        tip("Save: ", "Enter"),
        tip("Cancel: ", "Esc"),
        Line::raw(""),
        tip("Close help: ", "Esc / Enter"),
    ];

    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .block(panel("Help", app));
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

/// Dispatch a modal to its renderer.
pub fn render_modal(f: &mut Frame, area: Rect, app: &AppState, state: &ModalState) {
    match state {
        ModalState::Actions { selected } => render_actions_modal(f, area, app, *selected),
        ModalState::FilterMenu { field, selected } => render_filter_modal(f, area, app, *field, *selected),
        ModalState::UserForm(form) => super::users::render_user_form(f, area, app, form),
        ModalState::RoleForm(form) => super::roles::render_role_form(f, area, app, form),
        ModalState::DeleteConfirm { target, selected } => render_delete_modal(f, area, app, target, *selected),
        ModalState::Info { message } => render_info_modal(f, area, app, message),
        ModalState::Help { scroll } => render_help_modal(f, area, app, *scroll),
    }
}

/// Title of the body panel for the active tab, with the search term when one is set.
pub fn list_title(app: &AppState, tab: ActiveTab) -> String {
    let query = app.search_query.trim();
    if query.is_empty() || app.active_tab != tab {
        tab.title().to_string()
    } else {
        format!("{} (search: {})", tab.title(), query)
    }
}
