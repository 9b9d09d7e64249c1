//! Roles tab: table, details, and the create/edit form.

use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Clear, Paragraph, Row, Table, Wrap};

use super::components::{centered_rect, list_title, page_window, panel};
use crate::app::forms::RoleForm;
use crate::app::{ActiveTab, AppState};
use crate::model::Role;
use crate::permissions::{self, PermissionCategory};

/// How many permissions the table shows before collapsing the rest.
pub const PERMISSION_PREVIEW: usize = 3;

/// `"user view, user create, role view +2 more"`.
pub fn permission_summary(role: &Role) -> String {
    let mut out = role
        .permissions
        .iter()
        .take(PERMISSION_PREVIEW)
        .map(|p| permissions::display_name(p))
        .collect::<Vec<_>>()
        .join(", ");
    let rest = role.permissions.len().saturating_sub(PERMISSION_PREVIEW);
    if rest > 0 {
        out.push_str(&format!(" +{rest} more"));
    }
    out
}

pub fn render_roles_table(f: &mut Frame, area: Rect, app: &mut AppState) {
    let body_height = area.height.saturating_sub(3) as usize;
    if body_height > 0 {
        app.rows_per_page = body_height;
    }

    let (start, end) = page_window(app.selected_role_index, app.rows_per_page, app.roles.len());
    let rows = app.roles[start..end].iter().enumerate().map(|(i, r)| {
        let style = if start + i == app.selected_role_index {
            Style::default()
                .fg(app.theme.highlight_fg)
                .bg(app.theme.highlight_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.text)
        };
        let members = app.users_all.iter().filter(|u| u.role == r.name).count();
        Row::new(vec![
            Cell::from(r.name.clone()),
            Cell::from(r.description.clone()),
            Cell::from(permission_summary(r)),
            Cell::from(members.to_string()),
        ])
        .style(style)
    });

    let widths = [
        Constraint::Percentage(18),
        Constraint::Percentage(30),
        Constraint::Percentage(44),
        Constraint::Length(6),
    ];
    let header = Row::new(vec!["NAME", "DESCRIPTION", "PERMISSIONS", "USERS"]).style(
        Style::default()
            .fg(app.theme.title)
            .add_modifier(Modifier::BOLD),
    );

    let title = list_title(app, ActiveTab::Roles);
    let table = Table::new(rows, widths)
        .header(header)
        .block(panel(&title, app))
        .column_spacing(1);
    f.render_widget(table, area);
}

pub fn render_role_details(f: &mut Frame, area: Rect, app: &AppState) {
    let Some(role) = app.selected_role() else {
        let p = Paragraph::new("No role selected").block(panel("Details", app));
        f.render_widget(p, area);
        return;
    };
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let mut lines = vec![
        Line::from(vec![Span::styled("Name: ", bold), Span::raw(role.name.clone())]),
        Line::from(vec![Span::styled("Description: ", bold), Span::raw(role.description.clone())]),
        Line::from(vec![Span::styled("Id: ", bold), Span::raw(role.id.clone())]),
        Line::raw(""),
        Line::from(Span::styled(format!("Permissions ({}):", role.permissions.len()), bold)),
    ];
    for p in &role.permissions {
        lines.push(Line::raw(format!("  • {}", permissions::display_name(p))));
    }
    let p = Paragraph::new(lines)
        .style(Style::default().fg(app.theme.text))
        .wrap(Wrap { trim: false })
        .block(panel("Details", app));
    f.render_widget(p, area);
}

/// Render the create/edit role form. Permissions are grouped by category; anything
/// outside the known categories is listed under "OTHER".
pub fn render_role_form(f: &mut Frame, area: Rect, app: &AppState, form: &RoleForm) {
    let width = 64u16.min(area.width.saturating_sub(4)).max(44);
    let height = 26u16.min(area.height.saturating_sub(2)).max(12);
    let rect = centered_rect(width, height, area);

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let focus_style = Style::default().fg(app.theme.highlight_fg);
    let text_field = |label: &'static str, value: &str, idx: usize| {
        let focused = form.focus == idx;
        Line::from(vec![
            Span::raw(if focused { "▶ " } else { "  " }),
            Span::styled(format!("{label:<13}"), bold),
            Span::styled(
                format!("{}{}", value, if focused { "_" } else { "" }),
                if focused { focus_style } else { Style::default() },
            ),
        ])
    };

    let mut lines = vec![
        text_field("Name", &form.name, 0),
        text_field("Description", &form.description, 1),
        Line::from(vec![
            Span::raw(if form.focus == 2 { "▶ " } else { "  " }),
            Span::styled("Permissions", bold),
        ]),
    ];

    let mut groups: Vec<(&str, Vec<usize>)> = PermissionCategory::ALL
        .iter()
        .map(|c| {
            let idxs = form
                .choices
                .iter()
                .enumerate()
                .filter(|(_, p)| c.permissions().iter().any(|known| *known == p.as_str()))
                .map(|(i, _)| i)
                .collect();
            (c.as_str(), idxs)
        })
        .collect();
    let other: Vec<usize> = (0..form.choices.len())
        .filter(|i| !groups.iter().any(|(_, idxs)| idxs.contains(i)))
        .collect();
    if !other.is_empty() {
        groups.push(("OTHER", other));
    }

    for (name, idxs) in groups {
        lines.push(Line::from(Span::styled(format!("    {name}"), Style::default().fg(app.theme.accent))));
        for i in idxs {
            let choice = &form.choices[i];
            let under_cursor = form.focus == 2 && form.cursor == i;
            let check = if form.is_checked(choice) { "[x]" } else { "[ ]" };
            let style = if under_cursor { focus_style.add_modifier(Modifier::BOLD) } else { Style::default() };
            lines.push(Line::from(Span::styled(
                format!("    {} {} {}", if under_cursor { "▶" } else { " " }, check, permissions::display_name(choice)),
                style,
            )));
        }
    }

    lines.push(Line::raw(""));
    if let Some(err) = &form.error {
        lines.push(Line::from(Span::styled(err.clone(), Style::default().fg(app.theme.error))));
    }
    lines.push(Line::from(Span::styled(
        "Tab: next field  Space: toggle  Enter: save  Esc: cancel",
        Style::default().fg(app.theme.muted),
    )));

    // keep the cursor row visible when the list is taller than the dialog
    let cursor_line = 4 + form.cursor as u16 + PermissionCategory::ALL.len() as u16;
    let visible = rect.height.saturating_sub(2);
    let scroll = if form.focus == 2 { cursor_line.saturating_sub(visible.saturating_sub(2)) } else { 0 };

    let p = Paragraph::new(lines).scroll((scroll, 0)).block(panel(form.title(), app));
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}
