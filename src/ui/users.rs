use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Clear, Paragraph, Row, Table, Wrap};

use super::components::{centered_rect, list_title, page_window, panel};
use crate::app::forms::UserForm;
use crate::app::{ActiveTab, AppState};
use crate::model::UserStatus;

pub fn render_users_table(f: &mut Frame, area: Rect, app: &mut AppState) {
    let body_height = area.height.saturating_sub(3) as usize;
    if body_height > 0 {
        app.rows_per_page = body_height;
    }

    let (start, end) = page_window(app.selected_user_index, app.rows_per_page, app.users.len());
    let slice = &app.users[start..end];

    let rows = slice.iter().enumerate().map(|(i, u)| {
        let style = if start + i == app.selected_user_index {
            Style::default()
                .fg(app.theme.highlight_fg)
                .bg(app.theme.highlight_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.text)
        };
        let status_color = match u.status {
            UserStatus::Active => app.theme.success,
            UserStatus::Inactive => app.theme.muted,
        };
        Row::new(vec![
            Cell::from(u.name.clone()),
            Cell::from(u.email.clone()),
            Cell::from(u.role.clone()),
            Cell::from(Span::styled(u.status.as_str(), Style::default().fg(status_color))),
        ])
        .style(style)
    });

    let widths = [
        Constraint::Percentage(28),
        Constraint::Percentage(40),
        Constraint::Percentage(18),
        Constraint::Length(9),
    ];

    let header = Row::new(vec!["NAME", "EMAIL", "ROLE", "STATUS"]).style(
        Style::default()
            .fg(app.theme.title)
            .add_modifier(Modifier::BOLD),
    );

    let title = list_title(app, ActiveTab::Users);
    let table = Table::new(rows, widths)
        .header(header)
        .block(panel(&title, app))
        .column_spacing(1);

    f.render_widget(table, area);
}

pub fn render_user_details(f: &mut Frame, area: Rect, app: &AppState) {
    let text = match app.selected_user() {
        Some(u) => {
            // a role name that matches no role is shown as such
            let role_note = if app.roles_all.iter().any(|r| r.name == u.role) {
                ""
            } else {
                " (no such role)"
            };
            format!(
                "Name: {}\nEmail: {}\nRole: {}{}\nStatus: {}\nCreated: {}\nId: {}",
                u.name,
                u.email,
                u.role,
                role_note,
                u.status,
                u.created_at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M:%S"),
                u.id
            )
        }
        None => "No user selected".to_string(),
    };
    let p = Paragraph::new(text)
        .style(Style::default().fg(app.theme.text))
        .wrap(Wrap { trim: false })
        .block(panel("Details", app));
    f.render_widget(p, area);
}

fn field_line<'a>(label: &'a str, value: String, focused: bool, app: &AppState) -> Line<'a> {
    let marker = if focused { "▶ " } else { "  " };
    let style = if focused {
        Style::default().fg(app.theme.highlight_fg)
    } else {
        Style::default().fg(app.theme.text)
    };
    Line::from(vec![
        Span::raw(marker),
        Span::styled(format!("{label:<8}"), Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(value, style),
    ])
}

/// Render the create/edit user form.
pub fn render_user_form(f: &mut Frame, area: Rect, app: &AppState, form: &UserForm) {
    let width = 60u16.min(area.width.saturating_sub(4)).max(40);
    let rect = centered_rect(width, 11, area);
    let cursor = |i: usize| if form.focus == i { "_" } else { "" };
    let role = if form.role.is_empty() {
        "<Space to choose>".to_string()
    } else {
        format!("◀ {} ▶", form.role)
    };
    let mut lines = vec![
        field_line("Name", format!("{}{}", form.name, cursor(0)), form.focus == 0, app),
        field_line("Email", format!("{}{}", form.email, cursor(1)), form.focus == 1, app),
        field_line("Role", role, form.focus == 2, app),
        field_line("Status", format!("◀ {} ▶", form.status), form.focus == 3, app),
        Line::raw(""),
    ];
    match &form.error {
        Some(err) => lines.push(Line::from(Span::styled(
            err.clone(),
            Style::default().fg(app.theme.error),
        ))),
        None => lines.push(Line::raw("")),
    }
    lines.push(Line::from(Span::styled(
        "Tab: next field  Enter: save  Esc: cancel",
        Style::default().fg(app.theme.muted),
    )));
    let p = Paragraph::new(lines).block(panel(form.title(), app));
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}
