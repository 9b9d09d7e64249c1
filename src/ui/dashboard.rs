//! Dashboard tab: headline cards, users-per-role chart, and recent activity.
//!
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{BarChart, Cell, Paragraph, Row, Table};

use super::components::panel;
use crate::app::AppState;
use crate::stats;

pub fn render_dashboard(f: &mut Frame, area: Rect, app: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(6)].as_ref())
        .split(area);
    let lower = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(rows[1]);

    render_cards(f, rows[0], app);
    render_role_chart(f, lower[0], app);
    render_recent_activity(f, lower[1], app);
}

fn render_cards(f: &mut Frame, area: Rect, app: &AppState) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 3), Constraint::Ratio(1, 3), Constraint::Ratio(1, 3)].as_ref())
        .split(area);
    let s = app.stats();
    let cards = [
        ("Total Users", s.total_users),
        ("Active Roles", s.active_roles),
        ("Permissions", s.permissions),
    ];
    for ((title, value), rect) in cards.into_iter().zip(cols.iter()) {
        let text = vec![
            Line::raw(""),
            Line::from(Span::styled(
                value.to_string(),
                Style::default().fg(app.theme.accent).add_modifier(Modifier::BOLD),
            )),
        ];
        let p = Paragraph::new(text).alignment(Alignment::Center).block(panel(title, app));
        f.render_widget(p, *rect);
    }
}

fn render_role_chart(f: &mut Frame, area: Rect, app: &AppState) {
    let dist = stats::role_distribution(&app.roles_all, &app.users_all);
    if dist.is_empty() {
        let p = Paragraph::new("No roles defined").block(panel("Users per role", app));
        f.render_widget(p, area);
        return;
    }
    let data: Vec<(&str, u64)> = dist.iter().map(|c| (c.role.as_str(), c.count as u64)).collect();
    let inner_w = area.width.saturating_sub(2);
    let n = data.len() as u16;
    let bar_width = (inner_w.saturating_sub(n)).checked_div(n).unwrap_or(1).clamp(3, 12);
    let chart = BarChart::default()
        .block(panel("Users per role", app))
        .data(data.as_slice())
        .bar_width(bar_width)
        .bar_gap(1)
        .bar_style(Style::default().fg(app.theme.accent))
        .value_style(Style::default().fg(app.theme.header_bg).bg(app.theme.accent))
        .label_style(Style::default().fg(app.theme.text));
    f.render_widget(chart, area);
}

fn render_recent_activity(f: &mut Frame, area: Rect, app: &AppState) {
    let feed = stats::recent_activity(&app.users_all);
    let rows = feed.iter().map(|e| {
        Row::new(vec![
            Cell::from(e.action),
            Cell::from(e.details.clone()),
            Cell::from(e.time()),
        ])
        .style(Style::default().fg(app.theme.text))
    });
    let header = Row::new(vec!["ACTION", "DETAILS", "TIME"]).style(
        Style::default()
            .fg(app.theme.title)
            .add_modifier(Modifier::BOLD),
    );
    let widths = [Constraint::Length(11), Constraint::Percentage(50), Constraint::Length(19)];
    let table = Table::new(rows, widths)
        .header(header)
        .block(panel("Recent activity", app))
        .column_spacing(1);
    f.render_widget(table, area);
}
