pub mod components;
pub mod dashboard;
pub mod roles;
pub mod users;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::{ActiveTab, AppState, InputMode};

pub fn render(f: &mut Frame, app: &mut AppState) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5), Constraint::Length(1)].as_ref())
        .split(f.area());

    let main = if app.show_keybinds {
        let split = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(68), Constraint::Percentage(32)].as_ref())
            .split(root[1]);
        components::render_keybinds_panel(f, split[1], app);
        split[0]
    } else {
        root[1]
    };

    render_header(f, root[0], app);

    match app.active_tab {
        ActiveTab::Dashboard => dashboard::render_dashboard(f, main, app),
        ActiveTab::Users | ActiveTab::Roles => {
            let body = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(62), Constraint::Percentage(38)].as_ref())
                .split(main);
            if app.active_tab == ActiveTab::Users {
                users::render_users_table(f, body[0], app);
                users::render_user_details(f, body[1], app);
            } else {
                roles::render_roles_table(f, body[0], app);
                roles::render_role_details(f, body[1], app);
            }
        }
    }

    components::render_status_bar(f, root[2], app);

    let area = f.area();
    if let Some(state) = &app.modal {
        components::render_modal(f, area, app, state);
    }
}

fn render_header(f: &mut Frame, area: ratatui::layout::Rect, app: &AppState) {
    let mut spans = Vec::new();
    for (i, tab) in ActiveTab::ALL.into_iter().enumerate() {
        let label = format!(" {} {} ", i + 1, tab.title());
        let style = if tab == app.active_tab {
            Style::default()
                .fg(app.theme.highlight_fg)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            Style::default().fg(app.theme.header_fg)
        };
        spans.push(Span::styled(label, style));
        spans.push(Span::raw(" "));
    }
    if app.input_mode == InputMode::Search {
        spans.push(Span::styled(
            format!(" Search {}: {}_", app.active_tab.title().to_lowercase(), app.search_query),
            Style::default().fg(app.theme.accent),
        ));
    } else {
        spans.push(Span::styled(
            format!(" operator: {}  ?: help  q: quit", app.operator),
            Style::default().fg(app.theme.muted),
        ));
    }
    let p = Paragraph::new(Line::from(spans))
        .block(components::panel("rbac-dashboard", app))
        .style(Style::default().fg(app.theme.header_fg).bg(app.theme.header_bg));
    f.render_widget(p, area);
}
