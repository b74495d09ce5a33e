//! UI rendering for the toastline page
//!
//! The page is drawn in three bands (header, body, footer). Body elements in
//! normal flow are listed top to bottom; fixed-position elements such as
//! toasts are drawn last, over everything else.

mod helpers;
mod overlay;

use crate::app::App;
use crate::config::colors;
use crate::dom::{Element, ReadyState};
use helpers::{centered_rect, truncate};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};

/// Main render function
pub fn render(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(3),    // Body
            Constraint::Length(1), // Footer
        ])
        .split(f.area());

    let elements = app.document.children();

    render_header(f, chunks[0], app);
    render_body(f, chunks[1], app, &elements);
    render_footer(f, chunks[2], app);

    if app.debug_mode && !app.events.is_empty() {
        render_event_log(f, app);
    }

    let area = f.area();
    overlay::render_fixed(f, area, &elements);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let clock = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", app.title),
            Style::default()
                .fg(colors::HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" {clock}"), Style::default().fg(colors::DIM)),
    ]);

    let header = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(colors::BORDER))
            .border_type(BorderType::Rounded)
            .style(Style::default().bg(colors::BG)),
    );
    f.render_widget(header, area);
}

fn flow_line(element: &Element) -> Line<'static> {
    let text = element.text_content().to_string();
    match element.tag() {
        "h1" => Line::from(Span::styled(
            text,
            Style::default()
                .fg(colors::HIGHLIGHT)
                .add_modifier(Modifier::BOLD),
        )),
        _ => Line::from(Span::styled(text, Style::default().fg(colors::FG))),
    }
}

fn render_body(f: &mut Frame, area: Rect, app: &App, elements: &[Element]) {
    let mut lines: Vec<Line> = elements
        .iter()
        .filter(|el| !el.style().is_fixed())
        .map(flow_line)
        .collect();

    lines.push(Line::default());
    let status = match (app.document.ready_state(), app.is_listening()) {
        (ReadyState::Loading, _) => "Loading…".to_string(),
        (ReadyState::Interactive, true) => {
            format!("Listening for page events on {}", app.socket.display())
        }
        (ReadyState::Interactive, false) => "Not listening for page events".to_string(),
    };
    lines.push(Line::from(Span::styled(status, Style::default().fg(colors::DIM))));
    lines.push(Line::from(Span::styled(
        format!(
            "{} events dispatched, {} toasts pending",
            app.dispatched,
            app.pending_toasts()
        ),
        Style::default().fg(colors::DIM),
    )));

    let body = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(colors::BORDER))
            .border_type(BorderType::Rounded)
            .style(Style::default().bg(colors::BG)),
    );
    f.render_widget(body, area);
}

fn render_footer(f: &mut Frame, area: Rect, app: &App) {
    let mode = if app.debug_mode { "[debug] " } else { "" };
    let footer = Paragraph::new(format!("{mode}a:simulate urlAdded  d:event log  q:quit"))
        .style(Style::default().fg(colors::DIM))
        .alignment(Alignment::Center);
    f.render_widget(footer, area);
}

fn render_event_log(f: &mut Frame, app: &App) {
    let area = centered_rect(60, 50, f.area());

    let items: Vec<ListItem> = app
        .events
        .iter()
        .take(usize::from(area.height.saturating_sub(2)))
        .map(|record| {
            let line = format!(
                "{} │ {:24} │ {} listener(s)",
                record.at.format("%H:%M:%S"),
                truncate(&record.name, 24),
                record.handlers
            );
            ListItem::new(line).style(Style::default().fg(colors::FG))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .title(" Event Log ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(colors::BORDER))
            .border_type(BorderType::Rounded)
            .style(Style::default().bg(colors::BG)),
    );

    f.render_widget(Clear, area);
    f.render_widget(list, area);
}
