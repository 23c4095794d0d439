use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Clear, Gauge, Paragraph, Row, Table},
    Frame,
};
use chrono::{Local, Utc};
use crate::deadline::{relative_age, DeadlineStatus};
use crate::models::Priority;
use crate::storage::KeyValueStore;
use crate::theme::Theme;
use super::app::{App, InputField, InputMode};

/// Colours used for one theme.
struct Palette {
    text: Color,
    muted: Color,
    accent: Color,
    highlight_bg: Color,
}

impl Palette {
    fn for_theme(theme: Theme) -> Palette {
        match theme {
            Theme::Light => Palette {
                text: Color::Black,
                muted: Color::DarkGray,
                accent: Color::Blue,
                highlight_bg: Color::Gray,
            },
            Theme::Dark => Palette {
                text: Color::White,
                muted: Color::Gray,
                accent: Color::Cyan,
                highlight_bg: Color::DarkGray,
            },
        }
    }
}

pub fn ui<S: KeyValueStore>(f: &mut Frame, app: &mut App<S>) {
    let palette = Palette::for_theme(app.theme);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Progress
            Constraint::Min(0),    // Table
            Constraint::Length(3)  // Status + help
        ].as_ref())
        .split(f.area());

    let stats = app.store.stats();
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Progress"))
        .gauge_style(Style::default().fg(if stats.percentage == 100 { Color::Green } else { palette.accent }))
        .percent(u16::from(stats.percentage))
        .label(format!("{}/{} done ({}%)", stats.completed, stats.total, stats.percentage));
    f.render_widget(gauge, chunks[0]);

    let today = Local::now().date_naive();
    let now = Utc::now();

    let rows: Vec<Row> = app
        .visible
        .iter()
        .map(|t| {
            let status = DeadlineStatus::classify(t.deadline, today);
            let priority_color = match t.priority {
                Priority::High => Color::Red,
                Priority::Medium => Color::Yellow,
                Priority::Low => Color::Green,
            };
            let deadline_style = if !t.completed && status.is_pressing() {
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let style = if t.completed {
                Style::default().fg(palette.muted).add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default().fg(palette.text)
            };

            Row::new(vec![
                Cell::from(if t.completed { "[x]" } else { "[ ]" }),
                Cell::from(t.text.clone()),
                Cell::from(t.priority.to_string()).style(Style::default().fg(priority_color)),
                Cell::from(status.label()).style(deadline_style),
                Cell::from(relative_age(t.created_at, now)),
                Cell::from(if t.notes.trim().is_empty() { "" } else { "✎" }),
            ]).style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(3),
        Constraint::Min(20),
        Constraint::Length(8),
        Constraint::Length(14),
        Constraint::Length(10),
        Constraint::Length(2),
    ];

    let mut title = format!("TaskFlow - {}", app.store.filter());
    if !app.store.search().trim().is_empty() {
        title.push_str(&format!(" - search: \"{}\"", app.store.search()));
    }

    let table = Table::new(rows, widths)
        .header(Row::new(vec!["", "Task", "Priority", "Deadline", "Created", ""])
            .style(Style::default().fg(palette.accent).add_modifier(Modifier::BOLD))
            .bottom_margin(1))
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(palette.highlight_bg))
        .highlight_symbol(">> ");

    f.render_stateful_widget(table, chunks[1], &mut app.state);

    let help_text = match app.input_mode {
        InputMode::Normal => "q: Quit | a: Add | e: Edit | n: Notes | t: Deadline | p: Priority | Space: Done | d: Del | f: Filter | /: Search | x: Clear Done | J/K: Move | T: Theme",
        InputMode::Editing if app.input_field == InputField::Search => "Type to search | Enter: Keep | Esc: Clear",
        InputMode::Editing => "Enter: Save | Esc: Cancel",
        InputMode::Adding => "Enter: Next Step | Esc: Cancel",
    };
    let footer = match &app.status {
        Some(status) => format!("{}  |  {}", status, help_text),
        None => help_text.to_string(),
    };

    let help = Paragraph::new(footer)
        .style(Style::default().fg(palette.muted))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(help, chunks[2]);

    // Render Input Box if needed
    if app.input_mode == InputMode::Normal {
        return;
    }
    let area = centered_rect(60, 3, f.area());
    f.render_widget(Clear, area);

    let title = match app.input_mode {
        InputMode::Adding => match app.add_state.step {
            0 => "Add Task: Enter Text",
            1 => "Add Task: Enter Priority (low/medium/high, default medium)",
            2 => "Add Task: Enter Deadline (YYYY-MM-DD, optional)",
            _ => "Add Task",
        },
        InputMode::Editing => match app.input_field {
            InputField::Text => "Edit Text",
            InputField::Notes => "Edit Notes",
            InputField::Deadline => "Edit Deadline (YYYY-MM-DD, empty clears)",
            InputField::Search => "Search",
            InputField::None => "Edit",
        },
        InputMode::Normal => "",
    };

    let input = Paragraph::new(app.input_buffer.as_str())
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL).title(title));

    f.render_widget(input, area);
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let margin = r.height.saturating_sub(height) / 2;
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(margin),
            Constraint::Length(height),
            Constraint::Length(margin),
        ].as_ref())
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ].as_ref())
        .split(popup_layout[1])[1]
}
