use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use super::app::{App, InputMode, Screen};
use super::commands;
use super::screens;
use super::theme;

pub(crate) fn render(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Tab bar
            Constraint::Min(5),    // Main content
            Constraint::Length(1), // Status bar
            Constraint::Length(1), // Command bar
        ])
        .split(f.area());

    render_tab_bar(f, chunks[0], app);
    match app.screen {
        Screen::Dashboard => screens::dashboard::render(f, chunks[1], app),
        Screen::Transactions => screens::transactions::render(f, chunks[1], app),
    }
    render_status_bar(f, chunks[2], app);
    render_command_bar(f, chunks[3], app);

    if app.show_help {
        render_help_overlay(f, f.area());
    }
}

fn render_tab_bar(f: &mut Frame, area: Rect, app: &App) {
    let titles: Vec<Line> = Screen::all()
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let style = if *s == app.screen {
                Style::default()
                    .fg(theme::ACCENT)
                    .add_modifier(Modifier::BOLD)
            } else {
                theme::dim_style()
            };
            Line::from(vec![
                Span::styled(format!("{}:", i + 1), theme::dim_style()),
                Span::styled(s.to_string(), style),
            ])
        })
        .collect();

    let tabs = Tabs::new(titles)
        .divider(Span::styled(" | ", Style::default().fg(theme::OVERLAY)))
        .style(Style::default().bg(theme::HEADER_BG));

    f.render_widget(tabs, area);
}

fn mode_style(mode: InputMode) -> Style {
    let bg = match mode {
        InputMode::Normal => theme::ACCENT,
        InputMode::Command => theme::GREEN,
        InputMode::Search => theme::YELLOW,
        InputMode::Confirm => theme::RED,
    };
    Style::default()
        .fg(theme::HEADER_BG)
        .bg(bg)
        .add_modifier(Modifier::BOLD)
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mode_label = format!(" {} ", app.input_mode);

    let info = match app.screen {
        Screen::Dashboard => {
            let count = app.dashboard.as_ref().map_or(0, |d| d.transaction_count);
            format!(" {} | {} | {} txns", app.screen, app.period.label(), count)
        }
        Screen::Transactions => format!(
            " {} | {} | {} shown",
            app.screen,
            app.filters.range,
            app.transactions.len()
        ),
    };

    let right = match app.screen {
        Screen::Dashboard => " H/L month | 2 transactions | ? help ",
        Screen::Transactions => " D delete | /search | :method | ? help ",
    };

    let used = mode_label.chars().count() + info.chars().count() + right.len();
    let pad = (area.width as usize).saturating_sub(used);

    let bar = Paragraph::new(Line::from(vec![
        Span::styled(&mode_label, mode_style(app.input_mode)),
        Span::styled(&info, theme::status_bar_style()),
        Span::styled(" ".repeat(pad), theme::status_bar_style()),
        Span::styled(right, theme::status_bar_style()),
    ]));
    f.render_widget(bar, area);
}

fn render_command_bar(f: &mut Frame, area: Rect, app: &App) {
    let (content, cursor_offset) = match app.input_mode {
        InputMode::Command => (
            Line::from(vec![
                Span::styled(":", Style::default().fg(theme::ACCENT)),
                Span::styled(&app.command_input, theme::command_bar_style()),
            ]),
            Some(1 + app.command_input.chars().count() as u16),
        ),
        InputMode::Search => {
            let matches = if app.search_input.is_empty() {
                String::new()
            } else {
                format!("  ({} matches)", app.transactions.len())
            };
            (
                Line::from(vec![
                    Span::styled("/", Style::default().fg(theme::YELLOW)),
                    Span::styled(&app.search_input, theme::command_bar_style()),
                    Span::styled(matches, theme::dim_style()),
                ]),
                Some(1 + app.search_input.chars().count() as u16),
            )
        }
        InputMode::Confirm => (
            Line::from(vec![
                Span::styled(&app.confirm_message, Style::default().fg(theme::YELLOW)),
                Span::styled(" [y/N] ", Style::default().fg(theme::RED)),
            ]),
            None,
        ),
        InputMode::Normal if app.status_message.is_empty() => (
            Line::from(Span::styled(
                " Press : for commands, / to search, ? for help",
                theme::dim_style(),
            )),
            None,
        ),
        InputMode::Normal => (
            Line::from(Span::styled(
                &app.status_message,
                theme::command_bar_style(),
            )),
            None,
        ),
    };

    let bar = Paragraph::new(content).style(Style::default().bg(theme::COMMAND_BG));
    f.render_widget(bar, area);

    if let Some(offset) = cursor_offset {
        f.set_cursor_position((area.x + offset, area.y));
    }
}

fn heading(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        format!(" {text}"),
        Style::default()
            .fg(theme::YELLOW)
            .add_modifier(Modifier::BOLD),
    ))
}

fn key_row(left: (&str, &str), right: (&str, &str)) -> Line<'static> {
    Line::from(Span::styled(
        format!("  {:<16} {:<22} {:<10} {}", left.0, left.1, right.0, right.1),
        theme::normal_style(),
    ))
}

fn render_help_overlay(f: &mut Frame, area: Rect) {
    let mut lines = vec![
        Line::from(Span::styled(
            " FlowDash Help ",
            Style::default()
                .fg(theme::ACCENT)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        heading("Navigation"),
        key_row(("j/k or Up/Down", "Move cursor"), ("1-2", "Switch tabs")),
        key_row(("Tab/Shift-Tab", "Cycle tabs"), ("g/G", "Top/Bottom")),
        key_row(("H/L", "Prev/Next month"), ("Ctrl-d/u", "Page Down/Up")),
        key_row(("Esc", "Cancel"), ("Ctrl-q", "Quit")),
        Line::from(""),
        heading("Actions"),
        key_row(("/", "Search (live)"), (":", "Command mode")),
        key_row(("D", "Delete transaction"), ("c", "Clear filters")),
        Line::from(""),
        heading("Commands"),
    ];

    // Aliases share a description; list each command once under its long name.
    let mut seen = std::collections::HashSet::new();
    let mut entries: Vec<(&str, &str)> = commands::COMMANDS
        .iter()
        .filter(|(name, _)| name.len() > 1)
        .map(|(&name, cmd)| (name, cmd.description))
        .collect();
    entries.sort_by_key(|(name, _)| *name);
    for (name, desc) in entries {
        if seen.insert(desc) {
            lines.push(Line::from(Span::styled(
                format!("  :{name:<14} {desc}"),
                theme::normal_style(),
            )));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " Press any key to close ",
        theme::dim_style(),
    )));

    let popup_height = (lines.len() as u16 + 2).min(area.height.saturating_sub(2));
    let popup_width = 76.min(area.width.saturating_sub(4));
    let x = area.x + area.width.saturating_sub(popup_width) / 2;
    let y = area.y + area.height.saturating_sub(popup_height) / 2;
    let popup_area = Rect::new(x, y, popup_width, popup_height);

    f.render_widget(Clear, popup_area);
    let help = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::ACCENT))
            .style(Style::default().bg(theme::HEADER_BG)),
    );
    f.render_widget(help, popup_area);
}
