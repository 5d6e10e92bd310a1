use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use rust_decimal::Decimal;

use super::panel;
use crate::dashboard::DashboardData;
use crate::summary::{NodeKind, INCOME_NODE};
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{bar, format_amount, format_signed, percent_of, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let Some(data) = app.dashboard.as_ref() else {
        let message = app
            .dashboard_error
            .clone()
            .unwrap_or_else(|| "Loading…".to_string());
        let text = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(message, theme::expense_style())),
        ])
        .centered()
        .block(panel(format!("Dashboard {}", app.period.label())));
        f.render_widget(text, area);
        return;
    };

    let recent_height = app.recent_limit.max(1) as u16 + 2;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),             // Summary cards
            Constraint::Min(6),                // Money flow
            Constraint::Length(recent_height), // Recent transactions
        ])
        .split(area);

    render_summary_cards(f, chunks[0], data);
    render_flow(f, chunks[1], data);
    render_recent(f, chunks[2], data);
}

fn render_summary_cards(f: &mut Frame, area: Rect, data: &DashboardData) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    let summary = &data.summary;

    render_card(
        f,
        cards[0],
        "Expenses",
        format_amount(summary.total_expenses),
        theme::RED,
        String::new(),
    );
    render_card(
        f,
        cards[1],
        "Income",
        format_amount(summary.total_income),
        theme::GREEN,
        String::new(),
    );

    let overspend = summary.overspend();
    let (color, note) = if overspend > Decimal::ZERO {
        (theme::RED, format!("overspent by {}", format_amount(overspend)))
    } else {
        let rate = percent_of(summary.total_savings, summary.total_income)
            .map(|p| format!("{p}% of income"))
            .unwrap_or_default();
        (theme::ACCENT, rate)
    };
    render_card(
        f,
        cards[2],
        "Savings",
        format_amount(summary.total_savings),
        color,
        note,
    );
}

fn render_card(f: &mut Frame, area: Rect, title: &str, value: String, color: Color, note: String) {
    let text = Paragraph::new(vec![
        Line::from(Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(note, theme::dim_style())),
    ])
    .centered()
    .block(panel(title));

    f.render_widget(text, area);
}

fn render_flow(f: &mut Frame, area: Rect, data: &DashboardData) {
    let graph = &data.summary.flow_graph;
    let title = format!(
        "Money Flow {} | {} out of income",
        data.period.label(),
        format_amount(graph.outgoing_weight(INCOME_NODE))
    );

    if graph.is_empty() {
        let msg = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "No income or expenses this month",
                theme::dim_style(),
            )),
            Line::from(Span::styled(
                "Add one with :add-txn or import a CSV with :import",
                theme::dim_style(),
            )),
        ])
        .centered()
        .block(panel(title));
        f.render_widget(msg, area);
        return;
    }

    let name_of = |id: &str| {
        graph
            .node(id)
            .map_or_else(|| id.to_string(), |n| n.display_name.clone())
    };
    let max = graph
        .edges
        .iter()
        .map(|e| e.weight)
        .max()
        .unwrap_or(Decimal::ZERO);
    let label_width = graph
        .nodes
        .iter()
        .map(|n| n.display_name.chars().count())
        .max()
        .unwrap_or(0)
        .min(20);
    // Two names, arrow, amount and percentage take the rest of the row.
    let bar_width = (area.width as usize).saturating_sub(2 * label_width + 30).max(4);

    let lines: Vec<Line> = graph
        .edges
        .iter()
        .map(|edge| {
            let target_kind = graph.node(&edge.target).map(|n| n.kind);
            let color = match target_kind {
                Some(NodeKind::Savings) => theme::GREEN,
                _ => theme::RED,
            };
            let pct = percent_of(edge.weight, data.summary.total_income)
                .map(|p| format!("{p:>3}%"))
                .unwrap_or_default();
            Line::from(vec![
                Span::styled(
                    format!(" {:<label_width$}", truncate(&name_of(&edge.source), label_width)),
                    theme::income_style(),
                ),
                Span::styled(" → ", theme::dim_style()),
                Span::styled(
                    format!("{:<label_width$} ", truncate(&name_of(&edge.target), label_width)),
                    theme::normal_style(),
                ),
                Span::styled(
                    format!("{:<bar_width$}", bar(edge.weight, max, bar_width)),
                    Style::default().fg(color),
                ),
                Span::styled(format!(" {:>12} ", format_amount(edge.weight)), theme::normal_style()),
                Span::styled(pct, theme::dim_style()),
            ])
        })
        .collect();

    f.render_widget(Paragraph::new(lines).block(panel(title)), area);
}

fn render_recent(f: &mut Frame, area: Rect, data: &DashboardData) {
    let lines: Vec<Line> = if data.recent.is_empty() {
        vec![Line::from(Span::styled(
            " No transactions yet",
            theme::dim_style(),
        ))]
    } else {
        data.recent
            .iter()
            .map(|txn| {
                let style = if txn.is_income() {
                    theme::income_style()
                } else if txn.is_expense() {
                    theme::expense_style()
                } else {
                    theme::dim_style()
                };
                let category = txn
                    .category_id
                    .as_ref()
                    .and_then(|id| data.category_names.get(id))
                    .map_or("", String::as_str);
                Line::from(vec![
                    Span::styled(format!(" {}  ", txn.transaction_date), theme::dim_style()),
                    Span::styled(
                        format!("{:<32}", truncate(&txn.description, 32)),
                        theme::normal_style(),
                    ),
                    Span::styled(format!("{:<16}", truncate(category, 16)), theme::dim_style()),
                    Span::styled(format!("{:>14}", format_signed(txn)), style),
                ])
            })
            .collect()
    };

    f.render_widget(Paragraph::new(lines).block(panel("Recent Transactions")), area);
}
